use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::storage::StoreError;

pub mod applications;
pub mod clients;
pub mod jobs;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Creation-time id: the current unix millisecond, bumped past `largest` so ids
/// stay unique within a collection.
pub(crate) fn next_id(largest: Option<i64>, now: DateTime<Utc>) -> i64 {
    let stamp = now.timestamp_millis();
    match largest {
        Some(largest) if largest >= stamp => largest + 1,
        _ => stamp,
    }
}

pub(crate) fn require_non_blank(value: &str, field: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
