//! Loading and updating per-browser [`ClientState`] documents. Each client
//! owns the collection `client-<id>`, holding at most one document.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::client_state::{ClientState, ClientStateView, NotificationKind};
use crate::models::JobView;
use crate::storage::{load, modify, RecordStore};

use super::jobs::{list_active_jobs, JobListing};
use super::{require_non_blank, ServiceError, ServiceResult};

const CLIENT_COLLECTION_PREFIX: &str = "client-";
const MAX_CLIENT_ID_LEN: usize = 64;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobToggle {
    pub job_id: i64,
    pub saved: bool,
    pub saved_jobs: Vec<i64>,
}

/// Stored state for `client_id`, or a fresh one if it never saved anything.
pub async fn client_state(store: &dyn RecordStore, client_id: &str) -> ServiceResult<ClientState> {
    let collection = collection_for(client_id)?;
    let (_, documents) = load::<ClientState>(store, &collection).await?;
    Ok(documents.into_iter().next().unwrap_or_default())
}

pub async fn replace_client_state(
    store: &dyn RecordStore,
    client_id: &str,
    replacement: ClientState,
) -> ServiceResult<ClientStateView> {
    update(store, client_id, |state| {
        *state = replacement.clone();
        Ok(ClientStateView::from(state.clone()))
    })
    .await
}

pub async fn toggle_saved_job(
    store: &dyn RecordStore,
    client_id: &str,
    job_id: i64,
) -> ServiceResult<SavedJobToggle> {
    update(store, client_id, |state| {
        let saved = state.toggle_saved_job(job_id);
        Ok(SavedJobToggle {
            job_id,
            saved,
            saved_jobs: state.saved_jobs.clone(),
        })
    })
    .await
}

/// Active jobs the client has saved. Saved ids of closed or deleted jobs are
/// kept in the state but not listed.
pub async fn saved_job_views(
    store: &dyn RecordStore,
    client_id: &str,
    now: DateTime<Utc>,
) -> ServiceResult<Vec<JobView>> {
    let state = client_state(store, client_id).await?;
    let listing = list_active_jobs(store, JobListing::default(), now).await;
    Ok(state.saved_jobs(&listing).into_iter().cloned().collect())
}

pub async fn notify(
    store: &dyn RecordStore,
    client_id: &str,
    message: String,
    kind: NotificationKind,
    now: DateTime<Utc>,
) -> ServiceResult<i64> {
    update(store, client_id, |state| {
        Ok(state.add_notification(message.clone(), kind, now))
    })
    .await
}

/// Best-effort notification for an action the client took elsewhere. Failures
/// are logged and never surface to the caller.
pub async fn record_activity(
    store: &dyn RecordStore,
    client_id: Option<&str>,
    message: String,
    kind: NotificationKind,
    now: DateTime<Utc>,
) {
    let Some(client_id) = client_id else {
        return;
    };
    if let Err(err) = notify(store, client_id, message, kind, now).await {
        warn!(client_id, error = %err, "failed to record client notification");
    }
}

pub async fn mark_notification_read(
    store: &dyn RecordStore,
    client_id: &str,
    notification_id: i64,
) -> ServiceResult<ClientStateView> {
    update(store, client_id, |state| {
        if !state.mark_notification_read(notification_id) {
            return Err(ServiceError::NotFound("notification"));
        }
        Ok(ClientStateView::from(state.clone()))
    })
    .await
}

/// Adds `skill` to the profile; re-adding a present skill is a no-op.
pub async fn add_profile_skill(
    store: &dyn RecordStore,
    client_id: &str,
    skill: &str,
) -> ServiceResult<Vec<String>> {
    require_non_blank(skill, "skill")?;
    update(store, client_id, |state| {
        state.add_skill(skill);
        Ok(state.profile.skills.clone())
    })
    .await
}

pub async fn remove_profile_skill(
    store: &dyn RecordStore,
    client_id: &str,
    skill: &str,
) -> ServiceResult<Vec<String>> {
    update(store, client_id, |state| {
        if !state.remove_skill(skill) {
            return Err(ServiceError::NotFound("skill"));
        }
        Ok(state.profile.skills.clone())
    })
    .await
}

pub async fn record_profile_view(store: &dyn RecordStore, client_id: &str) -> ServiceResult<u64> {
    let views = update(store, client_id, |state| Ok(state.record_profile_view())).await?;
    info!(client_id, views, "profile view recorded");
    Ok(views)
}

async fn update<R, F>(store: &dyn RecordStore, client_id: &str, mut apply: F) -> ServiceResult<R>
where
    F: FnMut(&mut ClientState) -> ServiceResult<R>,
{
    let collection = collection_for(client_id)?;
    modify(store, &collection, |documents: &mut Vec<ClientState>| {
        if documents.is_empty() {
            documents.push(ClientState::default());
        }
        apply(&mut documents[0])
    })
    .await
}

/// Client ids become file names, so only `[A-Za-z0-9_-]` is accepted.
fn collection_for(client_id: &str) -> ServiceResult<String> {
    let valid = !client_id.is_empty()
        && client_id.len() <= MAX_CLIENT_ID_LEN
        && client_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ServiceError::Validation("invalid client id".to_string()));
    }
    Ok(format!("{CLIENT_COLLECTION_PREFIX}{client_id}"))
}
