use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::client_state::NotificationKind;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::models::{ApplicationOutcome, JobApplication};
use crate::services::{applications, clients};
use crate::state::AppState;

use super::jobs::ClientQuery;

#[derive(Debug, Default, Deserialize)]
pub struct CandidateQuery {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

pub async fn list_user_applications(
    State(state): State<AppState>,
    Query(params): Query<CandidateQuery>,
) -> AppResult<Json<Vec<JobApplication>>> {
    let applications =
        applications::get_user_applications(state.store(), params.email.as_deref()).await?;
    Ok(Json(applications))
}

pub async fn update_application_status(
    State(state): State<AppState>,
    AppPath(application_id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<ApplicationOutcome>> {
    let outcome =
        applications::update_application_status(state.store(), application_id, &payload.status)
            .await?;
    Ok(Json(outcome))
}

pub async fn withdraw_application(
    State(state): State<AppState>,
    AppPath(application_id): AppPath<i64>,
    Query(client): Query<ClientQuery>,
) -> AppResult<Json<ApplicationOutcome>> {
    let outcome = applications::withdraw_application(state.store(), application_id).await?;
    clients::record_activity(
        state.store(),
        client.client_id.as_deref(),
        format!("Withdrew application for {}", outcome.application.job_title),
        NotificationKind::General,
        Utc::now(),
    )
    .await;
    Ok(Json(outcome))
}
