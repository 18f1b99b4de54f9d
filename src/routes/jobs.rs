use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::client_state::NotificationKind;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::matching::parse_requester_skills;
use crate::models::{
    ApplicationSubmission, ApplyOutcome, JobApplication, JobStats, JobSubmission, JobView,
};
use crate::services::{
    applications, clients,
    jobs::{self, JobListing},
};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    /// JSON array of the requester's skills, e.g. `["Rust","SQL"]`.
    pub user_skills: Option<String>,
    pub q: Option<String>,
}

/// Optional browser id whose notification feed should record the action.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientQuery {
    pub client_id: Option<String>,
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> Json<Vec<JobView>> {
    let requester_skills = parse_requester_skills(params.user_skills.as_deref());
    let listing = JobListing {
        requester_skills: requester_skills.as_deref(),
        search: params.q.as_deref(),
    };

    Json(jobs::list_active_jobs(state.store(), listing, Utc::now()).await)
}

pub async fn create_job(
    State(state): State<AppState>,
    AppJson(payload): AppJson<JobSubmission>,
) -> AppResult<(StatusCode, Json<JobView>)> {
    let view = jobs::create_job(state.store(), payload, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn job_stats(State(state): State<AppState>) -> Json<JobStats> {
    Json(jobs::job_stats(state.store()).await)
}

pub async fn get_job(
    State(state): State<AppState>,
    AppPath(job_id): AppPath<i64>,
) -> AppResult<Json<JobView>> {
    let view = jobs::get_job_by_id(state.store(), job_id, Utc::now()).await?;
    Ok(Json(view))
}

pub async fn apply_to_job(
    State(state): State<AppState>,
    AppPath(job_id): AppPath<i64>,
    Query(client): Query<ClientQuery>,
    AppJson(payload): AppJson<ApplicationSubmission>,
) -> AppResult<Json<ApplyOutcome>> {
    let now = Utc::now();
    let outcome = applications::apply_to_job(state.store(), job_id, payload, now).await?;
    clients::record_activity(
        state.store(),
        client.client_id.as_deref(),
        format!("Application submitted for {}", outcome.application.job_title),
        NotificationKind::Application,
        now,
    )
    .await;
    Ok(Json(outcome))
}

pub async fn list_job_applications(
    State(state): State<AppState>,
    AppPath(job_id): AppPath<i64>,
) -> AppResult<Json<Vec<JobApplication>>> {
    let applications = applications::get_job_applications(state.store(), job_id).await?;
    Ok(Json(applications))
}
