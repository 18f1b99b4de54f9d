use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::client_state::{ClientState, ClientStateView};
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::models::JobView;
use crate::services::clients::{self, SavedJobToggle};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    #[serde(default)]
    pub skill: String,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewsResponse {
    pub profile_views: u64,
}

pub async fn get_state(
    State(state): State<AppState>,
    AppPath(client_id): AppPath<String>,
) -> AppResult<Json<ClientStateView>> {
    let client = clients::client_state(state.store(), &client_id).await?;
    Ok(Json(client.into()))
}

pub async fn replace_state(
    State(state): State<AppState>,
    AppPath(client_id): AppPath<String>,
    AppJson(payload): AppJson<ClientState>,
) -> AppResult<Json<ClientStateView>> {
    let view = clients::replace_client_state(state.store(), &client_id, payload).await?;
    Ok(Json(view))
}

pub async fn list_saved_jobs(
    State(state): State<AppState>,
    AppPath(client_id): AppPath<String>,
) -> AppResult<Json<Vec<JobView>>> {
    let saved = clients::saved_job_views(state.store(), &client_id, Utc::now()).await?;
    Ok(Json(saved))
}

pub async fn toggle_saved_job(
    State(state): State<AppState>,
    AppPath((client_id, job_id)): AppPath<(String, i64)>,
) -> AppResult<Json<SavedJobToggle>> {
    let toggle = clients::toggle_saved_job(state.store(), &client_id, job_id).await?;
    Ok(Json(toggle))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    AppPath((client_id, notification_id)): AppPath<(String, i64)>,
) -> AppResult<Json<ClientStateView>> {
    let view =
        clients::mark_notification_read(state.store(), &client_id, notification_id).await?;
    Ok(Json(view))
}

pub async fn add_skill(
    State(state): State<AppState>,
    AppPath(client_id): AppPath<String>,
    AppJson(payload): AppJson<SkillRequest>,
) -> AppResult<Json<SkillsResponse>> {
    let skills = clients::add_profile_skill(state.store(), &client_id, &payload.skill).await?;
    Ok(Json(SkillsResponse { skills }))
}

pub async fn remove_skill(
    State(state): State<AppState>,
    AppPath((client_id, skill)): AppPath<(String, String)>,
) -> AppResult<Json<SkillsResponse>> {
    let skills = clients::remove_profile_skill(state.store(), &client_id, &skill).await?;
    Ok(Json(SkillsResponse { skills }))
}

pub async fn record_profile_view(
    State(state): State<AppState>,
    AppPath(client_id): AppPath<String>,
) -> AppResult<Json<ProfileViewsResponse>> {
    let profile_views = clients::record_profile_view(state.store(), &client_id).await?;
    Ok(Json(ProfileViewsResponse { profile_views }))
}
