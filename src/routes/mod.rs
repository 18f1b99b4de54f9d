use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod applications;
pub mod clients;
pub mod health;
pub mod jobs;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = cors_layer(&state);

    let jobs_routes = Router::new()
        .route("/", get(jobs::list_jobs).post(jobs::create_job))
        .route("/stats", get(jobs::job_stats))
        .route("/:id", get(jobs::get_job))
        .route("/:id/apply", post(jobs::apply_to_job))
        .route("/:id/applications", get(jobs::list_job_applications));

    let applications_routes = Router::new()
        .route("/", get(applications::list_user_applications))
        .route(
            "/:id",
            patch(applications::update_application_status)
                .delete(applications::withdraw_application),
        );

    let clients_routes = Router::new()
        .route(
            "/:client_id/state",
            get(clients::get_state).put(clients::replace_state),
        )
        .route("/:client_id/saved-jobs", get(clients::list_saved_jobs))
        .route(
            "/:client_id/saved-jobs/:job_id",
            post(clients::toggle_saved_job),
        )
        .route(
            "/:client_id/notifications/:notification_id/read",
            post(clients::mark_notification_read),
        )
        .route("/:client_id/skills", post(clients::add_skill))
        .route("/:client_id/skills/:skill", delete(clients::remove_skill))
        .route("/:client_id/profile-views", post(clients::record_profile_view));

    Router::new()
        .nest("/api/jobs", jobs_routes)
        .nest("/api/applications", applications_routes)
        .nest("/api/clients", clients_routes)
        .route("/api/ping", get(health::ping))
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins = state.config.allowed_origins();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let headers: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS allowed origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(headers)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
