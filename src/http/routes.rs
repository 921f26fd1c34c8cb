//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};
use std::path::Path;
use tower_http::services::ServeDir;

use super::handlers::{self, AppState};
use crate::jobs::JobManager;

/// Build the router; `static_dir` is served for unmatched paths if it exists
pub fn create_router(manager: JobManager, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/job", post(handlers::submit_job))
        .route("/job/:job_id", get(handlers::get_job))
        .route("/health", get(handlers::health))
        .with_state(AppState { manager });

    match static_dir.filter(|dir| dir.is_dir()) {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}
