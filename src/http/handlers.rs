//! Request handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::debug;
use serde_json::Value;

use super::types::{HealthResponse, NotFoundResponse, SubmitRequest};
use crate::jobs::{AdmissionError, JobManager, JobSnapshot};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub manager: JobManager,
}

/// Submit a job
///
/// A body that is not JSON at all is treated like a missing topic.
pub async fn submit_job(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(value)) => SubmitRequest::from_value(value),
        Err(rejection) => {
            debug!("Unreadable job submission: {rejection}");
            SubmitRequest::default()
        }
    };

    match state.manager.submit(request.into()) {
        Ok(snapshot) => (StatusCode::ACCEPTED, Json(snapshot)).into_response(),
        Err(e) => {
            let status = match e {
                AdmissionError::MissingTopic => StatusCode::BAD_REQUEST,
                AdmissionError::Saturated => StatusCode::SERVICE_UNAVAILABLE,
            };
            (status, Json(JobSnapshot::rejected(e.to_string()))).into_response()
        }
    }
}

/// Poll a job; a terminal read evicts it
pub async fn get_job(State(state): State<AppState>, Path(job_id): Path<String>) -> Response {
    match state.manager.poll(&job_id) {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(NotFoundResponse::for_job(&job_id))).into_response(),
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        running_jobs: state.manager.running_jobs(),
        max_running_jobs: state.manager.max_running(),
        live_jobs: state.manager.live_jobs(),
    })
}
