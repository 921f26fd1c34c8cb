//! Request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jobs::JobRequest;

/// Body of `POST /job`
///
/// `withNeighbors` is optional and `null` means false.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubmitRequest {
    #[serde(default, alias = "topic")]
    pub name: Option<String>,

    #[serde(default, rename = "withNeighbors", alias = "includeRelated")]
    pub with_neighbors: Option<bool>,
}

impl SubmitRequest {
    /// Read a submission body, salvaging the fields that are well-formed
    ///
    /// A body that does not match the typed shape (say `withNeighbors: "yes"`)
    /// still yields its topic; only a missing or non-string topic is lost.
    pub fn from_value(value: Value) -> Self {
        if let Ok(request) = serde_json::from_value::<Self>(value.clone()) {
            return request;
        }
        let field = |names: &[&str]| names.iter().find_map(|name| value.get(*name));
        Self {
            name: field(&["name", "topic"])
                .and_then(Value::as_str)
                .map(str::to_string),
            with_neighbors: field(&["withNeighbors", "includeRelated"]).and_then(Value::as_bool),
        }
    }
}

impl From<SubmitRequest> for JobRequest {
    fn from(request: SubmitRequest) -> Self {
        JobRequest::new(request.name.unwrap_or_default())
            .with_related(request.with_neighbors.unwrap_or(false))
    }
}

/// Body of a poll for an unknown or already-delivered job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub error: String,
}

impl NotFoundResponse {
    pub fn for_job(id: &str) -> Self {
        Self {
            error: format!("Job {id} not found"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub running_jobs: usize,
    pub max_running_jobs: usize,
    pub live_jobs: usize,
}
