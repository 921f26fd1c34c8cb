//! HTTP API
//!
//! `POST /job` submits, `GET /job/:id` polls, `GET /health` reports load.
//! Any other path is served from the frontend build directory when present.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use server::serve;
pub use types::{HealthResponse, NotFoundResponse, SubmitRequest};
