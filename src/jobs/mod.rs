//! Job tracking and orchestration
//!
//! A `Job` is the shared accumulator one analysis writes into; `JobManager`
//! owns the live job table, admission control and the per-job pipeline.

pub mod errors;
pub mod job;
pub mod manager;
pub mod types;

pub use errors::AdmissionError;
pub use job::Job;
pub use manager::JobManager;
pub use types::{JobRequest, JobSnapshot, ProgressSnapshot, TopicResults};
