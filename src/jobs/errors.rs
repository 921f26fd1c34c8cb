//! Admission errors

/// Reasons a submission is refused before any job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("No topic provided")]
    MissingTopic,

    #[error("Too many jobs running. Please try again later.")]
    Saturated,
}
