//! Face detection against the external detector
//!
//! The detector reports per-face categorical likelihoods for four emotions.
//! `DetectionRunner` admits calls through the detection limiter, normalizes
//! the raw vocabulary into `Likelihood`, and folds results into jobs.

pub mod detector;
pub mod likelihood;
pub mod runner;
pub mod vision;

pub use detector::{DetectError, Detector};
pub use likelihood::{FaceRecord, Likelihood, RawFaceAnnotation};
pub use runner::DetectionRunner;
pub use vision::VisionDetector;
