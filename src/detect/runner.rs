//! Detection runner
//!
//! Submits images to the detector through the shared detection limiter and
//! folds every completion into the owning job. A failing image degrades to
//! "no faces found"; it never fails the job.

use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use log::{debug, warn};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use super::detector::Detector;
use super::likelihood::FaceRecord;
use crate::concurrency::ConcurrencyLimiter;
use crate::discovery::ImagePair;
use crate::jobs::Job;
use crate::utils::DEFAULT_DETECT_TIMEOUT_MS;

#[derive(Clone)]
pub struct DetectionRunner {
    detector: Arc<dyn Detector>,
    limiter: ConcurrencyLimiter,
    timeout: Duration,
}

impl DetectionRunner {
    #[must_use]
    pub fn new(detector: Arc<dyn Detector>, limiter: ConcurrencyLimiter) -> Self {
        Self {
            detector,
            limiter,
            timeout: Duration::from_millis(DEFAULT_DETECT_TIMEOUT_MS),
        }
    }

    /// Per-call timeout passed through to the detector
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Detect faces in one image
    ///
    /// The slot is held only for the detector call and is returned on every
    /// path, including a panicking detector. Errors yield an empty list.
    pub async fn detect(&self, image_url: &str) -> Vec<FaceRecord> {
        let outcome = {
            let _slot = self.limiter.acquire().await;
            debug!("Detecting faces in {image_url}");
            AssertUnwindSafe(self.detector.detect(image_url, self.timeout))
                .catch_unwind()
                .await
        };

        match outcome {
            Ok(Ok(faces)) => {
                debug!("Found {} faces in {image_url}", faces.len());
                faces.iter().map(FaceRecord::from).collect()
            }
            Ok(Err(e)) => {
                warn!("Error detecting faces in {image_url}: {e}");
                Vec::new()
            }
            Err(_) => {
                warn!("Detector panicked while processing {image_url}");
                Vec::new()
            }
        }
    }

    /// Detect faces in every pair concurrently, recording results on `job`
    ///
    /// Declares `pairs.len()` units of work up front and steps once per pair
    /// as each completes, in whatever order they finish.
    pub async fn detect_all(&self, pairs: Vec<ImagePair>, job: &Job) -> Vec<FaceRecord> {
        job.add_work(pairs.len());

        let mut pending: FuturesUnordered<_> = pairs
            .into_iter()
            .map(|pair| async move {
                let faces = self.detect(&pair.image).await;
                job.add_image(&pair.topic, &pair.image, faces.clone());
                job.step();
                faces
            })
            .collect();

        let mut all_faces = Vec::new();
        while let Some(faces) = pending.next().await {
            all_faces.extend(faces);
        }
        all_faces
    }
}
