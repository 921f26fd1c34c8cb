//! Live job table, admission control and per-job pipeline
//!
//! Jobs stay in the table until a poll observes them in a terminal state.
//! The running counter is separate from the table: a finished job that has
//! not been polled yet no longer counts against admission.

use dashmap::DashMap;
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::errors::AdmissionError;
use super::job::Job;
use super::types::{JobRequest, JobSnapshot};
use crate::concurrency::ConcurrencyLimiter;
use crate::config::ServiceConfig;
use crate::detect::{DetectionRunner, Detector};
use crate::discovery::{ContentDiscovery, DiscoveryError, Wikipedia};
use crate::fetch::{ContentSource, RetryPolicy, RetryingFetcher};
use crate::utils::{DEFAULT_MAX_RUNNING_JOBS, DEFAULT_PRIORITY_DELAY_MS};

/// Initial capacity for the live job table
const JOB_TABLE_INITIAL_CAPACITY: usize = 16;

/// How often the optional retention sweep runs
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct JobManager {
    jobs: Arc<DashMap<Uuid, Arc<Job>>>,
    running: Arc<AtomicUsize>,
    max_running: usize,
    discovery: ContentDiscovery,
    detection: DetectionRunner,
    priority_delay: Duration,
    retention: Option<Duration>,
}

impl JobManager {
    #[must_use]
    pub fn new(discovery: ContentDiscovery, detection: DetectionRunner) -> Self {
        Self {
            jobs: Arc::new(DashMap::with_capacity(JOB_TABLE_INITIAL_CAPACITY)),
            running: Arc::new(AtomicUsize::new(0)),
            max_running: DEFAULT_MAX_RUNNING_JOBS,
            discovery,
            detection,
            priority_delay: Duration::from_millis(DEFAULT_PRIORITY_DELAY_MS),
            retention: None,
        }
    }

    /// Wire up limiters, fetcher, site and detector from configuration
    pub fn from_config(
        config: &ServiceConfig,
        source: Arc<dyn ContentSource>,
        detector: Arc<dyn Detector>,
    ) -> Self {
        let fetcher = RetryingFetcher::new(
            source,
            ConcurrencyLimiter::new("fetch", config.fetch_concurrency()),
        )
        .with_policy(RetryPolicy {
            max_retries: config.fetch_retries(),
            delay: config.retry_delay(),
        })
        .with_timeout(config.fetch_timeout());

        let site = Wikipedia::new(config.wiki_api_base().clone())
            .with_related_topic_limit(config.related_topic_limit())
            .with_min_image_width(config.min_image_width());

        let detection = DetectionRunner::new(
            detector,
            ConcurrencyLimiter::new("detect", config.detect_concurrency()),
        )
        .with_timeout(config.detect_timeout());

        Self::new(ContentDiscovery::new(fetcher, Arc::new(site)), detection)
            .with_max_running(config.max_running_jobs())
            .with_priority_delay(config.priority_delay())
            .with_retention(config.finished_job_retention())
    }

    #[must_use]
    pub fn with_max_running(mut self, max_running: usize) -> Self {
        self.max_running = max_running.max(1);
        self
    }

    /// Head start given to primary-topic detection before related topics
    #[must_use]
    pub fn with_priority_delay(mut self, delay: Duration) -> Self {
        self.priority_delay = delay;
        self
    }

    /// Drop unpolled terminal jobs after this long (see `start_cleanup_task`)
    #[must_use]
    pub fn with_retention(mut self, retention: Option<Duration>) -> Self {
        self.retention = retention;
        self
    }

    #[must_use]
    pub fn running_jobs(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Jobs in the table, including terminal jobs not yet polled
    #[must_use]
    pub fn live_jobs(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn max_running(&self) -> usize {
        self.max_running
    }

    /// Admit a job and start its pipeline in the background
    ///
    /// Admission is decided before this returns; the returned snapshot is
    /// the job's state at creation.
    ///
    /// # Errors
    /// `MissingTopic` for a blank topic, `Saturated` when the running-job
    /// cap is reached. No job is created in either case.
    pub fn submit(&self, request: JobRequest) -> Result<JobSnapshot, AdmissionError> {
        let topic = request.topic.trim();
        if topic.is_empty() {
            return Err(AdmissionError::MissingTopic);
        }

        let admitted = self
            .running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max_running).then_some(n + 1)
            })
            .is_ok();
        if !admitted {
            warn!(
                "Rejecting job for '{}': {} jobs already running",
                topic, self.max_running
            );
            return Err(AdmissionError::Saturated);
        }

        let job = Arc::new(Job::new());
        self.jobs.insert(job.id(), Arc::clone(&job));
        let snapshot = job.snapshot();

        let request = JobRequest {
            topic: topic.to_string(),
            include_related: request.include_related,
        };
        info!(
            "Accepted job {} for '{}' (related: {}). Running: {}",
            job.id(),
            request.topic,
            request.include_related,
            self.running_jobs()
        );

        self.spawn_pipeline(job, request);
        Ok(snapshot)
    }

    /// Current state of a live job
    ///
    /// A terminal state is returned once and the job is evicted, so the
    /// next poll for the same id returns `None`.
    pub fn poll(&self, id: &str) -> Option<JobSnapshot> {
        let id = Uuid::parse_str(id).ok()?;
        let job = self.jobs.get(&id).map(|entry| Arc::clone(entry.value()))?;

        let snapshot = job.snapshot();
        if snapshot.done && self.jobs.remove(&id).is_some() {
            debug!("Evicted job {id} after terminal read");
        }
        Some(snapshot)
    }

    fn spawn_pipeline(&self, job: Arc<Job>, request: JobRequest) {
        let manager = self.clone();
        tokio::spawn(async move {
            // A panic inside the pipeline surfaces as a JoinError here and
            // still settles the job.
            let pipeline = {
                let manager = manager.clone();
                let job = Arc::clone(&job);
                tokio::spawn(async move { manager.run_pipeline(&job, &request).await })
            };

            let error = match pipeline.await {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(e) => {
                    error!("Pipeline for job {} aborted: {}", job.id(), e);
                    Some(format!("Job aborted: {e}"))
                }
            };

            // Deliberately decremented before `complete`, the reverse of the
            // done-then-decrement order: once a poll sees `done`, the slot is
            // already free and an immediate resubmission is admitted.
            manager.running.fetch_sub(1, Ordering::SeqCst);
            match &error {
                Some(e) => warn!("Job {} failed: {}", job.id(), e),
                None => info!("Job {} finished", job.id()),
            }
            job.complete(error);
        });
    }

    async fn run_pipeline(&self, job: &Job, request: &JobRequest) -> Result<(), DiscoveryError> {
        let primary = self.discovery.discover_primary(&request.topic, job).await?;
        let has_primary = !primary.is_empty();

        let primary_detection = self.detection.detect_all(primary, job);
        let related = async {
            if has_primary {
                tokio::time::sleep(self.priority_delay).await;
            }
            if request.include_related {
                self.expand_related(&request.topic, job).await;
            }
        };

        tokio::join!(primary_detection, related);
        Ok(())
    }

    /// Discover and detect every related topic independently
    ///
    /// Each topic's images go to detection as soon as its own page arrives,
    /// so one slow page does not hold back the others.
    async fn expand_related(&self, topic: &str, job: &Job) {
        let related = match self.discovery.related_topics(topic).await {
            Ok(related) => related,
            Err(e) => {
                warn!("Related topics for '{topic}' unavailable: {e}");
                return;
            }
        };

        join_all(related.iter().map(|name| async move {
            match self.discovery.discover_primary(name, job).await {
                Ok(pairs) if pairs.is_empty() => debug!("No images for related topic '{name}'"),
                Ok(pairs) => {
                    self.detection.detect_all(pairs, job).await;
                }
                Err(_) => debug!("Skipping related topic '{name}'"),
            }
        }))
        .await;
    }

    /// Remove terminal jobs nobody polled within the retention period
    fn cleanup_jobs(&self, retention: Duration) {
        let now = chrono::Utc::now();
        let initial_count = self.jobs.len();

        self.jobs.retain(|id, job| {
            let Some(finished_at) = job.finished_at() else {
                return true;
            };
            let age = now
                .signed_duration_since(finished_at)
                .to_std()
                .unwrap_or(Duration::ZERO);
            let keep = age < retention;
            if !keep {
                debug!("Dropping unpolled job {id} (finished {age:?} ago)");
            }
            keep
        });

        let cleaned = initial_count.saturating_sub(self.jobs.len());
        if cleaned > 0 {
            debug!("Cleaned up {cleaned} finished jobs");
        }
    }

    /// Start the retention sweep when a retention period is configured
    ///
    /// Returns `None` when retention is disabled; terminal jobs are then only
    /// removed by polling them.
    pub fn start_cleanup_task(&self) -> Option<JoinHandle<()>> {
        let retention = self.retention?;
        let manager = self.clone();
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL.min(retention).max(Duration::from_millis(1)));
            loop {
                interval.tick().await;
                manager.cleanup_jobs(retention);
            }
        }))
    }
}
