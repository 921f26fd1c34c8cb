//! Per-job progress and result accumulator
//!
//! Every mutation goes through one mutex so concurrent completions for the
//! same job never lose an update, and pollers always see a consistent copy.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use super::types::{JobSnapshot, ProgressSnapshot, TopicResults};
use crate::detect::FaceRecord;

#[derive(Debug, Default)]
struct JobState {
    done: bool,
    error: Option<String>,
    progress: Option<ProgressSnapshot>,
    results: Option<TopicResults>,
    finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct Job {
    id: Uuid,
    state: Mutex<JobState>,
}

impl Job {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: Mutex::new(JobState::default()),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the job reached its terminal state
    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().finished_at
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state.lock().done
    }

    /// Declare `units` more units of work
    pub fn add_work(&self, units: usize) {
        let mut state = self.state.lock();
        let progress = state.progress.get_or_insert_with(ProgressSnapshot::default);
        progress.total += units;
    }

    /// Record one finished unit of work
    ///
    /// A completion that arrives before its `add_work` pulls `total` up so
    /// `completed` never exceeds it.
    pub fn step(&self) {
        let mut state = self.state.lock();
        let progress = state.progress.get_or_insert_with(ProgressSnapshot::default);
        progress.completed += 1;
        if progress.completed > progress.total {
            progress.total = progress.completed;
        }
    }

    /// Store the faces found in `image` under `topic`
    pub fn add_image(&self, topic: &str, image: &str, faces: Vec<FaceRecord>) {
        let mut state = self.state.lock();
        state
            .results
            .get_or_insert_with(TopicResults::new)
            .entry(topic.to_string())
            .or_default()
            .insert(image.to_string(), faces);
    }

    /// Move to the terminal state, optionally with an error
    ///
    /// Idempotent: the first call wins and later calls change nothing.
    pub fn complete(&self, error: Option<String>) {
        let mut state = self.state.lock();
        if state.done {
            return;
        }
        state.error = error;
        state.done = true;
        state.finished_at = Some(Utc::now());
    }

    #[must_use]
    pub fn snapshot(&self) -> JobSnapshot {
        let state = self.state.lock();
        JobSnapshot {
            id: self.id.to_string(),
            done: state.done,
            error: state.error.clone(),
            progress: state.progress,
            data: state.results.clone(),
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}
