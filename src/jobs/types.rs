//! Job wire types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::detect::FaceRecord;

/// image URL -> faces found in it, per topic
pub type TopicResults = BTreeMap<String, BTreeMap<String, Vec<FaceRecord>>>;

/// A request to analyse a topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub topic: String,
    pub include_related: bool,
}

impl JobRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            include_related: false,
        }
    }

    #[must_use]
    pub fn with_related(mut self, include_related: bool) -> Self {
        self.include_related = include_related;
        self
    }
}

/// Units of work finished out of units discovered so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(rename = "done")]
    pub completed: usize,
    pub total: usize,
}

/// Point-in-time copy of a job, as returned to pollers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: String,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TopicResults>,
}

impl JobSnapshot {
    /// Terminal shape returned for refused submissions
    ///
    /// No job is created; the id is fresh so every response carries one.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            done: true,
            error: Some(message.into()),
            progress: None,
            data: None,
        }
    }

    /// Faces recorded for one image, if that image has been processed
    #[must_use]
    pub fn faces(&self, topic: &str, image: &str) -> Option<&[FaceRecord]> {
        self.data
            .as_ref()?
            .get(topic)?
            .get(image)
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_omitted() {
        let snapshot = JobSnapshot {
            id: "abc".into(),
            done: false,
            error: None,
            progress: None,
            data: None,
        };
        assert_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            serde_json::json!({ "id": "abc", "done": false })
        );
    }

    #[test]
    fn test_progress_wire_name() {
        let progress = ProgressSnapshot { completed: 2, total: 5 };
        assert_eq!(
            serde_json::to_value(progress).unwrap(),
            serde_json::json!({ "done": 2, "total": 5 })
        );
    }

    #[test]
    fn test_rejected_is_terminal() {
        let snapshot = JobSnapshot::rejected("No topic provided");
        assert!(snapshot.done);
        assert_eq!(snapshot.error.as_deref(), Some("No topic provided"));
        assert!(Uuid::parse_str(&snapshot.id).is_ok());
    }
}
