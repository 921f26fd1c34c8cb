//! Test utilities shared by the integration tests
//!
//! `MockSource` answers MediaWiki-shaped URLs from an in-memory table and
//! `MockDetector` stands in for the face detector. Both record every call
//! with a timestamp and can be told to fail.

#![allow(dead_code)]

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use topic_faces::config::ServiceConfigBuilder;
use topic_faces::{
    ContentSource, DetectError, Detector, FetchError, JobManager, JobSnapshot,
    RawFaceAnnotation, ServiceConfig,
};
use url::Url;

/// Rendered page JSON with `n` images wide enough to be analysed
pub fn wiki_page_json(topic: &str, n: usize) -> String {
    let html: String = (0..n)
        .map(|i| format!(r#"<p><img src="{}" width="200"/></p>"#, image_url(topic, i)))
        .collect();
    serde_json::json!({ "parse": { "title": topic, "pageid": 1, "text": html } }).to_string()
}

/// Link list JSON naming `titles`
pub fn wiki_links_json(topic: &str, titles: &[&str]) -> String {
    let links: Vec<_> = titles
        .iter()
        .map(|t| serde_json::json!({ "ns": 0, "title": t }))
        .collect();
    serde_json::json!({
        "query": { "pages": { "4770341": { "pageid": 4770341, "ns": 0, "title": topic, "links": links } } }
    })
    .to_string()
}

/// URL of the `i`-th image `wiki_page_json` puts on `topic`'s page
pub fn image_url(topic: &str, i: usize) -> String {
    format!("http://test.com/{}/img{i}", topic.replace(' ', "_"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Page,
    Links,
}

#[derive(Debug, Clone)]
pub struct SourceCall {
    pub kind: CallKind,
    pub topic: String,
    pub at: Instant,
}

fn key(kind: CallKind, topic: &str) -> (CallKind, String) {
    (kind, topic.replace(' ', "_"))
}

/// In-memory content source keyed by (kind, title)
#[derive(Default)]
pub struct MockSource {
    bodies: Mutex<HashMap<(CallKind, String), String>>,
    failures: Mutex<HashMap<(CallKind, String), u32>>,
    calls: Mutex<Vec<SourceCall>>,
    latency: Duration,
    page_latency: HashMap<String, Duration>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Extra delay on every page fetch for `topic`, on top of `with_latency`
    pub fn with_page_latency(mut self, topic: &str, latency: Duration) -> Self {
        self.page_latency.insert(key(CallKind::Page, topic).1, latency);
        self
    }

    pub fn with_page(self, topic: &str, images: usize) -> Self {
        self.with_page_body(topic, wiki_page_json(topic, images))
    }

    pub fn with_page_body(self, topic: &str, body: impl Into<String>) -> Self {
        self.bodies.lock().insert(key(CallKind::Page, topic), body.into());
        self
    }

    pub fn with_links(self, topic: &str, titles: &[&str]) -> Self {
        self.bodies
            .lock()
            .insert(key(CallKind::Links, topic), wiki_links_json(topic, titles));
        self
    }

    /// The next `times` page fetches for `topic` fail
    pub fn fail_page(self, topic: &str, times: u32) -> Self {
        self.failures.lock().insert(key(CallKind::Page, topic), times);
        self
    }

    pub fn fail_links(self, topic: &str, times: u32) -> Self {
        self.failures.lock().insert(key(CallKind::Links, topic), times);
        self
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, kind: CallKind, topic: &str) -> usize {
        let topic = topic.replace(' ', "_");
        self.calls
            .lock()
            .iter()
            .filter(|c| c.kind == kind && c.topic == topic)
            .count()
    }

    async fn respond(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::request(url, e.to_string()))?;
        let param = |name: &str| {
            parsed
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };
        let (kind, topic) = match (param("action").as_deref(), param("page"), param("titles")) {
            (Some("parse"), Some(page), _) => (CallKind::Page, page),
            (Some("query"), _, Some(titles)) => (CallKind::Links, titles),
            _ => return Err(FetchError::request(url, "unroutable test URL")),
        };

        self.calls.lock().push(SourceCall {
            kind,
            topic: topic.clone(),
            at: Instant::now(),
        });

        let k = key(kind, &topic);
        let extra = match kind {
            CallKind::Page => self.page_latency.get(&k.1).copied().unwrap_or_default(),
            CallKind::Links => Duration::ZERO,
        };
        let latency = self.latency + extra;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        {
            let mut failures = self.failures.lock();
            if let Some(remaining) = failures.get_mut(&k) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::request(url, "Request failed with status code 500"));
                }
            }
        }

        self.bodies
            .lock()
            .get(&k)
            .cloned()
            .ok_or_else(|| FetchError::request(url, "Request failed with status code 404"))
    }
}

impl ContentSource for MockSource {
    fn fetch<'a>(&'a self, url: &'a str, _timeout: Duration) -> BoxFuture<'a, Result<String, FetchError>> {
        self.respond(url).boxed()
    }
}

/// Counts a detector call as in flight until dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misbehave {
    Fail,
    Panic,
}

/// Detector returning canned faces after a fixed latency
#[derive(Default)]
pub struct MockDetector {
    latency: Duration,
    faces: Mutex<HashMap<String, Vec<RawFaceAnnotation>>>,
    misbehaving: Mutex<HashMap<String, Misbehave>>,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_faces(self, image: &str, faces: Vec<RawFaceAnnotation>) -> Self {
        self.faces.lock().insert(image.to_string(), faces);
        self
    }

    pub fn failing(self, image: &str, how: Misbehave) -> Self {
        self.misbehaving.lock().insert(image.to_string(), how);
        self
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Most calls ever in flight at once
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn run(&self, image_url: &str) -> Result<Vec<RawFaceAnnotation>, DetectError> {
        self.calls.lock().push((image_url.to_string(), Instant::now()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let misbehave = self.misbehaving.lock().get(image_url).copied();
        match misbehave {
            Some(Misbehave::Panic) => panic!("detector blew up on {image_url}"),
            Some(Misbehave::Fail) => Err(DetectError::Request {
                image: image_url.to_string(),
                reason: "status code 500".to_string(),
            }),
            None => Ok(self.faces.lock().get(image_url).cloned().unwrap_or_default()),
        }
    }
}

impl Detector for MockDetector {
    fn detect<'a>(
        &'a self,
        image_url: &'a str,
        _timeout: Duration,
    ) -> BoxFuture<'a, Result<Vec<RawFaceAnnotation>, DetectError>> {
        self.run(image_url).boxed()
    }
}

pub fn face(joy: &str, sorrow: &str, anger: &str, surprise: &str) -> RawFaceAnnotation {
    RawFaceAnnotation {
        joy_likelihood: Some(joy.to_string()),
        sorrow_likelihood: Some(sorrow.to_string()),
        anger_likelihood: Some(anger.to_string()),
        surprise_likelihood: Some(surprise.to_string()),
    }
}

/// Defaults with short delays so tests run quickly
pub fn test_config() -> ServiceConfigBuilder {
    ServiceConfig::builder()
        .retry_delay(Duration::from_millis(5))
        .priority_delay(Duration::from_millis(20))
}

pub fn manager(
    config: ServiceConfigBuilder,
    source: &Arc<MockSource>,
    detector: &Arc<MockDetector>,
) -> JobManager {
    let config = config.build().expect("test config is valid");
    JobManager::from_config(&config, source.clone(), detector.clone())
}

/// Poll until the job is terminal and return that (evicting) snapshot
pub async fn wait_for_done(manager: &JobManager, id: &str) -> JobSnapshot {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let snapshot = manager.poll(id).expect("job should still be live");
        if snapshot.done {
            return snapshot;
        }
        assert!(Instant::now() < deadline, "job {id} did not finish in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
