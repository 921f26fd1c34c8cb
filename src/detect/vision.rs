//! Cloud Vision face detector
//!
//! Sends one `images:annotate` request per image with the `FACE_DETECTION`
//! feature and hands back the raw face annotations.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::detector::{DetectError, Detector};
use super::likelihood::RawFaceAnnotation;

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    face_annotations: Vec<RawFaceAnnotation>,
    #[serde(default)]
    error: Option<StatusMessage>,
}

#[derive(Debug, Deserialize)]
struct StatusMessage {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct VisionDetector {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl VisionDetector {
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    async fn annotate(
        &self,
        image_url: &str,
        timeout: Duration,
    ) -> Result<Vec<RawFaceAnnotation>, DetectError> {
        let body = json!({
            "requests": [{
                "image": { "source": { "imageUri": image_url } },
                "features": [{ "type": "FACE_DETECTION" }]
            }]
        });

        let mut request = self.client.post(&self.endpoint).timeout(timeout).json(&body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DetectError::Timeout {
                    image: image_url.to_string(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }
            } else {
                DetectError::Request {
                    image: image_url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectError::Request {
                image: image_url.to_string(),
                reason: format!("status code {}", status.as_u16()),
            });
        }

        let parsed: AnnotateResponse = response.json().await.map_err(|e| DetectError::Malformed {
            image: image_url.to_string(),
            reason: e.to_string(),
        })?;

        let Some(first) = parsed.responses.into_iter().next() else {
            return Ok(Vec::new());
        };
        if let Some(error) = first.error {
            return Err(DetectError::Request {
                image: image_url.to_string(),
                reason: error.message,
            });
        }
        Ok(first.face_annotations)
    }
}

impl Detector for VisionDetector {
    fn detect<'a>(
        &'a self,
        image_url: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<Vec<RawFaceAnnotation>, DetectError>> {
        self.annotate(image_url, timeout).boxed()
    }
}
