// Topic face analysis service
//
// Serves the job API (and the frontend build, when present) over HTTP.
// Configuration comes from TOPIC_FACES_* environment variables.

use anyhow::{Context, Result};
use std::sync::Arc;
use topic_faces::utils::USER_AGENT;
use topic_faces::{HttpContentSource, JobManager, ServiceConfig, VisionDetector};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("hyper", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Off)
        .init();

    let config = ServiceConfig::from_env().context("Invalid configuration")?;

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;

    if config.vision_api_key().is_none() {
        log::warn!("TOPIC_FACES_VISION_API_KEY is not set; face detection requests will fail");
    }

    let source = Arc::new(HttpContentSource::with_client(client.clone()));
    let detector = Arc::new(VisionDetector::new(
        client,
        config.vision_endpoint().as_str(),
        config.vision_api_key().map(str::to_string),
    ));

    let manager = JobManager::from_config(&config, source, detector);
    if manager.start_cleanup_task().is_some() {
        log::info!("Dropping unpolled jobs after {:?}", config.finished_job_retention());
    }

    log::info!(
        "Running up to {} jobs, {} fetch slots, {} detection slots",
        config.max_running_jobs(),
        config.fetch_concurrency(),
        config.detect_concurrency()
    );

    topic_faces::http::serve(&config, manager).await
}
