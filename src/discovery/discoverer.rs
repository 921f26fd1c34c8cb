//! Job-aware discovery driver
//!
//! Primary discovery registers one unit of work on the job and completes it
//! whether or not the page could be fetched. Related discovery fans out over
//! the linked topics concurrently; a failing related topic is logged and
//! contributes nothing.

use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;

use super::site::{ImagePair, ParseError, TopicSite};
use crate::fetch::{FetchError, RetryingFetcher};
use crate::jobs::Job;

#[derive(Debug, Clone, thiserror::Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Could not read content for '{topic}': {source}")]
    Parse {
        topic: String,
        #[source]
        source: ParseError,
    },
}

#[derive(Clone)]
pub struct ContentDiscovery {
    fetcher: RetryingFetcher,
    site: Arc<dyn TopicSite>,
}

impl ContentDiscovery {
    pub fn new(fetcher: RetryingFetcher, site: Arc<dyn TopicSite>) -> Self {
        Self { fetcher, site }
    }

    /// Image pairs on `topic`'s own page
    ///
    /// Adds one unit of work to `job` before fetching and steps it once the
    /// fetch has either produced pairs or failed for good.
    pub async fn discover_primary(
        &self,
        topic: &str,
        job: &Job,
    ) -> Result<Vec<ImagePair>, DiscoveryError> {
        job.add_work(1);
        let result = self.fetch_pairs(topic).await;
        job.step();

        match &result {
            Ok(pairs) => debug!("Discovered {} images for '{}'", pairs.len(), topic),
            Err(e) => warn!("Discovery failed for '{}': {}", topic, e),
        }
        result
    }

    /// Topics linked from `topic`, capped by the site's related-topic limit
    pub async fn related_topics(&self, topic: &str) -> Result<Vec<String>, DiscoveryError> {
        let body = self.fetcher.fetch(&self.site.links_url(topic)).await?;
        let related = self
            .site
            .related_topics(&body)
            .map_err(|source| DiscoveryError::Parse {
                topic: topic.to_string(),
                source,
            })?;

        info!("Expanding '{}' into {} related topics", topic, related.len());
        Ok(related)
    }

    /// Image pairs from every topic linked from `topic`
    ///
    /// Only a failure to read the link list itself is an error. Each related
    /// topic runs `discover_primary` concurrently and failures are dropped.
    /// Resolves once every related page has settled; use `related_topics`
    /// with `discover_primary` to act on each page as it arrives.
    pub async fn discover_related(
        &self,
        topic: &str,
        job: &Job,
    ) -> Result<Vec<ImagePair>, DiscoveryError> {
        let related = self.related_topics(topic).await?;

        let results = join_all(related.iter().map(|r| self.discover_primary(r, job))).await;

        Ok(results
            .into_iter()
            .zip(&related)
            .filter_map(|(result, name)| match result {
                Ok(pairs) => Some(pairs),
                Err(_) => {
                    debug!("Skipping related topic '{}'", name);
                    None
                }
            })
            .flatten()
            .collect())
    }

    async fn fetch_pairs(&self, topic: &str) -> Result<Vec<ImagePair>, DiscoveryError> {
        let body = self.fetcher.fetch(&self.site.page_url(topic)).await?;
        let images = self
            .site
            .image_refs(&body)
            .map_err(|source| DiscoveryError::Parse {
                topic: topic.to_string(),
                source,
            })?;
        Ok(images
            .into_iter()
            .map(|image| ImagePair::new(topic, image))
            .collect())
    }
}
