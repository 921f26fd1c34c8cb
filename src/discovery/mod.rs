//! Content discovery: topic -> (topic, image) pairs
//!
//! - `site`: `TopicSite`, which knows where a topic's page and link list live
//!   and how to read them
//! - `wikipedia`: the MediaWiki implementation of `TopicSite`
//! - `discoverer`: `ContentDiscovery`, the job-aware driver

pub mod discoverer;
pub mod site;
pub mod wikipedia;

pub use discoverer::{ContentDiscovery, DiscoveryError};
pub use site::{ImagePair, ParseError, TopicSite};
pub use wikipedia::Wikipedia;
