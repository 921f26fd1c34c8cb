//! Content fetching with bounded concurrency and retries
//!
//! - `source`: the `ContentSource` collaborator boundary
//! - `retry`: `RetryingFetcher`, limiter admission plus fixed-delay retries
//! - `http`: reqwest-backed `ContentSource`
//! - `errors`: `FetchError`

pub mod errors;
pub mod http;
pub mod retry;
pub mod source;

pub use errors::FetchError;
pub use http::HttpContentSource;
pub use retry::{RetryPolicy, RetryingFetcher};
pub use source::ContentSource;
