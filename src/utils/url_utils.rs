//! URL helpers for talking to the content source.
//!
//! Topic titles and image references arrive in the loose forms used by wiki
//! markup; these functions bring them into the shape the fetcher and the
//! detector expect.

/// Convert a topic name into a page title (`"Ada Lovelace"` -> `"Ada_Lovelace"`)
#[must_use]
pub fn topic_title(topic: &str) -> String {
    topic.trim().replace(' ', "_")
}

/// Resolve protocol-relative image sources (`//upload.example/x.jpg`) to https
#[must_use]
pub fn normalize_image_src(src: &str) -> String {
    let src = src.trim();
    if src.starts_with("//") {
        format!("https:{src}")
    } else {
        src.to_string()
    }
}

/// Check if a URL is valid
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match url::Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
        }
        Err(_) => false,
    }
}
