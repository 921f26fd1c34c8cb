//! MediaWiki `TopicSite`
//!
//! Pages come from `action=parse` (rendered HTML inside JSON), related topics
//! from `action=query&prop=links`. Images count only when their declared
//! width exceeds the configured minimum.

use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use super::site::{ParseError, TopicSite};
use crate::utils::{
    DEFAULT_MIN_IMAGE_WIDTH, DEFAULT_RELATED_TOPIC_LIMIT, is_valid_url, normalize_image_src,
    topic_title,
};

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("BUG: hardcoded CSS selector 'img' is invalid"));

#[derive(Debug, Clone)]
pub struct Wikipedia {
    api_base: Url,
    related_topic_limit: usize,
    min_image_width: u32,
}

impl Wikipedia {
    #[must_use]
    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            related_topic_limit: DEFAULT_RELATED_TOPIC_LIMIT,
            min_image_width: DEFAULT_MIN_IMAGE_WIDTH,
        }
    }

    #[must_use]
    pub fn with_related_topic_limit(mut self, limit: usize) -> Self {
        self.related_topic_limit = limit;
        self
    }

    #[must_use]
    pub fn with_min_image_width(mut self, width: u32) -> Self {
        self.min_image_width = width;
        self
    }

    fn api_url(&self, params: &[(&str, &str)]) -> String {
        let mut url = self.api_base.clone();
        url.query_pairs_mut().extend_pairs(params);
        url.into()
    }
}

/// Leading integer of an HTML width attribute (`"220"`, `"220px"`)
fn declared_width(raw: &str) -> Option<u32> {
    let digits: String = raw.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

impl TopicSite for Wikipedia {
    fn page_url(&self, topic: &str) -> String {
        let title = topic_title(topic);
        self.api_url(&[
            ("action", "parse"),
            ("page", &title),
            ("prop", "text"),
            ("formatversion", "2"),
            ("format", "json"),
            ("origin", "*"),
        ])
    }

    fn links_url(&self, topic: &str) -> String {
        let title = topic_title(topic);
        let limit = self.related_topic_limit.to_string();
        self.api_url(&[
            ("origin", "*"),
            ("prop", "links"),
            ("pllimit", &limit),
            ("action", "query"),
            ("format", "json"),
            ("titles", &title),
        ])
    }

    fn image_refs(&self, body: &str) -> Result<Vec<String>, ParseError> {
        let payload: Value =
            serde_json::from_str(body).map_err(|e| ParseError(format!("invalid page JSON: {e}")))?;

        if let Some(info) = payload.pointer("/error/info").and_then(Value::as_str) {
            return Err(ParseError(format!("content source error: {info}")));
        }

        let html = match payload.pointer("/parse/text") {
            Some(Value::String(html)) => html.as_str(),
            // formatversion=1 wraps the HTML as {"*": "..."}
            Some(Value::Object(wrapped)) => wrapped.get("*").and_then(Value::as_str).unwrap_or_default(),
            _ => return Err(ParseError("page payload has no parse.text".to_string())),
        };

        let document = Html::parse_fragment(html);
        let mut seen = HashSet::new();
        let mut images = Vec::new();

        for element in document.select(&IMG_SELECTOR) {
            let element = element.value();
            let Some(src) = element.attr("src").filter(|s| !s.trim().is_empty()) else {
                continue;
            };
            let wide_enough = element
                .attr("width")
                .and_then(declared_width)
                .is_some_and(|w| w > self.min_image_width);
            if !wide_enough {
                continue;
            }
            let src = normalize_image_src(src);
            if is_valid_url(&src) && seen.insert(src.clone()) {
                images.push(src);
            }
        }

        Ok(images)
    }

    fn related_topics(&self, body: &str) -> Result<Vec<String>, ParseError> {
        let payload: Value = serde_json::from_str(body)
            .map_err(|e| ParseError(format!("invalid link list JSON: {e}")))?;

        let pages = payload
            .pointer("/query/pages")
            .and_then(Value::as_object)
            .ok_or_else(|| ParseError("link list payload has no query.pages".to_string()))?;

        let Some(page) = pages.values().next() else {
            return Ok(Vec::new());
        };

        let topics = page
            .get("links")
            .and_then(Value::as_array)
            .map(|links| {
                links
                    .iter()
                    .filter_map(|link| link.get("title").and_then(Value::as_str))
                    .take(self.related_topic_limit)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Wikipedia {
        Wikipedia::new(Url::parse("https://en.wikipedia.org/w/api.php").unwrap())
    }

    fn page(html: &str) -> String {
        serde_json::json!({ "parse": { "title": "Test", "pageid": 1, "text": html } }).to_string()
    }

    #[test]
    fn test_page_url_encodes_title() {
        let url = Url::parse(&site().page_url("Ada Lovelace")).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("action".into(), "parse".into())));
        assert!(pairs.contains(&("page".into(), "Ada_Lovelace".into())));
        assert!(pairs.contains(&("formatversion".into(), "2".into())));
    }

    #[test]
    fn test_links_url_carries_limit() {
        let url = Url::parse(&site().with_related_topic_limit(7).links_url("Rust")).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("prop".into(), "links".into())));
        assert!(pairs.contains(&("pllimit".into(), "7".into())));
        assert!(pairs.contains(&("titles".into(), "Rust".into())));
    }

    #[test]
    fn test_image_refs_filter_by_width() {
        let html = r#"
            <img src="http://test.com/big.jpg" width="200"/>
            <img src="http://test.com/small.jpg" width="50"/>
            <img src="http://test.com/edge.jpg" width="100"/>
            <img src="http://test.com/nowidth.jpg"/>
            <img src="//upload.example.org/rel.jpg" width="220px"/>
            <img width="300"/>
        "#;
        let images = site().image_refs(&page(html)).unwrap();
        assert_eq!(
            images,
            vec!["http://test.com/big.jpg", "https://upload.example.org/rel.jpg"]
        );
    }

    #[test]
    fn test_image_refs_deduplicate_in_page_order() {
        let html = r#"<img src="http://a/1" width="200"/><img src="http://a/2" width="200"/><img src="http://a/1" width="200"/>"#;
        assert_eq!(site().image_refs(&page(html)).unwrap(), vec!["http://a/1", "http://a/2"]);
    }

    #[test]
    fn test_image_refs_rejects_non_page_payloads() {
        assert!(site().image_refs("not json").is_err());
        assert!(site().image_refs(r#"{"query":{}}"#).is_err());
        assert!(site()
            .image_refs(r#"{"error":{"code":"missingtitle","info":"The page you specified doesn't exist."}}"#)
            .is_err());
    }

    #[test]
    fn test_related_topics_reads_first_page_links() {
        let body = r#"{"query":{"pages":{"4770341":{"pageid":4770341,"title":"David Tepper","links":[{"ns":0,"title":"1987 stock market crash"},{"ns":0,"title":"1995 NFL expansion draft"}]}}}}"#;
        assert_eq!(
            site().related_topics(body).unwrap(),
            vec!["1987 stock market crash", "1995 NFL expansion draft"]
        );
    }

    #[test]
    fn test_related_topics_bounded_and_tolerates_missing_links() {
        let links: Vec<_> = (0..15).map(|i| serde_json::json!({ "title": format!("T{i}") })).collect();
        let body = serde_json::json!({ "query": { "pages": { "1": { "links": links } } } }).to_string();
        assert_eq!(site().related_topics(&body).unwrap().len(), 10);

        let empty = r#"{"query":{"pages":{"-1":{"title":"Nothing","missing":""}}}}"#;
        assert!(site().related_topics(empty).unwrap().is_empty());
    }
}
