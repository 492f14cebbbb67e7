//! Core data types shared across the resolution cascade.

use select::document::Document;
use serde::Serialize;
use url::Url;

/// Classification of the container a resolution call starts from.
///
/// Derived per call from the page URL and container markup, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaContext {
    Post,
    Story,
    Reel,
}

impl MediaContext {
    /// Classify a snapshot by page path first, container markup second.
    ///
    /// Posts render inside an `<article>`, stories inside a bare `<section>`,
    /// and reels are recognized by their page path alone. Defaults to `Post`
    /// when nothing matches; a wrong default degrades to the DOM fallback
    /// strategies rather than failing outright.
    pub fn classify(page: &PageSnapshot) -> Self {
        let path = page.url().path();
        if path.starts_with("/stories/") {
            return MediaContext::Story;
        }
        if path.starts_with("/reel/") || path.starts_with("/reels/") {
            return MediaContext::Reel;
        }

        let doc = page.document();
        if doc.find(select::predicate::Name("article")).next().is_some() {
            return MediaContext::Post;
        }
        if doc.find(select::predicate::Name("section")).next().is_some() {
            return MediaContext::Story;
        }

        log::debug!("no container markup matched for {}, assuming post", page.url());
        MediaContext::Post
    }
}

/// Kind of the resolved artifact.
///
/// `Unknown` only appears transiently: signed CDN URLs carry no extension,
/// so a strategy may emit `Unknown` and leave disambiguation to the
/// extension guess / HEAD probe in the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Image,
    Unknown,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Image => "image",
            MediaType::Unknown => "unknown",
        }
    }
}

/// Identifier pair needed to query the private info API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    /// Instagram's internal numeric identifier for the media object.
    pub media_id: String,
    /// Session application identifier sent as `X-IG-App-ID`.
    pub app_id: String,
}

/// The resolved artifact, returned to the caller and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaResult {
    /// Direct CDN URL of the playable media.
    pub url: String,
    /// Carousel / story segment index this URL was resolved for.
    pub media_index: usize,
    /// Video or image; `unknown` if both the extension guess and the
    /// HEAD probe came up empty.
    pub media_type: MediaType,
}

/// Snapshot of the page a resolution starts from: the page URL plus the
/// container's HTML.
///
/// This is the standalone stand-in for "a DOM node somewhere inside a
/// post": callers hand over whatever HTML they have (a fetched page, a
/// serialized container subtree) and the cascade scrapes it.
///
/// The HTML is kept as a string and parsed on demand: `select`'s
/// `Document` is not `Send`, so it must never be held across an await
/// point. All inspection happens in synchronous helpers.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    url: Url,
    html: String,
}

impl PageSnapshot {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self { url, html: html.into() }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Parse the snapshot HTML. Cheap enough to do per inspection; do not
    /// hold the returned `Document` across an await.
    pub fn document(&self) -> Document {
        Document::from(self.html.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(url: &str, html: &str) -> PageSnapshot {
        PageSnapshot::new(Url::parse(url).unwrap(), html)
    }

    #[test]
    fn test_classify_story_by_path() {
        let page = snapshot("https://www.instagram.com/stories/someuser/123/", "<div></div>");
        assert_eq!(MediaContext::classify(&page), MediaContext::Story);
    }

    #[test]
    fn test_classify_reel_by_path() {
        let page = snapshot("https://www.instagram.com/reel/ABC123/", "<article></article>");
        assert_eq!(MediaContext::classify(&page), MediaContext::Reel);
    }

    #[test]
    fn test_classify_post_by_article() {
        let page = snapshot(
            "https://www.instagram.com/p/ABC123/",
            "<article><video src=\"x\"></video></article>",
        );
        assert_eq!(MediaContext::classify(&page), MediaContext::Post);
    }

    #[test]
    fn test_classify_story_by_section() {
        let page = snapshot("https://www.instagram.com/", "<section><video></video></section>");
        assert_eq!(MediaContext::classify(&page), MediaContext::Story);
    }

    #[test]
    fn test_classify_defaults_to_post() {
        let page = snapshot("https://www.instagram.com/", "<div></div>");
        assert_eq!(MediaContext::classify(&page), MediaContext::Post);
    }

    #[test]
    fn test_media_type_serializes_lowercase() {
        let result = MediaResult {
            url: "https://cdn.example/x.mp4".to_string(),
            media_index: 0,
            media_type: MediaType::Video,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["media_type"], "video");
    }
}
