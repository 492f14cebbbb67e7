//! DOM-inspection strategy: read media URLs straight off `<video>` and
//! `<img>` elements in the snapshot.
//!
//! Purely local, no network. A `blob:` src is browser-internal and not
//! fetchable, so it is detected and deferred to the HTML-scan strategy
//! further down the cascade.

use crate::core::error::ResolveError;
use crate::patterns;
use crate::probe;
use crate::resolve::strategy::{ResolveContext, ResolveStrategy};
use crate::types::{MediaResult, MediaType, PageSnapshot};
use async_trait::async_trait;
use select::predicate::Name;

pub struct DomStrategy;

/// Pick the max-width candidate out of a `srcset` attribute.
///
/// Candidates without a width descriptor count as width 0, so any
/// described candidate beats them.
pub fn pick_max_srcset(srcset: &str) -> Option<(String, u32)> {
    let mut best: Option<(String, u32)> = None;
    for candidate in srcset.split(',') {
        let mut parts = candidate.split_whitespace();
        let Some(url) = parts.next() else { continue };
        let width = parts
            .next()
            .and_then(|d| d.strip_suffix('w'))
            .and_then(|d| d.parse::<u32>().ok())
            .unwrap_or(0);
        match &best {
            Some((_, best_width)) if *best_width >= width => {}
            _ => best = Some((url.to_string(), width)),
        }
    }
    best
}

/// Best-effort key for the container, used by the result cache: first
/// video src (blob included; blob URLs are stable within a page
/// session), then poster, then largest image.
pub(crate) fn container_media_key(page: &PageSnapshot) -> Option<String> {
    let doc = page.document();
    for video in doc.find(Name("video")) {
        if let Some(src) = video.attr("src").filter(|s| !s.is_empty()) {
            return Some(src.to_string());
        }
        if let Some(poster) = video.attr("poster").filter(|s| !s.is_empty()) {
            return Some(poster.to_string());
        }
    }
    largest_image(page).map(|(url, _)| url)
}

/// Largest `<img>` in the container, by srcset width descriptor.
fn largest_image(page: &PageSnapshot) -> Option<(String, u32)> {
    let doc = page.document();
    let mut best: Option<(String, u32)> = None;
    for img in doc.find(Name("img")) {
        let candidate = if let Some(srcset) = img.attr("srcset") {
            pick_max_srcset(srcset)
        } else {
            img.attr("src")
                .filter(|s| !s.is_empty() && !s.starts_with("data:"))
                .map(|s| (s.to_string(), 0))
        };
        if let Some((url, width)) = candidate {
            match &best {
                Some((_, best_width)) if *best_width >= width => {}
                _ => best = Some((url, width)),
            }
        }
    }
    best
}

/// Synchronous inspection; the `Document` must never cross an await.
fn inspect(page: &PageSnapshot, media_index: usize) -> Result<Option<MediaResult>, ResolveError> {
    let doc = page.document();

    let mut saw_blob = false;
    let mut saw_any = false;

    for video in doc.find(Name("video")) {
        saw_any = true;
        if let Some(src) = video.attr("src").filter(|s| !s.is_empty()) {
            if src.starts_with("blob:") {
                // Browser-internal URL; only the HTML scan can recover
                // the real CDN location.
                saw_blob = true;
                continue;
            }
            return Ok(Some(MediaResult {
                url: src.to_string(),
                media_index,
                media_type: MediaType::Video,
            }));
        }
        for attr in patterns::MEDIA_DATA_ATTRS {
            if let Some(url) = video.attr(attr).filter(|s| !s.is_empty()) {
                return Ok(Some(MediaResult {
                    url: url.to_string(),
                    media_index,
                    media_type: probe::guess_media_type_from_url(url).unwrap_or(MediaType::Video),
                }));
            }
        }
    }

    if saw_blob {
        log::debug!("only blob: video source in container, deferring to HTML scan");
        return Ok(None);
    }

    if let Some((url, width)) = largest_image(page) {
        log::debug!("picked image candidate ({}w): {}", width, url);
        return Ok(Some(MediaResult {
            media_type: probe::guess_media_type_from_url(&url).unwrap_or(MediaType::Image),
            url,
            media_index,
        }));
    }

    if saw_any {
        Err(ResolveError::NotFound("video element with no usable source".to_string()))
    } else {
        Err(ResolveError::NotFound("no media elements in container".to_string()))
    }
}

#[async_trait]
impl ResolveStrategy for DomStrategy {
    fn name(&self) -> &'static str {
        "dom"
    }

    async fn attempt(&self, cx: &ResolveContext<'_>) -> Result<Option<MediaResult>, ResolveError> {
        inspect(cx.page, cx.media_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use url::Url;

    fn snapshot(html: &str) -> PageSnapshot {
        PageSnapshot::new(Url::parse("https://www.instagram.com/p/ABC/").unwrap(), html)
    }

    #[test]
    fn test_pick_max_srcset() {
        let picked = pick_max_srcset("a.jpg 480w, b.jpg 1080w").unwrap();
        assert_eq!(picked, ("b.jpg".to_string(), 1080));
    }

    #[test]
    fn test_pick_max_srcset_unordered() {
        let picked = pick_max_srcset("c.jpg 1440w, a.jpg 480w, b.jpg 1080w").unwrap();
        assert_eq!(picked.0, "c.jpg");
    }

    #[test]
    fn test_pick_max_srcset_no_descriptors() {
        let picked = pick_max_srcset("a.jpg").unwrap();
        assert_eq!(picked, ("a.jpg".to_string(), 0));
    }

    #[test]
    fn test_pick_max_srcset_empty() {
        assert_eq!(pick_max_srcset(""), None);
    }

    #[test]
    fn test_inspect_video_src() {
        let page = snapshot(r#"<article><video src="https://cdn.example/v.mp4"></video></article>"#);
        let result = inspect(&page, 0).unwrap().unwrap();
        assert_eq!(result.url, "https://cdn.example/v.mp4");
        assert_eq!(result.media_type, MediaType::Video);
    }

    #[test]
    fn test_inspect_blob_defers() {
        let page = snapshot(r#"<article><video src="blob:https://www.instagram.com/abc-123"></video></article>"#);
        assert_eq!(inspect(&page, 0).unwrap(), None);
    }

    #[test]
    fn test_inspect_data_attr() {
        let page = snapshot(r#"<article><video data-video-url="https://cdn.example/v.mp4"></video></article>"#);
        let result = inspect(&page, 0).unwrap().unwrap();
        assert_eq!(result.url, "https://cdn.example/v.mp4");
        assert_eq!(result.media_type, MediaType::Video);
    }

    #[test]
    fn test_inspect_image_srcset_max_width_wins() {
        let page = snapshot(
            r#"<article><img srcset="https://cdn.example/a.jpg 480w, https://cdn.example/b.jpg 1080w"></article>"#,
        );
        let result = inspect(&page, 0).unwrap().unwrap();
        assert_eq!(result.url, "https://cdn.example/b.jpg");
        assert_eq!(result.media_type, MediaType::Image);
    }

    #[test]
    fn test_inspect_prefers_larger_of_multiple_images() {
        let page = snapshot(
            r#"<article>
                <img srcset="https://cdn.example/avatar.jpg 150w">
                <img srcset="https://cdn.example/photo.jpg 1440w">
            </article>"#,
        );
        let result = inspect(&page, 0).unwrap().unwrap();
        assert_eq!(result.url, "https://cdn.example/photo.jpg");
    }

    #[test]
    fn test_inspect_skips_data_uri_images() {
        let page = snapshot(r#"<article><img src="data:image/png;base64,AAAA"></article>"#);
        assert!(inspect(&page, 0).is_err());
    }

    #[test]
    fn test_inspect_nothing_found() {
        let page = snapshot("<article><p>caption only</p></article>");
        let err = inspect(&page, 0).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_container_media_key_prefers_video_src() {
        let page = snapshot(
            r#"<article>
                <video src="blob:abc" poster="https://cdn.example/poster.jpg"></video>
                <img src="https://cdn.example/i.jpg">
            </article>"#,
        );
        assert_eq!(container_media_key(&page), Some("blob:abc".to_string()));
    }

    #[test]
    fn test_container_media_key_poster_fallback() {
        let page = snapshot(r#"<article><video poster="https://cdn.example/poster.jpg"></video></article>"#);
        assert_eq!(container_media_key(&page), Some("https://cdn.example/poster.jpg".to_string()));
    }
}
