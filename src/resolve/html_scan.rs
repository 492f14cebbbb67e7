//! Last-resort strategy: fetch the post permalink and regex-scan the raw
//! HTML for CDN URLs.
//!
//! Blob-backed videos never expose their CDN location in the DOM, but the
//! server-rendered permalink HTML embeds it inside inline JSON. The scan
//! is anchored near the video's poster filename when one is available, so
//! multi-video pages resolve the right clip.

use crate::core::config;
use crate::core::error::ResolveError;
use crate::ident;
use crate::patterns;
use crate::resolve::strategy::{ResolveContext, ResolveStrategy};
use crate::types::{MediaResult, MediaType, PageSnapshot};
use async_trait::async_trait;
use select::predicate::{Attr, Name, Predicate};

pub struct HtmlScanStrategy;

/// Filename stem of the container's video poster, used to anchor the
/// scan window. `https://cdn.example/x/ABC123_n.jpg?sig=1` -> `ABC123_n`.
fn poster_stem(page: &PageSnapshot) -> Option<String> {
    let doc = page.document();
    let poster = doc
        .find(Name("video"))
        .find_map(|v| v.attr("poster").filter(|p| !p.is_empty()).map(|p| p.to_string()))?;
    let path = poster.split(['?', '#']).next().unwrap_or(&poster);
    let file = path.rsplit('/').next()?;
    let stem = file.split('.').next().unwrap_or(file);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

fn og_content(html: &str, property: &str) -> Option<String> {
    let doc = select::document::Document::from(html);
    doc.find(Name("meta").and(Attr("property", property)))
        .find_map(|node| node.attr("content").filter(|c| !c.is_empty()).map(|c| c.to_string()))
}

/// Scan fetched permalink HTML for a media URL.
///
/// Order: anchored video scan near the poster stem, broad
/// `video_versions` scan, `og:video` meta, `og:image` meta.
fn scan_html(html: &str, poster_stem: Option<&str>) -> Option<(String, MediaType)> {
    if let Some(stem) = poster_stem {
        if let Some(pos) = html.find(stem) {
            let window = config::resolve::POSTER_ANCHOR_WINDOW;
            let start = pos.saturating_sub(window);
            let end = (pos + window).min(html.len());
            // Clamp to char boundaries; the window size is approximate anyway.
            let start = (start..=pos).find(|&i| html.is_char_boundary(i)).unwrap_or(pos);
            let end = (end..html.len()).find(|&i| html.is_char_boundary(i)).unwrap_or(html.len());
            let slice = &html[start..end];
            if let Some(caps) = patterns::ANY_VIDEO_URL_RE.captures(slice) {
                return Some((patterns::unescape_json_url(&caps[1]), MediaType::Video));
            }
            log::debug!("no video URL within the poster-anchored window");
        }
    }

    if let Some(caps) = patterns::VIDEO_VERSIONS_URL_RE.captures(html) {
        return Some((patterns::unescape_json_url(&caps[1]), MediaType::Video));
    }

    if let Some(url) = og_content(html, "og:video") {
        return Some((patterns::unescape_json_url(&url), MediaType::Video));
    }

    if let Some(url) = og_content(html, "og:image") {
        return Some((patterns::unescape_json_url(&url), MediaType::Image));
    }

    None
}

#[async_trait]
impl ResolveStrategy for HtmlScanStrategy {
    fn name(&self) -> &'static str {
        "html-scan"
    }

    async fn attempt(&self, cx: &ResolveContext<'_>) -> Result<Option<MediaResult>, ResolveError> {
        // Stories have no public permalink to fetch.
        let Some(shortcode) = ident::shortcode_from_page(cx.page) else {
            return Ok(None);
        };

        let stem = poster_stem(cx.page);

        let permalink = format!("{}/p/{}/", cx.web_base.trim_end_matches('/'), shortcode);
        log::debug!("HTML scan GET {}", permalink);
        let response = cx.client.get(&permalink).send().await?;
        if !response.status().is_success() {
            return Err(ResolveError::Status(response.status()));
        }
        let body = response.text().await?;

        let (url, media_type) = scan_html(&body, stem.as_deref()).ok_or_else(|| {
            ResolveError::NotFound(format!("no media URL in permalink HTML for {}", shortcode))
        })?;

        Ok(Some(MediaResult {
            url,
            media_index: cx.media_index,
            media_type,
        }))
    }
}
