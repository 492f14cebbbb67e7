//! Identifier resolution: app ID, media ID, and carousel/segment index.
//!
//! These are the scraping heuristics that turn a page snapshot into the
//! identifiers the private info API wants. Each one is best-effort and
//! layered: URL first, inline JSON second, a permalink fetch last.

use crate::cache::ResolverCaches;
use crate::core::error::ResolveError;
use crate::patterns;
use crate::types::{MediaContext, PageSnapshot};
use select::predicate::{Class, Name};
use url::Url;

/// Scan all inline `<script>` bodies for the app-ID literal; first match
/// anywhere on the page wins.
///
/// Not scoped to the relevant post; when multiple contexts coexist on
/// one page this can pick the wrong one. In practice the literal appears
/// once per page.
pub fn find_app_id(page: &PageSnapshot) -> Option<String> {
    let doc = page.document();
    for script in doc.find(Name("script")) {
        let text = script.text();
        if let Some(caps) = patterns::APP_ID_RE.captures(&text) {
            return Some(caps[1].to_string());
        }
    }
    // Container snapshots may omit <script> wrappers; scan the raw text too.
    patterns::APP_ID_RE.captures(page.html()).map(|caps| caps[1].to_string())
}

/// Derive a shortcode from the page URL, falling back to permalink
/// anchors inside the container.
pub fn shortcode_from_page(page: &PageSnapshot) -> Option<String> {
    if let Some(code) = shortcode_from_url(page.url()) {
        return Some(code);
    }

    let doc = page.document();
    for anchor in doc.find(Name("a")) {
        if let Some(href) = anchor.attr("href") {
            if let Some(caps) = patterns::SHORTCODE_HREF_RE.captures(href) {
                return Some(caps[1].to_string());
            }
        }
    }
    None
}

/// Extract the shortcode from a permalink URL path.
///
/// Supports `/p/<code>/`, `/reel/<code>/`, `/reels/<code>/`, `/tv/<code>/`
/// and the username-prefixed `/<username>/p/<code>/` forms.
pub fn shortcode_from_url(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    if segments.len() >= 2 && patterns::SHORTCODE_PATH_SEGMENTS.contains(&segments[0]) {
        return Some(segments[1].to_string());
    }
    if segments.len() >= 3 && patterns::SHORTCODE_PATH_SEGMENTS.contains(&segments[1]) {
        return Some(segments[2].to_string());
    }
    None
}

/// Media ID straight from a `/stories/<user>/<media_id>` page path.
pub fn story_media_id_from_path(url: &Url) -> Option<String> {
    patterns::STORY_PATH_RE.captures(url.path()).map(|caps| caps[1].to_string())
}

/// Positional scan of inline JSON script tags for `"media_id"` captures.
///
/// Returns the capture at `index` (story segments embed one per item),
/// falling back to the first match when the index runs past the end.
pub fn media_id_from_inline_json(page: &PageSnapshot, index: usize) -> Option<String> {
    let doc = page.document();
    let mut ids: Vec<String> = Vec::new();
    for script in doc.find(Name("script")) {
        let text = script.text();
        for caps in patterns::MEDIA_ID_RE.captures_iter(&text) {
            ids.push(caps[1].to_string());
        }
    }
    if ids.is_empty() {
        for caps in patterns::MEDIA_ID_RE.captures_iter(page.html()) {
            ids.push(caps[1].to_string());
        }
    }
    ids.get(index).or_else(|| ids.first()).cloned()
}

/// Best-effort carousel / story segment index.
///
/// The `img_index` query parameter (1-based in permalinks) wins; otherwise
/// the indicator-dot heuristic: the active dot carries extra classes on
/// top of the shared dot class, and its position is the index. Total
/// failure silently yields 0.
pub fn media_index(page: &PageSnapshot, _ctx: MediaContext) -> usize {
    if let Some(value) = page
        .url()
        .query_pairs()
        .find(|(k, _)| k == "img_index")
        .and_then(|(_, v)| v.parse::<usize>().ok())
    {
        return value.saturating_sub(1);
    }

    let doc = page.document();
    let dots: Vec<usize> = doc
        .find(Class(patterns::INDICATOR_DOT_CLASS))
        .map(|node| node.attr("class").map(|c| c.split_whitespace().count()).unwrap_or(1))
        .collect();
    if dots.len() > 1 {
        let min = dots.iter().copied().min().unwrap_or(1);
        if let Some(pos) = dots.iter().position(|&count| count > min) {
            return pos;
        }
    }

    0
}

/// Resolve the media ID for a snapshot.
///
/// Story contexts: URL path match, then inline JSON at the segment index.
/// Post/reel contexts: shortcode → cache → inline JSON → permalink HTML
/// fetch with a first-occurrence regex capture (the n+1 fetch the cache
/// exists to amortize).
pub async fn find_media_id(
    page: &PageSnapshot,
    ctx: MediaContext,
    index: usize,
    client: &reqwest::Client,
    caches: &ResolverCaches,
    web_base: &str,
) -> Result<Option<String>, ResolveError> {
    match ctx {
        MediaContext::Story => {
            if let Some(id) = story_media_id_from_path(page.url()) {
                return Ok(Some(id));
            }
            Ok(media_id_from_inline_json(page, index))
        }
        MediaContext::Post | MediaContext::Reel => {
            let Some(shortcode) = shortcode_from_page(page) else {
                return Ok(None);
            };

            if let Some(hit) = caches.media_ids.get(&shortcode).await {
                return Ok(Some(hit));
            }

            if let Some(id) = media_id_from_inline_json(page, 0) {
                caches.media_ids.set(shortcode, id.clone()).await;
                return Ok(Some(id));
            }

            let permalink = format!("{}/p/{}/", web_base.trim_end_matches('/'), shortcode);
            log::debug!("fetching permalink for media id: {}", permalink);
            let response = client.get(&permalink).send().await?;
            if !response.status().is_success() {
                return Err(ResolveError::Status(response.status()));
            }
            let body = response.text().await?;

            let id = patterns::MEDIA_ID_RE.captures(&body).map(|caps| caps[1].to_string());
            if let Some(ref id) = id {
                caches.media_ids.set(shortcode, id.clone()).await;
            }
            Ok(id)
        }
    }
}
