//! Versioned pattern table: every regex and markup selector the cascade
//! scrapes with lives here, so breakage from upstream markup changes is
//! localized to one module and detectable via the fixture tests.
//!
//! These are reverse-engineered heuristics against Instagram's unstable
//! markup, not a contract. Bump `PATTERN_TABLE_VERSION` whenever a pattern
//! is adjusted for an upstream change.

use lazy_regex::{lazy_regex, Lazy, Regex};

/// Bumped on every upstream-markup-driven adjustment.
pub const PATTERN_TABLE_VERSION: u32 = 4;

/// Instagram internal app ID (public, embedded in the web app). Used as a
/// fallback when no app ID can be scraped from inline scripts.
pub const DEFAULT_APP_ID: &str = "936619743392459";

/// Path segments that introduce a shortcode permalink.
pub const SHORTCODE_PATH_SEGMENTS: &[&str] = &["p", "reel", "reels", "tv"];

/// `data-*` attributes known to carry a direct media URL on video/img nodes.
pub const MEDIA_DATA_ATTRS: &[&str] = &["data-video-url", "data-src"];

/// Class fragment of carousel indicator dots; the active dot carries one
/// extra class on top of this one.
pub const INDICATOR_DOT_CLASS: &str = "_acnb";

/// `"X-IG-App-ID":"<digits>"` inside an inline script.
pub static APP_ID_RE: Lazy<Regex> = lazy_regex!(r#""X-IG-App-ID"\s*:\s*"(\d+)""#);

/// `"media_id":"<digits>"` (quotes around the value optional) inside
/// inline JSON script tags or permalink HTML.
pub static MEDIA_ID_RE: Lazy<Regex> = lazy_regex!(r#""media_id"\s*:\s*"?(\d+)"?"#);

/// `/stories/<username>/<media_id>` page path.
pub static STORY_PATH_RE: Lazy<Regex> = lazy_regex!(r"^/stories/[^/]+/(\d+)");

/// Shortcode permalink anywhere in an href: `/p/<code>/`, `/reel/<code>/`.
pub static SHORTCODE_HREF_RE: Lazy<Regex> = lazy_regex!(r"/(?:p|reel|reels|tv)/([A-Za-z0-9_-]{5,})");

/// First `url` inside a `video_versions` JSON fragment of un-parsed HTML.
/// Broad and unanchored; the poster-anchored scan narrows it first.
pub static VIDEO_VERSIONS_URL_RE: Lazy<Regex> =
    lazy_regex!(r#""video_versions"\s*:\s*\[\s*\{[^}]*?"url"\s*:\s*"([^"]+)""#);

/// Any escaped or plain `.mp4` URL. The loosest net; applied only inside
/// a poster-anchored window.
pub static ANY_VIDEO_URL_RE: Lazy<Regex> = lazy_regex!(r#""url"\s*:\s*"(https:[^"]+?\.mp4[^"]*)""#);

/// Unescape a URL captured out of embedded JSON (`&` and `\/`).
pub fn unescape_json_url(raw: &str) -> String {
    raw.replace("\\u0026", "&").replace("\\/", "/")
}
