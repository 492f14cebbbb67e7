//! Media type disambiguation: extension guess first (cheap, no network),
//! HEAD content-type probe as fallback for signed CDN URLs without one.

use crate::types::MediaType;

/// Extensions this resolver treats as video.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "mkv"];

/// Extensions this resolver treats as image.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "heic", "avif"];

/// Guess the media type from the URL path extension.
///
/// Returns None when the path carries no recognizable extension; the
/// caller must probe in that case.
pub fn guess_media_type_from_url(url: &str) -> Option<MediaType> {
    // Strip query and fragment before looking at the extension.
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit('.').next()?.to_lowercase();
    if ext.contains('/') {
        // No dot in the final path segment.
        return None;
    }
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        return Some(MediaType::Video);
    }
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Some(MediaType::Image);
    }
    None
}

/// Issue a HEAD request and classify by Content-Type.
///
/// Returns `Unknown` on any failure; the cascade degrades rather than
/// errors on an unclassifiable URL.
pub async fn probe_media_type(client: &reqwest::Client, url: &str) -> MediaType {
    let response = match client.head(url).send().await {
        Ok(r) => r,
        Err(e) => {
            log::warn!("HEAD probe failed for {}: {}", url, e);
            return MediaType::Unknown;
        }
    };

    if !response.status().is_success() {
        log::warn!("HEAD probe got HTTP {} for {}", response.status(), url);
        return MediaType::Unknown;
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("video/") {
        MediaType::Video
    } else if content_type.starts_with("image/") {
        MediaType::Image
    } else {
        MediaType::Unknown
    }
}
