//! Common test utilities
//!
//! Fixture builders shared across the integration tests: page snapshots
//! in the shapes the resolver sees, and info-API response bodies.

#![allow(dead_code)]

use serde_json::{json, Value};

/// Post container HTML with an app-id script, a permalink anchor, and an
/// inline media id (no permalink fetch needed to build the reference).
pub fn post_html(shortcode: &str, media_id: &str) -> String {
    format!(
        r#"<html>
            <script>window.__d = {{"X-IG-App-ID":"936619743392459"}};</script>
            <script type="application/json">{{"media_id":"{media_id}"}}</script>
            <article>
                <a href="/p/{shortcode}/">permalink</a>
                <video src="blob:https://www.instagram.com/abc-123" poster="https://cdn.test/poster_n.jpg"></video>
            </article>
        </html>"#
    )
}

/// Post container whose media id is only discoverable through the
/// permalink HTML fetch.
pub fn post_html_without_inline_id(shortcode: &str) -> String {
    format!(
        r#"<html>
            <script>window.__d = {{"X-IG-App-ID":"936619743392459"}};</script>
            <article>
                <a href="/p/{shortcode}/">permalink</a>
                <video src="blob:https://www.instagram.com/abc-123"></video>
            </article>
        </html>"#
    )
}

/// Post container with only an image, for DOM-fallback tests.
pub fn image_post_html(shortcode: &str, media_id: &str) -> String {
    format!(
        r#"<html>
            <script>window.__d = {{"X-IG-App-ID":"936619743392459"}};</script>
            <script type="application/json">{{"media_id":"{media_id}"}}</script>
            <article>
                <a href="/p/{shortcode}/">permalink</a>
                <img srcset="https://cdn.test/small.jpg 480w, https://cdn.test/large.jpg 1080w">
            </article>
        </html>"#
    )
}

/// Story container; the media id lives in the page path, not the markup.
pub fn story_html() -> String {
    r#"<html><section><video src="blob:https://www.instagram.com/story-xyz"></video></section></html>"#.to_string()
}

/// Permalink HTML body the media-id lookup scrapes.
pub fn permalink_html(media_id: &str) -> String {
    format!(r#"<html><script>{{"media_id":"{media_id}","more":1}}</script></html>"#)
}

/// Permalink HTML carrying only an `og:video` meta tag.
pub fn og_video_permalink_html(video_url: &str) -> String {
    format!(
        r#"<html><head><meta property="og:video" content="{video_url}"></head><body></body></html>"#
    )
}

/// Info-API response with a single video item.
pub fn video_info_json(video_url: &str) -> Value {
    json!({
        "items": [{
            "pk": 31337,
            "video_versions": [ { "width": 720, "url": video_url } ],
            "image_versions2": { "candidates": [ { "url": "https://cdn.test/poster.jpg" } ] }
        }]
    })
}

/// Info-API response with a single image item.
pub fn image_info_json(image_url: &str) -> Value {
    json!({
        "items": [{
            "pk": 31337,
            "image_versions2": { "candidates": [ { "url": image_url } ] }
        }]
    })
}

/// Info-API response for a three-item carousel (image, image, video).
pub fn carousel_info_json() -> Value {
    json!({
        "items": [{
            "pk": 31337,
            "carousel_media": [
                { "image_versions2": { "candidates": [ { "url": "https://cdn.test/c0.jpg" } ] } },
                { "image_versions2": { "candidates": [ { "url": "https://cdn.test/c1.jpg" } ] } },
                { "video_versions": [ { "url": "https://cdn.test/c2.mp4" } ] }
            ]
        }]
    })
}
