//! Info-API strategy: authenticated GET against the private
//! `/api/v1/media/{id}/info/` endpoint.
//!
//! The response schema is reverse-engineered and unversioned; extraction
//! navigates it defensively and any missing field degrades to a cascade
//! fallthrough rather than an error the caller sees.

use crate::core::error::ResolveError;
use crate::resolve::strategy::{ResolveContext, ResolveStrategy};
use crate::types::{MediaResult, MediaType};
use async_trait::async_trait;
use serde_json::Value;

pub struct InfoApiStrategy;

impl InfoApiStrategy {
    /// Pull the playable URL out of an info response.
    ///
    /// Carousel posts nest items under `items[0].carousel_media`; a
    /// requested index past the end falls back to item 0. Video wins over
    /// image when both are present.
    pub fn extract_media_url(info: &Value, index: usize) -> Option<(String, MediaType)> {
        let item = info.pointer("/items/0")?;

        let target = match item.get("carousel_media").and_then(|v| v.as_array()) {
            Some(entries) if !entries.is_empty() => entries.get(index).unwrap_or(&entries[0]),
            _ => item,
        };

        if let Some(url) = target.pointer("/video_versions/0/url").and_then(|v| v.as_str()) {
            return Some((url.to_string(), MediaType::Video));
        }

        target
            .pointer("/image_versions2/candidates/0/url")
            .and_then(|v| v.as_str())
            .map(|url| (url.to_string(), MediaType::Image))
    }

    async fn fetch_info(&self, cx: &ResolveContext<'_>, media_id: &str, app_id: &str) -> Result<Value, ResolveError> {
        if let Some(cached) = cx.caches.info_responses.get(media_id).await {
            log::debug!("info cache hit for media id {}", media_id);
            return Ok(cached);
        }

        let endpoint = format!("{}/api/v1/media/{}/info/", cx.api_base.trim_end_matches('/'), media_id);
        log::debug!("info API GET {}", endpoint);

        let response = cx
            .client
            .get(&endpoint)
            .header("X-IG-App-ID", app_id)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ResolveError::Status(response.status()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ResolveError::Parse(format!("info response is not JSON: {}", e)))?;

        cx.caches.info_responses.set(media_id, body.clone()).await;
        Ok(body)
    }
}

#[async_trait]
impl ResolveStrategy for InfoApiStrategy {
    fn name(&self) -> &'static str {
        "info-api"
    }

    async fn attempt(&self, cx: &ResolveContext<'_>) -> Result<Option<MediaResult>, ResolveError> {
        let Some(reference) = &cx.reference else {
            return Ok(None);
        };

        let info = self.fetch_info(cx, &reference.media_id, &reference.app_id).await?;

        let (url, media_type) = Self::extract_media_url(&info, cx.media_index).ok_or_else(|| {
            ResolveError::NotFound(format!("no media URL in info response for {}", reference.media_id))
        })?;

        Ok(Some(MediaResult {
            url,
            media_index: cx.media_index,
            media_type,
        }))
    }
}
