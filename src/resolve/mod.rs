//! Resolution orchestrator: runs the strategy cascade over a page
//! snapshot and hands back a direct CDN URL, or nothing.
//!
//! The caller-facing contract is deliberately infallible: every internal
//! failure is logged and swallowed, and `resolve` returns an `Option`.
//! Embedders treat a `None` as "no downloadable media here" regardless of
//! whether the cause was a missing element, a 429, or a schema change.

pub mod api;
pub mod dom;
pub mod html_scan;
pub mod strategy;

pub use api::InfoApiStrategy;
pub use dom::DomStrategy;
pub use html_scan::HtmlScanStrategy;
pub use strategy::{ResolveContext, ResolveStrategy};

use crate::cache::ResolverCaches;
use crate::core::config;
use crate::core::error::AppResult;
use crate::ident;
use crate::probe;
use crate::types::{MediaContext, MediaReference, MediaResult, MediaType, PageSnapshot};
use crate::wait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

/// Tunables for one resolver instance. Defaults come from the
/// environment-backed config statics.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Base URL for info-API requests.
    pub api_base: String,
    /// Base URL for permalink HTML fetches.
    pub web_base: String,
    /// Drop the info-API strategy from the cascade (DOM + HTML scan only).
    pub skip_api: bool,
    /// Upper bound on one whole resolution.
    pub total_timeout: Duration,
    /// Issue a HEAD probe when the extension guess cannot type a URL.
    pub probe_unknown: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            api_base: config::API_BASE.clone(),
            web_base: config::WEB_BASE.clone(),
            skip_api: *config::SKIP_API,
            total_timeout: config::resolve::total_timeout(),
            probe_unknown: true,
        }
    }
}

impl ResolverOptions {
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_web_base(mut self, web_base: impl Into<String>) -> Self {
        self.web_base = web_base.into();
        self
    }

    #[must_use]
    pub fn with_skip_api(mut self, skip_api: bool) -> Self {
        self.skip_api = skip_api;
        self
    }

    #[must_use]
    pub fn with_total_timeout(mut self, total_timeout: Duration) -> Self {
        self.total_timeout = total_timeout;
        self
    }

    #[must_use]
    pub fn with_probe_unknown(mut self, probe_unknown: bool) -> Self {
        self.probe_unknown = probe_unknown;
        self
    }
}

/// Stable key for the result cache and in-flight map: shortcode when the
/// page has one, story media id, first media src in the container, page
/// URL as the last resort.
fn cache_key(page: &PageSnapshot) -> String {
    if let Some(code) = ident::shortcode_from_page(page) {
        return format!("sc:{}", code);
    }
    if let Some(id) = ident::story_media_id_from_path(page.url()) {
        return format!("story:{}", id);
    }
    if let Some(src) = dom::container_media_key(page) {
        return src;
    }
    page.url().as_str().to_string()
}

type InFlightMap = Mutex<HashMap<String, Arc<OnceCell<Option<MediaResult>>>>>;

pub struct MediaResolver {
    client: reqwest::Client,
    caches: ResolverCaches,
    strategies: Vec<Box<dyn ResolveStrategy>>,
    options: ResolverOptions,
    /// Concurrent resolutions of the same key share one attempt: the
    /// first caller populates the cell, the rest await it. Guarded by a
    /// sync mutex so entries can be dropped from `Drop` as well; it is
    /// never held across an await.
    in_flight: InFlightMap,
}

/// Removes an in-flight entry when its resolution finishes or is
/// dropped mid-flight (cancellation, timeout).
struct InFlightGuard<'a> {
    map: &'a InFlightMap,
    key: String,
    cell: Arc<OnceCell<Option<MediaResult>>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.map.lock().unwrap_or_else(|e| e.into_inner());
        if in_flight.get(&self.key).is_some_and(|entry| Arc::ptr_eq(entry, &self.cell)) {
            in_flight.remove(&self.key);
        }
    }
}

impl MediaResolver {
    pub fn new() -> AppResult<Self> {
        Self::with_options(ResolverOptions::default())
    }

    pub fn with_options(options: ResolverOptions) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config::http::USER_AGENT)
            .timeout(config::http::request_timeout())
            .connect_timeout(config::http::connect_timeout())
            .cookie_store(true)
            .build()?;

        log::debug!("pattern table v{}", crate::patterns::PATTERN_TABLE_VERSION);

        let mut strategies: Vec<Box<dyn ResolveStrategy>> = Vec::new();
        if !options.skip_api {
            strategies.push(Box::new(InfoApiStrategy));
        }
        strategies.push(Box::new(DomStrategy));
        strategies.push(Box::new(HtmlScanStrategy));

        Ok(Self {
            client,
            caches: ResolverCaches::default(),
            strategies,
            options,
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn caches(&self) -> &ResolverCaches {
        &self.caches
    }

    /// Navigation hook: drop everything cached from the previous page,
    /// including any leftover in-flight entries.
    pub async fn invalidate(&self) {
        self.caches.invalidate_all().await;
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Resolve the direct media URL for a snapshot.
    ///
    /// Never errors; all failures are logged and collapse to `None`.
    /// Repeat calls for the same container are served from the result
    /// cache, and concurrent calls are de-duplicated into one attempt.
    pub async fn resolve(&self, page: &PageSnapshot) -> Option<MediaResult> {
        let key = cache_key(page);

        if let Some(hit) = self.caches.results.get(&key).await {
            log::debug!("result cache hit for {}", key);
            return Some(hit);
        }

        let cell = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(in_flight.entry(key.clone()).or_default())
        };
        let _guard = InFlightGuard {
            map: &self.in_flight,
            key: key.clone(),
            cell: Arc::clone(&cell),
        };

        cell.get_or_init(|| async {
            let result = self.resolve_uncached(page).await;
            if let Some(ref resolved) = result {
                self.caches.results.set(key.clone(), resolved.clone()).await;
            }
            result
        })
        .await
        .clone()
    }

    /// `resolve` bounded by the configured total timeout and a caller's
    /// cancellation token. Timeout and cancellation both collapse to
    /// `None`, same as any other failure.
    pub async fn resolve_with_cancel(&self, page: &PageSnapshot, cancel: &CancellationToken) -> Option<MediaResult> {
        match wait::run_cancellable(self.options.total_timeout, cancel, self.resolve(page)).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("resolution for {} aborted: {}", page.url(), e);
                None
            }
        }
    }

    async fn resolve_uncached(&self, page: &PageSnapshot) -> Option<MediaResult> {
        let media_context = MediaContext::classify(page);
        let media_index = ident::media_index(page, media_context);
        log::debug!(
            "resolving {} (context {:?}, index {})",
            page.url(),
            media_context,
            media_index
        );

        let reference = if self.options.skip_api {
            None
        } else {
            self.build_reference(page, media_context, media_index).await
        };

        let cx = ResolveContext {
            page,
            media_context,
            media_index,
            reference,
            client: &self.client,
            caches: &self.caches,
            api_base: &self.options.api_base,
            web_base: &self.options.web_base,
        };

        for strategy in &self.strategies {
            match strategy.attempt(&cx).await {
                Ok(Some(result)) => {
                    log::info!("{} strategy resolved {}: {}", strategy.name(), page.url(), result.url);
                    return Some(self.disambiguate(result).await);
                }
                Ok(None) => {
                    log::debug!("{} strategy not applicable for {}", strategy.name(), page.url());
                }
                Err(e) => {
                    log::warn!("{} strategy failed [{}]: {}", strategy.name(), e.kind(), e);
                }
            }
        }

        log::warn!("all strategies exhausted for {}", page.url());
        None
    }

    /// Derive the info-API identifier pair. Failures are logged and
    /// collapse to `None`, which demotes the cascade to its scraping
    /// strategies.
    async fn build_reference(
        &self,
        page: &PageSnapshot,
        media_context: MediaContext,
        media_index: usize,
    ) -> Option<MediaReference> {
        let app_id = ident::find_app_id(page).unwrap_or_else(|| config::APP_ID.clone());

        let media_id = match ident::find_media_id(
            page,
            media_context,
            media_index,
            &self.client,
            &self.caches,
            &self.options.web_base,
        )
        .await
        {
            Ok(found) => found,
            Err(e) => {
                log::warn!("media id lookup failed [{}]: {}", e.kind(), e);
                None
            }
        };

        media_id.map(|media_id| MediaReference { media_id, app_id })
    }

    /// Settle an `Unknown` media type: extension guess first, HEAD probe
    /// second (when enabled). Left `Unknown` when both come up empty.
    async fn disambiguate(&self, mut result: MediaResult) -> MediaResult {
        if result.media_type != MediaType::Unknown {
            return result;
        }
        if let Some(guessed) = probe::guess_media_type_from_url(&result.url) {
            result.media_type = guessed;
            return result;
        }
        if self.options.probe_unknown {
            result.media_type = probe::probe_media_type(&self.client, &result.url).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use url::Url;

    fn snapshot(url: &str, html: &str) -> PageSnapshot {
        PageSnapshot::new(Url::parse(url).unwrap(), html)
    }

    fn offline_resolver() -> MediaResolver {
        MediaResolver::with_options(
            ResolverOptions::default()
                .with_skip_api(true)
                .with_probe_unknown(false)
                .with_web_base("http://127.0.0.1:9"),
        )
        .unwrap()
    }

    #[test]
    fn test_options_builder() {
        let options = ResolverOptions::default()
            .with_api_base("http://localhost:1234")
            .with_skip_api(true)
            .with_total_timeout(Duration::from_secs(5));
        assert_eq!(options.api_base, "http://localhost:1234");
        assert!(options.skip_api);
        assert_eq!(options.total_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_cache_key_prefers_shortcode() {
        let page = snapshot("https://www.instagram.com/p/ABC123/", "<article></article>");
        assert_eq!(cache_key(&page), "sc:ABC123");
    }

    #[test]
    fn test_cache_key_story_id() {
        let page = snapshot("https://www.instagram.com/stories/someuser/777/", "<section></section>");
        assert_eq!(cache_key(&page), "story:777");
    }

    #[test]
    fn test_cache_key_container_src() {
        let page = snapshot(
            "https://www.instagram.com/",
            r#"<article><video src="blob:abc"></video></article>"#,
        );
        assert_eq!(cache_key(&page), "blob:abc");
    }

    #[test]
    fn test_cache_key_url_fallback() {
        let page = snapshot("https://www.instagram.com/someuser/", "<div></div>");
        assert_eq!(cache_key(&page), "https://www.instagram.com/someuser/");
    }

    #[test]
    fn test_skip_api_drops_strategy() {
        let resolver = offline_resolver();
        let names: Vec<&str> = resolver.strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["dom", "html-scan"]);
    }

    #[tokio::test]
    async fn test_resolve_from_dom_and_cache() {
        let resolver = offline_resolver();
        let page = snapshot(
            "https://www.instagram.com/p/ABC123/",
            r#"<article><video src="https://cdn.example/v.mp4"></video></article>"#,
        );

        let first = resolver.resolve(&page).await.unwrap();
        assert_eq!(first.url, "https://cdn.example/v.mp4");
        assert_eq!(first.media_type, MediaType::Video);

        let second = resolver.resolve(&page).await.unwrap();
        assert_eq!(second, first);
        assert!(resolver.caches.results.stats().await.hits >= 1);
    }

    #[tokio::test]
    async fn test_resolve_image_type_from_extension() {
        let resolver = offline_resolver();
        let page = snapshot(
            "https://www.instagram.com/p/IMGONLY/",
            r#"<article><img srcset="https://cdn.example/a.jpg 480w, https://cdn.example/b.jpg 1080w"></article>"#,
        );
        let result = resolver.resolve(&page).await.unwrap();
        assert_eq!(result.url, "https://cdn.example/b.jpg");
        assert_eq!(result.media_type, MediaType::Image);
    }

    #[tokio::test]
    async fn test_invalidate_clears_results() {
        let resolver = offline_resolver();
        let page = snapshot(
            "https://www.instagram.com/p/ABC123/",
            r#"<article><video src="https://cdn.example/v.mp4"></video></article>"#,
        );
        resolver.resolve(&page).await.unwrap();
        resolver.invalidate().await;
        assert_eq!(resolver.caches.results.stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_dropped_resolution_removes_in_flight_entry() {
        let resolver = offline_resolver();
        // No media in the container, so resolution blocks on the
        // HTML-scan fetch against an unreachable host.
        let page = snapshot(
            "https://www.instagram.com/p/DROPPED/",
            r#"<article><a href="/p/DROPPED/">permalink</a></article>"#,
        );

        {
            let fut = resolver.resolve(&page);
            tokio::pin!(fut);
            let completed = tokio::select! {
                biased;
                _ = &mut fut => true,
                _ = std::future::ready(()) => false,
            };
            if !completed {
                assert!(!resolver.in_flight.lock().unwrap().is_empty());
            }
        }

        assert!(resolver.in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_clears_in_flight() {
        let resolver = offline_resolver();
        resolver
            .in_flight
            .lock()
            .unwrap()
            .insert("sc:STALE".to_string(), Arc::default());
        resolver.invalidate().await;
        assert!(resolver.in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_with_cancel_cancelled() {
        let resolver = offline_resolver();
        let page = snapshot("https://www.instagram.com/p/ABC123/", "<article></article>");
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(resolver.resolve_with_cancel(&page, &cancel).await, None);
    }
}
