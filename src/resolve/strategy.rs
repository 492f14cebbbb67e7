//! The common strategy interface the orchestrator iterates.
//!
//! Each resolution attempt is an ordered cascade of independent
//! strategies; the first one producing a URL wins. Making the cascade a
//! list of trait objects keeps each strategy testable in isolation and
//! lets new ones slot in without touching the orchestrator.

use crate::cache::ResolverCaches;
use crate::core::error::ResolveError;
use crate::types::{MediaContext, MediaReference, MediaResult, PageSnapshot};
use async_trait::async_trait;

/// Everything a strategy may consult during one attempt.
pub struct ResolveContext<'a> {
    pub page: &'a PageSnapshot,
    pub media_context: MediaContext,
    /// Carousel position / story segment this resolution targets.
    pub media_index: usize,
    /// Identifiers for the info API; None when they could not be derived
    /// or the API path is disabled.
    pub reference: Option<MediaReference>,
    pub client: &'a reqwest::Client,
    pub caches: &'a ResolverCaches,
    pub api_base: &'a str,
    pub web_base: &'a str,
}

/// One rung of the cascade.
///
/// `Ok(None)` means "not applicable here, move on" (no warning logged);
/// `Err` means the strategy applied and failed; the orchestrator logs it
/// and moves on. No error ever escapes to the resolver's caller.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    async fn attempt(&self, cx: &ResolveContext<'_>) -> Result<Option<MediaResult>, ResolveError>;
}
