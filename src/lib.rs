//! instasolve resolves Instagram post, reel, and story pages to direct
//! CDN media URLs.
//!
//! Given a [`PageSnapshot`] (page URL plus container HTML), a
//! [`MediaResolver`] runs an ordered cascade of strategies (private
//! info API, DOM inspection, raw-HTML scan) and returns the first
//! [`MediaResult`] any of them produces. The cascade is best-effort by
//! contract: internal failures are logged and collapse to `None`.
//!
//! ```no_run
//! use instasolve::{MediaResolver, PageSnapshot};
//! use url::Url;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let resolver = MediaResolver::new()?;
//! let page = PageSnapshot::new(
//!     Url::parse("https://www.instagram.com/p/ABC123/")?,
//!     "<article>...</article>",
//! );
//! if let Some(media) = resolver.resolve(&page).await {
//!     println!("{} ({})", media.url, media.media_type.as_str());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod core;
pub mod ident;
pub mod patterns;
pub mod probe;
pub mod resolve;
pub mod types;
pub mod wait;

pub use cache::{BoundedTtlCache, CacheStats, ResolverCaches};
pub use crate::core::config;
pub use crate::core::error::{AppError, AppResult, ResolveError};
pub use crate::core::logging::init_logger;
pub use resolve::{MediaResolver, ResolveStrategy, ResolverOptions};
pub use types::{MediaContext, MediaReference, MediaResult, MediaType, PageSnapshot};
pub use wait::WaitError;
