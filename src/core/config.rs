use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the resolver.
///
/// Base URL of the private info API host.
/// Read from INSTASOLVE_API_BASE environment variable.
/// Overridable so tests can point the resolver at a local mock server.
pub static API_BASE: Lazy<String> =
    Lazy::new(|| env::var("INSTASOLVE_API_BASE").unwrap_or_else(|_| "https://i.instagram.com".to_string()));

/// Base URL of the web host used for permalink HTML fetches.
/// Read from INSTASOLVE_WEB_BASE environment variable.
pub static WEB_BASE: Lazy<String> =
    Lazy::new(|| env::var("INSTASOLVE_WEB_BASE").unwrap_or_else(|_| "https://www.instagram.com".to_string()));

/// Override for the `X-IG-App-ID` header when none can be scraped from the
/// page. Read from INSTASOLVE_APP_ID environment variable.
/// Defaults to the public web-app ID (rotates rarely).
pub static APP_ID: Lazy<String> =
    Lazy::new(|| env::var("INSTASOLVE_APP_ID").unwrap_or_else(|_| crate::patterns::DEFAULT_APP_ID.to_string()));

/// Skip the info-API strategy entirely (DOM + HTML scan only).
/// Read from INSTASOLVE_SKIP_API environment variable ("1"/"true").
pub static SKIP_API: Lazy<bool> = Lazy::new(|| {
    env::var("INSTASOLVE_SKIP_API")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

/// Log file path for the binary.
/// Read from INSTASOLVE_LOG_FILE environment variable.
/// Default: instasolve.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("INSTASOLVE_LOG_FILE").unwrap_or_else(|_| "instasolve.log".to_string()));

/// HTTP client configuration.
pub mod http {
    use super::Duration;

    /// Browser-like user agent; the info API rejects obvious bots.
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

    /// Per-request timeout (in seconds).
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Connect timeout (in seconds).
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }

    pub fn connect_timeout() -> Duration {
        Duration::from_secs(CONNECT_TIMEOUT_SECS)
    }
}

/// Cache configuration.
pub mod cache {
    use super::Duration;

    /// Maximum entries per cache before oldest-first eviction kicks in.
    pub const CAPACITY: usize = 256;

    /// Entry time-to-live (in seconds). Sized for one page session;
    /// CDN URLs are signed and expire anyway.
    pub const TTL_SECS: u64 = 900;

    pub fn ttl() -> Duration {
        Duration::from_secs(TTL_SECS)
    }
}

/// Resolution configuration.
pub mod resolve {
    use super::Duration;

    /// Upper bound on a whole resolution (all strategies, all fetches).
    pub const TOTAL_TIMEOUT_SECS: u64 = 45;

    /// Window (chars) scanned around the poster filename when anchoring
    /// the HTML video-URL regex.
    pub const POSTER_ANCHOR_WINDOW: usize = 5_000;

    pub fn total_timeout() -> Duration {
        Duration::from_secs(TOTAL_TIMEOUT_SECS)
    }
}
