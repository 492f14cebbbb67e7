use anyhow::Result;
use dotenvy::dotenv;
use url::Url;

use instasolve::cli::{Cli, Commands};
use instasolve::core::{config, init_logger};
use instasolve::types::{MediaType, PageSnapshot};
use instasolve::{probe, AppError, MediaResolver, ResolverOptions};

/// Main entry point for the resolver CLI.
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, HTTP client creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics instead of dying silently with a broken terminal line
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    init_logger(&config::LOG_FILE_PATH)?;

    // Load environment variables from .env if present
    let _ = dotenv();

    match cli.command {
        Commands::Resolve {
            url,
            html,
            skip_api,
            json,
        } => run_resolve(url, html, skip_api, json).await,
        Commands::Probe { url } => run_probe(url).await,
    }
}

/// Resolve a page URL (or a saved HTML file) to its direct media URL.
async fn run_resolve(url: String, html: Option<String>, skip_api: bool, json: bool) -> Result<()> {
    let page_url = Url::parse(&url)?;

    let options = ResolverOptions::default().with_skip_api(skip_api || *config::SKIP_API);
    let resolver = MediaResolver::with_options(options)?;

    let html = match html {
        Some(path) => {
            log::info!("Reading page HTML from {}", path);
            tokio::fs::read_to_string(&path).await?
        }
        None => {
            log::info!("Fetching {}", page_url);
            fetch_page(&page_url).await?
        }
    };

    let page = PageSnapshot::new(page_url, html);

    match resolver.resolve(&page).await {
        Some(media) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&media)?);
            } else {
                println!("{}", media.url);
                println!("type: {}", media.media_type.as_str());
                println!("index: {}", media.media_index);
            }
            Ok(())
        }
        None => Err(anyhow::anyhow!("no media URL could be resolved for {}", url)),
    }
}

/// Classify a direct media URL: extension guess first, HEAD probe second.
async fn run_probe(url: String) -> Result<()> {
    if let Some(guessed) = probe::guess_media_type_from_url(&url) {
        println!("{}", guessed.as_str());
        return Ok(());
    }

    let client = reqwest::Client::builder()
        .user_agent(config::http::USER_AGENT)
        .timeout(config::http::request_timeout())
        .build()?;

    match probe::probe_media_type(&client, &url).await {
        MediaType::Unknown => Err(anyhow::anyhow!("could not classify {}", url)),
        classified => {
            println!("{}", classified.as_str());
            Ok(())
        }
    }
}

/// One-shot page fetch for the CLI path (the resolver itself only fetches
/// permalinks and the info API).
async fn fetch_page(url: &Url) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(config::http::USER_AGENT)
        .timeout(config::http::request_timeout())
        .connect_timeout(config::http::connect_timeout())
        .cookie_store(true)
        .build()
        .map_err(AppError::Http)?;

    let response = client.get(url.clone()).send().await.map_err(AppError::Http)?;
    if !response.status().is_success() {
        return Err(AppError::HttpStatus(response.status()).into());
    }
    Ok(response.text().await.map_err(AppError::Http)?)
}
