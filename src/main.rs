//! Daily content API - serves a daily quote and good deed
//!
//! Scrapes inspirational quotes and good-deed ideas, falls back to built-in
//! content when scraping yields nothing, and refreshes twice a day.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daily_content::api;
use daily_content::cache::{CacheManager, ContentCache};
use daily_content::cli::{Cli, DiskCache, ServerConfig};
use daily_content::content::ContentKind;
use daily_content::fetch::{default_sources, SourceAggregator};
use daily_content::refresh::RefreshHandle;
use daily_content::service::ContentService;

/// Extra time the aggregator allows on top of the HTTP timeout, so a source
/// can still fall back to its disk cache before being abandoned
const SOURCE_TIMEOUT_GRACE: Duration = Duration::from_secs(2);

fn disk_cache(config: &ServerConfig) -> Option<CacheManager> {
    match &config.disk_cache {
        DiskCache::Disabled => None,
        DiskCache::Dir(dir) => Some(CacheManager::with_dir(dir.clone())),
        DiskCache::Default => {
            let cache = CacheManager::new();
            if cache.is_none() {
                warn!("No cache directory available, disk cache disabled");
            }
            cache
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daily_content=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_cli(&cli)?;

    let client = Client::builder()
        .timeout(config.source_timeout)
        .user_agent(concat!("daily-content/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let cache_manager = disk_cache(&config);
    if let Some(cache) = &cache_manager {
        info!(dir = %cache.cache_dir().display(), "Disk cache enabled");
    }
    let sources = default_sources(&client, cache_manager.as_ref())?;
    let fetcher = SourceAggregator::new(sources)
        .with_timeout(config.source_timeout + SOURCE_TIMEOUT_GRACE);
    info!(
        quote_sources = fetcher.source_count(ContentKind::Quotes),
        deed_sources = fetcher.source_count(ContentKind::GoodDeeds),
        "Sources configured"
    );

    let service = Arc::new(ContentService::new(
        Arc::new(ContentCache::new()),
        Arc::new(fetcher),
    ));

    // Initial content load
    let report = service.refresh().await?;
    info!(counts = ?report.counts, "Initial content loaded");

    let scheduler = RefreshHandle::spawn(Arc::clone(&service), config.refresh.clone());

    api::serve(config.addr, service, shutdown_signal()).await?;

    scheduler.shutdown().await;
    Ok(())
}
