//! Fetching candidate content from upstream sources
//!
//! A [`ContentSource`] produces items for one [`ContentKind`] and may fail.
//! [`SourceAggregator`] runs every source for a kind, each under its own
//! timeout, and folds whatever succeeded into a single list. It implements
//! [`ContentFetcher`], which never fails: the worst case is an empty list.

pub mod html;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::content::{ContentKind, Item};

pub use html::{default_sources, HtmlSource, SourceSelectors};

/// Default per-source timeout
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors a single source can produce
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status {0}")]
    BadStatus(reqwest::StatusCode),

    /// A CSS selector could not be parsed
    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    /// The source did not answer in time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Produces candidate items for the service
///
/// Implementations swallow and log their own errors.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Returns candidate items for `kind`, possibly none
    async fn fetch(&self, kind: ContentKind) -> Vec<Item>;
}

/// One upstream location for a single kind of content
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Kind of item this source yields
    fn kind(&self) -> ContentKind;

    async fn fetch_items(&self) -> Result<Vec<Item>, FetchError>;
}

/// Fans a fetch out over every registered source for a kind
pub struct SourceAggregator {
    /// Sources of every kind, in registration order
    sources: Vec<Arc<dyn ContentSource>>,
    /// Budget for each source before it is abandoned
    timeout: Duration,
}

impl Default for SourceAggregator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SourceAggregator {
    /// Creates an aggregator with the default per-source timeout
    ///
    /// # Arguments
    /// * `sources` - Sources of any kind; results fold in this order
    pub fn new(sources: Vec<Arc<dyn ContentSource>>) -> Self {
        Self {
            sources,
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    /// Overrides the per-source timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of sources registered for `kind`
    pub fn source_count(&self, kind: ContentKind) -> usize {
        self.sources.iter().filter(|s| s.kind() == kind).count()
    }

    async fn fetch_one(&self, source: &dyn ContentSource) -> Result<Vec<Item>, FetchError> {
        match tokio::time::timeout(self.timeout, source.fetch_items()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl ContentFetcher for SourceAggregator {
    async fn fetch(&self, kind: ContentKind) -> Vec<Item> {
        let sources: Vec<&dyn ContentSource> = self
            .sources
            .iter()
            .filter(|s| s.kind() == kind)
            .map(|s| s.as_ref())
            .collect();

        let results =
            futures::future::join_all(sources.iter().map(|source| self.fetch_one(*source))).await;

        let mut seen = HashSet::new();
        let mut items = Vec::new();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(fetched) => {
                    debug!(%kind, source = source.name(), count = fetched.len(), "Source fetched");
                    for item in fetched {
                        if seen.insert(item.text().to_lowercase()) {
                            items.push(item);
                        }
                    }
                }
                Err(e) => {
                    warn!(%kind, source = source.name(), error = %e, "Source fetch failed");
                }
            }
        }

        info!(%kind, sources = sources.len(), count = items.len(), "Fetched content");
        items
    }
}
