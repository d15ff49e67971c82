//! Content service
//!
//! Orchestrates fetch, fallback and cache publish, and serves daily and random
//! picks from the cache. Refreshes are serialized; a read that finds the cache
//! empty triggers one, and concurrent readers in that state share it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cache::ContentCache;
use crate::content::{fallback, select_index, CategoryBucket, ContentError, ContentKind, Item};
use crate::fetch::ContentFetcher;

/// Outcome of a refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Cache timestamp after the publish
    pub last_updated: Option<DateTime<Utc>>,
    /// Items published per kind
    pub counts: HashMap<ContentKind, usize>,
    /// Kinds whose fetch came back empty and were filled from the fallback catalog
    pub fallback_kinds: Vec<ContentKind>,
}

/// Serves content from a [`ContentCache`] filled by a [`ContentFetcher`]
pub struct ContentService {
    /// Buckets served to readers
    cache: Arc<ContentCache>,
    /// Upstream content; never fails, may return nothing
    fetcher: Arc<dyn ContentFetcher>,
    /// Held for the whole of a refresh so at most one runs at a time
    refresh_lock: Mutex<()>,
}

impl ContentService {
    /// Creates a service over an existing cache
    ///
    /// # Arguments
    /// * `cache` - Cache to read from and publish into; usually empty
    /// * `fetcher` - Source of fresh items for each kind
    pub fn new(cache: Arc<ContentCache>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            refresh_lock: Mutex::new(()),
        }
    }

    /// The cache backing this service
    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Re-populates every bucket from the fetcher, falling back to built-in content
    ///
    /// Never fails because of upstream problems. Waits for any refresh already
    /// in flight, then runs its own.
    ///
    /// # Returns
    /// * `Ok(RefreshReport)` with per-kind counts and the kinds that fell back
    /// * `Err(ContentError)` only if a resolved bucket was empty, which the
    ///   fallback catalog rules out
    pub async fn refresh(&self) -> Result<RefreshReport, ContentError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Runs a refresh; callers must hold `refresh_lock`
    async fn refresh_locked(&self) -> Result<RefreshReport, ContentError> {
        let fetched = futures::future::join_all(
            ContentKind::ALL
                .iter()
                .map(|kind| self.fetcher.fetch(*kind)),
        )
        .await;

        let mut buckets = Vec::with_capacity(ContentKind::ALL.len());
        let mut counts = HashMap::new();
        let mut fallback_kinds = Vec::new();

        for (kind, items) in ContentKind::ALL.into_iter().zip(fetched) {
            let bucket = if items.is_empty() {
                warn!(%kind, "Fetch returned nothing, using fallback content");
                fallback_kinds.push(kind);
                fallback(kind)
            } else {
                CategoryBucket::new(items)
            };
            counts.insert(kind, bucket.len());
            buckets.push((kind, bucket));
        }

        self.cache.set_all(buckets)?;

        let last_updated = self.cache.last_updated();
        info!(
            quotes = counts.get(&ContentKind::Quotes).copied().unwrap_or(0),
            good_deeds = counts.get(&ContentKind::GoodDeeds).copied().unwrap_or(0),
            fallback = ?fallback_kinds,
            "Content refreshed"
        );

        Ok(RefreshReport {
            last_updated,
            counts,
            fallback_kinds,
        })
    }

    /// Returns the bucket for `kind`, refreshing first if the cache is empty
    ///
    /// Readers that queue behind an in-flight refresh re-check the cache once
    /// they get the lock and skip their own refresh if it was filled.
    async fn bucket(&self, kind: ContentKind) -> Result<CategoryBucket, ContentError> {
        let bucket = self.cache.get(kind);
        if !bucket.is_empty() {
            return Ok(bucket);
        }

        let _guard = self.refresh_lock.lock().await;
        let bucket = self.cache.get(kind);
        if !bucket.is_empty() {
            return Ok(bucket);
        }

        info!(%kind, "Cache empty, refreshing before read");
        self.refresh_locked().await?;
        let bucket = self.cache.get(kind);
        if bucket.is_empty() {
            return Err(ContentError::EmptyBucket(kind));
        }
        Ok(bucket)
    }

    /// Today's item for `kind`, using the UTC calendar date
    pub async fn get_daily(&self, kind: ContentKind) -> Result<Item, ContentError> {
        self.get_daily_on(kind, Utc::now().date_naive()).await
    }

    /// The item shown for `kind` on `date`
    ///
    /// # Arguments
    /// * `kind` - Which bucket to pick from
    /// * `date` - Calendar date; its ordinal day drives the pick
    ///
    /// # Returns
    /// * `Err(ContentError::EmptyBucket)` if the bucket is still empty after
    ///   a refresh
    pub async fn get_daily_on(&self, kind: ContentKind, date: NaiveDate) -> Result<Item, ContentError> {
        let bucket = self.bucket(kind).await?;
        select_index(date, bucket.len(), kind.daily_offset())
            .and_then(|index| bucket.get(index))
            .cloned()
            .ok_or(ContentError::EmptyBucket(kind))
    }

    /// A uniformly random item for `kind`
    pub async fn get_random(&self, kind: ContentKind) -> Result<Item, ContentError> {
        let bucket = self.bucket(kind).await?;
        bucket
            .choose_random()
            .cloned()
            .ok_or(ContentError::EmptyBucket(kind))
    }
}
