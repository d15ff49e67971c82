//! In-memory content cache
//!
//! Holds the active bucket for every [`ContentKind`] plus the time of the last
//! publish. Writers build replacement buckets outside the cache and publish
//! them with a single swap, so readers only ever see whole buckets.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::content::{CategoryBucket, ContentError, ContentKind, Item};

#[derive(Debug, Default)]
struct CacheState {
    buckets: HashMap<ContentKind, CategoryBucket>,
    last_updated: Option<DateTime<Utc>>,
}

/// Shared cache of active content
///
/// Starts empty and is only ever filled with non-empty buckets, so it is
/// either pristine or populated.
#[derive(Debug, Default)]
pub struct ContentCache {
    state: RwLock<CacheState>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the bucket for `kind`, empty before the first refresh
    pub fn get(&self, kind: ContentKind) -> CategoryBucket {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.buckets.get(&kind).cloned().unwrap_or_default()
    }

    /// Replaces the bucket for `kind` and stamps `last_updated`
    ///
    /// # Returns
    /// * `Err(ContentError::EmptyBucket)` if `items` is empty; the cache is left untouched
    pub fn set(&self, kind: ContentKind, items: Vec<Item>) -> Result<(), ContentError> {
        self.set_all(vec![(kind, items.into())])
    }

    /// Publishes several buckets in one swap
    ///
    /// Either every bucket is replaced or, if any is empty, none is.
    pub fn set_all(
        &self,
        buckets: Vec<(ContentKind, CategoryBucket)>,
    ) -> Result<(), ContentError> {
        if let Some((kind, _)) = buckets.iter().find(|(_, bucket)| bucket.is_empty()) {
            return Err(ContentError::EmptyBucket(*kind));
        }

        let now = Utc::now();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.buckets.extend(buckets);
        state.last_updated = Some(now);
        Ok(())
    }

    /// When content was last published, `None` before the first refresh
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_updated
    }

    /// True until the first successful publish
    pub fn is_pristine(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.buckets.is_empty()
    }
}
