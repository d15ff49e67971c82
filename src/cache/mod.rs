//! Caches for served content
//!
//! [`ContentCache`] is the in-memory store the service reads from. [`CacheManager`]
//! persists per-source fetch results to disk with a TTL, so a source that is
//! briefly unreachable can still contribute its last known items.

mod manager;
mod store;

pub use manager::{CacheManager, CachedData};
pub use store::ContentCache;
