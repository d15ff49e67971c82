//! Disk cache for source fetch results
//!
//! Stores the items a source last produced as JSON files with expiry
//! timestamps. Expired entries are still readable so a failing source can
//! degrade to what it returned before.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Bytes of the key digest appended to each file name
const KEY_DIGEST_BYTES: usize = 6;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug)]
pub struct CachedData<T> {
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    pub is_expired: bool,
}

/// Reads and writes cached data under one directory
///
/// Defaults to the XDG cache directory (`~/.cache/daily-content/` on Linux).
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager in the platform cache directory
    ///
    /// Returns `None` if no home directory can be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "daily-content")?;
        Some(Self {
            cache_dir: project_dirs.cache_dir().to_path_buf(),
        })
    }

    /// Creates a CacheManager rooted at `cache_dir`
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Maps an arbitrary key (e.g. a source URL) onto a safe file name
    ///
    /// The readable part is lossy, so a digest of the raw key keeps distinct
    /// keys in distinct files.
    fn cache_path(&self, key: &str) -> PathBuf {
        let readable: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c.to_ascii_lowercase() } else { '_' })
            .collect();
        let digest = Sha256::digest(key.as_bytes());
        let file_stem = format!("{}-{}", readable, hex::encode(&digest[..KEY_DIGEST_BYTES]));
        self.cache_dir.join(format!("{}.json", file_stem))
    }

    /// Writes data with a TTL in hours, creating the directory if needed
    ///
    /// # Arguments
    /// * `key` - Cache key, typically the source URL
    /// * `data` - Value to serialize as JSON
    /// * `ttl_hours` - Hours until the entry is reported as expired
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl_hours: u64) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let now = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now + Duration::hours(ttl_hours as i64),
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads an entry, expired or not
    ///
    /// Returns `None` if the entry is missing or no longer parses (for
    /// example because a cached item fails validation).
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
            is_expired: Utc::now() > entry.expires_at,
        })
    }
}
