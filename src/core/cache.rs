//! TTL cache for normalized fetch results.
//!
//! Two tiers, like the rest of the crate's caching:
//! - Memory: sharded LRU maps, so unrelated fingerprints never share a lock
//! - Disk: optional JSON files for long-lived reference data (the player
//!   directory), so a restart does not refetch it
//!
//! An entry is served only while `now < stored_at + ttl`; an expired entry is
//! removed on read and reported as a miss.

use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::{
    collections::hash_map::DefaultHasher,
    fs,
    hash::{Hash, Hasher},
    io::{Read, Write},
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
    time::Duration,
};
use tracing::{debug, warn};

use crate::models::FetchResult;
use crate::request::Fingerprint;


const SHARD_COUNT: usize = 16;

/// Default cache directory: ~/.cache/ffl-aggregator
pub fn default_cache_dir() -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".cache");
        home
    });
    base.join("ffl-aggregator")
}

/// Try to read a file into a String
pub fn try_read_to_string(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut s = String::new();

    f.read_to_string(&mut s).ok()?;

    Some(s)
}

/// Write a string to file
pub fn write_string(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut f = fs::File::create(path)?;
    f.write_all(contents.as_bytes())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub payload: FetchResult,
    pub stored_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::from_std(self.ttl)
            .unwrap_or_else(|_| chrono::Duration::weeks(52 * 100));
        match self.stored_at.checked_add_signed(ttl) {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

/// Cache occupancy, per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_entries: usize,
    pub memory_capacity: usize,
    pub disk_enabled: bool,
}

pub struct CacheStore {
    shards: Vec<Mutex<LruCache<Fingerprint, CacheEntry>>>,
    capacity: usize,
    disk_dir: Option<PathBuf>,
}

impl CacheStore {
    /// Memory-only store bounded to roughly `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let per_shard = NonZeroUsize::new(capacity.div_ceil(SHARD_COUNT).max(1))
            .unwrap_or(NonZeroUsize::MIN);
        let shards = (0..SHARD_COUNT)
            .map(|_| Mutex::new(LruCache::new(per_shard)))
            .collect();

        Self {
            shards,
            capacity: per_shard.get() * SHARD_COUNT,
            disk_dir: None,
        }
    }

    /// Enable the disk tier for persistent entries.
    pub fn with_disk_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.disk_dir = Some(dir.into());
        self
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<FetchResult> {
        self.get_at(fingerprint, Utc::now())
    }

    /// Lookup as of `now`. Expired entries are evicted and treated as a miss.
    pub fn get_at(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Option<FetchResult> {
        {
            let mut shard = self.shard(fingerprint);
            if let Some(entry) = shard.get(fingerprint) {
                if entry.is_fresh_at(now) {
                    return Some(entry.payload.clone());
                }
                debug!("Cache entry expired: {}", fingerprint);
                shard.pop(fingerprint);
            }
        }

        let entry = self.get_from_disk(fingerprint)?;
        if !entry.is_fresh_at(now) {
            let _ = self.remove_from_disk(fingerprint);
            return None;
        }

        // Promote to memory
        let payload = entry.payload.clone();
        self.shard(fingerprint).put(fingerprint.clone(), entry);
        Some(payload)
    }

    /// Store `result` for `ttl`, overwriting any existing entry.
    pub fn put(&self, fingerprint: Fingerprint, result: FetchResult, ttl: Duration) {
        let entry = CacheEntry {
            fingerprint: fingerprint.clone(),
            payload: result,
            stored_at: Utc::now(),
            ttl,
        };
        self.shard(&fingerprint).put(fingerprint, entry);
    }

    /// Like [`put`](Self::put), and also write the entry to the disk tier if enabled.
    pub fn put_persistent(&self, fingerprint: Fingerprint, result: FetchResult, ttl: Duration) {
        let entry = CacheEntry {
            fingerprint: fingerprint.clone(),
            payload: result,
            stored_at: Utc::now(),
            ttl,
        };
        if let Err(e) = self.put_to_disk(&entry) {
            warn!("Failed to persist cache entry {}: {}", fingerprint, e);
        }
        self.shard(&fingerprint).put(fingerprint, entry);
    }

    pub fn invalidate(&self, fingerprint: &Fingerprint) {
        self.shard(fingerprint).pop(fingerprint);
        let _ = self.remove_from_disk(fingerprint);
    }

    /// Clear the memory tier (the disk tier is left intact).
    pub fn clear(&self) {
        for shard in &self.shards {
            lock_shard(shard).clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_entries: self.shards.iter().map(|s| lock_shard(s).len()).sum(),
            memory_capacity: self.capacity,
            disk_enabled: self.disk_dir.is_some(),
        }
    }

    fn shard(&self, fingerprint: &Fingerprint) -> MutexGuard<'_, LruCache<Fingerprint, CacheEntry>> {
        let mut hasher = DefaultHasher::new();
        fingerprint.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % self.shards.len();
        lock_shard(&self.shards[idx])
    }

    fn disk_path(&self, fingerprint: &Fingerprint) -> Option<PathBuf> {
        self.disk_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", fingerprint.to_file_key())))
    }

    fn get_from_disk(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let path = self.disk_path(fingerprint)?;
        let content = try_read_to_string(&path)?;
        match serde_json::from_str::<CacheEntry>(&content) {
            Ok(entry) if &entry.fingerprint == fingerprint => Some(entry),
            Ok(_) => None,
            Err(e) => {
                warn!("Ignoring unreadable cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn put_to_disk(&self, entry: &CacheEntry) -> std::io::Result<()> {
        let Some(path) = self.disk_path(&entry.fingerprint) else {
            return Ok(());
        };
        let content = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        write_string(&path, &content)
    }

    fn remove_from_disk(&self, fingerprint: &Fingerprint) -> std::io::Result<()> {
        if let Some(path) = self.disk_path(fingerprint) {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(512)
    }
}

fn lock_shard(
    shard: &Mutex<LruCache<Fingerprint, CacheEntry>>,
) -> MutexGuard<'_, LruCache<Fingerprint, CacheEntry>> {
    shard.lock().unwrap_or_else(|poisoned| {
        warn!("Cache shard mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}
