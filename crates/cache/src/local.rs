//! In-process memo cache for enriched tables backed by DashMap.
//! Entries are keyed by dataset path and dropped as soon as the file's
//! stamp (length + modification time) no longer matches.

use campaign_core::{CampaignResult, EnrichedTable};
use dashmap::DashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tracing::debug;

/// Cheap identity of a file on disk, used as the invalidation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileStamp {
    pub fn of(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

struct CacheEntry {
    stamp: FileStamp,
    table: Arc<EnrichedTable>,
    inserted_at: Instant,
}

/// Explicit cache object owned by the composing application.
pub struct TableCache {
    store: DashMap<PathBuf, CacheEntry>,
}

impl TableCache {
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Get the table for `path`, returns None if missing or stale.
    pub fn get(&self, path: &Path, stamp: &FileStamp) -> Option<Arc<EnrichedTable>> {
        let entry = self.store.get(path)?;
        if entry.stamp != *stamp {
            drop(entry);
            self.store.remove(path);
            metrics::counter!("cache.table.stale").increment(1);
            debug!(path = %path.display(), "Cached table is stale");
            return None;
        }
        metrics::counter!("cache.table.hit").increment(1);
        debug!(
            path = %path.display(),
            age_ms = entry.inserted_at.elapsed().as_millis() as u64,
            "Cached table hit"
        );
        Some(entry.table.clone())
    }

    /// Insert or replace the table for `path`.
    pub fn put(&self, path: PathBuf, stamp: FileStamp, table: Arc<EnrichedTable>) {
        self.store.insert(
            path,
            CacheEntry {
                stamp,
                table,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Return the cached table or build it with `load` and remember it.
    pub fn get_or_try_insert_with<F>(
        &self,
        path: &Path,
        stamp: FileStamp,
        load: F,
    ) -> CampaignResult<Arc<EnrichedTable>>
    where
        F: FnOnce() -> CampaignResult<EnrichedTable>,
    {
        if let Some(table) = self.get(path, &stamp) {
            return Ok(table);
        }
        metrics::counter!("cache.table.miss").increment(1);
        let table = Arc::new(load()?);
        self.put(path.to_path_buf(), stamp, table.clone());
        Ok(table)
    }

    /// Drop the entry for `path`. Returns `true` if one was present.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.store.remove(path).is_some()
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::CampaignError;
    use std::cell::Cell;
    use std::time::Duration;

    fn stamp(len: u64, secs: u64) -> FileStamp {
        FileStamp {
            len,
            modified: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)),
        }
    }

    #[test]
    fn test_hit_returns_same_arc_without_reloading() {
        let cache = TableCache::new();
        let path = Path::new("data/campaigns.csv");
        let loads = Cell::new(0);

        let first = cache
            .get_or_try_insert_with(path, stamp(10, 1), || {
                loads.set(loads.get() + 1);
                Ok(EnrichedTable::default())
            })
            .unwrap();
        let second = cache
            .get_or_try_insert_with(path, stamp(10, 1), || {
                loads.set(loads.get() + 1);
                Ok(EnrichedTable::default())
            })
            .unwrap();

        assert_eq!(loads.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_changed_stamp_invalidates() {
        let cache = TableCache::new();
        let path = Path::new("data/campaigns.csv");
        cache.put(path.to_path_buf(), stamp(10, 1), Arc::new(EnrichedTable::default()));

        assert!(cache.get(path, &stamp(10, 1)).is_some());
        assert!(cache.get(path, &stamp(11, 1)).is_none());
        // stale entry was evicted
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = TableCache::new();
        let path = Path::new("missing.csv");
        let result = cache.get_or_try_insert_with(path, stamp(0, 0), || {
            Err(CampaignError::MalformedRow {
                line: 2,
                reason: "bad".to_string(),
            })
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = TableCache::new();
        cache.put(PathBuf::from("a.csv"), stamp(1, 1), Arc::new(EnrichedTable::default()));
        cache.put(PathBuf::from("b.csv"), stamp(1, 1), Arc::new(EnrichedTable::default()));
        assert_eq!(cache.len(), 2);

        assert!(cache.invalidate(Path::new("a.csv")));
        assert!(!cache.invalidate(Path::new("a.csv")));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
