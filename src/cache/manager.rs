//! File-backed menu cache
//!
//! Stores each date's menu as a JSON file named by the date's cache key
//! (`MM_DD_YYYY.json`), so entries survive process restarts. Entries are
//! written to a temporary file in the same directory and then moved into
//! place, so a reader sees either no file or a complete one.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{CacheStore, CachedMenu};
use crate::data::{DateKey, Menu};

/// On-disk record for one date
///
/// `menu: null` is the known-empty marker. Unknown fields are ignored on read
/// so newer writers do not break older readers.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// The cached menu, or `None` for known-empty
    menu: Option<Menu>,
    /// When the entry was written
    cached_at: DateTime<Utc>,
}

/// Stores menus as JSON files in a cache directory
///
/// Uses an XDG-compliant cache directory (`~/.cache/menunav/` on Linux) unless
/// a directory is supplied.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileCacheStore {
    /// Creates a store in the platform cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "menunav")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a store rooted at a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to the cache file for the given date
    fn cache_path(&self, date: DateKey) -> PathBuf {
        self.cache_dir.join(format!("{}.json", date.cache_key()))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    fn encode(menu: Option<&Menu>) -> std::io::Result<String> {
        let entry = CacheEntry {
            menu: menu.cloned(),
            cached_at: Utc::now(),
        };
        serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))
    }

    /// Writes an entry to a temporary file beside its final path
    fn stage(&self, menu: Option<&Menu>) -> std::io::Result<NamedTempFile> {
        self.ensure_dir()?;
        let json = Self::encode(menu)?;
        let mut staged = NamedTempFile::new_in(&self.cache_dir)?;
        staged.write_all(json.as_bytes())?;
        staged.as_file().sync_all()?;
        Ok(staged)
    }

    fn write(&self, date: DateKey, menu: Option<&Menu>) -> std::io::Result<()> {
        self.stage(menu)?
            .persist(self.cache_path(date))
            .map(drop)
            .map_err(|e| e.error)
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, date: DateKey) -> Option<CachedMenu> {
        let path = self.cache_path(date);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable cache entry, treating as miss"
                );
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&content) {
            Ok(entry) => {
                debug!(%date, cached_at = %entry.cached_at, "cache entry loaded");
                Some(entry.menu.map_or(CachedMenu::KnownEmpty, CachedMenu::Menu))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt cache entry, treating as miss");
                None
            }
        }
    }

    fn put(&self, date: DateKey, menu: &Menu) -> std::io::Result<()> {
        self.write(date, Some(menu))
    }

    fn put_empty(&self, date: DateKey) -> std::io::Result<()> {
        self.write(date, None)
    }

    fn put_if_absent(&self, date: DateKey, menu: &Menu) -> std::io::Result<bool> {
        let path = self.cache_path(date);
        if path.exists() {
            return Ok(false);
        }

        // The no-clobber rename is the existence check; a failed write never
        // leaves a partial entry at the final path
        match self.stage(Some(menu))?.persist_noclobber(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.error),
        }
    }
}
