//! In-process menu cache
//!
//! Same contract as the file store, held in a process-wide map. Entries are
//! lost when the process exits.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CacheStore, CachedMenu};
use crate::data::{DateKey, Menu};

/// `None` values mark known-empty dates
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<DateKey, Option<Menu>>>,
}

impl MemoryCacheStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dates with an entry, known-empty included
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave a half-written entry, so
    // poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<DateKey, Option<Menu>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DateKey, Option<Menu>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, date: DateKey) -> Option<CachedMenu> {
        self.read()
            .get(&date)
            .map(|entry| entry.clone().map_or(CachedMenu::KnownEmpty, CachedMenu::Menu))
    }

    fn put(&self, date: DateKey, menu: &Menu) -> std::io::Result<()> {
        self.write().insert(date, Some(menu.clone()));
        Ok(())
    }

    fn put_empty(&self, date: DateKey) -> std::io::Result<()> {
        self.write().insert(date, None);
        Ok(())
    }

    fn put_if_absent(&self, date: DateKey, menu: &Menu) -> std::io::Result<bool> {
        let mut entries = self.write();
        if entries.contains_key(&date) {
            return Ok(false);
        }
        entries.insert(date, Some(menu.clone()));
        Ok(true)
    }
}
