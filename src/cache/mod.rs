//! Cache module for storing normalized menus
//!
//! Menus are cached per date with no expiry: once a date has been resolved,
//! the cached copy is treated as final. A date can also be cached as
//! known-empty, meaning upstream was asked and had nothing for it, which is
//! different from never having asked at all.

mod manager;
mod memory;

pub use manager::FileCacheStore;
pub use memory::MemoryCacheStore;

use crate::data::{DateKey, Menu};

/// What the cache knows about a date
#[derive(Debug, Clone, PartialEq)]
pub enum CachedMenu {
    /// A normalized menu, possibly with no meals
    Menu(Menu),
    /// Upstream was asked and confirmed it has no record for the date
    KnownEmpty,
}

impl CachedMenu {
    /// The cached menu, with known-empty mapped to an empty menu
    pub fn into_menu(self) -> Menu {
        match self {
            CachedMenu::Menu(menu) => menu,
            CachedMenu::KnownEmpty => Menu::default(),
        }
    }
}

/// Persistent mapping from date to menu
///
/// Writes through `put` and `put_empty` overwrite; `put_if_absent` never does
/// and reports whether it wrote.
pub trait CacheStore: Send + Sync {
    /// Looks up a date, `None` meaning it was never resolved
    fn get(&self, date: DateKey) -> Option<CachedMenu>;

    /// Stores a menu, replacing any previous entry
    fn put(&self, date: DateKey, menu: &Menu) -> std::io::Result<()>;

    /// Marks a date as known-empty, replacing any previous entry
    fn put_empty(&self, date: DateKey) -> std::io::Result<()>;

    /// Stores a menu only if the date has no entry yet
    fn put_if_absent(&self, date: DateKey, menu: &Menu) -> std::io::Result<bool>;
}
