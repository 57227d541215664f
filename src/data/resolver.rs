//! Read-through menu resolution
//!
//! `MenuResolver` is the single entry point for "what is on the menu for this
//! date". It answers from the cache when it can; otherwise it fetches the
//! upstream page once, extracts and normalizes every day in it, writes those
//! days to the cache, and returns the requested one.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{
    normalize, DateKey, MarkerExtractor, Menu, MenuExtractor, SodexoClient, Target,
    UpstreamFetcher,
};
use crate::cache::{CacheStore, FileCacheStore, MemoryCacheStore};
use crate::config::Config;
use crate::error::MenuError;

/// How the requested day is picked out of an upstream batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// The record whose date stamp equals the requested date; no match is an
    /// empty menu, remembered as known-empty
    #[default]
    Explicit,
    /// The single record upstream flags as today's; zero or several is an error
    Implicit,
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "explicit" => Ok(SelectionMode::Explicit),
            "implicit" => Ok(SelectionMode::Implicit),
            other => Err(format!(
                "unknown selection mode '{}', expected explicit or implicit",
                other
            )),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Explicit => write!(f, "explicit"),
            SelectionMode::Implicit => write!(f, "implicit"),
        }
    }
}

type InFlight = Shared<BoxFuture<'static, Result<Menu, MenuError>>>;

/// Fetch → extract → normalize → store, shared by every resolution
struct Pipeline {
    fetcher: Arc<dyn UpstreamFetcher>,
    extractor: Arc<dyn MenuExtractor>,
    cache: Arc<dyn CacheStore>,
    mode: SelectionMode,
}

impl Pipeline {
    async fn fetch_and_store(&self, date: DateKey) -> Result<Menu, MenuError> {
        // Another resolution may have finished between the caller's cache
        // check and this one being registered
        if let Some(hit) = self.cache.get(date) {
            return Ok(hit.into_menu());
        }

        info!(%date, mode = %self.mode, "menu cache miss, fetching upstream");
        let body = self.fetcher.fetch(date).await?;
        let records = self.extractor.extract(&body)?;

        let target = match self.mode {
            SelectionMode::Explicit => Target::Date(date),
            SelectionMode::Implicit => Target::Current,
        };
        let batch = normalize(&records, target)?;

        // Menus are only ever stored under their own record's date
        match batch.target_date {
            Some(found) if found == date => {
                self.store(date, || self.cache.put(date, &batch.target));
            }
            Some(found) => {
                debug!(%date, %found, "current record is for another date");
                self.store(found, || self.cache.put_if_absent(found, &batch.target).map(drop));
            }
            None => {
                debug!(%date, "upstream has no record for date, caching as known-empty");
                self.store(date, || self.cache.put_empty(date));
            }
        }

        let mut seeded = 0usize;
        for (sibling, menu) in &batch.siblings {
            match self.cache.put_if_absent(*sibling, menu) {
                Ok(true) => seeded += 1,
                Ok(false) => {}
                Err(e) => warn!(date = %sibling, error = %e, "failed to cache sibling menu"),
            }
        }
        debug!(%date, seeded, "cached sibling menus from batch");

        Ok(batch.target)
    }

    /// Cache writes never fail a resolution
    fn store(&self, date: DateKey, write: impl FnOnce() -> std::io::Result<()>) {
        if let Err(e) = write() {
            warn!(%date, error = %e, "failed to write menu cache entry");
        }
    }
}

/// Resolves menus by date through the cache
///
/// Cloning is cheap; clones share the cache and the in-flight registry, so
/// concurrent misses for the same date issue one upstream request and every
/// caller receives its result.
#[derive(Clone)]
pub struct MenuResolver {
    pipeline: Arc<Pipeline>,
    in_flight: Arc<Mutex<HashMap<DateKey, InFlight>>>,
}

impl MenuResolver {
    /// Creates a resolver using the default marker extractor
    pub fn new(
        fetcher: Arc<dyn UpstreamFetcher>,
        cache: Arc<dyn CacheStore>,
        mode: SelectionMode,
    ) -> Self {
        Self::with_extractor(fetcher, Arc::new(MarkerExtractor::default()), cache, mode)
    }

    /// Creates a resolver with a custom extractor
    pub fn with_extractor(
        fetcher: Arc<dyn UpstreamFetcher>,
        extractor: Arc<dyn MenuExtractor>,
        cache: Arc<dyn CacheStore>,
        mode: SelectionMode,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                fetcher,
                extractor,
                cache,
                mode,
            }),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Builds the production resolver: BiteMenu client, marker extractor, and
    /// the file cache (falling back to memory when no cache dir exists)
    pub fn from_config(config: &Config) -> Result<Self, MenuError> {
        let fetcher = Arc::new(SodexoClient::from_config(config)?);
        let extractor = Arc::new(MarkerExtractor::new(config.marker_id.clone()));

        let cache: Arc<dyn CacheStore> = match config.cache_dir.clone() {
            Some(dir) => Arc::new(FileCacheStore::with_dir(dir)),
            None => match FileCacheStore::new() {
                Some(store) => Arc::new(store),
                None => {
                    warn!("no cache directory available, menus will not persist");
                    Arc::new(MemoryCacheStore::new())
                }
            },
        };

        Ok(Self::with_extractor(fetcher, extractor, cache, config.mode))
    }

    /// Resolves the menu for `date`
    ///
    /// A cached entry, known-empty included, is returned without touching
    /// upstream. An empty menu is a valid answer, not an error.
    pub async fn resolve(&self, date: DateKey) -> Result<Menu, MenuError> {
        if let Some(hit) = self.pipeline.cache.get(date) {
            debug!(%date, "menu cache hit");
            return Ok(hit.into_menu());
        }

        let pending = {
            let mut in_flight = self.lock_in_flight();
            match in_flight.get(&date) {
                Some(pending) => {
                    debug!(%date, "joining in-flight fetch");
                    pending.clone()
                }
                None => {
                    let pipeline = Arc::clone(&self.pipeline);
                    let registry = Arc::clone(&self.in_flight);
                    let pending = async move {
                        let result = pipeline.fetch_and_store(date).await;
                        registry
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .remove(&date);
                        result
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(date, pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<DateKey, InFlight>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for MenuResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuResolver")
            .field("mode", &self.pipeline.mode)
            .finish_non_exhaustive()
    }
}
