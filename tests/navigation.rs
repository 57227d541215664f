//! End-to-end resolution and navigation against a canned upstream
//!
//! Exercises the resolver, caches, and token codec together through the
//! public API, with a fetcher that counts how often upstream is hit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use menunav::cache::{CacheStore, FileCacheStore, MemoryCacheStore};
use menunav::data::UpstreamFetcher;
use menunav::navigation::{self, encode};
use menunav::{DateKey, MenuError, MenuResolver, NavigationError, SelectionMode, View};

const PAGE: &str = r#"<html><head><title>Menu</title></head><body>
<div class='bite-menu'>...</div>
<div id='nutData' data-schools='False' class='hide'>[
  {"date":"2024-03-01T00:00:00","menuItems":[
    {"meal":"Breakfast","course":"Hot Cereal","formalName":"Oatmeal","description":"Steel cut"},
    {"meal":"Lunch","course":"Entrée","formalName":"Pasta","description":"Tomato sauce"},
    {"meal":"Lunch","course":"Soup","formalName":"Minestrone","description":""},
    {"meal":"Lunch","course":"Entrée","formalName":"Pizza","description":""}]},
  {"date":"2024-03-02T00:00:00","menuItems":[
    {"meal":"Brunch","course":"Griddle","formalName":"Pancakes","description":"Maple syrup"}]}
]</div>
</body></html>"#;

struct CountingFetcher {
    body: String,
    calls: AtomicUsize,
}

impl CountingFetcher {
    fn new(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamFetcher for CountingFetcher {
    async fn fetch(&self, _date: DateKey) -> Result<String, MenuError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}

fn key(s: &str) -> DateKey {
    DateKey::parse(s).unwrap()
}

fn memory_resolver(fetcher: Arc<CountingFetcher>) -> MenuResolver {
    MenuResolver::new(fetcher, Arc::new(MemoryCacheStore::new()), SelectionMode::Explicit)
}

#[tokio::test]
async fn test_resolve_twice_is_equal_and_fetches_once() {
    let fetcher = CountingFetcher::new(PAGE);
    let resolver = memory_resolver(fetcher.clone());

    let first = resolver.resolve(key("03/01/2024")).await.unwrap();
    let second = resolver.resolve(key("03/01/2024")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_target_contains_only_its_own_day_and_sibling_is_cached() {
    let fetcher = CountingFetcher::new(PAGE);
    let resolver = memory_resolver(fetcher.clone());

    let menu = resolver.resolve(key("03/01/2024")).await.unwrap();
    assert_eq!(menu.meal_labels().collect::<Vec<_>>(), vec!["Breakfast", "Lunch"]);
    assert!(menu.meal("Brunch").is_none());

    let next = resolver.resolve(key("03/02/2024")).await.unwrap();
    assert_eq!(next.meal_labels().collect::<Vec<_>>(), vec!["Brunch"]);
    assert_eq!(fetcher.calls(), 1, "sibling day should be a cache hit");
}

#[tokio::test]
async fn test_course_items_keep_input_order_and_empty_descriptions() {
    let resolver = memory_resolver(CountingFetcher::new(PAGE));

    let menu = resolver.resolve(key("03/01/2024")).await.unwrap();
    let entree = menu.meal("Lunch").unwrap().course("Entrée").unwrap();

    assert_eq!(entree.items.len(), 2);
    assert_eq!(entree.items[0].name, "Pasta");
    assert_eq!(entree.items[1].name, "Pizza");
    assert_eq!(entree.items[1].description, "");
}

#[tokio::test]
async fn test_encode_decode_round_trip_to_course_view() {
    let resolver = memory_resolver(CountingFetcher::new(PAGE));
    let token = encode(key("03/01/2024"), Some("Lunch"), Some("Entrée"));

    let view = navigation::decode(&token, &resolver).await.unwrap();

    match view {
        View::Course {
            date,
            meal_label,
            course,
        } => {
            assert_eq!(date, key("03/01/2024"));
            assert_eq!(meal_label, "Lunch");
            assert_eq!(course.label, "Entrée");
        }
        other => panic!("expected course view, got {other:?}"),
    }
}

#[tokio::test]
async fn test_walk_from_root_with_minted_tokens() {
    let resolver = memory_resolver(CountingFetcher::new(PAGE));

    let root = navigation::decode("03/01/2024", &resolver).await.unwrap();
    let lunch_token = root.child_token("Lunch").unwrap();

    let lunch = navigation::decode(&lunch_token, &resolver).await.unwrap();
    assert_eq!(lunch.children(), vec!["Entrée", "Soup"]);

    let soup = navigation::decode(&lunch.child_token("Soup").unwrap(), &resolver)
        .await
        .unwrap();
    assert!(matches!(
        soup,
        View::Course { ref course, .. } if course.items[0].name == "Minestrone"
    ));
}

#[tokio::test]
async fn test_meal_token_for_another_days_shape_is_unknown_meal() {
    let resolver = memory_resolver(CountingFetcher::new(PAGE));

    // Valid against 03/02's menu, but 03/01 has no brunch
    let token = encode(key("03/01/2024"), Some("Brunch"), None);
    let err = navigation::decode(&token, &resolver).await.unwrap_err();

    assert!(matches!(err, NavigationError::UnknownMeal { ref meal, .. } if meal == "Brunch"));
}

#[tokio::test]
async fn test_missing_marker_is_menu_unavailable_and_not_cached() {
    let fetcher = CountingFetcher::new("<html><body>Down for maintenance</body></html>");
    let cache = Arc::new(MemoryCacheStore::new());
    let resolver = MenuResolver::new(fetcher, cache.clone(), SelectionMode::Explicit);

    let err = navigation::decode("03/01/2024.Lunch", &resolver).await.unwrap_err();

    assert!(matches!(
        err,
        NavigationError::MenuUnavailable(MenuError::MissingNutritionData(_))
    ));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_tokens_survive_restart_with_file_cache() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let token = encode(key("03/02/2024"), Some("Brunch"), Some("Griddle"));

    {
        let cache = Arc::new(FileCacheStore::with_dir(temp_dir.path().to_path_buf()));
        let fetcher = CountingFetcher::new(PAGE);
        let resolver = MenuResolver::new(fetcher, cache, SelectionMode::Explicit);
        resolver.resolve(key("03/01/2024")).await.unwrap();
    }

    // A fresh process whose upstream is down still answers from disk
    let fetcher = CountingFetcher::new("<html></html>");
    let cache = Arc::new(FileCacheStore::with_dir(temp_dir.path().to_path_buf()));
    assert!(cache.get(key("03/02/2024")).is_some());
    let resolver = MenuResolver::new(fetcher.clone(), cache, SelectionMode::Explicit);

    let view = navigation::decode(&token, &resolver).await.unwrap();
    assert!(matches!(view, View::Course { ref course, .. } if course.items[0].name == "Pancakes"));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_invalid_date_never_reaches_fetcher() {
    let fetcher = CountingFetcher::new(PAGE);
    let resolver = memory_resolver(fetcher.clone());

    let err = navigation::decode("2024-03-01.Lunch", &resolver).await.unwrap_err();

    assert!(matches!(err, NavigationError::InvalidDate(MenuError::InvalidDate(_))));
    assert_eq!(fetcher.calls(), 0);
}

const FLAGGED_PAGE: &str = r#"<div id="nutData">[
  {"date":"2024-03-01T00:00:00","menuItems":[
    {"meal":"Lunch","course":"Soup","formalName":"Minestrone","description":""}]},
  {"date":"2024-03-02T00:00:00","isToday":true,"menuItems":[
    {"meal":"Dinner","course":"Grill","formalName":"Burger","description":""},
    {"meal":"Dinner","course":"","formalName":"Chef's Choice","description":""}]}
]</div>"#;

#[tokio::test]
async fn test_implicit_mode_keeps_other_days_navigable() {
    let fetcher = CountingFetcher::new(FLAGGED_PAGE);
    let cache = Arc::new(MemoryCacheStore::new());
    let resolver = MenuResolver::new(fetcher.clone(), cache.clone(), SelectionMode::Implicit);

    let current = resolver.resolve(key("03/01/2024")).await.unwrap();
    assert_eq!(current.meal_labels().collect::<Vec<_>>(), vec!["Dinner"]);

    let lunch = navigation::decode("03/01/2024.Lunch", &resolver).await.unwrap();
    assert_eq!(lunch.children(), vec!["Soup"]);
    let dinner = navigation::decode("03/02/2024.Dinner", &resolver).await.unwrap();
    assert_eq!(dinner.children(), vec!["Grill", ""]);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_course_with_empty_label_is_selectable() {
    let fetcher = CountingFetcher::new(FLAGGED_PAGE);
    let resolver = memory_resolver(fetcher);

    let dinner = navigation::decode("03/02/2024.Dinner", &resolver).await.unwrap();
    let token = dinner.child_token("").unwrap();
    let course = navigation::decode(&token, &resolver).await.unwrap();

    assert!(matches!(
        course,
        View::Course { ref course, .. } if course.items[0].name == "Chef's Choice"
    ));
}
