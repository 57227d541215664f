//! Core data models for menu resolution
//!
//! This module contains the normalized menu hierarchy (meal → course → item)
//! along with the pipeline stages that produce it: fetching the upstream page,
//! extracting the embedded payload, normalizing it, and resolving through the
//! cache.

pub mod date_key;
pub mod extract;
pub mod normalize;
pub mod resolver;
pub mod upstream;

pub use date_key::DateKey;
pub use extract::{MarkerExtractor, MenuExtractor, UpstreamItem, UpstreamRecord};
pub use normalize::{normalize, NormalizedBatch, Target};
pub use resolver::{MenuResolver, SelectionMode};
pub use upstream::{SodexoClient, UpstreamFetcher};

use serde::{Deserialize, Serialize};

/// A single dish on the menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Formal name of the dish
    pub name: String,
    /// Free-text description, empty when upstream gives none
    #[serde(default)]
    pub description: String,
}

/// Items sharing a course label, in the order upstream listed them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course label such as "Entrée" or "Soup"
    pub label: String,
    /// Items in arrival order
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// Courses served at one meal, labels unique within the meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    /// Meal label such as "Breakfast" or "Lunch"
    pub label: String,
    /// Courses in first-seen order
    #[serde(default)]
    pub courses: Vec<Course>,
}

/// A full day's menu, meal labels unique within the menu
///
/// Menus are immutable snapshots once produced; the resolver never edits one
/// that has been handed out or cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    /// Meals in first-seen order
    #[serde(default)]
    pub meals: Vec<Meal>,
}

impl Menu {
    /// Whether the menu has no meals at all
    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    /// Looks up a meal by its exact label
    pub fn meal(&self, label: &str) -> Option<&Meal> {
        self.meals.iter().find(|meal| meal.label == label)
    }

    /// Meal labels in display order
    pub fn meal_labels(&self) -> impl Iterator<Item = &str> {
        self.meals.iter().map(|meal| meal.label.as_str())
    }

    /// Appends an item, creating the meal and course on first sight
    ///
    /// Only used while a menu is being built by the normalizer.
    pub(crate) fn push_item(&mut self, meal_label: &str, course_label: &str, item: MenuItem) {
        let meal = match self.meals.iter().position(|m| m.label == meal_label) {
            Some(idx) => &mut self.meals[idx],
            None => {
                self.meals.push(Meal {
                    label: meal_label.to_string(),
                    courses: Vec::new(),
                });
                let last = self.meals.len() - 1;
                &mut self.meals[last]
            }
        };
        meal.push_item(course_label, item);
    }
}

impl Meal {
    /// Looks up a course by its exact label
    pub fn course(&self, label: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.label == label)
    }

    /// Course labels in display order
    pub fn course_labels(&self) -> impl Iterator<Item = &str> {
        self.courses.iter().map(|course| course.label.as_str())
    }

    fn push_item(&mut self, course_label: &str, item: MenuItem) {
        match self.courses.iter_mut().find(|c| c.label == course_label) {
            Some(course) => course.items.push(item),
            None => self.courses.push(Course {
                label: course_label.to_string(),
                items: vec![item],
            }),
        }
    }
}
