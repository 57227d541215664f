//! menunav - daily dining menu resolution and navigation
//!
//! Resolves the menu for a date through a persistent cache, normalizes the
//! upstream payload into meal → course → item, and lets a front-end walk that
//! hierarchy with self-contained selection tokens.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod navigation;
pub mod render;

pub use data::{DateKey, Menu, MenuResolver, SelectionMode};
pub use error::MenuError;
pub use navigation::{NavigationError, NavigationToken, View};
