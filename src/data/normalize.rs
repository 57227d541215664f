//! Normalization of upstream records into menus
//!
//! Every record in a batch is reshaped, not only the one that was asked for,
//! so a single fetch can seed the cache for every day upstream returned.

use std::collections::BTreeMap;

use tracing::debug;

use super::{DateKey, Menu, MenuItem, UpstreamRecord};
use crate::error::MenuError;

/// Which record in a batch the caller wants back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The record whose own date stamp equals this date
    Date(DateKey),
    /// The single record upstream flags as today's
    Current,
}

/// Result of normalizing one upstream batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    /// Date of the selected record, `None` when nothing matched
    pub target_date: Option<DateKey>,
    /// Menu for the selected record, empty when nothing matched
    pub target: Menu,
    /// Every other record in the batch, keyed by its own date
    pub siblings: BTreeMap<DateKey, Menu>,
}

/// Reshapes a single record into the meal → course → item hierarchy
pub fn normalize_record(record: &UpstreamRecord) -> Menu {
    let mut menu = Menu::default();
    for item in &record.menu_items {
        menu.push_item(
            &item.meal,
            &item.course,
            MenuItem {
                name: item.formal_name.clone(),
                description: item.description.clone(),
            },
        );
    }
    menu
}

/// Normalizes a batch and picks out the target record
///
/// With `Target::Date`, a batch lacking that date yields an empty target
/// menu. With `Target::Current`, exactly one record must carry the today
/// flag; zero or several is `NoCurrentMenu`. If upstream repeats a date, the
/// first record for it wins.
pub fn normalize(records: &[UpstreamRecord], target: Target) -> Result<NormalizedBatch, MenuError> {
    if let Target::Current = target {
        let flagged = records.iter().filter(|r| r.is_today).count();
        if flagged != 1 {
            return Err(MenuError::NoCurrentMenu(flagged));
        }
    }

    let mut batch = NormalizedBatch::default();
    for record in records {
        let date = DateKey::from_upstream_stamp(&record.date)?;
        let is_target = match target {
            Target::Date(wanted) => date == wanted,
            Target::Current => record.is_today,
        };

        if is_target && batch.target_date.is_none() {
            batch.target_date = Some(date);
            batch.target = normalize_record(record);
        } else if batch.target_date != Some(date) && !batch.siblings.contains_key(&date) {
            batch.siblings.insert(date, normalize_record(record));
        }
    }

    // An unflagged record seen before the flagged one may share its date
    if let Some(date) = batch.target_date {
        batch.siblings.remove(&date);
    }

    debug!(
        target_date = ?batch.target_date,
        siblings = batch.siblings.len(),
        "normalized upstream batch"
    );
    Ok(batch)
}
