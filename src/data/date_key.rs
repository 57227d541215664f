//! Canonical calendar date identity
//!
//! A `DateKey` is how the rest of the crate names a day: it is the cache
//! address, the prefix of every navigation token, and the `startDate` sent
//! upstream. It has exactly two string forms, `MM/DD/YYYY` for display and
//! requests, and `MM_DD_YYYY` for storage identifiers.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MenuError;

/// Format used for display, navigation tokens, and upstream queries
const DISPLAY_FORMAT: &str = "%m/%d/%Y";

/// Format used for cache file names
const CACHE_FORMAT: &str = "%m_%d_%Y";

/// A calendar date used to address menus
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Today's date according to the local clock
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Parses the canonical `MM/DD/YYYY` form
    ///
    /// Only the canonical form is accepted: two-digit month and day, four-digit
    /// year, slash separators. `3/1/2024` is rejected so that every valid date
    /// has exactly one token and one cache file.
    pub fn parse(input: &str) -> Result<Self, MenuError> {
        parse_fixed(input, '/').ok_or_else(|| MenuError::InvalidDate(input.to_string()))
    }

    /// Parses the storage form produced by [`DateKey::cache_key`]
    pub fn from_cache_key(key: &str) -> Result<Self, MenuError> {
        parse_fixed(key, '_').ok_or_else(|| MenuError::InvalidDate(key.to_string()))
    }

    /// Parses an upstream date stamp such as `2024-03-01T00:00:00`
    pub fn from_upstream_stamp(stamp: &str) -> Result<Self, MenuError> {
        let day = stamp.split('T').next().unwrap_or_default();
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| MenuError::MalformedPayload(format!("invalid record date: {}", stamp)))
    }

    /// The storage identifier for this date (`MM_DD_YYYY`)
    pub fn cache_key(&self) -> String {
        self.0.format(CACHE_FORMAT).to_string()
    }

    /// The day after this one, if representable
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The underlying calendar date
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

/// Parses `MM<sep>DD<sep>YYYY` with exact field widths
fn parse_fixed(input: &str, sep: char) -> Option<DateKey> {
    let mut parts = input.split(sep);
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    if month.len() != 2 || day.len() != 2 || year.len() != 4 {
        return None;
    }
    if ![month, day, year]
        .iter()
        .all(|field| field.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    Some(DateKey(date))
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
