//! Error taxonomy for menu resolution
//!
//! Every failure the core can produce is a `MenuError` variant returned to the
//! caller. Nothing here is retried; the front-end decides what to show and
//! whether to try again later.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while resolving a menu
#[derive(Debug, Clone, Error)]
pub enum MenuError {
    /// The transport failed or upstream answered with a non-success status
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The response did not contain the embedded nutrition payload
    #[error("Response is missing the nutrition data block (marker id '{0}')")]
    MissingNutritionData(String),

    /// The embedded payload could not be decoded
    #[error("Malformed menu payload: {0}")]
    MalformedPayload(String),

    /// Implicit-today mode found zero or several authoritative records
    #[error("Expected exactly one current menu record, found {0}")]
    NoCurrentMenu(usize),

    /// A date string was not in `MM/DD/YYYY` form or named an impossible day
    #[error("Invalid date '{0}', expected MM/DD/YYYY")]
    InvalidDate(String),

    /// Required configuration was missing before a fetch was attempted
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MenuError {
    /// Wording suitable for showing to an end user
    pub fn user_message(&self) -> &'static str {
        match self {
            MenuError::UpstreamUnavailable(_) => {
                "The menu service is unavailable right now, please try again later."
            }
            MenuError::MissingNutritionData(_) | MenuError::MalformedPayload(_) => {
                "No menu data is available for that date."
            }
            MenuError::NoCurrentMenu(_) => "There is no menu for today.",
            MenuError::InvalidDate(_) => "Dates must be given as MM/DD/YYYY.",
            MenuError::Config(_) => "The menu service is not configured.",
        }
    }
}
