//! Sodexo BiteMenu client
//!
//! Issues the single outbound request made per cache miss and hands the raw
//! page body back to the caller. There is no retry loop here; a failed
//! request is reported as `UpstreamUnavailable` and the caller decides.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::DateKey;
use crate::config::Config;
use crate::error::MenuError;

/// Default endpoint serving the menu page
pub const DEFAULT_BASE_URL: &str = "http://menus.sodexomyway.com/BiteMenu/MenuOnly";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Source of raw menu pages
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    /// Fetches the page that contains the menu for `date`
    async fn fetch(&self, date: DateKey) -> Result<String, MenuError>;
}

/// Client for the BiteMenu endpoint
#[derive(Debug, Clone)]
pub struct SodexoClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Endpoint to query (allows override for testing)
    base_url: String,
    menu_id: String,
    location_id: String,
    where_am_i: String,
}

impl SodexoClient {
    /// Creates a client from validated configuration
    ///
    /// Fails with `MenuError::Config` if any of the three identities is
    /// missing, so no request is ever built from partial configuration.
    pub fn from_config(config: &Config) -> Result<Self, MenuError> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                MenuError::UpstreamUnavailable(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            menu_id: config.menu_id.clone(),
            location_id: config.location_id.clone(),
            where_am_i: config.where_am_i.clone(),
        })
    }

    /// Query parameters sent for `date`
    fn query(&self, date: DateKey) -> [(&'static str, String); 4] {
        [
            ("menuId", self.menu_id.clone()),
            ("locationId", self.location_id.clone()),
            ("whereami", self.where_am_i.clone()),
            ("startDate", date.to_string()),
        ]
    }
}

#[async_trait]
impl UpstreamFetcher for SodexoClient {
    async fn fetch(&self, date: DateKey) -> Result<String, MenuError> {
        info!(%date, url = %self.base_url, "fetching menu page");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&self.query(date))
            .send()
            .await
            .map_err(|e| MenuError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MenuError::UpstreamUnavailable(format!("HTTP status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MenuError::UpstreamUnavailable(e.to_string()))?;
        debug!(%date, bytes = body.len(), "received menu page");
        Ok(body)
    }
}
