//! Extraction of the embedded nutrition payload
//!
//! The menu page is an HTML document with one hidden element whose inner text
//! is a JSON array of per-day records. Locating that element is the fragile
//! part, so it lives entirely behind [`MenuExtractor`]; swapping in a real
//! document query only means providing another implementation.

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::error::MenuError;

/// Element id of the payload block on the BiteMenu page
pub const DEFAULT_MARKER_ID: &str = "nutData";

/// One day's worth of menu data as upstream encodes it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpstreamRecord {
    /// Date stamp such as `2024-03-01T00:00:00`
    pub date: String,
    /// Set on the record upstream considers today's
    #[serde(rename = "isToday", default)]
    pub is_today: bool,
    /// Flat list of line items across every meal
    #[serde(rename = "menuItems", default)]
    pub menu_items: Vec<UpstreamItem>,
}

/// A single line item in an upstream record
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpstreamItem {
    /// Meal label, e.g. "Lunch"
    pub meal: String,
    /// Course label within the meal
    pub course: String,
    /// Display name of the dish
    #[serde(rename = "formalName")]
    pub formal_name: String,
    /// Free-text description; `null` upstream becomes empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Turns a raw upstream body into decoded records
pub trait MenuExtractor: Send + Sync {
    fn extract(&self, body: &str) -> Result<Vec<UpstreamRecord>, MenuError>;
}

/// Finds the payload by scanning for an element id attribute
///
/// Matches `id='<marker>'` and `id="<marker>"`, then takes everything between
/// the end of that opening tag and the next `</div>`.
#[derive(Debug, Clone)]
pub struct MarkerExtractor {
    marker_id: String,
}

impl MarkerExtractor {
    /// Creates an extractor looking for the element with this id
    pub fn new(marker_id: impl Into<String>) -> Self {
        Self {
            marker_id: marker_id.into(),
        }
    }

    /// Inner text of the marked element, if present
    fn locate<'a>(&self, body: &'a str) -> Option<&'a str> {
        let single = format!("id='{}'", self.marker_id);
        let double = format!("id=\"{}\"", self.marker_id);
        let attr_at = body.find(&single).or_else(|| body.find(&double))?;

        let open_end = attr_at + body[attr_at..].find('>')? + 1;
        let close = body[open_end..].find("</div>")?;
        Some(&body[open_end..open_end + close])
    }
}

impl Default for MarkerExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_ID)
    }
}

impl MenuExtractor for MarkerExtractor {
    fn extract(&self, body: &str) -> Result<Vec<UpstreamRecord>, MenuError> {
        let inner = match self.locate(body) {
            Some(inner) => inner.trim(),
            None => {
                warn!(
                    marker = %self.marker_id,
                    bytes = body.len(),
                    "nutrition data marker not found"
                );
                return Err(MenuError::MissingNutritionData(self.marker_id.clone()));
            }
        };

        let records = match serde_json::from_str::<Vec<UpstreamRecord>>(inner) {
            Ok(records) => records,
            Err(raw_err) => {
                // Some pages entity-encode the block's text
                debug!(error = %raw_err, "raw payload did not decode, retrying unescaped");
                serde_json::from_str(&unescape_html(inner)).map_err(|e| {
                    warn!(error = %e, "nutrition data payload is malformed");
                    MenuError::MalformedPayload(e.to_string())
                })?
            }
        };

        debug!(records = records.len(), "extracted upstream records");
        Ok(records)
    }
}

/// Decodes the handful of entities HTML serializers emit for text content
fn unescape_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[{"date":"2024-03-01T00:00:00","menuItems":[{"meal":"Lunch","course":"Entrée","formalName":"Pasta","description":"Tomato sauce"},{"meal":"Lunch","course":"Entrée","formalName":"Pizza","description":null}]}]"#;

    fn page(block: &str) -> String {
        format!(
            "<html><body><div class='menu'>header</div>{}<div>footer</div></body></html>",
            block
        )
    }

    #[test]
    fn test_extracts_single_quoted_marker() {
        let body = page(&format!(
            "<div id='nutData' data-schools='False' class='hide'>{}</div>",
            PAYLOAD
        ));
        let records = MarkerExtractor::default().extract(&body).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2024-03-01T00:00:00");
        assert!(!records[0].is_today);
        assert_eq!(records[0].menu_items.len(), 2);
        assert_eq!(records[0].menu_items[0].formal_name, "Pasta");
        assert_eq!(records[0].menu_items[1].description, "");
    }

    #[test]
    fn test_extracts_double_quoted_marker_with_whitespace() {
        let body = page(&format!(
            "<div class=\"hide\" id=\"nutData\">\n  {}\n</div>",
            PAYLOAD
        ));
        let records = MarkerExtractor::default().extract(&body).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_extracts_entity_encoded_payload() {
        let encoded = PAYLOAD.replace('"', "&quot;");
        let body = page(&format!("<div id='nutData'>{}</div>", encoded));
        let records = MarkerExtractor::default().extract(&body).unwrap();
        assert_eq!(records[0].menu_items[0].description, "Tomato sauce");
    }

    #[test]
    fn test_configurable_marker() {
        let body = page(&format!("<div id='menuPayload'>{}</div>", PAYLOAD));
        assert!(MarkerExtractor::new("menuPayload").extract(&body).is_ok());
        assert!(matches!(
            MarkerExtractor::default().extract(&body),
            Err(MenuError::MissingNutritionData(_))
        ));
    }

    #[test]
    fn test_missing_marker() {
        let err = MarkerExtractor::default()
            .extract("<html><body>Service temporarily down</body></html>")
            .unwrap_err();
        assert!(matches!(err, MenuError::MissingNutritionData(ref id) if id == "nutData"));
    }

    #[test]
    fn test_unterminated_block_is_missing() {
        let body = format!("<div id='nutData'>{}", PAYLOAD);
        assert!(matches!(
            MarkerExtractor::default().extract(&body),
            Err(MenuError::MissingNutritionData(_))
        ));
    }

    #[test]
    fn test_malformed_payload() {
        let body = page("<div id='nutData'>[{\"date\": </div>");
        assert!(matches!(
            MarkerExtractor::default().extract(&body),
            Err(MenuError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_empty_record_is_malformed() {
        let body = page("<div id='nutData'>[{}]</div>");
        assert!(matches!(
            MarkerExtractor::default().extract(&body),
            Err(MenuError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_today_flag_and_unknown_fields() {
        let body = page(
            r#"<div id='nutData'>[{"date":"2024-03-01T00:00:00","isToday":true,"dayOfWeek":"Friday","menuItems":[]}]</div>"#,
        );
        let records = MarkerExtractor::default().extract(&body).unwrap();
        assert!(records[0].is_today);
        assert!(records[0].menu_items.is_empty());
    }
}
