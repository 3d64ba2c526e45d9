//! Application settings configuration.

use serde::{Deserialize, Serialize};

use crate::ui::components::format::DEFAULT_DATE_FORMAT;
use crate::ui::components::pagination::{DEFAULT_PAGE_SIZE, DEFAULT_SIBLING_COUNT};

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The name of the default profile to use.
    pub default_profile: Option<String>,
    /// Rows per table page.
    pub page_size: usize,
    /// Page numbers shown either side of the current page.
    pub sibling_count: usize,
    /// ISO currency code for price columns.
    pub currency: String,
    /// `chrono` format string for date columns.
    pub date_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: None,
            page_size: DEFAULT_PAGE_SIZE,
            sibling_count: DEFAULT_SIBLING_COUNT,
            currency: "NGN".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}
