//! Merchant profile configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// A merchant profile.
///
/// Identifies which HalalNest backend to talk to and which merchant the
/// dashboard acts for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty, without whitespace, and unique across profiles.
    pub name: String,

    /// The API root (e.g., "https://api.halalnest.com/hialal").
    pub url: String,

    /// The merchant's numeric id.
    pub merchant_id: u64,

    /// Shown in the header when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,

    /// Wallet number used to look up the merchant's account details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_number: Option<String>,
}

impl Profile {
    /// Create a new profile.
    pub fn new(name: impl Into<String>, url: impl Into<String>, merchant_id: u64) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            merchant_id,
            business_name: None,
            wallet_number: None,
        }
    }

    /// Set the business name.
    pub fn with_business_name(mut self, business_name: impl Into<String>) -> Self {
        self.business_name = Some(business_name.into());
        self
    }

    /// Set the wallet number.
    pub fn with_wallet_number(mut self, wallet_number: impl Into<String>) -> Self {
        self.wallet_number = Some(wallet_number.into());
        self
    }

    /// Validate this profile.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL cannot be empty",
                self.name
            )));
        }

        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL must start with http:// or https://",
                self.name
            )));
        }

        if self.merchant_id == 0 {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': merchant_id must be a positive number",
                self.name
            )));
        }

        Ok(())
    }

    /// The label shown in the header.
    pub fn display_name(&self) -> &str {
        self.business_name.as_deref().unwrap_or(&self.name)
    }
}
