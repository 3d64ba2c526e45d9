//! The signed-in merchant.

use crate::config::Profile;

/// Identity of the merchant the dashboard acts for.
///
/// Built once from the active profile and passed to whatever needs the
/// merchant id; nothing reads it from global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    profile_name: String,
    merchant_id: u64,
    business_name: Option<String>,
    wallet_number: Option<String>,
}

impl Session {
    pub fn new(profile_name: impl Into<String>, merchant_id: u64) -> Self {
        Self {
            profile_name: profile_name.into(),
            merchant_id,
            business_name: None,
            wallet_number: None,
        }
    }

    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            profile_name: profile.name.clone(),
            merchant_id: profile.merchant_id,
            business_name: profile.business_name.clone(),
            wallet_number: profile
                .wallet_number
                .clone()
                .filter(|w| !w.trim().is_empty()),
        }
    }

    pub fn merchant_id(&self) -> u64 {
        self.merchant_id
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    /// Wallet number for account lookups, when configured.
    pub fn wallet_number(&self) -> Option<&str> {
        self.wallet_number.as_deref()
    }

    /// Business name if known, else the profile name.
    pub fn display_name(&self) -> &str {
        self.business_name.as_deref().unwrap_or(&self.profile_name)
    }
}
