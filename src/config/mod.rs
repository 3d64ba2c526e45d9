//! Configuration management for HalalNest.
//!
//! This module handles loading, saving, and validating the user's
//! configuration file, which holds merchant profiles and display settings.

mod profile;
mod settings;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use profile::Profile;
pub use settings::Settings;

/// Name of the application's configuration directory.
const APP_DIR: &str = "halalnest";

/// Name of the configuration file.
const CONFIG_FILE: &str = "config.toml";

/// Errors raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no configuration directory.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// The configuration directory could not be created.
    #[error("failed to create config directory: {0}")]
    CreateDirError(#[source] std::io::Error),

    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    ReadError(#[source] std::io::Error),

    /// The configuration file could not be written.
    #[error("failed to write config file: {0}")]
    WriteError(#[source] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    ValidationError(String),

    /// A named profile does not exist.
    #[error("profile '{0}' not found")]
    ProfileNotFound(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The full configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Application settings.
    #[serde(default)]
    pub settings: Settings,
    /// Configured merchant profiles.
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Config {
    /// Path of the default configuration file.
    pub fn config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location, returning defaults when the file is absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`, returning defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        debug!(
            path = %path.display(),
            profiles = config.profiles.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(ConfigError::WriteError)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Validate every profile and the settings.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !names.insert(profile.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if self.settings.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "page_size must be at least 1".to_string(),
            ));
        }

        if let Some(default) = &self.settings.default_profile {
            if !self.profiles.is_empty() && !names.contains(default.as_str()) {
                return Err(ConfigError::ProfileNotFound(default.clone()));
            }
        }

        Ok(())
    }

    /// Find a profile by name.
    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// The default profile, or the first one if none is marked default.
    pub fn get_default_profile(&self) -> Option<&Profile> {
        self.settings
            .default_profile
            .as_deref()
            .and_then(|name| self.get_profile(name))
            .or_else(|| self.profiles.first())
    }

    /// Pick the profile to use, preferring an explicitly requested name.
    pub fn resolve_profile(&self, requested: Option<&str>) -> Result<Profile> {
        match requested {
            Some(name) => self
                .get_profile(name)
                .cloned()
                .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string())),
            None => self.get_default_profile().cloned().ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "no profiles configured; add a [[profiles]] entry to {}",
                    Self::config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| CONFIG_FILE.to_string())
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Config {
        Config {
            settings: Settings {
                default_profile: Some("second".to_string()),
                ..Settings::default()
            },
            profiles: vec![
                Profile::new("first", "https://one.test/hialal", 1),
                Profile::new("second", "https://two.test/hialal", 2).with_business_name("Two"),
            ],
        }
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.settings.page_size, 10);
        assert_eq!(config.settings.currency, "NGN");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = sample();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[settings]
page_size = 25

[[profiles]]
name = "shop"
url = "https://api.halalnest.test/hialal"
merchant_id = 7
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings.page_size, 25);
        assert_eq!(config.settings.sibling_count, 1);
        assert_eq!(config.get_default_profile().map(|p| p.merchant_id), Some(7));
    }

    #[test]
    fn test_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "settings = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_duplicate_profile_names_rejected() {
        let mut config = sample();
        config.profiles.push(Profile::new("first", "https://three.test", 3));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate profile name 'first'"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = sample();
        config.settings.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_default_profile_rejected() {
        let mut config = sample();
        config.settings.default_profile = Some("ghost".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProfileNotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_default_profile_resolution() {
        let config = sample();
        assert_eq!(config.get_default_profile().map(|p| p.name.as_str()), Some("second"));

        let mut no_default = sample();
        no_default.settings.default_profile = None;
        assert_eq!(no_default.get_default_profile().map(|p| p.name.as_str()), Some("first"));
    }

    #[test]
    fn test_resolve_profile() {
        let config = sample();
        assert_eq!(config.resolve_profile(Some("first")).unwrap().merchant_id, 1);
        assert_eq!(config.resolve_profile(None).unwrap().merchant_id, 2);
        assert!(matches!(
            config.resolve_profile(Some("ghost")),
            Err(ConfigError::ProfileNotFound(_))
        ));
        assert!(Config::default().resolve_profile(None).is_err());
    }
}
