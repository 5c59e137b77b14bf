//! API settings for the listing search service
//!
//! Settings live in a JSON settings file under an `ApiSettings` section:
//!
//! ```json
//! { "ApiSettings": { "BaseUrl": "http://partnerapi.funda.nl/feeds/Aanbod.svc/json", "Key": "..." } }
//! ```
//!
//! `HARVESTER_API_BASE_URL` and `HARVESTER_API_KEY` override the file values.

use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Section of the settings file holding the API settings
pub const CONFIG_SECTION_NAME: &str = "ApiSettings";
/// Base URL setting name
pub const BASE_URL_CONFIG_NAME: &str = "BaseUrl";
/// API key setting name
pub const KEY_CONFIG_NAME: &str = "Key";
/// Settings file looked up when none is given on the command line
pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";
/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "HARVESTER_API_BASE_URL";
/// Environment variable overriding the API key
pub const KEY_ENV: &str = "HARVESTER_API_KEY";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file could not be read
    #[error("failed to read settings file {path:?}: {source}")]
    Io {
        /// Settings file path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Settings file is not valid JSON
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// Settings section is absent
    #[error("{0}: cannot find the specified section in settings file")]
    MissingSection(&'static str),

    /// A required setting is absent or blank
    #[error("{0}: missing {0} setting")]
    MissingSetting(&'static str),

    /// A retrieval setting is out of range
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Endpoint and credentials of the remote search API
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSettings {
    /// Base URL, without the key path segment
    pub base_url: String,
    /// API key, sent as a path segment
    pub key: String,
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl ApiSettings {
    /// Load settings from `path`, applying environment overrides.
    ///
    /// A missing file is not an error as long as both environment variables
    /// are set.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let document = match std::fs::read_to_string(path) {
            Ok(raw) => Some(serde_json::from_str::<Value>(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Settings file {:?} not found, relying on environment", path);
                None
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::resolve(document.as_ref(), |name| std::env::var(name).ok())
    }

    /// Parse settings from a JSON document without environment overrides
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(raw)?;
        Self::resolve(Some(&document), |_| None)
    }

    /// Combine a settings document with environment lookups
    pub fn resolve<E>(document: Option<&Value>, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let section = document.and_then(|doc| doc.get(CONFIG_SECTION_NAME));
        let from_section = |name: &str| {
            section
                .and_then(|s| s.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let base_url = env(BASE_URL_ENV).or_else(|| from_section(BASE_URL_CONFIG_NAME));
        let key = env(KEY_ENV).or_else(|| from_section(KEY_CONFIG_NAME));

        if section.is_none() && (base_url.is_none() || key.is_none()) {
            return Err(ConfigError::MissingSection(CONFIG_SECTION_NAME));
        }

        let base_url = non_blank(base_url).ok_or(ConfigError::MissingSetting(BASE_URL_CONFIG_NAME))?;
        let key = non_blank(key).ok_or(ConfigError::MissingSetting(KEY_CONFIG_NAME))?;

        Ok(Self { base_url, key })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
