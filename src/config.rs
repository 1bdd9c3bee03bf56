//! Client configuration
//!
//! A config file holds one section per role, so a single file can carry
//! credentials for several accounts:
//!
//! ```yaml
//! trustar:
//!   user_api_key: "..."
//!   user_api_secret: "..."
//!   enclave_ids: [ac6a0d17-7350-4410-bc57-9699521db992]
//! staging:
//!   api_endpoint: "https://staging.trustar.co/api/1.3"
//!   user_api_key: "..."
//!   user_api_secret: "..."
//! ```
//!
//! Values from `TRUSTAR_*` environment variables take precedence over the file.

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Section read when no role is given
pub const DEFAULT_ROLE: &str = "trustar";

/// Default OAuth2 token endpoint
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://api.trustar.co/oauth/token";

/// Default REST API base URL
pub const DEFAULT_API_ENDPOINT: &str = "https://api.trustar.co/api/1.3";

/// Default web UI base URL, used for deeplinks
pub const DEFAULT_STATION: &str = "https://station.trustar.co";

// ============================================================================
// TruStarConfig
// ============================================================================

/// Settings for one TruSTAR account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruStarConfig {
    /// OAuth2 token endpoint
    pub auth_endpoint: String,
    /// REST API base URL
    pub api_endpoint: String,
    /// Web UI base URL
    pub station: String,
    pub user_api_key: Option<String>,
    pub user_api_secret: Option<String>,
    /// Enclaves used when a call does not name any; a comma-separated string
    /// is accepted as well as a list
    #[serde(deserialize_with = "deserialize_enclave_ids")]
    pub enclave_ids: Vec<String>,
    /// Sent as the `Client-Metatag` header to identify the integration
    pub client_metatag: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    /// Client-side request budget; 0 disables throttling
    pub requests_per_second: u32,
}

impl Default for TruStarConfig {
    fn default() -> Self {
        Self {
            auth_endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            station: DEFAULT_STATION.to_string(),
            user_api_key: None,
            user_api_secret: None,
            enclave_ids: Vec::new(),
            client_metatag: None,
            request_timeout_secs: 30,
            max_retries: 3,
            requests_per_second: 5,
        }
    }
}

impl TruStarConfig {
    /// Config with credentials and defaults for everything else
    pub fn new(user_api_key: impl Into<String>, user_api_secret: impl Into<String>) -> Self {
        Self {
            user_api_key: Some(user_api_key.into()),
            user_api_secret: Some(user_api_secret.into()),
            ..Self::default()
        }
    }

    /// Set the default enclaves
    #[must_use]
    pub fn with_enclave_ids(mut self, enclave_ids: Vec<String>) -> Self {
        self.enclave_ids = enclave_ids;
        self
    }

    /// Point both endpoints at another host
    #[must_use]
    pub fn with_endpoints(
        mut self,
        auth_endpoint: impl Into<String>,
        api_endpoint: impl Into<String>,
    ) -> Self {
        self.auth_endpoint = auth_endpoint.into();
        self.api_endpoint = api_endpoint.into();
        self
    }

    /// Set the web UI base URL
    #[must_use]
    pub fn with_station(mut self, station: impl Into<String>) -> Self {
        self.station = station.into();
        self
    }

    /// Set the client metatag
    #[must_use]
    pub fn with_client_metatag(mut self, metatag: impl Into<String>) -> Self {
        self.client_metatag = Some(metatag.into());
        self
    }

    /// Set the request budget; 0 disables throttling
    #[must_use]
    pub fn with_requests_per_second(mut self, requests_per_second: u32) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Read the `role` section of a config file, apply environment
    /// overrides and validate the result
    pub fn load(path: impl AsRef<Path>, role: &str) -> Result<Self> {
        let mut config = Self::from_file(path, role)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read the `role` section of a YAML file
    pub fn from_file(path: impl AsRef<Path>, role: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml_str(&content, role)
    }

    /// Parse the `role` section of a YAML document
    pub fn from_yaml_str(yaml: &str, role: &str) -> Result<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let section = document
            .get(role)
            .cloned()
            .ok_or_else(|| Error::config(format!("No '{role}' section in config")))?;

        // An empty section (`trustar:`) means all defaults
        if section.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(section)?)
    }

    /// Overlay `TRUSTAR_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Overlay values from `lookup`, keyed by environment variable name
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = value("TRUSTAR_USER_API_KEY") {
            self.user_api_key = Some(key);
        }
        if let Some(secret) = value("TRUSTAR_USER_API_SECRET") {
            self.user_api_secret = Some(secret);
        }
        if let Some(endpoint) = value("TRUSTAR_API_ENDPOINT") {
            self.api_endpoint = endpoint;
        }
        if let Some(endpoint) = value("TRUSTAR_AUTH_ENDPOINT") {
            self.auth_endpoint = endpoint;
        }
        if let Some(ids) = value("TRUSTAR_ENCLAVE_IDS") {
            self.enclave_ids = split_enclave_ids(&ids);
        }
    }

    // ------------------------------------------------------------------------
    // Validation and derived settings
    // ------------------------------------------------------------------------

    /// Check credentials are present and endpoints are URLs
    pub fn validate(&self) -> Result<()> {
        require(self.user_api_key.as_deref(), "user_api_key")?;
        require(self.user_api_secret.as_deref(), "user_api_secret")?;

        for (field, value) in [
            ("auth_endpoint", &self.auth_endpoint),
            ("api_endpoint", &self.api_endpoint),
            ("station", &self.station),
        ] {
            Url::parse(value).map_err(|e| Error::invalid_value(field, e.to_string()))?;
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::invalid_value(
                "request_timeout_secs",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Transport settings derived from this config
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.api_endpoint)
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .max_retries(self.max_retries);

        builder = match self.requests_per_second {
            0 => builder.no_rate_limit(),
            rps => builder.rate_limit(RateLimiterConfig::per_second(rps)),
        };
        if let Some(ref metatag) = self.client_metatag {
            builder = builder.header("Client-Metatag", metatag);
        }
        builder.build()
    }

    /// Client credentials auth against `auth_endpoint`
    pub fn auth_config(&self) -> Result<AuthConfig> {
        let api_key = require(self.user_api_key.as_deref(), "user_api_key")?;
        let api_secret = require(self.user_api_secret.as_deref(), "user_api_secret")?;
        Ok(AuthConfig::client_credentials(
            &self.auth_endpoint,
            api_key,
            api_secret,
        ))
    }
}

impl fmt::Debug for TruStarConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TruStarConfig")
            .field("auth_endpoint", &self.auth_endpoint)
            .field("api_endpoint", &self.api_endpoint)
            .field("station", &self.station)
            .field("user_api_key", &self.user_api_key)
            .field("has_user_api_secret", &self.user_api_secret.is_some())
            .field("enclave_ids", &self.enclave_ids)
            .field("client_metatag", &self.client_metatag)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

fn require<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::missing_field(field))
}

fn split_enclave_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEnclaveIds {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_enclave_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawEnclaveIds>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(RawEnclaveIds::Joined(raw)) => split_enclave_ids(&raw),
        Some(RawEnclaveIds::List(ids)) => ids,
    })
}
