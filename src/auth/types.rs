//! Auth configuration types

use chrono::{DateTime, Utc};
use std::fmt;

/// How requests to the API are authenticated
#[derive(Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// A fixed bearer token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// OAuth2 client credentials, exchanged for a short-lived bearer token
    ///
    /// The key and secret are sent as HTTP basic auth to `token_url`.
    ClientCredentials {
        /// Token endpoint URL
        token_url: String,
        /// User API key
        api_key: String,
        /// User API secret
        api_secret: String,
    },
}

impl AuthConfig {
    /// Client credentials auth against `token_url`
    pub fn client_credentials(
        token_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self::ClientCredentials {
            token_url: token_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Whether this auth type fetches and caches tokens
    pub fn requires_token(&self) -> bool {
        matches!(self, Self::ClientCredentials { .. })
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer { .. } => f.debug_struct("Bearer").finish_non_exhaustive(),
            Self::ClientCredentials {
                token_url, api_key, ..
            } => f
                .debug_struct("ClientCredentials")
                .field("token_url", token_url)
                .field("api_key", api_key)
                .finish_non_exhaustive(),
        }
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(30) >= expires_at,
            None => false,
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_cached_token_not_expired() {
        let token = CachedToken::expires_in("test".to_string(), 3600);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_cached_token_inside_buffer_is_expired() {
        let token = CachedToken::expires_in("test".to_string(), 10);
        assert!(token.is_expired());
    }

    #[test]
    fn test_cached_token_no_expiration() {
        let token = CachedToken::new("test".to_string(), None);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_auth_config_debug_hides_secrets() {
        let config = AuthConfig::client_credentials("https://auth", "key-1", "s3cret");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("key-1"));
        assert!(!rendered.contains("s3cret"));

        let bearer = AuthConfig::Bearer {
            token: "tok".to_string(),
        };
        assert!(!format!("{bearer:?}").contains("tok\""));
    }

    #[test]
    fn test_auth_config_requires_token() {
        assert!(!AuthConfig::default().requires_token());
        assert!(AuthConfig::client_credentials("u", "k", "s").requires_token());
    }
}
