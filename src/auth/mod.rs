//! Authentication module
//!
//! Supports: None, Bearer, OAuth2 Client Credentials
//!
//! The `Authenticator` applies credentials to each request and caches the
//! access token obtained through the client credentials flow.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken};
