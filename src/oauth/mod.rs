//! Generic OAuth 2.0 authorization-code client.
//!
//! Connectors contribute an [`OAuth2Provider`] (endpoints, credentials,
//! scopes); the host wraps it in an [`OAuth2Client`] that handles the
//! redirect, the optional CSRF state, and the code exchange. Providers are
//! looked up by name in a [`ClientRegistry`].

mod client;
mod error;
mod exchange;
mod registry;

pub use client::{AuthorizationOptions, OAuth2Client, OAuth2Provider, OAUTH_STATE_KEY};
pub use error::OAuthError;
pub use exchange::exchange_code_for_token;
pub use registry::{ClientRegistry, ProviderFactory};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token obtained at the end of the authorization flow
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessToken {
    /// Access token (sent on every API request)
    pub token: String,

    /// Refresh token, when the provider issues one
    pub refresh_token: Option<String>,

    /// When the access token expires (UTC); offline tokens never do
    pub expires_at: Option<DateTime<Utc>>,

    /// Scopes actually granted
    pub scope: Option<String>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: None,
            expires_at: None,
            scope: None,
        }
    }
}

/// OAuth callback query parameters
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_callback_deserialization() {
        let query = "code=auth_code_123&state=csrf_state_456&shop=demo.myshopify.com";
        let callback: OAuthCallback = serde_urlencoded::from_str(query).unwrap();
        assert_eq!(callback.code, Some("auth_code_123".to_string()));
        assert_eq!(callback.state, Some("csrf_state_456".to_string()));
        assert_eq!(callback.error, None);

        let query = "error=access_denied&error_description=User+cancelled";
        let callback: OAuthCallback = serde_urlencoded::from_str(query).unwrap();
        assert_eq!(callback.error, Some("access_denied".to_string()));
        assert_eq!(callback.error_description, Some("User cancelled".to_string()));
        assert_eq!(callback.code, None);
    }
}
