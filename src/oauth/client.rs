//! Generic OAuth2 client wrapping a provider.

use super::{AccessToken, OAuthCallback, OAuthError};
use crate::connector::Connector;
use crate::session::SessionStore;
use async_trait::async_trait;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Session key holding the CSRF state between redirect and callback
pub const OAUTH_STATE_KEY: &str = "oauth2_state";

/// Extra query parameters for the authorization URL
pub type AuthorizationOptions = BTreeMap<String, String>;

/// Provider-specific half of an OAuth2 client.
#[async_trait]
pub trait OAuth2Provider: Send + Sync {
    /// Provider kind, checked by callers before trusting the client.
    fn provider_type(&self) -> &str;

    /// Load endpoints and client credentials from a bound connector.
    fn configure(&mut self, connector: &dyn Connector);

    /// Scopes requested when the caller asks for none.
    fn default_scopes(&self) -> Vec<String>;

    /// URL the user is sent to for authorization.
    fn authorization_url(
        &self,
        scopes: &[String],
        state: &str,
        options: &AuthorizationOptions,
    ) -> Result<String, OAuthError>;

    /// Exchange an authorization code for an access token.
    async fn access_token(&self, code: &str) -> Result<AccessToken, OAuthError>;
}

/// OAuth2 client: redirect generation and code exchange around a provider.
///
/// Unless switched to stateless mode, the client stores a random CSRF state
/// in the session on redirect and requires the callback to echo it.
pub struct OAuth2Client {
    provider: Box<dyn OAuth2Provider>,
    stateless: bool,
}

impl OAuth2Client {
    pub fn new(provider: Box<dyn OAuth2Provider>) -> Self {
        Self {
            provider,
            stateless: false,
        }
    }

    pub fn provider(&self) -> &dyn OAuth2Provider {
        self.provider.as_ref()
    }

    pub fn provider_mut(&mut self) -> &mut dyn OAuth2Provider {
        self.provider.as_mut()
    }

    /// Skip CSRF state storage and validation.
    pub fn set_as_stateless(&mut self) {
        self.stateless = true;
    }

    pub fn is_stateless(&self) -> bool {
        self.stateless
    }

    /// Build the authorization redirect URL.
    ///
    /// Empty `scopes` means the provider defaults.
    pub fn redirect(
        &self,
        scopes: &[String],
        options: &AuthorizationOptions,
        sessions: &SessionStore,
        session_id: &str,
    ) -> Result<String, OAuthError> {
        let scopes = if scopes.is_empty() {
            self.provider.default_scopes()
        } else {
            scopes.to_vec()
        };

        let state = Uuid::new_v4().to_string();
        if !self.stateless {
            sessions.set(session_id, OAUTH_STATE_KEY, &state);
        }

        self.provider.authorization_url(&scopes, &state, options)
    }

    /// Validate the callback and exchange its code for an access token.
    pub async fn get_access_token(
        &self,
        callback: &OAuthCallback,
        sessions: &SessionStore,
        session_id: &str,
    ) -> Result<AccessToken, OAuthError> {
        if let Some(error) = &callback.error {
            return Err(OAuthError::Denied {
                error: error.clone(),
                description: callback
                    .error_description
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        if !self.stateless {
            let expected = sessions.remove(session_id, OAUTH_STATE_KEY);
            if expected.is_none() || expected != callback.state {
                return Err(OAuthError::InvalidState);
            }
        }

        let code = callback
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or(OAuthError::MissingCode)?;

        self.provider.access_token(code).await
    }
}
