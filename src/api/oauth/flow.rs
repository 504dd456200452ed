//! Two-leg OAuth2 authorization flow, independent of HTTP.
//!
//! ```text
//! Idle ──initiate──▶ Initiated ──callback──▶ CallbackReceived
//!                                                  │ exchange code
//!                                                  ▼
//!                         Failed ◀──────────── TokenExchanged ──▶ Persisted
//! ```
//!
//! The first leg remembers the connector's webservice id in the session; the
//! second leg reads it back to re-bind the connector, since the provider
//! redirects to a fixed callback URL that carries no connector context.

use crate::connector::Connector;
use crate::oauth::{AuthorizationOptions, ClientRegistry, OAuth2Client, OAuthCallback, OAuthError};
use crate::parameters::TOKEN_PARAMETER;
use crate::session::SessionStore;
use tracing::{debug, error, info, warn};

/// Steps of the authorization flow, reported in logs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Initiated,
    CallbackReceived,
    TokenExchanged,
    Persisted,
    Failed,
}

/// What the HTTP layer should answer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Redirect the caller to this URL
    Redirect(String),
    /// Redirect the caller to the default page
    Default,
    /// Answer HTTP 400 with this message
    Failed(String),
}

/// Authorization flow bound to one named OAuth2 client.
#[derive(Clone, Debug)]
pub struct OAuthFlow {
    client_name: String,
    provider_type: String,
    session_key: String,
}

impl OAuthFlow {
    /// # Arguments
    /// * `client_name` - Registry name of the OAuth2 client
    /// * `provider_type` - Provider kind the client must wrap
    /// * `session_key` - Session key carrying the webservice id between legs
    pub fn new(client_name: &str, provider_type: &str, session_key: &str) -> Self {
        Self {
            client_name: client_name.to_string(),
            provider_type: provider_type.to_string(),
            session_key: session_key.to_string(),
        }
    }

    /// Look up the client, check its provider kind, configure it from `connector`.
    fn resolve_client(
        &self,
        registry: &ClientRegistry,
        connector: &dyn Connector,
    ) -> Option<OAuth2Client> {
        let Some(mut client) = registry.get_client(&self.client_name) else {
            warn!(client = %self.client_name, "OAuth client not registered");
            return None;
        };

        let provider_type = client.provider().provider_type();
        if provider_type != self.provider_type {
            warn!(
                client = %self.client_name,
                expected = %self.provider_type,
                actual = %provider_type,
                "OAuth provider type mismatch"
            );
            return None;
        }

        client.provider_mut().configure(connector);
        Some(client)
    }

    /// First leg: remember the connector in the session and redirect to the provider.
    pub fn initiate(
        &self,
        registry: &ClientRegistry,
        sessions: &SessionStore,
        session_id: &str,
        connector: &dyn Connector,
    ) -> FlowOutcome {
        let Some(client) = self.resolve_client(registry, connector) else {
            return FlowOutcome::Default;
        };
        let Some(webservice_id) = connector.webservice_id() else {
            warn!("OAuth start requested for an unbound connector");
            return FlowOutcome::Default;
        };

        sessions.set(session_id, &self.session_key, webservice_id);

        match client.redirect(&[], &AuthorizationOptions::new(), sessions, session_id) {
            Ok(url) => {
                info!(
                    webservice_id = %webservice_id,
                    state = ?FlowState::Initiated,
                    "Redirecting to OAuth provider"
                );
                FlowOutcome::Redirect(url)
            }
            Err(e) => {
                warn!(webservice_id = %webservice_id, error = %e, "Unable to build authorization URL");
                FlowOutcome::Default
            }
        }
    }

    /// Second leg: re-bind the connector, exchange the code, persist the token.
    pub async fn complete(
        &self,
        registry: &ClientRegistry,
        sessions: &SessionStore,
        session_id: Option<&str>,
        connector: &mut dyn Connector,
        callback: &OAuthCallback,
        referer: Option<&str>,
    ) -> FlowOutcome {
        let Some(session_id) = session_id else {
            warn!("OAuth callback without session");
            return FlowOutcome::Default;
        };
        let webservice_id = sessions
            .get(session_id, &self.session_key)
            .filter(|id| !id.is_empty());
        let Some(webservice_id) = webservice_id else {
            warn!("OAuth callback without webservice id in session");
            return FlowOutcome::Default;
        };

        if !connector.identify(&webservice_id) {
            warn!(webservice_id = %webservice_id, "OAuth callback for unknown webservice");
            return FlowOutcome::Default;
        }
        debug!(webservice_id = %webservice_id, state = ?FlowState::CallbackReceived, "Connector identified");

        let Some(mut client) = self.resolve_client(registry, &*connector) else {
            return FlowOutcome::Default;
        };
        // The webservice id already correlates both legs.
        client.set_as_stateless();

        let token = match client.get_access_token(callback, sessions, session_id).await {
            Ok(token) => token,
            Err(e) => {
                error!(
                    webservice_id = %webservice_id,
                    state = ?FlowState::Failed,
                    error = %e,
                    "Token exchange failed"
                );
                return FlowOutcome::Failed(e.to_string());
            }
        };
        debug!(webservice_id = %webservice_id, state = ?FlowState::TokenExchanged, "Access token obtained");

        connector.set_parameter(TOKEN_PARAMETER, &token.token);
        if let Err(e) = connector.update_configuration() {
            let e = OAuthError::Persist(format!("{:#}", e));
            error!(
                webservice_id = %webservice_id,
                state = ?FlowState::Failed,
                error = %e,
                "Failed to persist access token"
            );
            return FlowOutcome::Failed(e.to_string());
        }

        info!(
            webservice_id = %webservice_id,
            state = ?FlowState::Persisted,
            "OAuth flow completed successfully"
        );

        match referer.filter(|r| !r.is_empty()) {
            Some(referer) => FlowOutcome::Redirect(referer.to_string()),
            None => FlowOutcome::Default,
        }
    }
}
