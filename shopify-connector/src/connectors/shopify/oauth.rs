use async_trait::async_trait;
use shopify_sync::connector::Connector;
use shopify_sync::oauth::{
    exchange_code_for_token, AccessToken, AuthorizationOptions, OAuth2Provider, OAuthError,
};

use super::config::{CLIENT_ID, CLIENT_SECRET, CONNECTOR_TYPE, WS_HOST};

/// Shopify OAuth2 provider for one shop.
///
/// Starts unconfigured; [`OAuth2Provider::configure`] reads the shop URL and
/// app credentials from the connector's parameters.
pub struct ShopifyOAuthProvider {
    shop_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    scopes: Vec<String>,
    redirect_uri: String,
}

impl ShopifyOAuthProvider {
    /// # Arguments
    /// * `scopes` - Access scopes requested by default
    /// * `redirect_uri` - Public URL of the OAuth callback endpoint
    pub fn new(scopes: Vec<String>, redirect_uri: String) -> Self {
        Self {
            shop_url: None,
            client_id: None,
            client_secret: None,
            scopes,
            redirect_uri,
        }
    }

    fn shop_url(&self) -> Result<&str, OAuthError> {
        self.shop_url
            .as_deref()
            .ok_or_else(|| OAuthError::NotConfigured("shop URL".to_string()))
    }

    fn client_id(&self) -> Result<&str, OAuthError> {
        self.client_id
            .as_deref()
            .ok_or_else(|| OAuthError::NotConfigured("client id".to_string()))
    }

    fn client_secret(&self) -> Result<&str, OAuthError> {
        self.client_secret
            .as_deref()
            .ok_or_else(|| OAuthError::NotConfigured("client secret".to_string()))
    }

    pub fn token_url(&self) -> Result<String, OAuthError> {
        Ok(format!("{}/admin/oauth/access_token", self.shop_url()?))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().trim_end_matches('/'))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl OAuth2Provider for ShopifyOAuthProvider {
    fn provider_type(&self) -> &str {
        CONNECTOR_TYPE
    }

    fn configure(&mut self, connector: &dyn Connector) {
        self.shop_url = non_empty(connector.parameter(WS_HOST));
        self.client_id = non_empty(connector.parameter(CLIENT_ID));
        self.client_secret = non_empty(connector.parameter(CLIENT_SECRET));
    }

    fn default_scopes(&self) -> Vec<String> {
        self.scopes.clone()
    }

    fn authorization_url(
        &self,
        scopes: &[String],
        state: &str,
        options: &AuthorizationOptions,
    ) -> Result<String, OAuthError> {
        let scope = scopes.join(",");
        let mut params: Vec<(&str, &str)> = vec![
            ("client_id", self.client_id()?),
            ("scope", scope.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        if !state.is_empty() {
            params.push(("state", state));
        }
        for (name, value) in options {
            params.push((name.as_str(), value.as_str()));
        }

        let query = serde_urlencoded::to_string(&params)
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;
        Ok(format!("{}/admin/oauth/authorize?{}", self.shop_url()?, query))
    }

    async fn access_token(&self, code: &str) -> Result<AccessToken, OAuthError> {
        exchange_code_for_token(
            &self.token_url()?,
            code,
            None,
            self.client_id()?,
            self.client_secret()?,
        )
        .await
    }
}
