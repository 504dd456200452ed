//! Connector registry - wires the Shopify connector into the host.
//!
//! The host knows connectors only through [`ConnectorFactory`] and OAuth
//! clients only through the [`ClientRegistry`]; both are filled here.

use crate::connectors::shopify::config::{ShopifyConfig, OAUTH_CLIENT};
use crate::connectors::shopify::oauth::ShopifyOAuthProvider;
use crate::connectors::shopify::ShopifyConnector;
use shopify_sync::connector::{Connector, ConnectorFactory};
use shopify_sync::oauth::{ClientRegistry, OAuth2Provider};
use shopify_sync::parameters::ParameterStore;
use std::sync::Arc;

/// Path of the fixed OAuth callback endpoint.
pub const OAUTH_CALLBACK_PATH: &str = "/oauth/register";

/// Creates unbound Shopify connectors sharing one configuration and store.
pub struct ShopifyConnectorFactory {
    config: Arc<ShopifyConfig>,
    store: Arc<ParameterStore>,
    api_base_url: Option<String>,
}

impl ShopifyConnectorFactory {
    pub fn new(config: Arc<ShopifyConfig>, store: Arc<ParameterStore>) -> Self {
        Self {
            config,
            store,
            api_base_url: None,
        }
    }

    /// Point every created connector at a custom API base URL (for testing).
    pub fn with_api_base_url(mut self, base_url: String) -> Self {
        self.api_base_url = Some(base_url);
        self
    }

    /// A fresh connector with its concrete type.
    pub fn connector(&self) -> ShopifyConnector {
        let connector = ShopifyConnector::new(Arc::clone(&self.config), Arc::clone(&self.store));
        match &self.api_base_url {
            Some(base_url) => connector.with_api_base_url(base_url.clone()),
            None => connector,
        }
    }
}

impl ConnectorFactory for ShopifyConnectorFactory {
    fn create(&self) -> Box<dyn Connector> {
        Box::new(self.connector())
    }
}

/// Register the Shopify OAuth2 client.
///
/// # Arguments
/// * `registry` - Host client registry
/// * `config` - Shopify section (default scopes)
/// * `public_url` - Public base URL of this server, used for the callback URL
pub fn register_oauth_client(registry: &mut ClientRegistry, config: &ShopifyConfig, public_url: &str) {
    let scopes = config.scopes.clone();
    let redirect_uri = format!("{}{}", public_url.trim_end_matches('/'), OAUTH_CALLBACK_PATH);

    registry.register(
        OAUTH_CLIENT,
        Arc::new(move || -> Box<dyn OAuth2Provider> {
            Box::new(ShopifyOAuthProvider::new(scopes.clone(), redirect_uri.clone()))
        }),
    );
}
