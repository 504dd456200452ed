pub mod api;
pub mod config;
pub mod helpers;
pub mod oauth;
pub mod orders;
pub mod transformer;
pub mod webhooks;


use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use shopify_sync::connector::{Connector, UrlGenerator};
use shopify_sync::parameters::{ParameterStore, Parameters, TOKEN_PARAMETER};
use std::sync::Arc;
use tracing::{debug, error, warn};

use self::api::ShopifyClient;
use self::config::{
    ShopifyConfig, WebserviceConfig, CLIENT_ID, CLIENT_SECRET, CONNECTOR_TYPE,
    HAPPY_COLISSIMO_PLUGIN, MONDIAL_RELAY_PLUGIN, WS_HOST,
};
use self::helpers::EnabledPlugins;
use self::orders::{OrderAdapter, ShopifyFulfillmentHook};

/// Shopify connector: one configured shop at a time, selected by
/// [`Connector::identify`].
///
/// Static settings (shop URL, app credentials, plugins) come from the
/// configuration file; the access token obtained through OAuth lives in the
/// encrypted [`ParameterStore`].
pub struct ShopifyConnector {
    config: Arc<ShopifyConfig>,
    store: Arc<ParameterStore>,
    webservice: Option<WebserviceConfig>,
    parameters: Parameters,
    api_base_url: Option<String>,
}

impl ShopifyConnector {
    pub fn new(config: Arc<ShopifyConfig>, store: Arc<ParameterStore>) -> Self {
        Self {
            config,
            store,
            webservice: None,
            parameters: Parameters::new(),
            api_base_url: None,
        }
    }

    /// Send API calls to a custom base URL (for testing with a mock server).
    pub fn with_api_base_url(mut self, base_url: String) -> Self {
        self.api_base_url = Some(base_url);
        self
    }

    pub fn has_happy_colissimo_plugin(&self) -> bool {
        self.webservice
            .as_ref()
            .is_some_and(|ws| ws.has_plugin(HAPPY_COLISSIMO_PLUGIN))
    }

    pub fn has_mondial_relay_plugin(&self) -> bool {
        self.webservice
            .as_ref()
            .is_some_and(|ws| ws.has_plugin(MONDIAL_RELAY_PLUGIN))
    }

    fn configured(&self, name: &str) -> bool {
        self.parameter(name).is_some_and(|v| !v.trim().is_empty())
    }

    /// REST client authenticated with the stored access token.
    pub fn api_client(&self) -> Result<ShopifyClient> {
        let token = self
            .parameter(TOKEN_PARAMETER)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("No access token, connect the shop first"))?
            .to_string();

        match &self.api_base_url {
            Some(base_url) => ShopifyClient::with_base_url(token, base_url.clone()),
            None => {
                let shop_url = self
                    .parameter(WS_HOST)
                    .ok_or_else(|| anyhow!("No shop URL configured"))?;
                ShopifyClient::new(shop_url, &self.config.api_version, token)
            }
        }
    }

    /// Shop apps the loader enriches orders with.
    pub fn enabled_plugins(&self) -> EnabledPlugins {
        EnabledPlugins {
            happy_colissimo: self.has_happy_colissimo_plugin(),
            mondial_relay: self.has_mondial_relay_plugin(),
        }
    }

    /// Order adapter for the bound shop, with fulfillment propagation.
    pub fn orders(&self) -> Result<OrderAdapter> {
        if self.webservice.is_none() {
            return Err(anyhow!("Connector is not bound to a webservice"));
        }
        let client = Arc::new(self.api_client()?);
        let hook = Arc::new(ShopifyFulfillmentHook::new(Arc::clone(&client)));
        Ok(OrderAdapter::new(client, self.enabled_plugins()).with_fulfillment_hook(hook))
    }
}

#[async_trait]
impl Connector for ShopifyConnector {
    fn connector_type(&self) -> &str {
        CONNECTOR_TYPE
    }

    fn webservice_id(&self) -> Option<&str> {
        self.webservice.as_ref().map(|ws| ws.webservice_id.as_str())
    }

    fn identify(&mut self, webservice_id: &str) -> bool {
        let Some(webservice) = self.config.webservice(webservice_id).cloned() else {
            debug!(webservice_id = %webservice_id, "No such Shopify webservice");
            return false;
        };

        let mut parameters = match self.store.load(webservice_id) {
            Ok(parameters) => parameters,
            Err(e) => {
                error!(webservice_id = %webservice_id, error = %format!("{:#}", e), "Failed to load parameters");
                return false;
            }
        };
        parameters.insert(WS_HOST.to_string(), webservice.shop_url.clone());
        parameters.insert(CLIENT_ID.to_string(), webservice.client_id.clone());
        parameters.insert(CLIENT_SECRET.to_string(), webservice.client_secret.clone());

        self.parameters = parameters;
        self.webservice = Some(webservice);
        true
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    fn set_parameter(&mut self, name: &str, value: &str) {
        self.parameters.insert(name.to_string(), value.to_string());
    }

    fn update_configuration(&self) -> Result<()> {
        let webservice_id = self
            .webservice_id()
            .ok_or_else(|| anyhow!("Connector is not bound to a webservice"))?;
        self.store
            .save(webservice_id, &self.parameters)
            .with_context(|| format!("Failed to save parameters of {}", webservice_id))
    }

    async fn self_test(&self) -> bool {
        for name in [WS_HOST, CLIENT_ID, TOKEN_PARAMETER] {
            if !self.configured(name) {
                warn!(webservice_id = ?self.webservice_id(), parameter = name, "Missing parameter");
                return false;
            }
        }

        let client = match self.api_client() {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Unable to build Shopify client");
                return false;
            }
        };
        match client.shop().await {
            Ok(_) => true,
            Err(e) => {
                warn!(webservice_id = ?self.webservice_id(), error = %e, "Shop request failed");
                false
            }
        }
    }

    async fn update_webhooks(&self, urls: &dyn UrlGenerator) -> bool {
        let Some(webservice_id) = self.webservice_id() else {
            return false;
        };
        let client = match self.api_client() {
            Ok(client) => client,
            Err(e) => {
                warn!(webservice_id = %webservice_id, error = %e, "Unable to build Shopify client");
                return false;
            }
        };

        let address = urls.webhook_url(CONNECTOR_TYPE, webservice_id);
        webhooks::reconcile_webhooks(&client, &address).await
    }
}
