//! Host-side connector interface.
//!
//! A connector is one configured integration instance, addressed by its
//! webservice id. The host creates a blank connector per request through a
//! [`ConnectorFactory`] and binds it to an instance with
//! [`Connector::identify`].

use anyhow::Result;
use async_trait::async_trait;

/// Connector interface used by the host actions (OAuth, webhooks).
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connector kind, e.g. `"shopify"`. Used to reject foreign connectors.
    fn connector_type(&self) -> &str;

    /// Id of the bound instance, `None` before a successful `identify`.
    fn webservice_id(&self) -> Option<&str>;

    /// Bind this connector to the instance `webservice_id`.
    ///
    /// Returns `false` when no such instance is configured.
    fn identify(&mut self, webservice_id: &str) -> bool;

    /// Current value of a configuration parameter.
    fn parameter(&self, name: &str) -> Option<&str>;

    /// Change a configuration parameter in memory.
    fn set_parameter(&mut self, name: &str, value: &str);

    /// Persist the in-memory parameters of the bound instance.
    fn update_configuration(&self) -> Result<()>;

    /// Check configuration and connectivity to the external API.
    async fn self_test(&self) -> bool;

    /// Reconcile the external webhook subscriptions with the wanted set.
    async fn update_webhooks(&self, urls: &dyn UrlGenerator) -> bool;
}

/// Creates unbound connectors, one per request.
pub trait ConnectorFactory: Send + Sync {
    fn create(&self) -> Box<dyn Connector>;
}

/// Computes public URLs the external platform calls back.
pub trait UrlGenerator: Send + Sync {
    fn webhook_url(&self, connector_type: &str, webservice_id: &str) -> String;
}

/// URL generator rooted at the public base URL of this server.
#[derive(Clone, Debug)]
pub struct PublicUrls {
    base_url: String,
}

impl PublicUrls {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl UrlGenerator for PublicUrls {
    fn webhook_url(&self, connector_type: &str, webservice_id: &str) -> String {
        format!(
            "{}/ws/{}/{}/webhook",
            self.base_url,
            connector_type,
            urlencoding::encode(webservice_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_url() {
        let urls = PublicUrls::new("https://sync.example.com/");
        assert_eq!(
            urls.webhook_url("shopify", "ws-1"),
            "https://sync.example.com/ws/shopify/ws-1/webhook"
        );
    }

    #[test]
    fn test_webhook_url_encodes_id() {
        let urls = PublicUrls::new("http://localhost:3001");
        assert_eq!(
            urls.webhook_url("shopify", "my shop"),
            "http://localhost:3001/ws/shopify/my%20shop/webhook"
        );
    }
}
