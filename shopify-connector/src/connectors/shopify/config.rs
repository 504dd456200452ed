use anyhow::{Context, Result};
use serde::Deserialize;

/// Connector kind reported to the host.
pub const CONNECTOR_TYPE: &str = "shopify";
/// Registry name of the Shopify OAuth2 client.
pub const OAUTH_CLIENT: &str = "shopify";
/// Session key carrying the webservice id between the two OAuth legs.
pub const SESSION_KEY: &str = "shopify_oauth2_wsid";

pub const DEFAULT_API_VERSION: &str = "2024-01";
pub const SCOPES: &[&str] = &["read_orders", "write_orders", "read_fulfillments", "write_fulfillments"];

/// Plugin names enabling the order enrichment steps.
pub const HAPPY_COLISSIMO_PLUGIN: &str = "happy_colissimo";
pub const MONDIAL_RELAY_PLUGIN: &str = "mondial_relay";

/// Connector parameter names.
pub const WS_HOST: &str = "WsHost";
pub const CLIENT_ID: &str = "ClientId";
pub const CLIENT_SECRET: &str = "ClientSecret";

/// One Shopify shop connected to the host.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WebserviceConfig {
    pub webservice_id: String,
    /// e.g. `https://demo.myshopify.com`
    pub shop_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Enabled shop apps, e.g. `["mondial_relay"]`
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl WebserviceConfig {
    pub fn has_plugin(&self, plugin: &str) -> bool {
        self.plugins.iter().any(|p| p == plugin)
    }
}

/// `[shopify]` section of the configuration file.
#[derive(Clone, Debug, Deserialize)]
pub struct ShopifyConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    #[serde(default)]
    pub webservices: Vec<WebserviceConfig>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_scopes() -> Vec<String> {
    SCOPES.iter().map(|s| s.to_string()).collect()
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            scopes: default_scopes(),
            webservices: Vec::new(),
        }
    }
}

impl ShopifyConfig {
    pub fn webservice(&self, webservice_id: &str) -> Option<&WebserviceConfig> {
        self.webservices
            .iter()
            .find(|ws| ws.webservice_id == webservice_id)
    }

    /// Apply `SHOPIFY_API_VERSION` on top of the file value.
    pub fn apply_env(mut self) -> Self {
        if let Ok(v) = std::env::var("SHOPIFY_API_VERSION") {
            if !v.is_empty() {
                self.api_version = v;
            }
        }
        self
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    shopify: ShopifyConfig,
}

/// Parse the `[shopify]` section out of a TOML document.
pub fn parse_shopify_config(contents: &str) -> Result<ShopifyConfig> {
    let file: ConfigFile = toml::from_str(contents).context("Failed to parse [shopify] section")?;
    Ok(file.shopify)
}

/// Load the `[shopify]` section from the configuration file.
pub fn load_shopify_config(path: &str) -> Result<ShopifyConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    parse_shopify_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[server]
port = 3001

[shopify]
api_version = "2023-10"

[[shopify.webservices]]
webservice_id = "ws-1"
shop_url = "https://demo.myshopify.com"
client_id = "client"
client_secret = "secret"
plugins = ["mondial_relay"]

[[shopify.webservices]]
webservice_id = "ws-2"
shop_url = "https://other.myshopify.com"
client_id = "client-2"
client_secret = "secret-2"
"#;

    #[test]
    fn test_parse_webservices() {
        let config = parse_shopify_config(SAMPLE).unwrap();
        assert_eq!(config.api_version, "2023-10");
        assert_eq!(config.scopes, default_scopes());
        assert_eq!(config.webservices.len(), 2);

        let ws = config.webservice("ws-1").unwrap();
        assert_eq!(ws.shop_url, "https://demo.myshopify.com");
        assert!(ws.has_plugin(MONDIAL_RELAY_PLUGIN));
        assert!(!ws.has_plugin(HAPPY_COLISSIMO_PLUGIN));

        assert!(config.webservice("ws-2").unwrap().plugins.is_empty());
        assert!(config.webservice("ws-3").is_none());
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let config = parse_shopify_config("[server]\nport = 3001\n").unwrap();
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert!(config.webservices.is_empty());
    }

    #[test]
    fn test_incomplete_webservice_rejected() {
        let result = parse_shopify_config(
            "[[shopify.webservices]]\nwebservice_id = \"ws-1\"\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_shopify_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.webservices.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_shopify_config("/nonexistent/sync.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
