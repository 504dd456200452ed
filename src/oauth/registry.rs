use super::{OAuth2Client, OAuth2Provider};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh, unconfigured provider
pub type ProviderFactory = Arc<dyn Fn() -> Box<dyn OAuth2Provider> + Send + Sync>;

/// Named OAuth2 clients available to the actions.
///
/// Every lookup returns a new client so per-request configuration never
/// leaks between requests.
#[derive(Default)]
pub struct ClientRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, factory: ProviderFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn get_client(&self, name: &str) -> Option<OAuth2Client> {
        self.factories
            .get(name)
            .map(|factory| OAuth2Client::new(factory()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Connector;
    use crate::oauth::{AccessToken, AuthorizationOptions, OAuthError};
    use async_trait::async_trait;

    struct NamedProvider(&'static str);

    #[async_trait]
    impl OAuth2Provider for NamedProvider {
        fn provider_type(&self) -> &str {
            self.0
        }

        fn configure(&mut self, _connector: &dyn Connector) {}

        fn default_scopes(&self) -> Vec<String> {
            Vec::new()
        }

        fn authorization_url(
            &self,
            _scopes: &[String],
            _state: &str,
            _options: &AuthorizationOptions,
        ) -> Result<String, OAuthError> {
            Ok(String::new())
        }

        async fn access_token(&self, _code: &str) -> Result<AccessToken, OAuthError> {
            Err(OAuthError::MissingCode)
        }
    }

    fn factory(name: &'static str) -> ProviderFactory {
        Arc::new(move || -> Box<dyn OAuth2Provider> { Box::new(NamedProvider(name)) })
    }

    #[test]
    fn test_get_registered_client() {
        let mut registry = ClientRegistry::new();
        registry.register("shopify", factory("shopify"));
        registry.register("woocommerce", factory("woocommerce"));

        let client = registry.get_client("shopify").unwrap();
        assert_eq!(client.provider().provider_type(), "shopify");
        assert!(!client.is_stateless());
        let other = registry.get_client("woocommerce").unwrap();
        assert_eq!(other.provider().provider_type(), "woocommerce");
    }

    #[test]
    fn test_unknown_client() {
        let registry = ClientRegistry::new();
        assert!(registry.get_client("shopify").is_none());
    }

    #[test]
    fn test_clients_are_independent() {
        let mut registry = ClientRegistry::new();
        registry.register("shopify", factory("shopify"));

        let mut first = registry.get_client("shopify").unwrap();
        first.set_as_stateless();
        let second = registry.get_client("shopify").unwrap();

        assert!(first.is_stateless());
        assert!(!second.is_stateless());
    }
}
