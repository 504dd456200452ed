//! Shopify connector - exposes Shopify orders to the sync host.
//!
//! # Architecture
//!
//! ```text
//!            Shopify REST Admin API
//!                     ↑
//!     OAuth (merchant authorizes the app)
//!                     ↑
//! ┌─────────────────────────────────────────┐
//! │       ShopifyConnector (per shop)        │
//! │  - Self-test, webhook reconciliation     │
//! │  - Access token in ParameterStore        │
//! └─────────────────────────────────────────┘
//!                     ↑
//! ┌─────────────────────────────────────────┐
//! │       OrderAdapter                       │
//! │  - Paginated listing                     │
//! │  - Load + relay point enrichment         │
//! │  - Read-only guard, fulfillment hook     │
//! └─────────────────────────────────────────┘
//!                     ↑
//!        Host actions + order endpoints
//! ```
//!
//! # Core Types
//!
//! - [`ShopifyConnector`] - Host [`Connector`](shopify_sync::connector::Connector) for one shop
//! - [`OrderAdapter`] - Order [`ObjectAdapter`](shopify_sync::object::ObjectAdapter)
//! - [`ShopifyOAuthProvider`] - OAuth2 provider registered as `"shopify"`
//! - [`ShopifyConnectorFactory`] - Creates connectors for the host actions

pub mod api;
pub mod connectors;
pub mod registry;

pub use connectors::shopify::config::{load_shopify_config, ShopifyConfig, WebserviceConfig};
pub use connectors::shopify::oauth::ShopifyOAuthProvider;
pub use connectors::shopify::orders::{FulfillmentHook, OrderAdapter, ShopifyFulfillmentHook};
pub use connectors::shopify::ShopifyConnector;
pub use registry::{register_oauth_client, ShopifyConnectorFactory};
