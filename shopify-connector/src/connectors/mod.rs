//! Built-in connectors.

pub mod shopify;
