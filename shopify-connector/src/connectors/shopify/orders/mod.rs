//! Shopify orders as a host object type.
//!
//! Orders are read-only from the host's side: they can be listed and loaded
//! (with relay point enrichment), while create/update/delete are rejected.
//! The one write that reaches Shopify is a pending `fulfillments` change,
//! forwarded to a [`FulfillmentHook`] during `update`.

mod crud;
mod list;

pub use crud::{reject_create, reject_delete};


use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde_json::Value;
use shopify_sync::object::{
    ListingPage, ObjectAdapter, ObjectError, ObjectRecord, Pagination, Result,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::api::{FulfillmentRequest, ShopifyClient};
use super::helpers::EnabledPlugins;
use super::transformer::OrderSummary;

/// Field whose pending change triggers the fulfillment hook.
pub const FULFILLMENTS_FIELD: &str = "fulfillments";

/// Propagates a fulfillment change written by the host.
#[async_trait]
pub trait FulfillmentHook: Send + Sync {
    /// # Arguments
    /// * `order` - The current order, if one is loaded
    /// * `fulfillments` - Pending value of the `fulfillments` field
    async fn update_fulfillment(
        &self,
        order: Option<&ObjectRecord>,
        fulfillments: &Value,
    ) -> anyhow::Result<()>;
}

/// Posts pending fulfillments to `POST /orders/{id}/fulfillments.json`.
pub struct ShopifyFulfillmentHook {
    client: Arc<ShopifyClient>,
}

impl ShopifyFulfillmentHook {
    pub fn new(client: Arc<ShopifyClient>) -> Self {
        Self { client }
    }
}

/// Fulfillments as an object or an array of objects.
fn fulfillment_requests(fulfillments: &Value) -> anyhow::Result<Vec<FulfillmentRequest>> {
    let entries = match fulfillments {
        Value::Array(entries) => entries.clone(),
        Value::Object(_) => vec![fulfillments.clone()],
        Value::Null => Vec::new(),
        other => return Err(anyhow!("Unsupported fulfillments value: {}", other)),
    };
    entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).context("Invalid fulfillment"))
        .collect()
}

#[async_trait]
impl FulfillmentHook for ShopifyFulfillmentHook {
    async fn update_fulfillment(
        &self,
        order: Option<&ObjectRecord>,
        fulfillments: &Value,
    ) -> anyhow::Result<()> {
        let order_id = order
            .and_then(ObjectRecord::id)
            .ok_or_else(|| anyhow!("No order loaded"))?;

        for request in fulfillment_requests(fulfillments)? {
            self.client
                .create_fulfillment(&order_id, &request)
                .await
                .with_context(|| format!("Failed to fulfill order {}", order_id))?;
            info!(
                order_id = %order_id,
                tracking_number = ?request.tracking_number,
                "Fulfillment created"
            );
        }
        Ok(())
    }
}

/// Order adapter for one webservice.
pub struct OrderAdapter {
    client: Arc<ShopifyClient>,
    plugins: EnabledPlugins,
    object: Option<ObjectRecord>,
    pending: BTreeMap<String, Value>,
    fulfillment_hook: Option<Arc<dyn FulfillmentHook>>,
}

impl OrderAdapter {
    pub fn new(client: Arc<ShopifyClient>, plugins: EnabledPlugins) -> Self {
        Self {
            client,
            plugins,
            object: None,
            pending: BTreeMap::new(),
            fulfillment_hook: None,
        }
    }

    pub fn with_fulfillment_hook(mut self, hook: Arc<dyn FulfillmentHook>) -> Self {
        self.fulfillment_hook = Some(hook);
        self
    }

    /// Whether the host changed `name` since the last update
    pub fn is_to_update(&self, name: &str) -> bool {
        self.pending.contains_key(name)
    }
}

#[async_trait]
impl ObjectAdapter for OrderAdapter {
    type Summary = OrderSummary;

    async fn objects_list(
        &self,
        _filter: Option<&str>,
        pagination: Option<&Pagination>,
    ) -> Result<ListingPage<OrderSummary>> {
        list::list_orders(&self.client, pagination).await
    }

    async fn load(&mut self, object_id: &str) -> Result<ObjectRecord> {
        let record = crud::load_order(&self.client, self.plugins, object_id).await?;
        self.object = Some(record.clone());
        self.pending.clear();
        Ok(record)
    }

    async fn create(&mut self) -> Result<String> {
        Err(crud::reject_create())
    }

    async fn update(&mut self, needed: bool) -> Result<String> {
        if let (Some(fulfillments), Some(hook)) =
            (self.pending.get(FULFILLMENTS_FIELD), &self.fulfillment_hook)
        {
            if let Err(e) = hook
                .update_fulfillment(self.object.as_ref(), fulfillments)
                .await
            {
                warn!(error = %format!("{:#}", e), "Fulfillment update failed");
            }
        }
        self.pending.clear();

        if needed {
            return Err(crud::reject_update());
        }
        self.object_identifier()
            .ok_or(ObjectError::MissingIdentifier)
    }

    async fn delete(&mut self, object_id: &str) -> Result<()> {
        Err(crud::reject_delete(object_id))
    }

    fn set_field(&mut self, name: &str, value: Value) {
        self.pending.insert(name.to_string(), value);
    }

    fn object_identifier(&self) -> Option<String> {
        self.object.as_ref().and_then(ObjectRecord::id)
    }
}
