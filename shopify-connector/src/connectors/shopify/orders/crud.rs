use shopify_sync::object::{ObjectError, ObjectRecord, Result};
use tracing::{debug, error};

use crate::connectors::shopify::api::ShopifyClient;
use crate::connectors::shopify::helpers::{enrich, EnabledPlugins, EnrichmentContext};

/// Fetch one order and run the enabled enrichment steps on it.
pub(super) async fn load_order(
    client: &ShopifyClient,
    plugins: EnabledPlugins,
    order_id: &str,
) -> Result<ObjectRecord> {
    let order = match client.get_order(order_id).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            error!(order_id = %order_id, "Order not found");
            return Err(ObjectError::LoadFailed(order_id.to_string()));
        }
        Err(e) => {
            error!(order_id = %order_id, error = %e, "Order request failed");
            return Err(ObjectError::LoadFailed(order_id.to_string()));
        }
    };

    let mut record = ObjectRecord::new(order);
    let ctx = EnrichmentContext {
        order_id,
        plugins,
        client,
    };
    enrich(&mut record, &ctx).await;

    debug!(order_id = %order_id, "Order loaded");
    Ok(record)
}

pub fn reject_create() -> ObjectError {
    error!("Order creation rejected");
    ObjectError::CreateForbidden
}

pub(super) fn reject_update() -> ObjectError {
    error!("Order update rejected");
    ObjectError::UpdateForbidden
}

pub fn reject_delete(order_id: &str) -> ObjectError {
    error!(order_id = %order_id, "Order deletion rejected");
    ObjectError::DeleteForbidden
}
