use shopify_sync::object::{ListingPage, Pagination, Result};
use tracing::{debug, warn};

use crate::connectors::shopify::api::ShopifyClient;
use crate::connectors::shopify::transformer::{order_to_summary, OrderSummary};

/// Query for the order list call.
///
/// Always asks for orders of any status; adds `limit`/`page` only for a
/// usable pagination (`max > 0`, `offset >= 0`).
pub(super) fn list_query(pagination: Option<&Pagination>) -> Vec<(&'static str, String)> {
    let mut query = vec![("status", "any".to_string())];
    if let Some((limit, page)) = pagination.and_then(Pagination::limit_and_page) {
        query.push(("limit", limit.to_string()));
        query.push(("page", page.to_string()));
    }
    query
}

/// One page of order summaries.
///
/// A failed list call yields an empty page; a failed count falls back to the
/// size of the page.
pub(super) async fn list_orders(
    client: &ShopifyClient,
    pagination: Option<&Pagination>,
) -> Result<ListingPage<OrderSummary>> {
    let orders = match client.list_orders(&list_query(pagination)).await {
        Ok(orders) => orders,
        Err(e) => {
            warn!(error = %e, "Order list request failed");
            return Ok(ListingPage::empty());
        }
    };

    if orders.is_empty() {
        debug!("No orders returned");
        return Ok(ListingPage::empty());
    }

    let total = match client.count_orders().await {
        Ok(total) => total,
        Err(e) => {
            warn!(error = %e, "Order count request failed, using page size as total");
            orders.len() as u64
        }
    };

    let items = orders
        .iter()
        .map(order_to_summary)
        .collect::<Result<Vec<_>>>()?;

    debug!(current = items.len(), total = total, "Orders listed");
    Ok(ListingPage::new(items, total))
}
