use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;
use shopify_sync::object::{record_id, to_canonical_datetime, ObjectError, Result};

use super::api::ShopifyOrder;

/// Listing row for one order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderSummary {
    pub id: String,
    pub name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub processed_at: String,
}

/// Order id as text, whether Shopify sent a number or a string.
pub fn order_id(order: &ShopifyOrder) -> Option<String> {
    record_id(order)
}

fn canonical_timestamp(order: &ShopifyOrder, id: &str, field: &str) -> Result<String> {
    let raw = order.get(field).and_then(Value::as_str).unwrap_or_default();
    to_canonical_datetime(raw).ok_or_else(|| ObjectError::InvalidTimestamp {
        id: id.to_string(),
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Map a Shopify order into its listing row.
///
/// Timestamps are rewritten in the host datetime format; a missing or
/// unparsable one is an error.
pub fn order_to_summary(order: &ShopifyOrder) -> Result<OrderSummary> {
    let id = order_id(order).ok_or_else(|| ObjectError::Api(anyhow!("Listed order has no id")))?;

    Ok(OrderSummary {
        name: order.get("name").and_then(Value::as_str).map(str::to_string),
        created_at: canonical_timestamp(order, &id, "created_at")?,
        updated_at: canonical_timestamp(order, &id, "updated_at")?,
        processed_at: canonical_timestamp(order, &id, "processed_at")?,
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(value: Value) -> ShopifyOrder {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_order_to_summary() {
        let order = order(json!({
            "id": 450789469,
            "name": "#1001",
            "email": "bob@example.com",
            "created_at": "2024-03-05T10:15:00-05:00",
            "updated_at": "2024-03-06T08:00:30-05:00",
            "processed_at": "2024-03-05T10:14:59-05:00"
        }));

        let summary = order_to_summary(&order).unwrap();
        assert_eq!(summary.id, "450789469");
        assert_eq!(summary.name.as_deref(), Some("#1001"));
        assert_eq!(summary.created_at, "2024-03-05 10:15:00");
        assert_eq!(summary.updated_at, "2024-03-06 08:00:30");
        assert_eq!(summary.processed_at, "2024-03-05 10:14:59");
    }

    #[test]
    fn test_summary_serialization() {
        let order = order(json!({
            "id": "gid-7",
            "name": "#7",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "processed_at": "2024-01-01T00:00:00Z"
        }));

        let value = serde_json::to_value(order_to_summary(&order).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "gid-7",
                "name": "#7",
                "created_at": "2024-01-01 00:00:00",
                "updated_at": "2024-01-01 00:00:00",
                "processed_at": "2024-01-01 00:00:00"
            })
        );
    }

    #[test]
    fn test_invalid_timestamp() {
        let order = order(json!({
            "id": 1,
            "name": "#1",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "yesterday",
            "processed_at": "2024-01-01T00:00:00Z"
        }));

        match order_to_summary(&order) {
            Err(ObjectError::InvalidTimestamp { id, field, value }) => {
                assert_eq!(id, "1");
                assert_eq!(field, "updated_at");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_timestamp() {
        let order = order(json!({
            "id": 1,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }));

        assert!(matches!(
            order_to_summary(&order),
            Err(ObjectError::InvalidTimestamp { ref field, .. }) if field == "processed_at"
        ));
    }

    #[test]
    fn test_missing_id() {
        let order = order(json!({"name": "#1"}));
        assert!(matches!(order_to_summary(&order), Err(ObjectError::Api(_))));
        assert_eq!(order_id(&order), None);
    }
}
