//! Order enrichment steps for third-party shipping apps.
//!
//! Some shop apps keep the real delivery address outside of the order
//! (a relay point chosen at checkout). Each step reads that data and overlays
//! it on the order's `shipping_address` before the host sees the record.
//! Steps run in the fixed order of [`ENRICHMENT_STEPS`] and only when the
//! matching plugin is enabled on the webservice.

mod happy_colissimo;
mod mondial_relay;

pub use happy_colissimo::HappyColissimo;
pub use mondial_relay::MondialRelay;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use shopify_sync::object::ObjectRecord;
use tracing::{debug, warn};

use super::api::ShopifyClient;

/// Shop apps enabled on a webservice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnabledPlugins {
    pub happy_colissimo: bool,
    pub mondial_relay: bool,
}

/// What a step may consult while enriching one order.
pub struct EnrichmentContext<'a> {
    pub order_id: &'a str,
    pub plugins: EnabledPlugins,
    pub client: &'a ShopifyClient,
}

#[async_trait]
pub trait EnrichmentStep: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_enabled(&self, ctx: &EnrichmentContext<'_>) -> bool;

    /// Overlay the step's data on `record`. Leaves it untouched when there is
    /// nothing to apply.
    async fn apply(&self, record: &mut ObjectRecord, ctx: &EnrichmentContext<'_>) -> Result<()>;
}

pub static ENRICHMENT_STEPS: &[&dyn EnrichmentStep] = &[&HappyColissimo, &MondialRelay];

/// Run every enabled step on `record`.
///
/// A failing step is logged and skipped; the record keeps what earlier steps
/// applied.
pub async fn enrich(record: &mut ObjectRecord, ctx: &EnrichmentContext<'_>) {
    for step in ENRICHMENT_STEPS {
        if !step.is_enabled(ctx) {
            continue;
        }
        match step.apply(record, ctx).await {
            Ok(()) => debug!(order_id = %ctx.order_id, step = step.name(), "Enrichment applied"),
            Err(e) => warn!(
                order_id = %ctx.order_id,
                step = step.name(),
                error = %e,
                "Enrichment skipped"
            ),
        }
    }
}

/// Delivery address fields an enrichment step may override.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressOverlay {
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
}

impl AddressOverlay {
    fn fields(&self) -> [(&'static str, &Option<String>); 6] {
        [
            ("company", &self.company),
            ("address1", &self.address1),
            ("address2", &self.address2),
            ("zip", &self.zip),
            ("city", &self.city),
            ("country_code", &self.country_code),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.fields()
            .iter()
            .all(|(_, value)| value.as_deref().map_or(true, str::is_empty))
    }

    /// Write the non-empty fields into `shipping_address`, creating it if needed.
    pub fn apply_to(&self, record: &mut ObjectRecord) {
        if self.is_empty() {
            return;
        }
        if !matches!(record.get("shipping_address"), Some(Value::Object(_))) {
            record.insert("shipping_address", Value::Object(Map::new()));
        }
        let Some(Value::Object(address)) = record.get_mut("shipping_address") else {
            return;
        };
        for (name, value) in self.fields() {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                address.insert(name.to_string(), Value::String(value.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ObjectRecord {
        ObjectRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_step_order() {
        let names: Vec<&str> = ENRICHMENT_STEPS.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["happy_colissimo", "mondial_relay"]);
    }

    #[test]
    fn test_overlay_only_touches_given_fields() {
        let mut order = record(json!({
            "id": 1,
            "email": "bob@example.com",
            "shipping_address": {
                "first_name": "Bob",
                "address1": "1 Rue de Paris",
                "zip": "75001",
                "city": "Paris"
            }
        }));

        AddressOverlay {
            company: Some("Relay Tabac".to_string()),
            address1: Some("3 Place Bellecour".to_string()),
            zip: Some("69002".to_string()),
            city: Some("Lyon".to_string()),
            address2: Some(String::new()),
            ..Default::default()
        }
        .apply_to(&mut order);

        assert_eq!(
            order.into_value(),
            json!({
                "id": 1,
                "email": "bob@example.com",
                "shipping_address": {
                    "first_name": "Bob",
                    "company": "Relay Tabac",
                    "address1": "3 Place Bellecour",
                    "zip": "69002",
                    "city": "Lyon"
                }
            })
        );
    }

    #[test]
    fn test_overlay_creates_missing_address() {
        let mut order = record(json!({"id": 1, "shipping_address": null}));

        AddressOverlay {
            city: Some("Lyon".to_string()),
            ..Default::default()
        }
        .apply_to(&mut order);

        assert_eq!(order.get("shipping_address"), Some(&json!({"city": "Lyon"})));
    }

    #[test]
    fn test_empty_overlay_is_noop() {
        let original = record(json!({"id": 1}));
        let mut order = original.clone();
        AddressOverlay::default().apply_to(&mut order);
        assert_eq!(order, original);
    }
}
