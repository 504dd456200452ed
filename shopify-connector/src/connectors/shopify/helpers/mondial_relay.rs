use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use shopify_sync::object::ObjectRecord;

use super::{AddressOverlay, EnrichmentContext, EnrichmentStep};

/// Value of one `note_attributes` entry, by name.
fn note_attribute(record: &ObjectRecord, name: &str) -> Option<String> {
    record
        .get("note_attributes")?
        .as_array()?
        .iter()
        .find(|attr| attr.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|attr| match attr.get("value")? {
            Value::String(value) => Some(value.trim().to_string()),
            Value::Number(value) => Some(value.to_string()),
            _ => None,
        })
        .filter(|value| !value.is_empty())
}

/// Delivery to a Mondial Relay point, read from the order's note attributes.
pub struct MondialRelay;

#[async_trait]
impl EnrichmentStep for MondialRelay {
    fn name(&self) -> &'static str {
        "mondial_relay"
    }

    fn is_enabled(&self, ctx: &EnrichmentContext<'_>) -> bool {
        ctx.plugins.mondial_relay
    }

    async fn apply(&self, record: &mut ObjectRecord, _ctx: &EnrichmentContext<'_>) -> Result<()> {
        let Some(relay_id) = note_attribute(record, "mr_relay_id") else {
            return Ok(());
        };

        let overlay = AddressOverlay {
            company: note_attribute(record, "mr_name"),
            address1: note_attribute(record, "mr_address"),
            address2: Some(format!("Relay {}", relay_id)),
            zip: note_attribute(record, "mr_zip"),
            city: note_attribute(record, "mr_city"),
            country_code: note_attribute(record, "mr_country"),
        };
        overlay.apply_to(record);
        Ok(())
    }
}
