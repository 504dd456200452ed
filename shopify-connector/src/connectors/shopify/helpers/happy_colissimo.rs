use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use shopify_sync::object::ObjectRecord;

use super::{AddressOverlay, EnrichmentContext, EnrichmentStep};

pub const NAMESPACE: &str = "happy_colissimo";
pub const KEY: &str = "relay_point";

/// Relay point chosen at checkout, as stored by the Happy Colissimo app.
#[derive(Debug, Default, Deserialize)]
struct RelayPoint {
    #[serde(default, alias = "company")]
    name: Option<String>,
    #[serde(default)]
    address1: Option<String>,
    #[serde(default)]
    address2: Option<String>,
    #[serde(default, alias = "postcode")]
    zip: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default, alias = "country")]
    country_code: Option<String>,
}

impl From<RelayPoint> for AddressOverlay {
    fn from(point: RelayPoint) -> Self {
        AddressOverlay {
            company: point.name,
            address1: point.address1,
            address2: point.address2,
            zip: point.zip,
            city: point.city,
            country_code: point.country_code,
        }
    }
}

/// Metafield values are JSON documents, usually sent as a string.
fn decode_relay_point(value: Value) -> Result<RelayPoint> {
    match value {
        Value::String(raw) => {
            serde_json::from_str(&raw).context("Failed to decode relay point metafield")
        }
        other => serde_json::from_value(other).context("Failed to decode relay point metafield"),
    }
}

/// Delivery to a Colissimo relay point, read from an order metafield.
pub struct HappyColissimo;

#[async_trait]
impl EnrichmentStep for HappyColissimo {
    fn name(&self) -> &'static str {
        "happy_colissimo"
    }

    fn is_enabled(&self, ctx: &EnrichmentContext<'_>) -> bool {
        ctx.plugins.happy_colissimo
    }

    async fn apply(&self, record: &mut ObjectRecord, ctx: &EnrichmentContext<'_>) -> Result<()> {
        let Some(value) = ctx
            .client
            .order_metafield(ctx.order_id, NAMESPACE, KEY)
            .await?
        else {
            return Ok(());
        };

        AddressOverlay::from(decode_relay_point(value)?).apply_to(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::shopify::api::ShopifyClient;
    use crate::connectors::shopify::helpers::EnabledPlugins;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn order() -> ObjectRecord {
        ObjectRecord::from_value(json!({
            "id": 1001,
            "shipping_address": {"name": "Bob", "address1": "1 Rue de Paris", "city": "Paris"}
        }))
        .unwrap()
    }

    async fn metafield_server(body: &str) -> (mockito::ServerGuard, mockito::Mock) {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/orders/1001/metafields.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("namespace".into(), NAMESPACE.into()),
                Matcher::UrlEncoded("key".into(), KEY.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        (server, mock)
    }

    #[tokio::test]
    async fn test_relay_point_overlay() {
        let (server, _mock) = metafield_server(
            r#"{"metafields": [{"namespace": "happy_colissimo", "key": "relay_point",
                "value": "{\"name\":\"Tabac du Centre\",\"address1\":\"3 Place Bellecour\",\"zip\":\"69002\",\"city\":\"Lyon\",\"country_code\":\"FR\"}"}]}"#,
        )
        .await;
        let client = ShopifyClient::with_base_url("t".to_string(), server.url()).unwrap();
        let ctx = EnrichmentContext {
            order_id: "1001",
            plugins: EnabledPlugins {
                happy_colissimo: true,
                mondial_relay: false,
            },
            client: &client,
        };

        let mut record = order();
        HappyColissimo.apply(&mut record, &ctx).await.unwrap();

        assert_eq!(
            record.get("shipping_address"),
            Some(&json!({
                "name": "Bob",
                "company": "Tabac du Centre",
                "address1": "3 Place Bellecour",
                "zip": "69002",
                "city": "Lyon",
                "country_code": "FR"
            }))
        );
    }

    #[tokio::test]
    async fn test_no_metafield_leaves_record() {
        let (server, _mock) = metafield_server(r#"{"metafields": []}"#).await;
        let client = ShopifyClient::with_base_url("t".to_string(), server.url()).unwrap();
        let ctx = EnrichmentContext {
            order_id: "1001",
            plugins: EnabledPlugins::default(),
            client: &client,
        };

        let mut record = order();
        HappyColissimo.apply(&mut record, &ctx).await.unwrap();
        assert_eq!(record, order());
        assert!(!HappyColissimo.is_enabled(&ctx));
    }

    #[test]
    fn test_decode_object_value() {
        let point = decode_relay_point(json!({"company": "Relay", "postcode": "69002"})).unwrap();
        assert_eq!(point.name.as_deref(), Some("Relay"));
        assert_eq!(point.zip.as_deref(), Some("69002"));
        assert!(decode_relay_point(json!("not json")).is_err());
    }
}
