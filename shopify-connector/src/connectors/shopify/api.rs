use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Header carrying the shop access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Raw Shopify order, kept as loose JSON.
pub type ShopifyOrder = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct OrdersEnvelope {
    orders: Vec<ShopifyOrder>,
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    order: Option<ShopifyOrder>,
}

#[derive(Debug, Deserialize)]
struct CountEnvelope {
    count: u64,
}

/// Order metafield.
#[derive(Debug, Deserialize)]
pub struct Metafield {
    pub namespace: String,
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Deserialize)]
struct MetafieldsEnvelope {
    metafields: Vec<Metafield>,
}

/// Webhook subscription.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Webhook {
    pub id: u64,
    pub topic: String,
    pub address: String,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhooksEnvelope {
    webhooks: Vec<Webhook>,
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    webhook: Webhook,
}

/// Fulfillment posted for an order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FulfillmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub notify_customer: bool,
}

/// HTTP client for the Shopify REST Admin API.
///
/// Authenticates every call with the `X-Shopify-Access-Token` header.
pub struct ShopifyClient {
    access_token: String,
    http_client: Client,
    base_url: String,
}

impl ShopifyClient {
    /// Create a client for `{shop_url}/admin/api/{api_version}`.
    pub fn new(shop_url: &str, api_version: &str, access_token: String) -> Result<Self> {
        let base_url = format!(
            "{}/admin/api/{}",
            shop_url.trim_end_matches('/'),
            api_version
        );
        Self::with_base_url(access_token, base_url)
    }

    /// Create a client with a custom base URL (for testing with a mock server).
    pub fn with_base_url(access_token: String, base_url: String) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent("shopify-sync/1.0")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            access_token,
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(format!("{}/{}", self.base_url, path))
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .post(format!("{}/{}", self.base_url, path))
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
    }

    /// List orders matching `query` (e.g. `status`, `limit`, `page`).
    pub async fn list_orders(&self, query: &[(&str, String)]) -> Result<Vec<ShopifyOrder>> {
        let response = self
            .get("orders.json")
            .query(query)
            .send()
            .await
            .context("Failed to send list_orders request")?;

        check_response_status(&response)?;
        let envelope = response
            .json::<OrdersEnvelope>()
            .await
            .context("Failed to parse orders response")?;
        Ok(envelope.orders)
    }

    /// Count orders of any status.
    pub async fn count_orders(&self) -> Result<u64> {
        let response = self
            .get("orders/count.json")
            .query(&[("status", "any")])
            .send()
            .await
            .context("Failed to send count_orders request")?;

        check_response_status(&response)?;
        let envelope = response
            .json::<CountEnvelope>()
            .await
            .context("Failed to parse orders count response")?;
        Ok(envelope.count)
    }

    /// Fetch one order; `None` when the shop has no such order.
    pub async fn get_order(&self, order_id: &str) -> Result<Option<ShopifyOrder>> {
        let response = self
            .get(&format!("orders/{}.json", order_id))
            .send()
            .await
            .context("Failed to send get_order request")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_response_status(&response)?;
        let envelope = response
            .json::<OrderEnvelope>()
            .await
            .context("Failed to parse order response")?;
        Ok(envelope.order.filter(|order| !order.is_empty()))
    }

    /// Value of one order metafield, if set.
    pub async fn order_metafield(
        &self,
        order_id: &str,
        namespace: &str,
        key: &str,
    ) -> Result<Option<Value>> {
        let response = self
            .get(&format!("orders/{}/metafields.json", order_id))
            .query(&[("namespace", namespace), ("key", key)])
            .send()
            .await
            .context("Failed to send order_metafield request")?;

        check_response_status(&response)?;
        let envelope = response
            .json::<MetafieldsEnvelope>()
            .await
            .context("Failed to parse metafields response")?;
        Ok(envelope
            .metafields
            .into_iter()
            .find(|m| m.namespace == namespace && m.key == key)
            .map(|m| m.value))
    }

    /// Shop details; used as a connectivity probe.
    pub async fn shop(&self) -> Result<Value> {
        let response = self
            .get("shop.json")
            .send()
            .await
            .context("Failed to send shop request")?;

        check_response_status(&response)?;
        response
            .json::<Value>()
            .await
            .context("Failed to parse shop response")
    }

    pub async fn list_webhooks(&self) -> Result<Vec<Webhook>> {
        let response = self
            .get("webhooks.json")
            .send()
            .await
            .context("Failed to send list_webhooks request")?;

        check_response_status(&response)?;
        let envelope = response
            .json::<WebhooksEnvelope>()
            .await
            .context("Failed to parse webhooks response")?;
        Ok(envelope.webhooks)
    }

    pub async fn create_webhook(&self, topic: &str, address: &str) -> Result<Webhook> {
        let body = serde_json::json!({
            "webhook": {
                "topic": topic,
                "address": address,
                "format": "json",
            }
        });
        let response = self
            .post("webhooks.json")
            .json(&body)
            .send()
            .await
            .context("Failed to send create_webhook request")?;

        check_response_status(&response)?;
        let envelope = response
            .json::<WebhookEnvelope>()
            .await
            .context("Failed to parse created webhook")?;
        Ok(envelope.webhook)
    }

    pub async fn delete_webhook(&self, webhook_id: u64) -> Result<()> {
        let response = self
            .http_client
            .delete(format!("{}/webhooks/{}.json", self.base_url, webhook_id))
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .send()
            .await
            .context("Failed to send delete_webhook request")?;

        check_response_status(&response)
    }

    pub async fn create_fulfillment(
        &self,
        order_id: &str,
        fulfillment: &FulfillmentRequest,
    ) -> Result<()> {
        let body = serde_json::json!({ "fulfillment": fulfillment });
        let response = self
            .post(&format!("orders/{}/fulfillments.json", order_id))
            .json(&body)
            .send()
            .await
            .context("Failed to send create_fulfillment request")?;

        check_response_status(&response)
    }
}

/// Check the response status and map known error codes to descriptive errors.
///
/// - 401 → auth error (token revoked or invalid)
/// - 429 → rate limit (reports Retry-After)
/// - Other non-2xx → generic API error
fn check_response_status(response: &Response) -> Result<()> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(anyhow!("Shopify auth error: token revoked or invalid")),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            Err(anyhow!(
                "Shopify rate limit exceeded (Retry-After: {})",
                retry_after
            ))
        }
        s if !s.is_success() => Err(anyhow!("Shopify API error: {}", s)),
        _ => Ok(()),
    }
}
