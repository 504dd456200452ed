use std::collections::HashSet;
use tracing::{info, warn};

use super::api::{ShopifyClient, Webhook};

/// Order topics the host wants to hear about.
pub const WEBHOOK_TOPICS: &[&str] = &[
    "orders/create",
    "orders/updated",
    "orders/cancelled",
    "orders/fulfilled",
    "orders/paid",
    "orders/delete",
];

/// Changes bringing the shop's subscriptions in line with [`WEBHOOK_TOPICS`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WebhookPlan {
    pub delete: Vec<u64>,
    pub create: Vec<&'static str>,
}

/// Compare existing subscriptions with the wanted set for `address`.
///
/// Subscriptions for other addresses are left alone. Ours are deleted when
/// their topic is unwanted or already covered by an earlier one.
pub fn plan_webhooks(existing: &[Webhook], address: &str) -> WebhookPlan {
    let mut plan = WebhookPlan::default();
    let mut covered = HashSet::new();

    for webhook in existing.iter().filter(|w| w.address == address) {
        let wanted = WEBHOOK_TOPICS.contains(&webhook.topic.as_str());
        if wanted && covered.insert(webhook.topic.clone()) {
            continue;
        }
        plan.delete.push(webhook.id);
    }

    plan.create = WEBHOOK_TOPICS
        .iter()
        .copied()
        .filter(|topic| !covered.contains(*topic))
        .collect();
    plan
}

/// Apply the webhook plan for `address`.
///
/// Returns `true` only when listing and every change succeeded.
pub async fn reconcile_webhooks(client: &ShopifyClient, address: &str) -> bool {
    let existing = match client.list_webhooks().await {
        Ok(webhooks) => webhooks,
        Err(e) => {
            warn!(error = %e, "Failed to list webhooks");
            return false;
        }
    };

    let plan = plan_webhooks(&existing, address);
    let mut success = true;

    for id in &plan.delete {
        if let Err(e) = client.delete_webhook(*id).await {
            warn!(webhook_id = id, error = %e, "Failed to delete webhook");
            success = false;
        }
    }
    for topic in &plan.create {
        if let Err(e) = client.create_webhook(topic, address).await {
            warn!(topic = %topic, error = %e, "Failed to create webhook");
            success = false;
        }
    }

    info!(
        address = %address,
        deleted = plan.delete.len(),
        created = plan.create.len(),
        success = success,
        "Webhooks reconciled"
    );
    success
}
