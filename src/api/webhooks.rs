//! Webhook reconciliation action.

use super::{session, ActionsState};
use crate::connector::{Connector, UrlGenerator};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Flash message keys and their rendered text
const WEBHOOKS_OK: (&str, &str) = ("admin.webhooks.msg", "Webhooks successfully updated.");
const WEBHOOKS_ERR: (&str, &str) = ("admin.webhooks.err", "Unable to update webhooks, check your connector configuration.");

/// Self-test the connector, then reconcile its webhook subscriptions.
///
/// Returns `false` without touching the platform when the connector is of
/// another kind or fails its self-test.
pub async fn reconcile_webhooks(
    connector: &dyn Connector,
    expected_type: &str,
    urls: &dyn UrlGenerator,
) -> bool {
    if connector.connector_type() != expected_type {
        warn!(
            expected = %expected_type,
            actual = %connector.connector_type(),
            "Webhook update requested for a foreign connector"
        );
        return false;
    }

    if !connector.self_test().await {
        warn!(webservice_id = ?connector.webservice_id(), "Connector self-test failed");
        return false;
    }

    connector.update_webhooks(urls).await
}

/// Rendered text for a message key
pub fn translate(key: &str) -> &str {
    match key {
        k if k == WEBHOOKS_OK.0 => WEBHOOKS_OK.1,
        k if k == WEBHOOKS_ERR.0 => WEBHOOKS_ERR.1,
        other => other,
    }
}

/// GET /connectors/:webservice_id/webhooks
pub(super) async fn update_webhooks(
    State(state): State<Arc<ActionsState>>,
    Path(webservice_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    debug!(webservice_id = %webservice_id, "Webhook update requested");

    let (session_id, cookie) = session::resolve(&state.sessions, &headers);

    let mut connector = state.connectors.create();
    let result = connector.identify(&webservice_id)
        && reconcile_webhooks(connector.as_ref(), &state.connector_type, state.urls.as_ref()).await;

    let (level, key) = if result {
        ("success", WEBHOOKS_OK.0)
    } else {
        ("danger", WEBHOOKS_ERR.0)
    };
    state.sessions.add_flash(&session_id, level, translate(key));
    info!(webservice_id = %webservice_id, success = result, "Webhook update finished");

    session::with_cookie(state.redirect_back(&headers), cookie)
}
