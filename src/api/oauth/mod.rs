//! OAuth 2.0 endpoints connecting a webservice to its provider account.
//!
//! 1. Admin clicks "Connect" → GET /connectors/:webservice_id/oauth/start
//! 2. Webservice id is stored in the session, user is redirected to the provider
//! 3. User authorizes on the provider's site
//! 4. Provider redirects to GET /oauth/register
//! 5. Webservice id is read back, code exchanged, token saved as `Token`
//! 6. User is sent back to the page that started the flow

mod flow;


pub use flow::{FlowOutcome, FlowState, OAuthFlow};

use super::{session, ActionsState};
use crate::oauth::OAuthCallback;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// GET /connectors/:webservice_id/oauth/start
///
/// Initiates the flow for one configured webservice.
pub(super) async fn oauth_start(
    State(state): State<Arc<ActionsState>>,
    Path(webservice_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    debug!(webservice_id = %webservice_id, "OAuth start requested");

    let (session_id, cookie) = session::resolve(&state.sessions, &headers);

    let mut connector = state.connectors.create();
    if !connector.identify(&webservice_id) {
        warn!(webservice_id = %webservice_id, "Unknown webservice");
        return session::with_cookie(state.default_response(), cookie);
    }

    let outcome = state.flow.initiate(
        &state.oauth_clients,
        &state.sessions,
        &session_id,
        connector.as_ref(),
    );

    session::with_cookie(state.respond(outcome), cookie)
}

/// GET /oauth/register
///
/// Provider callback. Exchanges the authorization code and stores the token.
pub(super) async fn oauth_register(
    State(state): State<Arc<ActionsState>>,
    Query(callback): Query<OAuthCallback>,
    headers: HeaderMap,
) -> Response {
    debug!("OAuth callback received");

    let session_id = session::session_id(&headers);
    let referer = session::referer(&headers);
    let mut connector = state.connectors.create();

    let outcome = state
        .flow
        .complete(
            &state.oauth_clients,
            &state.sessions,
            session_id.as_deref(),
            connector.as_mut(),
            &callback,
            referer.as_deref(),
        )
        .await;

    state.respond(outcome)
}
