//! HTTP actions exposed to the administration UI.
//!
//! - `GET /connectors/:webservice_id/oauth/start`: start OAuth2 authorization
//! - `GET /oauth/register`: OAuth2 provider callback
//! - `GET /connectors/:webservice_id/webhooks`: reconcile webhook subscriptions
//! - `GET /session/flashes`: drain pending flash messages

pub mod oauth;
pub mod session;
pub mod webhooks;

pub use oauth::{FlowOutcome, FlowState, OAuthFlow};
pub use webhooks::reconcile_webhooks;

use crate::connector::{ConnectorFactory, UrlGenerator};
use crate::oauth::ClientRegistry;
use crate::session::{Flash, SessionStore};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

/// Shared application state for the action endpoints
#[derive(Clone)]
pub struct ActionsState {
    pub connectors: Arc<dyn ConnectorFactory>,
    pub oauth_clients: Arc<ClientRegistry>,
    pub sessions: SessionStore,
    pub urls: Arc<dyn UrlGenerator>,
    pub flow: OAuthFlow,
    /// Connector kind the webhook action accepts
    pub connector_type: String,
    /// Fallback redirect target
    pub default_page: String,
}

impl ActionsState {
    /// Redirect to the default page
    pub fn default_response(&self) -> Response {
        Redirect::to(&self.default_page).into_response()
    }

    /// Redirect to the referring page, or the default page without one
    pub fn redirect_back(&self, headers: &HeaderMap) -> Response {
        match session::referer(headers) {
            Some(referer) => Redirect::to(&referer).into_response(),
            None => self.default_response(),
        }
    }

    /// Turn a flow outcome into an HTTP response
    pub fn respond(&self, outcome: FlowOutcome) -> Response {
        match outcome {
            FlowOutcome::Redirect(url) => Redirect::to(&url).into_response(),
            FlowOutcome::Default => self.default_response(),
            FlowOutcome::Failed(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }
}

/// Create the actions router
pub fn create_actions_router(state: ActionsState) -> Router {
    Router::new()
        .route("/connectors/:webservice_id/oauth/start", get(oauth::oauth_start))
        .route("/oauth/register", get(oauth::oauth_register))
        .route("/connectors/:webservice_id/webhooks", get(webhooks::update_webhooks))
        .route("/session/flashes", get(take_flashes))
        .with_state(Arc::new(state))
}

/// GET /session/flashes
async fn take_flashes(State(state): State<Arc<ActionsState>>, headers: HeaderMap) -> Json<Vec<Flash>> {
    let flashes = match session::session_id(&headers) {
        Some(session_id) => state.sessions.take_flashes(&session_id),
        None => Vec::new(),
    };
    Json(flashes)
}
