//! Order object HTTP API, the host's entry point into the order adapter.
//!
//! - `GET /ws/shopify/:webservice_id/orders` - one listing page
//! - `GET /ws/shopify/:webservice_id/orders/:id` - one enriched order
//! - `POST /ws/shopify/:webservice_id/orders` - rejected
//! - `PUT /ws/shopify/:webservice_id/orders/:id` - pending fields + update
//! - `DELETE /ws/shopify/:webservice_id/orders/:id` - rejected

use crate::connectors::shopify::orders::{reject_create, reject_delete, OrderAdapter};
use crate::connectors::shopify::ShopifyConnector;
use crate::connectors::shopify::transformer::OrderSummary;
use crate::registry::ShopifyConnectorFactory;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shopify_sync::connector::Connector;
use shopify_sync::object::{ListingPage, ObjectAdapter, ObjectError, ObjectRecord, Pagination};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared state for the order handlers.
#[derive(Clone)]
pub struct OrdersState {
    pub connectors: Arc<ShopifyConnectorFactory>,
}

/// Query string of the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub max: Option<i64>,
    pub offset: Option<i64>,
    pub filter: Option<String>,
}

/// Request body for `PUT /ws/shopify/:webservice_id/orders/:id`.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub needed: bool,
}

#[derive(Serialize)]
pub struct UpdateOrderResponse {
    pub id: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ---------------------------------------------------------------------------
// Business logic (called from HTTP handlers and unit tests)
// ---------------------------------------------------------------------------

/// Connector bound to `webservice_id`.
fn bind_connector(state: &OrdersState, webservice_id: &str) -> Result<ShopifyConnector, AppError> {
    let mut connector = state.connectors.connector();
    if !connector.identify(webservice_id) {
        return Err(AppError::NotFound(format!("Unknown webservice {}", webservice_id)));
    }
    Ok(connector)
}

/// Order adapter bound to `webservice_id`.
pub fn bind_orders(state: &OrdersState, webservice_id: &str) -> Result<OrderAdapter, AppError> {
    bind_connector(state, webservice_id)?
        .orders()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Orders are never created from the host; only the webservice is checked.
pub fn handle_create_order(state: &OrdersState, webservice_id: &str) -> Result<String, AppError> {
    bind_connector(state, webservice_id)?;
    Err(reject_create().into())
}

/// Orders are never deleted from the host; only the webservice is checked.
pub fn handle_delete_order(
    state: &OrdersState,
    webservice_id: &str,
    order_id: &str,
) -> Result<(), AppError> {
    bind_connector(state, webservice_id)?;
    Err(reject_delete(order_id).into())
}

pub async fn handle_list_orders(
    state: &OrdersState,
    webservice_id: &str,
    params: ListParams,
) -> Result<ListingPage<OrderSummary>, AppError> {
    let adapter = bind_orders(state, webservice_id)?;
    let pagination = Pagination {
        max: params.max,
        offset: params.offset,
    };
    let page = adapter
        .objects_list(params.filter.as_deref(), Some(&pagination))
        .await?;
    debug!(
        webservice_id = %webservice_id,
        current = page.meta.current,
        total = page.meta.total,
        "Orders listed"
    );
    Ok(page)
}

pub async fn handle_load_order(
    state: &OrdersState,
    webservice_id: &str,
    order_id: &str,
) -> Result<ObjectRecord, AppError> {
    let mut adapter = bind_orders(state, webservice_id)?;
    Ok(adapter.load(order_id).await?)
}

/// Loads the order, records the changed fields, then runs the update guard.
pub async fn handle_update_order(
    state: &OrdersState,
    webservice_id: &str,
    order_id: &str,
    req: UpdateOrderRequest,
) -> Result<String, AppError> {
    let mut adapter = bind_orders(state, webservice_id)?;
    adapter.load(order_id).await?;
    for (name, value) in req.fields {
        adapter.set_field(&name, value);
    }
    let id = adapter.update(req.needed).await?;
    info!(webservice_id = %webservice_id, order_id = %id, "Order update accepted");
    Ok(id)
}

// ---------------------------------------------------------------------------
// HTTP handlers
// ---------------------------------------------------------------------------

async fn list_orders(
    State(state): State<Arc<OrdersState>>,
    Path(webservice_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListingPage<OrderSummary>>, AppError> {
    Ok(Json(handle_list_orders(&state, &webservice_id, params).await?))
}

async fn get_order(
    State(state): State<Arc<OrdersState>>,
    Path((webservice_id, order_id)): Path<(String, String)>,
) -> Result<Json<ObjectRecord>, AppError> {
    Ok(Json(handle_load_order(&state, &webservice_id, &order_id).await?))
}

async fn create_order(
    State(state): State<Arc<OrdersState>>,
    Path(webservice_id): Path<String>,
) -> Result<Json<UpdateOrderResponse>, AppError> {
    let id = handle_create_order(&state, &webservice_id)?;
    Ok(Json(UpdateOrderResponse { id }))
}

async fn update_order(
    State(state): State<Arc<OrdersState>>,
    Path((webservice_id, order_id)): Path<(String, String)>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<UpdateOrderResponse>, AppError> {
    let id = handle_update_order(&state, &webservice_id, &order_id, req).await?;
    Ok(Json(UpdateOrderResponse { id }))
}

async fn delete_order(
    State(state): State<Arc<OrdersState>>,
    Path((webservice_id, order_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    handle_delete_order(&state, &webservice_id, &order_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
}

impl From<ObjectError> for AppError {
    fn from(e: ObjectError) -> Self {
        match e {
            ObjectError::LoadFailed(_) => AppError::NotFound(e.to_string()),
            _ => AppError::BadRequest(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn create_orders_router(state: OrdersState) -> Router {
    Router::new()
        .route(
            "/ws/shopify/:webservice_id/orders",
            get(list_orders).post(create_order),
        )
        .route(
            "/ws/shopify/:webservice_id/orders/:order_id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .with_state(Arc::new(state))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::shopify::config::{ShopifyConfig, WebserviceConfig};
    use mockito::Server;
    use shopify_sync::parameters::{ParameterStore, Parameters, TOKEN_PARAMETER};

    const TEST_KEY: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

    fn make_state(api_base_url: String, token: Option<&str>) -> OrdersState {
        let config = ShopifyConfig {
            webservices: vec![WebserviceConfig {
                webservice_id: "ws-1".to_string(),
                shop_url: "https://demo.myshopify.com".to_string(),
                client_id: "app-id".to_string(),
                client_secret: "app-secret".to_string(),
                plugins: Vec::new(),
            }],
            ..Default::default()
        };
        let store = ParameterStore::new(":memory:", TEST_KEY).unwrap();
        if let Some(token) = token {
            let mut parameters = Parameters::new();
            parameters.insert(TOKEN_PARAMETER.to_string(), token.to_string());
            store.save("ws-1", &parameters).unwrap();
        }
        let factory = ShopifyConnectorFactory::new(Arc::new(config), Arc::new(store))
            .with_api_base_url(api_base_url);
        OrdersState {
            connectors: Arc::new(factory),
        }
    }

    #[test]
    fn test_bind_unknown_webservice() {
        let state = make_state("http://127.0.0.1:9".to_string(), Some("t"));
        match bind_orders(&state, "ws-404") {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Unknown webservice ws-404"),
            other => panic!("unexpected: {:?}", other.err()),
        }
    }

    #[test]
    fn test_bind_without_token() {
        let state = make_state("http://127.0.0.1:9".to_string(), None);
        assert!(matches!(
            bind_orders(&state, "ws-1"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_update_order_accepts_unneeded_update() {
        let mut server = Server::new_async().await;
        let _order = server
            .mock("GET", "/orders/1001.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"order": {"id": 1001}}"#)
            .create_async()
            .await;
        let state = make_state(server.url(), Some("t"));

        let req = UpdateOrderRequest {
            fields: Map::new(),
            needed: false,
        };
        let id = handle_update_order(&state, "ws-1", "1001", req).await.unwrap();
        assert_eq!(id, "1001");

        let req = UpdateOrderRequest {
            fields: Map::new(),
            needed: true,
        };
        match handle_update_order(&state, "ws-1", "1001", req).await {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "Splash API Cannot Update Shopify Orders!")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_write_guards_without_token() {
        let state = make_state("http://127.0.0.1:9".to_string(), None);

        match handle_create_order(&state, "ws-1") {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "Splash API Cannot Create Shopify Orders!")
            }
            other => panic!("unexpected: {:?}", other),
        }
        match handle_delete_order(&state, "ws-1", "1001") {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "Splash API Cannot Delete Shopify Orders!")
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            handle_create_order(&state, "ws-404"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_object_error_status() {
        let response = AppError::from(ObjectError::LoadFailed("7".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::from(ObjectError::DeleteForbidden).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
