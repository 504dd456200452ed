use anyhow::{Context, Result};
use shopify_connector::api::{create_orders_router, OrdersState};
use shopify_connector::connectors::shopify::config::{CONNECTOR_TYPE, OAUTH_CLIENT, SESSION_KEY};
use shopify_connector::{load_shopify_config, register_oauth_client, ShopifyConnectorFactory};
use shopify_sync::api::{create_actions_router, ActionsState, OAuthFlow};
use shopify_sync::config::load_config;
use shopify_sync::connector::PublicUrls;
use shopify_sync::oauth::ClientRegistry;
use shopify_sync::parameters::ParameterStore;
use shopify_sync::session::{run_session_cleanup, SessionStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopify_connector=info,shopify_sync=info".into()),
        )
        .init();

    info!("Shopify connector starting...");

    // Read configuration
    let config_path = std::env::var("SYNC_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config(&config_path)?.apply_env();
    let shopify_config = Arc::new(load_shopify_config(&config_path)?.apply_env());

    let encryption_key = std::env::var("SYNC_ENCRYPTION_KEY")
        .context("SYNC_ENCRYPTION_KEY is required (base64-encoded 32-byte key)")?;

    info!(
        config = %config_path,
        port = config.server.port,
        public_url = %config.server.public_url,
        api_version = %shopify_config.api_version,
        webservices = shopify_config.webservices.len(),
        "Configuration loaded"
    );

    // Initialize parameter store
    let store = Arc::new(
        ParameterStore::new(&config.storage.parameters_db, &encryption_key)
            .context("Failed to initialize parameter store")?,
    );
    info!(path = %config.storage.parameters_db, "Parameter store initialized");

    // Sessions, swept in the background
    let sessions = SessionStore::new(config.session.ttl_seconds);
    tokio::spawn(run_session_cleanup(
        sessions.clone(),
        config.session.cleanup_interval_seconds,
    ));

    // OAuth clients and connectors
    let mut oauth_clients = ClientRegistry::new();
    register_oauth_client(&mut oauth_clients, &shopify_config, &config.server.public_url);
    let connectors = Arc::new(ShopifyConnectorFactory::new(
        Arc::clone(&shopify_config),
        Arc::clone(&store),
    ));

    let actions_state = ActionsState {
        connectors: connectors.clone(),
        oauth_clients: Arc::new(oauth_clients),
        sessions,
        urls: Arc::new(PublicUrls::new(&config.server.public_url)),
        flow: OAuthFlow::new(OAUTH_CLIENT, CONNECTOR_TYPE, SESSION_KEY),
        connector_type: CONNECTOR_TYPE.to_string(),
        default_page: config.server.default_page.clone(),
    };
    let router = create_actions_router(actions_state)
        .merge(create_orders_router(OrdersState { connectors }));

    // Start HTTP server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.server.port))
        .await
        .context("Failed to bind HTTP port")?;
    info!(port = config.server.port, "HTTP server listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "HTTP server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("Shopify connector stopped");

    Ok(())
}
