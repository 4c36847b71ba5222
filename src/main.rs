//! Student Registration Backend
//!
//! REST backend for the student registration form, with SQLite persistence
//! and roll-number uniqueness enforced by both the service and the store.

mod api;
mod config;
mod db;
mod errors;
mod models;
mod registration;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;
use registration::RegistrationService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registration: Arc<RegistrationService>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting Student Registration Backend");
    tracing::info!("Environment: {}", config.environment.as_str());
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("CORS origins: {:?}", config.allowed_origins());

    let (listener, app) = start(&config).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the store, then bind the listener.
///
/// The listener is only bound once the store is connected and migrated, so a
/// storage failure means the service never accepts traffic.
pub async fn start(
    config: &Config,
) -> Result<(tokio::net::TcpListener, Router), Box<dyn std::error::Error>> {
    let pool = match db::init_database(&config.db_path, config.store_timeout).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database connection failed: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Database connected");

    let repo = Arc::new(Repository::new(pool));
    let state = AppState {
        registration: Arc::new(RegistrationService::new(repo, config.store_timeout)),
        config: Arc::new(config.clone()),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    Ok((listener, create_router(state)))
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .route("/", get(api::health_check))
        .route(
            "/students",
            get(api::list_students).post(api::register_student),
        )
        .fallback(api::route_not_found)
        .method_not_allowed_fallback(api::route_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
