//! Portfolio Backend
//!
//! Content-management REST backend for a personal portfolio site, with a
//! SQLite document store and token-gated admin writes.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod push;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::TokenService;
use config::Config;
use db::Repository;
use models::{About, Contact, Message, Project, Skill, WorkExperience, Year};
use push::PushRelay;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub push: Arc<PushRelay>,
}

impl AppState {
    pub fn new(repo: Repository, config: Config) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_hours);
        let push = PushRelay::new(config.push_relay_url.clone(), config.push_relay_key.clone());
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            push: Arc::new(push),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Portfolio Backend");
    tracing::info!("Database: {}", config.database_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.jwt_secret_generated {
        tracing::warn!(
            "No token secret configured (PORTFOLIO_JWT_SECRET). Sessions will not survive a restart!"
        );
    }
    if config.push_relay_url.is_none() {
        tracing::info!("No push relay configured; message notifications are disabled");
    }

    // Initialize document store
    let pool = db::init_database(&config.database_url).await?;
    let bind_addr = config.bind_addr;

    let state = AppState::new(Repository::new(pool), config);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let gate = middleware::from_fn_with_state(state.clone(), auth::require_admin);

    // API routes
    let api_routes = Router::new()
        // Content resources
        .merge(api::resource_routes::<About>(&state))
        .merge(api::resource_routes::<Contact>(&state))
        .merge(api::resource_routes::<Project>(&state))
        .merge(api::resource_routes::<Skill>(&state))
        .merge(api::resource_routes::<WorkExperience>(&state))
        .merge(api::resource_routes::<Year>(&state))
        .merge(api::resource_routes::<Message>(&state))
        // Auth
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login))
        .route("/auth/logout", post(api::logout))
        .route("/auth/verify", get(api::verify).route_layer(gate.clone()))
        // Push notifications
        .route("/push/public-key", get(api::push_public_key))
        .route(
            "/push/subscriptions",
            get(api::list_subscriptions)
                .post(api::subscribe)
                .delete(api::unsubscribe)
                .route_layer(gate),
        );

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
