//! # promptdeck: Admin Console for LLM Prompt Management
//!
//! `promptdeck` is the backend for a browser admin console where users organize
//! LLM work into projects, author reusable prompt templates, store provider
//! credentials, and try prompts out in a playground chat.
//!
//! ## Overview
//!
//! Teams iterating on LLM prompts need a place to keep templates, generation
//! parameters, and provider API keys organized per user. This crate provides a
//! RESTful API over SQLite for exactly that, plus a playground that simulates a
//! chat exchange against the selected project, prompt, and provider so the full
//! console flow can be exercised without calling any real provider.
//!
//! ### Request Flow
//!
//! Browser clients authenticate with email and password at `/authentication/*`
//! and receive a JWT session cookie. Every other endpoint lives under
//! `/api/v1/*` and requires that cookie. Handlers resolve the current user,
//! enforce per-user ownership of resources, and talk to SQLite through
//! repository interfaces. Provider API keys are encrypted with AES-256-GCM
//! before they are stored and only a short hint of the ciphertext is ever
//! returned.
//!
//! Playground sessions are ephemeral: they live in process memory, and sending
//! a message produces a canned assistant reply after a fixed delay.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use promptdeck::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = promptdeck::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     promptdeck::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod errors;
mod openapi;
pub mod playground;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    auth::password,
    config::CorsOrigin,
    db::handlers::Users,
    db::models::users::UserCreateDBRequest,
    openapi::ApiDoc,
    playground::Sessions,
    types::UserId,
};
use axum::http::HeaderValue;
use axum::{
    Router, http,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// Holds the SQLite connection pool, the loaded configuration, and the
/// in-memory playground session store.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    #[builder(default)]
    pub playground: Sessions,
}

/// Get the promptdeck database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the admin account on first startup, or resets its
/// password when one is configured and the account already exists. Returns the
/// user id either way.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &SqlitePool) -> anyhow::Result<UserId> {
    let password_hash = match password {
        Some(pwd) => Some(password::hash_string(pwd).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?),
        None => None,
    };

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_user_by_email(email).await? {
        if let Some(password_hash) = &password_hash {
            user_repo.set_password_hash(email, password_hash).await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            display_name: None,
            is_admin: true,
            password_hash,
        })
        .await?;

    tx.commit().await?;
    info!(email = %email, "Created initial admin user");
    Ok(created_user.id)
}

/// Connect to SQLite, run migrations, and ensure the admin user exists.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.database.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    migrator().run(&pool).await?;

    create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    let mut origins = Vec::new();
    for origin in &cors_config.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut exposed_headers = Vec::new();
    for header in &cors_config.exposed_headers {
        exposed_headers.push(http::HeaderName::from_str(header)?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(cors_config.allow_credentials)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::COOKIE])
        .expose_headers(exposed_headers);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Authentication routes at root level
    let auth_routes = Router::new()
        .route("/authentication/register", post(api::handlers::auth::register))
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/me", get(api::handlers::auth::me))
        .with_state(state.clone());

    // Resource routes nested under /api/v1
    let api_routes = Router::new()
        // Projects
        .route(
            "/projects",
            get(api::handlers::projects::list_projects).post(api::handlers::projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(api::handlers::projects::get_project)
                .patch(api::handlers::projects::update_project)
                .delete(api::handlers::projects::delete_project),
        )
        // Prompt templates
        .route(
            "/prompts",
            get(api::handlers::prompts::list_prompts).post(api::handlers::prompts::create_prompt),
        )
        .route(
            "/prompts/{id}",
            get(api::handlers::prompts::get_prompt)
                .patch(api::handlers::prompts::update_prompt)
                .delete(api::handlers::prompts::delete_prompt),
        )
        // Provider credentials; the static catalog must match before /{id}
        .route("/providers/catalog", get(api::handlers::providers::get_catalog))
        .route(
            "/providers",
            get(api::handlers::providers::list_providers).post(api::handlers::providers::create_provider),
        )
        .route(
            "/providers/{id}",
            get(api::handlers::providers::get_provider)
                .patch(api::handlers::providers::update_provider)
                .delete(api::handlers::providers::delete_provider),
        )
        // Playground
        .route("/playground/sessions", post(api::handlers::playground::create_session))
        .route(
            "/playground/sessions/{id}",
            get(api::handlers::playground::get_session).patch(api::handlers::playground::update_session),
        )
        .route(
            "/playground/sessions/{id}/messages",
            get(api::handlers::playground::list_messages).post(api::handlers::playground::send_message),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] validates configuration, connects to the
///    database, runs migrations, and creates the initial admin user
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = setup_database(&config).await?;
        Self::from_pool(config, pool)
    }

    /// Create an application on an existing pool (migrations must have run).
    pub fn from_pool(config: Config, pool: SqlitePool) -> anyhow::Result<Self> {
        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "promptdeck listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
