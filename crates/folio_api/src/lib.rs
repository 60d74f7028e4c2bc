//! HTTP surface of the folio portfolio backend.
//!
//! # Responsibility
//! - Map the REST routes onto `folio_core` services.
//! - Own process-level concerns: CORS, body limits, static upload
//!   serving and graceful shutdown.
//!
//! # Invariants
//! - Handlers never touch SQLite on an async worker thread; all storage
//!   work goes through `state::with_db`.
//! - Every JSON response uses the `{success, message?, data}` envelope.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{delete, get, post, put},
    Router,
};
use log::{error, info};
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, services::ServeDir};

pub mod auth;
pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::{AppState, SharedState, StateError};

use routes::{auth as auth_routes, contacts, health, projects, uploads};

/// Headroom over the file limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to build state: {0}")]
    State(#[from] StateError),

    #[error("server i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the full application router around `state`.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.cors_origin.clone())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60));

    let auth_router = Router::new()
        .route("/register", post(auth_routes::register_handler))
        .route("/login", post(auth_routes::login_handler))
        .route(
            "/profile",
            get(auth_routes::profile_handler).put(auth_routes::update_profile_handler),
        );

    let project_router = Router::new()
        .route(
            "/",
            get(projects::list_handler).post(projects::create_handler),
        )
        .route("/admin/all", get(projects::list_all_handler))
        .route(
            "/{id}",
            get(projects::get_handler)
                .put(projects::update_handler)
                .delete(projects::delete_handler),
        );

    let contact_router = Router::new()
        .route(
            "/",
            post(contacts::submit_handler).get(contacts::list_handler),
        )
        .route("/stats", get(contacts::stats_handler))
        .route(
            "/{id}",
            get(contacts::get_handler).delete(contacts::delete_handler),
        )
        .route("/{id}/read", put(contacts::toggle_read_handler));

    let upload_router = Router::new()
        .route("/single", post(uploads::upload_handler))
        .route("/image", post(uploads::upload_handler))
        .route("/{filename}", delete(uploads::delete_handler))
        .layer(DefaultBodyLimit::max(
            state
                .config
                .max_upload_bytes
                .saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
        .nest_service("/projects", ServeDir::new(state.uploads.projects_dir()));

    Router::new()
        .route("/", get(health::root_handler))
        .route("/api/health", get(health::health_handler))
        .route("/api/test/connection", get(health::connection_handler))
        .nest("/api/auth", auth_router)
        .nest("/api/projects", project_router)
        .nest("/api/contact", contact_router)
        .nest("/api/uploads", upload_router)
        .fallback(not_found_handler)
        .layer(cors)
        .with_state(state)
}

/// Binds the configured port and serves until SIGINT/SIGTERM.
pub async fn serve(state: SharedState) -> Result<(), ServeError> {
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = build_router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("event=server_start module=api status=ok address={address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                error!("Failed to install Ctrl+C handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!("Failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
