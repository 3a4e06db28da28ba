use crate::config::{AccessPolicy, Config};
use crate::library::Library;
use crate::streaming::ContentServer;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    middleware, Router,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod access;
pub mod error;
pub mod routes_library;
pub mod routes_movies;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub library: Arc<Library>,
    pub config: Arc<Config>,
    /// Resolved from `config.server.access`
    pub access: AccessPolicy,
    pub content: ContentServer,
}

impl AppContext {
    pub fn new(library: Arc<Library>, config: Config) -> Self {
        Self {
            access: config.server.access.policy(),
            config: Arc::new(config),
            library,
            content: ContentServer::default(),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    // Browsers must be able to send Range and read the range response headers.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::HEAD, Method::POST])
        .allow_headers([header::RANGE])
        .expose_headers([
            header::CONTENT_RANGE,
            header::CONTENT_LENGTH,
            header::ACCEPT_RANGES,
        ]);

    Router::new()
        .merge(routes_movies::movie_routes())
        .merge(routes_library::library_routes())
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            access::access_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Start the HTTP server and run until a shutdown signal arrives
pub async fn start_server(config: Config, library: Arc<Library>) -> Result<()> {
    let host: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);

    match config.server.access.policy() {
        AccessPolicy::Open => tracing::info!("Access policy: open"),
        AccessPolicy::AllowList(ips) => tracing::info!(allowed = ?ips, "Access policy: allow-list"),
    }

    let app = create_router(AppContext::new(library, config));

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
