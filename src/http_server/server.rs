//! # HTTP Server
//!
//! Combines the health and schema routers behind CORS and request
//! tracing layers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::HttpServerConfig;
use super::routes::{health_routes, schema_routes};
use crate::api::ApiHandler;
use crate::observability::Event;

/// HTTP server over one shared API handler
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, handler: Arc<ApiHandler>) -> Self {
        let router = Self::build_router(&config, handler);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, handler: Arc<ApiHandler>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .nest("/schemas", schema_routes(handler))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// The router, for driving requests without a socket
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the future is dropped or the listener fails.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(
            event = Event::ServerStart.as_str(),
            addr = %addr,
            "shapestat HTTP server listening"
        );
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
