//! HTTP ingress: owns the listening socket and the middleware stack that wraps
//! the routes contributed by feature modules.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod config;
pub mod error;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use error::ErrorResponse;

pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Wrap module routes with `/health`, a JSON 404 fallback and the global middleware stack.
    pub fn build_router(&self, routes: Router) -> Router {
        let config = &self.config;
        tracing::debug!(
            cors = config.cors_enabled,
            timeout_secs = config.request_timeout_secs,
            body_limit = config.body_limit_bytes,
            "Building router"
        );

        let mut router = routes
            .route("/health", get(web::health_check))
            .fallback(web::not_found);

        // Outermost to innermost:
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions -> Timeout -> CORS -> BodyLimit
        let x_request_id = request_id::header();

        router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));

        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router = router.layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )));

        router = router.layer(from_fn(request_id::push_req_id_to_extensions));

        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(request_id::make_http_span)
                .on_response(request_id::record_response),
        );

        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));

        router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind `addr` and serve until `cancel` fires.
    pub async fn serve(
        &self,
        router: Router,
        addr: SocketAddr,
        cancel: CancellationToken,
    ) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
        self.serve_on(listener, router, cancel).await
    }

    /// Serve on an already bound listener until `cancel` fires.
    pub async fn serve_on(
        &self,
        listener: TcpListener,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!("HTTP server bound on {}", addr);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
