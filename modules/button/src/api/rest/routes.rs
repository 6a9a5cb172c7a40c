use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::PressService;

pub fn register_routes(router: Router, service: Arc<PressService>) -> anyhow::Result<Router> {
    let routes = Router::new()
        .route("/api/v1/press", post(handlers::press))
        .route("/api/v1/data", get(handlers::data))
        .route("/api/v1/whowaslast", get(handlers::who_was_last))
        .layer(Extension(service));

    Ok(router.merge(routes))
}
