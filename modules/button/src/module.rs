use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use axum::Router;
use db::DbHandle;

use crate::api::rest::routes;
use crate::config::ButtonConfig;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::service::PressService;
use crate::infra::json_users::JsonUserDirectory;
use crate::infra::storage::SqlxPressLog;

/// Button module: wires the press log, user directory and service, and
/// contributes the `/api/v1` routes.
#[derive(Default)]
pub struct Button {
    service: ArcSwapOption<PressService>,
}

impl Button {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load users, bootstrap the press log and seed the cache. Any failure is fatal to startup.
    pub async fn init(&self, cfg: &ButtonConfig, db: Arc<DbHandle>) -> anyhow::Result<()> {
        tracing::info!(
            expiry = cfg.expiry_deadline_ms,
            millis_per_press = cfg.millis_deducted_per_press,
            "Initializing button module"
        );

        let directory = JsonUserDirectory::from_file(&cfg.users_file)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let press_log = SqlxPressLog::new(db, clock.clone());

        let service = PressService::bootstrap(
            Arc::new(press_log),
            Arc::new(directory),
            clock,
            cfg.service_config(),
        )
        .await
        .context("Failed to load button state from the press log")?;

        self.install(service);
        Ok(())
    }

    /// Use an already built service.
    pub fn install(&self, service: PressService) {
        self.service.store(Some(Arc::new(service)));
    }

    pub fn service(&self) -> Option<Arc<PressService>> {
        self.service.load_full()
    }

    pub fn register_rest(&self, router: Router) -> anyhow::Result<Router> {
        let service = self
            .service()
            .ok_or_else(|| anyhow::anyhow!("button module is not initialized"))?;
        routes::register_routes(router, service)
    }
}
