use std::sync::Arc;

use tracing::{debug, info, instrument, warn, Instrument};

use crate::contract::model::{ButtonStatus, Press, RecencyEntry};
use crate::domain::cache::ButtonStateCache;
use crate::domain::clock::Clock;
use crate::domain::directory::UserDirectory;
use crate::domain::error::PressError;
use crate::domain::repo::PressLog;
use crate::domain::report;

/// Minimum gap between two presses of the same user.
pub const COOLDOWN_MS: i64 = 15_000;

/// Shown by the status view when nobody (resolvable) pressed yet.
pub const NO_ONE: &str = "no one";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub expiry_deadline_ms: i64,
    pub millis_deducted_per_press: i64,
}

/// Press arbitration: decides whether a press is legal and commits it.
///
/// Fairness checks (consecutive presses, cooldown) read the press log; expiry
/// reads the cache and may lag concurrent commits.
pub struct PressService {
    press_log: Arc<dyn PressLog>,
    directory: Arc<dyn UserDirectory>,
    cache: Arc<ButtonStateCache>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl PressService {
    pub fn new(
        press_log: Arc<dyn PressLog>,
        directory: Arc<dyn UserDirectory>,
        cache: Arc<ButtonStateCache>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            press_log,
            directory,
            cache,
            clock,
            config,
        }
    }

    /// Ensure the schema exists and seed the cache from the log.
    #[instrument(name = "button.service.bootstrap", skip_all)]
    pub async fn bootstrap(
        press_log: Arc<dyn PressLog>,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> anyhow::Result<Self> {
        press_log.ensure_schema().await?;
        let count = press_log.total_press_count().await?;
        let last = press_log.most_recent_press().await?;
        info!(
            presses = count,
            last_press_at = last.as_ref().map(|p| p.time_millis),
            "Button state loaded from press log"
        );

        let cache = Arc::new(ButtonStateCache::seeded(count, last));
        Ok(Self::new(press_log, directory, cache, clock, config))
    }

    pub fn cache(&self) -> &Arc<ButtonStateCache> {
        &self.cache
    }

    pub fn config(&self) -> ServiceConfig {
        self.config
    }

    /// `deadline - now - presses * deduction`, saturating.
    pub fn remaining_millis(&self) -> i64 {
        let deducted = self
            .cache
            .press_count()
            .saturating_mul(self.config.millis_deducted_per_press);
        self.config
            .expiry_deadline_ms
            .saturating_sub(self.clock.now_millis())
            .saturating_sub(deducted)
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_millis() < 0
    }

    /// Validate and commit a press; returns the commit time.
    #[instrument(name = "button.service.submit_press", skip_all, fields(user_id = %user_id))]
    pub async fn submit_press(&self, user_id: &str) -> Result<i64, PressError> {
        if self.is_expired() {
            debug!("Press rejected: button expired");
            return Err(PressError::ButtonExpired);
        }

        let user = self.directory.by_id(user_id).map_err(|e| {
            debug!("Press rejected: {}", e);
            PressError::unknown_user(user_id)
        })?;

        let last = self
            .press_log
            .most_recent_press()
            .await
            .map_err(|e| storage_error("most_recent_press", e))?;
        if last.is_some_and(|p| p.user_id == user.user_id) {
            debug!("Press rejected: consecutive press");
            return Err(PressError::PressedTwiceInARow);
        }

        let own_last = self
            .press_log
            .most_recent_press_by_user(&user.user_id)
            .await
            .map_err(|e| storage_error("most_recent_press_by_user", e))?;
        if let Some(p) = own_last {
            if self.clock.now_millis() - p.time_millis < COOLDOWN_MS {
                debug!(last_press_at = p.time_millis, "Press rejected: cooldown");
                return Err(PressError::PressedTooSoon);
            }
        }

        let (time, presses) = self.commit(user.user_id).await?;

        info!(time, presses, "Press accepted");
        Ok(time)
    }

    /// Append to the log and fold the press into the cache on a separate task,
    /// so a dropped request cannot leave a committed press out of the cache.
    async fn commit(&self, user_id: String) -> Result<(i64, i64), PressError> {
        let press_log = self.press_log.clone();
        let cache = self.cache.clone();
        let task = tokio::spawn(
            async move {
                let time = press_log.append(&user_id).await?;
                let presses = cache.increment();
                cache.record_if_newer(Press::new(user_id, time));
                Ok::<_, anyhow::Error>((time, presses))
            }
            .in_current_span(),
        );

        match task.await {
            Ok(committed) => committed.map_err(|e| storage_error("append", e)),
            Err(join) => Err(storage_error("append", anyhow::Error::new(join))),
        }
    }

    /// Cache-backed status view; never touches the press log.
    pub fn status(&self) -> ButtonStatus {
        let snapshot = self.cache.snapshot();
        let who_pressed = snapshot
            .last_press
            .and_then(|p| self.directory.by_id(&p.user_id).ok())
            .map(|u| u.name)
            .unwrap_or_else(|| NO_ONE.to_string());

        ButtonStatus {
            presses: snapshot.press_count,
            who_pressed,
            expiry: self.config.expiry_deadline_ms,
            millis_per_press: self.config.millis_deducted_per_press,
        }
    }

    #[instrument(name = "button.service.recency_report", skip(self))]
    pub async fn recency_report(&self) -> Result<Vec<RecencyEntry>, PressError> {
        report::recency_report(self.press_log.as_ref(), self.directory.as_ref())
            .await
            .map_err(|e| storage_error("recency_report", e))
    }
}

fn storage_error(op: &str, e: anyhow::Error) -> PressError {
    warn!(operation = op, error = ?e, "Press log failure");
    PressError::storage(format!("{e:#}"))
}
