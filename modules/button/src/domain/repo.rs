use async_trait::async_trait;

use crate::contract::model::Press;

/// Append-only durable log of presses.
///
/// Commit times are assigned by the log and never decrease from one append to
/// the next; equal times are ordered by insertion.
#[async_trait]
pub trait PressLog: Send + Sync {
    /// Create the backing table and index when missing.
    async fn ensure_schema(&self) -> anyhow::Result<()>;

    /// Record a press and return its commit time (epoch millis).
    async fn append(&self, user_id: &str) -> anyhow::Result<i64>;

    async fn most_recent_press(&self) -> anyhow::Result<Option<Press>>;

    async fn most_recent_press_by_user(&self, user_id: &str) -> anyhow::Result<Option<Press>>;

    async fn total_press_count(&self) -> anyhow::Result<i64>;
}
