use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use db::{DbHandle, DbPool};

use crate::contract::model::Press;
use crate::domain::clock::Clock;
use crate::domain::repo::PressLog;
use crate::infra::storage::entity::PressRow;
use crate::infra::storage::mapper::entity_to_contract;

/// SQL for one engine; every operation is a single statement.
struct Dialect {
    schema: &'static [&'static str],
    append: &'static str,
    most_recent: &'static str,
    most_recent_by_user: &'static str,
    count: &'static str,
}

// The commit time is clamped to the newest stored time inside the insert itself.
const POSTGRES: Dialect = Dialect {
    schema: &[
        "CREATE TABLE IF NOT EXISTS presses (
            id BIGSERIAL PRIMARY KEY,
            user_id TEXT NOT NULL,
            time_pressed BIGINT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS presses_user_time_idx ON presses (user_id, time_pressed)",
    ],
    append: "INSERT INTO presses (user_id, time_pressed)
             SELECT $1, GREATEST($2::BIGINT, COALESCE(MAX(time_pressed), 0)) FROM presses
             RETURNING time_pressed",
    most_recent: "SELECT user_id, time_pressed FROM presses
                  ORDER BY time_pressed DESC, id DESC LIMIT 1",
    most_recent_by_user: "SELECT user_id, time_pressed FROM presses WHERE user_id = $1
                          ORDER BY time_pressed DESC, id DESC LIMIT 1",
    count: "SELECT COUNT(*) FROM presses",
};

const SQLITE: Dialect = Dialect {
    schema: &[
        "CREATE TABLE IF NOT EXISTS presses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            time_pressed INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS presses_user_time_idx ON presses (user_id, time_pressed)",
    ],
    append: "INSERT INTO presses (user_id, time_pressed)
             SELECT ?1, MAX(?2, COALESCE(MAX(time_pressed), 0)) FROM presses
             RETURNING time_pressed",
    most_recent: "SELECT user_id, time_pressed FROM presses
                  ORDER BY time_pressed DESC, id DESC LIMIT 1",
    most_recent_by_user: "SELECT user_id, time_pressed FROM presses WHERE user_id = ?1
                          ORDER BY time_pressed DESC, id DESC LIMIT 1",
    count: "SELECT COUNT(*) FROM presses",
};

/// Runs `$body` with `$pool` bound to the concrete sqlx pool and `$sql` to its dialect.
macro_rules! on_pool {
    ($self:ident, |$pool:ident, $sql:ident| $body:expr) => {
        match $self.db.pool() {
            DbPool::Postgres($pool) => {
                let $sql = &POSTGRES;
                $body
            }
            DbPool::Sqlite($pool) => {
                let $sql = &SQLITE;
                $body
            }
        }
    };
}

/// Press log over the `presses` table of a Postgres or SQLite database.
pub struct SqlxPressLog {
    db: Arc<DbHandle>,
    clock: Arc<dyn Clock>,
}

impl SqlxPressLog {
    pub fn new(db: Arc<DbHandle>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }
}

#[async_trait]
impl PressLog for SqlxPressLog {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        on_pool!(self, |pool, sql| {
            for stmt in sql.schema {
                sqlx::query(stmt)
                    .execute(pool)
                    .await
                    .context("Failed to create presses schema")?;
            }
        });
        tracing::debug!(engine = ?self.db.engine(), "presses schema ready");
        Ok(())
    }

    async fn append(&self, user_id: &str) -> anyhow::Result<i64> {
        let now = self.clock.now_millis();
        let time = on_pool!(self, |pool, sql| {
            sqlx::query_scalar::<_, i64>(sql.append)
                .bind(user_id)
                .bind(now)
                .fetch_one(pool)
                .await
        })
        .context("Failed to append press")?;
        Ok(time)
    }

    async fn most_recent_press(&self) -> anyhow::Result<Option<Press>> {
        let row = on_pool!(self, |pool, sql| {
            sqlx::query_as::<_, PressRow>(sql.most_recent)
                .fetch_optional(pool)
                .await
        })
        .context("Failed to read most recent press")?;
        Ok(row.map(entity_to_contract))
    }

    async fn most_recent_press_by_user(&self, user_id: &str) -> anyhow::Result<Option<Press>> {
        let row = on_pool!(self, |pool, sql| {
            sqlx::query_as::<_, PressRow>(sql.most_recent_by_user)
                .bind(user_id)
                .fetch_optional(pool)
                .await
        })
        .with_context(|| format!("Failed to read most recent press of '{user_id}'"))?;
        Ok(row.map(entity_to_contract))
    }

    async fn total_press_count(&self) -> anyhow::Result<i64> {
        let count = on_pool!(self, |pool, sql| {
            sqlx::query_scalar::<_, i64>(sql.count)
                .fetch_one(pool)
                .await
        })
        .context("Failed to count presses")?;
        Ok(count)
    }
}
