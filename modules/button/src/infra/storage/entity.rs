/// Row of the `presses` table (without the surrogate id).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PressRow {
    pub user_id: String,
    pub time_pressed: i64,
}
