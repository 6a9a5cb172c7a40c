/// One accepted press. `time_millis` is the commit time assigned by the press log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Press {
    pub user_id: String,
    pub time_millis: i64,
}

impl Press {
    pub fn new(user_id: impl Into<String>, time_millis: i64) -> Self {
        Self {
            user_id: user_id.into(),
            time_millis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub name: String,
}

/// Public view of the button as served by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonStatus {
    pub presses: i64,
    /// Display name of the last presser, or `"no one"`.
    pub who_pressed: String,
    /// Configured deadline (epoch millis), before deductions.
    pub expiry: i64,
    pub millis_per_press: i64,
}

/// One line of the recency report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencyEntry {
    pub name: String,
    pub time_millis: i64,
}
