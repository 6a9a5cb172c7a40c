use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Configuration of the button module (`modules.button`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ButtonConfig {
    /// Epoch millis after which the button is expired (before per-press deductions).
    #[serde(default)]
    pub expiry_deadline_ms: i64,
    /// Millis removed from the deadline by every accepted press.
    #[serde(default)]
    pub millis_deducted_per_press: i64,
    /// JSON user list, `{"users":[{"userId":..,"name":..}]}`.
    #[serde(default = "default_users_file")]
    pub users_file: String,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            expiry_deadline_ms: 0,
            millis_deducted_per_press: 0,
            users_file: default_users_file(),
        }
    }
}

fn default_users_file() -> String {
    "users.json".to_string()
}

impl ButtonConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            expiry_deadline_ms: self.expiry_deadline_ms,
            millis_deducted_per_press: self.millis_deducted_per_press,
        }
    }
}
