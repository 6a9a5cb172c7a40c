pub mod entity;
pub mod mapper;
pub mod sqlx_press_log;

pub use sqlx_press_log::SqlxPressLog;
