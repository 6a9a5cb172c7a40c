//! The Button: press arbitration over a shared, expiring button.
//!
//! Public surface is the module wiring ([`Button`]), its configuration and the
//! contract models. Domain, infra and REST internals are exposed for tests only.

pub mod config;
pub mod contract;
pub mod module;

pub use config::ButtonConfig;
pub use module::Button;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
