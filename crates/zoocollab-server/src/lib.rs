//! ZooCollab Server: configuration loading and service wiring.

pub mod app;
pub mod config;

pub use app::App;
pub use config::{AppConfig, DEFAULT_CONFIG_FILE};
