//! Layered application configuration.
//!
//! Sources, later ones winning: built-in defaults, an optional
//! `zoocollab.yaml`, then `ZOOCOLLAB_`-prefixed environment variables
//! with `__` separating nested keys (`ZOOCOLLAB_DB__URL`).

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;
use zoocollab_auth::AuthConfig;
use zoocollab_db::DbConfig;

pub const DEFAULT_CONFIG_FILE: &str = "zoocollab.yaml";
const ENV_PREFIX: &str = "ZOOCOLLAB_";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db: DbConfig::default(),
            auth: AuthConfig::default(),
            log_filter: "zoocollab=info".into(),
        }
    }
}

impl AppConfig {
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }
}
