pub mod classify;
pub mod config_cmd;
pub mod rules;

use ragdecide_config::{ClassifierConfig, ConfigError};
use std::path::Path;
use tracing::debug;

/// Load configuration from `path` if given, otherwise from the default
/// location. Environment overrides apply either way.
pub fn load_config(path: Option<&Path>) -> Result<ClassifierConfig, ConfigError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration");
            let mut config = ClassifierConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        None => ClassifierConfig::load(),
    }
}
