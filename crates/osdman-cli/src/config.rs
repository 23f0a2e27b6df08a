//! Configuration loading for the CLI.

use std::path::Path;

use osdman_config::Config;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration, preferring `explicit` when supplied.
    fn load(&self, explicit: Option<&Path>) -> Result<Config, AppError>;
}

/// Loads configuration from disk using the standard search order.
pub(crate) struct FileConfigLoader;

impl ConfigLoader for FileConfigLoader {
    fn load(&self, explicit: Option<&Path>) -> Result<Config, AppError> {
        Config::load_with_override(explicit).map_err(AppError::LoadConfiguration)
    }
}
