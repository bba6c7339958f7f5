use flowforce_core::parameters::ParameterOverrides;

use crate::config::AppConfig;

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Parameter overrides from the config file; requests layer on top.
    pub defaults: ParameterOverrides,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            defaults: config.parameters.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
