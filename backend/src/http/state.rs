//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::SchedulingSettings;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
    /// `[scheduling]` section of the configuration.
    pub settings: SchedulingSettings,
}

impl AppState {
    /// State with default scheduling settings.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_settings(repository, SchedulingSettings::default())
    }

    pub fn with_settings(repository: Arc<dyn FullRepository>, settings: SchedulingSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }
}
