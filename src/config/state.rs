// Application state module
// Per-process state shared across connection tasks

use super::types::Config;

/// Application state
///
/// The configuration is fixed for the process lifetime; request handlers
/// read it through a shared `Arc<AppState>`.
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Root directory every request path is resolved under
    pub fn base_dir(&self) -> &str {
        &self.config.files.base_dir
    }
}
