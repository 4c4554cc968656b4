//! Settings persistence: `settings.toml` in the platform config directory.

mod service;

pub use service::{SettingsService, CONFIG_PATH_ENV};
