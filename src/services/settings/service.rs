use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::CalendarSettings;

/// Environment variable overriding the settings file location
pub const CONFIG_PATH_ENV: &str = "LESSON_CALENDAR_CONFIG";

const SETTINGS_FILE: &str = "settings.toml";

pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings file from `LESSON_CALENDAR_CONFIG`, else the platform config dir
    pub fn from_environment() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(Self::new(path));
        }
        let proj_dirs = ProjectDirs::from("com", "KenBoyle", "LessonCalendar")
            .context("Failed to resolve config directory")?;
        Ok(Self::new(proj_dirs.config_dir().join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings. A missing file yields the defaults.
    pub fn get(&self) -> Result<CalendarSettings> {
        if !self.path.exists() {
            log::debug!("No settings file at {:?}, using defaults", self.path);
            return Ok(CalendarSettings::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {:?}", self.path))?;
        let settings: CalendarSettings =
            toml::from_str(&raw).context("Failed to parse settings")?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        Ok(settings)
    }

    pub fn update(&self, settings: &CalendarSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let raw = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write settings to {:?}", self.path))?;
        log::info!("Saved settings to {:?}", self.path);

        Ok(())
    }
}
