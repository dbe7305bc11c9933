//! agenda configuration.
//!
//! `LayoutConfig` holds the tunables of the layout engine. `AgendaConfig`
//! is the user's `~/.config/agenda/config.toml`, layered with `AGENDA_*`
//! environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Weekday;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::appointment::UserId;
use crate::error::{AgendaError, AgendaResult};

const DEFAULT_HOUR_HEIGHT: f64 = 48.0;
const DEFAULT_LABEL_COLUMN_WIDTH: f64 = 64.0;
const DEFAULT_MAX_VISIBLE_ROWS: usize = 3;
const DEFAULT_MIN_BLOCK_MINUTES: i64 = 15;
static DEFAULT_TOAST_DURATION: &str = "3s";

fn default_hour_height() -> f64 {
    DEFAULT_HOUR_HEIGHT
}

fn default_label_column_width() -> f64 {
    DEFAULT_LABEL_COLUMN_WIDTH
}

fn default_max_visible_rows() -> usize {
    DEFAULT_MAX_VISIBLE_ROWS
}

fn default_min_block_minutes() -> i64 {
    DEFAULT_MIN_BLOCK_MINUTES
}

fn default_week_start() -> Weekday {
    Weekday::Sun
}

fn default_toast_duration() -> String {
    DEFAULT_TOAST_DURATION.to_string()
}

/// Geometry parameters for the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Pixels per hour in day and week views.
    #[serde(default = "default_hour_height")]
    pub hour_height: f64,

    /// Width of the time-label gutter left of the day columns.
    #[serde(default = "default_label_column_width")]
    pub label_column_width: f64,

    /// Month view rows per week before "+N more" kicks in.
    #[serde(default = "default_max_visible_rows")]
    pub max_visible_rows: usize,

    /// Floor on the rendered duration of very short appointments.
    #[serde(default = "default_min_block_minutes")]
    pub min_block_duration_minutes: i64,

    #[serde(default = "default_week_start")]
    pub week_start: Weekday,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            hour_height: DEFAULT_HOUR_HEIGHT,
            label_column_width: DEFAULT_LABEL_COLUMN_WIDTH,
            max_visible_rows: DEFAULT_MAX_VISIBLE_ROWS,
            min_block_duration_minutes: DEFAULT_MIN_BLOCK_MINUTES,
            week_start: Weekday::Sun,
        }
    }
}

impl LayoutConfig {
    /// Reject values that indicate a caller bug rather than bad data.
    pub fn validate(&self) -> AgendaResult<()> {
        if !self.hour_height.is_finite() || self.hour_height <= 0.0 {
            return Err(AgendaError::InvalidParameter(format!(
                "hour_height must be positive, got {}",
                self.hour_height
            )));
        }
        if !self.label_column_width.is_finite() || self.label_column_width < 0.0 {
            return Err(AgendaError::InvalidParameter(format!(
                "label_column_width must not be negative, got {}",
                self.label_column_width
            )));
        }
        if self.max_visible_rows == 0 {
            return Err(AgendaError::InvalidParameter(
                "max_visible_rows must be at least 1".into(),
            ));
        }
        if self.min_block_duration_minutes <= 0 {
            return Err(AgendaError::InvalidParameter(format!(
                "min_block_duration_minutes must be positive, got {}",
                self.min_block_duration_minutes
            )));
        }
        Ok(())
    }
}

/// User configuration at ~/.config/agenda/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Base URL of the appointment API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Bearer token issued at login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Id of the logged-in user; decides edit vs. view access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    /// JSON file of appointment records to use instead of the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,

    /// How long a notification stays up, e.g. "3s".
    #[serde(default = "default_toast_duration")]
    pub toast_duration: String,

    #[serde(default)]
    pub layout: LayoutConfig,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        AgendaConfig {
            api_base_url: None,
            token: None,
            user_id: None,
            snapshot: None,
            toast_duration: default_toast_duration(),
            layout: LayoutConfig::default(),
        }
    }
}

impl AgendaConfig {
    pub fn config_path() -> AgendaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, creating a commented default on first run.
    pub fn load() -> AgendaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> AgendaResult<Self> {
        let config: AgendaConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("AGENDA").separator("__"))
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AgendaError::Config(e.to_string()))?;

        config.layout.validate()?;
        config.toast_duration()?;
        Ok(config)
    }

    /// Save the current config to `path`.
    pub fn save(&self, path: &Path) -> AgendaResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| AgendaError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn toast_duration(&self) -> AgendaResult<Duration> {
        humantime::parse_duration(&self.toast_duration).map_err(|e| {
            AgendaError::Config(format!(
                "Invalid toast_duration '{}': {e}",
                self.toast_duration
            ))
        })
    }

    /// Snapshot path with `~` expanded.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.snapshot.as_ref().map(|p| {
            PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned())
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AgendaResult<()> {
        let contents = format!(
            "\
# agenda configuration

# Appointment API:
# api_base_url = \"https://appointments.example.com/api\"
# token = \"<jwt from login>\"
# user_id = 1

# Read appointments from a JSON file instead of the API:
# snapshot = \"~/appointments.json\"

# How long notifications stay visible:
# toast_duration = \"{DEFAULT_TOAST_DURATION}\"

# [layout]
# hour_height = {DEFAULT_HOUR_HEIGHT}
# label_column_width = {DEFAULT_LABEL_COLUMN_WIDTH}
# max_visible_rows = {DEFAULT_MAX_VISIBLE_ROWS}
# min_block_duration_minutes = {DEFAULT_MIN_BLOCK_MINUTES}
# week_start = \"Sun\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
