//! Operator preferences persisted as TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{normalize_base_url, DEFAULT_API_URL};

pub const THEME_ENV: &str = "MTXPANEL_THEME";
pub const DEFAULT_AUTO_REFRESH_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid API URL {0:?}")]
    InvalidApiUrl(String),
    #[error("refresh interval must be greater than zero")]
    InvalidInterval,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Reads the preferred theme from `MTXPANEL_THEME`, if it names one.
    pub fn from_env() -> Option<Self> {
        std::env::var(THEME_ENV).ok().and_then(|v| Self::parse(&v))
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelSettings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh_interval_ms: u64,
    #[serde(default)]
    pub notifications_enabled: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_auto_refresh() -> u64 {
    DEFAULT_AUTO_REFRESH_MS
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            theme: Theme::default(),
            auto_refresh_interval_ms: DEFAULT_AUTO_REFRESH_MS,
            notifications_enabled: false,
        }
    }
}

impl PanelSettings {
    /// Defaults, with the theme taken from the environment when set.
    pub fn system_default() -> Self {
        Self {
            theme: Theme::from_env().unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn set_api_url(&mut self, url: &str) -> Result<(), SettingsError> {
        self.api_url = normalize_base_url(url)
            .map_err(|_| SettingsError::InvalidApiUrl(url.to_string()))?;
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn set_auto_refresh_interval(&mut self, ms: u64) -> Result<(), SettingsError> {
        if ms == 0 {
            return Err(SettingsError::InvalidInterval);
        }
        self.auto_refresh_interval_ms = ms;
        Ok(())
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.auto_refresh_interval_ms)
    }
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.config/mtxpanel/settings.toml`, or a relative path when
    /// `HOME` is unset.
    pub fn default_path() -> PathBuf {
        let base = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default();
        base.join(".config").join("mtxpanel").join("settings.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted settings, or defaults when nothing has been saved yet.
    pub fn load(&self) -> Result<PanelSettings, SettingsError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PanelSettings::system_default())
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        toml::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, settings: &PanelSettings) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let body = toml::to_string_pretty(settings)?;
        std::fs::write(&self.path, body).map_err(write_err)?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Loads, applies `f`, and saves. Returns the saved settings.
    pub fn update<F>(&self, f: F) -> Result<PanelSettings, SettingsError>
    where
        F: FnOnce(&mut PanelSettings) -> Result<(), SettingsError>,
    {
        let mut settings = self.load()?;
        f(&mut settings)?;
        self.save(&settings)?;
        Ok(settings)
    }
}
