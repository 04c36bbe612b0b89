use crate::calendar::IntensityScale;
use crate::scrobble::{Credentials, DEFAULT_API_BASE};
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::{info, warn};

pub const PLACEHOLDER_API_KEY: &str = "YOUR_LASTFM_API_KEY";
pub const PLACEHOLDER_USERNAME: &str = "YOUR_LASTFM_USERNAME";
pub const DEFAULT_PALETTE: [&str; 5] = ["#ebedf0", "#9be9a8", "#40c463", "#30a14e", "#216e39"];

const CONFIG_FILE: &str = "calendar_config.json";
const COUNTS_FILE: &str = "playcounts.json";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REFRESH_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub api_key: String,
    pub username: String,
    #[serde(default)]
    pub intensity: IntensityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: PLACEHOLDER_API_KEY.to_string(),
            username: PLACEHOLDER_USERNAME.to_string(),
            intensity: IntensityConfig::default(),
        }
    }
}

impl Config {
    /// Credentials for remote fetches, or `None` while the file still holds placeholders.
    pub fn credentials(&self) -> Option<Credentials> {
        let api_key = self.api_key.trim();
        let username = self.username.trim();
        if api_key.is_empty() || username.is_empty() || api_key == PLACEHOLDER_API_KEY {
            return None;
        }
        Some(Credentials {
            api_key: api_key.to_string(),
            username: username.to_string(),
        })
    }
}

/// Display policy: `count / divisor` picks a palette entry, clamped to the darkest one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityConfig {
    pub divisor: u64,
    pub palette: Vec<String>,
}

impl Default for IntensityConfig {
    fn default() -> Self {
        Self {
            divisor: IntensityScale::default().divisor,
            palette: DEFAULT_PALETTE.iter().map(|color| color.to_string()).collect(),
        }
    }
}

impl IntensityConfig {
    /// Falls back to the default policy when the configured one is unusable.
    pub fn validated(self) -> Self {
        if self.divisor == 0
            || self.palette.is_empty()
            || self.palette.len() > 256
            || !self.palette.iter().all(|color| is_hex_color(color))
        {
            warn!(
                divisor = self.divisor,
                colors = self.palette.len(),
                "ignoring invalid intensity settings"
            );
            return Self::default();
        }
        self
    }

    pub fn scale(&self) -> IntensityScale {
        IntensityScale {
            divisor: self.divisor.max(1),
            max_bucket: self.palette.len().saturating_sub(1).min(255) as u8,
        }
    }

    pub fn color(&self, bucket: u8) -> &str {
        self.palette
            .get(usize::from(bucket))
            .or_else(|| self.palette.last())
            .map_or(DEFAULT_PALETTE[0], String::as_str)
    }
}

/// `#rgb` or `#rrggbb`.
fn is_hex_color(raw: &str) -> bool {
    raw.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
    })
}

pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(config)?)?;
    Ok(())
}

/// Reads the config file, replacing a missing or unreadable one with placeholders.
pub fn load_or_create_config(path: &Path) -> Config {
    let config = match read_config(path) {
        Ok(config) => config,
        Err(err) => {
            if matches!(&err, ConfigError::Io(io) if io.kind() == std::io::ErrorKind::NotFound) {
                info!("creating default config at {}", path.display());
            } else {
                warn!("replacing unusable config {}: {err}", path.display());
            }
            let config = Config::default();
            if let Err(err) = write_config(path, &config) {
                warn!("failed to write default config: {err}");
            }
            config
        }
    };
    Config {
        intensity: config.intensity.validated(),
        ..config
    }
}

/// Process-level settings taken from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_path: PathBuf,
    pub counts_path: PathBuf,
    pub port: u16,
    pub refresh_interval: Duration,
    pub api_base: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        let config_path = lookup("APP_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(CONFIG_FILE));
        let counts_path = lookup("APP_COUNTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(COUNTS_FILE));
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let refresh_secs = lookup("REFRESH_INTERVAL_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REFRESH_SECS);
        let api_base = lookup("LASTFM_API_URL").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Self {
            config_path,
            counts_path,
            port,
            refresh_interval: Duration::from_secs(refresh_secs),
            api_base,
        }
    }
}
