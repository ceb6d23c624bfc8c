//! Configuration loading and resolution
//!
//! Values are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file degrades to compiled defaults with a warning; it
//! never terminates startup on its own. Validation runs afterwards and
//! rejects configurations the session cannot run with (no API key, empty ad
//! set, non-positive ad rate). An empty playlist list passes validation: that
//! condition is handled at session start, where it stalls the session rather
//! than the process.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment variable naming the config file path
pub const ENV_CONFIG_PATH: &str = "TUBELOOP_CONFIG";
/// Environment variable overriding the HTTP port
pub const ENV_PORT: &str = "TUBELOOP_PORT";
/// Environment variable overriding the playlist API key
pub const ENV_API_KEY: &str = "TUBELOOP_API_KEY";

/// Configuration file schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Remote playlist IDs played in order, wrapping at the end
    #[serde(default)]
    pub playlists: Vec<String>,

    /// Playlist API access
    #[serde(default)]
    pub api: ApiConfig,

    /// Ad interleaving parameters
    #[serde(default)]
    pub ads: AdsConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Playlist API access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Static API key sent with every playlist request
    #[serde(default)]
    pub key: Option<String>,

    /// Playlist-items endpoint base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            base_url: default_base_url(),
        }
    }
}

/// Ad interleaving configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdsConfig {
    /// Ad video IDs selected round-robin
    #[serde(default)]
    pub video_ids: Vec<String>,

    /// Target plays per hour for each ad video
    #[serde(default = "default_plays_per_hour")]
    pub plays_per_hour: f64,
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            video_ids: Vec::new(),
            plays_per_hour: default_plays_per_hour(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Tracing filter directives for the configured level
    ///
    /// Used as the fallback when `RUST_LOG` is not set; the environment
    /// variable outranks the file per the resolution order.
    pub fn filter(&self) -> String {
        format!(
            "tubeloop_player={level},tubeloop_common={level},tower_http={level}",
            level = self.level
        )
    }
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3/playlistItems".to_string()
}

fn default_plays_per_hour() -> f64 {
    60.0
}

fn default_port() -> u16 {
    5750
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Playlist API key
    pub api_key: String,

    /// Playlist-items endpoint base URL
    pub api_base_url: String,

    /// Remote playlist IDs, played in order
    pub playlists: Vec<String>,

    /// Ad video IDs, selected round-robin
    pub ad_video_ids: Vec<String>,

    /// Target ad plays per hour
    pub ads_per_hour: f64,

    /// HTTP server port
    pub port: u16,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration
    ///
    /// Reads the TOML file named by the CLI override, the `TUBELOOP_CONFIG`
    /// environment variable, or the platform config directory, then applies
    /// port/API-key overrides (CLI beats environment beats file).
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match resolve_config_path(overrides.config_path.as_deref()) {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read config file {:?}: {}", path, e))
                })?;
                let parsed: TomlConfig = toml::from_str(&contents).map_err(|e| {
                    Error::Config(format!("Failed to parse config file {:?}: {}", path, e))
                })?;
                info!("Loaded configuration from {:?}", path);
                parsed
            }
            Some(path) => {
                warn!("Config file {:?} not found, using defaults", path);
                TomlConfig::default()
            }
            None => {
                warn!("No config directory available, using defaults");
                TomlConfig::default()
            }
        };

        let port = match overrides.port {
            Some(port) => port,
            None => match std::env::var(ENV_PORT) {
                Ok(value) => value.parse::<u16>().map_err(|e| {
                    Error::Config(format!("Invalid {} value {:?}: {}", ENV_PORT, value, e))
                })?,
                Err(_) => toml_config.server.port,
            },
        };

        let api_key = overrides
            .api_key
            .or_else(|| std::env::var(ENV_API_KEY).ok())
            .or(toml_config.api.key)
            .unwrap_or_default();

        let config = Config {
            api_key,
            api_base_url: toml_config.api.base_url,
            playlists: toml_config.playlists,
            ad_video_ids: toml_config.ads.video_ids,
            ads_per_hour: toml_config.ads.plays_per_hour,
            port,
            logging: toml_config.logging,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate settings the session cannot run without
    ///
    /// The playlist list is intentionally not checked here; an empty list
    /// stalls the session at startup instead of failing configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::Config(
                "api.key is required (or set TUBELOOP_API_KEY)".to_string(),
            ));
        }
        if self.api_base_url.is_empty() {
            return Err(Error::Config("api.base_url must not be empty".to_string()));
        }
        if self.ad_video_ids.is_empty() {
            return Err(Error::Config(
                "ads.video_ids must contain at least one video".to_string(),
            ));
        }
        if !self.ads_per_hour.is_finite() || self.ads_per_hour <= 0.0 {
            return Err(Error::Config(format!(
                "ads.plays_per_hour must be positive, got {}",
                self.ads_per_hour
            )));
        }
        Ok(())
    }
}

/// Determine the config file path to try
///
/// CLI argument, then `TUBELOOP_CONFIG`, then the platform config directory.
fn resolve_config_path(cli_path: Option<&std::path::Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        return Some(PathBuf::from(path));
    }
    default_config_path()
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tubeloop").join("player.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(default_port(), 5750);
        assert_eq!(default_plays_per_hour(), 60.0);
        assert_eq!(default_log_level(), "info");
        assert!(default_base_url().contains("playlistItems"));
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            playlists = ["PLfKvtXXEgOvCAWcpT_PU4KIwLRtjKUqv5"]

            [api]
            key = "test-key"
            base_url = "http://localhost:9999/playlistItems"

            [ads]
            video_ids = ["a3ICNMQW7Ok", "U6fC4Ij608A"]
            plays_per_hour = 1.0

            [server]
            port = 6000

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.playlists.len(), 1);
        assert_eq!(config.api.key.as_deref(), Some("test-key"));
        assert_eq!(config.api.base_url, "http://localhost:9999/playlistItems");
        assert_eq!(config.ads.video_ids.len(), 2);
        assert_eq!(config.ads.plays_per_hour, 1.0);
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_str = r#"
            [api]
            key = "k"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert!(config.playlists.is_empty());
        assert_eq!(config.api.base_url, default_base_url());
        assert!(config.ads.video_ids.is_empty());
        assert_eq!(config.ads.plays_per_hour, 60.0);
        assert_eq!(config.server.port, 5750);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = TomlConfig {
            playlists: vec!["PL1".to_string()],
            api: ApiConfig {
                key: Some("key-123".to_string()),
                base_url: default_base_url(),
            },
            ads: AdsConfig {
                video_ids: vec!["a1".to_string()],
                plays_per_hour: 2.5,
            },
            server: ServerConfig { port: 7000 },
            logging: LoggingConfig::default(),
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: TomlConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.playlists, vec!["PL1".to_string()]);
        assert_eq!(parsed.api.key.as_deref(), Some("key-123"));
        assert_eq!(parsed.ads.plays_per_hour, 2.5);
        assert_eq!(parsed.server.port, 7000);
    }

    #[test]
    fn test_logging_filter_uses_configured_level() {
        let logging = LoggingConfig {
            level: "warn".to_string(),
        };
        assert_eq!(
            logging.filter(),
            "tubeloop_player=warn,tubeloop_common=warn,tower_http=warn"
        );

        assert_eq!(
            LoggingConfig::default().filter(),
            "tubeloop_player=info,tubeloop_common=info,tower_http=info"
        );
    }

    fn valid_config() -> Config {
        Config {
            api_key: "key".to_string(),
            api_base_url: default_base_url(),
            playlists: vec!["PL1".to_string()],
            ad_video_ids: vec!["a1".to_string()],
            ads_per_hour: 60.0,
            port: 5750,
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_validate_accepts_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_empty_playlists() {
        // An empty playlist list stalls the session later; it is not a
        // configuration failure.
        let mut config = valid_config();
        config.playlists.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_api_key() {
        let mut config = valid_config();
        config.api_key.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.key"));
    }

    #[test]
    fn test_validate_rejects_empty_ad_set() {
        let mut config = valid_config();
        config.ad_video_ids.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ads.video_ids"));
    }

    #[test]
    fn test_validate_rejects_nonpositive_rate() {
        let mut config = valid_config();
        config.ads_per_hour = 0.0;
        assert!(config.validate().is_err());

        config.ads_per_hour = -3.0;
        assert!(config.validate().is_err());

        config.ads_per_hour = f64::NAN;
        assert!(config.validate().is_err());
    }
}
