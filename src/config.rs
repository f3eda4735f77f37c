/// Configuration management for MapTools markers
use crate::error::{MarkerError, MarkerResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Longest accepted profile cache TTL (one year)
const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub markers: MarkerFileConfig,
    pub players: PlayerFeedConfig,
    pub profiles: ProfileConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Marker snapshot output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerFileConfig {
    pub path: PathBuf,
    pub update_interval_secs: u64,
    /// Write snapshots on a spawned task instead of inline
    pub async_write: bool,
}

/// Connected player feed written by the game server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerFeedConfig {
    pub path: PathBuf,
}

/// Profile and texture resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Resolve real profiles for players on offline-mode servers
    pub offline_resolve_textures: bool,
    pub cache_ttl_secs: u64,
    pub mojang_api_url: String,
    pub session_server_url: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub name_lookups_per_minute: u32,
}

/// Optional HTTP listener for health, metrics and the marker file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub listen_addr: Option<SocketAddr>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON log lines instead of human-readable text
    pub json: bool,
}

/// Parse `key` if set, else `default`; unparsable values are rejected
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> MarkerResult<T> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            MarkerError::Validation(format!("Invalid value for {}: {}", key, raw))
        }),
        _ => Ok(default),
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            markers: MarkerFileConfig {
                path: PathBuf::from("players.json"),
                update_interval_secs: 5,
                async_write: true,
            },
            players: PlayerFeedConfig {
                path: PathBuf::from("online_players.json"),
            },
            profiles: ProfileConfig {
                offline_resolve_textures: true,
                cache_ttl_secs: 6 * 60 * 60,
                mojang_api_url: "https://api.mojang.com".to_string(),
                session_server_url: "https://sessionserver.mojang.com".to_string(),
                user_agent: format!("maptools-markers/{}", env!("CARGO_PKG_VERSION")),
                http_timeout_secs: 10,
                name_lookups_per_minute: 60,
            },
            http: HttpConfig { listen_addr: None },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}

impl MarkerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> MarkerResult<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let listen_addr = match env::var("MAPTOOLS_HTTP_ADDR") {
            Ok(addr) if !addr.trim().is_empty() => Some(addr.trim().parse().map_err(|_| {
                MarkerError::Validation(format!("Invalid listen address: {}", addr))
            })?),
            _ => None,
        };

        Ok(MarkerConfig {
            markers: MarkerFileConfig {
                path: env::var("MAPTOOLS_MARKER_FILE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.markers.path),
                update_interval_secs: env_or(
                    "MAPTOOLS_UPDATE_INTERVAL_SECS",
                    defaults.markers.update_interval_secs,
                )?,
                async_write: env_or("MAPTOOLS_ASYNC_WRITE", defaults.markers.async_write)?,
            },
            players: PlayerFeedConfig {
                path: env::var("MAPTOOLS_PLAYER_FEED")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.players.path),
            },
            profiles: ProfileConfig {
                offline_resolve_textures: env_or(
                    "MAPTOOLS_OFFLINE_RESOLVE_TEXTURES",
                    defaults.profiles.offline_resolve_textures,
                )?,
                cache_ttl_secs: env_or(
                    "MAPTOOLS_PROFILE_CACHE_TTL_SECS",
                    defaults.profiles.cache_ttl_secs,
                )?,
                mojang_api_url: env::var("MAPTOOLS_MOJANG_API_URL")
                    .unwrap_or(defaults.profiles.mojang_api_url),
                session_server_url: env::var("MAPTOOLS_SESSION_SERVER_URL")
                    .unwrap_or(defaults.profiles.session_server_url),
                user_agent: env::var("MAPTOOLS_USER_AGENT")
                    .unwrap_or(defaults.profiles.user_agent),
                http_timeout_secs: env_or(
                    "MAPTOOLS_HTTP_TIMEOUT_SECS",
                    defaults.profiles.http_timeout_secs,
                )?,
                name_lookups_per_minute: env_or(
                    "MAPTOOLS_NAME_LOOKUPS_PER_MINUTE",
                    defaults.profiles.name_lookups_per_minute,
                )?,
            },
            http: HttpConfig { listen_addr },
            logging: LoggingConfig {
                level: env::var("RUST_LOG").unwrap_or(defaults.logging.level),
                json: env_or("MAPTOOLS_LOG_JSON", defaults.logging.json)?,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> MarkerResult<()> {
        if self.markers.path.as_os_str().is_empty() {
            return Err(MarkerError::Validation(
                "Marker file path cannot be empty".to_string(),
            ));
        }

        if self.markers.update_interval_secs == 0 {
            return Err(MarkerError::Validation(
                "Update interval must be at least one second".to_string(),
            ));
        }

        if self.profiles.cache_ttl_secs == 0 {
            return Err(MarkerError::Validation(
                "Profile cache TTL must be positive".to_string(),
            ));
        }

        if self.profiles.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(MarkerError::Validation(format!(
                "Profile cache TTL must be at most {} seconds",
                MAX_CACHE_TTL_SECS
            )));
        }

        if self.profiles.name_lookups_per_minute == 0 {
            return Err(MarkerError::Validation(
                "Name lookup rate must be positive".to_string(),
            ));
        }

        for url in [
            &self.profiles.mojang_api_url,
            &self.profiles.session_server_url,
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(MarkerError::Validation(format!(
                    "Service URL must be http(s): {}",
                    url
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MarkerConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.profiles.cache_ttl_secs, 21600);
        assert_eq!(config.markers.update_interval_secs, 5);
        assert!(config.profiles.offline_resolve_textures);
        assert!(config.http.listen_addr.is_none());
        assert!(!config.logging.json);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut config = MarkerConfig::default();
        config.markers.update_interval_secs = 0;
        assert!(matches!(config.validate(), Err(MarkerError::Validation(_))));
    }

    #[test]
    fn test_rejects_zero_ttl() {
        let mut config = MarkerConfig::default();
        config.profiles.cache_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_ttl() {
        let mut config = MarkerConfig::default();
        config.profiles.cache_ttl_secs = u64::MAX;
        assert!(matches!(config.validate(), Err(MarkerError::Validation(_))));

        config.profiles.cache_ttl_secs = MAX_CACHE_TTL_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_or_rejects_unparsable_value() {
        env::set_var("MAPTOOLS_TEST_ENV_OR_BOOL", "yes");
        let result = env_or("MAPTOOLS_TEST_ENV_OR_BOOL", true);
        env::remove_var("MAPTOOLS_TEST_ENV_OR_BOOL");

        assert!(matches!(result, Err(MarkerError::Validation(_))));
    }

    #[test]
    fn test_env_or_parses_or_defaults() {
        env::set_var("MAPTOOLS_TEST_ENV_OR_SECS", " 30 ");
        let parsed = env_or("MAPTOOLS_TEST_ENV_OR_SECS", 5u64);
        env::remove_var("MAPTOOLS_TEST_ENV_OR_SECS");

        assert_eq!(parsed.unwrap(), 30);
        assert_eq!(env_or("MAPTOOLS_TEST_ENV_OR_UNSET", 5u64).unwrap(), 5);
    }

    #[test]
    fn test_rejects_non_http_service_url() {
        let mut config = MarkerConfig::default();
        config.profiles.session_server_url = "ftp://sessionserver.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_marker_path() {
        let mut config = MarkerConfig::default();
        config.markers.path = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
