use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::season::error::flag_value;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub season: SeasonConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            season: SeasonConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the season data comes from and how the simulation draws randomness.
#[derive(Debug, Clone, Default)]
pub struct SeasonConfig {
    /// Fixed RNG seed; `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
    pub roster_csv: Option<PathBuf>,
    pub calendar_csv: Option<PathBuf>,
    /// Applied when a reset request does not say whether to restore skills.
    pub reset_skills: bool,
}

impl SeasonConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let rng_seed = match non_empty_var("SEASON_RNG_SEED") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| ConfigError::InvalidSeed)?),
            None => None,
        };

        let reset_skills = match non_empty_var("SEASON_RESET_SKILLS") {
            Some(raw) => flag_value(&raw).ok_or(ConfigError::InvalidFlag {
                var: "SEASON_RESET_SKILLS",
            })?,
            None => true,
        };

        Ok(Self {
            rng_seed,
            roster_csv: non_empty_var("SEASON_ROSTER_CSV").map(PathBuf::from),
            calendar_csv: non_empty_var("SEASON_CALENDAR_CSV").map(PathBuf::from),
            reset_skills,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSeed,
    InvalidFlag { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSeed => write!(f, "SEASON_RNG_SEED must be a valid u64"),
            ConfigError::InvalidFlag { var } => write!(f, "{var} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSeed
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for var in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "SEASON_RNG_SEED",
            "SEASON_ROSTER_CSV",
            "SEASON_CALENDAR_CSV",
            "SEASON_RESET_SKILLS",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.season.rng_seed, None);
        assert!(config.season.roster_csv.is_none());
        assert!(config.season.reset_skills);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_season_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SEASON_RNG_SEED", "42");
        env::set_var("SEASON_RESET_SKILLS", "off");
        env::set_var("SEASON_CALENDAR_CSV", "data/calendar.csv");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.season.rng_seed, Some(42));
        assert!(!config.season.reset_skills);
        assert_eq!(
            config.season.calendar_csv,
            Some(PathBuf::from("data/calendar.csv"))
        );
        reset_env();
    }

    #[test]
    fn reset_flag_matches_query_flag_spellings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        for raw in ["YES", "on", "1", "False", "no", "0"] {
            reset_env();
            env::set_var("SEASON_RESET_SKILLS", raw);
            let config = AppConfig::load().expect("config loads");
            let query = crate::season::parse_flag("reset_skills", raw).expect("flag parses");
            assert_eq!(config.season.reset_skills, query, "spelling {raw}");
        }
        reset_env();
    }

    #[test]
    fn rejects_malformed_season_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SEASON_RNG_SEED", "-3");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidSeed)));

        reset_env();
        env::set_var("SEASON_RESET_SKILLS", "sometimes");
        match AppConfig::load() {
            Err(ConfigError::InvalidFlag { var }) => assert_eq!(var, "SEASON_RESET_SKILLS"),
            other => panic!("expected invalid flag, got {other:?}"),
        }
        reset_env();
    }
}
