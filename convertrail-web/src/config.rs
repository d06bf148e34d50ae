//! Server configuration from command-line flags and environment variables.
use clap::Parser;
use convertrail_game::{CatalogError, ElementCatalog, GameConfig, Rules, RulesError};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::cookie::{CookieError, CookieSigner};

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_SESSION_TTL_MINS: u64 = 120;
pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "convertrail-web")]
#[command(about = "Serve the Convertrail A/B testing game")]
#[command(version)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "CONVERTRAIL_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Secret used to sign session cookies (random per process when unset)
    #[arg(long, env = "CONVERTRAIL_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// JSON element catalog replacing the built-in one
    #[arg(long, env = "CONVERTRAIL_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Minutes of inactivity before a session is dropped
    #[arg(
        long,
        env = "CONVERTRAIL_SESSION_TTL_MINS",
        default_value_t = DEFAULT_SESSION_TTL_MINS
    )]
    pub session_ttl_mins: u64,

    /// Most sessions kept in memory; the least recently used is evicted
    #[arg(long, env = "CONVERTRAIL_MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    pub max_sessions: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            secret_key: None,
            catalog: None,
            session_ttl_mins: DEFAULT_SESSION_TTL_MINS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Cookie(#[from] CookieError),
}

impl ServerConfig {
    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_mins.saturating_mul(60))
    }

    /// Game rules with the configured catalog.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the catalog file cannot be read or is invalid.
    pub fn load_rules(&self) -> Result<Rules, ConfigError> {
        let Some(path) = &self.catalog else {
            return Ok(Rules::standard());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let catalog = ElementCatalog::from_json(&json).map_err(|source| ConfigError::Catalog {
            path: path.clone(),
            source,
        })?;
        log::info!(
            "loaded {} element(s) from {}",
            catalog.len(),
            path.display()
        );
        Ok(Rules::new(GameConfig::default(), catalog)?)
    }

    /// Cookie signer for the configured secret.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the secret is empty.
    pub fn signer(&self) -> Result<CookieSigner, ConfigError> {
        if let Some(secret) = &self.secret_key {
            return Ok(CookieSigner::new(secret.as_bytes())?);
        }
        log::warn!("CONVERTRAIL_SECRET_KEY not set; sessions will not survive a restart");
        Ok(CookieSigner::random()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ServerConfig::try_parse_from(["convertrail-web"]).unwrap();
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.session_ttl(), Duration::from_secs(7_200));
        assert_eq!(config.catalog, None);
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "convertrail-web",
            "--bind",
            "0.0.0.0:8080",
            "--session-ttl-mins",
            "5",
            "--secret-key",
            "hunter2",
            "--max-sessions",
            "50",
        ])
        .unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.session_ttl(), Duration::from_secs(300));
        assert_eq!(config.max_sessions, 50);
        assert!(config.signer().is_ok());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let config = ServerConfig {
            secret_key: Some(String::new()),
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.signer(),
            Err(ConfigError::Cookie(CookieError::EmptyKey))
        ));
    }

    #[test]
    fn catalog_file_is_loaded_and_validated() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("convertrail-catalog-{}.json", std::process::id()));
        std::fs::write(&good, r#"{"cta": {"bold": 0.02, "caps": -0.01}}"#).unwrap();
        let config = ServerConfig {
            catalog: Some(good.clone()),
            ..ServerConfig::default()
        };
        let rules = config.load_rules().unwrap();
        assert_eq!(rules.catalog().variants("cta"), vec!["bold", "caps"]);

        std::fs::write(&good, r#"{"cta": {}}"#).unwrap();
        assert!(matches!(
            config.load_rules(),
            Err(ConfigError::Catalog { .. })
        ));
        std::fs::remove_file(&good).ok();

        let missing = ServerConfig {
            catalog: Some(dir.join("convertrail-no-such-catalog.json")),
            ..ServerConfig::default()
        };
        assert!(matches!(missing.load_rules(), Err(ConfigError::Io { .. })));
    }
}
