//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use morra::{
    GameSettings, constants,
    db::{DatabaseConfig, DatabaseConfigError},
};
use std::{fmt, net::SocketAddr, str::FromStr};

const DEFAULT_BIND: &str = "127.0.0.1:6969";

/// Where game records live
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StoreBackend {
    /// Process-local map; records vanish on restart
    #[default]
    Memory,
    /// PostgreSQL documents with cross-process change notification
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(ConfigError::Invalid {
                var: "MORRA_STORE".to_string(),
                reason: format!("Unknown store '{other}', expected 'memory' or 'postgres'"),
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Postgres => write!(f, "postgres"),
        }
    }
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Record store backend
    pub store: StoreBackend,
    /// Database configuration, present exactly when `store` is postgres
    pub database: Option<DatabaseConfig>,
    /// Rules shared by every hosted game
    pub game: GameSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `store_override` - Optional store backend override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed, the postgres
    /// store has no database URL, or the resulting settings are inconsistent
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        store_override: Option<StoreBackend>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            bind_override,
            database_url_override,
            store_override,
            |key| std::env::var(key).ok(),
        )
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup<F>(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        store_override: Option<StoreBackend>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match parse_var(&lookup, "SERVER_BIND")? {
                Some(bind) => bind,
                None => default_bind()?,
            },
        };

        let store = match store_override {
            Some(store) => store,
            None => parse_var(&lookup, "MORRA_STORE")?.unwrap_or_default(),
        };

        let database = match store {
            StoreBackend::Memory => None,
            StoreBackend::Postgres => {
                let config = DatabaseConfig::from_lookup(|key| match key {
                    "DATABASE_URL" => database_url_override.clone().or_else(|| lookup(key)),
                    _ => lookup(key),
                })
                .map_err(database_error)?;
                Some(config)
            }
        };

        let game = GameSettings::new(
            parse_var(&lookup, "MORRA_MIN_BET")?.unwrap_or(constants::DEFAULT_MIN_BET),
            parse_var(&lookup, "MORRA_MAX_BET")?.unwrap_or(constants::DEFAULT_MAX_BET),
            parse_var(&lookup, "MORRA_MAX_UPDATE_RETRIES")?
                .unwrap_or(constants::DEFAULT_MAX_UPDATE_RETRIES),
            parse_var(&lookup, "MORRA_SUBSCRIBER_CAPACITY")?
                .unwrap_or(constants::DEFAULT_SUBSCRIBER_CAPACITY),
        );

        let config = ServerConfig {
            bind,
            store,
            database,
            game,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate().map_err(|reason| ConfigError::Invalid {
            var: "MORRA_*".to_string(),
            reason,
        })?;

        if self.store == StoreBackend::Postgres && self.database.is_none() {
            return Err(missing_database_url());
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> Result<SocketAddr, ConfigError> {
    DEFAULT_BIND.parse().map_err(|_| ConfigError::Invalid {
        var: "SERVER_BIND".to_string(),
        reason: format!("Default '{DEFAULT_BIND}' is not a socket address"),
    })
}

fn missing_database_url() -> ConfigError {
    ConfigError::MissingRequired {
        var: "DATABASE_URL".to_string(),
        hint: "Set it or pass --db-url when using --store postgres".to_string(),
    }
}

fn database_error(err: DatabaseConfigError) -> ConfigError {
    match err {
        DatabaseConfigError::Missing(_) => missing_database_url(),
        DatabaseConfigError::Invalid { var, value } => ConfigError::Invalid {
            var: var.to_string(),
            reason: format!("Could not parse '{value}'"),
        },
    }
}

/// Read `key`, treating unset as `None` and unparsable as an error.
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Could not parse '{raw}'"),
        }),
        None => Ok(None),
    }
}
