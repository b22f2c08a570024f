//! Server configuration read from the environment.

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
/// Default cap on cart sessions held in memory.
pub const DEFAULT_MAX_OPEN_CARTS: usize = 10_000;

/// Runtime configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// PostgreSQL connection string (`DATABASE_URL`).
    pub database_url: String,
    /// Interface to bind (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Port to bind (`PORT`, default `3000`).
    pub port: u16,
    /// Pool size (`DATABASE_MAX_CONNECTIONS`, default `10`).
    pub max_connections: u32,
    /// Cart sessions kept in memory before idle ones are evicted
    /// (`MAX_OPEN_CARTS`, default `10000`).
    pub max_open_carts: usize,
}

impl Config {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".to_owned())
        })?;
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("DATABASE_MAX_CONNECTIONS must be a valid u32: {e}"))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let max_open_carts = match lookup("MAX_OPEN_CARTS") {
            Some(raw) => match raw.parse() {
                Ok(0) => {
                    return Err(AppError::Config(
                        "MAX_OPEN_CARTS must be at least 1".to_owned(),
                    ));
                }
                Ok(value) => value,
                Err(e) => {
                    return Err(AppError::Config(format!(
                        "MAX_OPEN_CARTS must be a valid usize: {e}"
                    )));
                }
            },
            None => DEFAULT_MAX_OPEN_CARTS,
        };

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            max_open_carts,
        })
    }

    /// Returns `host:port` for binding.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
