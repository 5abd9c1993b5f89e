//! Environment configuration.
//!
//! All settings come from environment variables, loaded from a `.env`
//! file when one is present (`dotenvy` runs at process start). The
//! variable names are: `DBHOST`, `DBPORT`, `DBUSER`, `DBPASSWORD`,
//! `DBNAME` for the database, `PORT` for the HTTP listener.

use crate::error::{ConfigError, ConfigResult};

/// PostgreSQL connection settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbConfig {
    /// Build from `DBHOST` / `DBPORT` / `DBUSER` / `DBPASSWORD` / `DBNAME`.
    ///
    /// `DBPORT` defaults to 5432 when unset; the others are required.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            host: require("DBHOST")?,
            port: port_or("DBPORT", 5432)?,
            user: require("DBUSER")?,
            password: require("DBPASSWORD")?,
            database: require("DBNAME")?,
        })
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    /// Build from `PORT`, defaulting to 3000 when unset.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            port: port_or("PORT", 3000)?,
        })
    }
}

fn require(var: &'static str) -> ConfigResult<String> {
    std::env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

fn port_or(var: &'static str, default: u16) -> ConfigResult<u16> {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidVar { var, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global, so every case lives in one
    // test function to keep the suite parallel-safe.
    #[test]
    fn test_from_env() {
        std::env::set_var("DBHOST", "localhost");
        std::env::set_var("DBUSER", "ingest");
        std::env::set_var("DBPASSWORD", "secret");
        std::env::set_var("DBNAME", "warehouse");
        std::env::remove_var("DBPORT");

        let config = DbConfig::from_env().unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.user, "ingest");
        assert_eq!(config.password, "secret");
        assert_eq!(config.database, "warehouse");

        std::env::set_var("DBPORT", "6543");
        let config = DbConfig::from_env().unwrap();
        assert_eq!(config.port, 6543);

        std::env::set_var("DBPORT", "not-a-port");
        let err = DbConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { var: "DBPORT", .. }));
        std::env::remove_var("DBPORT");

        std::env::remove_var("DBHOST");
        let err = DbConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DBHOST")));
        std::env::set_var("DBHOST", "localhost");

        std::env::remove_var("PORT");
        let server = ServerConfig::from_env().unwrap();
        assert_eq!(server.port, 3000);

        std::env::set_var("PORT", "8080");
        let server = ServerConfig::from_env().unwrap();
        assert_eq!(server.port, 8080);
        std::env::remove_var("PORT");
    }
}
