//! PostgreSQL pool construction.
//!
//! The pool is created once at startup and handed to the ingest pipeline
//! and the HTTP server explicitly. Pipeline stages acquire and release
//! their own connections from it; nothing holds a connection across
//! stages.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DbConfig;

/// Maximum connections in the pool.
const MAX_CONNECTIONS: u32 = 5;

/// How long to wait for a free connection before giving up.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect a pool using the given settings.
pub async fn connect(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(connect_options(config))
        .await
}

fn connect_options(config: &DbConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_from_config() {
        let config = DbConfig {
            host: "db.internal".to_string(),
            port: 6543,
            user: "ingest".to_string(),
            password: "secret".to_string(),
            database: "warehouse".to_string(),
        };

        let options = connect_options(&config);
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "ingest");
        assert_eq!(options.get_database(), Some("warehouse"));
    }
}
