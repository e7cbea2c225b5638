//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOP_JWT_SECRET` - Token signing secret (min 32 chars)
//! - `DATABASE_URL` - `PostgreSQL` connection string (postgres storage only)
//!
//! ## Optional
//! - `SHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOP_PORT` - Listen port (default: 5000)
//! - `SHOP_STORAGE` - `postgres` or `memory` (default: postgres)
//! - `SHOP_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `SHOP_RUN_MIGRATIONS` - Apply migrations on startup (default: true)
//! - `SHOP_TOKEN_TTL_SECS` - Access token lifetime (default: 3600, max: 30 days)
//! - `SHOP_ADMIN_USERNAME` - Seeded admin name (default: admin)
//! - `SHOP_ADMIN_PASSWORD` - Seeded admin password; no admin is seeded when unset

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which storage adapter backs the unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Credentials of the admin account created on startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub host: IpAddr,
    pub port: u16,
    pub storage: StorageBackend,
    /// Present whenever `storage` is `Postgres`.
    pub database_url: Option<SecretString>,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub jwt_secret: SecretString,
    pub token_ttl_secs: i64,
    pub admin: Option<AdminSeed>,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let host = env.parsed("SHOP_HOST", "127.0.0.1")?;
        let port = env.parsed("SHOP_PORT", "5000")?;
        let storage = env.parsed("SHOP_STORAGE", "postgres")?;
        let database_url = match storage {
            StorageBackend::Postgres => Some(SecretString::from(env.required("DATABASE_URL")?)),
            StorageBackend::Memory => env.optional("DATABASE_URL").map(SecretString::from),
        };
        let max_connections = env.parsed("SHOP_DB_MAX_CONNECTIONS", "10")?;
        let run_migrations = env.parsed("SHOP_RUN_MIGRATIONS", "true")?;

        let jwt_secret = SecretString::from(env.required("SHOP_JWT_SECRET")?);
        validate_jwt_secret(&jwt_secret, "SHOP_JWT_SECRET")?;
        let token_ttl_secs: i64 = env.parsed("SHOP_TOKEN_TTL_SECS", "3600")?;
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&token_ttl_secs) {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_TOKEN_TTL_SECS".to_string(),
                format!("must be between 1 and {MAX_TOKEN_TTL_SECS}"),
            ));
        }

        let admin = env.optional("SHOP_ADMIN_PASSWORD").map(|password| AdminSeed {
            username: env.or_default("SHOP_ADMIN_USERNAME", "admin"),
            password: SecretString::from(password),
        });

        Ok(Self {
            host,
            port,
            storage,
            database_url,
            max_connections,
            run_migrations,
            jwt_secret,
            token_ttl_secs,
            admin,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {})",
                value.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

    fn load(vars: &[(&str, &str)]) -> Result<ShopConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ShopConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("SHOP_JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.socket_addr(), "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.max_connections, 10);
        assert!(config.run_migrations);
        assert_eq!(config.token_ttl_secs, 3600);
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let result = load(&[("SHOP_JWT_SECRET", SECRET)]);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "DATABASE_URL"));
    }

    #[test]
    fn test_memory_storage_without_database() {
        let config = load(&[
            ("SHOP_STORAGE", "memory"),
            ("SHOP_JWT_SECRET", SECRET),
            ("SHOP_ADMIN_PASSWORD", "s3cret-admin"),
        ])
        .unwrap();

        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.database_url.is_none());
        let admin = config.admin.unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.password.expose_secret(), "s3cret-admin");
    }

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        let result = load(&[("SHOP_STORAGE", "memory"), ("SHOP_JWT_SECRET", "short")]);
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_invalid_values() {
        let port = load(&[
            ("SHOP_STORAGE", "memory"),
            ("SHOP_JWT_SECRET", SECRET),
            ("SHOP_PORT", "not-a-port"),
        ]);
        assert!(matches!(port, Err(ConfigError::InvalidEnvVar(key, _)) if key == "SHOP_PORT"));

        let storage = load(&[("SHOP_STORAGE", "redis"), ("SHOP_JWT_SECRET", SECRET)]);
        assert!(matches!(storage, Err(ConfigError::InvalidEnvVar(key, _)) if key == "SHOP_STORAGE"));

        let ttl = load(&[
            ("SHOP_STORAGE", "memory"),
            ("SHOP_JWT_SECRET", SECRET),
            ("SHOP_TOKEN_TTL_SECS", "0"),
        ]);
        assert!(ttl.is_err());
    }

    #[test]
    fn test_token_ttl_is_capped() {
        let ttl = |value: &str| {
            load(&[
                ("SHOP_STORAGE", "memory"),
                ("SHOP_JWT_SECRET", SECRET),
                ("SHOP_TOKEN_TTL_SECS", value),
            ])
        };

        let config = ttl("2592000").expect("thirty days is allowed");
        assert_eq!(config.token_ttl_secs, MAX_TOKEN_TTL_SECS);

        for value in ["2592001", "9223372036854775807"] {
            assert!(matches!(
                ttl(value),
                Err(ConfigError::InvalidEnvVar(key, _)) if key == "SHOP_TOKEN_TTL_SECS"
            ));
        }
    }
}
