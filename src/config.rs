use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};

/// Where user and contact records are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL, reached through `DATABASE_URL`.
    Postgres,
    /// Process-local store. Data is lost on restart.
    Memory,
}

/// Argon2id cost parameters used when hashing passwords.
#[derive(Clone, Copy, Debug)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The storage backend to use.
    pub storage: StorageBackend,
    /// The URL of the PostgreSQL database. Empty for the memory backend.
    pub database_url: String,
    /// Maximum number of pooled database connections.
    pub db_pool_max_size: usize,
    /// The address the HTTP server binds to.
    pub server_addr: SocketAddr,
    /// Origins allowed by the CORS layer.
    pub cors_allowed_origins: Vec<String>,
    /// Password hashing cost.
    pub hashing: HashingConfig,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        let storage = match env::var("STORAGE")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => anyhow::bail!("STORAGE must be 'postgres' or 'memory', got '{}'", other),
        };

        let database_url = match storage {
            StorageBackend::Postgres => env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            StorageBackend::Memory => env::var("DATABASE_URL").unwrap_or_default(),
        };

        let defaults = HashingConfig::default();

        Ok(Self {
            storage,
            database_url,
            db_pool_max_size: parse_var("DB_POOL_MAX_SIZE", 16)?,
            server_addr: env::var("SERVER_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid SERVER_ADDR")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            hashing: HashingConfig {
                memory_kib: parse_var("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
                iterations: parse_var("ARGON2_ITERATIONS", defaults.iterations)?,
                parallelism: parse_var("ARGON2_PARALLELISM", defaults.parallelism)?,
            },
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("Invalid {}", name)),
        Err(_) => Ok(default),
    }
}
