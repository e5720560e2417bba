use anyhow::Result;
use std::env;
use std::str::FromStr;

/// What happens to the attendance log entry when a check-in is undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndoPolicy {
    /// Keep the entry and flip its status to `absent`.
    #[default]
    MarkAbsent,
    /// Delete the entry.
    Delete,
}

impl FromStr for UndoPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mark_absent" | "absent" => Ok(UndoPolicy::MarkAbsent),
            "delete" | "remove" => Ok(UndoPolicy::Delete),
            other => Err(anyhow::anyhow!("Invalid UNDO_POLICY: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_acquire_timeout_secs: u64,
    pub host: String,
    pub port: u16,
    /// `None` allows any origin.
    pub cors_allowed_origin: Option<String>,
    pub undo_policy: UndoPolicy,
    pub export_utc_offset_minutes: i32,
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let undo_policy = match env::var("UNDO_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => UndoPolicy::default(),
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/checkin".to_string()),
            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", 10),
            database_min_connections: var_or("DATABASE_MIN_CONNECTIONS", 2),
            database_acquire_timeout_secs: var_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 10),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: var_or("PORT", 3000),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|origin| !origin.trim().is_empty() && origin.trim() != "*"),
            undo_policy,
            export_utc_offset_minutes: var_or("EXPORT_UTC_OFFSET_MINUTES", 330),
        })
    }

    /// In-memory configuration used by the test suites.
    pub fn test_config() -> Self {
        Config {
            database_url: "memory:".to_string(),
            database_max_connections: 1,
            database_min_connections: 0,
            database_acquire_timeout_secs: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origin: None,
            undo_policy: UndoPolicy::MarkAbsent,
            export_utc_offset_minutes: 330,
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
