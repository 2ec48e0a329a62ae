use axum::http::HeaderValue;
use lineup_core::config::{env_flag, env_list, env_or, ConfigError};
use lineup_db::DEFAULT_MAX_CONNECTIONS;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background jobs to drain.
    pub shutdown_timeout_secs: u64,
    pub db_max_connections: u32,
    /// Run the sweep and reminder scheduler inside this process.
    pub run_scheduler: bool,
    /// Deliver notifications to this webhook instead of the log.
    pub notify_webhook_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            run_scheduler: false,
            notify_webhook_url: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `DB_MAX_CONNECTIONS`    | `20`                    |
    /// | `RUN_SCHEDULER`         | `false`                 |
    /// | `NOTIFY_WEBHOOK_URL`    | unset (log dispatcher)  |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cors_origins = env_list("CORS_ORIGINS", &defaults.cors_origins.join(","));
        for origin in &cors_origins {
            if HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.clone(),
                    reason: "not a valid header value".into(),
                });
            }
        }

        Ok(Self {
            host: env_or("HOST", defaults.host)?,
            port: env_or("PORT", defaults.port)?,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", defaults.shutdown_timeout_secs)?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            run_scheduler: env_flag("RUN_SCHEDULER")?,
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
        })
    }
}
