/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Customer group assumed when a request passes group id 0.
    pub default_customer_group: i64,
    /// When set, every plugin-provided portlet resolves as missing.
    pub safe_mode: bool,
    /// Snapshots kept per draft; values <= 0 disable revisioning.
    pub max_revisions: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `DEFAULT_CUSTOMER_GROUP` | `1`                        |
    /// | `OPC_SAFE_MODE`          | `false`                    |
    /// | `MAX_REVISIONS`          | `5`                        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let default_customer_group: i64 = std::env::var("DEFAULT_CUSTOMER_GROUP")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("DEFAULT_CUSTOMER_GROUP must be a valid i64");

        let safe_mode = matches!(
            std::env::var("OPC_SAFE_MODE").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE")
        );

        let max_revisions: i64 = std::env::var("MAX_REVISIONS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("MAX_REVISIONS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            default_customer_group,
            safe_mode,
            max_revisions,
        }
    }
}
