use std::str::FromStr;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for local development.
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Log output format (default: pretty).
    pub log_format: LogFormat,
    /// Delete readings older than this many days. `None` keeps everything.
    pub reading_retention_days: Option<i64>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `8000`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `LOG_FORMAT`             | `pretty`                |
    /// | `READING_RETENTION_DAYS` | unset (disabled)        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
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

        let log_format: LogFormat = std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".into())
            .parse()
            .unwrap_or_else(|e| panic!("LOG_FORMAT: {e}"));

        let reading_retention_days =
            parse_retention_days(std::env::var("READING_RETENTION_DAYS").ok().as_deref());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            log_format,
            reading_retention_days,
        }
    }
}

/// Upper bound for `READING_RETENTION_DAYS` (100 years).
pub const MAX_RETENTION_DAYS: i64 = 36_500;

/// Parse `READING_RETENTION_DAYS`. Unset or blank disables retention.
///
/// # Panics
///
/// Panics unless the value is an integer in `1..=MAX_RETENTION_DAYS`.
pub fn parse_retention_days(raw: Option<&str>) -> Option<i64> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    let days: i64 = raw
        .parse()
        .expect("READING_RETENTION_DAYS must be a valid i64");
    assert!(
        (1..=MAX_RETENTION_DAYS).contains(&days),
        "READING_RETENTION_DAYS must be between 1 and {MAX_RETENTION_DAYS}, got {days}"
    );
    Some(days)
}
