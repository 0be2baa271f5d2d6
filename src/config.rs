use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Backend origin used when `FINEXUS_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://api.finexus.com.br";

/// Upper bound for every backend round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifetime of the session cookie written at login.
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bound for each round trip; always [`REQUEST_TIMEOUT`] outside tests.
    #[serde(skip_deserializing, default = "default_timeout")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    REQUEST_TIMEOUT
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub file: Option<PathBuf>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = match env::var("FINEXUS_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("finexus"),
        };

        Ok(Self {
            api: ApiConfig::new(
                env::var("FINEXUS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            ),
            session: SessionConfig { data_dir },
            logging: LoggingConfig {
                filter: env::var("RUST_LOG").unwrap_or_else(|_| "finexus=info".to_string()),
                file: env::var("FINEXUS_LOG_FILE").ok().map(PathBuf::from),
            },
        })
    }
}
