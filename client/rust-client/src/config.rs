use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_FILE: &str = ".matgwiazda/session.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub session_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables (APP_API__BASE_URL -> api.base_url)
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let api_base_url = settings
            .get_string("api.base_url")
            .or_else(|_| env::var("MATGWIAZDA_API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let request_timeout_secs = match settings.get_int("api.request_timeout_secs") {
            Ok(secs) => u64::try_from(secs).map_err(|_| {
                config::ConfigError::Message(format!(
                    "api.request_timeout_secs must be positive, got {}",
                    secs
                ))
            })?,
            Err(_) => env::var("MATGWIAZDA_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let session_file = settings
            .get_string("session.file")
            .or_else(|_| env::var("MATGWIAZDA_SESSION_FILE"))
            .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());

        Ok(Config {
            api_base_url,
            request_timeout_secs,
            session_file: PathBuf::from(session_file),
        })
    }

    /// Rejects base URLs the HTTP client cannot talk to.
    pub fn validate(&self) -> ApiResult<()> {
        let parsed = url::Url::parse(&self.api_base_url).map_err(|e| {
            ApiError::Config(format!("invalid api base url '{}': {}", self.api_base_url, e))
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ApiError::Config(format!(
                    "api base url must use http or https, got '{}'",
                    other
                )))
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ApiError::Config(
                "request timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
