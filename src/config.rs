// src/config.rs
use crate::error::{AnalyticsError, AnalyticsResult};
use std::env;
use std::str::FromStr;

const DEFAULT_PLATFORM_URL: &str = "https://api.vapi.ai";

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub platform: PlatformSettings,
}

/// Connection settings for the voice platform REST API.
#[derive(Debug, Clone)]
pub struct PlatformSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub retry_base_ms: u64,
    pub page_size: usize,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PLATFORM_URL.to_string(),
            api_key: String::new(),
            timeout_ms: 30_000,
            max_attempts: 3,
            retry_base_ms: 1_000,
            page_size: 1_000,
        }
    }
}

impl Config {
    pub fn from_env() -> AnalyticsResult<Self> {
        dotenv::dotenv().ok();

        let defaults = PlatformSettings::default();

        let api_key = env::var("VOICE_PLATFORM_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(AnalyticsError::Config(
                "VOICE_PLATFORM_API_KEY not set".to_string(),
            ));
        }

        let platform = PlatformSettings {
            base_url: env::var("VOICE_PLATFORM_URL")
                .unwrap_or_else(|_| DEFAULT_PLATFORM_URL.to_string()),
            api_key,
            timeout_ms: parse_var("VOICE_PLATFORM_TIMEOUT_MS", defaults.timeout_ms)?,
            max_attempts: parse_var("VOICE_PLATFORM_MAX_ATTEMPTS", defaults.max_attempts)?,
            retry_base_ms: parse_var("VOICE_PLATFORM_RETRY_BASE_MS", defaults.retry_base_ms)?,
            page_size: parse_var("VOICE_PLATFORM_PAGE_SIZE", defaults.page_size)?,
        };

        if platform.max_attempts == 0 || platform.page_size == 0 {
            return Err(AnalyticsError::Config(
                "VOICE_PLATFORM_MAX_ATTEMPTS and VOICE_PLATFORM_PAGE_SIZE must be positive"
                    .to_string(),
            ));
        }

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 9100)?,
            platform,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> AnalyticsResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AnalyticsError::Config(format!("Invalid {}: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
