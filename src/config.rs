//! Configuration module for environment variables and application settings

use std::env;
use std::str::FromStr;
use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;

/// Global application configuration loaded from environment variables
pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Token signing configuration
    pub auth: AuthConfig,

    /// Strategy generation configuration
    pub ai: AiConfig,

    /// Base URL used when building download and webhook links
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Chat-completion API key. Without it generation uses the built-in templates.
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Simulated processing time for the template paths, in milliseconds
    pub mock_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let port = env_or("PORT", 3001)?;

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                cors_origins,
            },

            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .unwrap_or_else(|_| "your-secret-key".to_string()),
                token_ttl_days: env_or("JWT_EXPIRY_DAYS", 7)?,
            },

            ai: AiConfig {
                openai_api_key,
                openai_api_url: env::var("OPENAI_API_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("OPENAI_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                temperature: 0.7,
                max_tokens: 700,
                mock_delay_ms: env_or("AI_MOCK_DELAY_MS", 1500)?,
            },

            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
        })
    }
}

/// Read and parse an optional variable, falling back to `default` when unset
fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by the handler tests: no API key, no simulated delay.
    pub fn for_tests() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3001,
                cors_origins: vec!["http://localhost:5173".to_string()],
            },
            auth: AuthConfig {
                jwt_secret: "test_secret".to_string(),
                token_ttl_days: 7,
            },
            ai: AiConfig {
                openai_api_key: None,
                openai_api_url: "http://127.0.0.1:9".to_string(),
                model: "gpt-4o-mini".to_string(),
                temperature: 0.7,
                max_tokens: 700,
                mock_delay_ms: 0,
            },
            public_base_url: "http://localhost:3001".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let value: u64 = env_or("TRADEQUANTIC_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
