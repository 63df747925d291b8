//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which text-generation provider backs the insight generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextProviderKind {
    OpenAi,
    Anthropic,
}

/// Holds all configuration loaded from the environment at startup.
///
/// Established once at process start and never mutated; components receive
/// it at construction rather than reading ambient global state.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub buildings_path: PathBuf,
    pub text_provider: TextProviderKind,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_base: String,
    pub trend_model: String,
    pub auto_classify: bool,
    pub generation_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Store Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let buildings_path = std::env::var("BUILDINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/buildings.json"));

        // --- Load Text-Generation Provider Settings ---
        let provider_str =
            std::env::var("TEXT_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let text_provider = match provider_str.to_lowercase().as_str() {
            "openai" => TextProviderKind::OpenAi,
            "anthropic" => TextProviderKind::Anthropic,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "TEXT_PROVIDER".to_string(),
                    format!("'{}' is not a known provider", provider_str),
                ))
            }
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        let anthropic_api_base = std::env::var("ANTHROPIC_API_BASE")
            .unwrap_or_else(|_| "https://api.anthropic.com".to_string());

        let trend_model = std::env::var("TREND_MODEL")
            .unwrap_or_else(|_| default_model(text_provider).to_string());

        let auto_classify_str =
            std::env::var("AUTO_CLASSIFY").unwrap_or_else(|_| "true".to_string());
        let auto_classify = auto_classify_str.parse::<bool>().map_err(|_| {
            ConfigError::InvalidValue(
                "AUTO_CLASSIFY".to_string(),
                format!("'{}' is not a boolean", auto_classify_str),
            )
        })?;

        let timeout_str =
            std::env::var("GENERATION_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "GENERATION_TIMEOUT_SECS".to_string(),
                format!("'{}' is not a number of seconds", timeout_str),
            )
        })?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            buildings_path,
            text_provider,
            openai_api_key,
            anthropic_api_key,
            anthropic_api_base,
            trend_model,
            auto_classify,
            generation_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn default_model(provider: TextProviderKind) -> &'static str {
    match provider {
        TextProviderKind::OpenAi => "gpt-4o-mini",
        TextProviderKind::Anthropic => "claude-3-5-sonnet-latest",
    }
}
