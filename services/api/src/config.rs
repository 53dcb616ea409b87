//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use course_advisor_core::AdvisorModels;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// The OpenAI-compatible endpoint of the Gemini API.
pub const DEFAULT_COMPLETION_API_BASE: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    pub gemini_api_key: String,
    pub completion_api_base: String,
    pub recommendation_model: String,
    pub details_model: String,
    pub url_model: String,
    pub insights_model: String,
    /// Chat sessions unused for this long are dropped.
    pub chat_session_idle: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server and Storage Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = var_or("DATABASE_URL", "sqlite://course_advisor.db?mode=rwc");

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:3000");

        // --- Completion Service ---
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;
        let completion_api_base = var_or("COMPLETION_API_BASE", DEFAULT_COMPLETION_API_BASE);

        let defaults = AdvisorModels::default();
        let recommendation_model = var_or("RECOMMENDATION_MODEL", &defaults.recommendation);
        let details_model = var_or("DETAILS_MODEL", &defaults.details);
        let url_model = var_or("URL_MODEL", &defaults.url);
        let insights_model = var_or("INSIGHTS_MODEL", &defaults.insights);

        // --- Chat Sessions ---
        let idle_str = var_or("CHAT_SESSION_IDLE_SECS", "1800");
        let chat_session_idle = idle_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "CHAT_SESSION_IDLE_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", idle_str),
                )
            })?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            gemini_api_key,
            completion_api_base,
            recommendation_model,
            details_model,
            url_model,
            insights_model,
            chat_session_idle,
        })
    }

    pub fn advisor_models(&self) -> AdvisorModels {
        AdvisorModels {
            recommendation: self.recommendation_model.clone(),
            details: self.details_model.clone(),
            url: self.url_model.clone(),
            insights: self.insights_model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref var) if var == "GEMINI_API_KEY"));

        let err = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.completion_api_base, DEFAULT_COMPLETION_API_BASE);
        assert_eq!(config.advisor_models().url, "gemini-1.5-pro");
        assert_eq!(config.chat_session_idle, Duration::from_secs(1800));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("BIND_ADDRESS", "not an address"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "BIND_ADDRESS"));

        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("RUST_LOG", "chatty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "RUST_LOG"));

        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("CHAT_SESSION_IDLE_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue(ref var, _) if var == "CHAT_SESSION_IDLE_SECS")
        );
    }
}
