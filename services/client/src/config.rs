//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use docchat_core::Viewport;
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

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub log_level: Level,
    pub tour_state_path: PathBuf,
    pub sample_pdf_path: Option<PathBuf>,
    pub viewport: Viewport,
    pub request_timeout: Duration,
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
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Backend ---
        let api_url = lookup("DOCCHAT_API_URL")
            .ok_or_else(|| ConfigError::MissingVar("DOCCHAT_API_URL".to_string()))?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "DOCCHAT_API_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_url),
            ));
        }
        let api_url = api_url.trim_end_matches('/').to_string();

        let timeout_str =
            lookup("DOCCHAT_REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "60".to_string());
        let request_timeout = timeout_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidValue("DOCCHAT_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        // --- Logging ---
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Local state and view ---
        let tour_state_path = lookup("DOCCHAT_TOUR_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_tour_state_path);

        let sample_pdf_path = lookup("DOCCHAT_SAMPLE_PDF").map(PathBuf::from);

        let viewport_str = lookup("DOCCHAT_VIEWPORT").unwrap_or_else(|| "1280x800".to_string());
        let viewport = parse_viewport(&viewport_str).ok_or_else(|| {
            ConfigError::InvalidValue(
                "DOCCHAT_VIEWPORT".to_string(),
                format!("'{}' is not WIDTHxHEIGHT", viewport_str),
            )
        })?;

        Ok(Self {
            api_url,
            log_level,
            tour_state_path,
            sample_pdf_path,
            viewport,
            request_timeout,
        })
    }
}

fn default_tour_state_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".docchat"))
        .unwrap_or_else(|| PathBuf::from(".docchat"))
        .join("onboarding.json")
}

/// Parses `WIDTHxHEIGHT` into a viewport with positive dimensions.
pub fn parse_viewport(value: &str) -> Option<Viewport> {
    let (w, h) = value.trim().split_once(['x', 'X'])?;
    let width = w.trim().parse::<f64>().ok()?;
    let height = h.trim().parse::<f64>().ok()?;
    (width > 0.0 && height > 0.0).then(|| Viewport::new(width, height))
}
