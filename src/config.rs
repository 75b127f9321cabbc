use crate::error::{Result, WallpaperError};
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL_ID: &str = "imagen-4.0-generate-001";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct WallpaperConfig {
    pub api_key: Option<String>,
    pub model_id: String,
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

impl Default for WallpaperConfig {
    fn default() -> Self {
        WallpaperConfig {
            api_key: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl WallpaperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("API_KEY").ok().filter(|key| !key.trim().is_empty());
        let model_id = env::var("WALLPAPER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());
        let base_url =
            env::var("WALLPAPER_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("WALLPAPER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());

        WallpaperConfig {
            api_key,
            model_id,
            base_url,
            timeout_secs,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// The API key, or a configuration error when none was supplied.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| WallpaperError::ConfigError("API_KEY environment variable not set".into()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Full `:predict` endpoint for the configured model.
    pub fn predict_url(&self) -> String {
        format!(
            "{}/models/{}:predict",
            self.base_url.trim_end_matches('/'),
            self.model_id
        )
    }
}
