use thiserror::Error;

/// Message shown for every failed provider round trip.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate wallpapers. The prompt may have been blocked or an API error occurred.";

/// Message shown when a blank prompt is submitted.
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt to generate wallpapers.";

#[derive(Debug, Error)]
pub enum WallpaperError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    ValidationError(String),

    /// Normalized provider failure. The message is shown to the user verbatim.
    #[error("{0}")]
    GenerationError(String),

    /// Raw transport or payload failure below the generation client.
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Download error: {0}")]
    DownloadError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WallpaperError {
    pub fn generation_failed() -> Self {
        WallpaperError::GenerationError(GENERATION_FAILED_MESSAGE.to_string())
    }

    pub fn empty_prompt() -> Self {
        WallpaperError::ValidationError(EMPTY_PROMPT_MESSAGE.to_string())
    }
}

impl From<reqwest::Error> for WallpaperError {
    fn from(err: reqwest::Error) -> Self {
        WallpaperError::ProviderError(err.to_string())
    }
}

impl From<base64::DecodeError> for WallpaperError {
    fn from(err: base64::DecodeError) -> Self {
        WallpaperError::DownloadError(format!("invalid image payload: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, WallpaperError>;
