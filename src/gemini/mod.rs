pub mod image_client;
pub mod traits;
pub mod wallpaper_client;

use crate::{
    config::WallpaperConfig,
    error::{Result, WallpaperError},
};
use reqwest::Client;

pub use image_client::ImagenClient;
pub use traits::{ImageProvider, WallpaperGenerator};
pub use wallpaper_client::{WallpaperClient, IMAGES_PER_REQUEST, PROMPT_SUFFIX};

#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImagenClient,
    wallpaper_client: WallpaperClient<ImagenClient>,
}

impl GeminiClient {
    pub fn new(config: WallpaperConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            log::debug!("Provider request timeout: {:?}", timeout);
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| WallpaperError::ConfigError(format!("HTTP client: {}", e)))?;

        let image_client = ImagenClient::new(http, &config)?;

        Ok(Self {
            wallpaper_client: WallpaperClient::new(image_client.clone()),
            image_client,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(WallpaperConfig::from_env())
    }

    pub fn image(&self) -> &ImagenClient {
        &self.image_client
    }

    pub fn wallpapers(&self) -> &WallpaperClient<ImagenClient> {
        &self.wallpaper_client
    }

    pub fn into_wallpapers(self) -> WallpaperClient<ImagenClient> {
        self.wallpaper_client
    }
}
