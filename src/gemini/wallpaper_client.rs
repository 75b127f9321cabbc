use crate::{
    error::{Result, WallpaperError},
    gemini::{ImageProvider, WallpaperGenerator},
    logger,
    models::{AspectRatio, GeneratedImage, GenerationRequest, PNG_MIME_TYPE},
};
use async_trait::async_trait;

pub const PROMPT_SUFFIX: &str = "phone wallpaper, high detail, 8k";
pub const IMAGES_PER_REQUEST: u32 = 4;

/// Turns a user prompt into one provider call and maps the result to wallpapers.
///
/// No retries and no partial results: the caller gets every image the
/// provider returned, or a single [`WallpaperError::GenerationError`].
#[derive(Clone)]
pub struct WallpaperClient<P> {
    provider: P,
}

impl<P: ImageProvider> WallpaperClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn build_request(prompt: &str, aspect_ratio: AspectRatio) -> GenerationRequest {
        GenerationRequest {
            prompt: format!("{}, {}", prompt, PROMPT_SUFFIX),
            aspect_ratio,
            num_images: IMAGES_PER_REQUEST,
            mime_type: PNG_MIME_TYPE.to_string(),
        }
    }

    async fn call_provider(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<GeneratedImage>> {
        let _timer = logger::timer("wallpaper generation");
        let images = self
            .provider
            .generate_images(Self::build_request(prompt, aspect_ratio))
            .await?;

        if images.is_empty() {
            return Err(WallpaperError::ProviderError(
                "API did not return any images.".into(),
            ));
        }

        Ok(images.into_iter().map(GeneratedImage::from).collect())
    }
}

#[async_trait]
impl<P: ImageProvider> WallpaperGenerator for WallpaperClient<P> {
    async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<GeneratedImage>> {
        match self.call_provider(prompt, aspect_ratio).await {
            Ok(images) => {
                log::info!("Generated {} wallpaper(s)", images.len());
                Ok(images)
            }
            Err(e) => {
                log::error!("Error generating images: {}", e);
                Err(WallpaperError::generation_failed())
            }
        }
    }
}
