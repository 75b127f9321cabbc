use crate::{
    error::Result,
    models::{AspectRatio, GeneratedImage, GenerationRequest, ProviderImage},
};
use async_trait::async_trait;

/// One outbound call to an image-generation backend.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate_images(&self, request: GenerationRequest) -> Result<Vec<ProviderImage>>;
}

/// What the session needs: a prompt and ratio in, wallpapers or one error out.
#[async_trait]
pub trait WallpaperGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<GeneratedImage>>;
}
