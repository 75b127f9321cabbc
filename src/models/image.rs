use crate::error::Result;
use crate::models::AspectRatio;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

pub const PNG_MIME_TYPE: &str = "image/png";

/// What the generation client asks the provider for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub num_images: u32,
    pub mime_type: String,
}

/// Raw image as handed back by a provider: a MIME tag and base64 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderImage {
    pub mime_type: String,
    pub image_bytes: String,
}

/// A generated wallpaper, kept in its self-contained encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub image_data: String, // Base64 encoded
}

impl GeneratedImage {
    pub fn new(mime_type: impl Into<String>, image_data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            image_data: image_data.into(),
        }
    }

    /// Embeddable `data:` URI for this image.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.image_data)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(self.image_data.as_bytes())?)
    }

    pub fn encoded_len(&self) -> usize {
        self.image_data.len()
    }
}

impl From<ProviderImage> for GeneratedImage {
    fn from(image: ProviderImage) -> Self {
        GeneratedImage::new(image.mime_type, image.image_bytes)
    }
}

// Imagen `:predict` wire format.

#[derive(Debug, Serialize)]
pub struct ImagenPredictRequest {
    pub instances: Vec<ImagenInstance>,
    pub parameters: ImagenParameters,
}

#[derive(Debug, Serialize)]
pub struct ImagenInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenParameters {
    pub sample_count: u32,
    pub aspect_ratio: AspectRatio,
    pub output_options: ImagenOutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenOutputOptions {
    pub mime_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImagenPredictResponse {
    #[serde(default)]
    pub predictions: Vec<ImagenPrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenPrediction {
    pub bytes_base64_encoded: Option<String>,
    pub mime_type: Option<String>,
    pub rai_filtered_reason: Option<String>,
}

impl From<&GenerationRequest> for ImagenPredictRequest {
    fn from(request: &GenerationRequest) -> Self {
        ImagenPredictRequest {
            instances: vec![ImagenInstance {
                prompt: request.prompt.clone(),
            }],
            parameters: ImagenParameters {
                sample_count: request.num_images,
                aspect_ratio: request.aspect_ratio,
                output_options: ImagenOutputOptions {
                    mime_type: request.mime_type.clone(),
                },
            },
        }
    }
}
