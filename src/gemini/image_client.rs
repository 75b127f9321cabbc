use crate::{
    config::WallpaperConfig,
    error::{Result, WallpaperError},
    gemini::ImageProvider,
    models::{GenerationRequest, ImagenPredictRequest, ImagenPredictResponse, ProviderImage},
};
use async_trait::async_trait;
use reqwest::Client;

/// Imagen over the Gemini API `:predict` endpoint.
#[derive(Clone)]
pub struct ImagenClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model_id: String,
}

impl ImagenClient {
    pub fn new(client: Client, config: &WallpaperConfig) -> Result<Self> {
        if !Self::is_supported_model(&config.model_id) {
            log::warn!(
                "Model {} is not a known Imagen model; known models: {}",
                config.model_id,
                Self::supported_models()
                    .iter()
                    .map(|(id, _)| *id)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(Self {
            client,
            endpoint: config.predict_url(),
            api_key: config.require_api_key()?.to_string(),
            model_id: config.model_id.clone(),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str)> {
        vec![
            ("imagen-4.0-generate-001", "Imagen 4"),
            ("imagen-4.0-ultra-generate-001", "Imagen 4 Ultra"),
            ("imagen-4.0-fast-generate-001", "Imagen 4 Fast"),
            ("imagen-3.0-generate-002", "Imagen 3"),
        ]
    }

    pub fn is_supported_model(model_id: &str) -> bool {
        Self::supported_models()
            .iter()
            .any(|(id, _)| *id == model_id)
    }

    fn into_images(response: ImagenPredictResponse) -> Vec<ProviderImage> {
        response
            .predictions
            .into_iter()
            .filter_map(|prediction| match prediction.bytes_base64_encoded {
                Some(bytes) => Some(ProviderImage {
                    mime_type: prediction
                        .mime_type
                        .unwrap_or_else(|| crate::models::PNG_MIME_TYPE.to_string()),
                    image_bytes: bytes,
                }),
                None => {
                    log::warn!(
                        "Skipping prediction without image bytes (filtered: {})",
                        prediction.rai_filtered_reason.as_deref().unwrap_or("unknown")
                    );
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl ImageProvider for ImagenClient {
    async fn generate_images(&self, request: GenerationRequest) -> Result<Vec<ProviderImage>> {
        let payload = ImagenPredictRequest::from(&request);

        log::info!(
            "Generating {} image(s) with model: {} at {}",
            request.num_images,
            self.model_id,
            request.aspect_ratio
        );
        log::debug!("Image generation prompt: {}", request.prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WallpaperError::ProviderError(format!(
                "Imagen returned {}: {}",
                status, body
            )));
        }

        let predict_response: ImagenPredictResponse = response.json().await?;
        Ok(Self::into_images(predict_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requires_api_key() {
        let result = ImagenClient::new(Client::new(), &WallpaperConfig::new());
        assert!(matches!(result, Err(WallpaperError::ConfigError(_))));
    }

    #[test]
    fn test_client_uses_configured_endpoint() {
        let config = WallpaperConfig::new()
            .with_api_key("key")
            .with_base_url("http://127.0.0.1:9/v1beta");
        let client = ImagenClient::new(Client::new(), &config).unwrap();
        assert_eq!(client.model_id(), "imagen-4.0-generate-001");
        assert_eq!(
            client.endpoint,
            "http://127.0.0.1:9/v1beta/models/imagen-4.0-generate-001:predict"
        );
    }

    #[test]
    fn test_known_models() {
        assert!(ImagenClient::is_supported_model(crate::config::DEFAULT_MODEL_ID));
        assert!(ImagenClient::is_supported_model("imagen-3.0-generate-002"));
        assert!(!ImagenClient::is_supported_model("dall-e-3"));

        let config = WallpaperConfig::new().with_api_key("key").with_model("dall-e-3");
        let client = ImagenClient::new(Client::new(), &config).unwrap();
        assert_eq!(client.model_id(), "dall-e-3");
    }

    #[test]
    fn test_filtered_predictions_are_dropped_in_order() {
        let response: ImagenPredictResponse = serde_json::from_value(json!({
            "predictions": [
                { "bytesBase64Encoded": "Zmlyc3Q=", "mimeType": "image/png" },
                { "raiFilteredReason": "unsafe" },
                { "bytesBase64Encoded": "c2Vjb25k" }
            ]
        }))
        .unwrap();

        let images = ImagenClient::into_images(response);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].image_bytes, "Zmlyc3Q=");
        assert_eq!(images[1].image_bytes, "c2Vjb25k");
        assert_eq!(images[1].mime_type, "image/png");
    }
}
