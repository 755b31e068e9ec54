use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::ThumbnailService;
use crate::models::{ThumbnailConcept, ThumbnailImage};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;

/// Vertical frame for Shorts covers.
pub const THUMBNAIL_ASPECT_RATIO: &str = "9:16";

#[derive(Debug, Serialize)]
struct ImageRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: ImageGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageGenerationConfig {
    response_modalities: Vec<String>,
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

pub struct GeminiThumbnailClient {
    http: GeminiHttpClient,
}

impl GeminiThumbnailClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::from_http(GeminiHttpClient::new(api_key, model))
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self::from_http(GeminiHttpClient::new_with_client(api_key, model, client))
    }

    pub fn from_http(http: GeminiHttpClient) -> Self {
        Self { http }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ThumbnailService for GeminiThumbnailClient {
    async fn generate_thumbnail(
        &self,
        concept: &ThumbnailConcept,
        topic: &str,
    ) -> Result<ThumbnailImage> {
        let prompt = prompts::render(
            prompts::THUMBNAIL,
            &[
                ("topic", topic),
                ("image_idea", &concept.image_idea),
                ("emotion", &concept.emotion),
            ],
        );

        let request = ImageRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: ImageGenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: ImageConfig {
                    aspect_ratio: THUMBNAIL_ASPECT_RATIO.to_string(),
                },
            },
        };

        let gemini_response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let image_data = gemini_response.inline_data().ok_or_else(|| {
            tracing::error!(
                "No image data in Gemini response (finish reason: {})",
                gemini_response.finish_reason().unwrap_or("unknown")
            );
            Error::ImageGeneration("Failed to generate image".to_string())
        })?;

        tracing::debug!(
            "Gemini returned image with mime_type: {} ({} base64 chars)",
            image_data.mime_type,
            image_data.data.len()
        );

        Ok(ThumbnailImage::from_base64_png(&image_data.data))
    }
}
