use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::StrategyService;
use crate::models::Strategy;
use crate::schema::{self, Schema};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;

/// Number of strategies the prompt asks for.
pub const REQUESTED_STRATEGIES: usize = 5;

#[derive(Debug, Serialize)]
struct StrategyRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: StrategyGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StrategyGenerationConfig {
    response_mime_type: String,
    response_schema: Schema,
}

pub struct GeminiStrategyClient {
    http: GeminiHttpClient,
    schema: Schema,
}

impl GeminiStrategyClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::from_http(GeminiHttpClient::new(api_key, model))
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self::from_http(GeminiHttpClient::new_with_client(api_key, model, client))
    }

    pub fn from_http(http: GeminiHttpClient) -> Self {
        Self {
            http,
            schema: schema::strategies(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    /// Parses the model's text body into strategies, checking it against the
    /// declared schema first.
    pub fn parse_strategies(&self, body: &str) -> Result<Vec<Strategy>> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| Error::Parse(format!("response is not valid JSON: {}", e)))?;

        self.schema.validate(&value).map_err(Error::Parse)?;

        let strategies: Vec<Strategy> =
            serde_json::from_value(value).map_err(|e| Error::Parse(e.to_string()))?;

        let mut seen = HashSet::new();
        if let Some(repeated) = strategies.iter().find(|s| !seen.insert(s.id)) {
            tracing::warn!("Gemini repeated strategy id {}", repeated.id);
        }

        if strategies.len() != REQUESTED_STRATEGIES {
            tracing::warn!(
                "Expected {} strategies, Gemini returned {}",
                REQUESTED_STRATEGIES,
                strategies.len()
            );
        }

        Ok(strategies)
    }
}

#[async_trait]
impl StrategyService for GeminiStrategyClient {
    async fn generate_strategies(&self, topic: &str) -> Result<Vec<Strategy>> {
        let request = StrategyRequest {
            contents: vec![Content::user_text(prompts::render(
                prompts::STRATEGY,
                &[("topic", topic)],
            ))],
            generation_config: StrategyGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: self.schema.clone(),
            },
        };

        tracing::debug!(
            "Requesting strategies for '{}' from {}",
            topic,
            self.http.model()
        );
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let body = response.text().ok_or_else(|| {
            tracing::error!(
                "Gemini returned no text (finish reason: {})",
                response.finish_reason().unwrap_or("unknown")
            );
            Error::Generation("No response from Gemini".to_string())
        })?;

        self.parse_strategies(&body).map_err(|e| {
            tracing::error!("Failed to parse strategies: {}", e);
            e
        })
    }
}
