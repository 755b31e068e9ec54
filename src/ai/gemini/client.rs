use crate::models::DEFAULT_GEMINI_BASE_URL;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Lightweight Gemini REST client shared by the strategy and thumbnail clients.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-2.5-flash-image`);
    /// a `models/...` prefix is stripped.
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: Client) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Per-request timeout; without one the request waits for the transport.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Calls Gemini's `generateContent` endpoint.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::debug!("Sending generateContent request to {}", url);

        let mut builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to Gemini: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse Gemini response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::ai::gemini::types::GenerateContentResponse;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_strips_models_prefix() {
        let client = GeminiHttpClient::new("key".to_string(), "models/gemini-x".to_string());
        assert_eq!(client.model(), "gemini-x");
    }

    #[tokio::test]
    async fn test_posts_to_model_endpoint_with_api_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-x:generateContent"))
            .and(wiremock::matchers::header("x-goog-api-key", "secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(test_support::text_response("hi")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiHttpClient::new("secret".to_string(), "gemini-x".to_string())
            .with_base_url(format!("{}/", server.uri()));

        let response: GenerateContentResponse = client
            .generate_content(&serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(response.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let client = GeminiHttpClient::new(String::new(), "gemini-x".to_string())
            .with_base_url(server.uri());

        let err = client
            .generate_content::<_, GenerateContentResponse>(&serde_json::json!({}))
            .await
            .unwrap_err();
        match err {
            Error::AiProvider(message) => {
                assert!(message.contains("403"));
                assert!(message.contains("API key not valid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_envelope_is_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client =
            GeminiHttpClient::new("key".to_string(), "gemini-x".to_string()).with_base_url(server.uri());

        let err = client
            .generate_content::<_, GenerateContentResponse>(&serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_timeout_applies_when_configured() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::text_response("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = GeminiHttpClient::new("key".to_string(), "gemini-x".to_string())
            .with_base_url(server.uri())
            .with_timeout(Some(Duration::from_millis(50)));

        let err = client
            .generate_content::<_, GenerateContentResponse>(&serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
