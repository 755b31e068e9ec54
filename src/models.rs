//! Data models and structures
//!
//! Defines the generated strategy records, the thumbnail image reference and
//! the environment-driven configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One generated Shorts content idea.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Strategy {
    pub id: i64,
    pub problem: String,
    pub hook: String,
    pub script: Script,
    pub seo: Seo,
    pub thumbnail: ThumbnailConcept,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Script {
    pub voiceover: String,
    pub scenes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seo {
    pub title: String,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailConcept {
    /// Overlay text, 3-5 words.
    pub text: String,
    pub image_idea: String,
    pub emotion: String,
}

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A rendered thumbnail, held as a self-contained `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailImage {
    uri: String,
}

impl ThumbnailImage {
    /// Wraps a base64 payload as it arrived from the provider.
    pub fn from_base64_png(data: &str) -> Self {
        Self {
            uri: format!("{}{}", PNG_DATA_URI_PREFIX, data),
        }
    }

    pub fn as_uri(&self) -> &str {
        &self.uri
    }

    /// Decodes the embedded payload back into image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let payload = self
            .uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, data)| data)
            .ok_or_else(|| Error::InvalidImage("not a base64 data URI".to_string()))?;

        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::InvalidImage(format!("Failed to decode base64 image: {}", e)))
    }
}

// Configuration
pub const DEFAULT_STRATEGY_MODEL: &str = "gemini-3.1-pro-preview";
pub const DEFAULT_THUMBNAIL_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub strategy_model: String,
    pub thumbnail_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // The provider rejects a missing key; nothing to gain by failing here.
        let gemini_api_key = var("GEMINI_API_KEY").unwrap_or_else(|| {
            tracing::warn!("GEMINI_API_KEY is not set; generation requests will be rejected");
            String::new()
        });

        let request_timeout = match var("GEMINI_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!("GEMINI_TIMEOUT_SECS must be an integer, got '{}'", raw))
                })?;
                if secs == 0 {
                    return Err(Error::Config(
                        "GEMINI_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            gemini_api_key,
            strategy_model: var("STRATEGY_MODEL")
                .unwrap_or_else(|| DEFAULT_STRATEGY_MODEL.to_string()),
            thumbnail_model: var("THUMBNAIL_MODEL")
                .unwrap_or_else(|| DEFAULT_THUMBNAIL_MODEL.to_string()),
            gemini_base_url: var("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            request_timeout,
        })
    }
}
