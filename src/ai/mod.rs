//! AI service integration for strategy and thumbnail generation
//!
//! Provides interfaces to Gemini's `generateContent` API for writing Shorts
//! strategies and rendering thumbnail concepts as images.

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiStrategyClient, GeminiThumbnailClient};
pub use mock::{MockStrategyClient, MockThumbnailClient};

use crate::models::{Strategy, ThumbnailConcept, ThumbnailImage};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait StrategyService: Send + Sync {
    async fn generate_strategies(&self, topic: &str) -> Result<Vec<Strategy>>;
}

#[async_trait]
pub trait ThumbnailService: Send + Sync {
    async fn generate_thumbnail(
        &self,
        concept: &ThumbnailConcept,
        topic: &str,
    ) -> Result<ThumbnailImage>;
}
