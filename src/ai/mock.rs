use super::{StrategyService, ThumbnailService};
use crate::models::{Script, Seo, Strategy, ThumbnailConcept, ThumbnailImage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// 1x1 PNG returned when no image response is queued.
const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAIAAACQd1PeAAAADElEQVR4nGP4z8AAAAMBAQDJ/pLvAAAAAElFTkSuQmCC";

/// A fully populated strategy for tests and demos.
pub fn sample_strategy(id: i64) -> Strategy {
    Strategy {
        id,
        problem: format!("Problem {}: money runs out before the month ends", id),
        hook: "Where did your salary go?".to_string(),
        script: Script {
            voiceover: format!("Voiceover for short {}.", id),
            scenes: format!("Scene directions for short {}.", id),
        },
        seo: Seo {
            title: format!("Short {} title", id),
            keywords: vec!["budgeting for beginners".to_string()],
            tags: vec!["#money".to_string(), "finance".to_string()],
            description: format!("Description for short {}.", id),
        },
        thumbnail: ThumbnailConcept {
            text: "BROKE AGAIN?".to_string(),
            image_idea: format!("Visual idea {}", id),
            emotion: "shock".to_string(),
        },
    }
}

/// Strategies with ids `1..=count`.
pub fn sample_strategies(count: usize) -> Vec<Strategy> {
    (1..=count as i64).map(sample_strategy).collect()
}

#[derive(Clone)]
pub struct MockStrategyClient {
    responses: Arc<Mutex<VecDeque<Result<Vec<Strategy>>>>>,
    topics: Arc<Mutex<Vec<String>>>,
}

impl MockStrategyClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            topics: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_strategies(self, strategies: Vec<Strategy>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(strategies));
        self
    }

    pub fn with_failure(self, error: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.topics.lock().unwrap().len()
    }

    /// Topics received, in call order.
    pub fn topics(&self) -> Vec<String> {
        self.topics.lock().unwrap().clone()
    }
}

impl Default for MockStrategyClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StrategyService for MockStrategyClient {
    async fn generate_strategies(&self, topic: &str) -> Result<Vec<Strategy>> {
        self.topics.lock().unwrap().push(topic.to_string());

        let queued = self.responses.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(sample_strategies(5)))
    }
}

#[derive(Clone)]
pub struct MockThumbnailClient {
    responses: Arc<Mutex<VecDeque<Result<ThumbnailImage>>>>,
    calls: Arc<Mutex<Vec<(ThumbnailConcept, String)>>>,
}

impl MockThumbnailClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_image(self, image: ThumbnailImage) -> Self {
        self.responses.lock().unwrap().push_back(Ok(image));
        self
    }

    /// Queues the "no inline data" failure.
    pub fn with_missing_image(self) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::ImageGeneration(
                "Failed to generate image".to_string(),
            )));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Concepts and topics received, in call order.
    pub fn calls(&self) -> Vec<(ThumbnailConcept, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockThumbnailClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThumbnailService for MockThumbnailClient {
    async fn generate_thumbnail(
        &self,
        concept: &ThumbnailConcept,
        topic: &str,
    ) -> Result<ThumbnailImage> {
        self.calls
            .lock()
            .unwrap()
            .push((concept.clone(), topic.to_string()));

        let queued = self.responses.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(ThumbnailImage::from_base64_png(TINY_PNG_BASE64)))
    }
}
