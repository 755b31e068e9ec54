//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    /// The text model answered without a usable body.
    #[error("{0}")]
    Generation(String),

    /// The body did not match the declared output schema.
    #[error("Invalid strategy response: {0}")]
    Parse(String),

    /// The image model answered without inline image data.
    #[error("{0}")]
    ImageGeneration(String),

    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
