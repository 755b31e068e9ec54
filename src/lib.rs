//! Shorts Strategist - turns a topic into five YouTube Shorts strategies
//!
//! A Gemini text model writes the strategies (problem, cinematic script, SEO
//! metadata, thumbnail concept) and a Gemini image model renders thumbnails
//! on demand. The terminal front end keeps the per-session view state.

pub mod ai;
pub mod app;
pub mod command;
pub mod error;
pub mod models;
pub mod prompts;
pub mod schema;
pub mod view;

pub use error::{Error, Result};
