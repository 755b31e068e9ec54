//! Session view state and its text rendering
//!
//! The session is a pure state machine: the shell feeds it [`Message`]s and
//! runs whatever [`Effect`] comes back. Remote calls never happen here.

pub mod render;
pub mod session;

pub use render::render;
pub use session::{Card, CardId, Effect, ImageState, Message, Session};
