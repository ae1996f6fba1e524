//! Review client for the Kestrel assistant.
//!
//! Provides the chat completion transport, the three fixed prompt
//! templates, and the [`client::ReviewClient`] operations (quality
//! review, security check, test generation).

pub mod client;
pub mod llm;
pub mod prompt;
