//! Core types, configuration, and error handling for the Kestrel assistant.
//!
//! This crate provides the shared foundation used by the other Kestrel
//! crates:
//! - [`KestrelError`] — unified error type using `thiserror`
//! - [`KestrelConfig`] — configuration loaded from `.kestrel.toml`
//! - Shared types: [`Language`], [`AnalysisKind`], [`ReviewRequest`],
//!   [`ReviewResult`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{KestrelConfig, LlmConfig, API_KEY_ENV};
pub use error::KestrelError;
pub use types::{
    AnalysisKind, Language, OutputFormat, ReviewRequest, ReviewResult, MAX_CODE_CHARS,
};

/// A convenience `Result` type for Kestrel operations.
pub type Result<T> = std::result::Result<T, KestrelError>;
