//! # GlitchBeat Common Library
//!
//! Shared code for the GlitchBeat microservices:
//! - Error types
//! - Wire types (section kinds, error types, trigger payloads)
//! - Configuration loading (CLI → ENV → TOML → default)
//! - Tracing setup and graceful shutdown
//! - OpenAI-compatible chat completion client

pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod server;
pub mod types;

pub use error::{Error, Result};
pub use types::{ErrorType, SectionKind, TriggerAck, TriggerPayload};
