//! Configuration module for Kokoro Studio.
//!
//! Provides CLI argument parsing, model paths and the voice catalog.

#[allow(clippy::module_inception)]
mod config;
pub mod voices;

pub use config::{AppConfig, MODEL_NAME};
pub use voices::{LanguageProfile, Voice};
