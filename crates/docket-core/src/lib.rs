//! Configuration for the docket legal assistant.

pub mod config;

pub use config::{AgentConfig, Config, LlmConfig, OllamaConfig};
