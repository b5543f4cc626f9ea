//! AI provider backends and the ordered-fallback response orchestrator.
//!
//! One orchestration call tries configured providers in priority order and
//! returns the first success; a deterministic demo responder terminates the
//! chain so auto mode can always produce a reply.

pub mod any;
pub mod claude;
pub mod demo;
pub mod error;
pub mod gemini;
pub mod groq;
mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod orchestrator;
pub mod provider;

pub use error::LlmError;
pub use orchestrator::Orchestrator;
pub use provider::{LlmProvider, Message, ProviderId, ProviderResult, Role};
