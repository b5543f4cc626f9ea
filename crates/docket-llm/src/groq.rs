use std::fmt;

use crate::error::LlmError;
use crate::openai::OpenAiProvider;
use crate::provider::{LlmProvider, Message};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Groq backend: OpenAI-compatible wire format at Groq's endpoint
/// (free-tier chain member).
pub struct GroqProvider {
    inner: OpenAiProvider,
}

impl fmt::Debug for GroqProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqProvider")
            .field("inner", &self.inner)
            .finish()
    }
}

impl Clone for GroqProvider {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl GroqProvider {
    #[must_use]
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Self {
        let inner = OpenAiProvider::new(api_key, model, max_tokens)
            .with_base_url(DEFAULT_BASE_URL.into())
            .with_wire_name("groq");
        Self { inner }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.inner = self.inner.with_base_url(base_url);
        self
    }
}

impl LlmProvider for GroqProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.inner.chat(messages).await
    }

    fn name(&self) -> &str {
        "groq"
    }
}
