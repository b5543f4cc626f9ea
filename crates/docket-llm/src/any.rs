use crate::claude::ClaudeProvider;
use crate::demo::DemoProvider;
use crate::error::LlmError;
use crate::gemini::GeminiProvider;
use crate::groq::GroqProvider;
#[cfg(any(test, feature = "mock"))]
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;
use crate::provider::{LlmProvider, Message, ProviderId};

/// Generates a match over all `AnyProvider` variants, binding the inner
/// provider and evaluating the given closure for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Gemini($p) => $expr,
            AnyProvider::Groq($p) => $expr,
            AnyProvider::OpenAi($p) => $expr,
            AnyProvider::Claude($p) => $expr,
            AnyProvider::Ollama($p) => $expr,
            AnyProvider::Demo($p) => $expr,
            #[cfg(any(test, feature = "mock"))]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

/// Tagged union of every backend the fallback chain can hold.
#[derive(Debug, Clone)]
pub enum AnyProvider {
    Gemini(GeminiProvider),
    Groq(GroqProvider),
    OpenAi(OpenAiProvider),
    Claude(ClaudeProvider),
    Ollama(OllamaProvider),
    Demo(DemoProvider),
    #[cfg(any(test, feature = "mock"))]
    Mock(MockProvider),
}

impl AnyProvider {
    /// The chain position tag; mocks report the id they impersonate.
    #[must_use]
    pub fn id(&self) -> ProviderId {
        match self {
            Self::Gemini(_) => ProviderId::Gemini,
            Self::Groq(_) => ProviderId::Groq,
            Self::OpenAi(_) => ProviderId::OpenAi,
            Self::Claude(_) => ProviderId::Claude,
            Self::Ollama(_) => ProviderId::Ollama,
            Self::Demo(_) => ProviderId::Demo,
            #[cfg(any(test, feature = "mock"))]
            Self::Mock(p) => p.id,
        }
    }
}

impl LlmProvider for AnyProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        delegate_provider!(self, |p| p.chat(messages).await)
    }

    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }
}
