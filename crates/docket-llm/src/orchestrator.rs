use docket_core::LlmConfig;

use crate::any::AnyProvider;
use crate::claude::ClaudeProvider;
use crate::demo::DemoProvider;
use crate::error::LlmError;
use crate::gemini::GeminiProvider;
use crate::groq::GroqProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;
use crate::provider::{LlmProvider, Message, ProviderId, ProviderResult, Role, estimate_tokens};

/// Instruction prefix for the synthetic user message built by [`Orchestrator::analyze`].
pub const ANALYZE_INSTRUCTION: &str =
    "Analyze the following documents and provide a structured legal review:";

/// Resolves one assistant reply per call by trying providers in a fixed
/// order and returning the first success.
///
/// The chain is built once, up front, from configuration; a provider whose
/// credential is absent is never in the chain, so "skipped" and "failed"
/// stay distinct. Calls are strictly sequential: an early success must
/// short-circuit the remaining candidates so a free-tier hit never triggers
/// a paid call.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    chain: Vec<AnyProvider>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(chain: Vec<AnyProvider>) -> Self {
        Self { chain }
    }

    /// Build the fallback chain from configuration.
    ///
    /// Providers appear in the configured order (default: free tiers, paid,
    /// local, demo), skipping any whose credential is unavailable. The demo
    /// responder is always appended when absent so auto mode cannot exhaust
    /// the chain.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::UnknownProvider`] when the order override names
    /// a provider that does not exist.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let order: Vec<ProviderId> = match &config.order {
            Some(names) => names
                .iter()
                .map(|name| name.parse())
                .collect::<Result<_, _>>()?,
            None => ProviderId::ALL.to_vec(),
        };

        let mut chain: Vec<AnyProvider> = order
            .into_iter()
            .filter_map(|id| build_provider(id, config))
            .collect();

        if !chain.iter().any(|p| p.id() == ProviderId::Demo) {
            chain.push(AnyProvider::Demo(DemoProvider::new()));
        }

        Ok(Self::new(chain))
    }

    /// Chain members in attempt order.
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderId> {
        self.chain.iter().map(AnyProvider::id).collect()
    }

    /// Resolve one assistant reply for the conversation.
    ///
    /// The input slice is never mutated; the system prompt is prepended to
    /// a copy handed to providers. With `explicit` set, only that provider
    /// is tried and its failure surfaces verbatim (no fallback). In auto
    /// mode the demo responder terminates the chain, so the call cannot
    /// fail.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::CredentialMissing`] when `explicit` names a
    /// provider absent from the chain, or that provider's own error when
    /// it fails.
    pub async fn respond(
        &self,
        messages: &[Message],
        system_prompt: &str,
        explicit: Option<ProviderId>,
    ) -> Result<ProviderResult, LlmError> {
        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(Message::new(Role::System, system_prompt));
        conversation.extend_from_slice(messages);
        self.dispatch(&conversation, explicit).await
    }

    /// Reply to a document-review request.
    ///
    /// Concatenates the documents into one synthetic user message carrying
    /// [`ANALYZE_INSTRUCTION`] and numbered document sections, then follows
    /// the identical fallback algorithm. Whole-document concatenation, no
    /// chunking; each provider enforces its own input limits.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Orchestrator::respond`].
    pub async fn analyze(
        &self,
        documents: &[String],
        system_prompt: &str,
        explicit: Option<ProviderId>,
    ) -> Result<ProviderResult, LlmError> {
        let mut content = String::from(ANALYZE_INSTRUCTION);
        for (i, doc) in documents.iter().enumerate() {
            content.push_str(&format!("\n\n--- Document {} ---\n{doc}", i + 1));
        }
        let request = [Message::new(Role::User, content)];
        self.respond(&request, system_prompt, explicit).await
    }

    async fn dispatch(
        &self,
        conversation: &[Message],
        explicit: Option<ProviderId>,
    ) -> Result<ProviderResult, LlmError> {
        if let Some(id) = explicit {
            let provider = self
                .chain
                .iter()
                .find(|p| p.id() == id)
                .ok_or(LlmError::CredentialMissing { provider: id })?;
            let text = provider.chat(conversation).await?;
            return Ok(finish(text, id));
        }

        let mut last_error = None;
        for provider in &self.chain {
            match provider.chat(conversation).await {
                Ok(text) => {
                    tracing::debug!(provider = provider.name(), "provider succeeded");
                    return Ok(finish(text, provider.id()));
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "provider failed, trying next candidate");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or(LlmError::NoProviders))
    }
}

fn finish(text: String, id: ProviderId) -> ProviderResult {
    let estimated_tokens = estimate_tokens(&text);
    ProviderResult {
        text,
        provider: id,
        estimated_tokens,
        billed: id.is_billed(),
    }
}

fn build_provider(id: ProviderId, config: &LlmConfig) -> Option<AnyProvider> {
    match id {
        ProviderId::Gemini => config.gemini_key().map(|key| {
            AnyProvider::Gemini(GeminiProvider::new(
                key.to_owned(),
                config.gemini_model.clone(),
            ))
        }),
        ProviderId::Groq => config.groq_key().map(|key| {
            AnyProvider::Groq(GroqProvider::new(
                key.to_owned(),
                config.groq_model.clone(),
                config.max_tokens,
            ))
        }),
        ProviderId::OpenAi => config.openai_key().map(|key| {
            AnyProvider::OpenAi(OpenAiProvider::new(
                key.to_owned(),
                config.openai_model.clone(),
                config.max_tokens,
            ))
        }),
        ProviderId::Claude => config.anthropic_key().map(|key| {
            AnyProvider::Claude(ClaudeProvider::new(
                key.to_owned(),
                config.claude_model.clone(),
                config.max_tokens,
            ))
        }),
        ProviderId::Ollama => config.ollama.enabled.then(|| {
            AnyProvider::Ollama(OllamaProvider::new(
                &config.ollama.base_url,
                config.ollama.model.clone(),
            ))
        }),
        ProviderId::Demo => Some(AnyProvider::Demo(DemoProvider::new())),
    }
}
