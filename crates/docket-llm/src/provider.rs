use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Identifier of one backend in the fallback chain.
///
/// The declaration order is the default auto-mode priority: free tiers
/// first, paid credentials next, the local model, then the demo backstop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gemini,
    Groq,
    OpenAi,
    Claude,
    Ollama,
    Demo,
}

impl ProviderId {
    pub const ALL: [Self; 6] = [
        Self::Gemini,
        Self::Groq,
        Self::OpenAi,
        Self::Claude,
        Self::Ollama,
        Self::Demo,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Groq => "groq",
            Self::OpenAi => "openai",
            Self::Claude => "claude",
            Self::Ollama => "ollama",
            Self::Demo => "demo",
        }
    }

    /// Whether a success from this provider consumes a paid credential.
    /// Advisory only; real billing happens at the vendor.
    #[must_use]
    pub fn is_billed(self) -> bool {
        matches!(self, Self::OpenAi | Self::Claude)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            "claude" | "anthropic" => Ok(Self::Claude),
            "ollama" | "local" => Ok(Self::Ollama),
            "demo" => Ok(Self::Demo),
            other => Err(LlmError::UnknownProvider(other.into())),
        }
    }
}

/// One assistant reply, tagged with the provider that produced it.
/// Created fresh per orchestration call and never cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub text: String,
    pub provider: ProviderId,
    pub estimated_tokens: u32,
    pub billed: bool,
}

const CHARS_PER_TOKEN: usize = 4;

/// Rough advisory token estimate: `max(1, ceil(chars / 4))`.
///
/// Monotonically non-decreasing in input length. Never used for hard
/// limits; vendors account for real usage server-side.
#[must_use]
pub fn estimate_tokens(text: &str) -> u32 {
    let estimate = text.chars().count().div_ceil(CHARS_PER_TOKEN).max(1);
    u32::try_from(estimate).unwrap_or(u32::MAX)
}

pub trait LlmProvider: Send + Sync {
    /// Send the conversation to the backend and return the assistant reply.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx vendor response,
    /// or a malformed/empty payload.
    fn chat(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    fn name(&self) -> &str;
}
