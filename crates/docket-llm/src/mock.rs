//! Test-only mock provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, ProviderId};

/// Scripted provider that impersonates a real backend id, counts calls,
/// and records the messages it was handed.
#[derive(Debug, Clone)]
pub struct MockProvider {
    pub id: ProviderId,
    responses: Arc<Mutex<Vec<String>>>,
    pub default_response: String,
    pub fail_chat: bool,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Message>>>,
}

impl MockProvider {
    #[must_use]
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            responses: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            fail_chat: false,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_responses(id: ProviderId, responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::new(id)
        }
    }

    #[must_use]
    pub fn failing(id: ProviderId) -> Self {
        Self {
            fail_chat: true,
            ..Self::new(id)
        }
    }

    /// Number of chat calls received, across clones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages from the most recent chat call.
    #[must_use]
    pub fn last_messages(&self) -> Vec<Message> {
        self.seen.lock().unwrap().clone()
    }
}

impl LlmProvider for MockProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().unwrap() = messages.to_vec();
        if self.fail_chat {
            return Err(LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    fn name(&self) -> &str {
        self.id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use crate::provider::Role;

    use super::*;

    #[tokio::test]
    async fn scripted_responses_pop_in_order() {
        let p = MockProvider::with_responses(ProviderId::Gemini, vec!["a".into(), "b".into()]);
        let msgs = vec![Message::new(Role::User, "x")];
        assert_eq!(p.chat(&msgs).await.unwrap(), "a");
        assert_eq!(p.chat(&msgs).await.unwrap(), "b");
        assert_eq!(p.chat(&msgs).await.unwrap(), "mock response");
        assert_eq!(p.calls(), 3);
    }

    #[tokio::test]
    async fn failing_mock_errors_but_still_counts() {
        let p = MockProvider::failing(ProviderId::Groq);
        let msgs = vec![Message::new(Role::User, "x")];
        assert!(p.chat(&msgs).await.is_err());
        assert_eq!(p.calls(), 1);
    }

    #[tokio::test]
    async fn call_count_is_shared_across_clones() {
        let p = MockProvider::new(ProviderId::Claude);
        let clone = p.clone();
        let msgs = vec![Message::new(Role::User, "x")];
        clone.chat(&msgs).await.unwrap();
        assert_eq!(p.calls(), 1);
    }

    #[tokio::test]
    async fn records_received_messages() {
        let p = MockProvider::new(ProviderId::Gemini);
        let msgs = vec![
            Message::new(Role::System, "persona"),
            Message::new(Role::User, "question"),
        ];
        p.chat(&msgs).await.unwrap();
        assert_eq!(p.last_messages(), msgs);
    }
}
