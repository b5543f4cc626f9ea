//! Deterministic offline responder terminating the fallback chain.

use crate::error::LlmError;
use crate::orchestrator::ANALYZE_INSTRUCTION;
use crate::provider::{LlmProvider, Message, Role};

const FRAGMENT_CHARS: usize = 160;

/// Zero-I/O templated responder. Must never fail: it is the availability
/// backstop that lets auto mode guarantee a reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoProvider;

impl DemoProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn render(last_user: Option<&str>) -> String {
        match last_user {
            Some(content) if content.starts_with(ANALYZE_INSTRUCTION) => {
                let body = &content[ANALYZE_INSTRUCTION.len()..];
                let documents = body.matches("--- Document").count().max(1);
                format!(
                    "[demo mode] Received {documents} document(s) totalling {} characters \
                     for review. No AI provider is configured, so no substantive analysis \
                     was performed. Configure a provider credential to get a full review, \
                     and consult a qualified attorney before acting on any document.",
                    body.chars().count()
                )
            }
            Some(content) => {
                let fragment: String = content.chars().take(FRAGMENT_CHARS).collect();
                format!(
                    "[demo mode] You said: \"{fragment}\". No AI provider is configured, \
                     so this is a canned reply. Add a provider credential for real \
                     answers, and consult a qualified attorney for advice on your \
                     specific situation."
                )
            }
            None => "[demo mode] How can I help with your legal question today?".into(),
        }
    }
}

impl LlmProvider for DemoProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str());
        Ok(Self::render(last_user))
    }

    fn name(&self) -> &str {
        "demo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_fragment_of_last_user_message() {
        let msgs = vec![Message::new(Role::User, "Bonjour")];
        let reply = DemoProvider::new().chat(&msgs).await.unwrap();
        assert!(reply.contains("Bonjour"));
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn picks_newest_user_turn() {
        let msgs = vec![
            Message::new(Role::User, "first question"),
            Message::new(Role::Assistant, "an answer"),
            Message::new(Role::User, "second question"),
        ];
        let reply = DemoProvider::new().chat(&msgs).await.unwrap();
        assert!(reply.contains("second question"));
        assert!(!reply.contains("first question"));
    }

    #[tokio::test]
    async fn replies_even_without_user_turns() {
        let msgs = vec![Message::new(Role::System, "persona")];
        let reply = DemoProvider::new().chat(&msgs).await.unwrap();
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn is_deterministic() {
        let msgs = vec![Message::new(Role::User, "same input")];
        let p = DemoProvider::new();
        assert_eq!(p.chat(&msgs).await.unwrap(), p.chat(&msgs).await.unwrap());
    }

    #[tokio::test]
    async fn long_messages_are_truncated_to_a_fragment() {
        let msgs = vec![Message::new(Role::User, "z".repeat(1000))];
        let reply = DemoProvider::new().chat(&msgs).await.unwrap();
        assert!(reply.len() < 600);
    }

    #[tokio::test]
    async fn analysis_instruction_gets_review_template() {
        let content = format!("{ANALYZE_INSTRUCTION}\n\n--- Document 1 ---\nsome contract text");
        let msgs = vec![Message::new(Role::User, content)];
        let reply = DemoProvider::new().chat(&msgs).await.unwrap();
        assert!(reply.contains("1 document(s)"));
        assert!(reply.contains("review"));
    }
}
