use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, Role};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Generative Language backend (free-tier chain member).
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Clone for GeminiProvider {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }
}

impl GeminiProvider {
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: crate::http::default_client(),
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            model,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, mut base_url: String) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }
}

impl LlmProvider for GeminiProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let (system, contents) = convert_messages(messages);

        let body = GenerateRequest {
            system_instruction: system.map(|text| Instruction {
                parts: vec![Part { text }],
            }),
            contents,
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if !status.is_success() {
            tracing::error!("Gemini API error {status}: {text}");
            return Err(LlmError::Api {
                provider: "gemini",
                status: status.as_u16(),
            });
        }

        let resp: GenerateResponse = serde_json::from_str(&text)?;

        resp.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or(LlmError::EmptyResponse { provider: "gemini" })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Split system turns into `systemInstruction` and map the rest onto the
/// Gemini role vocabulary (assistant turns become `model`).
fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<Content>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let contents = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| Content {
            role: match m.role {
                Role::Assistant => "model",
                _ => "user",
            },
            parts: vec![Part {
                text: m.content.clone(),
            }],
        })
        .collect();

    let system = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };

    (system, contents)
}

#[derive(Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Instruction>,
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Instruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_messages() -> Vec<Message> {
        vec![
            Message::new(Role::System, "You are a legal assistant"),
            Message::new(Role::User, "What is consideration?"),
        ]
    }

    #[test]
    fn name_is_gemini() {
        let p = GeminiProvider::new("key".into(), "gemini-2.0-flash".into());
        assert_eq!(p.name(), "gemini");
    }

    #[test]
    fn debug_redacts_api_key() {
        let p = GeminiProvider::new("secret-key".into(), "m".into());
        let debug = format!("{p:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn system_turns_become_instruction() {
        let (system, contents) = convert_messages(&test_messages());
        assert_eq!(system.as_deref(), Some("You are a legal assistant"));
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
    }

    #[test]
    fn assistant_turns_map_to_model_role() {
        let msgs = vec![
            Message::new(Role::User, "hi"),
            Message::new(Role::Assistant, "hello"),
        ];
        let (system, contents) = convert_messages(&msgs);
        assert!(system.is_none());
        assert_eq!(contents[1].role, "model");
    }

    #[tokio::test]
    async fn chat_parses_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "key"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "You are a legal assistant" }] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    { "content": { "parts": [{ "text": "A bargained-for exchange." }] } }
                ]
            })))
            .mount(&server)
            .await;

        let p = GeminiProvider::new("key".into(), "gemini-2.0-flash".into())
            .with_base_url(server.uri());
        let reply = p.chat(&test_messages()).await.unwrap();
        assert_eq!(reply, "A bargained-for exchange.");
    }

    #[tokio::test]
    async fn chat_surfaces_api_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let p = GeminiProvider::new("key".into(), "m".into()).with_base_url(server.uri());
        let err = p.chat(&test_messages()).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::Api {
                provider: "gemini",
                status: 429
            }
        ));
    }

    #[tokio::test]
    async fn chat_without_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let p = GeminiProvider::new("key".into(), "m".into()).with_base_url(server.uri());
        let err = p.chat(&test_messages()).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse { provider: "gemini" }));
    }
}
