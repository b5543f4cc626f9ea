use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a knowledgeable legal assistant. \
Explain legal concepts clearly, cite the limits of your knowledge, and remind the \
user to consult a qualified attorney for advice on their specific situation.";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    pub system_prompt: String,
}

/// Provider credentials and models. A credential counts as available only
/// when it is non-empty after trimming.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Override for the fallback priority order, e.g. `["groq", "demo"]`.
    /// When absent the built-in order applies.
    pub order: Option<Vec<String>>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub anthropic_api_key: Option<String>,
    pub claude_model: String,
    pub max_tokens: u32,
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("GEMINI_API_KEY") {
            self.llm.gemini_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("GROQ_API_KEY") {
            self.llm.groq_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("OPENAI_API_KEY") {
            self.llm.openai_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("ANTHROPIC_API_KEY") {
            self.llm.anthropic_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("DOCKET_SYSTEM_PROMPT") {
            self.agent.system_prompt = v;
        }
        if let Ok(v) = std::env::var("DOCKET_OLLAMA_URL") {
            self.llm.ollama.base_url = v;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Docket".into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            order: None,
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".into(),
            groq_api_key: None,
            groq_model: "llama-3.3-70b-versatile".into(),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".into(),
            anthropic_api_key: None,
            claude_model: "claude-sonnet-4-0".into(),
            max_tokens: 1024,
            ollama: OllamaConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:11434".into(),
            model: "llama3.2:3b".into(),
        }
    }
}

fn trimmed(value: Option<&String>) -> Option<&str> {
    let v = value?.trim();
    if v.is_empty() { None } else { Some(v) }
}

impl LlmConfig {
    #[must_use]
    pub fn gemini_key(&self) -> Option<&str> {
        trimmed(self.gemini_api_key.as_ref())
    }

    #[must_use]
    pub fn groq_key(&self) -> Option<&str> {
        trimmed(self.groq_api_key.as_ref())
    }

    #[must_use]
    pub fn openai_key(&self) -> Option<&str> {
        trimmed(self.openai_api_key.as_ref())
    }

    #[must_use]
    pub fn anthropic_key(&self) -> Option<&str> {
        trimmed(self.anthropic_api_key.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;

    use super::*;

    const KEY_VARS: [&str; 4] = [
        "GEMINI_API_KEY",
        "GROQ_API_KEY",
        "OPENAI_API_KEY",
        "ANTHROPIC_API_KEY",
    ];

    fn clear_env() {
        for key in KEY_VARS {
            unsafe { std::env::remove_var(key) };
        }
        unsafe { std::env::remove_var("DOCKET_SYSTEM_PROMPT") };
        unsafe { std::env::remove_var("DOCKET_OLLAMA_URL") };
    }

    #[test]
    fn defaults_have_no_credentials() {
        let config = Config::default();
        assert!(config.llm.gemini_key().is_none());
        assert!(config.llm.groq_key().is_none());
        assert!(config.llm.openai_key().is_none());
        assert!(config.llm.anthropic_key().is_none());
        assert!(!config.llm.ollama.enabled);
        assert_eq!(config.agent.name, "Docket");
        assert!(config.agent.system_prompt.contains("legal assistant"));
    }

    #[test]
    #[serial]
    fn defaults_when_file_missing() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.llm.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.llm.ollama.base_url, "http://localhost:11434");
    }

    #[test]
    #[serial]
    fn parse_valid_toml() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docket.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"
[agent]
name = "TestCounsel"

[llm]
order = ["groq", "demo"]
groq_api_key = "gsk-test"
max_tokens = 512

[llm.ollama]
enabled = true
model = "phi3:mini"
"#
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.agent.name, "TestCounsel");
        assert_eq!(config.llm.order.as_deref(), Some(&["groq".to_string(), "demo".to_string()][..]));
        assert_eq!(config.llm.groq_key(), Some("gsk-test"));
        assert_eq!(config.llm.max_tokens, 512);
        assert!(config.llm.ollama.enabled);
        assert_eq!(config.llm.ollama.model, "phi3:mini");
        // Unset sections keep their defaults.
        assert_eq!(config.llm.openai_model, "gpt-4o-mini");
        assert!(config.agent.system_prompt.contains("legal assistant"));
    }

    #[test]
    #[serial]
    fn env_overrides_credentials() {
        clear_env();
        let mut config = Config::default();
        unsafe { std::env::set_var("GROQ_API_KEY", "gsk-env") };
        unsafe { std::env::set_var("DOCKET_SYSTEM_PROMPT", "Be terse.") };
        config.apply_env_overrides();
        clear_env();

        assert_eq!(config.llm.groq_key(), Some("gsk-env"));
        assert_eq!(config.agent.system_prompt, "Be terse.");
    }

    #[test]
    fn blank_credential_is_unavailable() {
        let mut config = Config::default();
        config.llm.openai_api_key = Some("   ".into());
        assert!(config.llm.openai_key().is_none());
        config.llm.openai_api_key = Some("sk-live".into());
        assert_eq!(config.llm.openai_key(), Some("sk-live"));
    }
}
