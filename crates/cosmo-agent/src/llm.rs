//! OpenAI-compatible chat completion client
//!
//! Works with any `/chat/completions` endpoint; Groq is the default.
//!
//! Author: hephaex@gmail.com

use reqwest::Client;
use serde::{Deserialize, Serialize};

use cosmo_core::{AgentConfig, AgentError};

const SYSTEM_PROMPT: &str = "You are a research assistant for space, satellite and earth \
observation topics. Answer the instruction using only the gathered web content. \
Be concise, use markdown and mention the source URLs you relied on.";

/// Chat completion client
pub struct ChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

impl ChatClient {
    /// Create from config; `None` without an API key
    pub fn from_config(client: Client, config: &AgentConfig) -> Option<Self> {
        let api_key = config.llm_api_key.clone()?;

        Some(Self {
            client,
            api_key,
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer `instruction` from `content`
    pub async fn analyze(&self, instruction: &str, content: &str) -> Result<String, AgentError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: format!("{instruction}\n\nGathered content:\n\n{content}"),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::new(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::new(format!("LLM error: {error_text}")));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::new(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AgentError::new("No response generated"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = AgentConfig::default();
        assert!(ChatClient::from_config(Client::new(), &config).is_none());

        let config = AgentConfig {
            llm_api_key: Some("gsk-test".to_string()),
            llm_base_url: "https://api.groq.com/openai/v1/".to_string(),
            ..AgentConfig::default()
        };
        let client = ChatClient::from_config(Client::new(), &config).unwrap();
        assert_eq!(client.model(), "llama3-8b-8192");
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");
    }
}
