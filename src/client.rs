use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmSettings;

/// Language-generation service: role-tagged messages in, free text out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

pub type DynLlmClient = dyn LlmClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatMessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatMessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatMessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    System,
    User,
    Assistant,
}

/// Client for an Ollama-compatible `/api/chat` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: f32,
    context_window: u32,
    user_agent: String,
}

impl OllamaClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            context_window: settings.context_window,
            user_agent: settings.user_agent.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the models the endpoint has pulled.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .with_context(|| format!("Failed to reach generation service at {}", self.base_url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Generation service returned status {} for {url}",
                response.status()
            ));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .context("Failed to parse model list JSON")?;
        Ok(tags.models.into_iter().map(|model| model.name).collect())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn invoke(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
                num_ctx: self.context_window,
            },
        };
        debug!(model = %self.model, messages = request.messages.len(), "sending chat request");

        let response = self
            .http
            .post(&url)
            .header("User-Agent", &self.user_agent)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to chat endpoint")?;

        match response.status() {
            StatusCode::OK => {
                let body: ChatResponse = response
                    .json()
                    .await
                    .context("Failed to parse chat response JSON")?;
                debug!(chars = body.message.content.len(), "chat response received");
                Ok(body.message.content)
            }
            StatusCode::NOT_FOUND => Err(anyhow!(
                "Model '{}' not found on the generation service. Pull it first (e.g. `ollama pull {}`).",
                self.model,
                self.model
            )),
            StatusCode::BAD_REQUEST => {
                let error_text = response.text().await.unwrap_or_default();
                Err(anyhow!("Invalid request: {}", error_text))
            }
            status if status.is_server_error() => {
                let error_text = response.text().await.unwrap_or_default();
                Err(anyhow!(
                    "Generation service is temporarily unavailable (status {}): {}",
                    status,
                    error_text
                ))
            }
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(anyhow!("API error (status {}): {}", status, error_text))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_ctx: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagsModel>,
}

#[derive(Debug, Deserialize)]
struct TagsModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn settings(base_url: String) -> LlmSettings {
        LlmSettings {
            base_url,
            model: "llama3.2:latest".to_string(),
            temperature: 0.5,
            context_window: 4096,
            timeout_secs: 5,
            user_agent: "scout/test".to_string(),
        }
    }

    #[tokio::test]
    async fn invoke_posts_messages_and_returns_content() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat").json_body(json!({
                    "model": "llama3.2:latest",
                    "messages": [
                        { "role": "system", "content": "be brief" },
                        { "role": "user", "content": "hello" }
                    ],
                    "stream": false,
                    "options": { "temperature": 0.5, "num_ctx": 4096 }
                }));
                then.status(200).json_body(json!({
                    "model": "llama3.2:latest",
                    "message": { "role": "assistant", "content": "hi there" },
                    "done": true
                }));
            })
            .await;

        let client = OllamaClient::new(&settings(server.base_url())).unwrap();
        let content = client
            .invoke(vec![ChatMessage::system("be brief"), ChatMessage::user("hello")])
            .await
            .unwrap();

        assert_eq!(content, "hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invoke_reports_missing_model() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(404).body("model not found");
            })
            .await;

        let client = OllamaClient::new(&settings(server.base_url())).unwrap();
        let err = client
            .invoke(vec![ChatMessage::user("hello")])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn invoke_reports_server_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(503).body("overloaded");
            })
            .await;

        let client = OllamaClient::new(&settings(server.base_url())).unwrap();
        let err = client
            .invoke(vec![ChatMessage::user("hello")])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("temporarily unavailable"));
    }

    #[tokio::test]
    async fn list_models_reads_tags() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(200).json_body(json!({
                    "models": [{ "name": "llama3.2:latest" }, { "name": "qwen2.5:7b" }]
                }));
            })
            .await;

        let client = OllamaClient::new(&settings(server.base_url())).unwrap();
        let models = client.list_models().await.unwrap();

        assert_eq!(models, vec!["llama3.2:latest", "qwen2.5:7b"]);
    }
}
