use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;
use crate::config::GenerationConfig;
use crate::error::{ErrorKind, StudyError};
use crate::generation::perf::LatencyTimer;
use crate::generation::{status_error_kind, GenerationRequest, GenerationService};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints (Groq, OpenAI)
pub struct ChatCompletionsClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionsClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, StudyError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            let hint = config.provider.api_key_env().unwrap_or("STUDYPAL_API_KEY");
            StudyError::config(format!("No API key configured; set {} or STUDYPAL_API_KEY", hint))
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| StudyError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(ChatCompletionsClient {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl GenerationService for ChatCompletionsClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, StudyError> {
        let _timer = LatencyTimer::start("chat_completion", &self.model);

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            temperature: request.temperature.unwrap_or(self.temperature),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StudyError::from(e).with_model(&self.model))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StudyError::new(
                status_error_kind(status),
                format!("Chat completion returned status {}", status),
                "generation",
            )
            .with_model(&self.model)
            .with_context(detail.chars().take(300).collect::<String>()));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| StudyError::from(e).with_model(&self.model))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| StudyError::new(
                ErrorKind::GenerationUnavailable,
                "Model returned empty response",
                "generation",
            ).with_model(&self.model))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
