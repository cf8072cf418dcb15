use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;
use crate::config::GenerationConfig;
use crate::error::{ErrorKind, StudyError};
use crate::generation::perf::LatencyTimer;
use crate::generation::{status_error_kind, GenerationRequest, GenerationService};

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaChunk {
    response: String,
    #[serde(default)]
    done: bool,
}

/// Client for a local Ollama server's `/api/generate`
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, StudyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| StudyError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(OllamaClient {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

/// Join a streamed NDJSON body into the full response text
fn assemble_stream(body: &str) -> String {
    let mut full_response = String::new();
    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(chunk) = serde_json::from_str::<OllamaChunk>(line) {
            full_response.push_str(&chunk.response);
            if chunk.done {
                break;
            }
        }
    }
    full_response
}

#[async_trait]
impl GenerationService for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, StudyError> {
        let _timer = LatencyTimer::start("ollama_generate", &self.model);

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&OllamaRequest {
                model: &self.model,
                prompt: &request.prompt,
                system: &request.system,
                stream: true,
                options: OllamaOptions {
                    temperature: request.temperature.unwrap_or(self.temperature),
                },
            })
            .send()
            .await
            .map_err(|e| StudyError::from(e).with_model(&self.model))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StudyError::new(
                status_error_kind(status),
                format!("Ollama returned status {}", status),
                "generation",
            ).with_model(&self.model));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StudyError::from(e).with_model(&self.model))?;

        let full_response = assemble_stream(&body);
        if full_response.is_empty() {
            return Err(StudyError::new(
                ErrorKind::GenerationUnavailable,
                "Model returned empty response",
                "generation",
            ).with_model(&self.model));
        }

        Ok(full_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
