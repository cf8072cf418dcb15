//! Talking to the hosted text-generation service.
//!
//! Every backend implements [`GenerationService`]; [`build_service`] picks one
//! from configuration and wraps it in [`ResilientGenerator`].

pub mod chat;
pub mod extract;
pub mod ollama;
pub mod perf;
pub mod resilient;

use async_trait::async_trait;
use std::sync::Arc;
use crate::config::{GenerationConfig, Provider};
use crate::error::{ErrorKind, StudyError};
use crate::metrics::GenerationMetrics;

pub use chat::ChatCompletionsClient;
pub use extract::{extract_candidate_json, extract_structured, parse_structured, ParseError};
pub use ollama::OllamaClient;
pub use resilient::ResilientGenerator;

/// One prompt for the generation service
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System-role instruction
    pub system: String,
    pub prompt: String,
    /// Overrides the configured temperature when set
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn new<S: Into<String>, P: Into<String>>(system: S, prompt: P) -> Self {
        GenerationRequest {
            system: system.into(),
            prompt: prompt.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Send one request and return the raw response text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, StudyError>;

    fn model_name(&self) -> &str;
}

/// Error kind for a non-success HTTP status.
/// Client errors other than 408 and 429 will not improve on retry.
pub fn status_error_kind(status: reqwest::StatusCode) -> ErrorKind {
    match status.as_u16() {
        408 => ErrorKind::GenerationTimeout,
        429 => ErrorKind::GenerationUnavailable,
        400..=499 => ErrorKind::Config,
        _ => ErrorKind::GenerationUnavailable,
    }
}

/// Build the configured backend, wrapped with retries and a circuit breaker
pub fn build_service(
    config: &GenerationConfig,
    metrics: GenerationMetrics,
) -> Result<Arc<dyn GenerationService>, StudyError> {
    let backend: Arc<dyn GenerationService> = match config.provider {
        Provider::Groq | Provider::OpenAi => Arc::new(ChatCompletionsClient::new(config)?),
        Provider::Ollama => Arc::new(OllamaClient::new(config)?),
    };

    tracing::info!(
        provider = ?config.provider,
        model = %config.model,
        base_url = %config.base_url(),
        "Generation service configured"
    );

    Ok(Arc::new(ResilientGenerator::new(backend, config, metrics)))
}
