use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::StudyError;

const APP_DIR: &str = "studypal";
const CONFIG_FILE: &str = "studypal.toml";

/// Which hosted (or local) text-generation backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Groq,
    OpenAi,
    Ollama,
}

impl Provider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Ollama => "http://localhost:11434",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.3-70b-versatile",
            Provider::OpenAi => "gpt-4",
            Provider::Ollama => "qwen2.5:7b-instruct",
        }
    }

    /// Environment variable conventionally holding this provider's key
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Ollama => None,
        }
    }

    fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "groq" => Some(Provider::Groq),
            "openai" => Some(Provider::OpenAi),
            "ollama" => Some(Provider::Ollama),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: Option<String>,
    /// Never written back to disk
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub breaker_threshold: u64,
    pub breaker_cooldown_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            provider: Provider::Groq,
            model: Provider::Groq.default_model().to_string(),
            base_url: None,
            api_key: None,
            temperature: 0.3,
            request_timeout_secs: 60,
            max_retries: 2,
            breaker_threshold: 3,
            breaker_cooldown_secs: 60,
        }
    }
}

impl GenerationConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("data"));
        StorageConfig { data_dir }
    }
}

impl StorageConfig {
    /// Directory holding every per-user document
    pub fn user_data_dir(&self) -> PathBuf {
        self.data_dir.join("user_data")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Planned task count used when the caller does not supply one
    pub default_total_tasks: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig { default_total_tasks: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generation: GenerationConfig,
    pub storage: StorageConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Default location of studypal.toml in the platform config directory
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, StudyError> {
        Ok(toml::from_str::<Settings>(content)?)
    }

    /// Load settings from an explicit file, or from the default location.
    /// An explicit file must exist and parse; the default file is optional
    /// and falls back to defaults when missing or unreadable.
    pub fn load(explicit: Option<&Path>) -> Result<Self, StudyError> {
        let mut settings = match explicit {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    StudyError::config(format!("Failed to read config file: {}", e))
                        .with_context(format!("path: {:?}", path))
                })?;
                Self::from_toml_str(&content)
                    .map_err(|e| e.with_context(format!("path: {:?}", path)))?
            }
            None => Self::load_default_file(),
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    fn load_default_file() -> Self {
        let path = default_config_path();
        match fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(settings) => {
                    tracing::debug!(path = ?path, "Loaded settings");
                    settings
                }
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Failed to parse settings, using defaults");
                    Settings::default()
                }
            },
            Err(_) => {
                tracing::debug!(path = ?path, "No settings file, using defaults");
                Settings::default()
            }
        }
    }

    /// Apply STUDYPAL_* and provider key variables on top of file values
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("STUDYPAL_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }

        if let Some(label) = lookup("STUDYPAL_PROVIDER") {
            match Provider::parse(&label) {
                Some(provider) if provider != self.generation.provider => {
                    self.generation.provider = provider;
                    // A model name only makes sense for the provider it was written for
                    self.generation.model = provider.default_model().to_string();
                    self.generation.base_url = None;
                }
                Some(_) => {}
                None => tracing::warn!(provider = %label, "Unknown STUDYPAL_PROVIDER, ignoring"),
            }
        }

        if let Some(model) = lookup("STUDYPAL_MODEL") {
            self.generation.model = model;
        }

        let provider_key = self
            .generation
            .provider
            .api_key_env()
            .and_then(|name| lookup(name));
        if let Some(key) = lookup("STUDYPAL_API_KEY").or(provider_key) {
            self.generation.api_key = Some(key);
        }

        if let Some(level) = lookup("STUDYPAL_LOG") {
            self.logging.level = level;
        }
    }
}
