#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use studypal_lib::config::Settings;
use studypal_lib::generation::{GenerationRequest, GenerationService};
use studypal_lib::StudyError;
use tempfile::TempDir;

/// Replays scripted outcomes in order; the last one repeats
pub struct ScriptedService {
    outcomes: Mutex<VecDeque<Result<String, StudyError>>>,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<GenerationRequest>>,
    delay: Duration,
}

impl ScriptedService {
    pub fn new(outcomes: Vec<Result<String, StudyError>>) -> Self {
        ScriptedService {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            delay: Duration::ZERO,
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, StudyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut outcomes = self.outcomes.lock();
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap()
        } else {
            outcomes.front().cloned().unwrap()
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub fn shared(service: ScriptedService) -> Arc<ScriptedService> {
    Arc::new(service)
}

/// Settings whose data dir lives in a fresh temp dir
pub fn temp_settings() -> (TempDir, Settings) {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.storage.data_dir = dir.path().to_path_buf();
    settings.generation.request_timeout_secs = 5;
    (dir, settings)
}
