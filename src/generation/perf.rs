use std::time::Instant;

/// Times one backend round trip and logs it, tagged with the model, on drop
pub struct LatencyTimer<'a> {
    stage: &'static str,
    model: &'a str,
    start: Instant,
}

impl<'a> LatencyTimer<'a> {
    pub fn start(stage: &'static str, model: &'a str) -> Self {
        LatencyTimer {
            stage,
            model,
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for LatencyTimer<'_> {
    fn drop(&mut self) {
        tracing::debug!(
            stage = self.stage,
            model = self.model,
            duration_ms = self.elapsed_ms(),
            "Backend round trip"
        );
    }
}
