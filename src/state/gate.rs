use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use crate::error::{ErrorKind, StudyError};

/// Allows at most one outstanding generation request per session
#[derive(Debug, Clone, Default)]
pub struct GenerationGate {
    busy: Arc<AtomicBool>,
}

/// Held while a request is in flight; releases the gate on drop
#[derive(Debug)]
pub struct GatePermit {
    busy: Arc<AtomicBool>,
}

impl GenerationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate, or fail with `Busy` if a request is already outstanding
    pub fn try_acquire(&self) -> Result<GatePermit, StudyError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StudyError::new(
                ErrorKind::Busy,
                "A generation request is already in progress for this session",
                "session",
            ))?;
        Ok(GatePermit {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
