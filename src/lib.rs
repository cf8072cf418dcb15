//! Study assistant core.
//!
//! Records quiz scores, completed tasks and study sessions per user, derives
//! statistics and recommendations from them, and asks a text-generation
//! service to create and adapt study plans.

pub mod circuit_breaker;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod metrics;
pub mod performance;
pub mod planner;
pub mod state;
pub mod storage;
pub mod tasks;

pub use error::{ErrorKind, StudyError};
pub use state::SessionContext;
