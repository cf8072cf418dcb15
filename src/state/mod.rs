pub mod gate;
pub mod session;

pub use gate::{GatePermit, GenerationGate};
pub use session::SessionContext;
