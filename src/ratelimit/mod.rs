//! Rate limiting gates and their shared window state.

mod blocking;
mod gate;
mod window;

pub use blocking::BlockingGate;
pub use gate::SubmissionGate;
pub use window::{GateSnapshot, LimiterState, TimeUnit};
