//! Application module
//!
//! Core capture-session state shared by the UI handlers.

mod session;
mod state;

pub use session::{CapturePhase, CaptureSession};
pub use state::AppState;
