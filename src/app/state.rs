//! Shared application state
//!
//! One `AppState` lives behind `Rc<RefCell<...>>` and is cloned into
//! every signal handler.

use crate::app::session::CaptureSession;
use crate::capture::RecorderBridge;

pub struct AppState {
    /// Capture guard plus the most recent image.
    pub session: CaptureSession,
    /// External screenshot utility, reused for the window's lifetime.
    pub recorder: RecorderBridge,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            session: CaptureSession::new(),
            recorder: RecorderBridge::system(),
        }
    }
}
