//! Capture session state machine
//!
//! Every capture entry point goes through `try_begin`. The session is the
//! authority on whether an attempt is outstanding; widget sensitivity in
//! the UI only mirrors it.

use log::debug;

use crate::capture::{CaptureOrigin, CapturedImage};

/// Whether a capture attempt is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePhase {
    #[default]
    Idle,
    Capturing(CaptureOrigin),
}

/// Returned when a capture is requested while another is outstanding.
#[derive(Debug)]
pub struct CaptureBusy(pub CaptureOrigin);

impl std::fmt::Display for CaptureBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a {} capture is already in progress", self.0)
    }
}

impl std::error::Error for CaptureBusy {}

/// Owns the most recent capture and the one-attempt-at-a-time guard.
pub struct CaptureSession {
    phase: CapturePhase,
    image: Option<CapturedImage>,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            phase: CapturePhase::Idle,
            image: None,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.phase, CapturePhase::Capturing(_))
    }

    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    /// Saving needs a settled session and something to save.
    pub fn save_enabled(&self) -> bool {
        self.phase == CapturePhase::Idle && self.image.is_some()
    }

    /// Gate for every capture request.
    pub fn try_begin(&mut self, origin: CaptureOrigin) -> Result<(), CaptureBusy> {
        match self.phase {
            CapturePhase::Idle => {
                debug!("Capture session: idle -> capturing ({})", origin);
                self.phase = CapturePhase::Capturing(origin);
                Ok(())
            }
            CapturePhase::Capturing(current) => Err(CaptureBusy(current)),
        }
    }

    /// Successful capture; the new image replaces the old one.
    pub fn finish_with(&mut self, image: CapturedImage) {
        debug!(
            "Capture session: capturing -> idle ({}, {}x{})",
            image.origin,
            image.width(),
            image.height()
        );
        self.image = Some(image);
        self.phase = CapturePhase::Idle;
    }

    /// Failed or dismissed capture; settles without touching the image.
    pub fn finish_without_image(&mut self) {
        debug!("Capture session: capturing -> idle (no image)");
        self.phase = CapturePhase::Idle;
    }
}
