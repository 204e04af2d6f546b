//! Capture sources and shared capture types
//!
//! Two sources produce images: `screen` grabs the primary monitor in
//! process through xcap, `external` drives the system screenshot utility
//! as a child process and loads the file it leaves behind.

pub mod external;
pub mod screen;

pub use external::RecorderBridge;

use std::path::PathBuf;
use std::time::Duration;

use image::RgbaImage;

/// Delay between hiding the window and sampling a region.
pub const REGION_SETTLE_DELAY: Duration = Duration::from_millis(1000);
/// Delay between hiding the window and sampling the full screen.
pub const FULL_SCREEN_SETTLE_DELAY: Duration = Duration::from_millis(500);
/// Delay between hiding the window and launching the external tool.
pub const EXTERNAL_LAUNCH_DELAY: Duration = Duration::from_millis(500);

/// Which capture source produced an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOrigin {
    Region,
    FullScreen,
    ExternalTool,
}

impl std::fmt::Display for CaptureOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureOrigin::Region => write!(f, "region"),
            CaptureOrigin::FullScreen => write!(f, "full screen"),
            CaptureOrigin::ExternalTool => write!(f, "external tool"),
        }
    }
}

/// The most recent successful capture plus its provenance.
pub struct CapturedImage {
    pub image: RgbaImage,
    pub origin: CaptureOrigin,
}

impl CapturedImage {
    pub fn new(image: RgbaImage, origin: CaptureOrigin) -> Self {
        Self { image, origin }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A rectangle in global desktop coordinates, the space monitor
/// enumeration reports positions in.
///
/// Requests are not validated against the display bounds; rectangles
/// reaching outside the monitor are clamped when sampled, so a degenerate
/// request yields an empty image rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// A `width` x `height` rectangle centered inside `bounds`.
    pub fn centered_in(bounds: Region, width: u32, height: u32) -> Self {
        let x = bounds.x + (bounds.width.saturating_sub(width) / 2) as i32;
        let y = bounds.y + (bounds.height.saturating_sub(height) / 2) as i32;
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The same rectangle shifted by `(dx, dy)`.
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// One user-requested capture. Built per click and consumed by the
/// continuation scheduled after its settle delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureRequest {
    Region(Region),
    FullScreen,
    ExternalTool { output_path: PathBuf },
}

impl CaptureRequest {
    pub fn origin(&self) -> CaptureOrigin {
        match self {
            CaptureRequest::Region(_) => CaptureOrigin::Region,
            CaptureRequest::FullScreen => CaptureOrigin::FullScreen,
            CaptureRequest::ExternalTool { .. } => CaptureOrigin::ExternalTool,
        }
    }

    /// How long the window gets to finish minimizing before the request
    /// runs.
    pub fn settle_delay(&self) -> Duration {
        match self {
            CaptureRequest::Region(_) => REGION_SETTLE_DELAY,
            CaptureRequest::FullScreen => FULL_SCREEN_SETTLE_DELAY,
            CaptureRequest::ExternalTool { .. } => EXTERNAL_LAUNCH_DELAY,
        }
    }
}

/// Errors from the in-process capture path.
#[derive(Debug)]
pub enum CaptureError {
    EnumerationFailed(String),

    NoMonitor,

    CaptureFailed(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnumerationFailed(msg) => write!(f, "Failed to enumerate monitors: {}", msg),
            Self::NoMonitor => write!(f, "No monitor available"),
            Self::CaptureFailed(msg) => write!(f, "Failed to capture screen: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_region_sits_in_the_middle_of_the_bounds() {
        let bounds = Region {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        };
        let region = Region::centered_in(bounds, 800, 600);
        assert_eq!(region.x, 560);
        assert_eq!(region.y, 240);
        assert_eq!(region.width, 800);
        assert_eq!(region.height, 600);
    }

    #[test]
    fn test_centered_region_respects_the_monitor_origin() {
        let bounds = Region {
            x: 1920,
            y: 100,
            width: 1000,
            height: 500,
        };
        let region = Region::centered_in(bounds, 200, 100);
        assert_eq!(region.x, 1920 + 400);
        assert_eq!(region.y, 100 + 200);
    }

    #[test]
    fn test_translated_region_shifts_only_the_origin() {
        let region = Region {
            x: 2320,
            y: 300,
            width: 200,
            height: 100,
        };
        assert_eq!(
            region.translated(-1920, -100),
            Region {
                x: 400,
                y: 200,
                width: 200,
                height: 100,
            }
        );
    }

    #[test]
    fn test_oversized_centered_region_starts_at_the_origin() {
        let bounds = Region {
            x: 0,
            y: 0,
            width: 640,
            height: 480,
        };
        let region = Region::centered_in(bounds, 800, 600);
        assert_eq!(region.x, 0);
        assert_eq!(region.y, 0);
        assert_eq!(region.width, 800);
        assert_eq!(region.height, 600);
    }

    #[test]
    fn test_request_delays_match_the_capture_kind() {
        let region = CaptureRequest::Region(Region {
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        });
        assert_eq!(region.settle_delay(), REGION_SETTLE_DELAY);
        assert_eq!(region.origin(), CaptureOrigin::Region);

        assert_eq!(
            CaptureRequest::FullScreen.settle_delay(),
            FULL_SCREEN_SETTLE_DELAY
        );

        let external = CaptureRequest::ExternalTool {
            output_path: PathBuf::from("/tmp/out.png"),
        };
        assert_eq!(external.settle_delay(), EXTERNAL_LAUNCH_DELAY);
        assert_eq!(external.origin(), CaptureOrigin::ExternalTool);
    }
}
