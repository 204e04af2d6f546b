//! In-process capture of the primary monitor using xcap
//!
//! Region grabs sample the whole monitor and crop locally. Requests use
//! global desktop coordinates while the captured image starts at (0,0),
//! so the rectangle is translated by the monitor's origin first. The
//! crop is clamped to the image bounds, so rectangles reaching off
//! screen come back smaller (possibly empty) instead of failing.

use image::imageops;
use image::RgbaImage;
use xcap::Monitor;

use super::{CaptureError, CaptureOrigin, CapturedImage, Region};

/// Bounds of the primary monitor, falling back to the first monitor when
/// none is marked primary.
pub fn primary_monitor_bounds() -> Result<Region, CaptureError> {
    let monitor = primary_monitor()?;

    Ok(Region {
        x: monitor
            .x()
            .map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?,
        y: monitor
            .y()
            .map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?,
        width: monitor
            .width()
            .map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?,
        height: monitor
            .height()
            .map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?,
    })
}

/// Capture the entire primary monitor.
pub fn grab_full_screen() -> Result<CapturedImage, CaptureError> {
    let monitor = primary_monitor()?;

    let image = monitor
        .capture_image()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

    Ok(CapturedImage::new(image, CaptureOrigin::FullScreen))
}

/// Capture `region` (global coordinates) of the primary monitor.
pub fn grab_region(region: Region) -> Result<CapturedImage, CaptureError> {
    let monitor = primary_monitor()?;

    let origin_x = monitor
        .x()
        .map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?;
    let origin_y = monitor
        .y()
        .map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?;

    let full = monitor
        .capture_image()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

    // The captured image is monitor-local; a monitor right of or below
    // another one has a non-zero global origin.
    let local = region.translated(-origin_x, -origin_y);

    Ok(CapturedImage::new(
        crop_to_region(&full, local),
        CaptureOrigin::Region,
    ))
}

fn primary_monitor() -> Result<Monitor, CaptureError> {
    let mut monitors =
        Monitor::all().map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?;

    if monitors.is_empty() {
        return Err(CaptureError::NoMonitor);
    }

    let index = monitors
        .iter()
        .position(|m| m.is_primary().unwrap_or(false))
        .unwrap_or(0);

    Ok(monitors.swap_remove(index))
}

/// Crop `image` to `region`, which must already be in the image's own
/// coordinate space. The rectangle is clamped to the image.
fn crop_to_region(image: &RgbaImage, region: Region) -> RgbaImage {
    let x = region.x.max(0) as u32;
    let y = region.y.max(0) as u32;
    imageops::crop_imm(image, x, y, region.width, region.height).to_image()
}
