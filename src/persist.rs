//! Saving captures to disk
//!
//! The destination extension picks the encoder. PNG keeps the RGBA data
//! exactly as captured; JPEG is flattened to RGB first because the
//! encoder rejects alpha.

use std::path::{Path, PathBuf};

use chrono::Local;
use image::{DynamicImage, ImageFormat};
use log::info;

use crate::capture::CapturedImage;

#[derive(Debug)]
pub enum SaveError {
    /// Nothing has been captured yet.
    NoImage,

    /// Extension outside the supported {png, jpg, jpeg} set.
    UnsupportedFormat(String),

    /// Encoder or filesystem failure.
    WriteFailed(String),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoImage => write!(f, "No screenshot has been taken yet"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported image format: {}", ext),
            Self::WriteFailed(msg) => write!(f, "Failed to write image: {}", msg),
        }
    }
}

impl std::error::Error for SaveError {}

/// Write the current capture to `path`. The in-memory image is left
/// untouched whether or not the write succeeds.
pub fn save_captured(image: Option<&CapturedImage>, path: &Path) -> Result<(), SaveError> {
    let captured = image.ok_or(SaveError::NoImage)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let written = match extension.as_str() {
        "png" => captured.image.save_with_format(path, ImageFormat::Png),
        "jpg" | "jpeg" => DynamicImage::ImageRgba8(captured.image.clone())
            .to_rgb8()
            .save_with_format(path, ImageFormat::Jpeg),
        _ => return Err(SaveError::UnsupportedFormat(extension)),
    };

    written.map_err(|e| SaveError::WriteFailed(e.to_string()))?;
    info!("Saved {} capture to {}", captured.origin, path.display());
    Ok(())
}

/// `screenshot_YYYYMMDD_HHMMSS.png`, the suggestion seeded into the save
/// dialog.
pub fn timestamped_file_name() -> String {
    Local::now().format("screenshot_%Y%m%d_%H%M%S.png").to_string()
}

/// Pictures directory when the platform has one, current directory
/// otherwise.
pub fn default_save_dir() -> PathBuf {
    dirs::picture_dir().unwrap_or_else(|| PathBuf::from("."))
}
