use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use serde::Deserialize;

use super::{UploadError, UploadResult};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Client-side copy of the server's upload limits, checked before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    pub max_upload_mb: u64,
    pub max_width: u32,
    pub max_height: u32,
    pub max_pixels: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_upload_mb: 2,
            max_width: 2048,
            max_height: 2048,
            max_pixels: 12_000_000,
        }
    }
}

impl UploadLimits {
    pub fn max_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }
}

/// An image picked or dropped into the post editor that passed preflight checks.
#[derive(Debug, Clone)]
pub struct ImageBlob {
    filename: String,
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl ImageBlob {
    pub fn new(
        filename: impl Into<String>,
        bytes: Vec<u8>,
        limits: &UploadLimits,
    ) -> UploadResult<Self> {
        let size = bytes.len() as u64;
        if size > limits.max_bytes() {
            return Err(UploadError::TooLarge {
                size,
                limit: limits.max_bytes(),
            });
        }

        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|err| UploadError::Decode {
                message: err.to_string(),
            })?;
        let format = reader.format().ok_or(UploadError::UnsupportedFormat)?;
        let (width, height) = reader.into_dimensions().map_err(|err| UploadError::Decode {
            message: err.to_string(),
        })?;

        if width > limits.max_width || height > limits.max_height {
            return Err(UploadError::DimensionsTooLarge {
                width,
                height,
                max_width: limits.max_width,
                max_height: limits.max_height,
            });
        }
        let pixels = u64::from(width) * u64::from(height);
        if pixels > limits.max_pixels {
            return Err(UploadError::TooManyPixels {
                pixels,
                limit: limits.max_pixels,
            });
        }

        Ok(Self {
            filename: filename.into(),
            bytes,
            format,
            width,
            height,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("bin")
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
