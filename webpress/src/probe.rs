// ABOUTME: Header-only inspection of source images before any pixel work
// ABOUTME: Reports dimensions, detected format, and byte size without a full decode

use crate::error::CompressError;
use image::ImageFormat;
use std::io::Cursor;

/// What the headers of a source image say about it.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub byte_len: usize,
}

impl SourceInfo {
    pub fn format_name(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Gif => "GIF",
            ImageFormat::WebP => "WebP",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Bmp => "BMP",
            _ => "Unknown",
        }
    }

    pub fn dimensions_str(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    pub fn size_str(&self) -> String {
        format_bytes(self.byte_len as u64)
    }
}

/// Read format and dimensions from the image headers without decoding
/// pixels. Fails fast on empty or unrecognizable input, so callers can gate
/// large uploads cheaply.
pub fn inspect(data: &[u8]) -> Result<SourceInfo, CompressError> {
    if data.is_empty() {
        return Err(CompressError::Decode("empty input buffer".to_string()));
    }

    let reader = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CompressError::Decode(format!("could not read image header: {}", e)))?;

    let format = reader
        .format()
        .ok_or_else(|| CompressError::Decode("unrecognized image format".to_string()))?;

    let (width, height) = reader.into_dimensions()?;

    Ok(SourceInfo {
        width,
        height,
        format,
        byte_len: data.len(),
    })
}

/// Format bytes in a human-readable way
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
