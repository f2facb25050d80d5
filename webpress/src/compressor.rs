// ABOUTME: The compression pipeline: decode, bounded downscale, staged WebP attempts
// ABOUTME: Walks a pre-computed quality plan until the byte budget accepts a result

use crate::constants::{budget, encoder as encoder_limits, resize as resize_limits};
use crate::encoder::encode_webp;
use crate::error::CompressError;
use crate::quality::QualityPolicy;
use crate::resize::shrink_to_bounds;
use image::ImageFormat;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// Encoded size the attempts aim for, in bytes
    pub target_bytes: usize,
    /// Relative deviation above the target that is still accepted
    pub size_tolerance: f64,
    /// Maximum output width in pixels
    pub max_width: u32,
    /// Maximum output height in pixels
    pub max_height: u32,
    /// Initial-quality table and step plan
    pub policy: QualityPolicy,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            target_bytes: budget::TARGET_BYTES,
            size_tolerance: budget::SIZE_TOLERANCE,
            max_width: resize_limits::MAX_WIDTH,
            max_height: resize_limits::MAX_HEIGHT,
            policy: QualityPolicy::default(),
        }
    }
}

/// Which rule admitted the returned bytes. Lets callers tell a genuine hit
/// from a tolerance-band acceptance without re-deriving sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Encoded size was at or under the target
    UnderTarget,
    /// Encoded size exceeded the target but stayed within the tolerance band
    WithinTolerance,
}

impl Acceptance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acceptance::UnderTarget => "under_target",
            Acceptance::WithinTolerance => "within_tolerance",
        }
    }
}

/// A successful compression. `byte_len` always equals `bytes.len()`.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub byte_len: usize,
    pub width: u32,
    pub height: u32,
    /// Quality that produced `bytes`, in (0,1]
    pub quality: f32,
    /// Encode attempts performed, including any that errored
    pub attempts: usize,
    pub acceptance: Acceptance,
}

pub struct Compressor {
    config: CompressorConfig,
}

impl Compressor {
    pub fn new() -> Self {
        Self {
            config: CompressorConfig::default(),
        }
    }

    pub fn with_config(config: CompressorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Compress `source` to WebP at or near the configured byte target.
    ///
    /// `declared_type` is the caller's claim about the content (a MIME
    /// string); the decoder trusts the bytes, and a mismatch is only logged.
    /// Errors follow the taxonomy on [`CompressError`]; an oversized final
    /// attempt is rejected rather than returned, and falling back to the
    /// original bytes is the caller's decision.
    pub fn compress(
        &self,
        source: &[u8],
        declared_type: Option<&str>,
    ) -> Result<CompressedImage, CompressError> {
        if source.is_empty() {
            return Err(CompressError::Decode("empty input buffer".to_string()));
        }

        let sniffed = image::guess_format(source)
            .map_err(|e| CompressError::Decode(format!("unrecognized image format: {}", e)))?;

        if let Some(declared) = declared_type {
            if ImageFormat::from_mime_type(declared) != Some(sniffed) {
                debug!(
                    "Declared media type {} does not match sniffed {}",
                    declared,
                    sniffed.to_mime_type()
                );
            }
        }

        let img = image::load_from_memory(source)?;
        let img = shrink_to_bounds(img, self.config.max_width, self.config.max_height);
        let (width, height) = (img.width(), img.height());

        // The staged frame is the one encoding surface every attempt reuses;
        // a frame the encoder can never accept fails here, before the loop.
        if width > encoder_limits::MAX_ENCODE_DIMENSION
            || height > encoder_limits::MAX_ENCODE_DIMENSION
        {
            return Err(CompressError::EncodeUnavailable(format!(
                "{}x{} frame exceeds the encoder's {} px per-axis limit",
                width,
                height,
                encoder_limits::MAX_ENCODE_DIMENSION
            )));
        }
        let frame = img.to_rgba8();

        let plan = self.config.policy.plan(source.len() as u64);
        let target = self.config.target_bytes;
        let tolerance = self.config.size_tolerance;

        let mut attempts = 0;
        let mut last_size = None;

        for quality in plan {
            attempts += 1;

            let encoded = match encode_webp(&frame, quality) {
                Ok(bytes) => bytes,
                Err(reason) => {
                    warn!("Encode attempt {} skipped: {}", attempts, reason);
                    continue;
                }
            };

            let size = encoded.len();
            last_size = Some(size);

            let deviation = (size as f64 - target as f64).abs() / target as f64;
            debug!(
                "Attempt {}: quality {:.2} -> {} bytes (target {}, deviation {:.0}%)",
                attempts,
                quality,
                size,
                target,
                deviation * 100.0
            );

            let acceptance = if size <= target {
                Some(Acceptance::UnderTarget)
            } else if deviation <= tolerance {
                Some(Acceptance::WithinTolerance)
            } else {
                None
            };

            if let Some(acceptance) = acceptance {
                return Ok(CompressedImage {
                    byte_len: encoded.len(),
                    bytes: encoded,
                    media_type: encoder_limits::WEBP_MEDIA_TYPE,
                    width,
                    height,
                    quality,
                    attempts,
                    acceptance,
                });
            }
        }

        Err(CompressError::TargetUnreachable {
            target,
            attempts,
            last_size,
        })
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Compress with the stock configuration.
pub fn compress(source: &[u8]) -> Result<CompressedImage, CompressError> {
    Compressor::new().compress(source, None)
}
