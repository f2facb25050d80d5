// ABOUTME: Custom error types for the compressor with caller-facing messages
// ABOUTME: Distinguishes decode failures, missing encode surfaces, and missed targets

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Encoding surface unavailable: {0}")]
    EncodeUnavailable(String),

    #[error("No quality step reached the {target} byte target after {attempts} attempts")]
    TargetUnreachable {
        target: usize,
        attempts: usize,
        /// Byte length of the last attempt that encoded successfully, for
        /// diagnostics. None when every encode errored.
        last_size: Option<usize>,
    },
}

impl CompressError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            CompressError::Decode(_) => {
                Some("Check that the file is a valid JPEG, PNG, WebP, GIF, or BMP image")
            }
            CompressError::EncodeUnavailable(_) => {
                Some("The image is too large for the WebP encoder; lower the dimension maxima")
            }
            CompressError::TargetUnreachable { .. } => {
                Some("Keep the original bytes, or raise the target size or tolerance")
            }
        }
    }

    /// Whether keeping the unmodified source is a sensible recovery.
    /// False for decode failures: bytes that do not decode are not an image
    /// worth keeping.
    pub fn fallback_to_original(&self) -> bool {
        matches!(
            self,
            CompressError::TargetUnreachable { .. } | CompressError::EncodeUnavailable(_)
        )
    }
}

impl From<image::ImageError> for CompressError {
    fn from(err: image::ImageError) -> Self {
        CompressError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CompressError::Decode("bad magic bytes".to_string()).to_string(),
            "Image decode failed: bad magic bytes"
        );
        assert_eq!(
            CompressError::EncodeUnavailable("frame is 20000 px wide".to_string()).to_string(),
            "Encoding surface unavailable: frame is 20000 px wide"
        );
        assert_eq!(
            CompressError::TargetUnreachable {
                target: 14_000,
                attempts: 5,
                last_size: Some(40_000),
            }
            .to_string(),
            "No quality step reached the 14000 byte target after 5 attempts"
        );
    }

    #[test]
    fn test_help_text() {
        assert!(
            CompressError::Decode("x".to_string())
                .help_text()
                .unwrap()
                .contains("JPEG")
        );
        assert!(
            CompressError::TargetUnreachable {
                target: 14_000,
                attempts: 5,
                last_size: None,
            }
            .help_text()
            .unwrap()
            .contains("original bytes")
        );
        assert!(
            CompressError::EncodeUnavailable("x".to_string())
                .help_text()
                .is_some()
        );
    }

    #[test]
    fn test_fallback_to_original() {
        assert!(
            CompressError::TargetUnreachable {
                target: 14_000,
                attempts: 5,
                last_size: Some(40_000),
            }
            .fallback_to_original()
        );
        assert!(CompressError::EncodeUnavailable("x".to_string()).fallback_to_original());
        assert!(!CompressError::Decode("x".to_string()).fallback_to_original());
    }

    #[test]
    fn test_from_image_error() {
        let decode_err = image::ImageError::Unsupported(
            image::error::UnsupportedError::from_format_and_kind(
                image::error::ImageFormatHint::Unknown,
                image::error::UnsupportedErrorKind::Format(image::error::ImageFormatHint::Unknown),
            ),
        );
        let err: CompressError = decode_err.into();
        assert!(matches!(err, CompressError::Decode(_)));
    }

    #[test]
    fn test_target_unreachable_carries_diagnostics() {
        let err = CompressError::TargetUnreachable {
            target: 14_000,
            attempts: 5,
            last_size: Some(40_123),
        };
        match err {
            CompressError::TargetUnreachable {
                target,
                attempts,
                last_size,
            } => {
                assert_eq!(target, 14_000);
                assert_eq!(attempts, 5);
                assert_eq!(last_size, Some(40_123));
            }
            _ => panic!("wrong variant"),
        }
    }
}
