// ABOUTME: Lossy WebP encoding of a staged RGBA frame at a requested quality
// ABOUTME: Maps the (0,1] quality scale onto the encoder and surfaces failures per attempt

use image::RgbaImage;
use webp::Encoder;

/// Encode one frame at `quality` in (0,1]. A failure here is one failed
/// attempt, not a fatal condition; the caller decides whether to move on.
pub(crate) fn encode_webp(frame: &RgbaImage, quality: f32) -> Result<Vec<u8>, String> {
    let (width, height) = frame.dimensions();
    let encoder = Encoder::from_rgba(frame.as_raw(), width, height);

    // libwebp works on a 0-100 scale
    let encoder_quality = (quality * 100.0).clamp(0.0, 100.0);

    encoder
        .encode_simple(false, encoder_quality)
        .map(|memory| memory.to_vec())
        .map_err(|e| format!("WebP encode at quality {:.2} failed: {:?}", quality, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn test_encode_produces_webp_container() {
        let frame = gradient_frame(64, 48);
        let bytes = encode_webp(&frame, 0.6).expect("encode should succeed");

        assert!(!bytes.is_empty());
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_lower_quality_is_not_larger() {
        let frame = gradient_frame(256, 256);
        let high = encode_webp(&frame, 0.9).expect("encode should succeed");
        let low = encode_webp(&frame, 0.15).expect("encode should succeed");

        assert!(low.len() <= high.len());
    }

    #[test]
    fn test_quality_extremes_encode() {
        let frame = gradient_frame(32, 32);
        assert!(encode_webp(&frame, 0.15).is_ok());
        assert!(encode_webp(&frame, 1.0).is_ok());
    }
}
