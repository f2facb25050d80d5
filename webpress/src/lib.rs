// ABOUTME: Byte-budget image compression: decode, bounded downscale, WebP re-encode
// ABOUTME: Exposes the compressor, its policy types, and the header probe

pub mod compressor;
pub mod constants;
pub mod error;
pub mod probe;
pub mod quality;
pub mod resize;

mod encoder;

pub use compressor::{compress, Acceptance, CompressedImage, Compressor, CompressorConfig};
pub use error::CompressError;
pub use probe::{format_bytes, inspect, SourceInfo};
pub use quality::{QualityPolicy, SizeTier};
pub use resize::target_dimensions;
