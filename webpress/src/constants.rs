// ABOUTME: Centralized constants for the compression policy
// ABOUTME: Contains the byte budget, resize maxima, and quality plan tables

/// Byte budget the compressor aims for
pub mod budget {
    /// Target encoded size in bytes (decimal, matching upload limits)
    pub const TARGET_BYTES: usize = 14_000;

    /// Relative deviation from the target that is still accepted
    pub const SIZE_TOLERANCE: f64 = 0.30;
}

/// Output dimension limits
pub mod resize {
    /// Maximum output width in pixels
    pub const MAX_WIDTH: u32 = 1000;

    /// Maximum output height in pixels
    pub const MAX_HEIGHT: u32 = 700;
}

/// Quality estimation and stepping tables
pub mod quality {
    /// Lowest quality the plan will ever request
    pub const MIN_QUALITY: f32 = 0.15;

    /// Source-size tiers for the initial quality estimate, largest first.
    /// Sources above a threshold start at that tier's quality.
    pub const SIZE_TIERS: [(u64, f32); 3] = [
        (5_000_000, 0.30),
        (2_000_000, 0.40),
        (1_000_000, 0.50),
    ];

    /// Initial quality for sources below every tier threshold
    pub const BASE_QUALITY: f32 = 0.60;

    /// Multipliers applied to the initial quality, in attempt order.
    /// The plan appends MIN_QUALITY as a final step.
    pub const STEP_FACTORS: [f32; 4] = [1.0, 0.7, 0.5, 0.3];

    /// Upper bound on encode attempts per invocation
    pub const MAX_ATTEMPTS: usize = STEP_FACTORS.len() + 1;
}

/// Encoder limits
pub mod encoder {
    /// Hard per-axis pixel limit of the WebP encoder (libwebp)
    pub const MAX_ENCODE_DIMENSION: u32 = 16_383;

    /// Media type of every successful result
    pub const WEBP_MEDIA_TYPE: &str = "image/webp";
}
