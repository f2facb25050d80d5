// ABOUTME: Quality estimation policy driving the compression attempt sequence
// ABOUTME: Maps source byte size to an initial quality and expands it into a bounded plan

use crate::constants::quality;
use serde::{Deserialize, Serialize};

/// One row of the initial-quality table: sources larger than `min_bytes`
/// start at `quality`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeTier {
    pub min_bytes: u64,
    pub quality: f32,
}

/// The compression policy as data: tier table, step multipliers, and the
/// quality floor. Every field can be overridden by callers; `Default` is the
/// stock policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityPolicy {
    /// Ordered largest threshold first
    pub tiers: Vec<SizeTier>,
    /// Initial quality when no tier matches
    pub base_quality: f32,
    /// Multipliers applied to the initial quality, in attempt order
    pub step_factors: Vec<f32>,
    /// Floor applied to every plan entry, and the plan's final entry
    pub min_quality: f32,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            tiers: quality::SIZE_TIERS
                .iter()
                .map(|&(min_bytes, quality)| SizeTier { min_bytes, quality })
                .collect(),
            base_quality: quality::BASE_QUALITY,
            step_factors: quality::STEP_FACTORS.to_vec(),
            min_quality: quality::MIN_QUALITY,
        }
    }
}

impl QualityPolicy {
    /// Heuristic starting quality for a source of `source_len` bytes.
    pub fn initial_quality(&self, source_len: u64) -> f32 {
        for tier in &self.tiers {
            if source_len > tier.min_bytes {
                return tier.quality;
            }
        }
        self.base_quality
    }

    /// The full attempt plan for a source of `source_len` bytes: the initial
    /// quality scaled by each step factor, then the floor itself as a last
    /// resort. Entries are held within [min_quality, 1.0], so the sequence
    /// is non-increasing.
    pub fn plan(&self, source_len: u64) -> Vec<f32> {
        let initial = self.initial_quality(source_len);
        // max then min, not clamp: an out-of-range or NaN floor must not
        // panic the plan
        let mut plan: Vec<f32> = self
            .step_factors
            .iter()
            .map(|factor| (initial * factor).max(self.min_quality).min(1.0))
            .collect();
        plan.push(self.min_quality.min(1.0));
        plan
    }

    /// Number of encode attempts the plan allows.
    pub fn max_attempts(&self) -> usize {
        self.step_factors.len() + 1
    }
}
