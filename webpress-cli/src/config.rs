// ABOUTME: Configuration file loading, validation, and hierarchical merging for webpress
// ABOUTME: Supports TOML config files with XDG Base Directory specification compliance

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use webpress::{CompressorConfig, QualityPolicy};

/// Caller policy when no attempt fits the byte budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnMiss {
    /// Keep the unmodified original as the output
    #[default]
    Fallback,
    /// Produce no output for the file
    Skip,
    /// Count the file as failed
    Fail,
}

impl OnMiss {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnMiss::Fallback => "fallback",
            OnMiss::Skip => "skip",
            OnMiss::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Config {
    #[serde(default, deserialize_with = "validate_size")]
    pub target_size: Option<String>,
    #[serde(default)]
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default)]
    pub max_height: Option<u32>,
    #[serde(default, deserialize_with = "validate_quality")]
    pub min_quality: Option<f32>,
    #[serde(default)]
    pub on_miss: Option<OnMiss>,
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
    #[serde(default)]
    pub policy: Option<QualityPolicy>,
}

impl Config {
    /// Load configuration from standard XDG-compliant locations
    pub fn load() -> Result<Self> {
        let paths = Self::get_config_paths();
        Self::load_from_paths(&paths.iter().map(|p| p.as_str()).collect::<Vec<_>>())
    }

    /// Load configuration from specific file paths, listed highest
    /// precedence first
    pub fn load_from_paths(paths: &[&str]) -> Result<Self> {
        let mut config = Config::default();

        // Apply lowest precedence first so earlier paths override later ones
        for path in paths.iter().rev() {
            if let Ok(file_config) = Self::load_from_file(path) {
                config = config.merge(file_config);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get standard config file paths in order of precedence (highest first)
    pub fn get_config_paths() -> Vec<String> {
        let mut paths = Vec::new();

        // 1. Project-specific config (highest precedence)
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(
                current_dir
                    .join("webpress.toml")
                    .to_string_lossy()
                    .to_string(),
            );
        }

        // 2. XDG config home
        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            let path = PathBuf::from(config_home)
                .join("webpress")
                .join("config.toml");
            paths.push(path.to_string_lossy().to_string());
        }

        // 3. User config directory fallback
        if let Some(home_dir) = dirs::home_dir() {
            let path = home_dir
                .join(".config")
                .join("webpress")
                .join("config.toml");
            paths.push(path.to_string_lossy().to_string());
        }

        paths
    }

    /// Read overrides from the process environment
    pub fn from_env() -> Config {
        let mut config = Config::default();

        if let Ok(size) = std::env::var("WEBPRESS_TARGET_SIZE") {
            if parse_size(&size).is_some() {
                config.target_size = Some(size);
            } else {
                log::warn!("Ignoring invalid WEBPRESS_TARGET_SIZE value: {}", size);
            }
        }

        config
    }

    /// Merge this config with another, giving precedence to the other config
    pub fn merge(self, other: Config) -> Config {
        Config {
            target_size: other.target_size.or(self.target_size),
            tolerance: other.tolerance.or(self.tolerance),
            max_width: other.max_width.or(self.max_width),
            max_height: other.max_height.or(self.max_height),
            min_quality: other.min_quality.or(self.min_quality),
            on_miss: other.on_miss.or(self.on_miss),
            out_dir: other.out_dir.or(self.out_dir),
            policy: other.policy.or(self.policy),
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(ref size) = self.target_size {
            let bytes = parse_size(size)
                .ok_or_else(|| anyhow!("Invalid target size '{}'. Use a byte count with an optional KB, MB, or GB suffix (e.g. '14KB')", size))?;
            if bytes == 0 {
                return Err(anyhow!("Target size must be at least 1 byte"));
            }
        }

        if let Some(tolerance) = self.tolerance {
            if !(tolerance >= 0.0) {
                return Err(anyhow!(
                    "Tolerance must be zero or positive, got {}",
                    tolerance
                ));
            }
        }

        if let Some(quality) = self.min_quality {
            if !(quality > 0.0 && quality <= 1.0) {
                return Err(anyhow!(
                    "Minimum quality must be in (0, 1], got {}",
                    quality
                ));
            }
        }

        // The policy table reaches the compressor unchanged; every quality
        // in it needs the same (0, 1] check as the flag
        if let Some(ref policy) = self.policy {
            if !(policy.min_quality > 0.0 && policy.min_quality <= 1.0) {
                return Err(anyhow!(
                    "Policy minimum quality must be in (0, 1], got {}",
                    policy.min_quality
                ));
            }
            if !(policy.base_quality > 0.0 && policy.base_quality <= 1.0) {
                return Err(anyhow!(
                    "Policy base quality must be in (0, 1], got {}",
                    policy.base_quality
                ));
            }
            for factor in &policy.step_factors {
                if !(*factor > 0.0 && *factor <= 1.0) {
                    return Err(anyhow!(
                        "Policy step factors must be in (0, 1], got {}",
                        factor
                    ));
                }
            }
            for tier in &policy.tiers {
                if !(tier.quality > 0.0 && tier.quality <= 1.0) {
                    return Err(anyhow!(
                        "Policy tier quality must be in (0, 1], got {}",
                        tier.quality
                    ));
                }
            }
        }

        if self.max_width == Some(0) || self.max_height == Some(0) {
            return Err(anyhow!("Maximum dimensions must be at least 1 pixel"));
        }

        Ok(())
    }

    /// Resolve the merged settings into compressor configuration
    pub fn compressor_config(&self) -> Result<CompressorConfig> {
        self.validate()?;

        let mut policy = self.policy.clone().unwrap_or_default();
        if let Some(quality) = self.min_quality {
            policy.min_quality = quality;
        }

        let defaults = CompressorConfig::default();
        let target_bytes = match self.target_size {
            Some(ref size) => parse_size(size)
                .ok_or_else(|| anyhow!("Invalid target size '{}'", size))?
                as usize,
            None => defaults.target_bytes,
        };

        Ok(CompressorConfig {
            target_bytes,
            size_tolerance: self.tolerance.unwrap_or(defaults.size_tolerance),
            max_width: self.max_width.unwrap_or(defaults.max_width),
            max_height: self.max_height.unwrap_or(defaults.max_height),
            policy,
        })
    }

    pub fn on_miss(&self) -> OnMiss {
        self.on_miss.unwrap_or_default()
    }
}

/// Parse a size string like "14KB", "2MB", or "900" into bytes
pub fn parse_size(value: &str) -> Option<u64> {
    let size_str = value.trim().to_uppercase();

    let (number_part, unit) = if size_str.ends_with("MB") {
        (size_str.trim_end_matches("MB"), 1024 * 1024)
    } else if size_str.ends_with("KB") {
        (size_str.trim_end_matches("KB"), 1024)
    } else if size_str.ends_with("GB") {
        (size_str.trim_end_matches("GB"), 1024 * 1024 * 1024)
    } else if size_str.ends_with('B') {
        (size_str.trim_end_matches('B'), 1)
    } else {
        (size_str.as_str(), 1)
    };

    number_part
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(unit))
}

// Custom deserializer for size string validation
fn validate_size<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    // Handle the case where the field might not be present
    let value: Option<Option<String>> = Option::deserialize(deserializer).ok();
    let value = value.flatten();

    if let Some(ref size) = value {
        if parse_size(size).is_some() {
            Ok(value)
        } else {
            Err(D::Error::custom(format!(
                "Invalid size '{}'. Use a byte count with an optional KB, MB, or GB suffix (e.g. '14KB')",
                size
            )))
        }
    } else {
        Ok(None)
    }
}

// Custom deserializer for quality range validation
fn validate_quality<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    // Handle the case where the field might not be present
    let value: Option<Option<f32>> = Option::deserialize(deserializer).ok();
    let value = value.flatten();

    if let Some(quality) = value {
        if quality > 0.0 && quality <= 1.0 {
            Ok(value)
        } else {
            Err(D::Error::custom(format!(
                "Invalid quality {}. Must be greater than 0 and at most 1",
                quality
            )))
        }
    } else {
        Ok(None)
    }
}
