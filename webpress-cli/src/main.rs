// ABOUTME: Main entry point for the webpress command-line tool
// ABOUTME: Parses arguments, resolves configuration layers, and drives the batch runner

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use webpress_cli::batch::{BatchOptions, BatchRunner};
use webpress_cli::config::{Config, OnMiss};

#[derive(Parser)]
#[command(name = "webpress")]
#[command(about = "Compress images into a small WebP byte budget", long_about = None)]
struct Cli {
    /// Input image files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for outputs (defaults to each input's directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Byte budget for encoded output, with optional KB/MB/GB suffix
    #[arg(long, value_name = "SIZE")]
    target_size: Option<String>,

    /// Accepted relative overshoot above the budget
    #[arg(long)]
    tolerance: Option<f64>,

    /// Maximum output width in pixels
    #[arg(long)]
    max_width: Option<u32>,

    /// Maximum output height in pixels
    #[arg(long)]
    max_height: Option<u32>,

    /// Quality floor for the final attempt
    #[arg(long)]
    min_quality: Option<f32>,

    /// What to do when no attempt fits the budget
    #[arg(long, value_enum)]
    on_miss: Option<OnMiss>,

    /// Print source format, dimensions, and size without re-encoding
    #[arg(long)]
    probe: bool,

    /// Emit one JSON object per file instead of text
    #[arg(long)]
    json: bool,

    /// Suppress per-file and summary output
    #[arg(short, long)]
    quiet: bool,

    /// Path to an alternate config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Flag values as a config layer for merging
    fn as_config(&self) -> Config {
        Config {
            target_size: self.target_size.clone(),
            tolerance: self.tolerance,
            max_width: self.max_width,
            max_height: self.max_height,
            min_quality: self.min_quality,
            on_miss: self.on_miss,
            out_dir: self.out_dir.clone(),
            policy: None,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let file_config = match cli.config {
        Some(ref path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    // Precedence: defaults < file < environment < flags
    let settings = file_config
        .merge(Config::from_env())
        .merge(cli.as_config());

    let compressor_config = match settings.compressor_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let runner = BatchRunner::new(
        compressor_config,
        BatchOptions {
            on_miss: settings.on_miss(),
            out_dir: settings.out_dir.clone(),
            json: cli.json,
            quiet: cli.quiet,
        },
    );

    let summary = if cli.probe {
        runner.probe(&cli.inputs)
    } else {
        runner.run(&cli.inputs)?
    };

    if !summary.all_succeeded() {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure() {
        let cli = Cli::command();

        // Verify basic structure
        assert_eq!(cli.get_name(), "webpress");

        let target_arg = cli
            .get_arguments()
            .find(|arg| arg.get_id() == "target_size")
            .expect("target_size argument should exist");
        assert!(!target_arg.is_required_set());

        let inputs_arg = cli
            .get_arguments()
            .find(|arg| arg.get_id() == "inputs")
            .expect("inputs argument should exist");
        assert!(inputs_arg.is_required_set());
    }

    #[test]
    fn test_cli_parses_inputs_and_flags() {
        let cli = Cli::try_parse_from([
            "webpress",
            "--target-size",
            "14KB",
            "--on-miss",
            "skip",
            "--json",
            "a.png",
            "b.jpg",
        ])
        .expect("args should parse");

        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.target_size.as_deref(), Some("14KB"));
        assert_eq!(cli.on_miss, Some(OnMiss::Skip));
        assert!(cli.json);
        assert!(!cli.probe);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_requires_inputs() {
        let result = Cli::try_parse_from(["webpress", "--json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_flags_become_config_layer() {
        let cli = Cli::try_parse_from([
            "webpress",
            "--max-width",
            "800",
            "--max-height",
            "600",
            "--min-quality",
            "0.2",
            "photo.png",
        ])
        .expect("args should parse");

        let config = cli.as_config();
        assert_eq!(config.max_width, Some(800));
        assert_eq!(config.max_height, Some(600));
        assert_eq!(config.min_quality, Some(0.2));
        assert!(config.target_size.is_none());
        assert!(config.policy.is_none());
    }

    #[test]
    fn test_cli_on_miss_values() {
        for (value, expected) in [
            ("fallback", OnMiss::Fallback),
            ("skip", OnMiss::Skip),
            ("fail", OnMiss::Fail),
        ] {
            let cli = Cli::try_parse_from(["webpress", "--on-miss", value, "a.png"])
                .expect("value should parse");
            assert_eq!(cli.on_miss, Some(expected));
        }

        let result = Cli::try_parse_from(["webpress", "--on-miss", "explode", "a.png"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_probe_and_quiet_flags() {
        let cli = Cli::try_parse_from(["webpress", "--probe", "-q", "a.png"])
            .expect("args should parse");

        assert!(cli.probe);
        assert!(cli.quiet);
        assert_eq!(cli.inputs, vec![PathBuf::from("a.png")]);
    }
}
