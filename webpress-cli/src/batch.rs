// ABOUTME: Batch compression runner with per-file outcomes and on-miss recovery policy
// ABOUTME: Writes WebP outputs beside inputs or into a directory, with progress reporting

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use webpress::{format_bytes, inspect, Compressor, CompressorConfig, SourceInfo};

use crate::config::OnMiss;

/// File extensions the runner accepts as image inputs
const IMAGE_EXTENSIONS: &[&str] = &["bmp", "gif", "jpeg", "jpg", "png", "tif", "tiff", "webp"];

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub on_miss: OnMiss,
    pub out_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// What happened to a single input file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Converted {
        output: PathBuf,
        bytes_in: u64,
        bytes_out: u64,
        width: u32,
        height: u32,
        quality: f32,
        attempts: usize,
        acceptance: &'static str,
    },
    FellBack {
        output: Option<PathBuf>,
        bytes: u64,
        reason: String,
    },
    Skipped {
        reason: String,
    },
    Failed {
        reason: String,
        help: Option<&'static str>,
    },
}

/// Aggregate counts for a run. Byte totals cover files that produced an
/// output (converted or fell back); skipped and failed files are excluded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub converted: usize,
    pub fell_back: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Converted {
                bytes_in,
                bytes_out,
                ..
            } => {
                self.converted += 1;
                self.bytes_in += bytes_in;
                self.bytes_out += bytes_out;
            }
            FileOutcome::FellBack { bytes, .. } => {
                self.fell_back += 1;
                self.bytes_in += bytes;
                self.bytes_out += bytes;
            }
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn format_line(&self) -> String {
        format!(
            "{} converted, {} fell back, {} skipped, {} failed ({} -> {})",
            self.converted,
            self.fell_back,
            self.skipped,
            self.failed,
            format_bytes(self.bytes_in),
            format_bytes(self.bytes_out)
        )
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

pub struct BatchRunner {
    compressor: Compressor,
    options: BatchOptions,
}

impl BatchRunner {
    pub fn new(config: CompressorConfig, options: BatchOptions) -> Self {
        Self {
            compressor: Compressor::with_config(config),
            options,
        }
    }

    /// Compress each input and write the results, applying the on-miss
    /// policy when a file cannot reach the byte budget.
    pub fn run(&self, inputs: &[PathBuf]) -> Result<RunSummary> {
        if let Some(ref dir) = self.options.out_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        }

        let progress = self.progress_bar(inputs.len());
        let mut summary = RunSummary::default();

        for input in inputs {
            if let Some(ref pb) = progress {
                pb.set_message(display_name(input));
            }

            let outcome = self.process_file(input);
            self.report(input, &outcome, progress.as_ref());
            summary.record(&outcome);

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if self.options.json {
            println!(
                "{}",
                json!({
                    "summary": {
                        "converted": summary.converted,
                        "fell_back": summary.fell_back,
                        "skipped": summary.skipped,
                        "failed": summary.failed,
                        "bytes_in": summary.bytes_in,
                        "bytes_out": summary.bytes_out,
                    }
                })
            );
        } else if !self.options.quiet {
            println!("{}", summary.format_line());
        }

        Ok(summary)
    }

    /// Print source information for each input without re-encoding anything.
    /// Failures are reported the same way `run` reports them, `--json`
    /// included.
    pub fn probe(&self, inputs: &[PathBuf]) -> RunSummary {
        let mut summary = RunSummary::default();

        for input in inputs {
            let bytes = match fs::read(input) {
                Ok(bytes) => bytes,
                Err(e) => {
                    let outcome = FileOutcome::Failed {
                        reason: format!("failed to read: {}", e),
                        help: None,
                    };
                    self.report(input, &outcome, None);
                    summary.record(&outcome);
                    continue;
                }
            };

            match inspect(&bytes) {
                Ok(info) => {
                    if self.options.json {
                        println!("{}", probe_json_line(input, &info));
                    } else {
                        println!(
                            "{}: {} {} ({})",
                            input.display(),
                            info.format_name(),
                            info.dimensions_str(),
                            info.size_str()
                        );
                    }
                }
                Err(e) => {
                    let outcome = FileOutcome::Failed {
                        reason: e.to_string(),
                        help: None,
                    };
                    self.report(input, &outcome, None);
                    summary.record(&outcome);
                }
            }
        }

        summary
    }

    fn process_file(&self, input: &Path) -> FileOutcome {
        if !has_image_extension(input) {
            return FileOutcome::Skipped {
                reason: "unrecognized image extension".to_string(),
            };
        }

        let source = match fs::read(input) {
            Ok(bytes) => bytes,
            Err(e) => {
                return FileOutcome::Failed {
                    reason: format!("failed to read: {}", e),
                    help: None,
                }
            }
        };

        match self.compressor.compress(&source, media_type_for(input)) {
            Ok(result) => {
                let output = self.output_path(input);
                if let Err(e) = fs::write(&output, &result.bytes) {
                    return FileOutcome::Failed {
                        reason: format!("failed to write {}: {}", output.display(), e),
                        help: None,
                    };
                }
                FileOutcome::Converted {
                    output,
                    bytes_in: source.len() as u64,
                    bytes_out: result.byte_len as u64,
                    width: result.width,
                    height: result.height,
                    quality: result.quality,
                    attempts: result.attempts,
                    acceptance: result.acceptance.as_str(),
                }
            }
            Err(e) if e.fallback_to_original() => match self.options.on_miss {
                OnMiss::Fallback => {
                    log::warn!("{}: {}; keeping original", input.display(), e);
                    let copied = match self.options.out_dir {
                        Some(ref dir) => {
                            let target = match input.file_name() {
                                Some(name) => dir.join(name),
                                None => dir.join("image"),
                            };
                            if let Err(write_err) = fs::write(&target, &source) {
                                return FileOutcome::Failed {
                                    reason: format!(
                                        "failed to copy original to {}: {}",
                                        target.display(),
                                        write_err
                                    ),
                                    help: None,
                                };
                            }
                            Some(target)
                        }
                        None => None,
                    };
                    FileOutcome::FellBack {
                        output: copied,
                        bytes: source.len() as u64,
                        reason: e.to_string(),
                    }
                }
                OnMiss::Skip => FileOutcome::Skipped {
                    reason: e.to_string(),
                },
                OnMiss::Fail => FileOutcome::Failed {
                    reason: e.to_string(),
                    help: e.help_text(),
                },
            },
            Err(e) => FileOutcome::Failed {
                reason: e.to_string(),
                help: e.help_text(),
            },
        }
    }

    /// Where the compressed version of `input` should be written.
    /// Never resolves to the input itself.
    fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        let dir = match self.options.out_dir {
            Some(ref dir) => dir.clone(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };

        let candidate = dir.join(format!("{}.webp", stem));
        if candidate == input {
            return dir.join(format!("{}-min.webp", stem));
        }
        candidate
    }

    fn report(&self, input: &Path, outcome: &FileOutcome, progress: Option<&ProgressBar>) {
        if self.options.json {
            println!("{}", json_line(input, outcome));
            return;
        }

        match outcome {
            FileOutcome::Converted {
                output,
                bytes_in,
                bytes_out,
                quality,
                attempts,
                ..
            } => {
                if !self.options.quiet {
                    let plural = if *attempts == 1 { "" } else { "s" };
                    emit(
                        progress,
                        format!(
                            "{} -> {} ({} -> {}, quality {:.2}, {} attempt{})",
                            input.display(),
                            output.display(),
                            format_bytes(*bytes_in),
                            format_bytes(*bytes_out),
                            quality,
                            attempts,
                            plural
                        ),
                    );
                }
            }
            FileOutcome::FellBack { reason, .. } => {
                if !self.options.quiet {
                    eprintln!("{}: kept original ({})", input.display(), reason);
                }
            }
            FileOutcome::Skipped { reason } => {
                if !self.options.quiet {
                    eprintln!("{}: skipped ({})", input.display(), reason);
                }
            }
            FileOutcome::Failed { reason, help } => {
                eprintln!("Error: {}: {}", input.display(), reason);
                if let Some(help) = help {
                    eprintln!("  {}", help);
                }
            }
        }
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if total > 1 && !self.options.quiet && !self.options.json {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{bar:25.cyan/blue}] {pos}/{len}")
                    .unwrap()
                    .progress_chars("=>-"),
            );
            Some(pb)
        } else {
            None
        }
    }
}

fn emit(progress: Option<&ProgressBar>, line: String) {
    match progress {
        Some(pb) => pb.println(line),
        None => println!("{}", line),
    }
}

fn probe_json_line(input: &Path, info: &SourceInfo) -> String {
    json!({
        "file": input.display().to_string(),
        "format": info.format_name(),
        "width": info.width,
        "height": info.height,
        "bytes": info.byte_len,
    })
    .to_string()
}

fn json_line(input: &Path, outcome: &FileOutcome) -> String {
    let value = match outcome {
        FileOutcome::Converted {
            output,
            bytes_in,
            bytes_out,
            width,
            height,
            quality,
            attempts,
            acceptance,
        } => json!({
            "file": input.display().to_string(),
            "status": "converted",
            "output": output.display().to_string(),
            "bytes_in": bytes_in,
            "bytes_out": bytes_out,
            "width": width,
            "height": height,
            "quality": quality,
            "attempts": attempts,
            "acceptance": acceptance,
        }),
        FileOutcome::FellBack {
            output,
            bytes,
            reason,
        } => json!({
            "file": input.display().to_string(),
            "status": "fell_back",
            "output": output.as_ref().map(|p| p.display().to_string()),
            "bytes": bytes,
            "error": reason,
        }),
        FileOutcome::Skipped { reason } => json!({
            "file": input.display().to_string(),
            "status": "skipped",
            "error": reason,
        }),
        FileOutcome::Failed { reason, .. } => json!({
            "file": input.display().to_string(),
            "status": "failed",
            "error": reason,
        }),
    };

    value.to_string()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Media type implied by the file extension, passed to the compressor as
/// the caller's claim about the content.
fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}
