use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::STANDARD};
use clap::Parser;
use omnishare_thumbnail::core::{Dimensions, ImagePayload, SizeConstraint};
use omnishare_thumbnail::{OptimizerConfig, Outcome, optimize_batch_with};
use serde_json::json;
use thumb_scale::presets::CanvasPreset;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fit images into social platform thumbnail slots:
/// exact canvas size (letterboxed, never cropped) and a maximum byte size.
#[derive(Parser, Debug)]
#[command(name = "thumbopt")]
#[command(about = "🖼️  Letterbox images into fixed-size JPEG thumbnails under a byte limit")]
#[command(long_about = "Letterbox images into fixed-size JPEG thumbnails under a byte limit.
Quality is lowered step by step until the output fits. Images that cannot be
optimized are passed through unchanged.")]
struct Args {
    /// Input image files
    #[arg(required = true, help = "Images to optimize (any format the decoder recognizes)")]
    inputs: Vec<PathBuf>,

    /// Output path (single input only)
    #[arg(short, long, help = "Output file; defaults to <input stem>.thumb.jpg")]
    output: Option<PathBuf>,

    /// Directory for generated thumbnails
    #[arg(long, help = "Write thumbnails here instead of next to each input")]
    out_dir: Option<PathBuf>,

    /// Canvas preset
    #[arg(short, long, value_enum, default_value = "hd720")]
    preset: CanvasPreset,

    /// Canvas width override
    #[arg(long, help = "Override the preset canvas width in pixels")]
    width: Option<u32>,

    /// Canvas height override
    #[arg(long, help = "Override the preset canvas height in pixels")]
    height: Option<u32>,

    /// Maximum output size
    #[arg(short = 's', long, default_value = "2MiB",
          help = "Maximum output size: 2097152, 500KiB, 2MiB, 1MB")]
    max_size: String,

    /// Starting JPEG quality
    #[arg(short, long, default_value_t = 0.85, help = "Initial quality in (0, 1]")]
    quality: f32,

    /// Quality decrement per retry
    #[arg(long, default_value_t = 0.10)]
    step: f32,

    /// Lowest quality tried
    #[arg(long, default_value_t = 0.30)]
    floor: f32,

    /// Print base64 to stdout instead of writing files
    #[arg(long, help = "Print each result as a base64 line instead of writing files")]
    base64: bool,

    /// Emit one JSON report line per input
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    if args.output.is_some() && args.inputs.len() != 1 {
        bail!("--output can only be used with a single input; use --out-dir instead");
    }

    let config = build_config(&args)?;
    config.validate()?;

    let mut payloads = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        payloads.push(ImagePayload::new(bytes));
    }

    let outcomes = optimize_batch_with(config, payloads).await?;

    let targets = if args.base64 {
        vec![None; outcomes.len()]
    } else {
        output_paths(&args, &outcomes)?.into_iter().map(Some).collect()
    };

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    for ((input, outcome), target) in args.inputs.iter().zip(outcomes).zip(targets) {
        let line = report_line(input, &outcome);
        let report = report_json(input, &outcome);
        let payload = outcome.into_payload();

        match target {
            None => writeln!(stdout, "{}", STANDARD.encode(payload.as_bytes()))?,
            Some(target) => {
                std::fs::write(&target, payload.as_bytes())
                    .with_context(|| format!("writing {}", target.display()))?;
                if !args.json {
                    writeln!(stdout, "{} -> {}", line, target.display())?;
                }
            }
        }

        if args.json {
            writeln!(stdout, "{}", report)?;
        }
    }

    Ok(())
}

/// Output file for every input, refusing to let two results share a path.
///
/// Checked before anything is written, so a collision leaves no partial output.
fn output_paths(args: &Args, outcomes: &[Outcome]) -> Result<Vec<PathBuf>> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    let mut targets = Vec::with_capacity(outcomes.len());
    for (input, outcome) in args.inputs.iter().zip(outcomes) {
        let target = output_path(
            input,
            args.output.as_deref(),
            args.out_dir.as_deref(),
            outcome.is_optimized(),
        );
        if let Some(previous) = seen.insert(target.clone(), input) {
            bail!(
                "{} and {} would both be written to {}; rename one or use separate runs",
                previous.display(),
                input.display(),
                target.display()
            );
        }
        targets.push(target);
    }
    Ok(targets)
}

/// Merge preset, overrides and limits into an optimizer configuration.
fn build_config(args: &Args) -> Result<OptimizerConfig> {
    let canvas = args.preset.to_canvas();
    let target = Dimensions::new(args.width.unwrap_or(canvas.w), args.height.unwrap_or(canvas.h));
    let max_bytes = parse_size(&args.max_size)?;
    Ok(OptimizerConfig::new(
        target,
        SizeConstraint::bytes(max_bytes),
        args.quality,
        args.step,
        args.floor,
    ))
}

/// Parse a byte size like "2MiB", "500KiB", "1MB" or "2097152".
fn parse_size(size: &str) -> Result<u64> {
    let size = size.trim();
    if let Ok(bytes) = size.parse::<u64>() {
        return Ok(bytes);
    }

    let split = size
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| anyhow::anyhow!("Invalid size format: {}", size))?;
    let (num_str, unit) = size.split_at(split);
    let num: u64 = num_str
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid number in size: {}", size))?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "b" => 1,
        "k" | "kb" => 1_000,
        "kib" => 1024,
        "m" | "mb" => 1_000_000,
        "mib" => 1024 * 1024,
        other => bail!("Invalid size unit: {}. Use B, KB, KiB, MB or MiB", other),
    };
    num.checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size too large: {}", size))
}

/// Where a result for `input` is written.
///
/// Pass-through results keep the input extension so the file type stays honest.
fn output_path(
    input: &Path,
    output: Option<&Path>,
    out_dir: Option<&Path>,
    optimized: bool,
) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "thumbnail".to_string());
    let ext = if optimized {
        "jpg".to_string()
    } else {
        input
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bin".to_string())
    };
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}.thumb.{}", stem, ext))
}

/// Human readable one-line summary of an outcome.
fn report_line(input: &Path, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Optimized(optimized) => format!(
            "{}: optimized {} -> {} at quality {} ({} bytes, {} attempt(s))",
            input.display(),
            optimized.source,
            optimized.target,
            optimized.quality,
            optimized.payload.len(),
            optimized.attempts.len()
        ),
        Outcome::Fallback { original, reason } => format!(
            "{}: kept original ({} bytes): [{}] {}",
            input.display(),
            original.len(),
            reason.category(),
            reason
        ),
    }
}

/// Machine readable report of an outcome.
fn report_json(input: &Path, outcome: &Outcome) -> serde_json::Value {
    match outcome {
        Outcome::Optimized(optimized) => json!({
            "input": input.display().to_string(),
            "outcome": "optimized",
            "source": optimized.source.to_string(),
            "target": optimized.target.to_string(),
            "quality": optimized.quality.value(),
            "bytes": optimized.payload.len(),
            "attempts": optimized
                .attempts
                .iter()
                .map(|a| json!({ "quality": a.quality.value(), "bytes": a.encoded_bytes }))
                .collect::<Vec<_>>(),
        }),
        Outcome::Fallback { original, reason } => json!({
            "input": input.display().to_string(),
            "outcome": "fallback",
            "category": reason.category(),
            "error": reason.to_string(),
            "bytes": original.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("2097152").unwrap(), 2_097_152);
        assert_eq!(parse_size("2MiB").unwrap(), 2 * 1024 * 1024);
        assert_eq!(parse_size("500KiB").unwrap(), 500 * 1024);
        assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
        assert_eq!(parse_size("64 kb").unwrap(), 64_000);
        assert!(parse_size("MiB").is_err());
        assert!(parse_size("2GiB").is_err());
        assert!(parse_size("").is_err());
    }

    #[test]
    fn test_output_path() {
        let input = Path::new("shots/frame.png");
        assert_eq!(
            output_path(input, None, None, true),
            PathBuf::from("shots/frame.thumb.jpg")
        );
        assert_eq!(
            output_path(input, None, Some(Path::new("out")), false),
            PathBuf::from("out/frame.thumb.png")
        );
        assert_eq!(
            output_path(input, Some(Path::new("x.jpg")), None, true),
            PathBuf::from("x.jpg")
        );
    }

    #[test]
    fn test_output_paths_reject_shared_stem() {
        let args = Args::parse_from(["thumbopt", "shots/shot.png", "shots/shot.jpg"]);
        let fallback = || Outcome::Fallback {
            original: ImagePayload::new(vec![0u8]),
            reason: omnishare_thumbnail::ThumbnailError::decode("x"),
        };
        // Fallbacks keep their own extensions, so these do not collide
        let targets = output_paths(&args, &[fallback(), fallback()]).unwrap();
        assert_eq!(
            targets,
            vec![
                PathBuf::from("shots/shot.thumb.png"),
                PathBuf::from("shots/shot.thumb.jpg")
            ]
        );

        let args = Args::parse_from(["thumbopt", "a/shot.png", "b/shot.png", "--out-dir", "out"]);
        let err = output_paths(&args, &[fallback(), fallback()]).unwrap_err();
        assert!(err.to_string().contains("out/shot.thumb.png"), "{err}");
    }

    #[test]
    fn test_build_config_overrides() {
        let args = Args::parse_from([
            "thumbopt",
            "in.png",
            "--preset",
            "square1080",
            "--height",
            "900",
            "--max-size",
            "1MiB",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.target, Dimensions::new(1080, 900));
        assert_eq!(config.max_bytes.max_bytes(), 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_report_json_fallback() {
        let outcome = Outcome::Fallback {
            original: ImagePayload::new(vec![1u8, 2, 3]),
            reason: omnishare_thumbnail::ThumbnailError::decode("unrecognized image format"),
        };
        let value = report_json(Path::new("a.png"), &outcome);
        assert_eq!(value["outcome"], "fallback");
        assert_eq!(value["input"], "a.png");
        assert_eq!(value["category"], "decode");
        assert_eq!(value["bytes"], 3);
    }
}
