use clap::{Args, Parser};
use cutitnow::adapters::ffmpeg::{FfmpegCutter, FfmpegProbe, Toolchain};
use cutitnow::application::PreparedSplit;
use cutitnow::config::normalize_extension;
use cutitnow::domain::layout::{output_extension, part_file_name};
use cutitnow::domain::timecode::format_timestamp;
use cutitnow::{SplitConfig, SplitError, SplitRequest, SplitResult, SplitService, SplitterConfig};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "cutitnow")]
#[command(about = "Split a video into parts without re-encoding", long_about = None)]
#[command(version)]
struct Cli {
    /// Video file to split
    video: PathBuf,

    #[command(flatten)]
    mode: Mode,

    /// Where to write the parts (defaults to <name>_parts next to the video)
    #[arg(long, short)]
    output_dir: Option<PathBuf>,

    /// Print the plan without cutting anything
    #[arg(long)]
    dry_run: bool,

    /// Print the dry-run plan as JSON
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// ffmpeg executable
    #[arg(long, env = "FFMPEG_PATH")]
    ffmpeg: Option<PathBuf>,

    /// ffprobe executable
    #[arg(long, env = "FFPROBE_PATH")]
    ffprobe: Option<PathBuf>,

    /// Directory holding bundled ffmpeg/ffprobe binaries
    #[arg(long, env = "CUTITNOW_ASSETS_DIR")]
    assets_dir: Option<PathBuf>,

    /// Extension for parts when the video has none
    #[arg(long, env = "CUTITNOW_DEFAULT_EXTENSION")]
    default_extension: Option<String>,
}

/// Exactly one way of splitting per run.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Mode {
    /// Split into N equal parts (at least 2)
    #[arg(long, value_name = "N")]
    parts: Option<usize>,

    /// Split into parts of roughly this many megabytes
    #[arg(long, value_name = "MB")]
    size_mb: Option<f64>,

    /// Split into parts of this many minutes
    #[arg(long, value_name = "MINUTES")]
    minutes: Option<f64>,

    /// Split into parts of this many seconds
    #[arg(long, value_name = "SECONDS")]
    seconds: Option<f64>,
}

impl Mode {
    fn split_config(&self) -> SplitResult<SplitConfig> {
        let config = match (self.parts, self.size_mb, self.minutes, self.seconds) {
            (Some(count), _, _, _) => SplitConfig::ByPartCount { count },
            (_, Some(target_size_mb), _, _) => SplitConfig::ByTargetSize { target_size_mb },
            (_, _, Some(minutes), _) => SplitConfig::ByTargetDuration {
                target_duration_seconds: minutes * 60.0,
            },
            (_, _, _, Some(seconds)) => SplitConfig::ByTargetDuration {
                target_duration_seconds: seconds,
            },
            (None, None, None, None) => {
                return Err(SplitError::InvalidParameter(
                    "one of --parts, --size-mb, --minutes or --seconds is required".to_string(),
                ));
            }
        };
        Ok(config)
    }
}

impl Cli {
    fn apply_to(&self, config: &mut SplitterConfig) {
        if let Some(path) = &self.ffmpeg {
            config.ffmpeg_path = Some(path.clone());
        }
        if let Some(path) = &self.ffprobe {
            config.ffprobe_path = Some(path.clone());
        }
        if let Some(dir) = &self.assets_dir {
            config.assets_dir = dir.clone();
        }
        if let Some(ext) = &self.default_extension {
            config.default_extension = normalize_extension(ext);
        }
    }
}

#[derive(Serialize)]
struct DryRun<'a> {
    source: &'a Path,
    output_dir: &'a Path,
    #[serde(flatten)]
    prepared: PlanView<'a>,
}

#[derive(Serialize)]
struct PlanView<'a> {
    metadata: &'a cutitnow::VideoMetadata,
    plan: &'a cutitnow::SegmentationPlan,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Loads .env before clap reads env-backed flags
    let mut config = SplitterConfig::from_env();
    init_logging();

    let cli = Cli::parse();
    cli.apply_to(&mut config);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: SplitterConfig) -> SplitResult<()> {
    let toolchain = Toolchain::resolve(&config).await?;
    let service = Arc::new(
        SplitService::new(
            FfmpegProbe::from_toolchain(&toolchain),
            FfmpegCutter::new(toolchain.ffmpeg.clone()),
        )
        .with_default_extension(config.default_extension.clone()),
    );

    let mut request = SplitRequest::new(cli.video.clone(), cli.mode.split_config()?);
    if let Some(dir) = &cli.output_dir {
        request = request.with_output_dir(dir);
    }

    if cli.dry_run {
        let quiet = cli.json;
        let prepared = service
            .prepare(&request, &|message: &str| {
                if !quiet {
                    println!("{}", message);
                }
            })
            .await?;
        return print_plan(&request, &prepared, &config.default_extension, cli.json);
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let handle = service.spawn(request, move |message: &str| {
        let _ = tx.send(message.to_string());
    });

    while let Some(message) = rx.recv().await {
        println!("{}", message);
    }

    let report = handle
        .await
        .map_err(|e| SplitError::Io(io::Error::other(format!("Task failed: {}", e))))??;

    println!("Video successfully cut into parts!");
    println!("Output directory: {}", report.output_dir.display());
    Ok(())
}

fn print_plan(
    request: &SplitRequest,
    prepared: &PreparedSplit,
    default_extension: &str,
    json: bool,
) -> SplitResult<()> {
    if json {
        let dry_run = DryRun {
            source: &request.source,
            output_dir: &prepared.output_dir,
            prepared: PlanView {
                metadata: &prepared.metadata,
                plan: &prepared.plan,
            },
        };
        let text = serde_json::to_string_pretty(&dry_run).map_err(io::Error::from)?;
        println!("{}", text);
        return Ok(());
    }

    let ext = output_extension(&request.source, default_extension);
    println!(
        "{} parts in {}",
        prepared.plan.segment_count,
        prepared.output_dir.display()
    );
    for segment in prepared.plan.iter() {
        let length = segment
            .length_seconds
            .map(format_timestamp)
            .unwrap_or_else(|| String::from("to end"));
        println!(
            "  {}  from {}  length {}",
            part_file_name(segment.part_number(), &ext),
            format_timestamp(segment.start_offset_seconds),
            length
        );
    }
    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
