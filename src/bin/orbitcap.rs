use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use orbitcap::{
    Artifact, CaptureOutcome, CapturePreset, CaptureStudio, Direction, Easing, Fps, Generation,
    SoftwareSurface, StillFormat, SurfaceSize, TurntableFormat,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orbitcap", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single high-resolution still.
    Still(StillArgs),
    /// Capture a 360° turntable (stream formats require `ffmpeg` on PATH).
    Turntable(TurntableArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Preset JSON; flags override its values.
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Output directory (defaults to the preset's `output_dir`, then `.`).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output width.
    #[arg(long)]
    width: Option<u32>,

    /// Output height.
    #[arg(long)]
    height: Option<u32>,

    /// JPEG quality (1-100).
    #[arg(long)]
    quality: Option<u8>,

    /// Artifact file name stem.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Parser, Debug)]
struct StillArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Accumulation ticks before readback.
    #[arg(long)]
    samples: Option<u32>,

    /// Image format.
    #[arg(long, value_enum)]
    format: Option<StillFormatArg>,
}

#[derive(Parser, Debug)]
struct TurntableArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Frames per revolution.
    #[arg(long)]
    frames: Option<u64>,

    /// Whole frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<TurntableFormatArg>,

    /// Sweep direction.
    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,

    /// Sweep easing.
    #[arg(long, value_enum)]
    easing: Option<EasingArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StillFormatArg {
    Png,
    Jpeg,
    Webp,
}

impl From<StillFormatArg> for StillFormat {
    fn from(v: StillFormatArg) -> Self {
        match v {
            StillFormatArg::Png => Self::Png,
            StillFormatArg::Jpeg => Self::Jpeg,
            StillFormatArg::Webp => Self::Webp,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TurntableFormatArg {
    Mp4,
    Webm,
    PngSequence,
    JpegSequence,
}

impl From<TurntableFormatArg> for TurntableFormat {
    fn from(v: TurntableFormatArg) -> Self {
        match v {
            TurntableFormatArg::Mp4 => Self::Mp4,
            TurntableFormatArg::Webm => Self::Webm,
            TurntableFormatArg::PngSequence => Self::PngSequence,
            TurntableFormatArg::JpegSequence => Self::JpegSequence,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    Cw,
    Ccw,
}

impl From<DirectionArg> for Direction {
    fn from(v: DirectionArg) -> Self {
        match v {
            DirectionArg::Cw => Self::Clockwise,
            DirectionArg::Ccw => Self::CounterClockwise,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EasingArg {
    Linear,
    Smooth,
}

impl From<EasingArg> for Easing {
    fn from(v: EasingArg) -> Self {
        match v {
            EasingArg::Linear => Self::Linear,
            EasingArg::Smooth => Self::Smooth,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    match cli.cmd {
        Command::Still(args) => rt.block_on(cmd_still(args)),
        Command::Turntable(args) => rt.block_on(cmd_turntable(args)),
    }
}

fn load_preset(common: &CommonArgs) -> anyhow::Result<CapturePreset> {
    match &common.preset {
        Some(path) => Ok(CapturePreset::from_path(path)?),
        None => Ok(CapturePreset::default()),
    }
}

fn output_dir(common: &CommonArgs, preset: &CapturePreset) -> PathBuf {
    common
        .out
        .clone()
        .or_else(|| preset.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn check_demo_size(width: u32, height: u32) -> anyhow::Result<()> {
    let size = SurfaceSize::new(width, height)?;
    anyhow::ensure!(
        SoftwareSurface::supports(size, 1.0),
        "{width}x{height} exceeds the demo surface limit of {} pixels per side",
        SoftwareSurface::MAX_DIMENSION
    );
    Ok(())
}

fn demo_studio() -> anyhow::Result<CaptureStudio<SoftwareSurface>> {
    let size = SurfaceSize::new(640, 360)?;
    Ok(CaptureStudio::new(SoftwareSurface::new(size, 1.0)))
}

async fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let preset = load_preset(&args.common)?;
    let mut cfg = preset.still.clone();
    let common = &args.common;
    cfg.width = common.width.unwrap_or(cfg.width);
    cfg.height = common.height.unwrap_or(cfg.height);
    cfg.quality = common.quality.unwrap_or(cfg.quality);
    if let Some(name) = &common.name {
        cfg.filename_hint = name.clone();
    }
    if let Some(samples) = args.samples {
        cfg.sample_count = samples;
    }
    if let Some(format) = args.format {
        cfg.format = format.into();
    }

    check_demo_size(cfg.width, cfg.height)?;
    let studio = demo_studio()?;
    let session = studio.start_still_render(cfg)?;
    let generation = session.handle().generation;
    let outcome = run_until_ctrl_c(&studio, generation, session.run()).await;
    finish(outcome, &output_dir(common, &preset))
}

async fn cmd_turntable(args: TurntableArgs) -> anyhow::Result<()> {
    let preset = load_preset(&args.common)?;
    let mut cfg = preset.turntable.clone();
    let common = &args.common;
    cfg.width = common.width.unwrap_or(cfg.width);
    cfg.height = common.height.unwrap_or(cfg.height);
    cfg.quality = common.quality.unwrap_or(cfg.quality);
    if let Some(name) = &common.name {
        cfg.filename_hint = name.clone();
    }
    if let Some(frames) = args.frames {
        cfg.total_frames = frames;
    }
    if let Some(fps) = args.fps {
        cfg.fps = Fps::whole(fps)?;
    }
    if let Some(format) = args.format {
        cfg.format = format.into();
    }
    if let Some(direction) = args.direction {
        cfg.direction = direction.into();
    }
    if let Some(easing) = args.easing {
        cfg.easing = easing.into();
    }

    check_demo_size(cfg.width, cfg.height)?;
    let studio = demo_studio()?;
    let session = studio.start_turntable(cfg)?;
    let generation = session.handle().generation;
    let outcome = run_until_ctrl_c(&studio, generation, session.run()).await;
    finish(outcome, &output_dir(common, &preset))
}

/// Drive `run` to completion, printing progress; Ctrl-C requests cooperative cancellation.
async fn run_until_ctrl_c(
    studio: &CaptureStudio<SoftwareSurface>,
    generation: Generation,
    run: impl Future<Output = CaptureOutcome>,
) -> CaptureOutcome {
    tokio::pin!(run);
    let mut progress = studio.subscribe();
    let mut cancel_sent = false;
    loop {
        tokio::select! {
            outcome = &mut run => return outcome,
            res = tokio::signal::ctrl_c(), if !cancel_sent => {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "ctrl-c handler unavailable");
                }
                cancel_sent = true;
                if studio.cancel(generation) {
                    eprintln!("cancelling...");
                }
            }
            changed = progress.changed() => {
                if changed.is_ok() {
                    let p = *progress.borrow_and_update();
                    if p.generation == generation && p.frame > 0 {
                        eprint!("\r{:?} {} ({}%)", p.state, p.frame, p.percent);
                    }
                }
            }
        }
    }
}

fn finish(outcome: CaptureOutcome, out_dir: &Path) -> anyhow::Result<()> {
    eprintln!();
    match outcome {
        CaptureOutcome::Completed(artifact) => write_artifact(&artifact, out_dir),
        CaptureOutcome::Partial(artifact) => {
            eprintln!(
                "cancelled after {} frames, keeping partial output",
                artifact.frame_count_delivered
            );
            write_artifact(&artifact, out_dir)
        }
        CaptureOutcome::Cancelled => {
            eprintln!("cancelled, nothing written");
            Ok(())
        }
        CaptureOutcome::Superseded => anyhow::bail!("capture superseded by a newer session"),
        CaptureOutcome::Failed(kind) => anyhow::bail!("capture failed: {kind:?}"),
    }
}

fn write_artifact(artifact: &Artifact, out_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;
    let path = out_dir.join(&artifact.suggested_name);
    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("write artifact '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
