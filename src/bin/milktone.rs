use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use milktone::{
    FilterConfig, Niceness, PaletteVariant, PartitionPolicy, Pipeline, PipelineConfig, Progress,
    RunStats,
};

#[derive(Parser, Debug)]
#[command(name = "milktone", version, about = "Three-colour dithered video filter")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter a whole video (requires `ffmpeg` and `ffprobe` on PATH).
    Video(VideoArgs),
    /// Filter a directory of frame images.
    Frames(FramesArgs),
    /// Filter a single image.
    Image(ImageArgs),
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Palette variant.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
    palette: Option<u8>,

    /// Blend boundary bands stochastically; `--effect=false` turns it off over a config file.
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    effect: Option<bool>,

    /// Lossy JPEG recompression before filtering; quality is `100 - Q`.
    #[arg(long, value_name = "Q", value_parser = clap::value_parser!(u8).range(0..=100))]
    recompress: Option<u8>,

    /// Worker threads (defaults to available parallelism).
    #[arg(long)]
    workers: Option<usize>,

    /// Seed for reproducible blending.
    #[arg(long)]
    seed: Option<u64>,

    /// Spread the remainder over the first workers instead of the last; `--balanced=false`
    /// restores the naive split.
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    balanced: Option<bool>,
}

impl FilterArgs {
    fn apply(&self, cfg: &mut FilterConfig) -> anyhow::Result<()> {
        if let Some(p) = self.palette {
            cfg.palette = PaletteVariant::from_selector(p)?;
        }
        if let Some(effect) = self.effect {
            cfg.effect = effect;
        }
        if let Some(q) = self.recompress {
            cfg.recompress = Some(Niceness::new(q)?);
        }
        if let Some(w) = self.workers {
            cfg.workers = w;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(balanced) = self.balanced {
            cfg.partition = if balanced {
                PartitionPolicy::Balanced
            } else {
                PartitionPolicy::Naive
            };
        }
        cfg.validate()?;
        Ok(())
    }
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Source video.
    source: PathBuf,

    /// Output video path; defaults to `<stem>_filtered<ext>` next to the source.
    #[arg(long)]
    out: Option<PathBuf>,

    /// JSON config; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Resize extracted frames, e.g. `640x360`.
    #[arg(long, value_name = "WxH", value_parser = parse_scale)]
    scale: Option<(u32, u32)>,

    /// Directory for intermediate frames.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Keep intermediate frames after the run.
    #[arg(long)]
    keep_frames: bool,

    /// Refuse to overwrite an existing output.
    #[arg(long)]
    no_overwrite: bool,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Directory of frame images.
    #[arg(long = "in")]
    in_dir: PathBuf,

    /// Output directory; file names are kept.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Parser, Debug)]
struct ImageArgs {
    /// Input image.
    path: PathBuf,

    /// Output path; defaults to `filtered_<name>` next to the input.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    filter: FilterArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Video(args) => cmd_video(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Image(args) => cmd_image(args),
    }
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let mut cfg = match args.config.as_deref() {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    cfg.source = args.source;
    if args.out.is_some() {
        cfg.output = args.out;
    }
    if args.fps.is_some() {
        cfg.target_fps = args.fps;
    }
    if args.scale.is_some() {
        cfg.scale = args.scale;
    }
    if args.work_dir.is_some() {
        cfg.work_dir = args.work_dir;
    }
    cfg.keep_frames |= args.keep_frames;
    if args.no_overwrite {
        cfg.overwrite = false;
    }
    args.filter.apply(&mut cfg.filter)?;

    let pipeline = Pipeline::ffmpeg();
    let report = with_progress_log(pipeline.progress(), || pipeline.run(&cfg))
        .with_context(|| format!("filter video '{}'", cfg.source.display()))?;

    print_skipped(&report.stats);
    if let Some(dir) = report.work_dir.as_deref() {
        eprintln!("kept frames in {}", dir.display());
    }
    eprintln!("wrote {}", report.output.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let mut cfg = FilterConfig::default();
    args.filter.apply(&mut cfg)?;

    let pipeline = Pipeline::ffmpeg();
    let stats = with_progress_log(pipeline.progress(), || {
        pipeline.filter_frames(&args.in_dir, &args.out, &cfg)
    })
    .with_context(|| format!("filter frames in '{}'", args.in_dir.display()))?;

    print_skipped(&stats);
    eprintln!(
        "wrote {} frames to {}",
        stats.frames_written,
        args.out.display()
    );
    Ok(())
}

fn cmd_image(args: ImageArgs) -> anyhow::Result<()> {
    let mut cfg = FilterConfig::default();
    args.filter.apply(&mut cfg)?;

    let out = milktone::filter_image_file(&args.path, args.out.as_deref(), &cfg)
        .with_context(|| format!("filter image '{}'", args.path.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

/// Run `f` while a side thread logs filter progress every couple of seconds.
fn with_progress_log<T>(progress: Progress, f: impl FnOnce() -> T) -> T {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    std::thread::scope(|s| {
        s.spawn(move || {
            let mut last = 0;
            let tick = Duration::from_secs(2);
            while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(tick) {
                let (n, total) = (progress.get(), progress.total());
                if total > 0 && n != last {
                    tracing::info!(done = n, total, "filtering");
                    last = n;
                }
            }
        });
        let out = f();
        drop(stop_tx);
        out
    })
}

fn print_skipped(stats: &RunStats) {
    if stats.skipped.is_empty() {
        return;
    }
    eprintln!(
        "skipped {} of {} frames that could not be decoded:",
        stats.frames_skipped, stats.frames_total
    );
    for name in &stats.skipped {
        eprintln!("  {name}");
    }
}

fn parse_scale(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("bad width in '{s}'"))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("bad height in '{s}'"))?;
    if w == 0 || h == 0 {
        return Err(format!("scale must be non-zero, got '{s}'"));
    }
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/bin/milktone.rs"]
mod tests;
