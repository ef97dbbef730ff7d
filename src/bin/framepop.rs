use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "framepop", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an unlock/lock sequence as numbered PNG frames.
    Render(RenderArgs),
    /// Print subject bounds and derived geometry as JSON.
    Bounds(BoundsArgs),
    /// Write one PNG preview per clip shape.
    Icons(IconsArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input photo.
    #[arg(long)]
    image: PathBuf,

    /// Precomputed matte; without it the mask pipeline runs.
    #[arg(long)]
    matte: Option<PathBuf>,

    /// Scene config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mask pipeline options JSON.
    #[arg(long)]
    mask_opts: Option<PathBuf>,

    /// Screen size as WIDTHxHEIGHT.
    #[arg(long, default_value = "1080x2340", value_parser = parse_extent)]
    screen: framepop::Extent,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 90)]
    frames: u64,

    /// Frame at which the unlock event fires.
    #[arg(long, default_value_t = 0)]
    unlock_at: u64,

    /// Frame at which the lock event fires.
    #[arg(long)]
    lock_at: Option<u64>,

    /// Write every Nth frame.
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct BoundsArgs {
    /// Input photo; only its dimensions are used.
    #[arg(long)]
    image: PathBuf,

    /// Matte to scan.
    #[arg(long)]
    matte: PathBuf,

    /// Scene config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Screen size as WIDTHxHEIGHT.
    #[arg(long, default_value = "1080x2340", value_parser = parse_extent)]
    screen: framepop::Extent,
}

#[derive(Parser, Debug)]
struct IconsArgs {
    /// Icon side in pixels.
    #[arg(long, default_value_t = 96)]
    size: u32,

    /// Fill color as 0xAARRGGBB.
    #[arg(long, default_value = "0xFFFFFFFF", value_parser = parse_argb)]
    color: u32,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Bounds(args) => cmd_bounds(args),
        Command::Icons(args) => cmd_icons(args),
    }
}

fn parse_extent(s: &str) -> Result<framepop::Extent, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    framepop::Extent::non_empty(w, h).map_err(|e| e.to_string())
}

fn parse_argb(s: &str) -> Result<u32, String> {
    let hex = s.trim().trim_start_matches("0x").trim_start_matches('#');
    u32::from_str_radix(hex, 16).map_err(|e| format!("color '{s}': {e}"))
}

fn read_config(path: Option<&Path>) -> anyhow::Result<framepop::SceneConfig> {
    match path {
        Some(p) => Ok(framepop::SceneConfig::from_path(p)?),
        None => Ok(framepop::SceneConfig::default()),
    }
}

fn read_mask_opts(path: Option<&Path>) -> anyhow::Result<framepop::MaskPipelineOpts> {
    let Some(path) = path else {
        return Ok(framepop::MaskPipelineOpts::default());
    };
    let f = std::fs::File::open(path)
        .with_context(|| format!("open mask options '{}'", path.display()))?;
    Ok(framepop::MaskPipelineOpts::from_reader(std::io::BufReader::new(f))?)
}

fn create_dir(path: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("create output dir '{}'", path.display()))
}

fn write_png(surface: &framepop::FrameSurface, path: &Path) -> anyhow::Result<()> {
    surface
        .to_rgba_image()?
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.every > 0, "--every must be > 0");
    let cfg = read_config(args.config.as_deref())?;
    let image = framepop::load_image(&args.image)?;
    let matte = args
        .matte
        .as_deref()
        .map(framepop::load_matte)
        .transpose()?;

    // No inference backend is linked into the CLI; without a matte the pipeline falls back.
    let pipeline = framepop::MaskPipeline::new(read_mask_opts(args.mask_opts.as_deref())?)?;
    let session = pipeline.session(Arc::new(framepop::UnavailableRuntime));
    let mut worker = framepop::MaskWorker::spawn(pipeline, session)?;
    worker.submit(image, matte)?;
    let scene = worker
        .wait_latest(Duration::from_secs(60))
        .context("mask worker produced no scene")?;
    if !scene.inferred {
        tracing::info!("using precomputed matte");
    }

    create_dir(&args.out)?;
    let mut surface = framepop::FrameSurface::new(args.screen)?;
    let mut rl = framepop::RenderLoop::new(cfg.animation_variant);
    rl.install_scene(scene);

    // Simulated clock: exactly one frame interval per tick.
    let start = Instant::now();
    let mut written = 0u64;
    for i in 0..args.frames {
        if i == args.unlock_at {
            rl.on_unlock();
        }
        if args.lock_at == Some(i) {
            rl.on_lock();
        }
        let now = start + framepop::tunables::FRAME_INTERVAL * u32::try_from(i)?;
        let outcome = rl.tick(now, &cfg, &mut surface);
        if outcome != framepop::TickOutcome::Rendered || i % args.every != 0 {
            continue;
        }
        write_png(&surface, &args.out.join(format!("frame_{i:05}.png")))?;
        written += 1;
    }

    let state = rl.engine().state();
    tracing::info!(
        written,
        progress = state.progress,
        settled = rl.engine().is_settled(),
        "render finished"
    );
    eprintln!("wrote {written} frames to {}", args.out.display());
    Ok(())
}

#[derive(serde::Serialize)]
struct BoundsReport {
    bounds: framepop::SubjectBounds,
    geometry: framepop::UnifiedGeometry,
}

fn cmd_bounds(args: BoundsArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    let image = framepop::load_image(&args.image)?;
    let matte = framepop::load_matte(&args.matte)?;

    let bounds =
        framepop::calculate_subject_bounds(&matte, image.extent(), cfg.subject_padding_scale);
    let geometry =
        framepop::derive_unified_geometry(image.extent(), args.screen, Some(&matte), &cfg)?;
    let json = serde_json::to_string_pretty(&BoundsReport { bounds, geometry })
        .context("serialize bounds report")?;
    println!("{json}");
    Ok(())
}

fn cmd_icons(args: IconsArgs) -> anyhow::Result<()> {
    create_dir(&args.out)?;
    for kind in framepop::ShapeKind::ALL {
        let surface = framepop::render_icon(kind, args.size, args.color)?;
        let path = args.out.join(format!("{}.png", kind.name()));
        write_png(&surface, &path)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
