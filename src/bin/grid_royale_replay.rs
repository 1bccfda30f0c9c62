use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, error::ErrorKind};
use grid_royale_replay::{
    BackendQuery, DEFAULT_FPS, FfmpegEncoder, FontSources, FrameRenderer, RenderOutcome, Replay,
    VideoOpts, encode_ffmpeg::ensure_parent_dir, load_replay_file, render_replay_to_video,
};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(
    name = "grid-royale-replay",
    version,
    about = "Render a Grid Royale match replay to an MP4 video (requires `ffmpeg` on PATH)"
)]
struct Cli {
    /// Match to render.
    match_id: String,

    /// Output path. Defaults to `replay_<MATCH_ID>.mp4` (`.png` with --still).
    output: Option<PathBuf>,

    /// Video frame rate; one tick per frame.
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Read the replay from a JSON file instead of querying the backend.
    #[arg(long)]
    replay_file: Option<PathBuf>,

    /// Working directory for the backend query (the backend project root).
    #[arg(long)]
    backend_dir: Option<PathBuf>,

    /// Write a single PNG of this history index instead of a video.
    #[arg(long)]
    still: Option<usize>,

    /// Fail instead of replacing an existing output file.
    #[arg(long)]
    no_overwrite: bool,

    /// Encoder executable.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Directory holding DejaVuSans.ttf and DejaVuSans-Bold.ttf.
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Print diagnostics about font resolution (family, fallback, SHA-256 of font files).
    #[arg(long)]
    dump_fonts: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    init_tracing();

    let font_sources = cli
        .font_dir
        .as_deref()
        .map(FontSources::in_dir)
        .unwrap_or_default();
    let renderer = FrameRenderer::with_font_sources(&font_sources);
    if cli.dump_fonts {
        dump_font_diagnostics(&font_sources, &renderer);
    }

    let Some(replay) = obtain_replay(&cli)? else {
        eprintln!("failed to fetch replay data");
        return Ok(());
    };

    match cli.still {
        Some(index) => cmd_still(&cli, &replay, &renderer, index),
        None => cmd_video(&cli, &replay, &renderer),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn obtain_replay(cli: &Cli) -> anyhow::Result<Option<Replay>> {
    if let Some(path) = &cli.replay_file {
        let replay = load_replay_file(path)
            .with_context(|| format!("load replay file '{}'", path.display()))?;
        return Ok(Some(replay));
    }

    let mut query = BackendQuery::default();
    if let Some(dir) = &cli.backend_dir {
        query = query.with_cwd(dir);
    }
    tracing::info!(match_id = %cli.match_id, "fetching replay");
    Ok(query.fetch_replay(&cli.match_id))
}

fn default_output(match_id: &str, ext: &str) -> PathBuf {
    PathBuf::from(format!("replay_{match_id}.{ext}"))
}

fn cmd_video(cli: &Cli, replay: &Replay, renderer: &FrameRenderer) -> anyhow::Result<()> {
    let out = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.match_id, "mp4"));

    let opts = VideoOpts {
        fps: cli.fps,
        overwrite: !cli.no_overwrite,
        ffmpeg: cli.ffmpeg.clone(),
        ..VideoOpts::default()
    };

    let outcome = render_replay_to_video(replay, &out, &opts, renderer, &mut FfmpegEncoder)
        .with_context(|| format!("render replay to '{}'", out.display()))?;

    match outcome {
        RenderOutcome::NothingToRender => eprintln!("no history data to render"),
        RenderOutcome::Written { path, frames } => {
            eprintln!("wrote {} ({frames} frames)", path.display())
        }
    }
    Ok(())
}

fn cmd_still(
    cli: &Cli,
    replay: &Replay,
    renderer: &FrameRenderer,
    index: usize,
) -> anyhow::Result<()> {
    replay.validate()?;
    let tick = replay.history.get(index).with_context(|| {
        format!(
            "history index {index} out of range (replay has {} ticks)",
            replay.history.len()
        )
    })?;

    let out = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.match_id, "png"));
    if cli.no_overwrite && out.exists() {
        anyhow::bail!("output file '{}' already exists", out.display());
    }
    ensure_parent_dir(&out)?;

    let frame = renderer.render_tick(tick, &replay.players, replay.grid_size)?;
    frame.save_png(&out)?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn dump_font_diagnostics(sources: &FontSources, renderer: &FrameRenderer) {
    let fonts = renderer.fonts();
    eprintln!("font diagnostics:");
    eprintln!("  family:   {}", fonts.family());
    eprintln!("  fallback: {}", fonts.is_fallback());
    eprintln!("  faces:    {}", fonts.face_count());
    for (role, path) in [("bold", &sources.bold), ("regular", &sources.regular)] {
        eprintln!("  {role}:");
        eprintln!("    path:   {}", path.display());
        eprintln!("    sha256: {}", file_sha256(path));
    }
}

fn file_sha256(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => sha256_hex(&bytes),
        Err(e) => format!("<unreadable: {e}>"),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
