use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    encode_ffmpeg::{EncodeConfig, StillEncoder, StillSequence, default_mp4_config},
    error::ReplayResult,
    model::Replay,
    render::FrameRenderer,
};

/// How long the winner frame is held at the end of the video.
pub const WINNER_HOLD_SECS: u32 = 2;
pub const DEFAULT_FPS: u32 = 2;

#[derive(Clone, Debug)]
pub struct VideoOpts {
    pub fps: u32,
    pub overwrite: bool,
    /// Parent for the scratch directory; the system temp dir when `None`.
    pub temp_root: Option<PathBuf>,
    pub ffmpeg: PathBuf,
}

impl Default for VideoOpts {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            overwrite: true,
            temp_root: None,
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

impl VideoOpts {
    pub fn encode_config(&self, out_path: &Path) -> EncodeConfig {
        let mut cfg = default_mp4_config(out_path, self.fps);
        cfg.overwrite = self.overwrite;
        cfg.ffmpeg = self.ffmpeg.clone();
        cfg
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The replay had no ticks; nothing was written.
    NothingToRender,
    Written { path: PathBuf, frames: usize },
}

/// Number of stills `write_stills` produces for `replay` at `fps`.
pub fn expected_still_count(replay: &Replay, fps: u32) -> usize {
    if replay.history.is_empty() {
        return 0;
    }
    let hold = if replay.winner().is_some() {
        hold_frames(fps)
    } else {
        0
    };
    replay.history.len().saturating_add(hold)
}

/// Stills showing the winner banner at `fps`. Zero when `fps` is zero.
pub fn hold_frames(fps: u32) -> usize {
    usize::try_from(fps.saturating_mul(WINNER_HOLD_SECS)).unwrap_or(usize::MAX)
}

/// Render every tick (plus the held winner frame, if any) into numbered PNGs under `dir`.
pub fn write_stills(
    replay: &Replay,
    renderer: &FrameRenderer,
    dir: &Path,
    fps: u32,
) -> ReplayResult<StillSequence> {
    let mut seq = StillSequence::new(dir);
    let total = replay.history.len();

    for (i, tick) in replay.history.iter().enumerate() {
        let frame = renderer.render_tick(tick, &replay.players, replay.grid_size)?;
        frame.save_png(&seq.path_for(seq.count))?;
        seq.count += 1;
        tracing::debug!(frame = i + 1, total, tick = tick.tick, "rendered frame");
    }

    let hold = hold_frames(fps);
    if let (Some(winner), Some(last)) = (replay.winner(), replay.history.last())
        && hold > 0
    {
        let frame = renderer.render_winner_frame(last, &replay.players, replay.grid_size, winner)?;
        let first = seq.path_for(seq.count);
        frame.save_png(&first)?;
        seq.count += 1;

        for _ in 1..hold {
            let dst = seq.path_for(seq.count);
            std::fs::copy(&first, &dst).with_context(|| {
                format!("copy winner frame to '{}'", dst.display())
            })?;
            seq.count += 1;
        }
        tracing::debug!(%winner, hold, "appended winner frames");
    }

    Ok(seq)
}

/// Render `replay` to a video at `out_path`.
///
/// An empty history is a no-op. Stills live in a scratch directory that is removed on every
/// return path, including encoder failure.
#[tracing::instrument(skip(replay, renderer, encoder), fields(ticks = replay.history.len()))]
pub fn render_replay_to_video(
    replay: &Replay,
    out_path: &Path,
    opts: &VideoOpts,
    renderer: &FrameRenderer,
    encoder: &mut dyn StillEncoder,
) -> ReplayResult<RenderOutcome> {
    if replay.history.is_empty() {
        tracing::info!("no history data to render");
        return Ok(RenderOutcome::NothingToRender);
    }
    replay.validate()?;

    let cfg = opts.encode_config(out_path);
    cfg.validate()?;

    let scratch = scratch_dir(opts.temp_root.as_deref())?;

    tracing::info!(frames = replay.history.len(), "generating frames");
    let seq = write_stills(replay, renderer, scratch.path(), opts.fps)?;

    tracing::info!(stills = seq.count, "compiling video");
    encoder.encode(&seq, &cfg)?;

    tracing::info!(path = %out_path.display(), "video saved");
    Ok(RenderOutcome::Written {
        path: out_path.to_path_buf(),
        frames: seq.count,
    })
}

fn scratch_dir(root: Option<&Path>) -> ReplayResult<tempfile::TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("grid-royale-frames-");
    let dir = match root {
        Some(root) => builder
            .tempdir_in(root)
            .with_context(|| format!("create scratch dir in '{}'", root.display()))?,
        None => builder.tempdir().context("create scratch dir")?,
    };
    Ok(dir)
}
