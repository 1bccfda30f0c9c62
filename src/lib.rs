#![forbid(unsafe_code)]

pub mod compile;
pub mod core;
pub mod encode_ffmpeg;
pub mod error;
pub mod fetch;
pub mod fonts;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod raster;
pub mod render;
pub mod style;

pub use compile::{DrawOp, FramePlan, compile_frame, compile_winner_banner};
pub use core::{Canvas, Rgba8};
pub use encode_ffmpeg::{
    EncodeConfig, FfmpegEncoder, StillEncoder, StillSequence, default_mp4_config,
    is_ffmpeg_on_path,
};
pub use error::{ReplayError, ReplayResult};
pub use fetch::{BackendQuery, load_replay_file};
pub use fonts::{FontSet, FontSources};
pub use layout::GridLayout;
pub use model::{Direction, Event, Player, PlayerState, Replay, Tick, Zone};
pub use pipeline::{
    DEFAULT_FPS, RenderOutcome, VideoOpts, WINNER_HOLD_SECS, expected_still_count,
    render_replay_to_video, write_stills,
};
pub use render::{FrameRGBA, FrameRenderer};
