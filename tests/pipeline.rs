use std::path::{Path, PathBuf};

use grid_royale_replay::{
    EncodeConfig, FfmpegEncoder, FontSet, FrameRenderer, Player, PlayerState, RenderOutcome,
    Replay, ReplayError, ReplayResult, StillEncoder, StillSequence, Tick, VideoOpts,
    expected_still_count, is_ffmpeg_on_path, render_replay_to_video,
};

/// Records what it was asked to encode and checks the stills exist at that moment.
#[derive(Default)]
struct RecordingEncoder {
    calls: Vec<StillSequence>,
    fail: bool,
}

impl StillEncoder for RecordingEncoder {
    fn encode(&mut self, seq: &StillSequence, _cfg: &EncodeConfig) -> ReplayResult<()> {
        for i in 0..seq.count {
            assert!(seq.path_for(i).is_file(), "still {i} missing at encode time");
        }
        self.calls.push(seq.clone());
        if self.fail {
            return Err(ReplayError::encode("ffmpeg exited with status 1: boom"));
        }
        Ok(())
    }
}

fn renderer() -> FrameRenderer {
    FrameRenderer::new(FontSet::empty())
}

fn sample_replay(ticks: usize, winner: Option<&str>) -> Replay {
    let players = vec![
        Player {
            id: "a".into(),
            name: "Alpha".into(),
        },
        Player {
            id: "b".into(),
            name: "Bravo".into(),
        },
    ];
    let history = (0..ticks)
        .map(|i| Tick {
            tick: i as i64,
            players: vec![
                PlayerState {
                    bot_id: "a".into(),
                    x: i as i64 % 5,
                    y: 1,
                    hp: Some(3),
                    alive: Some(true),
                },
                PlayerState {
                    bot_id: "b".into(),
                    x: 3,
                    y: 3,
                    hp: Some(0),
                    alive: Some(i == 0),
                },
            ],
            ..Tick::default()
        })
        .collect();

    Replay {
        history,
        players,
        grid_size: 5,
        winner: winner.map(str::to_owned),
    }
}

fn opts_in(root: &Path) -> VideoOpts {
    VideoOpts {
        temp_root: Some(root.to_path_buf()),
        ..VideoOpts::default()
    }
}

fn has_libx264() -> bool {
    std::process::Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).contains("libx264"))
        .unwrap_or(false)
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn empty_history_is_a_clean_no_op() {
    let work = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let out = work.path().join("out.mp4");
    let mut encoder = RecordingEncoder::default();

    let outcome = render_replay_to_video(
        &Replay::default(),
        &out,
        &opts_in(scratch.path()),
        &renderer(),
        &mut encoder,
    )
    .unwrap();

    assert_eq!(outcome, RenderOutcome::NothingToRender);
    assert!(encoder.calls.is_empty());
    assert!(!out.exists());
    assert!(dir_is_empty(scratch.path()));
}

#[test]
fn winner_adds_two_seconds_of_held_frames() {
    let work = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let out = work.path().join("out.mp4");
    let replay = sample_replay(6, Some("Alpha"));
    let mut encoder = RecordingEncoder::default();

    let outcome = render_replay_to_video(
        &replay,
        &out,
        &opts_in(scratch.path()),
        &renderer(),
        &mut encoder,
    )
    .unwrap();

    assert_eq!(encoder.calls.len(), 1);
    assert_eq!(encoder.calls[0].count, 6 + 4);
    assert_eq!(expected_still_count(&replay, 2), 10);
    assert_eq!(
        outcome,
        RenderOutcome::Written {
            path: out.clone(),
            frames: 10
        }
    );

    assert!(!encoder.calls[0].dir.exists());
    assert!(dir_is_empty(scratch.path()));
}

#[test]
fn no_winner_means_one_still_per_tick() {
    let scratch = tempfile::tempdir().unwrap();
    let mut encoder = RecordingEncoder::default();

    render_replay_to_video(
        &sample_replay(3, None),
        Path::new("unused.mp4"),
        &opts_in(scratch.path()),
        &renderer(),
        &mut encoder,
    )
    .unwrap();

    assert_eq!(encoder.calls[0].count, 3);
}

#[test]
fn encoder_failure_propagates_and_cleans_up() {
    let work = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let out = work.path().join("out.mp4");
    let mut encoder = RecordingEncoder {
        fail: true,
        ..RecordingEncoder::default()
    };

    let err = render_replay_to_video(
        &sample_replay(2, Some("Bravo")),
        &out,
        &opts_in(scratch.path()),
        &renderer(),
        &mut encoder,
    )
    .unwrap_err();

    assert!(matches!(err, ReplayError::Encode(_)));
    assert!(!encoder.calls[0].dir.exists());
    assert!(dir_is_empty(scratch.path()));
    assert!(!out.exists());
}

#[test]
fn missing_ffmpeg_binary_cleans_up() {
    let work = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let opts = VideoOpts {
        ffmpeg: PathBuf::from("/definitely/not/ffmpeg"),
        ..opts_in(scratch.path())
    };

    let err = render_replay_to_video(
        &sample_replay(2, None),
        &work.path().join("out.mp4"),
        &opts,
        &renderer(),
        &mut FfmpegEncoder,
    )
    .unwrap_err();

    assert!(matches!(err, ReplayError::Encode(_)));
    assert!(dir_is_empty(scratch.path()));
}

#[test]
fn invalid_grid_size_is_rejected_before_rendering() {
    let scratch = tempfile::tempdir().unwrap();
    let mut replay = sample_replay(1, None);
    replay.grid_size = 0;
    let mut encoder = RecordingEncoder::default();

    let err = render_replay_to_video(
        &replay,
        Path::new("unused.mp4"),
        &opts_in(scratch.path()),
        &renderer(),
        &mut encoder,
    )
    .unwrap_err();

    assert!(matches!(err, ReplayError::Validation(_)));
    assert!(encoder.calls.is_empty());
}

#[test]
fn ffmpeg_writes_mp4_when_available() {
    if !is_ffmpeg_on_path() || !has_libx264() {
        eprintln!("skipping: ffmpeg with libx264 not on PATH");
        return;
    }

    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("nested").join("replay.mp4");
    let outcome = render_replay_to_video(
        &sample_replay(3, Some("Alpha")),
        &out,
        &VideoOpts::default(),
        &renderer(),
        &mut FfmpegEncoder,
    )
    .unwrap();

    assert!(matches!(outcome, RenderOutcome::Written { frames: 7, .. }));
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}
