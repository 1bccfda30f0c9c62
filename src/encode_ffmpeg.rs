use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::error::{ReplayError, ReplayResult};

/// Numbered still images waiting to be encoded: `dir/frame_0000.png`, `dir/frame_0001.png`, ...
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StillSequence {
    pub dir: PathBuf,
    pub count: usize,
}

impl StillSequence {
    pub const PREFIX: &'static str = "frame_";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            count: 0,
        }
    }

    pub fn file_name(index: usize) -> String {
        format!("{}{index:04}.png", Self::PREFIX)
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(Self::file_name(index))
    }

    /// printf-style input pattern understood by ffmpeg's image2 demuxer.
    pub fn input_pattern(&self) -> PathBuf {
        self.dir.join(format!("{}%04d.png", Self::PREFIX))
    }
}

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
    pub codec: String,
    pub pix_fmt: String,
    pub preset: String,
    /// Encoder executable, looked up on PATH when not absolute.
    pub ffmpeg: PathBuf,
}

impl EncodeConfig {
    pub fn validate(&self) -> ReplayResult<()> {
        if self.fps == 0 {
            return Err(ReplayError::validation("encode fps must be non-zero"));
        }
        if self.codec.is_empty() || self.pix_fmt.is_empty() || self.preset.is_empty() {
            return Err(ReplayError::validation(
                "encode codec, pixel format and preset must be non-empty",
            ));
        }
        Ok(())
    }

    pub fn with_out_path(mut self, out_path: impl Into<PathBuf>) -> Self {
        self.out_path = out_path.into();
        self
    }

    /// Full ffmpeg argument list for encoding `seq`.
    pub fn ffmpeg_args(&self, seq: &StillSequence) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = Vec::new();
        args.push(if self.overwrite { "-y" } else { "-n" }.into());
        for a in ["-loglevel", "error", "-framerate"] {
            args.push(a.into());
        }
        args.push(self.fps.to_string().into());
        args.push("-i".into());
        args.push(seq.input_pattern().into_os_string());
        args.push("-c:v".into());
        args.push(self.codec.clone().into());
        args.push("-pix_fmt".into());
        args.push(self.pix_fmt.clone().into());
        args.push("-preset".into());
        args.push(self.preset.clone().into());
        args.push(self.out_path.clone().into_os_string());
        args
    }
}

/// H.264 / yuv420p / `fast` preset: plays back nearly everywhere.
pub fn default_mp4_config(out_path: impl Into<PathBuf>, fps: u32) -> EncodeConfig {
    EncodeConfig {
        fps,
        out_path: out_path.into(),
        overwrite: true,
        codec: "libx264".to_string(),
        pix_fmt: "yuv420p".to_string(),
        preset: "fast".to_string(),
        ffmpeg: PathBuf::from("ffmpeg"),
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    is_encoder_available(Path::new("ffmpeg"))
}

pub fn is_encoder_available(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> ReplayResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Turns a finished still sequence into a video file.
pub trait StillEncoder {
    fn encode(&mut self, seq: &StillSequence, cfg: &EncodeConfig) -> ReplayResult<()>;
}

/// Encodes by running the system `ffmpeg` binary to completion.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegEncoder;

impl StillEncoder for FfmpegEncoder {
    fn encode(&mut self, seq: &StillSequence, cfg: &EncodeConfig) -> ReplayResult<()> {
        cfg.validate()?;
        if seq.count == 0 {
            return Err(ReplayError::encode("no still frames to encode"));
        }
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(ReplayError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        // The system binary keeps native FFmpeg headers and libraries out of the build.
        let output = Command::new(&cfg.ffmpeg)
            .args(cfg.ffmpeg_args(seq))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                ReplayError::encode(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    cfg.ffmpeg.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReplayError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(default_mp4_config("out.mp4", 0).validate().is_err());

        let mut cfg = default_mp4_config("out.mp4", 2);
        assert!(cfg.validate().is_ok());
        cfg.preset.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn still_names_are_zero_padded() {
        let seq = StillSequence::new("/tmp/x");
        assert_eq!(StillSequence::file_name(7), "frame_0007.png");
        assert_eq!(seq.path_for(12), PathBuf::from("/tmp/x/frame_0012.png"));
        assert_eq!(seq.input_pattern(), PathBuf::from("/tmp/x/frame_%04d.png"));
    }

    #[test]
    fn args_select_rate_codec_pixfmt_and_preset() {
        let seq = StillSequence {
            dir: PathBuf::from("/tmp/x"),
            count: 3,
        };
        let args: Vec<String> = default_mp4_config("out/replay.mp4", 2)
            .ffmpeg_args(&seq)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args[0], "-y");
        let after = |flag: &str| {
            let i = args.iter().position(|a| a == flag).unwrap();
            args[i + 1].clone()
        };
        assert_eq!(after("-framerate"), "2");
        assert_eq!(after("-i"), "/tmp/x/frame_%04d.png");
        assert_eq!(after("-c:v"), "libx264");
        assert_eq!(after("-pix_fmt"), "yuv420p");
        assert_eq!(after("-preset"), "fast");
        assert_eq!(args.last().unwrap(), "out/replay.mp4");
    }

    #[test]
    fn no_overwrite_uses_dash_n() {
        let mut cfg = default_mp4_config("o.mp4", 2);
        cfg.overwrite = false;
        let args = cfg.ffmpeg_args(&StillSequence::new("d"));
        assert_eq!(args[0], "-n");
    }

    #[test]
    fn missing_encoder_binary_is_an_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let seq = StillSequence {
            dir: dir.path().to_path_buf(),
            count: 1,
        };
        let mut cfg = default_mp4_config(dir.path().join("out.mp4"), 2);
        cfg.ffmpeg = PathBuf::from("/definitely/not/an/encoder");

        let err = FfmpegEncoder.encode(&seq, &cfg).unwrap_err();
        assert!(matches!(err, ReplayError::Encode(_)));
    }
}
