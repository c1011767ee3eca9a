use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::error::PipelineError;
use crate::frames::{ENCODE_FRAME_PATTERN, EXTRACTED_FRAME_PATTERN};
use crate::proc;

const FFMPEG: &str = "ffmpeg";

pub const DEFAULT_FPS: u32 = 20;
pub const TRANSCODE_TIMEOUT: Duration = Duration::from_secs(600);

// Output flags for the packed video. Embedded so the binary is
// self-contained; a flag file supplied at run time replaces them.
pub const DEFAULT_PACK_FLAGS: &str = include_str!("../assets/ffmpeg-flags");

/// Packs an ordered frame directory into a video, and samples a video back
/// into frames. Both directions fail as a whole; partial output is only
/// observable by listing the destination afterwards.
pub trait Transcoder {
    fn pack(&self, frames_dir: &Path, dest: &Path) -> Result<(), PipelineError>;
    fn unpack(&self, video: &Path, dest_dir: &Path) -> Result<(), PipelineError>;
}

pub struct Ffmpeg {
    pub fps: u32,
    pub pack_flags: Vec<String>,
    pub timeout: Duration,
}

impl Ffmpeg {
    pub fn new(fps: u32, pack_flags: &str) -> Self {
        Ffmpeg {
            fps,
            pack_flags: pack_flags.split_whitespace().map(str::to_string).collect(),
            timeout: TRANSCODE_TIMEOUT,
        }
    }

    fn pack_args(&self, frames_dir: &Path, dest: &Path) -> Vec<String> {
        let pattern = frames_dir.join(ENCODE_FRAME_PATTERN);
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-framerate".to_string(),
            self.fps.to_string(),
            "-start_number".to_string(),
            "1".to_string(),
            "-i".to_string(),
            pattern.to_string_lossy().into_owned(),
        ];
        args.extend(self.pack_flags.iter().cloned());
        args.push(dest.to_string_lossy().into_owned());
        args
    }

    fn unpack_args(&self, video: &Path, dest_dir: &Path) -> Vec<String> {
        let pattern = dest_dir.join(EXTRACTED_FRAME_PATTERN);
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-vf".to_string(),
            format!("fps={}", self.fps),
            pattern.to_string_lossy().into_owned(),
        ]
    }

    fn transcode(&self, args: Vec<String>) -> Result<(), PipelineError> {
        let mut command = Command::new(FFMPEG);
        command.args(&args);

        let output = proc::run(FFMPEG, command, None, self.timeout)?;
        if !output.status.success() {
            return Err(PipelineError::Process {
                program: FFMPEG,
                detail: proc::failure_detail(output.status, &output.stderr),
            });
        }
        Ok(())
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Ffmpeg::new(DEFAULT_FPS, DEFAULT_PACK_FLAGS)
    }
}

impl Transcoder for Ffmpeg {
    fn pack(&self, frames_dir: &Path, dest: &Path) -> Result<(), PipelineError> {
        self.transcode(self.pack_args(frames_dir, dest))
    }

    fn unpack(&self, video: &Path, dest_dir: &Path) -> Result<(), PipelineError> {
        self.transcode(self.unpack_args(video, dest_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_args_shape() {
        let ffmpeg = Ffmpeg::default();
        let args = ffmpeg.pack_args(Path::new("./qr"), Path::new("out.mp4"));

        // Input pattern right after -i, destination last, template flags
        // in between.
        let input_pos = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input_pos + 1], "./qr/file-%d.png");
        assert_eq!(args.last().unwrap(), "out.mp4");
        assert!(args.contains(&"-framerate".to_string()));
        assert!(args.contains(&"20".to_string()));
        assert!(args.contains(&"libx264".to_string()));
    }

    #[test]
    fn test_unpack_args_shape() {
        let ffmpeg = Ffmpeg::new(25, DEFAULT_PACK_FLAGS);
        let args = ffmpeg.unpack_args(Path::new("in.mp4"), Path::new("./returned"));

        assert_eq!(
            args,
            vec![
                "-hide_banner",
                "-loglevel",
                "error",
                "-i",
                "in.mp4",
                "-vf",
                "fps=25",
                "./returned/%d.png",
            ]
        );
    }

    #[test]
    fn test_flag_template_splits_on_whitespace() {
        let ffmpeg = Ffmpeg::new(20, "-c:v libx264\n-crf 18\n");
        assert_eq!(ffmpeg.pack_flags, vec!["-c:v", "libx264", "-crf", "18"]);
    }
}
