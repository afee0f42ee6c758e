//! H.264 encoding via an FFmpeg subprocess fed raw RGBA frames on stdin.
//!
//! The encoder writes to a temporary sibling file and renames it into place
//! only after FFmpeg exits cleanly. A failed encode never leaves a partial
//! artifact at the published path.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use cuereel_core::{CuereelError, CuereelResult, FrameBuffer};

/// Encoder that shells out to FFmpeg for H.264 encoding.
pub struct FfmpegEncoder;

impl FfmpegEncoder {
    /// Check if FFmpeg is available on the system.
    pub fn is_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Encode an ordered frame sequence (plus an optional finished audio
    /// track) to an MP4 file at `output_path`.
    ///
    /// All frames must match the given dimensions. This is a single
    /// sequential pass: frames stream to FFmpeg's stdin in order.
    pub fn encode(
        frames: &[FrameBuffer],
        audio: Option<&Path>,
        width: u32,
        height: u32,
        fps: f64,
        output_path: &Path,
    ) -> CuereelResult<()> {
        if frames.is_empty() {
            return Err(CuereelError::Encode("no frames to encode".into()));
        }

        if !Self::is_available() {
            return Err(CuereelError::Encode(
                "ffmpeg not found in PATH. Install FFmpeg: https://ffmpeg.org/download.html".into(),
            ));
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = staging_path(output_path);

        let mut cmd = Command::new("ffmpeg");
        for arg in build_encode_args(width, height, fps, audio, &tmp_path) {
            cmd.arg(arg);
        }

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CuereelError::Encode(format!("failed to start ffmpeg: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CuereelError::Encode("failed to open ffmpeg stdin".into()))?;

        for (i, frame) in frames.iter().enumerate() {
            if frame.width != width || frame.height != height {
                return Err(CuereelError::Encode(format!(
                    "frame {} has dimensions {}x{}, expected {}x{}",
                    i, frame.width, frame.height, width, height
                )));
            }
            if let Err(e) = stdin.write_all(&frame.data) {
                // Surface ffmpeg's stderr instead of a bare broken pipe.
                let output = child
                    .wait_with_output()
                    .map_err(|e| CuereelError::Encode(format!("ffmpeg process error: {}", e)))?;
                let stderr = String::from_utf8_lossy(&output.stderr);
                let _ = std::fs::remove_file(&tmp_path);
                return Err(CuereelError::Encode(format!(
                    "failed to write frame {} to ffmpeg: {}. FFmpeg stderr: {}",
                    i, e, stderr
                )));
            }
        }

        // Close stdin to signal end of input
        drop(stdin);

        let output = child
            .wait_with_output()
            .map_err(|e| CuereelError::Encode(format!("ffmpeg process error: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let _ = std::fs::remove_file(&tmp_path);
            return Err(CuereelError::Encode(format!(
                "ffmpeg failed with status {}: {}",
                output.status, stderr
            )));
        }

        // Publish atomically.
        std::fs::rename(&tmp_path, output_path)?;

        tracing::info!(
            "encoded {} frames to {} ({}x{} @ {}fps)",
            frames.len(),
            output_path.display(),
            width,
            height,
            fps
        );

        Ok(())
    }
}

/// Temporary sibling the encode streams into before the atomic rename.
fn staging_path(output_path: &Path) -> PathBuf {
    let name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output.mp4".to_string());
    output_path.with_file_name(format!(".{}.part", name))
}

/// FFmpeg argument list for one encode pass.
fn build_encode_args(
    width: u32,
    height: u32,
    fps: f64,
    audio: Option<&Path>,
    tmp_path: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into()];

    // Input 0: raw video frames from stdin
    args.extend(
        [
            "-f",
            "rawvideo",
            "-pixel_format",
            "rgba",
            "-video_size",
            &format!("{}x{}", width, height),
            "-framerate",
            &format!("{}", fps),
            "-i",
            "-",
        ]
        .map(String::from),
    );

    // Input 1: the finished (already loop-extended) audio track
    if let Some(audio_path) = audio {
        args.push("-i".into());
        args.push(audio_path.to_string_lossy().to_string());
        args.extend(["-map", "0:v", "-map", "1:a", "-c:a", "aac", "-b:a", "192k"].map(String::from));
    }

    args.extend(
        [
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-preset",
            "medium",
            "-crf",
            "23",
            "-movflags",
            "+faststart",
            "-f",
            "mp4",
        ]
        .map(String::from),
    );

    args.push(tmp_path.to_string_lossy().to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffmpeg_availability() {
        // Just checks the availability probe doesn't panic.
        let _available = FfmpegEncoder::is_available();
    }

    #[test]
    fn test_encode_empty_frames() {
        let result = FfmpegEncoder::encode(&[], None, 320, 240, 24.0, Path::new("/tmp/test.mp4"));
        assert!(result.is_err());
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        let tmp = staging_path(Path::new("/out/recap.mp4"));
        assert_eq!(tmp, PathBuf::from("/out/.recap.mp4.part"));
    }

    #[test]
    fn test_encode_args_video_only() {
        let args = build_encode_args(1280, 720, 24.0, None, Path::new("/out/.r.mp4.part"));
        assert!(args.contains(&"1280x720".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(!args.contains(&"aac".to_string()));
        assert_eq!(args.last().unwrap(), "/out/.r.mp4.part");
    }

    #[test]
    fn test_encode_args_with_audio_maps_both_streams() {
        let args = build_encode_args(
            1280,
            720,
            24.0,
            Some(Path::new("/work/audio.wav")),
            Path::new("/out/.r.mp4.part"),
        );
        assert!(args.contains(&"/work/audio.wav".to_string()));
        assert!(args.contains(&"0:v".to_string()));
        assert!(args.contains(&"1:a".to_string()));
        assert!(args.contains(&"aac".to_string()));
    }
}
