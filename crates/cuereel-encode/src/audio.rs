//! Audio probing and loop-extension.
//!
//! A background track shorter than the timeline is replicated end-to-end
//! (same over-allocation convention as visual loops) and truncated to the
//! exact timeline length; a longer track is truncated only. One ffmpeg
//! pass realizes both.

use std::path::Path;
use std::process::{Command, Stdio};

use cuereel_core::{loop_count, CuereelError, CuereelResult};

/// Probe an audio file's native duration in seconds with ffprobe.
pub fn probe_duration(path: &Path) -> CuereelResult<f64> {
    if !path.exists() {
        return Err(CuereelError::media_decode("audio file not found", path));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| CuereelError::media_decode(format!("failed to run ffprobe: {}", e), path))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CuereelError::media_decode(
            format!("ffprobe failed: {}", stderr),
            path,
        ));
    }

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(|e| {
        CuereelError::media_decode(format!("failed to parse ffprobe output: {}", e), path)
    })?;

    let duration = json["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    if duration <= 0.0 {
        return Err(CuereelError::media_decode(
            "audio reports no usable duration",
            path,
        ));
    }

    Ok(duration)
}

/// Number of end-to-end copies of the track feeding the extension pass.
/// A track already longer than the timeline plays once (truncate only).
pub fn audio_loop_count(native_secs: f64, total_secs: f64) -> u32 {
    if native_secs <= total_secs {
        loop_count(native_secs, total_secs)
    } else {
        1
    }
}

/// Extend (or truncate) `src` to exactly `total_secs` seconds of audio,
/// written as WAV to `out_path` (atomically: tmp file, then rename).
pub fn extend_audio(src: &Path, total_secs: f64, out_path: &Path) -> CuereelResult<()> {
    let native = probe_duration(src)?;
    let loops = audio_loop_count(native, total_secs);

    tracing::debug!(
        "extending audio {} ({}s native) to {}s with {} copies",
        src.display(),
        native,
        total_secs,
        loops
    );

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = out_path.with_extension("tmp");

    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-y");
    if loops > 1 {
        // -stream_loop N plays the input N+1 times.
        cmd.args(["-stream_loop", &format!("{}", loops - 1)]);
    }
    cmd.arg("-i").arg(src);
    cmd.args([
        "-t",
        &format!("{:.3}", total_secs),
        "-vn",
        "-acodec",
        "pcm_s16le",
        "-f",
        "wav",
    ]);
    cmd.arg(&tmp_path);

    let output = cmd
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| CuereelError::media_decode(format!("failed to run ffmpeg: {}", e), src))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let _ = std::fs::remove_file(&tmp_path);
        return Err(CuereelError::media_decode(
            format!("audio extension failed: {}", stderr),
            src,
        ));
    }

    std::fs::rename(&tmp_path, out_path)?;
    Ok(())
}
