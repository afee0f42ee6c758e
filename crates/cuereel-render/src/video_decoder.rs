//! Motion-media decoding module.
//! Uses FFmpeg subprocesses to probe metadata and extract individual frames
//! from gif/webm/mp4 sources, frame-at-a-time with caching.

use dashmap::DashMap;
use std::path::Path;
use std::process::{Command, Stdio};

use cuereel_core::{Color, CuereelError, CuereelResult, FrameBuffer};

/// Metadata about a motion-media file.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Native duration in seconds.
    pub duration_secs: f64,
    /// Frame rate (fps).
    pub fps: f64,
}

/// A motion-media decoder backed by FFmpeg.
/// Extracts frames from media files by shelling out to `ffmpeg`.
pub struct VideoDecoder {
    /// Cache of decoded frames keyed by (path, millisecond timestamp).
    frame_cache: DashMap<(String, u64), FrameBuffer>,
    /// Cache of probed media info keyed by path.
    info_cache: DashMap<String, MediaInfo>,
}

impl VideoDecoder {
    pub fn new() -> Self {
        Self {
            frame_cache: DashMap::new(),
            info_cache: DashMap::new(),
        }
    }

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

    /// Probe a motion-media file for its metadata (width, height, duration,
    /// fps). Unreadable or corrupt media is a `MediaDecode` error.
    pub fn probe(&self, path: &Path) -> CuereelResult<MediaInfo> {
        let key = path.to_string_lossy().to_string();
        if let Some(info) = self.info_cache.get(&key) {
            return Ok(info.clone());
        }

        if !Self::is_available() {
            return Err(CuereelError::Render(
                "ffmpeg/ffprobe not found in PATH. Install FFmpeg: https://ffmpeg.org/download.html"
                    .into(),
            ));
        }

        if !path.exists() {
            return Err(CuereelError::media_decode("media file not found", path));
        }

        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
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

        let json_str = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value = serde_json::from_str(&json_str).map_err(|e| {
            CuereelError::media_decode(format!("failed to parse ffprobe output: {}", e), path)
        })?;

        let streams = json["streams"]
            .as_array()
            .ok_or_else(|| CuereelError::media_decode("no streams found", path))?;

        let video_stream = streams
            .iter()
            .find(|s| s["codec_type"].as_str() == Some("video"))
            .ok_or_else(|| CuereelError::media_decode("no video stream found", path))?;

        let width = video_stream["width"]
            .as_u64()
            .ok_or_else(|| CuereelError::media_decode("missing width in video stream", path))?
            as u32;
        let height = video_stream["height"]
            .as_u64()
            .ok_or_else(|| CuereelError::media_decode("missing height in video stream", path))?
            as u32;

        let fps = parse_frame_rate(video_stream["r_frame_rate"].as_str().unwrap_or("30/1"));

        let duration_secs = json["format"]["duration"]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| {
                video_stream["duration"]
                    .as_str()
                    .and_then(|s| s.parse::<f64>().ok())
            })
            .unwrap_or(0.0);

        if duration_secs <= 0.0 {
            return Err(CuereelError::media_decode(
                "media reports no usable duration",
                path,
            ));
        }

        let info = MediaInfo {
            width,
            height,
            duration_secs,
            fps,
        };

        self.info_cache.insert(key, info.clone());
        Ok(info)
    }

    /// Extract a single frame at a given source timestamp, scaled to the
    /// target dimensions.
    ///
    /// Mid-render extraction glitches degrade to a dark placeholder frame
    /// rather than failing the whole job; the probe has already validated
    /// the source is decodable.
    pub fn extract_frame(
        &self,
        path: &Path,
        timestamp_secs: f64,
        target_width: u32,
        target_height: u32,
    ) -> CuereelResult<FrameBuffer> {
        let cache_key = (
            path.to_string_lossy().to_string(),
            (timestamp_secs * 1000.0) as u64, // millisecond precision
        );

        if let Some(cached) = self.frame_cache.get(&cache_key) {
            return Ok(cached.clone());
        }

        if !Self::is_available() {
            return Err(CuereelError::Render("ffmpeg not found in PATH".into()));
        }

        if !path.exists() {
            return Err(CuereelError::media_decode("media file not found", path));
        }

        let ts_str = format!("{:.3}", timestamp_secs);

        // Seek (-ss before -i for fast seeking), extract one frame, output
        // raw RGBA pixels on stdout.
        let output = Command::new("ffmpeg")
            .args(["-ss", &ts_str, "-i"])
            .arg(path)
            .args([
                "-vframes",
                "1",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{}x{}", target_width, target_height),
                "-",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                CuereelError::media_decode(format!("failed to extract frame: {}", e), path)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!("ffmpeg frame extraction warning: {}", stderr);
            return Ok(FrameBuffer::solid(
                target_width,
                target_height,
                &Color::rgba(0.2, 0.2, 0.2, 1.0),
            ));
        }

        let expected_size = (target_width as usize) * (target_height as usize) * 4;
        if output.stdout.len() < expected_size {
            tracing::warn!(
                "ffmpeg output size mismatch: expected {} bytes, got {}",
                expected_size,
                output.stdout.len()
            );
            return Ok(FrameBuffer::solid(
                target_width,
                target_height,
                &Color::rgba(0.2, 0.2, 0.2, 1.0),
            ));
        }

        let mut fb = FrameBuffer::new(target_width, target_height);
        fb.data = output.stdout[..expected_size].to_vec();

        self.frame_cache.insert(cache_key, fb.clone());
        Ok(fb)
    }

    /// Clear the caches to free memory.
    pub fn clear_cache(&self) {
        self.frame_cache.clear();
        self.info_cache.clear();
    }

    /// Number of cached frames.
    pub fn cache_size(&self) -> usize {
        self.frame_cache.len()
    }
}

impl Default for VideoDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a frame rate string like "30/1" or "24000/1001" into a float.
fn parse_frame_rate(rate_str: &str) -> f64 {
    if let Some((num_str, den_str)) = rate_str.split_once('/') {
        let num: f64 = num_str.parse().unwrap_or(30.0);
        let den: f64 = den_str.parse().unwrap_or(1.0);
        if den > 0.0 {
            num / den
        } else {
            30.0
        }
    } else {
        rate_str.parse::<f64>().unwrap_or(30.0)
    }
}
