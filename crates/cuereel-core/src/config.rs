use serde::{Deserialize, Serialize};

use crate::error::{CuereelError, CuereelResult};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderSection {
    /// Output canvas width in pixels.
    pub width: u32,
    /// Output canvas height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: f64,
    /// Canvas background fill as a hex color.
    pub background: String,
    /// Target height every visual clip is uniformly scaled to.
    pub frame_height: u32,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 24.0,
            background: "#000000".to_string(),
            frame_height: 720,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptionSection {
    /// Path to the TTF font used for captions.
    pub font_path: String,
    pub font_size: f32,
    /// Caption box bounds; text word-wraps inside this width.
    pub box_width: u32,
    pub box_height: u32,
    /// Fill color (hex).
    pub fill: String,
    /// Outline color (hex).
    pub outline: String,
    pub outline_width: u32,
}

impl Default for CaptionSection {
    fn default() -> Self {
        Self {
            font_path: "./defaults/default-font.ttf".to_string(),
            font_size: 70.0,
            box_width: 1000,
            box_height: 500,
            fill: "#FFFFFF".to_string(),
            outline: "#000000".to_string(),
            outline_width: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchSection {
    /// Tag-indexed media search endpoint.
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry budget for network fetches (retries, not attempts).
    pub retries: u32,
    /// Base backoff between retries in milliseconds; doubles per retry.
    pub backoff_ms: u64,
    /// Bounded worker pool size for per-cue resolution.
    pub concurrency: usize,
    /// Local asset substituted when a search returns no candidates.
    pub fallback_asset: String,
    /// "fallback" | "abort"
    pub on_asset_error: String,
    /// "silent" | "abort"
    pub on_audio_error: String,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            endpoint: "https://derpibooru.org/api/v1/json/search/images".to_string(),
            timeout_secs: 30,
            retries: 3,
            backoff_ms: 500,
            concurrency: 4,
            fallback_asset: "./defaults/default-image.jpg".to_string(),
            on_asset_error: "fallback".to_string(),
            on_audio_error: "abort".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourcesSection {
    /// Root under which per-job working directories are created.
    pub cache_dir: String,
}

impl Default for ResourcesSection {
    fn default() -> Self {
        Self {
            cache_dir: "~/.cuereel/cache".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CuereelConfig {
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub caption: CaptionSection,
    #[serde(default)]
    pub fetch: FetchSection,
    #[serde(default)]
    pub resources: ResourcesSection,
}

impl CuereelConfig {
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: CuereelConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// What to do when a cue's asset cannot be fetched or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetErrorPolicy {
    /// Substitute the configured fallback asset and keep rendering.
    Fallback,
    /// Abort the whole job.
    Abort,
}

impl AssetErrorPolicy {
    pub fn parse(s: &str) -> CuereelResult<Self> {
        match s {
            "fallback" => Ok(AssetErrorPolicy::Fallback),
            "abort" => Ok(AssetErrorPolicy::Abort),
            other => Err(CuereelError::Config(format!(
                "on_asset_error must be 'fallback' or 'abort', got '{}'",
                other
            ))),
        }
    }
}

/// What to do when the background audio track cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioErrorPolicy {
    /// Render without an audio track.
    Silent,
    /// Abort the whole job.
    Abort,
}

impl AudioErrorPolicy {
    pub fn parse(s: &str) -> CuereelResult<Self> {
        match s {
            "silent" => Ok(AudioErrorPolicy::Silent),
            "abort" => Ok(AudioErrorPolicy::Abort),
            other => Err(CuereelError::Config(format!(
                "on_audio_error must be 'silent' or 'abort', got '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_sections() {
        let config = CuereelConfig::default();
        assert_eq!(config.render.width, 1280);
        assert_eq!(config.render.height, 720);
        assert!((config.render.fps - 24.0).abs() < f64::EPSILON);
        assert_eq!(config.fetch.concurrency, 4);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_src = "[render]\nwidth = 1920\nheight = 1080\nfps = 30.0\nbackground = \"#111111\"\nframe_height = 1080\n";
        let config: CuereelConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.render.width, 1920);
        // Untouched sections keep their defaults
        assert_eq!(config.caption.font_size, 70.0);
        assert_eq!(config.fetch.on_asset_error, "fallback");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            AssetErrorPolicy::parse("fallback").unwrap(),
            AssetErrorPolicy::Fallback
        );
        assert_eq!(
            AssetErrorPolicy::parse("abort").unwrap(),
            AssetErrorPolicy::Abort
        );
        assert!(AssetErrorPolicy::parse("ignore").is_err());

        assert_eq!(
            AudioErrorPolicy::parse("silent").unwrap(),
            AudioErrorPolicy::Silent
        );
        assert!(AudioErrorPolicy::parse("mute").is_err());
    }
}
