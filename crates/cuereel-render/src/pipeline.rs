//! The render pipeline — takes the assembled clip list and produces the
//! ordered frame sequence.
//!
//! Still images decode once and are cached; motion sources are probed and
//! frame-extracted on demand; captions rasterize once per clip. Frames
//! render in parallel, but the resulting sequence is ordered and consumed
//! by the encoder in a single pass.

use dashmap::DashMap;
use rayon::prelude::*;
use std::path::PathBuf;

use cuereel_core::config::RenderSection;
use cuereel_core::{Color, CuereelError, CuereelResult, Duration, FrameBuffer};
use cuereel_timeline::{Anchor, AssetKind, ClipContent, TimedClip};

use crate::captions::CaptionRenderer;
use crate::compositor::Compositor;
use crate::image_loader::{load_image, resize_to_height};
use crate::video_decoder::VideoDecoder;

/// Canvas and timing parameters for one render.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub background: Color,
    /// Height every visual layer is uniformly scaled to.
    pub frame_height: u32,
}

impl RenderSettings {
    pub fn from_config(section: &RenderSection) -> CuereelResult<Self> {
        let background = Color::from_hex(&section.background)
            .map_err(|e| CuereelError::Config(format!("render background: {}", e)))?;
        Ok(Self {
            width: section.width,
            height: section.height,
            fps: section.fps,
            background,
            frame_height: section.frame_height,
        })
    }
}

/// Result of a complete render.
pub struct RenderResult {
    /// All rendered frames in order.
    pub frames: Vec<FrameBuffer>,
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// A clip with its content materialized for per-frame composition.
enum PreparedContent {
    /// Decoded and scaled still.
    Still(FrameBuffer),
    /// Motion source; frames extract on demand at the target dimensions.
    Motion {
        path: PathBuf,
        native_duration: f64,
        width: u32,
        height: u32,
    },
    /// Rasterized caption.
    Caption(FrameBuffer),
}

struct PreparedClip {
    content: PreparedContent,
    start: f64,
    end: f64,
    anchor: Anchor,
}

impl PreparedClip {
    fn visible_at(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// The render pipeline — timed clips to frames.
pub struct RenderPipeline {
    decoder: VideoDecoder,
    captions: CaptionRenderer,
    image_cache: DashMap<String, FrameBuffer>,
}

impl RenderPipeline {
    pub fn new(captions: CaptionRenderer) -> Self {
        Self {
            decoder: VideoDecoder::new(),
            captions,
            image_cache: DashMap::new(),
        }
    }

    /// The shared motion-media decoder (probe results are cached here, so
    /// callers probing for loop arithmetic reuse the same ffprobe run).
    pub fn decoder(&self) -> &VideoDecoder {
        &self.decoder
    }

    /// Render the clip list to an ordered frame sequence.
    pub fn render(
        &self,
        clips: &[TimedClip],
        total_duration: Duration,
        settings: &RenderSettings,
    ) -> CuereelResult<RenderResult> {
        let prepared = self.prepare(clips, settings)?;
        let compositor = Compositor::new(settings.width, settings.height, settings.background);
        let total_frames = total_duration.frame_count(settings.fps);

        tracing::info!(
            "rendering {} frames at {}x{} @ {}fps",
            total_frames,
            settings.width,
            settings.height,
            settings.fps
        );

        let frames: CuereelResult<Vec<FrameBuffer>> = (0..total_frames)
            .into_par_iter()
            .map(|frame_index| {
                let t = frame_index as f64 / settings.fps;
                self.render_frame(&prepared, &compositor, t)
            })
            .collect();

        Ok(RenderResult {
            frames: frames?,
            frame_count: total_frames,
            width: settings.width,
            height: settings.height,
            fps: settings.fps,
        })
    }

    /// Materialize clip content: decode stills, probe motion sources,
    /// rasterize captions.
    fn prepare(
        &self,
        clips: &[TimedClip],
        settings: &RenderSettings,
    ) -> CuereelResult<Vec<PreparedClip>> {
        clips
            .iter()
            .map(|clip| {
                let content = match &clip.content {
                    ClipContent::Visual {
                        asset,
                        native_duration,
                        ..
                    } => match asset.kind {
                        AssetKind::Still => {
                            let key = asset.path.to_string_lossy().to_string();
                            let fb = match self.image_cache.get(&key) {
                                Some(cached) => cached.clone(),
                                None => {
                                    let decoded = resize_to_height(
                                        &load_image(&asset.path)?,
                                        settings.frame_height,
                                    );
                                    self.image_cache.insert(key, decoded.clone());
                                    decoded
                                }
                            };
                            PreparedContent::Still(fb)
                        }
                        AssetKind::Motion => {
                            let info = self.decoder.probe(&asset.path)?;
                            let native = native_duration.unwrap_or(info.duration_secs);
                            let height = settings.frame_height.max(1);
                            let width = ((info.width as f64 * height as f64
                                / info.height.max(1) as f64)
                                .round() as u32)
                                .max(1);
                            PreparedContent::Motion {
                                path: asset.path.clone(),
                                native_duration: native,
                                width,
                                height,
                            }
                        }
                    },
                    ClipContent::Caption { text } => {
                        PreparedContent::Caption(self.captions.render(text))
                    }
                };

                Ok(PreparedClip {
                    content,
                    start: clip.start.as_seconds(),
                    end: clip.end.as_seconds(),
                    anchor: clip.placement.anchor,
                })
            })
            .collect()
    }

    /// Compose one output frame at timestamp `t`: the background plus every
    /// visible clip in insertion order (captions were appended after their
    /// cue's visual, so they draw above it).
    fn render_frame(
        &self,
        prepared: &[PreparedClip],
        compositor: &Compositor,
        t: f64,
    ) -> CuereelResult<FrameBuffer> {
        let mut frame = compositor.base_frame();

        for clip in prepared.iter().filter(|c| c.visible_at(t)) {
            match &clip.content {
                PreparedContent::Still(fb) => compositor.place(&mut frame, fb, clip.anchor),
                PreparedContent::Motion {
                    path,
                    native_duration,
                    width,
                    height,
                } => {
                    // Loop replication maps the output time back into the
                    // source: the looped copies cover the window, the
                    // window trims exactly.
                    let local = t - clip.start;
                    let src_t = if *native_duration > 0.0 {
                        local % native_duration
                    } else {
                        0.0
                    };
                    let fb = self.decoder.extract_frame(path, src_t, *width, *height)?;
                    compositor.place(&mut frame, &fb, clip.anchor);
                }
                PreparedContent::Caption(fb) => compositor.place(&mut frame, fb, clip.anchor),
            }
        }

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let settings = RenderSettings::from_config(&RenderSection::default()).unwrap();
        assert_eq!(settings.width, 1280);
        assert_eq!(settings.height, 720);
        assert_eq!(settings.background.to_rgba8(), [0, 0, 0, 255]);
    }

    #[test]
    fn test_settings_reject_bad_background() {
        let section = RenderSection {
            background: "#nope".to_string(),
            ..RenderSection::default()
        };
        assert!(RenderSettings::from_config(&section).is_err());
    }

    #[test]
    fn test_prepared_clip_window_is_half_open() {
        let clip = PreparedClip {
            content: PreparedContent::Still(FrameBuffer::new(1, 1)),
            start: 5.0,
            end: 8.0,
            anchor: Anchor::Center,
        };
        assert!(!clip.visible_at(4.999));
        assert!(clip.visible_at(5.0));
        assert!(clip.visible_at(7.999));
        assert!(!clip.visible_at(8.0));
    }
}
