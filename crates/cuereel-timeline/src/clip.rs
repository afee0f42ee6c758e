use serde::{Deserialize, Serialize};

use cuereel_core::{loop_count, Timestamp};

use crate::asset::{AssetKind, ResolvedAsset};
use crate::cue::Cue;

/// Where a clip sits on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Center,
    BottomCenter,
}

/// Placement of a clip: anchor plus optional uniform scaling target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub anchor: Anchor,
    /// When set, the clip is uniformly scaled so its height matches this,
    /// aspect ratio preserved. Captions render at native size.
    pub target_height: Option<u32>,
}

/// What a timed clip renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClipContent {
    /// A cue's visual layer: the resolved media, with looping metadata for
    /// motion sources.
    Visual {
        asset: ResolvedAsset,
        /// Native source duration in seconds; None for stills.
        native_duration: Option<f64>,
        /// End-to-end copies of the source backing the window. 1 for stills
        /// and for motion sources longer than the window.
        loops: u32,
    },
    /// A cue's caption overlay.
    Caption { text: String },
}

/// One visual or caption element with a `[start, end)` visibility window in
/// the output timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedClip {
    pub content: ClipContent,
    pub start: Timestamp,
    pub end: Timestamp,
    pub placement: Placement,
}

impl TimedClip {
    /// Whether the clip is visible at timestamp `t`.
    pub fn visible_at(&self, t: Timestamp) -> bool {
        self.start <= t && t < self.end
    }
}

/// Build a cue's visual layer.
///
/// Motion sources no longer than the cue's window are replicated
/// `loop_count(native, span)` times end-to-end so the looped total safely
/// exceeds the span; the visibility window performs the exact trimming.
/// Stills have no duration ceiling and are held for the full window.
pub fn build_visual_clip(
    asset: ResolvedAsset,
    native_duration: Option<f64>,
    cue: &Cue,
    target_height: u32,
) -> TimedClip {
    let span = cue.span().as_seconds();
    let loops = match (asset.kind, native_duration) {
        (AssetKind::Motion, Some(native)) if native > 0.0 && native <= span => {
            loop_count(native, span)
        }
        _ => 1,
    };

    TimedClip {
        content: ClipContent::Visual {
            asset,
            native_duration,
            loops,
        },
        start: cue.start,
        end: cue.end,
        placement: Placement {
            anchor: Anchor::Center,
            target_height: Some(target_height),
        },
    }
}

/// Build a cue's caption overlay. Empty text still yields a clip; the
/// renderer turns it into a zero-effect layer.
pub fn build_caption_clip(cue: &Cue) -> TimedClip {
    TimedClip {
        content: ClipContent::Caption {
            text: cue.text.clone(),
        },
        start: cue.start,
        end: cue.end,
        placement: Placement {
            anchor: Anchor::BottomCenter,
            target_height: None,
        },
    }
}
