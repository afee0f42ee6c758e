//! # cuereel-timeline
//!
//! The Cuereel timeline model — the canonical data the pipeline flows
//! through: parsed cues, per-cue resolved assets, timed clips with
//! visibility windows, and the root render job.

pub mod asset;
pub mod clip;
pub mod cue;
pub mod job;

pub use asset::{AssetKind, ResolvedAsset};
pub use clip::{build_caption_clip, build_visual_clip, Anchor, ClipContent, Placement, TimedClip};
pub use cue::Cue;
pub use job::RenderJob;
