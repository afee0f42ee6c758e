//! # cuereel-resolve
//!
//! Asset resolution for Cuereel — maps each cue's tag set to a media file
//! downloaded from a tag-indexed repository, with a fixed fallback when the
//! search comes up empty. Per-cue resolutions fan out over a bounded worker
//! pool and fan back in cue order.

pub mod index;
pub mod resolver;

pub use index::{HttpMediaIndex, IndexHit, MediaIndex};
pub use resolver::AssetResolver;
