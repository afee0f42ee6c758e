//! # cuereel-render
//!
//! The Cuereel rendering engine. Takes the assembled timed-clip list and
//! produces raw frame buffers — CPU compositing, ffmpeg-subprocess motion
//! decode, fontdue caption rasterization.

pub mod captions;
pub mod compositor;
pub mod image_loader;
pub mod pipeline;
pub mod video_decoder;

pub use captions::{CaptionRenderer, CaptionStyle};
pub use compositor::Compositor;
pub use pipeline::{RenderPipeline, RenderResult, RenderSettings};
pub use video_decoder::{MediaInfo, VideoDecoder};
