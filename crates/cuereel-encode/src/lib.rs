//! # cuereel-encode
//!
//! Encoding module — converts raw FrameBuffers plus the loop-extended audio
//! track to the published MP4, by shelling out to FFmpeg. Output is staged
//! to a temporary file and renamed into place on success.

pub mod audio;
pub mod ffmpeg;

pub use audio::{audio_loop_count, extend_audio, probe_duration};
pub use ffmpeg::FfmpegEncoder;
