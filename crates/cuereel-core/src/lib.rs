//! # cuereel-core
//!
//! Core types and primitives for the Cuereel video compiler.
//! This crate contains foundational types shared across all Cuereel crates:
//! time arithmetic, colors, frame buffers, configuration, and error types.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod time;

pub use config::*;

pub use color::Color;
pub use error::{CuereelError, CuereelResult};
pub use frame::FrameBuffer;
pub use time::{loop_count, Duration, TimeRange, Timestamp};
