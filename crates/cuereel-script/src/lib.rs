//! # cuereel-script
//!
//! The Cuereel script front end — parses timed-cue documents
//! (`HH:MM:SS.mmm --> HH:MM:SS.mmm` range lines with optional caption and
//! tag lines) into ordered [`Cue`](cuereel_timeline::Cue)s.

pub mod parser;
pub mod timecode;

pub use parser::parse_script;
pub use timecode::parse_time_range;
