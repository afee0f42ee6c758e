use serde::{Deserialize, Serialize};

use cuereel_core::{Duration, TimeRange, Timestamp};

/// One timed script entry: a visible time interval, caption text, and the
/// tags used to select matching media.
///
/// Constructed once per recognized block by the script parser and immutable
/// afterward. Invariant (enforced at parse time): `start < end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Caption text; empty means no caption.
    pub text: String,
    /// Ordered search tags; empty means "any".
    pub tags: Vec<String>,
}

impl Cue {
    pub fn new(range: TimeRange, text: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            text: text.into(),
            tags,
        }
    }

    /// The cue's visibility window `[start, end)`.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    /// The length of the cue's window.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}
