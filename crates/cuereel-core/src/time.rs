use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Time duration with sub-millisecond precision (stored as fractional seconds).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Duration {
    /// Duration in seconds.
    seconds: f64,
}

impl Duration {
    /// Create a duration from seconds.
    pub fn from_seconds(s: f64) -> Self {
        Self {
            seconds: s.max(0.0),
        }
    }

    /// Create a zero duration.
    pub fn zero() -> Self {
        Self { seconds: 0.0 }
    }

    /// Get duration as seconds.
    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Compute number of frames for a given FPS.
    pub fn frame_count(&self, fps: f64) -> u64 {
        (self.seconds * fps).ceil() as u64
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::zero()
    }
}

impl Add for Duration {
    type Output = Duration;
    fn add(self, rhs: Duration) -> Duration {
        Duration::from_seconds(self.seconds + rhs.seconds)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds < 1.0 {
            write!(f, "{:.0}ms", self.seconds * 1000.0)
        } else {
            write!(f, "{:.2}s", self.seconds)
        }
    }
}

/// A point in time within the output timeline.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp {
    /// Time in seconds from the start of the timeline.
    seconds: f64,
}

impl Timestamp {
    /// Create a timestamp from seconds.
    pub fn from_seconds(s: f64) -> Self {
        Self {
            seconds: s.max(0.0),
        }
    }

    /// Create a timestamp at the start (0.0).
    pub fn zero() -> Self {
        Self { seconds: 0.0 }
    }

    /// Get the time in seconds.
    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Convert to a frame index for a given FPS.
    pub fn to_frame(&self, fps: f64) -> u64 {
        (self.seconds * fps).floor() as u64
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::zero()
    }
}

impl Sub for Timestamp {
    type Output = Duration;
    fn sub(self, rhs: Timestamp) -> Duration {
        Duration::from_seconds(self.seconds - rhs.seconds)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = (self.seconds * 1000.0) as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1_000;
        let ms = total_ms % 1_000;
        write!(f, "{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
    }
}

/// A half-open interval `[start, end)` on the output timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// The length of the interval.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// Whether a timestamp falls inside `[start, end)`.
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.start, self.end)
    }
}

/// Number of end-to-end copies of a source needed to safely cover `span`.
///
/// The `+ 2` over-allocation is inherited headroom, not an exact-ceiling
/// computation; the visibility window performs the exact trimming.
pub fn loop_count(native_secs: f64, span_secs: f64) -> u32 {
    (span_secs / native_secs).ceil() as u32 + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_seconds() {
        let d = Duration::from_seconds(2.5);
        assert!((d.as_seconds() - 2.5).abs() < 0.001);
    }

    #[test]
    fn test_duration_frame_count() {
        let d = Duration::from_seconds(1.0);
        assert_eq!(d.frame_count(24.0), 24);
        // Partial frames round up
        assert_eq!(Duration::from_seconds(1.01).frame_count(24.0), 25);
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(format!("{}", Duration::from_seconds(2.5)), "2.50s");
        assert_eq!(format!("{}", Duration::from_seconds(0.5)), "500ms");
    }

    #[test]
    fn test_timestamp_to_frame() {
        let ts = Timestamp::from_seconds(1.0);
        assert_eq!(ts.to_frame(24.0), 24);
    }

    #[test]
    fn test_timestamp_display() {
        let ts = Timestamp::from_seconds(3661.5);
        assert_eq!(format!("{}", ts), "01:01:01.500");
    }

    #[test]
    fn test_timestamp_sub_saturates() {
        let a = Timestamp::from_seconds(1.0);
        let b = Timestamp::from_seconds(3.0);
        assert_eq!((a - b).as_seconds(), 0.0);
    }

    #[test]
    fn test_range_contains_is_half_open() {
        let r = TimeRange::new(Timestamp::from_seconds(5.0), Timestamp::from_seconds(10.0));
        assert!(r.contains(Timestamp::from_seconds(5.0)));
        assert!(r.contains(Timestamp::from_seconds(9.999)));
        assert!(!r.contains(Timestamp::from_seconds(10.0)));
        assert!((r.span().as_seconds() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_loop_count() {
        // 2s source over a 5s window: ceil(2.5) + 2 = 5 copies.
        assert_eq!(loop_count(2.0, 5.0), 5);
        // Exact multiple still gets the headroom.
        assert_eq!(loop_count(2.0, 4.0), 4);
        assert_eq!(loop_count(3.0, 10.0), 6);
    }
}
