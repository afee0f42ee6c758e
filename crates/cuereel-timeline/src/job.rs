use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use cuereel_core::Duration;

use crate::cue::Cue;

/// The root aggregate for one invocation: everything the pipeline needs to
/// turn a parsed script into a published artifact. Constructed once,
/// discarded after the render completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJob {
    /// Unique job id; also names the per-job working directory.
    pub id: String,
    /// Output artifact title (file stem).
    pub title: String,
    pub output_dir: PathBuf,
    /// Cues in document order.
    pub cues: Vec<Cue>,
    /// Background audio source.
    pub audio_path: PathBuf,
    /// Full timeline length: the maximum cue end (cues may arrive
    /// out of order), zero for an empty script.
    pub total_duration: Duration,
}

impl RenderJob {
    pub fn new(
        title: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        cues: Vec<Cue>,
        audio_path: impl Into<PathBuf>,
    ) -> Self {
        let total_duration = cues
            .iter()
            .map(|c| c.end.as_seconds())
            .fold(0.0_f64, f64::max);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            output_dir: output_dir.into(),
            cues,
            audio_path: audio_path.into(),
            total_duration: Duration::from_seconds(total_duration),
        }
    }

    /// Path of the published artifact: `<output_dir>/<title>.mp4`.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.mp4", self.title))
    }

    /// Number of output frames at the given frame rate.
    pub fn frame_count(&self, fps: f64) -> u64 {
        self.total_duration.frame_count(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuereel_core::{TimeRange, Timestamp};

    fn cue(start: f64, end: f64) -> Cue {
        Cue::new(
            TimeRange::new(Timestamp::from_seconds(start), Timestamp::from_seconds(end)),
            "",
            vec![],
        )
    }

    #[test]
    fn test_total_duration_is_max_cue_end() {
        let job = RenderJob::new("t", "/out", vec![cue(0.0, 5.0), cue(5.0, 8.0)], "/a.mp3");
        assert!((job.total_duration.as_seconds() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_duration_with_out_of_order_cues() {
        let job = RenderJob::new("t", "/out", vec![cue(10.0, 12.0), cue(0.0, 5.0)], "/a.mp3");
        assert!((job.total_duration.as_seconds() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_script_has_zero_duration() {
        let job = RenderJob::new("t", "/out", vec![], "/a.mp3");
        assert_eq!(job.total_duration.as_seconds(), 0.0);
        assert_eq!(job.frame_count(24.0), 0);
    }

    #[test]
    fn test_output_path() {
        let job = RenderJob::new("recap", "/out", vec![], "/a.mp3");
        assert_eq!(job.output_path(), PathBuf::from("/out/recap.mp4"));
    }

    #[test]
    fn test_rendered_duration_matches_last_cue_end_within_one_frame() {
        // Two-cue script: the rendered frame count covers the last cue's
        // end time to within one frame interval.
        let job = RenderJob::new("t", "/out", vec![cue(0.0, 5.0), cue(5.0, 8.0)], "/a.mp3");
        let fps = 24.0;
        let frames = job.frame_count(fps);
        let rendered = frames as f64 / fps;
        assert!((rendered - 8.0).abs() < 1.0 / fps + 1e-9);
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = RenderJob::new("t", "/out", vec![], "/a.mp3");
        let b = RenderJob::new("t", "/out", vec![], "/a.mp3");
        assert_ne!(a.id, b.id);
    }
}
