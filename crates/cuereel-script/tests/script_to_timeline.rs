//! End-to-end over the pure stages: script text through cue parsing to the
//! assembled clip list, no network or media decoding involved.

use cuereel_script::parse_script;
use cuereel_timeline::{
    build_caption_clip, build_visual_clip, ClipContent, RenderJob, ResolvedAsset,
};

const SCRIPT: &str = "\
00:00:00 --> 00:00:05
Hello
tag1,tag2

00:00:05 --> 00:00:08

";

#[test]
fn script_flows_into_an_ordered_timeline() {
    let cues = parse_script(SCRIPT).unwrap();
    assert_eq!(cues.len(), 2);

    let job = RenderJob::new("demo", "/out", cues, "/audio.mp3");
    assert!((job.total_duration.as_seconds() - 8.0).abs() < 1e-9);

    // One visual clip then one caption clip per cue, in cue order.
    let mut clips = Vec::new();
    for cue in &job.cues {
        let asset = ResolvedAsset::new("media.webm", vec!["artist:someone".into()]);
        clips.push(build_visual_clip(asset, Some(2.0), cue, 720));
        clips.push(build_caption_clip(cue));
    }
    assert_eq!(clips.len(), 4);

    match &clips[0].content {
        // 2s source over a 5s window: ceil(5/2) + 2 copies.
        ClipContent::Visual { loops, .. } => assert_eq!(*loops, 5),
        _ => panic!("expected visual clip first"),
    }
    match &clips[1].content {
        ClipContent::Caption { text } => assert_eq!(text, "Hello"),
        _ => panic!("expected caption clip second"),
    }

    // Clip windows mirror their cues exactly.
    assert_eq!(clips[2].start.as_seconds(), 5.0);
    assert_eq!(clips[3].end.as_seconds(), 8.0);

    // The frame count covers the timeline to within one frame interval.
    let fps = 24.0;
    let rendered = job.frame_count(fps) as f64 / fps;
    assert!((rendered - 8.0).abs() < 1.0 / fps + 1e-9);
}

#[test]
fn malformed_block_fails_instead_of_silently_dropping() {
    let script = "00:00:00 --> 00:00:05\nline one\nline two\nline three\n";
    let err = parse_script(script).unwrap_err();
    assert!(err.to_string().contains("more than two content lines"));
}
