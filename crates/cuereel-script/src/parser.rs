//! Cue-script parsing: splits a timed script into ordered cue blocks.
//!
//! A block starts at a line containing `-->` and may be followed by up to
//! two content lines before a blank line, the next range line, or
//! end-of-input: the first is caption text, the second a comma-separated
//! tag list. Three or more content lines make the block malformed and fail
//! the parse (no silent drops).

use cuereel_core::{CuereelError, CuereelResult};
use cuereel_timeline::Cue;

use crate::timecode::{parse_time_range, ARROW};

/// Parse a whole script into cues, in document order.
///
/// An empty script is a valid script with zero cues. Lines outside any
/// block (e.g. a format header) are ignored. Each cue must satisfy
/// `start < end`; out-of-order and overlapping cues between blocks are
/// allowed and composited in document order.
pub fn parse_script(source: &str) -> CuereelResult<Vec<Cue>> {
    let lines: Vec<&str> = source.lines().map(|l| l.trim_end_matches('\r')).collect();
    let mut cues = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if !lines[i].contains(ARROW) {
            i += 1;
            continue;
        }

        let range = parse_time_range(lines[i])?;
        if range.start >= range.end {
            return Err(CuereelError::script_format(
                format!(
                    "cue start {} is not before end {}",
                    range.start, range.end
                ),
                i + 1,
            ));
        }

        // Collect content lines up to the block terminator.
        let mut content: Vec<(usize, &str)> = Vec::new();
        let mut j = i + 1;
        while j < lines.len() && !lines[j].trim().is_empty() && !lines[j].contains(ARROW) {
            content.push((j, lines[j]));
            j += 1;
        }

        if content.len() > 2 {
            let (line, _) = content[2];
            return Err(CuereelError::script_format(
                "cue block has more than two content lines",
                line + 1,
            ));
        }

        let text = content.first().map(|(_, s)| s.to_string()).unwrap_or_default();
        let tags = content
            .get(1)
            .map(|(_, s)| {
                s.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        cues.push(Cue::new(range, text, tags));
        i = j;
    }

    for pair in cues.windows(2) {
        if pair[1].start < pair[0].end {
            tracing::debug!(
                "cues at {} and {} overlap; later block draws on top",
                pair[0].range(),
                pair[1].range()
            );
        }
    }

    Ok(cues)
}
