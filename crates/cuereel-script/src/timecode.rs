//! Time-range token parsing.
//!
//! A range token is two clock expressions separated by `-->`. Each side is
//! one to three colon-separated numeric fields (seconds-only, mm:ss, or
//! hh:mm:ss), fractional seconds allowed.

use cuereel_core::{CuereelError, CuereelResult, TimeRange, Timestamp};

/// The marker separating the two sides of a range token.
pub const ARROW: &str = "-->";

/// Parse a `start --> end` token into a time range.
///
/// Does not validate `start < end`; the cue parser owns that invariant.
pub fn parse_time_range(token: &str) -> CuereelResult<TimeRange> {
    let sides: Vec<&str> = token.split(ARROW).collect();
    if sides.len() != 2 {
        return Err(CuereelError::time_format(
            "expected exactly one '-->' separator",
            token,
        ));
    }

    let start = parse_clock(sides[0], token)?;
    let end = parse_clock(sides[1], token)?;

    Ok(TimeRange::new(
        Timestamp::from_seconds(start),
        Timestamp::from_seconds(end),
    ))
}

/// Parse one clock expression into seconds: Σ field[i] × 60^(distance from
/// the rightmost field).
fn parse_clock(expr: &str, token: &str) -> CuereelResult<f64> {
    let fields: Vec<&str> = expr.split(':').collect();
    if fields.is_empty() || fields.len() > 3 {
        return Err(CuereelError::time_format(
            format!("expected 1 to 3 clock fields, got {}", fields.len()),
            token,
        ));
    }

    let mut seconds = 0.0;
    for (i, field) in fields.iter().enumerate() {
        let value: f64 = field.trim().parse().map_err(|_| {
            CuereelError::time_format(format!("non-numeric clock field '{}'", field.trim()), token)
        })?;
        if value < 0.0 || !value.is_finite() {
            return Err(CuereelError::time_format(
                format!("clock field '{}' out of range", field.trim()),
                token,
            ));
        }
        let place = (fields.len() - 1 - i) as i32;
        seconds += value * 60f64.powi(place);
    }
    Ok(seconds)
}
