//! Caption rendering module.
//! Uses fontdue for CPU-based font rasterization: word-wrapped text in a
//! fixed style (bold double-strike, light fill, dark outline) inside a
//! bounded box.

use std::path::Path;

use fontdue::{Font, FontSettings};

use cuereel_core::config::CaptionSection;
use cuereel_core::{Color, CuereelError, CuereelResult, FrameBuffer};

/// The fixed caption style, resolved from configuration.
#[derive(Debug, Clone)]
pub struct CaptionStyle {
    pub font_size: f32,
    pub box_width: u32,
    pub box_height: u32,
    pub fill: Color,
    pub outline: Color,
    pub outline_width: i32,
}

impl CaptionStyle {
    pub fn from_config(section: &CaptionSection) -> CuereelResult<Self> {
        let fill = Color::from_hex(&section.fill)
            .map_err(|e| CuereelError::Config(format!("caption fill: {}", e)))?;
        let outline = Color::from_hex(&section.outline)
            .map_err(|e| CuereelError::Config(format!("caption outline: {}", e)))?;
        Ok(Self {
            font_size: section.font_size,
            box_width: section.box_width,
            box_height: section.box_height,
            fill,
            outline,
            outline_width: section.outline_width as i32,
        })
    }
}

/// Caption renderer — rasterizes cue text to a FrameBuffer.
#[derive(Debug)]
pub struct CaptionRenderer {
    font: Font,
    style: CaptionStyle,
}

impl CaptionRenderer {
    /// Load the caption font from a file path.
    pub fn from_font_file(path: &Path, style: CaptionStyle) -> CuereelResult<Self> {
        let data = std::fs::read(path).map_err(|e| {
            CuereelError::Config(format!(
                "failed to read caption font {}: {}",
                path.display(),
                e
            ))
        })?;
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| {
            CuereelError::Config(format!(
                "failed to parse caption font {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self { font, style })
    }

    /// Render caption text into a FrameBuffer sized to the caption box.
    ///
    /// Empty (or whitespace-only) text yields a 1x1 transparent buffer, a
    /// zero-effect layer; it never fails the render. Text wraps inside the
    /// box width; lines past the box height are clipped.
    pub fn render(&self, text: &str) -> FrameBuffer {
        if text.trim().is_empty() {
            return FrameBuffer::new(1, 1);
        }

        let style = &self.style;
        let pad = style.outline_width.max(0) + 1; // strike offset
        let wrap_width = style.box_width as i32 - 2 * pad;
        let lines = wrap_text(text, wrap_width.max(1), |s| {
            self.measure_line(s).width
        });

        let line_spacing = (style.font_size * 1.3) as i32;
        let measures: Vec<LineMeasure> = lines.iter().map(|l| self.measure_line(l)).collect();

        let total_height = if lines.len() == 1 {
            measures[0].ascent + measures[0].descent
        } else {
            line_spacing * (lines.len() as i32 - 1)
                + measures.last().map_or(0, |m| m.ascent + m.descent)
        };

        let canvas_width = style.box_width.max(1);
        let canvas_height = ((total_height + 2 * pad).max(1) as u32).min(style.box_height.max(1));

        let mut fb = FrameBuffer::new(canvas_width, canvas_height);
        let fill = style.fill.to_rgba8();
        let outline = style.outline.to_rgba8();
        let w = style.outline_width;

        let mut y_offset: i32 = pad;
        for (i, line) in lines.iter().enumerate() {
            if y_offset >= canvas_height as i32 {
                break;
            }
            let measure = &measures[i];
            let x_offset = (canvas_width as i32 - measure.width) / 2;

            // Outline pass: stamp the line at every offset in the stroke
            // disc, for both strike positions.
            for dy in -w..=w {
                for dx in -w..=w {
                    if dx * dx + dy * dy > w * w {
                        continue;
                    }
                    for strike in 0..2 {
                        self.draw_line_into(
                            &mut fb,
                            line,
                            outline,
                            x_offset + dx + strike,
                            y_offset + dy,
                            measure.ascent,
                        );
                    }
                }
            }

            // Fill pass: double-strike for bold weight.
            for strike in 0..2 {
                self.draw_line_into(&mut fb, line, fill, x_offset + strike, y_offset, measure.ascent);
            }

            y_offset += line_spacing;
        }

        fb
    }

    /// Measure a single line of text.
    fn measure_line(&self, text: &str) -> LineMeasure {
        let mut total_width: i32 = 0;
        let mut max_ascent: i32 = 0;
        let mut max_descent: i32 = 0;

        for ch in text.chars() {
            let (metrics, _) = self.font.rasterize(ch, self.style.font_size);
            let ascent = metrics.height as i32 + metrics.ymin;
            let descent = -metrics.ymin;
            max_ascent = max_ascent.max(ascent);
            max_descent = max_descent.max(descent);
            total_width += metrics.advance_width as i32;
        }

        LineMeasure {
            width: total_width,
            ascent: max_ascent,
            descent: max_descent,
        }
    }

    /// Stamp a single line of text into the buffer, alpha-blending glyph
    /// coverage over what is already there.
    fn draw_line_into(
        &self,
        fb: &mut FrameBuffer,
        text: &str,
        color_rgba: [u8; 4],
        x_offset: i32,
        y_offset: i32,
        line_ascent: i32,
    ) {
        let [r, g, b, a] = color_rgba;
        let mut cursor_x: i32 = x_offset;

        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, self.style.font_size);
            let glyph_x = cursor_x + metrics.xmin;
            let glyph_y = y_offset + line_ascent - (metrics.height as i32 + metrics.ymin);

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }

                    let px = glyph_x + gx as i32;
                    let py = glyph_y + gy as i32;

                    if px >= 0 && px < fb.width as i32 && py >= 0 && py < fb.height as i32 {
                        let glyph_alpha = (coverage as u32 * a as u32) / 255;
                        blend_pixel(fb, px as u32, py as u32, [r, g, b, glyph_alpha as u8]);
                    }
                }
            }

            cursor_x += metrics.advance_width as i32;
        }
    }
}

/// Alpha-blend one source pixel over the buffer.
fn blend_pixel(fb: &mut FrameBuffer, x: u32, y: u32, src: [u8; 4]) {
    let sa = src[3] as u32;
    if sa == 0 {
        return;
    }
    let Some(dst) = fb.get_pixel(x, y) else { return };
    if sa == 255 {
        fb.set_pixel(x, y, src);
        return;
    }

    let da = dst[3] as u32;
    let inv_sa = 255 - sa;
    let out_a = sa + ((da * inv_sa) / 255);
    if out_a == 0 {
        return;
    }

    let blend = |s: u8, d: u8| -> u8 {
        ((s as u32 * sa * 255 + d as u32 * da * inv_sa) / (out_a * 255)) as u8
    };

    fb.set_pixel(
        x,
        y,
        [
            blend(src[0], dst[0]),
            blend(src[1], dst[1]),
            blend(src[2], dst[2]),
            out_a as u8,
        ],
    );
}

/// Measurements for a single line of text.
#[derive(Debug, Clone)]
struct LineMeasure {
    /// Total advance width.
    width: i32,
    /// Max ascent (above baseline).
    ascent: i32,
    /// Max descent (below baseline).
    descent: i32,
}

/// Greedy word wrap against a pixel budget.
///
/// Explicit newlines are respected; a single word wider than the budget
/// gets its own line and overflows (the caption box clips it).
pub fn wrap_text(text: &str, max_width: i32, measure: impl Fn(&str) -> i32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in words {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if !current.is_empty() && measure(&candidate) > max_width {
                lines.push(current);
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }

    lines
}
