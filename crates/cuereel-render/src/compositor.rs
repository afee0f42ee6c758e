//! CPU compositor: anchors layer buffers on the canvas and blends them in
//! draw order over the background fill.

use cuereel_core::{Color, FrameBuffer};
use cuereel_timeline::Anchor;

/// Canvas geometry and background for one render.
pub struct Compositor {
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

impl Compositor {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            background,
        }
    }

    /// A fresh frame filled with the background color.
    pub fn base_frame(&self) -> FrameBuffer {
        FrameBuffer::solid(self.width, self.height, &self.background)
    }

    /// Blend `src` onto `dst` at its anchored position.
    pub fn place(&self, dst: &mut FrameBuffer, src: &FrameBuffer, anchor: Anchor) {
        let (x, y) = self.anchor_offset(anchor, src.width, src.height);
        dst.composite_over(src, x, y);
    }

    /// Top-left offset for a layer of the given size at an anchor.
    /// Layers larger than the canvas center over it and get clipped.
    pub fn anchor_offset(&self, anchor: Anchor, w: u32, h: u32) -> (i32, i32) {
        let cw = self.width as i32;
        let ch = self.height as i32;
        let w = w as i32;
        let h = h as i32;
        match anchor {
            Anchor::Center => ((cw - w) / 2, (ch - h) / 2),
            Anchor::BottomCenter => ((cw - w) / 2, ch - h),
        }
    }
}
