//! Image loading module.
//! Decodes PNG, JPEG, WebP, and other still formats into FrameBuffers.

use std::path::Path;

use cuereel_core::{CuereelError, CuereelResult, FrameBuffer};

/// Load an image file and convert it to a FrameBuffer.
pub fn load_image(path: &Path) -> CuereelResult<FrameBuffer> {
    let img = image::open(path).map_err(|e| {
        CuereelError::media_decode(format!("failed to load image: {}", e), path)
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut fb = FrameBuffer::new(width, height);
    fb.data = rgba.into_raw();

    Ok(fb)
}

/// Uniformly scale a buffer so its height matches `target_height`, aspect
/// ratio preserved. Scales in both directions (short sources are enlarged
/// to fill the frame).
pub fn resize_to_height(fb: &FrameBuffer, target_height: u32) -> FrameBuffer {
    if fb.height == 0 || fb.height == target_height {
        return fb.clone();
    }

    let scale = target_height as f64 / fb.height as f64;
    let new_width = ((fb.width as f64 * scale).round() as u32).max(1);
    let new_height = target_height.max(1);

    // Nearest-neighbor resampling
    let mut resized = FrameBuffer::new(new_width, new_height);
    for y in 0..new_height {
        for x in 0..new_width {
            let src_x = (x as f64 / scale) as u32;
            let src_y = (y as f64 / scale) as u32;
            if let Some(pixel) = fb.get_pixel(src_x.min(fb.width - 1), src_y.min(fb.height - 1)) {
                resized.set_pixel(x, y, pixel);
            }
        }
    }

    resized
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuereel_core::Color;

    #[test]
    fn test_load_image_missing_file() {
        let result = load_image(Path::new("/nonexistent/image.png"));
        assert!(matches!(
            result.unwrap_err(),
            CuereelError::MediaDecode { .. }
        ));
    }

    #[test]
    fn test_resize_to_height_downscale() {
        let fb = FrameBuffer::solid(200, 100, &Color::rgb(1.0, 0.0, 0.0));
        let resized = resize_to_height(&fb, 50);
        // 2:1 aspect preserved
        assert_eq!(resized.width, 100);
        assert_eq!(resized.height, 50);
    }

    #[test]
    fn test_resize_to_height_upscales() {
        let fb = FrameBuffer::solid(64, 36, &Color::rgb(1.0, 0.0, 0.0));
        let resized = resize_to_height(&fb, 72);
        assert_eq!(resized.width, 128);
        assert_eq!(resized.height, 72);
        assert_eq!(resized.get_pixel(0, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_resize_noop_at_target_height() {
        let fb = FrameBuffer::solid(100, 50, &Color::rgb(0.0, 1.0, 0.0));
        let resized = resize_to_height(&fb, 50);
        assert_eq!(resized.width, 100);
        assert_eq!(resized.height, 50);
    }
}
