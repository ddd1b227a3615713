//! Colour-bar test pattern rendered by virtual cameras.

use image::{Rgba, RgbaImage};

/// The eight classic bars, left to right.
pub const BARS: [Rgba<u8>; 8] = [
    Rgba([235, 235, 235, 255]), // white
    Rgba([235, 235, 16, 255]),  // yellow
    Rgba([16, 235, 235, 255]),  // cyan
    Rgba([16, 235, 16, 255]),   // green
    Rgba([235, 16, 235, 255]),  // magenta
    Rgba([235, 16, 16, 255]),   // red
    Rgba([16, 16, 235, 255]),   // blue
    Rgba([16, 16, 16, 255]),    // black
];

/// Render the bars at `width`x`height`, scrolled left by `offset` pixels.
pub fn color_bars(width: u32, height: u32, offset: u32) -> RgbaImage {
    let width = width.max(1);
    RgbaImage::from_fn(width, height, |x, _| {
        let column = (u64::from(x) + u64::from(offset)) % u64::from(width);
        let bar = (column * BARS.len() as u64 / u64::from(width)) as usize;
        BARS[bar]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_span_the_frame() {
        let frame = color_bars(80, 4, 0);
        assert_eq!(frame.dimensions(), (80, 4));
        assert_eq!(*frame.get_pixel(0, 0), BARS[0]);
        assert_eq!(*frame.get_pixel(10, 3), BARS[1]);
        assert_eq!(*frame.get_pixel(79, 0), BARS[7]);
    }

    #[test]
    fn offset_scrolls_and_wraps() {
        let frame = color_bars(80, 1, 10);
        assert_eq!(*frame.get_pixel(0, 0), BARS[1]);
        assert_eq!(*frame.get_pixel(75, 0), BARS[0]);
        assert_eq!(color_bars(80, 1, 80), color_bars(80, 1, 0));
    }
}
