//! Offscreen surface sizing.
//!
//! The surface keeps the video's intrinsic aspect ratio and fits inside the
//! element's displayed box:
//! ```text
//! aspect = video_width / video_height
//! width  = min(client_height * aspect, client_width)
//! height = width / aspect
//! ```

use crate::models::error::WebcamError;

/// Surface dimensions in fractional pixels, before truncation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    /// Backing-store width. Truncates like a canvas `width` assignment.
    pub fn pixel_width(&self) -> u32 {
        self.width as u32
    }

    pub fn pixel_height(&self) -> u32 {
        self.height as u32
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Compute the surface size for a video of intrinsic size `video_width` x
/// `video_height` displayed in a `client_width` x `client_height` box.
pub fn fit_surface(
    video_width: u32,
    video_height: u32,
    client_width: f64,
    client_height: f64,
) -> Result<SurfaceSize, WebcamError> {
    if video_width == 0 || video_height == 0 {
        return Err(WebcamError::SurfaceUnavailable(
            "video dimensions not known yet".into(),
        ));
    }
    if !(client_width.is_finite() && client_height.is_finite())
        || client_width <= 0.0
        || client_height <= 0.0
    {
        return Err(WebcamError::SurfaceUnavailable(format!(
            "video element has no displayed size ({}x{})",
            client_width, client_height
        )));
    }

    let aspect = video_width as f64 / video_height as f64;
    let width = (client_height * aspect).min(client_width);
    // Rounding in width / aspect can overshoot the box by an ulp.
    let height = (width / aspect).min(client_height);

    let size = SurfaceSize { width, height };
    if size.pixel_width() == 0 || size.pixel_height() == 0 {
        return Err(WebcamError::SurfaceUnavailable(format!(
            "surface would be empty ({:.2}x{:.2})",
            width, height
        )));
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wide_video_in_narrow_box_is_width_bound() {
        // 16:9 video in a 640x480 box.
        let size = fit_surface(1280, 720, 640.0, 480.0).unwrap();
        assert_relative_eq!(size.width, 640.0, max_relative = 1e-12);
        assert_relative_eq!(size.height, 360.0, max_relative = 1e-12);
        assert_relative_eq!(size.aspect_ratio(), 1280.0 / 720.0, max_relative = 1e-12);
    }

    #[test]
    fn tall_video_in_wide_box_is_height_bound() {
        // 3:4 portrait video in a 640x480 box.
        let size = fit_surface(480, 640, 640.0, 480.0).unwrap();
        assert_relative_eq!(size.width, 360.0, max_relative = 1e-12);
        assert_relative_eq!(size.height, 480.0, max_relative = 1e-12);
    }

    #[test]
    fn preserves_aspect_and_fits_box() {
        let cases = [
            (640, 480, 640.0, 480.0),
            (1920, 1080, 300.5, 900.0),
            (1080, 1920, 1000.0, 333.3),
            (320, 240, 1.0e4, 17.0),
            (1280, 720, 853.0, 480.0),
            (4000, 3000, 123.0, 456.0),
        ];
        for (vw, vh, cw, ch) in cases {
            let size = fit_surface(vw, vh, cw, ch).unwrap();
            assert_relative_eq!(
                size.aspect_ratio(),
                vw as f64 / vh as f64,
                max_relative = 1e-9
            );
            assert!(size.width <= cw, "{:?} exceeds width {}", size, cw);
            assert!(size.height <= ch, "{:?} exceeds height {}", size, ch);
            assert!(size.pixel_width() as f64 <= cw);
            assert!(size.pixel_height() as f64 <= ch);
        }
    }

    #[test]
    fn fractional_sizes_truncate() {
        let size = fit_surface(1920, 1080, 1000.0, 333.3).unwrap();
        assert_eq!(size.pixel_height(), 333);
        assert_eq!(size.pixel_width(), 592);
    }

    #[test]
    fn rejects_unknown_video_dimensions() {
        assert!(matches!(
            fit_surface(0, 0, 640.0, 480.0),
            Err(WebcamError::SurfaceUnavailable(_))
        ));
    }

    #[test]
    fn rejects_hidden_element() {
        assert!(fit_surface(640, 480, 0.0, 480.0).is_err());
        assert!(fit_surface(640, 480, 640.0, f64::NAN).is_err());
        assert!(fit_surface(640, 480, 0.5, 0.5).is_err());
    }
}
