use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::models::config::ScreenshotFormat;
use crate::models::error::WebcamError;
use crate::processing::encoding;
use crate::traits::surface::{RasterSurface, VideoElement};

/// CPU raster surface backed by an RGBA buffer.
///
/// Hosts without a native drawing surface return this from
/// `MediaHost::create_surface`.
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    canvas: RgbaImage,
}

impl SoftwareSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, WebcamError> {
        if width == 0 || height == 0 {
            return Err(WebcamError::SurfaceUnavailable(format!(
                "cannot create {}x{} surface",
                width, height
            )));
        }
        Ok(Self {
            canvas: RgbaImage::new(width, height),
        })
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.canvas
    }
}

impl RasterSurface for SoftwareSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn draw_video(
        &mut self,
        video: &dyn VideoElement,
        dx: u32,
        dy: u32,
        dw: u32,
        dh: u32,
    ) -> Result<(), WebcamError> {
        let frame = video
            .current_frame()
            .ok_or_else(|| WebcamError::SurfaceUnavailable("video has no frame yet".into()))?;
        if dw == 0 || dh == 0 {
            return Ok(());
        }

        let scaled = if frame.dimensions() == (dw, dh) {
            frame
        } else {
            imageops::resize(&frame, dw, dh, FilterType::Triangle)
        };
        imageops::replace(&mut self.canvas, &scaled, i64::from(dx), i64::from(dy));
        Ok(())
    }

    fn to_data_url(
        &self,
        format: ScreenshotFormat,
        quality: Option<f32>,
    ) -> Result<String, WebcamError> {
        encoding::encode_data_url(&self.canvas, format, quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    struct SolidVideo {
        size: (u32, u32),
        color: Rgba<u8>,
    }

    impl VideoElement for SolidVideo {
        fn video_width(&self) -> u32 {
            self.size.0
        }

        fn video_height(&self) -> u32 {
            self.size.1
        }

        fn client_width(&self) -> f64 {
            self.size.0 as f64
        }

        fn client_height(&self) -> f64 {
            self.size.1 as f64
        }

        fn current_frame(&self) -> Option<RgbaImage> {
            Some(RgbaImage::from_pixel(self.size.0, self.size.1, self.color))
        }
    }

    #[test]
    fn draw_scales_frame_into_surface() {
        let video = SolidVideo {
            size: (64, 48),
            color: Rgba([10, 200, 30, 255]),
        };
        let mut surface = SoftwareSurface::new(32, 24).unwrap();
        surface.draw_video(&video, 0, 0, 32, 24).unwrap();

        assert_eq!(surface.pixels().dimensions(), (32, 24));
        assert_eq!(*surface.pixels().get_pixel(0, 0), Rgba([10, 200, 30, 255]));
        assert_eq!(*surface.pixels().get_pixel(31, 23), Rgba([10, 200, 30, 255]));
    }

    #[test]
    fn draw_without_frame_fails() {
        struct Blank;
        impl VideoElement for Blank {
            fn video_width(&self) -> u32 {
                0
            }
            fn video_height(&self) -> u32 {
                0
            }
            fn client_width(&self) -> f64 {
                0.0
            }
            fn client_height(&self) -> f64 {
                0.0
            }
            fn current_frame(&self) -> Option<RgbaImage> {
                None
            }
        }

        let mut surface = SoftwareSurface::new(4, 4).unwrap();
        assert!(surface.draw_video(&Blank, 0, 0, 4, 4).is_err());
    }

    #[test]
    fn export_uses_requested_format() {
        let surface = SoftwareSurface::new(8, 8).unwrap();
        let url = surface.to_data_url(ScreenshotFormat::Jpeg, Some(0.5)).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(SoftwareSurface::new(0, 10).is_err());
    }
}
