use image::RgbaImage;

use crate::models::config::ScreenshotFormat;
use crate::models::error::WebcamError;

/// The playback element a stream is bound to.
///
/// Obtained from the host when it mounts the props returned by
/// `Webcam::render`, and handed back through `Webcam::bind_video_element`.
pub trait VideoElement: Send + Sync {
    /// Intrinsic width of the playing video, 0 before metadata is known.
    fn video_width(&self) -> u32;

    fn video_height(&self) -> u32;

    /// Displayed width in CSS pixels.
    fn client_width(&self) -> f64;

    fn client_height(&self) -> f64;

    /// The frame currently on screen, at intrinsic resolution.
    fn current_frame(&self) -> Option<RgbaImage>;
}

/// Offscreen 2D drawing target used to snapshot a video frame.
pub trait RasterSurface: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Draw the element's current frame into `(dx, dy, dw, dh)`, scaling it.
    fn draw_video(
        &mut self,
        video: &dyn VideoElement,
        dx: u32,
        dy: u32,
        dw: u32,
        dh: u32,
    ) -> Result<(), WebcamError>;

    /// Export the surface as a `data:` URL in `format`.
    fn to_data_url(
        &self,
        format: ScreenshotFormat,
        quality: Option<f32>,
    ) -> Result<String, WebcamError>;
}
