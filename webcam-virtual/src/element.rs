use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use parking_lot::Mutex;

use webcam_core::{Dimension, MediaTrack, VideoElement};

use crate::pattern::color_bars;
use crate::stream::VirtualStream;

/// Pixels the pattern scrolls per drawn frame.
const SCROLL_STEP: u32 = 4;

/// Playback element showing a virtual stream.
///
/// Produces an animated colour-bar pattern at the stream's resolution for as
/// long as its video track is live.
pub struct VirtualVideoElement {
    stream: Arc<VirtualStream>,
    client_size: Mutex<(f64, f64)>,
    frame_index: AtomicU32,
}

impl VirtualVideoElement {
    pub fn new(stream: Arc<VirtualStream>, client_width: f64, client_height: f64) -> Self {
        Self {
            stream,
            client_size: Mutex::new((client_width, client_height)),
            frame_index: AtomicU32::new(0),
        }
    }

    /// Size the element with the props' `width`/`height`.
    pub fn for_props(stream: Arc<VirtualStream>, width: &Dimension, height: &Dimension) -> Self {
        let (native_w, native_h) = stream.resolution();
        let client_w = css_extent(width, native_w);
        let client_h = css_extent(height, native_h);
        Self::new(stream, client_w, client_h)
    }

    /// Simulate a layout change.
    pub fn set_client_size(&self, width: f64, height: f64) {
        *self.client_size.lock() = (width, height);
    }

    pub fn stream(&self) -> &Arc<VirtualStream> {
        &self.stream
    }

    pub fn frames_rendered(&self) -> u32 {
        self.frame_index.load(Ordering::SeqCst)
    }
}

impl VideoElement for VirtualVideoElement {
    fn video_width(&self) -> u32 {
        self.stream.resolution().0
    }

    fn video_height(&self) -> u32 {
        self.stream.resolution().1
    }

    fn client_width(&self) -> f64 {
        self.client_size.lock().0
    }

    fn client_height(&self) -> f64 {
        self.client_size.lock().1
    }

    fn current_frame(&self) -> Option<RgbaImage> {
        if !self.stream.video_track().is_live() {
            return None;
        }
        let index = self.frame_index.fetch_add(1, Ordering::SeqCst);
        let (width, height) = self.stream.resolution();
        Some(color_bars(width, height, index.wrapping_mul(SCROLL_STEP)))
    }
}

/// Displayed extent for a CSS dimension. Only pixel lengths are laid out;
/// anything else falls back to the native size.
fn css_extent(dimension: &Dimension, native: u32) -> f64 {
    match dimension {
        Dimension::Pixels(px) => *px,
        Dimension::Css(value) => value
            .trim()
            .trim_end_matches("px")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(f64::from(native)),
    }
}
