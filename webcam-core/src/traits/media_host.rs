use std::sync::Arc;

use crate::models::error::WebcamError;
use crate::models::media_models::{MediaConstraints, MediaDeviceInfo, PlaybackHandle, SourceInfo};
use crate::traits::media_stream::MediaStream;
use crate::traits::surface::RasterSurface;

/// Completion of a device enumeration.
pub type DevicesCallback =
    Box<dyn FnOnce(Result<Vec<MediaDeviceInfo>, WebcamError>) + Send + 'static>;

/// Completion of a legacy source listing. The legacy capability has no
/// error path.
pub type SourcesCallback = Box<dyn FnOnce(Vec<SourceInfo>) + Send + 'static>;

/// Completion of a stream acquisition.
pub type UserMediaCallback =
    Box<dyn FnOnce(Result<Arc<dyn MediaStream>, WebcamError>) + Send + 'static>;

/// Capabilities the hosting environment provides to the widget.
///
/// Implemented by:
/// - `VirtualHost` (webcam-virtual, in-process test pattern camera)
///
/// The asynchronous capabilities take one-shot callbacks. A host may invoke
/// them immediately, later, or from another thread; the widget makes no
/// assumption about when.
pub trait MediaHost: Send + Sync {
    /// Whether stream acquisition is available at all.
    fn has_user_media(&self) -> bool;

    /// Whether `enumerate_devices` is available.
    fn supports_device_enumeration(&self) -> bool;

    fn enumerate_devices(&self, callback: DevicesCallback);

    /// Whether the legacy `get_sources` listing is available.
    fn supports_legacy_sources(&self) -> bool;

    fn get_sources(&self, callback: SourcesCallback);

    /// Request a live stream matching `constraints`. May wait on a user
    /// permission prompt for an unbounded time.
    fn get_user_media(&self, constraints: &MediaConstraints, callback: UserMediaCallback);

    /// Derive a playback handle bound to `stream`.
    fn create_object_url(&self, stream: &Arc<dyn MediaStream>) -> PlaybackHandle;

    fn revoke_object_url(&self, handle: &PlaybackHandle);

    /// Create an offscreen raster surface of the given size.
    fn create_surface(&self, width: u32, height: u32)
        -> Result<Box<dyn RasterSurface>, WebcamError>;
}
