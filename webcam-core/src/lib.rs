//! # webcam-core
//!
//! Host-agnostic webcam widget.
//!
//! Acquires a live camera/microphone stream from a host, exposes it for
//! playback and captures still frames as PNG, JPEG or WebP data URLs.
//! Hosts (a browser binding, a native camera stack, the in-process
//! `webcam-virtual` backend) implement the `MediaHost` trait and plug into
//! the generic `Webcam`.
//!
//! ## Architecture
//!
//! ```text
//! webcam-core (this crate)
//! ├── traits/       ← MediaHost, MediaStream, MediaTrack, VideoElement, RasterSurface, WebcamDelegate
//! ├── models/       ← WebcamConfiguration, WebcamError, AcquisitionState, devices, constraints, Snapshot
//! ├── processing/   ← surface sizing, source selection, still-image encoding, SoftwareSurface
//! └── session/      ← Webcam (widget), AcquisitionCoordinator, VideoElementProps
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{
    Dimension, FacingMode, FacingModeConstraint, ScreenshotFormat, WebcamConfiguration,
};
pub use models::error::WebcamError;
pub use models::media_models::{
    DeviceKind, LegacySourceKind, MediaConstraints, MediaDeviceInfo, PlaybackHandle, SourceInfo,
    SourceSelection, TrackKind, WebcamDiagnostics,
};
pub use models::snapshot::{Snapshot, SnapshotMetadata};
pub use models::state::AcquisitionState;
pub use processing::software_surface::SoftwareSurface;
pub use session::coordinator::{AcquisitionCoordinator, AcquisitionHandle};
pub use session::presentation::VideoElementProps;
pub use session::webcam::{SharedSurface, Webcam};
pub use traits::media_host::{DevicesCallback, MediaHost, SourcesCallback, UserMediaCallback};
pub use traits::media_stream::{MediaStream, MediaTrack};
pub use traits::surface::{RasterSurface, VideoElement};
pub use traits::webcam_delegate::WebcamDelegate;
