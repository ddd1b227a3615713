//! # webcam-virtual
//!
//! In-process host backend for webcam-core.
//!
//! Provides:
//! - `VirtualHost`: scriptable `MediaHost` with permission, capability and timing switches
//! - `VirtualStream` / `VirtualTrack`: streams whose stop state is observable
//! - `VirtualVideoElement`: playback element rendering an animated colour-bar pattern
//!
//! ## Usage
//! ```no_run
//! use std::sync::Arc;
//! use webcam_core::{AcquisitionCoordinator, MediaHost, Webcam, WebcamConfiguration};
//! use webcam_virtual::VirtualHost;
//!
//! let host = VirtualHost::new();
//! let mut webcam = Webcam::new(
//!     WebcamConfiguration::default(),
//!     Arc::clone(&host) as Arc<dyn MediaHost>,
//!     AcquisitionCoordinator::shared(),
//! );
//! webcam.mount();
//! let video = host.mount_video(&webcam.render()).unwrap();
//! webcam.bind_video_element(video);
//! let screenshot = webcam.get_screenshot();
//! ```

pub mod element;
pub mod host;
pub mod pattern;
pub mod stream;

pub use element::VirtualVideoElement;
pub use host::{PermissionPolicy, ResolutionMode, VirtualHost, VirtualHostBuilder};
pub use stream::{VirtualStream, VirtualTrack};
