use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::WebcamConfiguration;
use crate::models::error::WebcamError;
use crate::models::media_models::{
    MediaDeviceInfo, PlaybackHandle, SourceInfo, SourceSelection, WebcamDiagnostics,
};
use crate::models::snapshot::{Snapshot, SnapshotMetadata};
use crate::models::state::AcquisitionState;
use crate::processing::encoding;
use crate::processing::source_selection::{
    build_constraints, select_from_devices, select_from_sources,
};
use crate::processing::surface_sizing::fit_surface;
use crate::session::coordinator::{AcquisitionCoordinator, AcquisitionHandle};
use crate::session::presentation::VideoElementProps;
use crate::traits::media_host::MediaHost;
use crate::traits::media_stream::{stop_stream, track_ids, MediaStream};
use crate::traits::surface::{RasterSurface, VideoElement};
use crate::traits::webcam_delegate::WebcamDelegate;

/// A raster surface shared between the widget and its callers.
pub type SharedSurface = Arc<Mutex<Box<dyn RasterSurface>>>;

/// Mutable widget state, shared with in-flight host callbacks.
struct WebcamInner {
    state: AcquisitionState,
    streams: Vec<Arc<dyn MediaStream>>,
    src: Option<PlaybackHandle>,
    diagnostics: WebcamDiagnostics,
    /// This instance owns the coordinator's guard.
    holds_guard: bool,
    /// A host call (enumeration or acquisition) has not resolved yet. While
    /// set, the guard belongs to that call and outlives teardown.
    in_flight: bool,
}

impl WebcamInner {
    fn new() -> Self {
        Self {
            state: AcquisitionState::Idle,
            streams: Vec::new(),
            src: None,
            diagnostics: WebcamDiagnostics::default(),
            holds_guard: false,
            in_flight: false,
        }
    }
}

/// Lazily created capture surface and the intrinsic video size it was
/// sized for.
struct CachedSurface {
    surface: SharedSurface,
    video_size: (u32, u32),
}

/// Webcam widget: acquires a live camera/microphone stream, exposes it for
/// playback and captures still frames from it.
///
/// ```text
/// mount → [enumerate devices] → get_user_media → stream + playback handle
///                                                     ↓
/// render() → host mounts <video> → bind_video_element()
///                                                     ↓
/// get_canvas() → [surface] → get_screenshot() → data URL
/// ```
pub struct Webcam {
    config: WebcamConfiguration,
    host: Arc<dyn MediaHost>,
    coordinator: Arc<AcquisitionCoordinator>,
    delegate: Option<Arc<dyn WebcamDelegate>>,
    inner: Arc<Mutex<WebcamInner>>,
    pending: Option<AcquisitionHandle>,
    mounted: bool,
    video: Option<Arc<dyn VideoElement>>,
    surface: Option<CachedSurface>,
}

impl Webcam {
    pub fn new(
        config: WebcamConfiguration,
        host: Arc<dyn MediaHost>,
        coordinator: Arc<AcquisitionCoordinator>,
    ) -> Self {
        Self {
            config,
            host,
            coordinator,
            delegate: None,
            inner: Arc::new(Mutex::new(WebcamInner::new())),
            pending: None,
            mounted: false,
            video: None,
            surface: None,
        }
    }

    /// Install the completion callback. Takes effect from the next mount.
    pub fn set_delegate(&mut self, delegate: Arc<dyn WebcamDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn config(&self) -> &WebcamConfiguration {
        &self.config
    }

    pub fn state(&self) -> AcquisitionState {
        self.inner.lock().state.clone()
    }

    pub fn has_user_media(&self) -> bool {
        self.inner.lock().state.has_user_media()
    }

    /// Number of streams acquired during the current mount.
    pub fn stream_count(&self) -> usize {
        self.inner.lock().streams.len()
    }

    /// Playback handle of the most recent stream.
    pub fn src(&self) -> Option<PlaybackHandle> {
        self.inner.lock().src.clone()
    }

    pub fn diagnostics(&self) -> WebcamDiagnostics {
        self.inner.lock().diagnostics.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether this instance owns the coordinator's acquisition guard.
    ///
    /// Stays true after teardown until a pending host call resolves.
    pub fn holds_acquisition(&self) -> bool {
        self.inner.lock().holds_guard
    }

    /// Mount the widget, requesting media unless the host lacks the
    /// capability or another instance already has a request in flight.
    pub fn mount(&mut self) {
        if self.mounted {
            log::debug!("webcam already mounted");
            return;
        }
        self.mounted = true;

        if !self.host.has_user_media() {
            log::debug!("host has no media acquisition capability");
            return;
        }
        if self.has_user_media() {
            return;
        }
        if !self.coordinator.try_acquire() {
            log::debug!("media already requested by another webcam instance");
            return;
        }
        {
            let mut inner = self.inner.lock();
            inner.holds_guard = true;
            inner.in_flight = true;
        }

        let handle = AcquisitionHandle::new();
        self.pending = Some(handle.clone());

        let acquisition = Acquisition {
            config: self.config.clone(),
            host: Arc::clone(&self.host),
            coordinator: Arc::clone(&self.coordinator),
            delegate: self.delegate.clone(),
            inner: Arc::clone(&self.inner),
            handle,
        };
        acquisition.set_state(AcquisitionState::Requesting);
        acquisition.start();
    }

    /// Tear down: cancel any pending acquisition, stop every stream,
    /// release the playback handle and the acquisition guard.
    ///
    /// If a host call is still outstanding the guard is left to it and
    /// released once the host resolves.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;

        let (streams, src, previous) = {
            let mut inner = self.inner.lock();
            // Cancel under the lock so a concurrent result either lands
            // before teardown or is discarded.
            if let Some(handle) = self.pending.take() {
                handle.cancel();
            }
            if inner.in_flight {
                log::debug!("host call still pending, guard released when it resolves");
            } else if inner.holds_guard {
                inner.holds_guard = false;
                self.coordinator.release();
            }
            let previous = std::mem::take(&mut inner.state);
            (std::mem::take(&mut inner.streams), inner.src.take(), previous)
        };

        for stream in &streams {
            stop_stream(stream.as_ref());
            self.coordinator.unregister_tracks(&track_ids(stream.as_ref()));
        }
        if let Some(src) = src {
            self.host.revoke_object_url(&src);
        }
        self.surface = None;
        self.video = None;

        log::debug!("webcam unmounted, stopped {} stream(s)", streams.len());
        if !previous.is_idle() {
            if let Some(delegate) = &self.delegate {
                delegate.on_state_changed(&AcquisitionState::Idle);
            }
        }
    }

    /// Playback element props for the current state.
    pub fn render(&self) -> VideoElementProps {
        VideoElementProps {
            auto_play: true,
            width: self.config.width.clone(),
            height: self.config.height.clone(),
            muted: self.config.muted,
            src: self.src(),
            class_name: self.config.class_name.clone(),
        }
    }

    /// Bind the element the host mounted for `render()`.
    pub fn bind_video_element(&mut self, video: Arc<dyn VideoElement>) {
        self.video = Some(video);
    }

    /// Draw the current frame into the capture surface and return it.
    ///
    /// Returns `None` without media. The surface is created on first use and
    /// reused after that, even if the element's displayed size changes. It
    /// is recreated only when the video's intrinsic size changes.
    pub fn get_canvas(&mut self) -> Option<SharedSurface> {
        if !self.has_user_media() {
            return None;
        }
        match self.draw_current_frame() {
            Ok(surface) => Some(surface),
            Err(e) => {
                log::warn!("failed to draw video frame: {}", e);
                None
            }
        }
    }

    /// Encode the current frame as a data URL in the configured format.
    pub fn get_screenshot(&mut self) -> Option<String> {
        if !self.has_user_media() {
            return None;
        }
        match self.encode_current_frame() {
            Ok((data_url, _, _)) => Some(data_url),
            Err(e) => {
                log::warn!("failed to capture screenshot: {}", e);
                None
            }
        }
    }

    /// Like `get_screenshot`, with metadata describing the image.
    pub fn capture_snapshot(&mut self) -> Option<Snapshot> {
        if !self.has_user_media() {
            return None;
        }
        let result = self.encode_current_frame().and_then(|(data_url, width, height)| {
            let (_, bytes) = encoding::parse_data_url(&data_url)?;
            let format = self.config.screenshot_format;
            Ok(Snapshot {
                metadata: SnapshotMetadata::new(format, width, height, &bytes),
                data_url,
                format,
            })
        });
        match result {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("failed to capture snapshot: {}", e);
                None
            }
        }
    }

    fn draw_current_frame(&mut self) -> Result<SharedSurface, WebcamError> {
        let video = self
            .video
            .clone()
            .ok_or_else(|| WebcamError::SurfaceUnavailable("no video element bound".into()))?;
        let video_size = (video.video_width(), video.video_height());

        let cached = self
            .surface
            .as_ref()
            .filter(|cached| cached.video_size == video_size)
            .map(|cached| Arc::clone(&cached.surface));
        let surface = match cached {
            Some(surface) => surface,
            None => {
                if self.surface.is_some() {
                    log::debug!(
                        "video size changed to {}x{}, recreating surface",
                        video_size.0,
                        video_size.1
                    );
                }
                let size = fit_surface(
                    video_size.0,
                    video_size.1,
                    video.client_width(),
                    video.client_height(),
                )?;
                let surface: SharedSurface = Arc::new(Mutex::new(
                    self.host
                        .create_surface(size.pixel_width(), size.pixel_height())?,
                ));
                self.surface = Some(CachedSurface {
                    surface: Arc::clone(&surface),
                    video_size,
                });
                self.inner.lock().diagnostics.surfaces_created += 1;
                surface
            }
        };

        {
            let mut guard = surface.lock();
            let (width, height) = (guard.width(), guard.height());
            guard.draw_video(video.as_ref(), 0, 0, width, height)?;
        }
        self.inner.lock().diagnostics.frames_drawn += 1;
        Ok(surface)
    }

    fn encode_current_frame(&mut self) -> Result<(String, u32, u32), WebcamError> {
        let surface = self.draw_current_frame()?;
        let (data_url, width, height) = {
            let guard = surface.lock();
            let data_url = guard
                .to_data_url(self.config.screenshot_format, self.config.screenshot_quality)?;
            (data_url, guard.width(), guard.height())
        };
        self.inner.lock().diagnostics.screenshots_taken += 1;
        Ok((data_url, width, height))
    }
}

impl Drop for Webcam {
    fn drop(&mut self) {
        if self.mounted {
            self.unmount();
        }
    }
}

/// One acquisition attempt. Owns clones of everything its host callbacks
/// need, so it can outlive the call that started it.
struct Acquisition {
    config: WebcamConfiguration,
    host: Arc<dyn MediaHost>,
    coordinator: Arc<AcquisitionCoordinator>,
    delegate: Option<Arc<dyn WebcamDelegate>>,
    inner: Arc<Mutex<WebcamInner>>,
    handle: AcquisitionHandle,
}

impl Acquisition {
    /// Resolve sources, then request the stream.
    fn start(self) {
        if let Some(selection) = self.config.explicit_sources() {
            self.source_selected(selection);
            return;
        }

        let host = Arc::clone(&self.host);
        if host.supports_device_enumeration() {
            host.enumerate_devices(Box::new(
                move |result: Result<Vec<MediaDeviceInfo>, WebcamError>| match result {
                    Ok(devices) => self.source_selected(select_from_devices(&devices)),
                    Err(e) => self.abort(e),
                },
            ));
        } else if host.supports_legacy_sources() {
            host.get_sources(Box::new(move |sources: Vec<SourceInfo>| {
                self.source_selected(select_from_sources(&sources))
            }));
        } else {
            self.abort(WebcamError::NotSupported(
                "host can neither enumerate devices nor list sources".into(),
            ));
        }
    }

    fn source_selected(self, selection: SourceSelection) {
        {
            let mut inner = self.inner.lock();
            if self.handle.is_cancelled() {
                self.settle(&mut inner);
                log::debug!("webcam unmounted before media was requested");
                return;
            }
            inner.diagnostics.acquisition_requests += 1;
        }

        let constraints = build_constraints(&self.config, &selection);
        log::debug!(
            "requesting media (audio source: {:?}, video source: {:?})",
            selection.audio_source,
            selection.video_source
        );

        let host = Arc::clone(&self.host);
        host.get_user_media(
            &constraints,
            Box::new(move |result: Result<Arc<dyn MediaStream>, WebcamError>| {
                self.handle_user_media(result)
            }),
        );
    }

    /// Source resolution failed: give up without notifying the delegate.
    fn abort(self, error: WebcamError) {
        log::warn!("{}", error);
        {
            let mut inner = self.inner.lock();
            match error {
                WebcamError::EnumerationFailed(_) => inner.diagnostics.enumeration_failures += 1,
                _ => inner.diagnostics.sources_unavailable += 1,
            }
            if self.settle(&mut inner) {
                return;
            }
            inner.state = AcquisitionState::Idle;
        }
        self.notify_state(&AcquisitionState::Idle);
    }

    fn handle_user_media(self, result: Result<Arc<dyn MediaStream>, WebcamError>) {
        let mut inner = self.inner.lock();
        if self.settle(&mut inner) {
            inner.diagnostics.late_results_discarded += 1;
            drop(inner);
            match result {
                Ok(stream) => {
                    log::warn!(
                        "media stream {} arrived after unmount, stopping it",
                        stream.id()
                    );
                    stop_stream(stream.as_ref());
                }
                Err(e) => log::debug!("media request failed after unmount: {}", e),
            }
            return;
        }

        match result {
            Err(error) => {
                inner.state = AcquisitionState::Failed(error.clone());
                inner.diagnostics.acquisition_failures += 1;
                drop(inner);

                log::info!("media acquisition failed: {}", error);
                self.notify_state(&AcquisitionState::Failed(error.clone()));
                if let Some(delegate) = &self.delegate {
                    delegate.on_user_media(Some(&error));
                }
            }
            Ok(stream) => {
                if stream.video_tracks().is_empty() {
                    log::error!("host granted stream {} without a video track", stream.id());
                }
                let src = self.host.create_object_url(&stream);
                self.coordinator.register_tracks(track_ids(stream.as_ref()));
                if let Some(previous) = &inner.src {
                    log::debug!("replacing playback handle {} without revoking it", previous);
                }
                log::info!("media stream {} acquired ({})", stream.id(), src);
                inner.streams.push(stream);
                inner.src = Some(src);
                inner.state = AcquisitionState::Active;
                drop(inner);

                self.notify_state(&AcquisitionState::Active);
                if let Some(delegate) = &self.delegate {
                    delegate.on_user_media(None);
                }
            }
        }
    }

    /// Mark the host call resolved. Returns whether the owner was torn down
    /// meanwhile, in which case the guard it left behind is released here.
    fn settle(&self, inner: &mut WebcamInner) -> bool {
        inner.in_flight = false;
        let cancelled = self.handle.is_cancelled();
        if cancelled && inner.holds_guard {
            inner.holds_guard = false;
            self.coordinator.release();
        }
        cancelled
    }

    fn set_state(&self, state: AcquisitionState) {
        self.inner.lock().state = state.clone();
        self.notify_state(&state);
    }

    fn notify_state(&self, state: &AcquisitionState) {
        if let Some(delegate) = &self.delegate {
            delegate.on_state_changed(state);
        }
    }
}
