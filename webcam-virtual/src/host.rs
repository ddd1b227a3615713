use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use webcam_core::{
    DeviceKind, DevicesCallback, MediaConstraints, MediaDeviceInfo, MediaHost, MediaStream,
    PlaybackHandle, RasterSurface, SoftwareSurface, SourceInfo, SourcesCallback, TrackKind,
    UserMediaCallback, VideoElementProps, WebcamError,
};

use crate::element::VirtualVideoElement;
use crate::stream::{VirtualStream, VirtualTrack};

/// How the virtual user answers the permission prompt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PermissionPolicy {
    #[default]
    Grant,
    Deny,
    /// The request fails for a reason other than permission.
    Fail(String),
}

/// When asynchronous host calls complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Callbacks run before the host call returns.
    #[default]
    Immediate,
    /// Callbacks are queued until `VirtualHost::resolve_pending`.
    Deferred,
}

type Task = Box<dyn FnOnce() + Send>;

/// Settings a `VirtualHost` is built with.
#[derive(Debug, Clone)]
pub struct VirtualHostBuilder {
    devices: Vec<MediaDeviceInfo>,
    sources: Vec<SourceInfo>,
    user_media: bool,
    device_enumeration: bool,
    legacy_sources: bool,
    permission: PermissionPolicy,
    enumeration_error: Option<String>,
    resolution: (u32, u32),
    aggregate_stop: bool,
    mode: ResolutionMode,
}

impl Default for VirtualHostBuilder {
    fn default() -> Self {
        Self {
            devices: vec![
                MediaDeviceInfo::new("virtual-mic", DeviceKind::AudioInput, "Virtual Microphone"),
                MediaDeviceInfo::new("virtual-cam", DeviceKind::VideoInput, "Virtual Camera"),
            ],
            sources: Vec::new(),
            user_media: true,
            device_enumeration: true,
            legacy_sources: false,
            permission: PermissionPolicy::Grant,
            enumeration_error: None,
            resolution: (1280, 720),
            aggregate_stop: false,
            mode: ResolutionMode::Immediate,
        }
    }
}

impl VirtualHostBuilder {
    pub fn devices(mut self, devices: Vec<MediaDeviceInfo>) -> Self {
        self.devices = devices;
        self
    }

    /// Entries returned by the legacy source listing.
    pub fn sources(mut self, sources: Vec<SourceInfo>) -> Self {
        self.sources = sources;
        self
    }

    pub fn user_media(mut self, available: bool) -> Self {
        self.user_media = available;
        self
    }

    pub fn device_enumeration(mut self, available: bool) -> Self {
        self.device_enumeration = available;
        self
    }

    pub fn legacy_sources(mut self, available: bool) -> Self {
        self.legacy_sources = available;
        self
    }

    pub fn permission(mut self, policy: PermissionPolicy) -> Self {
        self.permission = policy;
        self
    }

    /// Make every device enumeration fail with `message`.
    pub fn fail_enumeration(mut self, message: impl Into<String>) -> Self {
        self.enumeration_error = Some(message.into());
        self
    }

    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = (width, height);
        self
    }

    /// Whether produced streams expose the aggregate `stop()`.
    pub fn aggregate_stop(mut self, supported: bool) -> Self {
        self.aggregate_stop = supported;
        self
    }

    pub fn resolution_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(self) -> Arc<VirtualHost> {
        Arc::new(VirtualHost {
            settings: self,
            state: Mutex::new(HostState::default()),
        })
    }
}

#[derive(Default)]
struct HostState {
    pending: VecDeque<Task>,
    enumeration_calls: usize,
    source_calls: usize,
    user_media_calls: usize,
    last_constraints: Option<MediaConstraints>,
    streams: HashMap<String, Arc<VirtualStream>>,
    object_urls: HashMap<String, String>,
    next_stream: u64,
}

impl HostState {
    /// Forget streams that are stopped and no longer bound to an object URL.
    fn prune_streams(&mut self) {
        let object_urls = &self.object_urls;
        self.streams
            .retain(|id, stream| stream.is_active() || object_urls.values().any(|bound| bound == id));
    }
}

/// In-process media host with a scriptable virtual camera.
///
/// ```text
/// builder() → VirtualHost ──get_user_media──→ VirtualStream (colour bars)
///                  │                                 ↑
///                  └── mount_video(&props) ──→ VirtualVideoElement
/// ```
pub struct VirtualHost {
    settings: VirtualHostBuilder,
    state: Mutex<HostState>,
}

impl VirtualHost {
    pub fn builder() -> VirtualHostBuilder {
        VirtualHostBuilder::default()
    }

    /// Host with the default virtual microphone and 1280x720 camera.
    pub fn new() -> Arc<Self> {
        Self::builder().build()
    }

    fn dispatch(&self, task: Task) {
        match self.settings.mode {
            ResolutionMode::Immediate => task(),
            ResolutionMode::Deferred => self.state.lock().pending.push_back(task),
        }
    }

    /// Complete every queued call. Calls queued while resolving wait for the
    /// next round. Returns the number completed.
    pub fn resolve_pending(&self) -> usize {
        let tasks = std::mem::take(&mut self.state.lock().pending);
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn enumeration_calls(&self) -> usize {
        self.state.lock().enumeration_calls
    }

    pub fn source_calls(&self) -> usize {
        self.state.lock().source_calls
    }

    pub fn user_media_calls(&self) -> usize {
        self.state.lock().user_media_calls
    }

    pub fn last_constraints(&self) -> Option<MediaConstraints> {
        self.state.lock().last_constraints.clone()
    }

    /// Object URLs created and not yet revoked, sorted.
    pub fn live_object_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.state.lock().object_urls.keys().cloned().collect();
        urls.sort();
        urls
    }

    /// Streams still in use: live, or bound to an object URL.
    pub fn streams(&self) -> Vec<Arc<VirtualStream>> {
        let mut state = self.state.lock();
        state.prune_streams();
        let mut streams: Vec<_> = state.streams.values().cloned().collect();
        streams.sort_by(|a, b| a.id().cmp(b.id()));
        streams
    }

    /// Mount the playback element described by `props`.
    pub fn mount_video(
        &self,
        props: &VideoElementProps,
    ) -> Result<Arc<VirtualVideoElement>, WebcamError> {
        let src = props
            .src
            .as_ref()
            .ok_or_else(|| WebcamError::SurfaceUnavailable("video element has no src".into()))?;
        let stream = {
            let state = self.state.lock();
            let stream = state
                .object_urls
                .get(src.as_str())
                .and_then(|id| state.streams.get(id))
                .cloned();
            stream
        }
        .ok_or_else(|| WebcamError::SurfaceUnavailable(format!("unknown object URL {}", src)))?;

        Ok(Arc::new(VirtualVideoElement::for_props(
            stream,
            &props.width,
            &props.height,
        )))
    }

    fn device_label(&self, kind: DeviceKind, fallback: &str) -> String {
        self.settings
            .devices
            .iter()
            .rev()
            .find(|d| d.kind == kind)
            .map(|d| d.label.clone())
            .unwrap_or_else(|| fallback.to_string())
    }

    fn open_stream(&self, constraints: &MediaConstraints) -> Arc<VirtualStream> {
        let index = {
            let mut state = self.state.lock();
            state.next_stream += 1;
            state.next_stream
        };
        let id = format!("virtual-stream-{}", index);
        let video = VirtualTrack::new(
            format!("{}-video", id),
            TrackKind::Video,
            self.device_label(DeviceKind::VideoInput, "Virtual Camera"),
        );
        let audio = constraints.requests_audio().then(|| {
            VirtualTrack::new(
                format!("{}-audio", id),
                TrackKind::Audio,
                self.device_label(DeviceKind::AudioInput, "Virtual Microphone"),
            )
        });
        let stream = Arc::new(VirtualStream::new(
            id.clone(),
            self.settings.resolution,
            self.settings.aggregate_stop,
            video,
            audio,
        ));
        let mut state = self.state.lock();
        state.prune_streams();
        state.streams.insert(id, Arc::clone(&stream));
        stream
    }
}

impl MediaHost for VirtualHost {
    fn has_user_media(&self) -> bool {
        self.settings.user_media
    }

    fn supports_device_enumeration(&self) -> bool {
        self.settings.device_enumeration
    }

    fn enumerate_devices(&self, callback: DevicesCallback) {
        self.state.lock().enumeration_calls += 1;
        let result = match &self.settings.enumeration_error {
            Some(message) => Err(WebcamError::EnumerationFailed(message.clone())),
            None => Ok(self.settings.devices.clone()),
        };
        self.dispatch(Box::new(move || callback(result)));
    }

    fn supports_legacy_sources(&self) -> bool {
        self.settings.legacy_sources
    }

    fn get_sources(&self, callback: SourcesCallback) {
        self.state.lock().source_calls += 1;
        let sources = self.settings.sources.clone();
        self.dispatch(Box::new(move || callback(sources)));
    }

    fn get_user_media(&self, constraints: &MediaConstraints, callback: UserMediaCallback) {
        {
            let mut state = self.state.lock();
            state.user_media_calls += 1;
            state.last_constraints = Some(constraints.clone());
        }
        if let Some(hint) = constraints.audio_source_hint() {
            log::debug!("virtual host ignoring audio source hint {}", hint);
        }

        let result = match &self.settings.permission {
            PermissionPolicy::Grant => Ok(self.open_stream(constraints) as Arc<dyn MediaStream>),
            PermissionPolicy::Deny => Err(WebcamError::PermissionDenied),
            PermissionPolicy::Fail(message) => {
                Err(WebcamError::AcquisitionFailed(message.clone()))
            }
        };
        self.dispatch(Box::new(move || callback(result)));
    }

    fn create_object_url(&self, stream: &Arc<dyn MediaStream>) -> PlaybackHandle {
        let url = format!("blob:virtual/{}", uuid::Uuid::new_v4());
        self.state
            .lock()
            .object_urls
            .insert(url.clone(), stream.id().to_string());
        PlaybackHandle(url)
    }

    fn revoke_object_url(&self, handle: &PlaybackHandle) {
        let mut state = self.state.lock();
        if state.object_urls.remove(handle.as_str()).is_none() {
            log::warn!("revoking unknown object URL {}", handle);
        }
        state.prune_streams();
    }

    fn create_surface(
        &self,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn RasterSurface>, WebcamError> {
        Ok(Box::new(SoftwareSurface::new(width, height)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use webcam_core::{
        AcquisitionCoordinator, Dimension, LegacySourceKind, ScreenshotFormat, VideoElement, Webcam,
        WebcamConfiguration,
    };

    fn widget(host: &Arc<VirtualHost>, config: WebcamConfiguration) -> Webcam {
        Webcam::new(
            config,
            Arc::clone(host) as Arc<dyn MediaHost>,
            Arc::new(AcquisitionCoordinator::new()),
        )
    }

    fn live_widget(host: &Arc<VirtualHost>, config: WebcamConfiguration) -> Webcam {
        let mut webcam = widget(host, config);
        webcam.mount();
        let video = host.mount_video(&webcam.render()).unwrap();
        webcam.bind_video_element(video);
        webcam
    }

    #[test]
    fn screenshots_decode_in_every_format() {
        for format in ScreenshotFormat::ALL {
            let host = VirtualHost::builder().resolution(320, 180).build();
            let config = WebcamConfiguration {
                screenshot_format: format,
                ..Default::default()
            };
            let mut webcam = live_widget(&host, config);

            let url = webcam.get_screenshot().unwrap();
            assert!(url.starts_with(&format!("data:{};base64,", format.mime_type())));

            let (_, bytes) = webcam_core::processing::encoding::parse_data_url(&url).unwrap();
            let decoded = image::load_from_memory_with_format(&bytes, format.image_format()).unwrap();
            // 320x180 video in a 640x480 element fills the width.
            assert_eq!((decoded.width(), decoded.height()), (640, 360));
        }
    }

    #[test]
    fn snapshot_keeps_camera_aspect_ratio() {
        let host = VirtualHost::builder().resolution(640, 480).build();
        let config = WebcamConfiguration {
            screenshot_format: ScreenshotFormat::Png,
            ..Default::default()
        };
        let mut webcam = live_widget(&host, config);

        let snapshot = webcam.capture_snapshot().unwrap();
        let ratio = f64::from(snapshot.metadata.width) / f64::from(snapshot.metadata.height);
        assert_relative_eq!(ratio, 4.0 / 3.0, epsilon = 0.01);
        assert_eq!(snapshot.metadata.checksum.len(), 64);
    }

    #[test]
    fn surface_survives_layout_changes() {
        let host = VirtualHost::new();
        let mut webcam = widget(&host, WebcamConfiguration::default());
        webcam.mount();
        let video = host.mount_video(&webcam.render()).unwrap();
        webcam.bind_video_element(Arc::clone(&video) as Arc<dyn VideoElement>);

        let first = webcam.get_canvas().unwrap();
        video.set_client_size(200.0, 100.0);
        let second = webcam.get_canvas().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(video.frames_rendered(), 2);
    }

    #[test]
    fn unmount_stops_stream_and_revokes_url() {
        let host = VirtualHost::new();
        let mut webcam = live_widget(&host, WebcamConfiguration::default());
        assert_eq!(host.live_object_urls().len(), 1);

        let streams = host.streams();
        assert_eq!(streams.len(), 1);

        webcam.unmount();

        assert!(host.live_object_urls().is_empty());
        assert!(streams.iter().all(|s| !s.is_active()));
        assert!(host.streams().is_empty());
    }

    #[test]
    fn finished_streams_are_not_retained() {
        let host = VirtualHost::new();
        let mut webcam = widget(&host, WebcamConfiguration::default());
        for _ in 0..3 {
            webcam.mount();
            webcam.unmount();
        }
        webcam.mount();

        assert_eq!(host.user_media_calls(), 4);
        let streams = host.streams();
        assert_eq!(streams.len(), 1);
        assert!(streams[0].is_active());
    }

    #[test]
    fn aggregate_stop_streams_are_stopped() {
        let host = VirtualHost::builder().aggregate_stop(true).build();
        let mut webcam = widget(&host, WebcamConfiguration::default());
        webcam.mount();
        let streams = host.streams();
        webcam.unmount();
        assert!(!streams[0].is_active());
    }

    #[test]
    fn audio_track_follows_constraints() {
        let host = VirtualHost::new();
        let mut webcam = widget(
            &host,
            WebcamConfiguration {
                audio: false,
                ..Default::default()
            },
        );
        webcam.mount();

        assert!(!host.last_constraints().unwrap().requests_audio());
        let streams = host.streams();
        let stream = &streams[0];
        assert!(stream.audio_track().is_none());
        assert_eq!(stream.video_track().label(), "Virtual Camera");
    }

    #[test]
    fn denied_permission_reports_error() {
        let host = VirtualHost::builder()
            .permission(PermissionPolicy::Deny)
            .build();
        let mut webcam = widget(&host, WebcamConfiguration::default());
        webcam.mount();

        assert_eq!(webcam.state().error(), Some(&WebcamError::PermissionDenied));
        assert!(host.streams().is_empty());
        assert!(host.mount_video(&webcam.render()).is_err());
    }

    #[test]
    fn failed_request_carries_message() {
        let host = VirtualHost::builder()
            .permission(PermissionPolicy::Fail("camera in use".into()))
            .build();
        let mut webcam = widget(&host, WebcamConfiguration::default());
        webcam.mount();

        assert_eq!(
            webcam.state().error(),
            Some(&WebcamError::AcquisitionFailed("camera in use".into()))
        );
    }

    #[test]
    fn enumeration_failure_makes_no_request() {
        let host = VirtualHost::builder().fail_enumeration("blocked").build();
        let mut webcam = widget(&host, WebcamConfiguration::default());
        webcam.mount();

        assert_eq!(host.enumeration_calls(), 1);
        assert_eq!(host.user_media_calls(), 0);
        assert!(webcam.state().is_idle());
    }

    #[test]
    fn legacy_listing_is_used_without_enumeration() {
        let host = VirtualHost::builder()
            .device_enumeration(false)
            .legacy_sources(true)
            .sources(vec![
                SourceInfo::new("legacy-mic", LegacySourceKind::Audio, "Mic"),
                SourceInfo::new("legacy-cam", LegacySourceKind::Video, "Cam"),
            ])
            .build();
        let mut webcam = widget(&host, WebcamConfiguration::default());
        webcam.mount();

        assert_eq!(host.source_calls(), 1);
        assert_eq!(
            host.last_constraints().unwrap().audio_source_hint(),
            Some("legacy-mic")
        );
        assert!(webcam.has_user_media());
    }

    #[test]
    fn deferred_calls_wait_for_resolution() {
        let host = VirtualHost::builder()
            .resolution_mode(ResolutionMode::Deferred)
            .build();
        let mut webcam = widget(&host, WebcamConfiguration::default());
        webcam.mount();

        assert!(webcam.state().is_requesting());
        assert_eq!(host.pending_count(), 1);
        assert_eq!(host.resolve_pending(), 1);
        assert_eq!(host.pending_count(), 1);
        assert_eq!(host.resolve_pending(), 1);
        assert!(webcam.has_user_media());
    }

    #[test]
    fn stream_granted_after_unmount_is_stopped() {
        let host = VirtualHost::builder()
            .resolution_mode(ResolutionMode::Deferred)
            .build();
        let config = WebcamConfiguration {
            audio_source: Some("virtual-mic".into()),
            video_source: Some("virtual-cam".into()),
            ..Default::default()
        };
        let mut webcam = widget(&host, config);
        webcam.mount();
        let streams = host.streams();
        webcam.unmount();
        host.resolve_pending();

        assert!(!streams[0].is_active());
        assert!(host.live_object_urls().is_empty());
        assert!(host.streams().is_empty());
        assert_eq!(webcam.diagnostics().late_results_discarded, 1);
    }

    #[test]
    fn unresolved_request_blocks_other_widgets_after_unmount() {
        let host = VirtualHost::builder()
            .resolution_mode(ResolutionMode::Deferred)
            .build();
        let coordinator = Arc::new(AcquisitionCoordinator::new());
        let new_widget = || {
            Webcam::new(
                WebcamConfiguration::default(),
                Arc::clone(&host) as Arc<dyn MediaHost>,
                Arc::clone(&coordinator),
            )
        };
        let mut first = new_widget();
        let mut second = new_widget();

        first.mount();
        host.resolve_pending();
        first.unmount();
        second.mount();

        assert_eq!(host.user_media_calls(), 1);
        assert!(host.pending_count() <= 1);
        assert!(coordinator.is_requested());

        host.resolve_pending();
        assert!(!coordinator.is_requested());
        assert!(host.streams().is_empty());

        let mut third = new_widget();
        third.mount();
        host.resolve_pending();
        host.resolve_pending();
        assert!(third.has_user_media());
        assert!(!second.has_user_media());
    }

    #[test]
    fn mount_video_rejects_unknown_src() {
        let host = VirtualHost::new();
        let props = VideoElementProps {
            auto_play: true,
            width: Dimension::Pixels(640.0),
            height: Dimension::Pixels(480.0),
            muted: false,
            src: Some(PlaybackHandle("blob:virtual/missing".into())),
            class_name: None,
        };
        assert!(matches!(
            host.mount_video(&props),
            Err(WebcamError::SurfaceUnavailable(_))
        ));
    }
}
