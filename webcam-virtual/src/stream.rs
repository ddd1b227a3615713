use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use webcam_core::{MediaStream, MediaTrack, TrackKind};

/// A track of a virtual stream.
#[derive(Debug)]
pub struct VirtualTrack {
    id: String,
    kind: TrackKind,
    label: String,
    live: AtomicBool,
}

impl VirtualTrack {
    pub fn new(id: impl Into<String>, kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            live: AtomicBool::new(true),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl MediaTrack for VirtualTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            log::debug!("virtual track {} stopped", self.id);
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// Stream produced by `VirtualHost::get_user_media`.
#[derive(Debug)]
pub struct VirtualStream {
    id: String,
    resolution: (u32, u32),
    aggregate_stop: bool,
    video: Arc<VirtualTrack>,
    audio: Option<Arc<VirtualTrack>>,
}

impl VirtualStream {
    pub fn new(
        id: impl Into<String>,
        resolution: (u32, u32),
        aggregate_stop: bool,
        video: VirtualTrack,
        audio: Option<VirtualTrack>,
    ) -> Self {
        Self {
            id: id.into(),
            resolution,
            aggregate_stop,
            video: Arc::new(video),
            audio: audio.map(Arc::new),
        }
    }

    /// Camera resolution the video track produces.
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn video_track(&self) -> &Arc<VirtualTrack> {
        &self.video
    }

    pub fn audio_track(&self) -> Option<&Arc<VirtualTrack>> {
        self.audio.as_ref()
    }

    /// True while any track is still live.
    pub fn is_active(&self) -> bool {
        self.video.is_live() || self.audio.as_ref().is_some_and(|t| t.is_live())
    }
}

impl MediaStream for VirtualStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports_aggregate_stop(&self) -> bool {
        self.aggregate_stop
    }

    fn stop(&self) {
        self.video.stop();
        if let Some(audio) = &self.audio {
            audio.stop();
        }
    }

    fn video_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        vec![Arc::clone(&self.video) as Arc<dyn MediaTrack>]
    }

    fn audio_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.audio
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn MediaTrack>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(aggregate_stop: bool) -> VirtualStream {
        VirtualStream::new(
            "s1",
            (640, 480),
            aggregate_stop,
            VirtualTrack::new("s1-video", TrackKind::Video, "Virtual Camera"),
            Some(VirtualTrack::new("s1-audio", TrackKind::Audio, "Virtual Mic")),
        )
    }

    #[test]
    fn aggregate_stop_ends_every_track() {
        let s = stream(true);
        assert!(s.is_active());
        MediaStream::stop(&s);
        assert!(!s.video_track().is_live());
        assert!(!s.audio_track().unwrap().is_live());
        assert!(!s.is_active());
    }

    #[test]
    fn track_listing_by_kind() {
        let s = stream(false);
        assert_eq!(s.video_tracks().len(), 1);
        assert_eq!(s.audio_tracks()[0].kind(), TrackKind::Audio);

        let video_only = VirtualStream::new(
            "s2",
            (320, 240),
            false,
            VirtualTrack::new("s2-video", TrackKind::Video, "cam"),
            None,
        );
        assert!(video_only.audio_tracks().is_empty());
    }

    #[test]
    fn per_track_stop_is_observable() {
        let s = stream(false);
        for track in s.video_tracks() {
            track.stop();
        }
        assert!(!s.video_track().is_live());
        assert!(s.is_active());
    }
}
