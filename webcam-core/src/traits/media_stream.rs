use std::sync::Arc;

use crate::models::media_models::TrackKind;

/// A single audio or video track of a stream.
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    /// Stop the track. Stopping twice is harmless.
    fn stop(&self);

    fn is_live(&self) -> bool;
}

/// A live, host-managed audio/video stream.
pub trait MediaStream: Send + Sync {
    fn id(&self) -> &str;

    /// Whether the stream exposes a single aggregate `stop()`.
    ///
    /// Older hosts do; newer ones only stop per track.
    fn supports_aggregate_stop(&self) -> bool;

    /// Aggregate stop. Only called when `supports_aggregate_stop()` is true.
    fn stop(&self);

    fn video_tracks(&self) -> Vec<Arc<dyn MediaTrack>>;

    fn audio_tracks(&self) -> Vec<Arc<dyn MediaTrack>>;
}

/// Stop a stream with whichever mechanism it exposes.
pub fn stop_stream(stream: &dyn MediaStream) {
    if stream.supports_aggregate_stop() {
        stream.stop();
        return;
    }
    for track in stream.video_tracks() {
        track.stop();
    }
    for track in stream.audio_tracks() {
        track.stop();
    }
}

/// IDs of every track in `stream`, video first.
pub fn track_ids(stream: &dyn MediaStream) -> Vec<String> {
    stream
        .video_tracks()
        .iter()
        .chain(stream.audio_tracks().iter())
        .map(|track| track.id().to_string())
        .collect()
}
