use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::FacingMode;

/// Kind reported by device enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    AudioInput,
    VideoInput,
    AudioOutput,
}

/// A media device as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    pub label: String,
    pub group_id: String,
}

impl MediaDeviceInfo {
    pub fn new(device_id: &str, kind: DeviceKind, label: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            kind,
            label: label.to_string(),
            group_id: String::new(),
        }
    }
}

/// Kind reported by the legacy source-listing capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacySourceKind {
    Audio,
    Video,
}

/// A capture source from the legacy listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub id: String,
    pub kind: LegacySourceKind,
    pub label: String,
}

impl SourceInfo {
    pub fn new(id: &str, kind: LegacySourceKind, label: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            label: label.to_string(),
        }
    }
}

/// Audio/video sources chosen for an acquisition request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSelection {
    pub audio_source: Option<String>,
    pub video_source: Option<String>,
}

/// Kind of a track inside a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
}

/// Optional source hint; `sourceId` is `null` when nothing was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHint {
    pub source_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConstraints {
    pub optional: Vec<SourceHint>,
}

/// Constraints handed to the host acquisition call.
///
/// Serializes to the host's constraint shape:
/// ```text
/// { "video": { "facingMode": .. }, "audio": { "optional": [{ "sourceId": .. }] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioConstraints>,
}

impl MediaConstraints {
    pub fn requests_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// The audio source hint, if audio was requested with one.
    pub fn audio_source_hint(&self) -> Option<&str> {
        self.audio
            .as_ref()
            .and_then(|audio| audio.optional.first())
            .and_then(|hint| hint.source_id.as_deref())
    }
}

/// Revocable reference binding a stream to a playback element (an object URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackHandle(pub String);

impl PlaybackHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Counters for debugging a widget instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebcamDiagnostics {
    pub acquisition_requests: u64,
    pub acquisition_failures: u64,
    pub enumeration_failures: u64,
    /// Mounts aborted because the host can neither enumerate nor list sources.
    pub sources_unavailable: u64,
    pub late_results_discarded: u64,
    pub surfaces_created: u64,
    pub frames_drawn: u64,
    pub screenshots_taken: u64,
}
