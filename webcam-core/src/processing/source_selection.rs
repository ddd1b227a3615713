//! Source resolution and constraint building for acquisition requests.

use crate::models::config::WebcamConfiguration;
use crate::models::media_models::{
    AudioConstraints, DeviceKind, LegacySourceKind, MediaConstraints, MediaDeviceInfo,
    SourceHint, SourceInfo, SourceSelection, VideoConstraints,
};

/// Pick sources from an enumeration result. The last device of each input
/// kind wins.
pub fn select_from_devices(devices: &[MediaDeviceInfo]) -> SourceSelection {
    let mut selection = SourceSelection::default();
    for device in devices {
        match device.kind {
            DeviceKind::AudioInput => selection.audio_source = Some(device.device_id.clone()),
            DeviceKind::VideoInput => selection.video_source = Some(device.device_id.clone()),
            DeviceKind::AudioOutput => {}
        }
    }
    selection
}

/// Pick sources from a legacy source listing. The last source of each kind
/// wins.
pub fn select_from_sources(sources: &[SourceInfo]) -> SourceSelection {
    let mut selection = SourceSelection::default();
    for source in sources {
        match source.kind {
            LegacySourceKind::Audio => selection.audio_source = Some(source.id.clone()),
            LegacySourceKind::Video => selection.video_source = Some(source.id.clone()),
        }
    }
    selection
}

/// Build acquisition constraints.
///
/// Video always carries the facing-mode hint. Audio is present only when
/// enabled and carries the selected source as an optional hint. The video
/// source takes no part in the request.
pub fn build_constraints(
    config: &WebcamConfiguration,
    selection: &SourceSelection,
) -> MediaConstraints {
    let audio = config.audio.then(|| AudioConstraints {
        optional: vec![SourceHint {
            source_id: selection.audio_source.clone(),
        }],
    });

    MediaConstraints {
        video: VideoConstraints {
            facing_mode: config.facing_mode.clone(),
        },
        audio,
    }
}
