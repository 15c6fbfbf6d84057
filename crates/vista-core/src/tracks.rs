//! Track and quality derivation
//!
//! Pure functions turning the engine's track-metadata report into the
//! user-facing quality/audio/subtitle option lists, with the synthetic
//! auto-quality and no-subtitle entries injected.

use crate::engine::{FormatSupport, MappedTrackInfo, TrackFormat, TrackKind};
use crate::types::{AudioTrack, QualityTrack, SubtitleTrack, VideoInfoModel};

/// The synthetic auto-quality entry, always first in the quality list
pub fn auto_quality_track() -> QualityTrack {
    QualityTrack {
        group_index: -1,
        track_index: -1,
        title: "Auto".to_string(),
        width: u32::MAX,
        height: u32::MAX,
        default: true,
    }
}

/// The synthetic no-subtitle entry, appended last to non-empty subtitle lists
pub fn no_subtitle_track() -> SubtitleTrack {
    SubtitleTrack {
        title: "No subtitle".to_string(),
        group_index: -1,
        track_index: -1,
        default: false,
    }
}

/// First renderer of the requested kind with a non-empty group list
pub fn renderer_index(info: &MappedTrackInfo, kind: TrackKind) -> Option<usize> {
    info.renderers
        .iter()
        .position(|r| r.kind == kind && !r.groups.is_empty())
}

fn handled_formats(
    info: &MappedTrackInfo,
    renderer: usize,
) -> impl Iterator<Item = (i32, i32, &TrackFormat)> {
    info.renderers[renderer]
        .groups
        .iter()
        .enumerate()
        .flat_map(|(group_index, group)| {
            group
                .formats
                .iter()
                .enumerate()
                .filter(|(_, format)| format.support == FormatSupport::Handled)
                .map(move |(track_index, format)| {
                    (group_index as i32, track_index as i32, format)
                })
        })
}

fn non_empty_label(format: &TrackFormat) -> Option<&str> {
    format.label.as_deref().filter(|label| !label.is_empty())
}

/// Quality options for natively supported entries, highest resolution first,
/// with the auto entry prepended. `None` when no video renderer is mapped.
pub fn quality_tracks(info: &MappedTrackInfo) -> Option<Vec<QualityTrack>> {
    let renderer = renderer_index(info, TrackKind::Video)?;
    let mut tracks: Vec<QualityTrack> = handled_formats(info, renderer)
        .map(|(group_index, track_index, format)| QualityTrack {
            group_index,
            track_index,
            title: format!("{}p", format.height),
            width: format.width,
            height: format.height,
            default: false,
        })
        .collect();
    tracks.insert(0, auto_quality_track());
    tracks.sort_by(|a, b| b.width.cmp(&a.width));
    Some(tracks)
}

/// Audio options; entries without a label are skipped. `None` when no audio
/// renderer is mapped.
pub fn audio_tracks(info: &MappedTrackInfo) -> Option<Vec<AudioTrack>> {
    let renderer = renderer_index(info, TrackKind::Audio)?;
    Some(
        handled_formats(info, renderer)
            .filter_map(|(group_index, track_index, format)| {
                non_empty_label(format).map(|label| AudioTrack {
                    title: label.to_string(),
                    group_index,
                    track_index,
                    default: format.default,
                })
            })
            .collect(),
    )
}

/// Subtitle options; entries without a label are skipped. A non-empty list
/// gets the no-subtitle entry appended, flagged default only when no real
/// subtitle track was. `None` when no text renderer is mapped.
pub fn subtitle_tracks(info: &MappedTrackInfo) -> Option<Vec<SubtitleTrack>> {
    let renderer = renderer_index(info, TrackKind::Text)?;
    let mut tracks: Vec<SubtitleTrack> = handled_formats(info, renderer)
        .filter_map(|(group_index, track_index, format)| {
            non_empty_label(format).map(|label| SubtitleTrack {
                title: label.to_string(),
                group_index,
                track_index,
                default: format.default,
            })
        })
        .collect();
    if !tracks.is_empty() {
        let has_default = tracks.iter().any(|t| t.default);
        let mut off = no_subtitle_track();
        off.default = !has_default;
        tracks.push(off);
    }
    Some(tracks)
}

/// Full derived video info; picture dimensions come from the first non-auto
/// quality entry
pub fn video_info(info: &MappedTrackInfo) -> VideoInfoModel {
    let quality = quality_tracks(info).unwrap_or_default();
    let (width, height) = quality
        .iter()
        .find(|t| !t.is_auto())
        .map(|t| (Some(t.width), Some(t.height)))
        .unwrap_or((None, None));
    VideoInfoModel {
        width,
        height,
        quality_tracks: quality,
        audio_tracks: audio_tracks(info).unwrap_or_default(),
        subtitle_tracks: subtitle_tracks(info).unwrap_or_default(),
    }
}
