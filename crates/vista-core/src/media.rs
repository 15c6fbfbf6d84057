//! Media classification and playback speed presets

use crate::types::VideoSpeedModel;
use serde::{Deserialize, Serialize};
use url::Url;

/// Demuxer strategy picked from the media url
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Dash,
    Hls,
    SmoothStreaming,
    Progressive,
}

/// Classify a media url by file-extension heuristic
pub fn media_type(url: &Url) -> MediaType {
    let path = url.path().to_lowercase();
    if path.ends_with(".mpd") {
        return MediaType::Dash;
    }
    if path.ends_with(".m3u8") {
        return MediaType::Hls;
    }
    if is_smooth_streaming(&path) {
        return MediaType::SmoothStreaming;
    }
    MediaType::Progressive
}

// Matches ".ism"/".isml" paths, with or without a "/manifest" suffix.
fn is_smooth_streaming(path: &str) -> bool {
    let stem = match path.find("/manifest") {
        Some(idx) => &path[..idx],
        None => path,
    };
    stem.ends_with(".ism") || stem.ends_with(".isml")
}

/// The default playback speed
pub const DEFAULT_SPEED: VideoSpeedModel = VideoSpeedModel {
    title: "Normal",
    value: 1.0,
};

/// The fixed playback speed presets, slowest first
pub const SPEED_OPTIONS: [VideoSpeedModel; 7] = [
    VideoSpeedModel {
        title: "0.5x",
        value: 0.5,
    },
    VideoSpeedModel {
        title: "0.75x",
        value: 0.75,
    },
    DEFAULT_SPEED,
    VideoSpeedModel {
        title: "1.25x",
        value: 1.25,
    },
    VideoSpeedModel {
        title: "1.5x",
        value: 1.5,
    },
    VideoSpeedModel {
        title: "1.75x",
        value: 1.75,
    },
    VideoSpeedModel {
        title: "2x",
        value: 2.0,
    },
];
