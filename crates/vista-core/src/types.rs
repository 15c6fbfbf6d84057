//! Core types for Vista

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a user-facing banner message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSeverity {
    Info,
    Error,
}

/// User-facing banner payload carried by error states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageModel {
    pub severity: MessageSeverity,
    /// Message shown in the banner
    pub text: String,
    /// Label of the action button, if the banner offers one
    pub button_text: Option<String>,
}

impl MessageModel {
    pub fn error(text: impl Into<String>, button_text: Option<&str>) -> Self {
        Self {
            severity: MessageSeverity::Error,
            text: text.into(),
            button_text: button_text.map(str::to_owned),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: MessageSeverity::Info,
            text: text.into(),
            button_text: None,
        }
    }
}

/// What is being resolved before the engine can be prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchTarget {
    /// Resolving the playback URL
    UrlAccess,
    /// Resolving the ad (VAST) tag URL
    Vast,
}

/// Engine preparation in progress, plain or ad-stitched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preparing {
    Video {
        url: String,
        /// Resume position in milliseconds, if any
        requested_position: Option<u64>,
    },
    Vast {
        url: String,
        requested_position: Option<u64>,
        vast_url: String,
    },
}

impl Preparing {
    pub fn url(&self) -> &str {
        match self {
            Preparing::Video { url, .. } | Preparing::Vast { url, .. } => url,
        }
    }

    pub fn requested_position(&self) -> Option<u64> {
        match self {
            Preparing::Video {
                requested_position, ..
            }
            | Preparing::Vast {
                requested_position, ..
            } => *requested_position,
        }
    }
}

/// Active playback, plain content or a stitched ad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Playing {
    VideoFile,
    Vas { show_skip_button: bool },
}

/// Terminal-until-retry error states, each carrying its banner payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorState {
    /// The user must be signed in to watch this video, but is not, or their
    /// authentication failed
    Unauthorized(MessageModel),
    /// The user must pay to become able to watch this video
    PaymentRequired(MessageModel),
    /// The user is not allowed to access this video file, e.g. their IP is
    /// outside the authorized range
    ForbiddenAccess(MessageModel),
    /// The user is no longer authorized, e.g. too many concurrent viewers on
    /// the same account
    AuthenticationTimeout(MessageModel),
    /// The video file has not started yet (mostly live streams)
    ComingSoon(MessageModel),
    /// The announced start time has passed but the stream has not started
    ComingSoonPassed(MessageModel),
    /// The engine is not able to play the video file
    Playing(MessageModel),
    /// The streaming is finished
    Finished(MessageModel),
    /// No internet connection available
    NoInternet(MessageModel),
    /// Anything not covered above
    General(MessageModel),
}

impl ErrorState {
    pub fn message(&self) -> &MessageModel {
        match self {
            ErrorState::Unauthorized(m)
            | ErrorState::PaymentRequired(m)
            | ErrorState::ForbiddenAccess(m)
            | ErrorState::AuthenticationTimeout(m)
            | ErrorState::ComingSoon(m)
            | ErrorState::ComingSoonPassed(m)
            | ErrorState::Playing(m)
            | ErrorState::Finished(m)
            | ErrorState::NoInternet(m)
            | ErrorState::General(m) => m,
        }
    }
}

/// Player state machine states
///
/// Exactly one value is current per session; every transition is a total
/// replacement of the previous value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerState {
    /// Initial state, nothing loaded
    Idle,
    /// Resolving a playback or ad URL before engine preparation
    Fetching(FetchTarget),
    /// Sentinel instructing the caller to begin preparation
    NeedToPrepare,
    /// Engine is being configured
    Preparing(Preparing),
    /// Engine reports buffering
    Buffering,
    /// Active playback
    Playing(Playing),
    /// Playback suspended by user or lifecycle
    Pause,
    /// Ad overlay shown outside normal playback
    DisplayingVas { show_skip_button: bool },
    /// Terminal until explicit user retry
    Error(ErrorState),
    /// Playback reached its natural end
    Done,
    /// Hard terminal, reached only via explicit external stop
    Stop,
}

impl PlayerState {
    pub fn is_error(&self) -> bool {
        matches!(self, PlayerState::Error(_))
    }

    /// True while the loading indicator should be shown
    pub fn shows_loading_indicator(&self) -> bool {
        matches!(
            self,
            PlayerState::Buffering | PlayerState::Preparing(_) | PlayerState::Fetching(_)
        )
    }

    /// True only when playback reached its natural end
    pub fn shows_replay_button(&self) -> bool {
        matches!(self, PlayerState::Done)
    }

    /// True when the binding layer should tear the engine down
    pub fn requires_engine_stop(&self) -> bool {
        matches!(self, PlayerState::NeedToPrepare | PlayerState::Error(_))
    }

    pub fn is_coming_soon(&self) -> bool {
        matches!(self, PlayerState::Error(ErrorState::ComingSoon(_)))
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerState::Idle => write!(f, "idle"),
            PlayerState::Fetching(FetchTarget::UrlAccess) => write!(f, "fetching(url-access)"),
            PlayerState::Fetching(FetchTarget::Vast) => write!(f, "fetching(vast)"),
            PlayerState::NeedToPrepare => write!(f, "need-to-prepare"),
            PlayerState::Preparing(Preparing::Video { .. }) => write!(f, "preparing(video)"),
            PlayerState::Preparing(Preparing::Vast { .. }) => write!(f, "preparing(vast)"),
            PlayerState::Buffering => write!(f, "buffering"),
            PlayerState::Playing(Playing::VideoFile) => write!(f, "playing(video-file)"),
            PlayerState::Playing(Playing::Vas { .. }) => write!(f, "playing(vas)"),
            PlayerState::Pause => write!(f, "pause"),
            PlayerState::DisplayingVas { .. } => write!(f, "displaying-vas"),
            PlayerState::Error(_) => write!(f, "error"),
            PlayerState::Done => write!(f, "done"),
            PlayerState::Stop => write!(f, "stop"),
        }
    }
}

/// A quality rendition the user can pin, or the synthetic auto entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityTrack {
    pub group_index: i32,
    pub track_index: i32,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub default: bool,
}

impl QualityTrack {
    /// Stable identity key
    pub fn id(&self) -> String {
        format!("{}-{}", self.group_index, self.track_index)
    }

    /// True for the synthetic auto-quality entry
    pub fn is_auto(&self) -> bool {
        self.group_index == -1 && self.track_index == -1
    }
}

/// An audio rendition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub title: String,
    pub group_index: i32,
    pub track_index: i32,
    pub default: bool,
}

impl AudioTrack {
    pub fn id(&self) -> String {
        format!("{}-{}", self.group_index, self.track_index)
    }
}

/// A subtitle rendition, or the synthetic no-subtitle entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub title: String,
    pub group_index: i32,
    pub track_index: i32,
    pub default: bool,
}

impl SubtitleTrack {
    pub fn id(&self) -> String {
        format!("{}-{}", self.group_index, self.track_index)
    }

    /// True for the synthetic no-subtitle entry
    pub fn is_no_subtitle(&self) -> bool {
        self.group_index == -1 && self.track_index == -1
    }
}

/// Any selectable track, for heterogeneous picker lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoTrackModel {
    Quality(QualityTrack),
    Audio(AudioTrack),
    Subtitle(SubtitleTrack),
}

impl VideoTrackModel {
    pub fn id(&self) -> String {
        match self {
            VideoTrackModel::Quality(t) => t.id(),
            VideoTrackModel::Audio(t) => t.id(),
            VideoTrackModel::Subtitle(t) => t.id(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            VideoTrackModel::Quality(t) => &t.title,
            VideoTrackModel::Audio(t) => &t.title,
            VideoTrackModel::Subtitle(t) => &t.title,
        }
    }

    pub fn is_default(&self) -> bool {
        match self {
            VideoTrackModel::Quality(t) => t.default,
            VideoTrackModel::Audio(t) => t.default,
            VideoTrackModel::Subtitle(t) => t.default,
        }
    }
}

/// A playback speed preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoSpeedModel {
    pub title: &'static str,
    pub value: f32,
}

/// Track lists and picture dimensions derived from engine track metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfoModel {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality_tracks: Vec<QualityTrack>,
    pub audio_tracks: Vec<AudioTrack>,
    pub subtitle_tracks: Vec<SubtitleTrack>,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Enable the periodic playback-report loop
    pub report_playback: bool,
    /// Interval between playback reports
    pub report_interval: Duration,
    /// Interval between position-poll ticks on the consumer side
    pub position_poll_interval: Duration,
    /// Request code identifying report-path errors coming back from the host
    pub report_request_code: Option<i32>,
    /// Whether the content supports seeking within a live window
    pub has_time_shift: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            report_playback: false,
            report_interval: Duration::from_secs(30),
            position_poll_interval: Duration::from_secs(1),
            report_request_code: None,
            has_time_shift: false,
        }
    }
}
