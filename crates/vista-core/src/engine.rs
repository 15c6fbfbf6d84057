//! Playback engine seam
//!
//! The engine (demuxing, decoding, rendering, transport) is an external
//! collaborator. This module models the narrow surface the session consumes:
//! the command trait the session issues calls through, the callback events the
//! engine emits, and the track metadata it reports.

use crate::media::MediaType;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Engine-side playback states, as reported by `on_playback_state_changed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePlaybackState {
    Idle,
    Buffering,
    Ready,
    Ended,
}

/// Engine error codes
pub mod error_codes {
    /// Playback position fell outside the server's retained live window
    pub const BEHIND_LIVE_WINDOW: i32 = 1002;
}

/// Classified cause of an engine failure, chainable like the engine's own
/// nested exceptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCauseKind {
    BehindLiveWindow,
    Source,
    Renderer,
    Unexpected,
}

/// One link of an engine error's cause chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineErrorCause {
    pub kind: EngineCauseKind,
    pub cause: Option<Box<EngineErrorCause>>,
}

impl EngineErrorCause {
    pub fn new(kind: EngineCauseKind) -> Self {
        Self { kind, cause: None }
    }

    pub fn with_cause(kind: EngineCauseKind, cause: EngineErrorCause) -> Self {
        Self {
            kind,
            cause: Some(Box::new(cause)),
        }
    }
}

/// A fatal error reported by the playback engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("engine error {code}: {message}")]
pub struct EngineError {
    pub code: i32,
    pub message: String,
    pub cause: Option<EngineErrorCause>,
}

impl EngineError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: EngineErrorCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// True when the error code says behind-live-window and a matching cause
    /// is present somewhere in the nested chain
    pub fn is_behind_live_window(&self) -> bool {
        if self.code != error_codes::BEHIND_LIVE_WINDOW {
            return false;
        }
        let mut cause = self.cause.as_ref();
        while let Some(c) = cause {
            if c.kind == EngineCauseKind::BehindLiveWindow {
                return true;
            }
            cause = c.cause.as_deref();
        }
        false
    }
}

/// Callback events emitted by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PlaybackStateChanged {
        play_when_ready: bool,
        state: EnginePlaybackState,
    },
    PlayerError(EngineError),
}

/// A media source the engine can be prepared with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub url: Url,
    pub media_type: MediaType,
    /// Ad tag to stitch into playback, if any
    pub vast_url: Option<Url>,
}

impl MediaSource {
    /// Classify an opaque url string into a playable source
    pub fn from_url(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::InvalidMediaUrl(e.to_string()))?;
        let media_type = crate::media::media_type(&url);
        Ok(Self {
            url,
            media_type,
            vast_url: None,
        })
    }

    pub fn with_vast(mut self, vast_url: &str) -> Result<Self> {
        let vast = Url::parse(vast_url).map_err(|e| Error::InvalidMediaUrl(e.to_string()))?;
        self.vast_url = Some(vast);
        Ok(self)
    }
}

/// Commands the session issues to the playback engine
///
/// The engine owns its own internal locking; callers never assume atomicity
/// across multiple calls.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    async fn prepare(&self, source: MediaSource) -> Result<()>;
    async fn seek_to(&self, position_ms: u64) -> Result<()>;
    async fn set_play_when_ready(&self, play: bool) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn release(&self) -> Result<()>;
}

/// Media component a renderer handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
    Text,
}

/// Whether the engine can natively play a given format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatSupport {
    Handled,
    ExceedsCapabilities,
    Unsupported,
}

/// One rendition inside a track group, as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackFormat {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Engine flagged this format as the default selection
    pub default: bool,
    pub support: FormatSupport,
}

/// A set of alternative renditions for one media component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackGroup {
    pub formats: Vec<TrackFormat>,
}

/// Track groups mapped to one renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererInfo {
    pub kind: TrackKind,
    pub groups: Vec<TrackGroup>,
}

/// The engine's full track-metadata report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedTrackInfo {
    pub renderers: Vec<RendererInfo>,
}

/// A track-selection parameter override for the engine's selector
///
/// `override_track: None` clears any existing override so the engine's own
/// adaptive logic takes back over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSelectionUpdate {
    pub renderer: TrackKind,
    pub disable_renderer: bool,
    pub override_track: Option<(i32, i32)>,
}

/// Ad lifecycle event kinds forwarded from the ad-insertion engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdEventKind {
    Loaded,
    Started,
    Paused,
    Resumed,
    Skipped,
    Completed,
    AllAdsCompleted,
    Other(String),
}

/// An opaque ad lifecycle event; the session only forwards these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdEvent {
    pub kind: AdEventKind,
    /// SDK-specific event data, passed through untouched
    pub metadata: serde_json::Value,
}

impl AdEvent {
    pub fn new(kind: AdEventKind) -> Self {
        Self {
            kind,
            metadata: serde_json::Value::Null,
        }
    }
}
