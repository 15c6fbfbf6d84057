//! Vista Core - Video Player Coordination Library
//!
//! This crate provides the coordination core for video playback UIs:
//! - Playback state machine driven by engine, ad, and lifecycle events
//! - One-shot UI command dispatch (pickers, fullscreen, engine preparation)
//! - Adaptive track policy gated by a connection-quality estimate
//! - Periodic playback reporting and position polling
//! - Track/quality option derivation from engine track metadata
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          Vista Core                            │
//! ├────────────────────────────────────────────────────────────────┤
//! │                                                                │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │  Connection  │  │    Track     │  │    Track     │          │
//! │  │   Monitor    │  │    Policy    │  │  Derivation  │          │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘          │
//! │         │                 │                 │                  │
//! │         └─────────────────┼─────────────────┘                  │
//! │                           │                                    │
//! │                    ┌──────┴──────┐                             │
//! │                    │   Player    │                             │
//! │                    │   Session   │                             │
//! │                    └──────┬──────┘                             │
//! │                           │                                    │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐           │
//! │  │  Reporting   │  │   Command   │  │    Engine    │           │
//! │  │     Loop     │  │   Stream    │  │     Seam     │           │
//! │  └──────────────┘  └─────────────┘  └──────────────┘           │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The playback engine itself (transport, demuxing, decoding, rendering) and
//! the ad-insertion SDK are external collaborators behind the engine seam.

pub mod commands;
pub mod engine;
pub mod error;
pub mod media;
pub mod network;
pub mod policy;
pub mod reporting;
pub mod session;
pub mod tracks;
pub mod types;

pub use commands::{command_channel, CommandDispatcher, CommandStream, PlayerCommand};
pub use engine::{
    AdEvent, AdEventKind, EngineError, EngineEvent, EnginePlaybackState, MappedTrackInfo,
    MediaSource, PlaybackEngine, TrackKind, TrackSelectionUpdate,
};
pub use error::{Error, Result};
pub use media::{MediaType, DEFAULT_SPEED, SPEED_OPTIONS};
pub use network::{ByteCounter, ConnectionMonitor, ConnectionQuality};
pub use policy::{SelectionSession, SmoothTrackPolicy, BLACKLIST_DURATION};
pub use reporting::{
    PlaybackFault, PlaybackReport, PositionPoller, ReportError, ReportingLoop, SessionHooks,
};
pub use session::{PlayerControl, PlayerSession};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Vista Core initialized");
}
