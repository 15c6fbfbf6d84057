//! One-shot UI command dispatch
//!
//! Distinct from the state observable: each command is delivered to the
//! consumer exactly once and never redelivered on re-subscription. The state
//! channel, by contrast, always hands new subscribers its latest value.

use crate::engine::TrackSelectionUpdate;
use crate::types::{QualityTrack, VideoSpeedModel};
use tokio::sync::mpsc;
use tracing::debug;

/// One-shot actions consumed by the view/engine binding layer
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Build and prepare the engine for the given source
    PreparePlayer {
        video_url: String,
        requested_position: Option<u64>,
        vast_url: Option<String>,
    },
    ShowSpeedPicker {
        current: VideoSpeedModel,
    },
    ShowQualityPicker {
        current: QualityTrack,
        available: Vec<QualityTrack>,
    },
    /// Apply a new playback speed to the engine
    UpdatePlaybackParameters {
        speed: f32,
    },
    /// Apply a track-selection override to the engine's selector
    UpdateTrackSelection(TrackSelectionUpdate),
    /// Flip the orientation flag; the orientation system is the source of
    /// truth, so this is idempotent from the dispatcher's perspective
    ToggleFullScreen,
    /// Start or stop the consumer's position-poll loop. `start: true` is a
    /// no-op while the loop already runs; `start: false` cancels it
    /// unconditionally
    SetPositionPolling {
        start: bool,
    },
    /// Relay of the engine controller overlay visibility
    SetControllerVisible {
        visible: bool,
    },
}

/// Sending half held by the session
#[derive(Clone)]
pub struct CommandDispatcher {
    tx: mpsc::UnboundedSender<PlayerCommand>,
}

impl CommandDispatcher {
    pub fn send(&self, command: PlayerCommand) {
        if self.tx.send(command).is_err() {
            debug!("command dropped, consumer gone");
        }
    }
}

/// Consuming half held by the binding layer; each command is yielded at most
/// once
pub struct CommandStream {
    rx: mpsc::UnboundedReceiver<PlayerCommand>,
}

impl CommandStream {
    /// Wait for the next command
    pub async fn next(&mut self) -> Option<PlayerCommand> {
        self.rx.recv().await
    }

    /// Drain one command without waiting
    pub fn try_next(&mut self) -> Option<PlayerCommand> {
        self.rx.try_recv().ok()
    }
}

pub fn command_channel() -> (CommandDispatcher, CommandStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandDispatcher { tx }, CommandStream { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commands_delivered_once_in_order() {
        let (dispatcher, mut stream) = command_channel();

        dispatcher.send(PlayerCommand::ToggleFullScreen);
        dispatcher.send(PlayerCommand::SetPositionPolling { start: true });

        assert_eq!(stream.next().await, Some(PlayerCommand::ToggleFullScreen));
        assert_eq!(
            stream.next().await,
            Some(PlayerCommand::SetPositionPolling { start: true })
        );
        // Nothing is redelivered
        assert_eq!(stream.try_next(), None);
    }

    #[tokio::test]
    async fn test_send_without_consumer_does_not_panic() {
        let (dispatcher, stream) = command_channel();
        drop(stream);
        dispatcher.send(PlayerCommand::ToggleFullScreen);
    }
}
