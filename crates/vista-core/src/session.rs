//! Player session - the playback state machine
//!
//! Coordinates:
//! - `PlayerState` transitions driven by engine callbacks, user intents, and
//!   host lifecycle events
//! - One-shot command dispatch to the view/engine binding layer
//! - The playback-report loop
//! - Track selection overrides and picker data

use crate::commands::{command_channel, CommandDispatcher, CommandStream, PlayerCommand};
use crate::engine::{
    AdEvent, EngineError, EngineEvent, EnginePlaybackState, MappedTrackInfo, TrackKind,
    TrackSelectionUpdate,
};
use crate::media::DEFAULT_SPEED;
use crate::reporting::{PlaybackFault, ReportError, ReportingLoop, SessionHooks};
use crate::tracks;
use crate::types::*;
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

/// Player controls the host view can forward clicks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerControl {
    Settings,
    FullScreenToggle,
    Replay,
}

struct SessionInner {
    video_url: Option<String>,
    vast_url: Option<String>,
    /// Last playback position, captured on stop when time-shift is on
    last_position: Option<u64>,
    has_time_shift: bool,
    engine_state: EnginePlaybackState,
    selected_speed: VideoSpeedModel,
    selected_quality: QualityTrack,
    selected_subtitle: SubtitleTrack,
    selected_audio: Option<AudioTrack>,
    track_info: Option<MappedTrackInfo>,
}

/// Player session managing a single playback
///
/// The session is the only writer of [`PlayerState`]; the host observes the
/// state channel (latest value redelivered to new subscribers) and the
/// one-shot command stream, and forwards intents back in.
pub struct PlayerSession {
    id: SessionId,
    config: SessionConfig,
    hooks: Arc<SessionHooks>,
    state_tx: watch::Sender<PlayerState>,
    controller_enabled_tx: watch::Sender<bool>,
    commands: CommandDispatcher,
    reporting: ReportingLoop,
    inner: RwLock<SessionInner>,
}

impl PlayerSession {
    /// Create a new session and the command stream its consumer drains
    pub fn new(config: SessionConfig, hooks: SessionHooks) -> Result<(Self, CommandStream)> {
        if config.report_playback && hooks.on_report.is_none() {
            return Err(Error::MissingHook("on_report"));
        }

        let id = SessionId::new();
        let hooks = Arc::new(hooks);
        let (state_tx, _) = watch::channel(PlayerState::Idle);
        let (controller_enabled_tx, _) = watch::channel(true);
        let (commands, command_stream) = command_channel();
        let reporting = ReportingLoop::new(id, config.report_interval, Arc::clone(&hooks));

        let session = Self {
            id,
            hooks,
            state_tx,
            controller_enabled_tx,
            commands,
            reporting,
            inner: RwLock::new(SessionInner {
                video_url: None,
                vast_url: None,
                last_position: None,
                has_time_shift: config.has_time_shift,
                engine_state: EnginePlaybackState::Idle,
                selected_speed: DEFAULT_SPEED,
                selected_quality: tracks::auto_quality_track(),
                selected_subtitle: tracks::no_subtitle_track(),
                selected_audio: None,
                track_info: None,
            }),
            config,
        };
        Ok((session, command_stream))
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Get the current state
    pub fn state(&self) -> PlayerState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state changes; the latest value is delivered immediately
    pub fn subscribe(&self) -> watch::Receiver<PlayerState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, new_state: PlayerState) {
        let current = self.state_tx.borrow().clone();
        info!(session_id = %self.id, from = %current, to = %new_state, "state transition");
        self.state_tx.send_replace(new_state);
    }

    /// User requests playback of a url, optionally ad-stitched
    pub async fn play(
        &self,
        url: impl Into<String>,
        requested_position: Option<u64>,
        vast_url: Option<String>,
    ) {
        let url = url.into();
        {
            let mut inner = self.inner.write().await;
            inner.video_url = Some(url.clone());
            inner.vast_url = vast_url.clone();
        }
        let state = match vast_url {
            Some(vast_url) => PlayerState::Preparing(Preparing::Vast {
                url,
                requested_position,
                vast_url,
            }),
            None => PlayerState::Preparing(Preparing::Video {
                url,
                requested_position,
            }),
        };
        self.set_state(state);
    }

    /// Re-enter preparation from the stored urls. Returns false when no url
    /// was stored.
    async fn reprepare_from_stored(&self, requested_position: Option<u64>) -> bool {
        let inner = self.inner.read().await;
        let Some(url) = inner.video_url.clone() else {
            return false;
        };
        let state = match inner.vast_url.clone() {
            Some(vast_url) => PlayerState::Preparing(Preparing::Vast {
                url,
                requested_position,
                vast_url,
            }),
            None => PlayerState::Preparing(Preparing::Video {
                url,
                requested_position,
            }),
        };
        drop(inner);
        self.set_state(state);
        true
    }

    /// Engine playback-state callback
    pub async fn on_playback_state_changed(
        &self,
        play_when_ready: bool,
        engine_state: EnginePlaybackState,
    ) {
        self.inner.write().await.engine_state = engine_state;
        match engine_state {
            EnginePlaybackState::Idle => {
                self.reporting.stop();
                self.commands
                    .send(PlayerCommand::SetPositionPolling { start: false });
            }
            EnginePlaybackState::Ready => {
                // A stale ready callback must not overwrite an error
                if !self.state().is_error() {
                    self.set_state(if play_when_ready {
                        PlayerState::Playing(Playing::VideoFile)
                    } else {
                        PlayerState::Pause
                    });
                }
                if self.config.report_playback {
                    if play_when_ready {
                        self.reporting.start();
                    } else {
                        self.reporting.stop();
                    }
                }
                self.commands.send(PlayerCommand::SetPositionPolling {
                    start: play_when_ready,
                });
            }
            EnginePlaybackState::Ended => {
                self.set_state(PlayerState::Done);
                self.reporting.stop();
                self.commands
                    .send(PlayerCommand::SetPositionPolling { start: false });
            }
            EnginePlaybackState::Buffering => {
                self.set_state(PlayerState::Buffering);
            }
        }
    }

    /// Funnel for listeners that forward raw engine events
    pub async fn on_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::PlaybackStateChanged {
                play_when_ready,
                state,
            } => self.on_playback_state_changed(play_when_ready, state).await,
            EngineEvent::PlayerError(error) => self.on_player_error(error).await,
        }
    }

    /// Engine fatal-error callback
    ///
    /// Behind-live-window errors re-anchor by re-entering preparation with
    /// the stored urls; everything else surfaces a retryable playback error.
    pub async fn on_player_error(&self, error: EngineError) {
        if let Some(log) = self.hooks.on_error_log.as_ref() {
            log(&PlaybackFault::Engine(error.clone()));
        }
        if error.is_behind_live_window() {
            if !self.reprepare_from_stored(None).await {
                warn!(session_id = %self.id, "behind live window with no stored url");
            }
        } else {
            self.set_state(PlayerState::Error(ErrorState::Playing(
                MessageModel::error("Unable to play this video", Some("Retry")),
            )));
        }
    }

    /// Forward an ad lifecycle event to the consumer's hook
    pub fn on_ad_event(&self, event: AdEvent) {
        match self.hooks.on_ad_event.as_ref() {
            Some(hook) => hook(&event),
            None => debug!(session_id = %self.id, kind = ?event.kind, "ad event ignored"),
        }
    }

    /// A player control was clicked in the host view
    pub async fn on_view_clicked(&self, control: PlayerControl) {
        match control {
            PlayerControl::Settings => match self.hooks.on_settings_clicked.as_ref() {
                Some(hook) => hook(),
                None => debug!(session_id = %self.id, "settings click ignored"),
            },
            PlayerControl::FullScreenToggle => {
                self.commands.send(PlayerCommand::ToggleFullScreen);
            }
            PlayerControl::Replay => {
                let inner = self.inner.read().await;
                if let Some(video_url) = inner.video_url.clone() {
                    self.commands.send(PlayerCommand::PreparePlayer {
                        video_url,
                        requested_position: None,
                        vast_url: inner.vast_url.clone(),
                    });
                }
            }
        }
    }

    /// Apply a speed picked by the user; reselecting the current speed is a
    /// no-op
    pub async fn on_speed_selected(&self, speed: VideoSpeedModel) {
        let mut inner = self.inner.write().await;
        if inner.selected_speed == speed {
            return;
        }
        inner.selected_speed = speed;
        drop(inner);
        self.commands
            .send(PlayerCommand::UpdatePlaybackParameters { speed: speed.value });
    }

    /// Apply a quality picked by the user; the auto entry clears overrides so
    /// the engine's adaptive logic takes back over
    pub async fn on_quality_selected(&self, track: QualityTrack) {
        let mut inner = self.inner.write().await;
        if inner.selected_quality == track {
            return;
        }
        let update = TrackSelectionUpdate {
            renderer: TrackKind::Video,
            disable_renderer: false,
            override_track: if track.is_auto() {
                None
            } else {
                Some((track.group_index, track.track_index))
            },
        };
        inner.selected_quality = track;
        drop(inner);
        self.commands
            .send(PlayerCommand::UpdateTrackSelection(update));
    }

    /// Apply an audio track picked by the user
    pub async fn on_audio_selected(&self, track: AudioTrack) {
        let mut inner = self.inner.write().await;
        if inner.selected_audio.as_ref() == Some(&track) {
            return;
        }
        let update = TrackSelectionUpdate {
            renderer: TrackKind::Audio,
            disable_renderer: false,
            override_track: Some((track.group_index, track.track_index)),
        };
        inner.selected_audio = Some(track);
        drop(inner);
        self.commands
            .send(PlayerCommand::UpdateTrackSelection(update));
    }

    /// Apply a subtitle track picked by the user; the no-subtitle entry
    /// clears overrides and disables the text renderer
    pub async fn on_subtitle_selected(&self, track: SubtitleTrack) {
        let mut inner = self.inner.write().await;
        if inner.selected_subtitle == track {
            return;
        }
        let update = if track.is_no_subtitle() {
            TrackSelectionUpdate {
                renderer: TrackKind::Text,
                disable_renderer: true,
                override_track: None,
            }
        } else {
            TrackSelectionUpdate {
                renderer: TrackKind::Text,
                disable_renderer: false,
                override_track: Some((track.group_index, track.track_index)),
            }
        };
        inner.selected_subtitle = track;
        drop(inner);
        self.commands
            .send(PlayerCommand::UpdateTrackSelection(update));
    }

    /// Store the engine's latest track-metadata report
    pub async fn on_tracks_changed(&self, info: MappedTrackInfo) {
        self.inner.write().await.track_info = Some(info);
    }

    /// Derived track lists and picture dimensions, if the engine reported
    /// track metadata yet
    pub async fn video_info(&self) -> Option<VideoInfoModel> {
        let inner = self.inner.read().await;
        inner.track_info.as_ref().map(tracks::video_info)
    }

    /// Ask the view layer to open the speed picker
    pub async fn show_speed_picker(&self) {
        let current = self.inner.read().await.selected_speed;
        self.commands
            .send(PlayerCommand::ShowSpeedPicker { current });
    }

    /// Ask the view layer to open the quality picker
    pub async fn show_quality_picker(&self) {
        let inner = self.inner.read().await;
        let available = inner
            .track_info
            .as_ref()
            .and_then(tracks::quality_tracks)
            .unwrap_or_default();
        let current = inner.selected_quality.clone();
        drop(inner);
        self.commands
            .send(PlayerCommand::ShowQualityPicker { current, available });
    }

    /// Host view stopped; playback pauses and, for time-shiftable content,
    /// the position is captured for later resume
    pub async fn on_view_stopped(&self, player_position: Option<u64>) {
        self.set_state(PlayerState::Pause);
        let mut inner = self.inner.write().await;
        if inner.has_time_shift {
            inner.last_position = player_position;
        }
    }

    /// Host view started; a paused session re-enters preparation at the
    /// captured position
    pub async fn on_view_started(&self) {
        if self.state() == PlayerState::Pause {
            let position = self.inner.read().await.last_position;
            self.reprepare_from_stored(position).await;
        }
    }

    /// An error came back from the host's report path
    pub async fn on_report_error(&self, error: ReportError) {
        let from_report_path = self.config.report_request_code == Some(error.request_code);
        let serious = if from_report_path {
            match self.hooks.is_serious_error.as_ref() {
                Some(classify) => classify(&error),
                None => true,
            }
        } else {
            true
        };
        if serious {
            self.on_serious_error(error).await;
        } else if let Some(log) = self.hooks.on_error_log.as_ref() {
            log(&PlaybackFault::Report(error));
        }
    }

    async fn on_serious_error(&self, error: ReportError) {
        if let Some(log) = self.hooks.on_error_log.as_ref() {
            log(&PlaybackFault::Report(error.clone()));
        }
        self.reporting.stop();
        self.commands
            .send(PlayerCommand::SetPositionPolling { start: false });
        self.set_state(PlayerState::Error(ErrorState::Playing(error.message)));
    }

    /// A collaborator started resolving a playback or ad url
    pub fn fetch_started(&self, target: FetchTarget) {
        self.set_state(PlayerState::Fetching(target));
    }

    /// Tell the caller to begin engine preparation
    pub fn prepare_requested(&self) {
        self.set_state(PlayerState::NeedToPrepare);
    }

    /// Show the ad overlay outside normal playback
    pub fn display_vast(&self, show_skip_button: bool) {
        self.set_state(PlayerState::DisplayingVas { show_skip_button });
    }

    /// A stitched ad started playing
    pub fn ad_playback_started(&self, show_skip_button: bool) {
        self.set_state(PlayerState::Playing(Playing::Vas { show_skip_button }));
    }

    /// Enter a collaborator-produced error state (authorization, schedule,
    /// connectivity)
    pub fn on_domain_error(&self, error: ErrorState) {
        self.set_state(PlayerState::Error(error));
    }

    /// Explicit external stop; hard terminal
    pub fn stop(&self) {
        self.set_state(PlayerState::Stop);
        self.reporting.stop();
        self.commands
            .send(PlayerCommand::SetPositionPolling { start: false });
    }

    /// Tear the session down, cancelling both loops
    pub fn close(&self) {
        self.reporting.stop();
        self.commands
            .send(PlayerCommand::SetPositionPolling { start: false });
    }

    /// Engine controller overlay visibility changed
    pub fn on_controller_visibility_changed(&self, visible: bool) {
        self.commands
            .send(PlayerCommand::SetControllerVisible { visible });
    }

    /// Enable or disable the player controller as a whole
    pub fn set_controller_enabled(&self, enabled: bool) {
        self.controller_enabled_tx.send_replace(enabled);
    }

    pub fn subscribe_controller_enabled(&self) -> watch::Receiver<bool> {
        self.controller_enabled_tx.subscribe()
    }

    /// Flip the time-shift capability for the current content
    pub async fn set_time_shift(&self, enabled: bool) {
        self.inner.write().await.has_time_shift = enabled;
    }

    /// Whether the time bar and related views should be visible
    pub async fn time_bar_visible(&self) -> bool {
        self.inner.read().await.has_time_shift
    }

    /// Whether the message banner should be visible, derived from the raw
    /// engine playback state
    pub async fn banner_visible(&self) -> bool {
        !matches!(
            self.inner.read().await.engine_state,
            EnginePlaybackState::Ready | EnginePlaybackState::Buffering
        )
    }

    pub fn is_reporting(&self) -> bool {
        self.reporting.is_running()
    }

    pub async fn selected_speed(&self) -> VideoSpeedModel {
        self.inner.read().await.selected_speed
    }

    pub async fn selected_quality(&self) -> QualityTrack {
        self.inner.read().await.selected_quality.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{error_codes, EngineCauseKind, EngineErrorCause};
    use crate::media::SPEED_OPTIONS;

    fn session() -> (PlayerSession, CommandStream) {
        PlayerSession::new(SessionConfig::default(), SessionHooks::default()).unwrap()
    }

    fn behind_live_window_error() -> EngineError {
        EngineError::new(error_codes::BEHIND_LIVE_WINDOW, "behind live window").with_cause(
            EngineErrorCause::new(EngineCauseKind::BehindLiveWindow),
        )
    }

    #[tokio::test]
    async fn test_session_starts_idle() {
        let (session, _commands) = session();
        assert_eq!(session.state(), PlayerState::Idle);
        assert!(!session.is_reporting());
    }

    #[tokio::test]
    async fn test_play_enters_preparing() {
        let (session, _commands) = session();

        session.play("https://cdn.example.com/a.m3u8", None, None).await;
        assert_eq!(
            session.state(),
            PlayerState::Preparing(Preparing::Video {
                url: "https://cdn.example.com/a.m3u8".to_string(),
                requested_position: None,
            })
        );

        session
            .play(
                "https://cdn.example.com/a.m3u8",
                Some(5_000),
                Some("https://ads.example.com/tag".to_string()),
            )
            .await;
        assert_eq!(
            session.state(),
            PlayerState::Preparing(Preparing::Vast {
                url: "https://cdn.example.com/a.m3u8".to_string(),
                requested_position: Some(5_000),
                vast_url: "https://ads.example.com/tag".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_ready_callback_maps_play_when_ready() {
        let (session, _commands) = session();
        session.play("https://cdn.example.com/a.mp4", None, None).await;

        session
            .on_playback_state_changed(true, EnginePlaybackState::Ready)
            .await;
        assert_eq!(session.state(), PlayerState::Playing(Playing::VideoFile));

        session
            .on_playback_state_changed(false, EnginePlaybackState::Ready)
            .await;
        assert_eq!(session.state(), PlayerState::Pause);
    }

    #[tokio::test]
    async fn test_stale_ready_does_not_overwrite_error() {
        let (session, _commands) = session();
        session.on_domain_error(ErrorState::NoInternet(MessageModel::error(
            "no connection",
            Some("Retry"),
        )));

        session
            .on_playback_state_changed(true, EnginePlaybackState::Ready)
            .await;
        assert!(session.state().is_error());
    }

    #[tokio::test]
    async fn test_buffering_and_ended_transitions() {
        let (session, _commands) = session();
        session.play("https://cdn.example.com/a.mp4", None, None).await;

        session
            .on_playback_state_changed(true, EnginePlaybackState::Buffering)
            .await;
        assert_eq!(session.state(), PlayerState::Buffering);

        session
            .on_playback_state_changed(true, EnginePlaybackState::Ended)
            .await;
        assert_eq!(session.state(), PlayerState::Done);
        assert!(session.state().shows_replay_button());
    }

    #[tokio::test]
    async fn test_behind_live_window_reprepares_video() {
        let (session, _commands) = session();
        session.play("https://cdn.example.com/live.m3u8", None, None).await;

        session.on_player_error(behind_live_window_error()).await;
        assert_eq!(
            session.state(),
            PlayerState::Preparing(Preparing::Video {
                url: "https://cdn.example.com/live.m3u8".to_string(),
                requested_position: None,
            })
        );
    }

    #[tokio::test]
    async fn test_behind_live_window_reprepares_vast() {
        let (session, _commands) = session();
        session
            .play(
                "https://cdn.example.com/live.m3u8",
                None,
                Some("https://ads.example.com/tag".to_string()),
            )
            .await;

        session.on_player_error(behind_live_window_error()).await;
        assert_eq!(
            session.state(),
            PlayerState::Preparing(Preparing::Vast {
                url: "https://cdn.example.com/live.m3u8".to_string(),
                requested_position: None,
                vast_url: "https://ads.example.com/tag".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_other_engine_errors_surface_as_playing_error() {
        let (session, _commands) = session();
        session.play("https://cdn.example.com/a.mp4", None, None).await;

        session
            .on_player_error(EngineError::new(2004, "source read failed"))
            .await;
        match session.state() {
            PlayerState::Error(ErrorState::Playing(message)) => {
                assert_eq!(message.severity, MessageSeverity::Error);
                assert_eq!(message.button_text.as_deref(), Some("Retry"));
            }
            other => panic!("unexpected state: {other}"),
        }
    }

    #[tokio::test]
    async fn test_replay_emits_prepare_command() {
        let (session, mut commands) = session();
        session.play("https://cdn.example.com/a.mp4", Some(1_000), None).await;
        session
            .on_playback_state_changed(true, EnginePlaybackState::Ended)
            .await;

        session.on_view_clicked(PlayerControl::Replay).await;
        let mut prepare = None;
        while let Some(command) = commands.try_next() {
            if let PlayerCommand::PreparePlayer { .. } = command {
                prepare = Some(command);
            }
        }
        assert_eq!(
            prepare,
            Some(PlayerCommand::PreparePlayer {
                video_url: "https://cdn.example.com/a.mp4".to_string(),
                requested_position: None,
                vast_url: None,
            })
        );
    }

    #[tokio::test]
    async fn test_replay_without_url_emits_nothing() {
        let (session, mut commands) = session();
        session.on_view_clicked(PlayerControl::Replay).await;
        assert_eq!(commands.try_next(), None);
    }

    #[tokio::test]
    async fn test_lifecycle_resume_with_time_shift() {
        let config = SessionConfig {
            has_time_shift: true,
            ..Default::default()
        };
        let (session, _commands) =
            PlayerSession::new(config, SessionHooks::default()).unwrap();
        session.play("https://cdn.example.com/live.m3u8", None, None).await;
        session
            .on_playback_state_changed(true, EnginePlaybackState::Ready)
            .await;

        session.on_view_stopped(Some(42_000)).await;
        assert_eq!(session.state(), PlayerState::Pause);

        session.on_view_started().await;
        assert_eq!(
            session.state(),
            PlayerState::Preparing(Preparing::Video {
                url: "https://cdn.example.com/live.m3u8".to_string(),
                requested_position: Some(42_000),
            })
        );
    }

    #[tokio::test]
    async fn test_lifecycle_resume_without_time_shift_drops_position() {
        let (session, _commands) = session();
        session.play("https://cdn.example.com/a.mp4", None, None).await;

        session.on_view_stopped(Some(42_000)).await;
        session.on_view_started().await;
        assert_eq!(
            session.state(),
            PlayerState::Preparing(Preparing::Video {
                url: "https://cdn.example.com/a.mp4".to_string(),
                requested_position: None,
            })
        );
    }

    #[tokio::test]
    async fn test_view_started_outside_pause_is_noop() {
        let (session, _commands) = session();
        session.on_view_started().await;
        assert_eq!(session.state(), PlayerState::Idle);
    }

    #[tokio::test]
    async fn test_speed_reselection_is_noop() {
        let (session, mut commands) = session();

        session.on_speed_selected(SPEED_OPTIONS[4]).await;
        assert_eq!(
            commands.try_next(),
            Some(PlayerCommand::UpdatePlaybackParameters { speed: 1.5 })
        );

        session.on_speed_selected(SPEED_OPTIONS[4]).await;
        assert_eq!(commands.try_next(), None);
    }

    #[tokio::test]
    async fn test_quality_selection_overrides_and_auto_clears() {
        let (session, mut commands) = session();
        let pinned = QualityTrack {
            group_index: 0,
            track_index: 2,
            title: "720p".to_string(),
            width: 1280,
            height: 720,
            default: false,
        };

        session.on_quality_selected(pinned).await;
        assert_eq!(
            commands.try_next(),
            Some(PlayerCommand::UpdateTrackSelection(TrackSelectionUpdate {
                renderer: TrackKind::Video,
                disable_renderer: false,
                override_track: Some((0, 2)),
            }))
        );

        session.on_quality_selected(tracks::auto_quality_track()).await;
        assert_eq!(
            commands.try_next(),
            Some(PlayerCommand::UpdateTrackSelection(TrackSelectionUpdate {
                renderer: TrackKind::Video,
                disable_renderer: false,
                override_track: None,
            }))
        );
    }

    #[tokio::test]
    async fn test_no_subtitle_disables_text_renderer() {
        let (session, mut commands) = session();
        let english = SubtitleTrack {
            title: "English".to_string(),
            group_index: 0,
            track_index: 0,
            default: false,
        };

        session.on_subtitle_selected(english).await;
        assert_eq!(
            commands.try_next(),
            Some(PlayerCommand::UpdateTrackSelection(TrackSelectionUpdate {
                renderer: TrackKind::Text,
                disable_renderer: false,
                override_track: Some((0, 0)),
            }))
        );

        session.on_subtitle_selected(tracks::no_subtitle_track()).await;
        assert_eq!(
            commands.try_next(),
            Some(PlayerCommand::UpdateTrackSelection(TrackSelectionUpdate {
                renderer: TrackKind::Text,
                disable_renderer: true,
                override_track: None,
            }))
        );
    }

    #[tokio::test]
    async fn test_reporting_requires_hook() {
        let config = SessionConfig {
            report_playback: true,
            ..Default::default()
        };
        let result = PlayerSession::new(config, SessionHooks::default());
        assert!(matches!(result, Err(Error::MissingHook("on_report"))));
    }

    #[tokio::test]
    async fn test_reporting_follows_play_when_ready() {
        let config = SessionConfig {
            report_playback: true,
            ..Default::default()
        };
        let hooks = SessionHooks {
            on_report: Some(Arc::new(|_| Ok(()))),
            ..Default::default()
        };
        let (session, _commands) = PlayerSession::new(config, hooks).unwrap();
        session.play("https://cdn.example.com/a.m3u8", None, None).await;

        session
            .on_playback_state_changed(true, EnginePlaybackState::Ready)
            .await;
        assert!(session.is_reporting());

        session
            .on_playback_state_changed(false, EnginePlaybackState::Ready)
            .await;
        assert!(!session.is_reporting());

        session
            .on_playback_state_changed(true, EnginePlaybackState::Ready)
            .await;
        session
            .on_playback_state_changed(true, EnginePlaybackState::Idle)
            .await;
        assert!(!session.is_reporting());
    }

    #[tokio::test]
    async fn test_serious_report_error_escalates() {
        let config = SessionConfig {
            report_playback: true,
            report_request_code: Some(7),
            ..Default::default()
        };
        let hooks = SessionHooks {
            on_report: Some(Arc::new(|_| Ok(()))),
            is_serious_error: Some(Arc::new(|error| error.request_code != 7)),
            ..Default::default()
        };
        let (session, mut commands) = PlayerSession::new(config, hooks).unwrap();
        session.play("https://cdn.example.com/a.m3u8", None, None).await;
        session
            .on_playback_state_changed(true, EnginePlaybackState::Ready)
            .await;
        while commands.try_next().is_some() {}

        // Report-path error the classifier deems non-serious
        session
            .on_report_error(ReportError {
                request_code: 7,
                message: MessageModel::error("beacon failed", None),
            })
            .await;
        assert_eq!(session.state(), PlayerState::Playing(Playing::VideoFile));
        assert!(session.is_reporting());

        // Errors from any other request code always escalate
        session
            .on_report_error(ReportError {
                request_code: 12,
                message: MessageModel::error("stream revoked", Some("Retry")),
            })
            .await;
        assert!(session.state().is_error());
        assert!(!session.is_reporting());
        assert_eq!(
            commands.try_next(),
            Some(PlayerCommand::SetPositionPolling { start: false })
        );
    }

    #[tokio::test]
    async fn test_stop_and_close() {
        let (session, mut commands) = session();
        session.play("https://cdn.example.com/a.mp4", None, None).await;

        session.stop();
        assert_eq!(session.state(), PlayerState::Stop);

        session.close();
        assert!(!session.is_reporting());
        let mut polling_stops = 0;
        while let Some(command) = commands.try_next() {
            if command == (PlayerCommand::SetPositionPolling { start: false }) {
                polling_stops += 1;
            }
        }
        assert_eq!(polling_stops, 2);
    }

    #[tokio::test]
    async fn test_ad_events_reach_hook() {
        use crate::engine::{AdEvent, AdEventKind};
        use std::sync::atomic::{AtomicU32, Ordering};

        let seen = Arc::new(AtomicU32::new(0));
        let sink = Arc::clone(&seen);
        let hooks = SessionHooks {
            on_ad_event: Some(Arc::new(move |event| {
                assert_eq!(event.kind, AdEventKind::Started);
                sink.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        };
        let (session, _commands) = PlayerSession::new(SessionConfig::default(), hooks).unwrap();

        session.on_ad_event(AdEvent::new(AdEventKind::Started));
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        // No hook installed is fine too
        let (bare, _commands) = PlayerSession::new(
            SessionConfig::default(),
            SessionHooks::default(),
        )
        .unwrap();
        bare.on_ad_event(AdEvent::new(AdEventKind::Completed));
    }

    #[tokio::test]
    async fn test_fetch_and_ad_states() {
        let (session, _commands) = session();

        session.fetch_started(FetchTarget::UrlAccess);
        assert_eq!(session.state(), PlayerState::Fetching(FetchTarget::UrlAccess));
        assert!(session.state().shows_loading_indicator());

        session.fetch_started(FetchTarget::Vast);
        assert_eq!(session.state(), PlayerState::Fetching(FetchTarget::Vast));

        session.prepare_requested();
        assert_eq!(session.state(), PlayerState::NeedToPrepare);
        assert!(session.state().requires_engine_stop());

        session.display_vast(true);
        assert_eq!(
            session.state(),
            PlayerState::DisplayingVas {
                show_skip_button: true
            }
        );

        session.ad_playback_started(false);
        assert_eq!(
            session.state(),
            PlayerState::Playing(Playing::Vas {
                show_skip_button: false
            })
        );
    }

    #[tokio::test]
    async fn test_controller_flags_and_time_shift() {
        let (session, mut commands) = session();

        let controller = session.subscribe_controller_enabled();
        assert!(*controller.borrow());
        session.set_controller_enabled(false);
        assert!(!*controller.borrow());

        session.on_controller_visibility_changed(true);
        assert_eq!(
            commands.try_next(),
            Some(PlayerCommand::SetControllerVisible { visible: true })
        );

        assert!(!session.time_bar_visible().await);
        session.set_time_shift(true).await;
        assert!(session.time_bar_visible().await);
    }

    #[tokio::test]
    async fn test_banner_hidden_while_ready_or_buffering() {
        let (session, _commands) = session();
        assert!(session.banner_visible().await);

        session
            .on_playback_state_changed(true, EnginePlaybackState::Ready)
            .await;
        assert!(!session.banner_visible().await);

        session
            .on_playback_state_changed(true, EnginePlaybackState::Buffering)
            .await;
        assert!(!session.banner_visible().await);

        session
            .on_playback_state_changed(true, EnginePlaybackState::Ended)
            .await;
        assert!(session.banner_visible().await);
    }
}
