//! Playback reporting and position polling
//!
//! Both loops are cancellable repeating tasks: each tick runs its callback
//! and then waits the configured interval, so a slow callback delays the next
//! tick. Start is guarded against double-start; stop is idempotent and may be
//! called before start.

use crate::engine::{AdEvent, EngineError};
use crate::types::{MessageModel, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// One periodic playback report handed to the consumer's report hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackReport {
    pub session_id: SessionId,
    /// Tick number within this session, starting at 1
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
}

/// An error coming back from the host's report path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportError {
    /// Request code identifying which host request failed
    pub request_code: i32,
    pub message: MessageModel,
}

/// Anything worth sending to the consumer's error log
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackFault {
    Engine(EngineError),
    Report(ReportError),
    Hook(String),
}

/// Consumer-injected policy hooks
///
/// All hooks are optional; `on_report` becomes required once playback
/// reporting is enabled in the session configuration.
#[derive(Clone, Default)]
pub struct SessionHooks {
    /// Invoked on every reporting tick
    pub on_report: Option<Arc<dyn Fn(PlaybackReport) -> anyhow::Result<()> + Send + Sync>>,
    /// Classifies report-path errors; absent means every such error is
    /// serious
    pub is_serious_error: Option<Arc<dyn Fn(&ReportError) -> bool + Send + Sync>>,
    /// Receives engine errors, report errors, and hook failures for logging
    pub on_error_log: Option<Arc<dyn Fn(&PlaybackFault) + Send + Sync>>,
    /// Receives forwarded ad lifecycle events
    pub on_ad_event: Option<Arc<dyn Fn(&AdEvent) + Send + Sync>>,
    /// Invoked when the settings control is clicked
    pub on_settings_clicked: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl std::fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHooks")
            .field("on_report", &self.on_report.is_some())
            .field("is_serious_error", &self.is_serious_error.is_some())
            .field("on_error_log", &self.on_error_log.is_some())
            .field("on_ad_event", &self.on_ad_event.is_some())
            .field("on_settings_clicked", &self.on_settings_clicked.is_some())
            .finish()
    }
}

/// A cancellable repeating task
///
/// The running flag makes `start` a no-op while a loop is live; only `stop`
/// clears it, so cancellation races are impossible.
pub struct RepeatingTask {
    name: &'static str,
    interval: Duration,
    running: Arc<AtomicBool>,
    cancel: Arc<Notify>,
}

impl RepeatingTask {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            cancel: Arc::new(Notify::new()),
        }
    }

    /// Spawn the loop. No-op if already running.
    pub fn start<F>(&self, mut tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!(task = self.name, "start ignored, already running");
            return;
        }
        let cancel = Arc::clone(&self.cancel);
        let interval = self.interval;
        let name = self.name;
        debug!(task = name, ?interval, "started");
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => tick(),
                    _ = cancel.notified() => break,
                }
            }
            debug!(task = name, "stopped");
        });
    }

    /// Cancel the loop. No-op if not running.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.cancel.notify_one();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// The periodic playback-report loop
pub struct ReportingLoop {
    task: RepeatingTask,
    hooks: Arc<SessionHooks>,
    session_id: SessionId,
    sequence: Arc<AtomicU64>,
}

impl ReportingLoop {
    pub fn new(session_id: SessionId, interval: Duration, hooks: Arc<SessionHooks>) -> Self {
        Self {
            task: RepeatingTask::new("playback-report", interval),
            hooks,
            session_id,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start reporting. No-op if already reporting.
    pub fn start(&self) {
        let hooks = Arc::clone(&self.hooks);
        let session_id = self.session_id;
        let sequence = Arc::clone(&self.sequence);
        self.task.start(move || {
            let Some(on_report) = hooks.on_report.as_ref() else {
                return;
            };
            let report = PlaybackReport {
                session_id,
                sequence: sequence.fetch_add(1, Ordering::Relaxed) + 1,
                timestamp: Utc::now(),
            };
            if let Err(error) = on_report(report) {
                warn!(%error, "playback report failed");
                if let Some(log) = hooks.on_error_log.as_ref() {
                    log(&PlaybackFault::Hook(error.to_string()));
                }
            }
        });
    }

    pub fn stop(&self) {
        self.task.stop();
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }
}

/// Consumer-side loop polling the engine's current position
///
/// The binding layer starts and stops this in response to
/// [`PlayerCommand::SetPositionPolling`](crate::commands::PlayerCommand), so
/// a `start: true` command while the loop runs stays a no-op.
pub struct PositionPoller {
    task: RepeatingTask,
}

impl PositionPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            task: RepeatingTask::new("position-poll", interval),
        }
    }

    pub fn start<F>(&self, tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.task.start(tick);
    }

    pub fn stop(&self) {
        self.task.stop();
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }
}
