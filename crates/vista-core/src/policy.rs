//! Adaptive track policy
//!
//! Advisory pre-filtering layered in front of the engine's own
//! bandwidth-based selection: given a ranked quality ladder (index 0 =
//! highest resolution) and a fresh connection measurement, every rank is
//! blacklisted, with only the connection-appropriate top ranks allowed back
//! after a short cooldown so the engine may probe them again.

use crate::network::{ConnectionMonitor, ConnectionQuality};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cooldown for time-limited blacklist entries
pub const BLACKLIST_DURATION: Duration = Duration::from_millis(1000);

/// How long a rank stays ineligible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlacklistTerm {
    /// Eligible again once the cooldown elapses
    Timed(Duration),
    /// Ineligible for the lifetime of the selection session
    Permanent,
}

/// Blacklist decision for one rank of the quality ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlacklistEntry {
    pub rank: usize,
    pub term: BlacklistTerm,
}

/// Number of top ranks that get the timed term instead of the permanent one
fn timed_rank_count(quality: ConnectionQuality) -> usize {
    match quality {
        ConnectionQuality::Poor => 4,
        ConnectionQuality::Moderate => 2,
        _ => 1,
    }
}

/// Blacklist decisions for a ladder of `track_count` ranks under the given
/// connection quality
pub fn blacklist_plan(quality: ConnectionQuality, track_count: usize) -> Vec<BlacklistEntry> {
    let timed = timed_rank_count(quality);
    (0..track_count)
        .map(|rank| BlacklistEntry {
            rank,
            term: if rank < timed {
                BlacklistTerm::Timed(BLACKLIST_DURATION)
            } else {
                BlacklistTerm::Permanent
            },
        })
        .collect()
}

/// Per-selection-session eligibility state for one quality ladder
///
/// Queries take an explicit instant so expiry is deterministic.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    /// Expiry per rank; `None` marks a permanent entry
    expiries: Vec<Option<Instant>>,
}

impl SelectionSession {
    pub fn new(quality: ConnectionQuality, track_count: usize, now: Instant) -> Self {
        let expiries = blacklist_plan(quality, track_count)
            .into_iter()
            .map(|entry| match entry.term {
                BlacklistTerm::Timed(cooldown) => Some(now + cooldown),
                BlacklistTerm::Permanent => None,
            })
            .collect();
        debug!(?quality, track_count, "selection session created");
        Self { expiries }
    }

    /// Whether the adaptive algorithm may consider this rank at `at`
    pub fn is_eligible(&self, rank: usize, at: Instant) -> bool {
        match self.expiries.get(rank) {
            Some(Some(expiry)) => at >= *expiry,
            Some(None) => false,
            // Ranks beyond the ladder were never blacklisted
            None => true,
        }
    }

    pub fn eligible_ranks(&self, at: Instant) -> Vec<usize> {
        (0..self.expiries.len())
            .filter(|rank| self.is_eligible(*rank, at))
            .collect()
    }

    pub fn track_count(&self) -> usize {
        self.expiries.len()
    }
}

/// Builds a fresh [`SelectionSession`] per track-selection start, measuring
/// the connection each time
#[derive(Clone)]
pub struct SmoothTrackPolicy {
    monitor: ConnectionMonitor,
}

impl SmoothTrackPolicy {
    pub fn new(monitor: ConnectionMonitor) -> Self {
        Self { monitor }
    }

    /// Measure and build. Blocks the calling thread for the full measurement
    /// window; never call this from the context driving state transitions.
    pub fn create_session(&self, track_count: usize) -> SelectionSession {
        let quality = self.monitor.measure();
        SelectionSession::new(quality, track_count, Instant::now())
    }

    /// Measure on the blocking pool and build
    pub async fn create_session_async(&self, track_count: usize) -> SelectionSession {
        let quality = self.monitor.measure_async().await;
        SelectionSession::new(quality, track_count, Instant::now())
    }
}
