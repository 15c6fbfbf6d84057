//! Connection quality estimation
//!
//! Samples a cumulative byte counter over a fixed window and classifies the
//! observed throughput into a small ordinal scale. Every measurement is fresh
//! and independent; nothing is persisted between calls.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const GB: u64 = 1_000_000_000;
const MB: u64 = 1_000_000;
const KB: u64 = 1_000;

/// Length of one measurement window
pub const MEASURE_WINDOW: Duration = Duration::from_secs(1);

/// Cumulative transmitted plus received byte count, monotonic, queryable at
/// any time
pub trait ByteCounter: Send + Sync {
    fn total_bytes(&self) -> u64;
}

/// Ordinal connection quality scale
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ConnectionQuality {
    /// Initial placeholder when no throughput could be measured
    #[default]
    Unknown,
    /// Under 150 kB/s
    Poor,
    /// Between 150 and 400 kB/s
    Moderate,
    /// Between 400 and 2000 kB/s
    Good,
    /// Over 2000 kB/s
    Excellent,
}

/// Classify a measured throughput in kilobytes per second
pub fn classify(kilobytes_per_second: f64) -> ConnectionQuality {
    if kilobytes_per_second < 150.0 {
        ConnectionQuality::Poor
    } else if kilobytes_per_second < 400.0 {
        ConnectionQuality::Moderate
    } else if kilobytes_per_second < 2000.0 {
        ConnectionQuality::Good
    } else {
        ConnectionQuality::Excellent
    }
}

/// Format a window's byte delta as human-readable throughput text
pub fn format_speed(delta_bytes: u64) -> String {
    let (value, unit) = if delta_bytes >= GB {
        (delta_bytes as f64 / GB as f64, "GB")
    } else if delta_bytes >= MB {
        (delta_bytes as f64 / MB as f64, "MB")
    } else {
        (delta_bytes as f64 / KB as f64, "KB")
    };
    if unit != "KB" && value < 100.0 {
        format!("{value:.1} {unit}")
    } else {
        format!("{} {unit}", value as u64)
    }
}

/// Measures connection quality from a cumulative byte counter
///
/// Both `measure` and `network_speed` block their calling thread for the full
/// window; use `measure_async` from latency-sensitive contexts.
#[derive(Clone)]
pub struct ConnectionMonitor {
    counter: Arc<dyn ByteCounter>,
}

impl ConnectionMonitor {
    pub fn new(counter: Arc<dyn ByteCounter>) -> Self {
        Self { counter }
    }

    fn window_delta(counter: &dyn ByteCounter) -> u64 {
        let before = counter.total_bytes();
        std::thread::sleep(MEASURE_WINDOW);
        let after = counter.total_bytes();
        after.saturating_sub(before)
    }

    /// Take a fresh measurement. Blocks the calling thread for the full
    /// window.
    pub fn measure(&self) -> ConnectionQuality {
        let delta = Self::window_delta(&*self.counter);
        let kilobytes_per_second = delta as f64 / KB as f64;
        let quality = classify(kilobytes_per_second);
        debug!(kilobytes_per_second, ?quality, "connection measured");
        quality
    }

    /// Take a fresh measurement on the blocking pool
    pub async fn measure_async(&self) -> ConnectionQuality {
        let counter = Arc::clone(&self.counter);
        tokio::task::spawn_blocking(move || {
            let delta = Self::window_delta(&*counter);
            classify(delta as f64 / KB as f64)
        })
        .await
        .unwrap_or(ConnectionQuality::Unknown)
    }

    /// Human-readable throughput for diagnostics, e.g. `"12.3 MB"`.
    ///
    /// This is an independent second measurement, not a reuse of the last
    /// `measure` call. Blocks for the full window.
    pub fn network_speed(&self) -> String {
        format_speed(Self::window_delta(&*self.counter))
    }
}
