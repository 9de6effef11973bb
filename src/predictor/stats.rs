//! Gate statistics.
//!
//! `GateStats` counts what happened to every frame offered to a
//! [`Predictor`](super::Predictor); `StatsManager` keeps it consistent across
//! threads.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Counters for frames offered to the gate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GateStats {
    /// Frames that reached the gate.
    pub total_frames: usize,
    /// Frames that produced a ranking.
    pub served: usize,
    /// Frames dropped because another inference was in flight.
    pub dropped: usize,
    /// Frames whose model call failed.
    pub failed: usize,
    /// Average model call duration in milliseconds, over served and failed frames.
    pub average_inference_time_ms: f64,
}

impl GateStats {
    /// Returns the share of frames that were dropped, as a percentage.
    pub fn drop_rate(&self) -> f64 {
        Self::percentage(self.dropped, self.total_frames)
    }

    /// Returns the share of frames whose model call failed, as a percentage.
    pub fn failure_rate(&self) -> f64 {
        Self::percentage(self.failed, self.total_frames)
    }

    fn percentage(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for GateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Gate Statistics:")?;
        writeln!(f, "  Frames offered: {}", self.total_frames)?;
        writeln!(f, "  Served: {}", self.served)?;
        writeln!(
            f,
            "  Dropped (busy): {} ({:.1}%)",
            self.dropped,
            self.drop_rate()
        )?;
        writeln!(f, "  Failed: {} ({:.1}%)", self.failed, self.failure_rate())?;
        write!(
            f,
            "  Average inference time: {:.2} ms",
            self.average_inference_time_ms
        )
    }
}

/// Thread-safe holder for [`GateStats`].
#[derive(Debug, Default)]
pub struct StatsManager {
    stats: Mutex<GateStats>,
}

impl StatsManager {
    /// Creates a manager with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current counters.
    pub fn get_stats(&self) -> GateStats {
        self.lock().clone()
    }

    /// Records a frame that was ranked successfully.
    pub fn record_served(&self, inference_time_ms: f64) {
        let mut stats = self.lock();
        stats.total_frames += 1;
        stats.served += 1;
        Self::fold_time(&mut stats, inference_time_ms);
    }

    /// Records a frame whose model call failed.
    pub fn record_failed(&self, inference_time_ms: f64) {
        let mut stats = self.lock();
        stats.total_frames += 1;
        stats.failed += 1;
        Self::fold_time(&mut stats, inference_time_ms);
    }

    /// Records a frame dropped while the gate was busy.
    pub fn record_dropped(&self) {
        let mut stats = self.lock();
        stats.total_frames += 1;
        stats.dropped += 1;
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        *self.lock() = GateStats::default();
    }

    fn fold_time(stats: &mut GateStats, inference_time_ms: f64) {
        let calls = (stats.served + stats.failed) as f64;
        stats.average_inference_time_ms +=
            (inference_time_ms - stats.average_inference_time_ms) / calls;
    }

    fn lock(&self) -> MutexGuard<'_, GateStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
