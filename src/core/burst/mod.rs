//! # Burst Module
//!
//! Finds runs of photos shot in rapid succession (continuous-shooting mode).
//!
//! ## How It Works
//! 1. Drop records with no capture time or primary hash
//! 2. Sort the rest by capture time
//! 3. Keep extending the current run while each frame is within the time
//!    window of the previous one *and* visually close to it. A frame whose
//!    fingerprint width differs from the previous frame's ends the run
//! 4. Emit every run of two or more frames
//!
//! The visual threshold (30) is deliberately looser than the duplicate
//! threshold (10): frames in a burst show real subject motion.

mod detector;

pub use detector::{find_burst_sequences, BurstDetector, BurstOutcome};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters for burst detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Largest gap between consecutive frames, in seconds
    pub time_window_seconds: f64,
    /// Largest primary-hash distance between consecutive frames
    pub visual_distance_threshold: u32,
}

impl BurstConfig {
    pub const DEFAULT_TIME_WINDOW_SECONDS: f64 = 5.0;
    pub const DEFAULT_VISUAL_DISTANCE_THRESHOLD: u32 = 30;

    pub fn new(time_window_seconds: f64, visual_distance_threshold: u32) -> Self {
        Self {
            time_window_seconds,
            visual_distance_threshold,
        }
    }
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_TIME_WINDOW_SECONDS,
            Self::DEFAULT_VISUAL_DISTANCE_THRESHOLD,
        )
    }
}

/// A chronological run of burst frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstSequence {
    /// Frame ids in capture order
    pub member_ids: Vec<String>,
    /// Capture time of the first frame
    pub started_at: DateTime<Utc>,
    /// Capture time of the last frame
    pub ended_at: DateTime<Utc>,
}

impl BurstSequence {
    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }

    /// Seconds between the first and last frame
    pub fn span_seconds(&self) -> f64 {
        seconds_between(self.started_at, self.ended_at)
    }
}

/// Elapsed seconds from `earlier` to `later`, at full timestamp precision
///
/// Negative spans (out-of-order input) come out as zero.
pub(crate) fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier)
        .to_std()
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
