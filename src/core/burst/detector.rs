//! Burst sequence detection over capture-time-ordered records.

use super::{seconds_between, BurstConfig, BurstSequence};
use crate::core::record::{
    partition_hashed, Exclusion, ExclusionReason, HashRequirement, HashedRecord, PhotoRecord,
};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// Sequences found in a pass, plus the records that could not take part
#[derive(Debug, Clone, Default)]
pub struct BurstOutcome {
    pub sequences: Vec<BurstSequence>,
    pub excluded: Vec<Exclusion>,
}

/// Segments time-ordered records into burst sequences
#[derive(Debug, Clone, Default)]
pub struct BurstDetector {
    config: BurstConfig,
}

impl BurstDetector {
    pub fn new(config: BurstConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BurstConfig {
        &self.config
    }

    /// Find every burst of two or more frames
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn detect(&self, records: &[PhotoRecord]) -> BurstOutcome {
        let mut excluded = Vec::new();
        let mut timed = Vec::with_capacity(records.len());

        for record in records {
            if record.capture_time.is_some() {
                timed.push(record);
            } else {
                excluded.push(Exclusion::new(
                    record.id.clone(),
                    ExclusionReason::MissingCaptureTime,
                ));
            }
        }

        let eligible = partition_hashed(timed, HashRequirement::PrimaryOnly);
        excluded.extend(eligible.excluded);

        let mut frames: Vec<(DateTime<Utc>, HashedRecord<'_>)> = eligible
            .records
            .into_iter()
            .filter_map(|h| h.record.capture_time.map(|t| (t, h)))
            .collect();
        // Stable, so frames sharing a timestamp keep input order
        frames.sort_by_key(|(time, _)| *time);

        let sequences = self.segment(&frames);
        debug!(
            sequences = sequences.len(),
            excluded = excluded.len(),
            "burst detection finished"
        );

        BurstOutcome {
            sequences,
            excluded,
        }
    }

    fn segment(&self, frames: &[(DateTime<Utc>, HashedRecord<'_>)]) -> Vec<BurstSequence> {
        let mut sequences = Vec::new();
        let mut current: Vec<usize> = Vec::new();

        for (index, (time, frame)) in frames.iter().enumerate() {
            if index == 0 {
                current.push(index);
                continue;
            }

            let (previous_time, previous) = &frames[index - 1];
            let gap = seconds_between(*previous_time, *time);
            let visually_close = match frame.primary.distance(&previous.primary) {
                Ok(distance) => distance <= self.config.visual_distance_threshold,
                Err(e) => {
                    debug!(record = %frame.id(), "not linked to previous frame: {}", e);
                    false
                }
            };

            if gap <= self.config.time_window_seconds && visually_close {
                current.push(index);
            } else {
                flush(&mut sequences, &current, frames);
                current.clear();
                current.push(index);
            }
        }

        flush(&mut sequences, &current, frames);
        sequences
    }
}

fn flush(
    sequences: &mut Vec<BurstSequence>,
    run: &[usize],
    frames: &[(DateTime<Utc>, HashedRecord<'_>)],
) {
    if run.len() < 2 {
        return;
    }
    let (Some(&first), Some(&last)) = (run.first(), run.last()) else {
        return;
    };

    sequences.push(BurstSequence {
        member_ids: run.iter().map(|&i| frames[i].1.id().to_string()).collect(),
        started_at: frames[first].0,
        ended_at: frames[last].0,
    });
}

/// Find burst sequences with explicit parameters
pub fn find_burst_sequences(
    records: &[PhotoRecord],
    time_window_seconds: f64,
    visual_distance_threshold: u32,
) -> Vec<BurstSequence> {
    let config = BurstConfig::new(time_window_seconds, visual_distance_threshold);
    BurstDetector::new(config).detect(records).sequences
}
