//! # Record Module
//!
//! The photo records a detection pass works on, and the eligibility filter
//! that decides which of them can take part.
//!
//! Records that lack the data a detector needs are *excluded*, not failed:
//! a pass always completes for every eligible record and reports the rest
//! as [`Exclusion`]s.

use crate::core::fingerprint::Fingerprint;
use crate::error::InputError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// A photo as supplied by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Opaque unique identifier
    pub id: String,
    /// Hex fingerprint from the first hash family (dHash)
    #[serde(default)]
    pub primary_hash: Option<String>,
    /// Hex fingerprint from the second hash family (pHash)
    #[serde(default)]
    pub secondary_hash: Option<String>,
    /// When the photo was taken, if the source metadata had it
    #[serde(default)]
    pub capture_time: Option<DateTime<Utc>>,
    /// Quality score in 0-100, absent when unscored
    #[serde(default)]
    pub quality_score: Option<f64>,
    /// Original file name, the last-resort tie-break
    #[serde(default)]
    pub filename: String,
    /// Flagged by the scoring pipeline as having a critical defect
    #[serde(default)]
    pub is_reject: bool,
}

impl PhotoRecord {
    /// Create a record with no hashes, capture time or score
    pub fn new(id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            primary_hash: None,
            secondary_hash: None,
            capture_time: None,
            quality_score: None,
            filename: filename.into(),
            is_reject: false,
        }
    }

    pub fn with_hashes(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.primary_hash = Some(primary.into());
        self.secondary_hash = Some(secondary.into());
        self
    }

    pub fn with_primary_hash(mut self, primary: impl Into<String>) -> Self {
        self.primary_hash = Some(primary.into());
        self
    }

    pub fn with_capture_time(mut self, capture_time: DateTime<Utc>) -> Self {
        self.capture_time = Some(capture_time);
        self
    }

    pub fn with_quality_score(mut self, score: f64) -> Self {
        self.quality_score = Some(score);
        self
    }

    pub fn rejected(mut self) -> Self {
        self.is_reject = true;
        self
    }

    /// The quality score, treating non-finite values as unscored
    pub fn score(&self) -> Option<f64> {
        self.quality_score.filter(|s| s.is_finite())
    }
}

/// Read a JSON array of records from a file
pub fn load_records(path: &Path) -> Result<Vec<PhotoRecord>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|e| InputError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Why a record was left out of a detection pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// A required fingerprint is absent
    MissingHash,
    /// A fingerprint could not be decoded
    InvalidHash { reason: String },
    /// No capture time, so the record cannot be part of a burst
    MissingCaptureTime,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::MissingHash => write!(f, "missing fingerprint"),
            ExclusionReason::InvalidHash { reason } => write!(f, "invalid fingerprint: {}", reason),
            ExclusionReason::MissingCaptureTime => write!(f, "missing capture time"),
        }
    }
}

/// A record left out of a pass, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub record_id: String,
    pub reason: ExclusionReason,
}

impl Exclusion {
    pub fn new(record_id: impl Into<String>, reason: ExclusionReason) -> Self {
        Self {
            record_id: record_id.into(),
            reason,
        }
    }
}

/// Which fingerprints a detector needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashRequirement {
    /// Both primary and secondary (duplicate grouping)
    Both,
    /// Primary only (burst detection)
    PrimaryOnly,
}

/// A record whose fingerprints have been decoded
#[derive(Debug, Clone)]
pub struct HashedRecord<'a> {
    pub record: &'a PhotoRecord,
    pub primary: Fingerprint,
    pub secondary: Option<Fingerprint>,
}

impl HashedRecord<'_> {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Bit widths of the primary and (if decoded) secondary fingerprint
    pub fn widths(&self) -> (u32, Option<u32>) {
        (
            self.primary.bit_count(),
            self.secondary.as_ref().map(Fingerprint::bit_count),
        )
    }
}

/// Result of filtering a record set for a pass
#[derive(Debug, Default)]
pub struct Eligible<'a> {
    /// Usable records, in input order
    pub records: Vec<HashedRecord<'a>>,
    /// Records left out, in input order
    pub excluded: Vec<Exclusion>,
}

impl Eligible<'_> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Indices of `records` sharing the same fingerprint widths
    ///
    /// Only records within one class can be compared by distance. Classes
    /// come out in order of their first member, members in input order.
    pub fn width_classes(&self) -> Vec<Vec<usize>> {
        let mut slots: HashMap<(u32, Option<u32>), usize> = HashMap::new();
        let mut classes: Vec<Vec<usize>> = Vec::new();

        for (index, record) in self.records.iter().enumerate() {
            let slot = *slots.entry(record.widths()).or_insert_with(|| {
                classes.push(Vec::new());
                classes.len() - 1
            });
            classes[slot].push(index);
        }

        classes
    }
}

/// Decode fingerprints and keep the records a detector can use
///
/// Widths are not checked here. Detectors that measure distance compare
/// only records of equal width (see [`Eligible::width_classes`]).
pub fn partition_hashed<'a, I>(records: I, requirement: HashRequirement) -> Eligible<'a>
where
    I: IntoIterator<Item = &'a PhotoRecord>,
{
    let mut eligible = Eligible::default();

    for record in records {
        match decode_record(record, requirement) {
            Ok(hashed) => eligible.records.push(hashed),
            Err(reason) => {
                match &reason {
                    ExclusionReason::MissingHash => {
                        debug!(record = %record.id, "excluded: {}", reason)
                    }
                    _ => warn!(record = %record.id, "excluded: {}", reason),
                }
                eligible.excluded.push(Exclusion::new(record.id.clone(), reason));
            }
        }
    }

    eligible
}

fn decode_record(
    record: &PhotoRecord,
    requirement: HashRequirement,
) -> Result<HashedRecord<'_>, ExclusionReason> {
    let primary = decode(record.primary_hash.as_deref())?;

    let secondary = match requirement {
        HashRequirement::Both => Some(decode(record.secondary_hash.as_deref())?),
        HashRequirement::PrimaryOnly => None,
    };

    Ok(HashedRecord {
        record,
        primary,
        secondary,
    })
}

fn decode(value: Option<&str>) -> Result<Fingerprint, ExclusionReason> {
    let value = value.ok_or(ExclusionReason::MissingHash)?;
    Fingerprint::from_hex(value).map_err(|e| ExclusionReason::InvalidHash {
        reason: e.to_string(),
    })
}
