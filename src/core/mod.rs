//! # Core Module
//!
//! The storage-agnostic duplicate and burst detection engine.
//!
//! ## Modules
//! - `fingerprint` - Decodes hex fingerprints and measures Hamming distance
//! - `record` - Photo records and the per-pass eligibility filter
//! - `comparator` - Groups exact and near duplicates
//! - `selector` - Chooses the representative of a group
//! - `burst` - Finds rapid-fire shooting sequences
//! - `assignment` - Per-record output for the persistence layer
//! - `selection` - Automatic keeper selection
//! - `pipeline` - Orchestrates a full pass

pub mod assignment;
pub mod burst;
pub mod comparator;
pub mod fingerprint;
pub mod pipeline;
pub mod record;
pub mod selection;
pub mod selector;

// Re-export commonly used types
pub use burst::{find_burst_sequences, BurstConfig, BurstSequence};
pub use comparator::{
    cluster_by_similarity, group_by_exact_hash, group_duplicates, DuplicateGroup,
    GroupingStrategy, Linkage, MatchType,
};
pub use fingerprint::Fingerprint;
pub use pipeline::{DetectionConfig, DetectionPipeline, DetectionReport};
pub use record::{Exclusion, ExclusionReason, PhotoRecord};
pub use selector::select_best;
