//! # Pipeline Module
//!
//! Orchestrates one detection pass over a record set.
//!
//! ## Pipeline Stages
//! 1. **Eligibility** - Decode fingerprints, exclude records that lack them
//! 2. **Group** - Form duplicate groups and choose representatives
//! 3. **Select** - Pick the keepers across the whole set
//! 4. **Bursts** - Segment timed records into burst sequences
//!
//! ## Parallelism
//! Pairwise distances are computed with rayon; everything else is serial.

mod config;
mod executor;

pub use config::DetectionConfig;
pub use executor::{DetectionPipeline, DetectionPipelineBuilder, DetectionReport};
