//! # Error Module
//!
//! Error types for the duplicate and burst detection engine.
//!
//! ## Design Principles
//! - **Never panic** on caller data - return errors instead
//! - **Include context** - record ids, bit widths, file paths
//! - **Partial data is not an error** - records missing fields are excluded
//!   from a pass (see `core::record::ExclusionReason`), never failed

use std::path::PathBuf;
use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Assignment store error: {0}")]
    Store(#[from] StoreError),

    #[error("Report generation error: {0}")]
    Report(#[from] ReportError),
}

/// Errors that occur while comparing fingerprints
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("Cannot compare a {left_bits}-bit fingerprint with a {right_bits}-bit fingerprint")]
    IncompatibleHash { left_bits: u32, right_bits: u32 },

    #[error("Invalid fingerprint {value:?}: {reason}")]
    InvalidHash { value: String, reason: String },
}

/// Errors that occur while choosing a group representative
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("Cannot select a representative from an empty group")]
    EmptyGroup,

    #[error("Group member {id} is not among the supplied records")]
    UnknownRecord { id: String },
}

/// Errors that occur while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that occur while reading photo records
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read records from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Records in {path} are not a valid JSON array: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Errors from an assignment store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Assignment store lock was poisoned")]
    Poisoned,
}

/// Errors that occur while rendering results
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to generate report: {0}")]
    GenerationFailed(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DetectorError>;
