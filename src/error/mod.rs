//! Error handling for the forecast pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Specialized error type for pipeline operations.
///
/// Data-quality conditions the pipeline can recover from (suppressed values,
/// missing coverage, tolerance breaches) are not errors; they are collected
/// in [`crate::quality::QualityLog`]. Only conditions that make a run
/// meaningless halt it.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error opening or reading a file
    #[error("IO error reading {label} at {}: {source}", .path.display())]
    Io {
        label: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error parsing delimited data
    #[error("CSV error in {label} at {}: {source}", .path.display())]
    Csv {
        label: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required input file does not exist
    #[error("missing {label}: {}", .path.display())]
    MissingInput { label: &'static str, path: PathBuf },

    /// An input file parsed but yielded no usable rows
    #[error("{label} at {} contains no usable rows", .path.display())]
    EmptyTable { label: &'static str, path: PathBuf },

    /// An input table lacks a column its loader requires
    #[error("{label} is missing required column '{column}'")]
    MissingColumn { label: &'static str, column: &'static str },

    /// Industry codes observed in the employment data with no segment assignment
    #[error("missing segment assignment for industry codes: {}", .codes.join(", "))]
    UnmappedIndustry { codes: Vec<String> },

    /// Error reading the pipeline configuration file
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, ForecastError>;
