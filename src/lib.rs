//! A Rust library for building occupation-level employment forecasts for
//! automotive supply-chain segments from government and commercial
//! employment datasets.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod quality;
pub mod reader;
pub mod registry;
pub mod report;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::PipelineConfig;
pub use error::{ForecastError, Result};
pub use pipeline::{Pipeline, RunSummary};

// Domain enums
pub use models::{AttributionSource, GrowthSource, Methodology, SegmentId, ShiftSource, Stage};

// Quality reporting
pub use quality::{IssueKind, QualityIssue, QualityLog};

// Stage entry points
pub use algorithm::{
    aggregate_employment, base_shares, distribute_branch, extend_segments, extend_stages,
    interpolate_share, split_attribution,
};
