//! Loaders for the pipeline's input datasets.
//!
//! Each input table gets its own register module with a loader and any
//! normalization the raw file needs. Available registers:
//! - Segments: industry-to-segment assignment lookup
//! - QCEW: historical industry employment series
//! - Attribution: auto-attribution share tables (two definitions)
//! - Growth: year-over-year growth rates (two sources, segment and stage level)
//! - Staffing: base-year occupational staffing survey
//! - Shifts: national occupational-shift projections

pub mod attribution;
pub mod growth;
pub mod qcew;
pub mod segments;
pub mod shifts;
pub mod staffing;

use std::path::Path;
use std::time::Instant;

use crate::error::Result;

pub use attribution::AttributionRegistry;
pub use growth::{GrowthTable, SegmentGrowthRegistry, StageGrowthRegistry};
pub use qcew::QcewRegistry;
pub use segments::{SegmentLookup, SegmentRegistry};
pub use shifts::{ShiftRegistry, ShiftShares, ShiftTable};
pub use staffing::StaffingRegistry;

/// Base trait for dataset loaders
pub trait RegisterLoader {
    /// Row type produced by this register
    type Row;

    /// Short name used in logs and error labels
    fn register_name(&self) -> &'static str;

    /// Load all rows from the file at `path`
    fn load(&self, path: &Path) -> Result<Vec<Self::Row>>;
}

/// Load a register, logging the row count and timing
pub fn load_register<L: RegisterLoader>(loader: &L, path: &Path) -> Result<Vec<L::Row>> {
    let start = Instant::now();
    let rows = loader.load(path)?;
    log::info!(
        "Loaded {} {} rows from {} in {:?}",
        rows.len(),
        loader.register_name(),
        path.display(),
        start.elapsed()
    );
    Ok(rows)
}
