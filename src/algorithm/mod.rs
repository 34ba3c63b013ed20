//! The four pipeline stages.
//!
//! - [`aggregate`]: industry employment → segment and stage series
//! - [`attribution`]: automotive split per attribution definition
//! - [`growth`]: forward extension with growth rates
//! - [`occupation`]: segment totals → detailed occupation forecasts

pub mod aggregate;
pub mod attribution;
pub mod growth;
pub mod occupation;

pub use aggregate::{SegmentAggregation, SegmentYearTotal, StageYearTotal, aggregate_employment};
pub use attribution::{AttributionDiagnostic, AttributionOutcome, split_attribution};
pub use growth::{
    SegmentBranch, SegmentSeriesPoint, StageBranch, StageSeriesPoint, ValueType,
    extend_segments, extend_stages,
};
pub use occupation::{
    DistributionInputs, OccupationBaseShare, OccupationForecastRow, ValidationRow,
    auto_adjusted_base_employment, base_shares, distribute_branch,
    flag_missing_shift_coverage, interpolate_share,
};
