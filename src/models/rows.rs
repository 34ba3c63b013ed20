//! Row types for the input datasets.
//!
//! Each struct mirrors one input table's columns; loaders in
//! [`crate::registry`] deserialize and normalize them.

use serde::{Deserialize, Serialize};

use super::segment::{SegmentId, Stage};

/// One industry's entry in the segment-assignment lookup.
///
/// Every industry code observed downstream must resolve to exactly one of
/// these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryAssignment {
    /// Industry code (4-digit NAICS)
    pub naics_code: String,
    /// Descriptive industry title
    #[serde(default)]
    pub naics_title: String,
    /// Assigned supply-chain segment
    pub segment_id: SegmentId,
    /// Segment name as carried in the lookup
    pub segment_name: String,
    /// Assigned supply-chain stage
    pub stage: Stage,
    /// Base-year employment, used as the aggregation weight
    pub base_employment: f64,
}

/// One industry × year employment observation.
///
/// A missing employment value means the figure was suppressed at the
/// source, not that it is zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryEmployment {
    pub naics_code: String,
    pub year: i32,
    pub employment: Option<f64>,
}

/// Normalized attribution share for one industry: the fraction of its
/// employment attributable to automotive production, in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionShare {
    pub naics_code: String,
    pub auto_share: f64,
}

/// Year-over-year growth rate for one segment, in percent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentGrowthRate {
    pub segment_id: SegmentId,
    #[serde(default)]
    pub segment_name: String,
    pub year: i32,
    pub employment_yoy_pct: Option<f64>,
}

/// Year-over-year growth rate for one stage, in percent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageGrowthRate {
    pub stage: Stage,
    pub year: i32,
    pub employment_yoy_pct: Option<f64>,
}

/// One staffing-survey observation: employment of an occupation within a
/// segment in a given year.
///
/// The code's position in the rollup hierarchy is not carried here; it is
/// derived from the code itself when the survey is filtered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffingRecord {
    pub segment_id: SegmentId,
    /// SOC occupation code
    pub occcd: String,
    /// SOC occupation title
    #[serde(default)]
    pub soctitle: String,
    pub year: i32,
    pub employment: Option<f64>,
    /// Typical entry-level education requirement
    #[serde(default)]
    pub ep_entry_education: Option<String>,
    /// Typical prior work experience requirement
    #[serde(default)]
    pub ep_work_experience: Option<String>,
    /// Typical on-the-job training requirement
    #[serde(default)]
    pub ep_on_the_job_training: Option<String>,
}

/// National occupational-shift observation for one industry × occupation:
/// the occupation's share of industry employment at the base and horizon
/// years
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub naics_code: String,
    pub occupation_code: String,
    #[serde(default)]
    pub occupation_title: String,
    /// Share of industry employment at the base year, as a fraction
    pub share_base: f64,
    /// Projected share of industry employment at the horizon year
    pub share_horizon: f64,
}
