//! Segment and stage aggregation of industry employment.
//!
//! Collapses industry-level employment observations into segment- and
//! stage-level time series using the assignment lookup. Aggregation is a
//! plain sum; what needs care is the failure handling. An industry code
//! with no assignment halts the run, while a suppressed employment value
//! contributes zero and is flagged for audit.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::error::{ForecastError, Result};
use crate::models::{IndustryEmployment, SegmentId, Stage};
use crate::quality::{IssueKind, QualityLog};
use crate::registry::SegmentLookup;

/// Employment total for one segment in one year
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentYearTotal {
    pub segment_id: SegmentId,
    pub segment_name: String,
    pub year: i32,
    pub employment: f64,
}

/// Employment total for one stage in one year
#[derive(Debug, Clone, PartialEq)]
pub struct StageYearTotal {
    pub stage: Stage,
    pub year: i32,
    pub employment: f64,
}

/// Segment- and stage-level series produced by the aggregator
#[derive(Debug, Clone)]
pub struct SegmentAggregation {
    pub segments: Vec<SegmentYearTotal>,
    pub stages: Vec<StageYearTotal>,
}

impl SegmentAggregation {
    /// Segment totals for one year, keyed by segment id
    #[must_use]
    pub fn segment_totals_for(&self, year: i32) -> FxHashMap<SegmentId, f64> {
        self.segments
            .iter()
            .filter(|total| total.year == year)
            .map(|total| (total.segment_id, total.employment))
            .collect()
    }
}

/// Aggregate industry employment to segment and stage level.
///
/// Returns an error listing every industry code observed in the data that
/// has no segment assignment; partial aggregation over an incomplete lookup
/// would silently understate segment totals.
pub fn aggregate_employment(
    records: &[IndustryEmployment],
    lookup: &SegmentLookup,
    quality: &mut QualityLog,
) -> Result<SegmentAggregation> {
    let mut unmapped: Vec<String> = Vec::new();
    let mut suppressed = 0usize;
    let mut segment_sums: BTreeMap<(SegmentId, i32), f64> = BTreeMap::new();
    let mut stage_sums: BTreeMap<(Stage, i32), f64> = BTreeMap::new();

    for record in records {
        let Some(assignment) = lookup.get(&record.naics_code) else {
            if !unmapped.contains(&record.naics_code) {
                unmapped.push(record.naics_code.clone());
            }
            continue;
        };
        let employment = match record.employment {
            Some(value) if value.is_finite() => value,
            _ => {
                suppressed += 1;
                quality.flag_quiet(
                    "aggregate",
                    IssueKind::SuppressedValue,
                    format!("{}/{}", record.naics_code, record.year),
                    "suppressed employment value treated as zero",
                );
                0.0
            }
        };
        *segment_sums.entry((assignment.segment_id, record.year)).or_insert(0.0) += employment;
        *stage_sums.entry((assignment.stage, record.year)).or_insert(0.0) += employment;
    }

    if !unmapped.is_empty() {
        unmapped.sort();
        return Err(ForecastError::UnmappedIndustry { codes: unmapped });
    }
    if suppressed > 0 {
        log::warn!("{suppressed} suppressed employment values treated as zero (see quality report)");
    }

    let names = lookup.segment_names();
    let segments = segment_sums
        .into_iter()
        .map(|((segment_id, year), employment)| SegmentYearTotal {
            segment_id,
            segment_name: names.get(&segment_id).cloned().unwrap_or_else(|| segment_id.to_string()),
            year,
            employment,
        })
        .collect();
    let stages = stage_sums
        .into_iter()
        .map(|((stage, year), employment)| StageYearTotal { stage, year, employment })
        .collect();

    Ok(SegmentAggregation { segments, stages })
}
