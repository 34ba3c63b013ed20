//! Forward extension of segment and stage series with growth rates.
//!
//! `value[year] = value[year - 1] × (1 + pct[year] / 100)`, compounding
//! from the last historical level. Each growth source is applied
//! independently, giving one forecast branch per attribution × source
//! combination. A year without a rate keeps the prior level (zero growth)
//! and is flagged; skipping the year silently would shorten the series.

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::aggregate::{SegmentYearTotal, StageYearTotal};
use crate::models::{Methodology, SegmentId, Stage};
use crate::quality::{IssueKind, QualityLog};
use crate::registry::GrowthTable;

/// Whether a point is observed history or forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueType {
    /// Observed historical value
    #[serde(rename = "QCEW")]
    Qcew,
    /// Extended with a growth rate
    Forecast,
}

/// One point of an extended segment series
#[derive(Debug, Clone)]
pub struct SegmentSeriesPoint {
    pub segment_id: SegmentId,
    pub segment_name: String,
    pub year: i32,
    pub employment: f64,
    pub value_type: ValueType,
    /// Rate applied to reach this point; `None` for history and for the
    /// zero-growth fallback
    pub applied_yoy_pct: Option<f64>,
}

/// One point of an extended stage series
#[derive(Debug, Clone)]
pub struct StageSeriesPoint {
    pub stage: Stage,
    pub year: i32,
    pub employment: f64,
    pub value_type: ValueType,
    pub applied_yoy_pct: Option<f64>,
}

/// Extended segment series for one methodology branch
#[derive(Debug, Clone)]
pub struct SegmentBranch {
    pub methodology: Methodology,
    pub points: Vec<SegmentSeriesPoint>,
}

impl SegmentBranch {
    /// Employment keyed by (segment, year)
    #[must_use]
    pub fn totals(&self) -> FxHashMap<(SegmentId, i32), f64> {
        self.points
            .iter()
            .map(|point| ((point.segment_id, point.year), point.employment))
            .collect()
    }

    /// Sorted distinct years in the window `[base_year, horizon]`
    #[must_use]
    pub fn forecast_years(&self, base_year: i32) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .points
            .iter()
            .map(|point| point.year)
            .filter(|year| *year >= base_year)
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

/// Extended stage series for one methodology branch
#[derive(Debug, Clone)]
pub struct StageBranch {
    pub methodology: Methodology,
    pub points: Vec<StageSeriesPoint>,
}

/// One extended (year, employment, type, rate) step
type ExtendedStep = (i32, f64, ValueType, Option<f64>);

fn extend_values(
    history: &[(i32, f64)],
    rate_for: impl Fn(i32) -> Option<f64>,
    horizon_year: i32,
    key: &str,
    log_stage: &'static str,
    quality: &mut QualityLog,
) -> Vec<ExtendedStep> {
    let mut steps: Vec<ExtendedStep> = history
        .iter()
        .map(|(year, employment)| (*year, *employment, ValueType::Qcew, None))
        .collect();
    let Some((last_year, last_level)) = history.last().copied() else {
        return steps;
    };

    let mut current = last_level;
    for year in (last_year + 1)..=horizon_year {
        match rate_for(year) {
            Some(pct) => {
                current *= 1.0 + pct / 100.0;
                steps.push((year, current, ValueType::Forecast, Some(pct)));
            }
            None => {
                quality.flag(
                    log_stage,
                    IssueKind::MissingGrowthRate,
                    format!("{key}/{year}"),
                    "no growth rate for year; zero growth applied",
                );
                steps.push((year, current, ValueType::Forecast, None));
            }
        }
    }
    steps
}

/// Extend attribution-adjusted segment series through the horizon
#[must_use]
pub fn extend_segments(
    adjusted: &[SegmentYearTotal],
    table: &GrowthTable,
    methodology: Methodology,
    horizon_year: i32,
    quality: &mut QualityLog,
) -> SegmentBranch {
    let mut points = Vec::new();
    let mut segment_ids: Vec<SegmentId> =
        adjusted.iter().map(|total| total.segment_id).collect();
    segment_ids.sort_unstable();
    segment_ids.dedup();

    for segment_id in segment_ids {
        let mut history: Vec<(i32, f64)> = adjusted
            .iter()
            .filter(|total| total.segment_id == segment_id)
            .map(|total| (total.year, total.employment))
            .collect();
        history.sort_unstable_by_key(|(year, _)| *year);
        let segment_name = adjusted
            .iter()
            .find(|total| total.segment_id == segment_id)
            .map(|total| total.segment_name.clone())
            .unwrap_or_else(|| segment_id.to_string());

        let steps = extend_values(
            &history,
            |year| table.segment_rate(segment_id, year),
            horizon_year,
            &format!("segment {segment_id}"),
            "growth",
            quality,
        );
        points.extend(steps.into_iter().map(|(year, employment, value_type, pct)| {
            SegmentSeriesPoint {
                segment_id,
                segment_name: segment_name.clone(),
                year,
                employment,
                value_type,
                applied_yoy_pct: pct,
            }
        }));
    }

    SegmentBranch { methodology, points }
}

/// Extend attribution-adjusted stage series through the horizon
#[must_use]
pub fn extend_stages(
    adjusted: &[StageYearTotal],
    table: &GrowthTable,
    methodology: Methodology,
    horizon_year: i32,
    quality: &mut QualityLog,
) -> StageBranch {
    let mut points = Vec::new();
    for stage in Stage::ALL {
        let mut history: Vec<(i32, f64)> = adjusted
            .iter()
            .filter(|total| total.stage == stage)
            .map(|total| (total.year, total.employment))
            .collect();
        if history.is_empty() {
            continue;
        }
        history.sort_unstable_by_key(|(year, _)| *year);

        let steps = extend_values(
            &history,
            |year| table.stage_rate(stage, year),
            horizon_year,
            &format!("stage {stage}"),
            "growth",
            quality,
        );
        points.extend(steps.into_iter().map(|(year, employment, value_type, pct)| {
            StageSeriesPoint { stage, year, employment, value_type, applied_yoy_pct: pct }
        }));
    }
    StageBranch { methodology, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttributionSource, GrowthSource, SegmentGrowthRate};

    fn totals(segment_id: SegmentId, values: &[(i32, f64)]) -> Vec<SegmentYearTotal> {
        values
            .iter()
            .map(|(year, employment)| SegmentYearTotal {
                segment_id,
                segment_name: format!("{segment_id}. Segment"),
                year: *year,
                employment: *employment,
            })
            .collect()
    }

    fn rates(segment_id: SegmentId, pairs: &[(i32, f64)]) -> GrowthTable {
        let rows: Vec<SegmentGrowthRate> = pairs
            .iter()
            .map(|(year, pct)| SegmentGrowthRate {
                segment_id,
                segment_name: String::new(),
                year: *year,
                employment_yoy_pct: Some(*pct),
            })
            .collect();
        GrowthTable::new(&rows, &[])
    }

    const BRANCH: Methodology =
        Methodology { attribution: AttributionSource::Bea, growth: GrowthSource::Moody };

    #[test]
    fn compounds_rates_year_over_year() {
        let adjusted = totals(7, &[(2023, 31_000.0), (2024, 32_000.0)]);
        let table = rates(7, &[(2025, 2.0), (2026, -1.0)]);
        let mut quality = QualityLog::new();
        let branch = extend_segments(&adjusted, &table, BRANCH, 2026, &mut quality);

        let lookup = branch.totals();
        assert_eq!(lookup[&(7, 2024)], 32_000.0);
        assert!((lookup[&(7, 2025)] - 32_000.0 * 1.02).abs() < 1e-9);
        assert!((lookup[&(7, 2026)] - 32_000.0 * 1.02 * 0.99).abs() < 1e-9);
        assert!(quality.is_empty());

        let forecast_2025 = branch
            .points
            .iter()
            .find(|point| point.year == 2025)
            .unwrap();
        assert_eq!(forecast_2025.value_type, ValueType::Forecast);
        assert_eq!(forecast_2025.applied_yoy_pct, Some(2.0));
    }

    #[test]
    fn missing_rate_holds_level_and_flags() {
        let adjusted = totals(7, &[(2024, 32_000.0)]);
        let table = rates(7, &[(2025, 2.0)]);
        let mut quality = QualityLog::new();
        let branch = extend_segments(&adjusted, &table, BRANCH, 2026, &mut quality);

        let lookup = branch.totals();
        assert!((lookup[&(7, 2026)] - lookup[&(7, 2025)]).abs() < 1e-9);
        assert_eq!(quality.count_of(IssueKind::MissingGrowthRate), 1);

        let fallback = branch.points.iter().find(|point| point.year == 2026).unwrap();
        assert_eq!(fallback.applied_yoy_pct, None);
        assert_eq!(fallback.value_type, ValueType::Forecast);
    }

    #[test]
    fn forecast_years_cover_base_through_horizon() {
        let adjusted = totals(7, &[(2022, 30_000.0), (2024, 32_000.0)]);
        let table = rates(7, &[(2025, 1.0), (2026, 1.0)]);
        let mut quality = QualityLog::new();
        let branch = extend_segments(&adjusted, &table, BRANCH, 2026, &mut quality);
        assert_eq!(branch.forecast_years(2024), vec![2024, 2025, 2026]);
    }
}
