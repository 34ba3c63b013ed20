//! Output tables: flattened rows and derived summaries.
//!
//! Everything here is presentation-level: flattening branch series for
//! delimited output, the all-segment rollup, the snapshot extract, and the
//! sensitivity and education summaries. Branch averaging deliberately does
//! not exist in this crate; min/max/mean/std across branches is as far as
//! reporting goes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::algorithm::aggregate::SegmentAggregation;
use crate::algorithm::growth::{SegmentBranch, StageBranch, ValueType};
use crate::algorithm::occupation::OccupationForecastRow;
use crate::models::{
    ALL_SEGMENTS_ID, ALL_SEGMENTS_LABEL, EducationGroup, SegmentId, Stage,
};

/// Unadjusted historical segment total, straight from aggregation
#[derive(Debug, Clone, Serialize)]
pub struct SegmentHistoryRow {
    pub segment_id: SegmentId,
    pub segment_name: String,
    pub year: i32,
    pub employment: f64,
}

/// Unadjusted historical stage total
#[derive(Debug, Clone, Serialize)]
pub struct StageHistoryRow {
    pub stage: Stage,
    pub year: i32,
    pub employment: f64,
}

/// Flatten the raw aggregation into history rows
#[must_use]
pub fn history_rows(
    aggregation: &SegmentAggregation,
) -> (Vec<SegmentHistoryRow>, Vec<StageHistoryRow>) {
    let segments = aggregation
        .segments
        .iter()
        .map(|total| SegmentHistoryRow {
            segment_id: total.segment_id,
            segment_name: total.segment_name.clone(),
            year: total.year,
            employment: total.employment,
        })
        .collect();
    let stages = aggregation
        .stages
        .iter()
        .map(|total| StageHistoryRow {
            stage: total.stage,
            year: total.year,
            employment: total.employment,
        })
        .collect();
    (segments, stages)
}

/// Flattened segment series row, all branches stacked
#[derive(Debug, Clone, Serialize)]
pub struct SegmentSeriesRow {
    pub segment_id: SegmentId,
    pub segment_name: String,
    pub year: i32,
    pub employment: f64,
    pub value_type: ValueType,
    pub attribution: &'static str,
    pub forecast_source: Option<&'static str>,
    pub applied_yoy_pct: Option<f64>,
    pub methodology: String,
}

/// Flattened stage series row, all branches stacked
#[derive(Debug, Clone, Serialize)]
pub struct StageSeriesRow {
    pub stage: Stage,
    pub year: i32,
    pub employment: f64,
    pub value_type: ValueType,
    pub attribution: &'static str,
    pub forecast_source: Option<&'static str>,
    pub applied_yoy_pct: Option<f64>,
    pub methodology: String,
}

/// Stack segment branches into output rows
#[must_use]
pub fn segment_series_rows(branches: &[SegmentBranch]) -> Vec<SegmentSeriesRow> {
    let mut rows: Vec<SegmentSeriesRow> = branches
        .iter()
        .flat_map(|branch| {
            let methodology = branch.methodology.label();
            branch.points.iter().map(move |point| SegmentSeriesRow {
                segment_id: point.segment_id,
                segment_name: point.segment_name.clone(),
                year: point.year,
                employment: point.employment,
                value_type: point.value_type,
                attribution: branch.methodology.attribution.label(),
                forecast_source: match point.value_type {
                    ValueType::Forecast => Some(branch.methodology.growth.label()),
                    ValueType::Qcew => None,
                },
                applied_yoy_pct: point.applied_yoy_pct,
                methodology: methodology.clone(),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        (a.segment_id, a.year, &a.methodology).cmp(&(b.segment_id, b.year, &b.methodology))
    });
    rows
}

/// Stack stage branches into output rows
#[must_use]
pub fn stage_series_rows(branches: &[StageBranch]) -> Vec<StageSeriesRow> {
    let mut rows: Vec<StageSeriesRow> = branches
        .iter()
        .flat_map(|branch| {
            let methodology = branch.methodology.label();
            branch.points.iter().map(move |point| StageSeriesRow {
                stage: point.stage,
                year: point.year,
                employment: point.employment,
                value_type: point.value_type,
                attribution: branch.methodology.attribution.label(),
                forecast_source: match point.value_type {
                    ValueType::Forecast => Some(branch.methodology.growth.label()),
                    ValueType::Qcew => None,
                },
                applied_yoy_pct: point.applied_yoy_pct,
                methodology: methodology.clone(),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        (a.stage, a.year, &a.methodology).cmp(&(b.stage, b.year, &b.methodology))
    });
    rows
}

/// Append the all-segment rollup (segment id 0) and sort for output.
///
/// Rollup rows sum employment per occupation × year × branch; their share
/// is the occupation's share of the rollup total, and the attribution audit
/// fields are left blank because they have no meaning across segments.
#[must_use]
pub fn with_all_segment_rollup(
    mut rows: Vec<OccupationForecastRow>,
) -> Vec<OccupationForecastRow> {
    struct RollupAcc {
        employment: f64,
        soctitle: String,
        share_base: f64,
        share_horizon: f64,
        ep_entry_education: Option<String>,
        ep_work_experience: Option<String>,
        ep_on_the_job_training: Option<String>,
        ep_edu_grouped: Option<EducationGroup>,
    }

    let mut rollups: BTreeMap<(String, String, i32), RollupAcc> = BTreeMap::new();
    let mut year_totals: BTreeMap<(String, i32), f64> = BTreeMap::new();
    for row in &rows {
        *year_totals.entry((row.methodology.clone(), row.year)).or_insert(0.0) +=
            row.employment;
        rollups
            .entry((row.methodology.clone(), row.occcd.clone(), row.year))
            .and_modify(|acc| acc.employment += row.employment)
            .or_insert_with(|| RollupAcc {
                employment: row.employment,
                soctitle: row.soctitle.clone(),
                share_base: row.share_base,
                share_horizon: row.share_horizon,
                ep_entry_education: row.ep_entry_education.clone(),
                ep_work_experience: row.ep_work_experience.clone(),
                ep_on_the_job_training: row.ep_on_the_job_training.clone(),
                ep_edu_grouped: row.ep_edu_grouped,
            });
    }

    for ((methodology, occcd, year), acc) in rollups {
        let total = year_totals
            .get(&(methodology.clone(), year))
            .copied()
            .unwrap_or(0.0);
        let share = if total > 0.0 { acc.employment / total } else { 0.0 };
        rows.push(OccupationForecastRow {
            segment_id: ALL_SEGMENTS_ID,
            segment_name: ALL_SEGMENTS_LABEL.to_string(),
            year,
            methodology,
            occcd,
            soctitle: acc.soctitle,
            employment: acc.employment,
            share,
            share_base: acc.share_base,
            share_horizon: acc.share_horizon,
            auto_share: None,
            auto_adjusted_share: None,
            auto_adjusted_base_employment: None,
            shift_source: None,
            ep_entry_education: acc.ep_entry_education,
            ep_work_experience: acc.ep_work_experience,
            ep_on_the_job_training: acc.ep_on_the_job_training,
            ep_edu_grouped: acc.ep_edu_grouped,
        });
    }

    rows.sort_by(|a, b| {
        (a.segment_id, &a.occcd, a.year, &a.methodology)
            .cmp(&(b.segment_id, &b.occcd, b.year, &b.methodology))
    });
    rows
}

/// Snapshot-year extract of the forecast panel
#[must_use]
pub fn snapshot(rows: &[OccupationForecastRow], year: i32) -> Vec<OccupationForecastRow> {
    rows.iter().filter(|row| row.year == year).cloned().collect()
}

/// Spread of one occupation's forecast across the methodology branches
#[derive(Debug, Clone, Serialize)]
pub struct SensitivityRow {
    pub segment_id: SegmentId,
    pub segment_name: String,
    pub occcd: String,
    pub soctitle: String,
    pub year: i32,
    pub n_branches: usize,
    pub employment_min: f64,
    pub employment_max: f64,
    pub employment_mean: f64,
    pub employment_std: f64,
}

/// Min/max/mean/std of employment across branches, per occupation × year
#[must_use]
pub fn sensitivity_summary(rows: &[OccupationForecastRow]) -> Vec<SensitivityRow> {
    let mut grouped: BTreeMap<(SegmentId, &str, i32), Vec<&OccupationForecastRow>> =
        BTreeMap::new();
    for row in rows {
        grouped
            .entry((row.segment_id, row.occcd.as_str(), row.year))
            .or_default()
            .push(row);
    }

    grouped
        .into_iter()
        .map(|((segment_id, occcd, year), group)| {
            let values: Vec<f64> = group.iter().map(|row| row.employment).collect();
            let n = values.len();
            let mean = values.iter().sum::<f64>() / n as f64;
            let variance =
                values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n as f64;
            SensitivityRow {
                segment_id,
                segment_name: group[0].segment_name.clone(),
                occcd: occcd.to_string(),
                soctitle: group[0].soctitle.clone(),
                year,
                n_branches: n,
                employment_min: values.iter().copied().fold(f64::INFINITY, f64::min),
                employment_max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                employment_mean: mean,
                employment_std: variance.sqrt(),
            }
        })
        .collect()
}

/// Snapshot-year employment by segment × grouped education requirement
#[derive(Debug, Clone, Serialize)]
pub struct EducationSummaryRow {
    pub segment_id: SegmentId,
    pub segment_name: String,
    pub methodology: String,
    pub edu_group: EducationGroup,
    pub employment: f64,
    /// Share of the segment's grouped employment; absent when the grouped
    /// total is zero
    pub segment_share: Option<f64>,
}

/// Summarize the snapshot year by education group.
///
/// Rollup rows are excluded to avoid double counting; occupations without
/// a grouped education requirement are left out of the summary.
#[must_use]
pub fn education_summary(
    rows: &[OccupationForecastRow],
    snapshot_year: i32,
) -> Vec<EducationSummaryRow> {
    let mut grouped: BTreeMap<(SegmentId, &str, EducationGroup), (f64, &str)> = BTreeMap::new();
    for row in rows {
        if row.year != snapshot_year || row.segment_id == ALL_SEGMENTS_ID {
            continue;
        }
        let Some(edu_group) = row.ep_edu_grouped else {
            continue;
        };
        let entry = grouped
            .entry((row.segment_id, row.methodology.as_str(), edu_group))
            .or_insert((0.0, row.segment_name.as_str()));
        entry.0 += row.employment;
    }

    let mut totals: BTreeMap<(SegmentId, &str), f64> = BTreeMap::new();
    for ((segment_id, methodology, _), (employment, _)) in &grouped {
        *totals.entry((*segment_id, *methodology)).or_insert(0.0) += *employment;
    }

    grouped
        .into_iter()
        .map(|((segment_id, methodology, edu_group), (employment, segment_name))| {
            let total = totals.get(&(segment_id, methodology)).copied().unwrap_or(0.0);
            EducationSummaryRow {
                segment_id,
                segment_name: segment_name.to_string(),
                methodology: methodology.to_string(),
                edu_group,
                employment,
                segment_share: if total > 0.0 { Some(employment / total) } else { None },
            }
        })
        .collect()
}

/// Output file locations for one run
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub segment_history: PathBuf,
    pub stage_history: PathBuf,
    pub segment_series: PathBuf,
    pub stage_series: PathBuf,
    pub occupation_forecasts: PathBuf,
    pub snapshot: PathBuf,
    pub sensitivity: PathBuf,
    pub education: PathBuf,
    pub validation: PathBuf,
    pub attribution_diagnostics: PathBuf,
    pub quality: PathBuf,
}

impl ReportPaths {
    #[must_use]
    pub fn new(output_dir: &Path, base_year: i32, horizon_year: i32, snapshot_year: i32) -> Self {
        Self {
            segment_history: output_dir.join("segment_employment_history.csv"),
            stage_history: output_dir.join("stage_employment_history.csv"),
            segment_series: output_dir.join("segment_employment_timeseries.csv"),
            stage_series: output_dir.join("stage_employment_timeseries.csv"),
            occupation_forecasts: output_dir
                .join(format!("occupation_forecasts_{base_year}_{horizon_year}.csv")),
            snapshot: output_dir.join(format!("occupation_forecast_{snapshot_year}.csv")),
            sensitivity: output_dir.join("occupation_sensitivity_summary.csv"),
            education: output_dir.join("education_summary.csv"),
            validation: output_dir.join("forecast_validation.csv"),
            attribution_diagnostics: output_dir.join("attribution_diagnostics.csv"),
            quality: output_dir.join("data_quality_report.csv"),
        }
    }
}
