//! Occupation distribution: segment totals spread across detailed
//! occupations.
//!
//! Three steps per branch:
//! 1. attribution-adjust the base-year staffing shares with the segment's
//!    auto share (the occupational mix is assumed identical between the
//!    automotive and non-automotive portions of an industry);
//! 2. scale with the branch's segment totals;
//! 3. where the national shift table covers a pair, move its share along a
//!    straight line between the base and horizon endpoints, clamped to the
//!    window. Uncovered pairs hold their base-year share and carry an
//!    explicit fallback tag.
//!
//! The branches stay side by side; nothing here averages them.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::growth::SegmentBranch;
use crate::models::{EducationGroup, SegmentId, ShiftSource, StaffingRecord, group_education};
use crate::quality::{IssueKind, QualityLog};
use crate::registry::ShiftTable;

/// Base-year occupational mix entry for one segment × occupation
#[derive(Debug, Clone)]
pub struct OccupationBaseShare {
    pub segment_id: SegmentId,
    pub occcd: String,
    pub soctitle: String,
    /// Base-year staffing employment (survey count)
    pub employment: f64,
    /// Share of the segment's detailed employment, normalized to sum to 1
    pub base_share: f64,
    pub ep_entry_education: Option<String>,
    pub ep_work_experience: Option<String>,
    pub ep_on_the_job_training: Option<String>,
    pub ep_edu_grouped: Option<EducationGroup>,
}

/// Normalize detailed staffing rows into base shares.
///
/// Input rows must already be filtered to leaf-level base-year records
/// (see [`crate::registry::staffing::detailed_base_year`]). Segments whose
/// detailed employment sums to zero are dropped.
#[must_use]
pub fn base_shares(staffing: &[StaffingRecord]) -> Vec<OccupationBaseShare> {
    let mut totals: BTreeMap<SegmentId, f64> = BTreeMap::new();
    for row in staffing {
        if let Some(employment) = row.employment {
            *totals.entry(row.segment_id).or_insert(0.0) += employment;
        }
    }

    let mut shares: Vec<OccupationBaseShare> = staffing
        .iter()
        .filter_map(|row| {
            let employment = row.employment?;
            let total = totals.get(&row.segment_id).copied().unwrap_or(0.0);
            if total <= 0.0 {
                return None;
            }
            let ep_edu_grouped = row
                .ep_entry_education
                .as_deref()
                .and_then(group_education);
            Some(OccupationBaseShare {
                segment_id: row.segment_id,
                occcd: row.occcd.clone(),
                soctitle: row.soctitle.clone(),
                employment,
                base_share: employment / total,
                ep_entry_education: row.ep_entry_education.clone(),
                ep_work_experience: row.ep_work_experience.clone(),
                ep_on_the_job_training: row.ep_on_the_job_training.clone(),
                ep_edu_grouped,
            })
        })
        .collect();
    shares.sort_by(|a, b| (a.segment_id, &a.occcd).cmp(&(b.segment_id, &b.occcd)));
    shares
}

/// Linear interpolation of a share between the base and horizon endpoints,
/// clamped to the window. Boundary years reproduce the inputs exactly.
#[must_use]
pub fn interpolate_share(
    share_base: f64,
    share_horizon: f64,
    year: i32,
    base_year: i32,
    horizon_year: i32,
) -> f64 {
    if year <= base_year || horizon_year <= base_year {
        return share_base;
    }
    if year >= horizon_year {
        return share_horizon;
    }
    let progress = f64::from(year - base_year) / f64::from(horizon_year - base_year);
    share_base + (share_horizon - share_base) * progress
}

/// Step-A audit value: the automotive portion of an occupation's base-year
/// employment within a segment
#[must_use]
pub fn auto_adjusted_base_employment(
    segment_base_total: f64,
    base_share: f64,
    auto_share: f64,
) -> f64 {
    segment_base_total * base_share * auto_share
}

/// One occupation × year × branch forecast row
#[derive(Debug, Clone, Serialize)]
pub struct OccupationForecastRow {
    pub segment_id: SegmentId,
    pub segment_name: String,
    pub year: i32,
    pub methodology: String,
    pub occcd: String,
    pub soctitle: String,
    pub employment: f64,
    /// Share applied this year
    pub share: f64,
    /// Share at the base year (shift endpoint, or the staffing share)
    pub share_base: f64,
    /// Share at the horizon year (shift endpoint, or the staffing share)
    pub share_horizon: f64,
    /// Segment auto share; absent on rollup rows
    pub auto_share: Option<f64>,
    /// Step-A adjusted share (base share × auto share); absent on rollup rows
    pub auto_adjusted_share: Option<f64>,
    /// Step-A adjusted base-year employment; absent on rollup rows
    pub auto_adjusted_base_employment: Option<f64>,
    /// Provenance of the applied share; absent on rollup rows
    pub shift_source: Option<ShiftSource>,
    pub ep_entry_education: Option<String>,
    pub ep_work_experience: Option<String>,
    pub ep_on_the_job_training: Option<String>,
    pub ep_edu_grouped: Option<EducationGroup>,
}

/// Occupation-sum check for one segment × year × branch
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRow {
    pub segment_id: SegmentId,
    pub year: i32,
    pub methodology: String,
    pub occupation_total: f64,
    pub segment_total: f64,
    /// Percent deviation; absent when the segment total is zero
    pub pct_diff: Option<f64>,
}

/// Shared inputs for distributing one branch
pub struct DistributionInputs<'a> {
    pub shares: &'a [OccupationBaseShare],
    /// Base-year weighted auto share per segment for the branch's
    /// attribution definition
    pub auto_shares: &'a BTreeMap<SegmentId, f64>,
    pub shifts: &'a ShiftTable,
    /// Raw (pre-attribution) base-year segment totals, for Step-A audit
    pub raw_base_totals: &'a FxHashMap<SegmentId, f64>,
    pub base_year: i32,
    pub horizon_year: i32,
    /// Relative tolerance for the occupation-sum validation
    pub tolerance: f64,
}

/// Distribute one branch's segment totals across occupations.
///
/// Returns the forecast rows and the per segment × year validation rows;
/// tolerance breaches are flagged on `quality` but never corrected.
#[must_use]
pub fn distribute_branch(
    branch: &SegmentBranch,
    inputs: &DistributionInputs<'_>,
    quality: &mut QualityLog,
) -> (Vec<OccupationForecastRow>, Vec<ValidationRow>) {
    let methodology = branch.methodology.label();
    let totals = branch.totals();
    let years = branch.forecast_years(inputs.base_year);
    let segment_names: FxHashMap<SegmentId, &str> = branch
        .points
        .iter()
        .map(|point| (point.segment_id, point.segment_name.as_str()))
        .collect();

    let mut rows = Vec::new();
    for share in inputs.shares {
        let auto_share = inputs
            .auto_shares
            .get(&share.segment_id)
            .copied()
            .unwrap_or(0.0);
        let auto_adjusted_share = share.base_share * auto_share;
        let raw_base_total = inputs
            .raw_base_totals
            .get(&share.segment_id)
            .copied()
            .unwrap_or(0.0);
        let adjusted_base = auto_adjusted_base_employment(raw_base_total, share.base_share, auto_share);

        let shift = inputs
            .shifts
            .get(share.segment_id, &share.occcd)
            .filter(|shift| shift.share_base > 0.0);
        let (share_base, share_horizon, shift_source) = match shift {
            Some(shift) => (shift.share_base, shift.share_horizon, ShiftSource::NationalProjection),
            None => (share.base_share, share.base_share, ShiftSource::ConstantShareFallback),
        };
        let segment_name = segment_names
            .get(&share.segment_id)
            .map_or_else(|| share.segment_id.to_string(), ToString::to_string);

        for &year in &years {
            let Some(segment_total) = totals.get(&(share.segment_id, year)).copied() else {
                continue;
            };
            let applied_share = interpolate_share(
                share_base,
                share_horizon,
                year,
                inputs.base_year,
                inputs.horizon_year,
            );
            rows.push(OccupationForecastRow {
                segment_id: share.segment_id,
                segment_name: segment_name.clone(),
                year,
                methodology: methodology.clone(),
                occcd: share.occcd.clone(),
                soctitle: share.soctitle.clone(),
                employment: segment_total * applied_share,
                share: applied_share,
                share_base,
                share_horizon,
                auto_share: Some(auto_share),
                auto_adjusted_share: Some(auto_adjusted_share),
                auto_adjusted_base_employment: Some(adjusted_base),
                shift_source: Some(shift_source),
                ep_entry_education: share.ep_entry_education.clone(),
                ep_work_experience: share.ep_work_experience.clone(),
                ep_on_the_job_training: share.ep_on_the_job_training.clone(),
                ep_edu_grouped: share.ep_edu_grouped,
            });
        }
    }

    let validation = validate_distribution(&rows, &totals, &years, &methodology, inputs.tolerance, quality);
    (rows, validation)
}

fn validate_distribution(
    rows: &[OccupationForecastRow],
    totals: &FxHashMap<(SegmentId, i32), f64>,
    years: &[i32],
    methodology: &str,
    tolerance: f64,
    quality: &mut QualityLog,
) -> Vec<ValidationRow> {
    let mut occupation_sums: BTreeMap<(SegmentId, i32), f64> = BTreeMap::new();
    for row in rows {
        *occupation_sums.entry((row.segment_id, row.year)).or_insert(0.0) += row.employment;
    }

    let mut validation = Vec::new();
    for ((segment_id, year), occupation_total) in occupation_sums {
        if !years.contains(&year) {
            continue;
        }
        let segment_total = totals.get(&(segment_id, year)).copied().unwrap_or(0.0);
        let pct_diff = if segment_total > 0.0 {
            Some((occupation_total - segment_total) / segment_total * 100.0)
        } else {
            None
        };
        if let Some(pct) = pct_diff {
            if pct.abs() / 100.0 > tolerance {
                quality.flag(
                    "occupation",
                    IssueKind::ValidationExceeded,
                    format!("segment {segment_id}/{year}/{methodology}"),
                    format!(
                        "occupation sum {occupation_total:.1} deviates {pct:.2}% from segment total {segment_total:.1}"
                    ),
                );
            }
        }
        validation.push(ValidationRow {
            segment_id,
            year,
            methodology: methodology.to_string(),
            occupation_total,
            segment_total,
            pct_diff,
        });
    }
    validation
}

/// Flag every pair the shift table does not cover.
///
/// Done once, not per branch; coverage does not depend on the methodology.
pub fn flag_missing_shift_coverage(
    shares: &[OccupationBaseShare],
    shifts: &ShiftTable,
    quality: &mut QualityLog,
) {
    let mut missing = 0usize;
    for share in shares {
        if !shifts.contains(share.segment_id, &share.occcd) {
            missing += 1;
            quality.flag_quiet(
                "occupation",
                IssueKind::NoShiftData,
                format!("segment {}/{}", share.segment_id, share.occcd),
                "no shift data; base-year share held constant",
            );
        }
    }
    if missing > 0 {
        log::warn!(
            "{missing} of {} segment-occupation pairs have no shift data; constant-share fallback applied",
            shares.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttributionSource, GrowthSource, Methodology};
    use crate::algorithm::growth::{SegmentSeriesPoint, ValueType};

    const BRANCH: Methodology =
        Methodology { attribution: AttributionSource::Bea, growth: GrowthSource::Moody };

    fn staffing_row(segment_id: SegmentId, occcd: &str, employment: f64) -> StaffingRecord {
        StaffingRecord {
            segment_id,
            occcd: occcd.to_string(),
            soctitle: format!("Occupation {occcd}"),
            year: 2024,
            employment: Some(employment),
            ep_entry_education: None,
            ep_work_experience: None,
            ep_on_the_job_training: None,
        }
    }

    fn branch(points: &[(SegmentId, i32, f64)]) -> SegmentBranch {
        SegmentBranch {
            methodology: BRANCH,
            points: points
                .iter()
                .map(|(segment_id, year, employment)| SegmentSeriesPoint {
                    segment_id: *segment_id,
                    segment_name: format!("{segment_id}. Segment"),
                    year: *year,
                    employment: *employment,
                    value_type: if *year <= 2024 { ValueType::Qcew } else { ValueType::Forecast },
                    applied_yoy_pct: None,
                })
                .collect(),
        }
    }

    #[test]
    fn interpolation_boundary_law_holds_exactly() {
        assert_eq!(interpolate_share(0.0175, 0.0150, 2024, 2024, 2034), 0.0175);
        assert_eq!(interpolate_share(0.0175, 0.0150, 2034, 2024, 2034), 0.0150);
        // Clamped outside the window, never extrapolated.
        assert_eq!(interpolate_share(0.0175, 0.0150, 2020, 2024, 2034), 0.0175);
        assert_eq!(interpolate_share(0.0175, 0.0150, 2040, 2024, 2034), 0.0150);
    }

    #[test]
    fn interpolation_midpoints_fall_between_monotonic_endpoints() {
        for year in 2025..2034 {
            let share = interpolate_share(0.0175, 0.0150, year, 2024, 2034);
            assert!(share < 0.0175 && share > 0.0150, "share {share} at {year}");
        }
        // Six years in: 0.0175 - 0.0025 * 0.6 = 0.0160.
        let share = interpolate_share(0.0175, 0.0150, 2030, 2024, 2034);
        assert!((share - 0.0160).abs() < 1e-12);
    }

    #[test]
    fn auto_adjusted_base_employment_matches_worked_example() {
        let adjusted = auto_adjusted_base_employment(72_030.0, 0.025, 0.45);
        assert!((adjusted - 810.3375).abs() < 1e-9);
    }

    #[test]
    fn base_shares_normalize_within_segment() {
        let rows = vec![
            staffing_row(7, "51-4041", 1_800.0),
            staffing_row(7, "51-2031", 5_400.0),
            staffing_row(9, "49-3023", 2_000.0),
        ];
        let shares = base_shares(&rows);
        let segment_sum: f64 = shares
            .iter()
            .filter(|share| share.segment_id == 7)
            .map(|share| share.base_share)
            .sum();
        assert!((segment_sum - 1.0).abs() < 1e-12);
        let machinist = shares.iter().find(|share| share.occcd == "51-4041").unwrap();
        assert!((machinist.base_share - 0.25).abs() < 1e-12);
    }

    #[test]
    fn shifted_pair_uses_interpolated_national_share() {
        // Machinists hold 2.5% of the segment's detailed staffing.
        let shares = base_shares(&[
            staffing_row(7, "51-4041", 1_800.0),
            staffing_row(7, "51-2031", 70_200.0),
        ]);
        let mut quality = QualityLog::new();
        let shifts = shift_table(&[("51-4041", 0.0175, 0.0150)]);
        let auto_shares = BTreeMap::from([(7, 0.45)]);
        let raw_base_totals: FxHashMap<SegmentId, f64> =
            [(7, 72_030.0)].into_iter().collect();
        let inputs = DistributionInputs {
            shares: &shares,
            auto_shares: &auto_shares,
            shifts: &shifts,
            raw_base_totals: &raw_base_totals,
            base_year: 2024,
            horizon_year: 2034,
            tolerance: 0.05,
        };
        let segment_branch = branch(&[(7, 2024, 68_000.0), (7, 2030, 65_000.0)]);
        let (rows, _) = distribute_branch(&segment_branch, &inputs, &mut quality);

        let row_2030 = rows
            .iter()
            .find(|row| row.occcd == "51-4041" && row.year == 2030)
            .unwrap();
        assert_eq!(row_2030.shift_source, Some(ShiftSource::NationalProjection));
        assert!((row_2030.share - 0.0160).abs() < 1e-12);
        assert!((row_2030.employment - 1_040.0).abs() < 1e-9);
        // 72,030 total, 2.5% base share, 0.45 auto share.
        assert!((row_2030.auto_adjusted_base_employment.unwrap() - 810.3375).abs() < 1e-9);
    }

    #[test]
    fn uncovered_pair_holds_base_share_and_is_tagged() {
        let shares = base_shares(&[
            staffing_row(7, "51-4041", 1_800.0),
            staffing_row(7, "51-2031", 5_400.0),
        ]);
        let shifts = ShiftTable::default();
        let auto_shares = BTreeMap::from([(7, 0.45)]);
        let raw_base_totals: FxHashMap<SegmentId, f64> =
            [(7, 72_030.0)].into_iter().collect();
        let inputs = DistributionInputs {
            shares: &shares,
            auto_shares: &auto_shares,
            shifts: &shifts,
            raw_base_totals: &raw_base_totals,
            base_year: 2024,
            horizon_year: 2034,
            tolerance: 0.05,
        };
        let segment_branch = branch(&[(7, 2024, 68_000.0), (7, 2028, 66_000.0)]);
        let mut quality = QualityLog::new();
        let (rows, validation) = distribute_branch(&segment_branch, &inputs, &mut quality);

        for row in &rows {
            assert_eq!(row.shift_source, Some(ShiftSource::ConstantShareFallback));
            assert!((row.share - row.share_base).abs() < 1e-12);
            let expected = row.share_base
                * segment_branch
                    .totals()
                    .get(&(row.segment_id, row.year))
                    .copied()
                    .unwrap();
            assert!((row.employment - expected).abs() < 1e-9);
        }
        // Shares sum to 1, so occupation sums reproduce the segment totals.
        for check in &validation {
            assert!(check.pct_diff.unwrap().abs() < 1e-9);
        }
        assert_eq!(quality.count_of(IssueKind::ValidationExceeded), 0);

        let mut coverage_quality = QualityLog::new();
        flag_missing_shift_coverage(&shares, &shifts, &mut coverage_quality);
        assert_eq!(coverage_quality.count_of(IssueKind::NoShiftData), 2);
    }

    #[test]
    fn deviating_occupation_sum_is_flagged_not_corrected() {
        // A single occupation holding only 25% of the segment makes the sum
        // fall far short of the segment total.
        let shares = base_shares(&[
            staffing_row(7, "51-4041", 1_000.0),
            staffing_row(7, "51-2031", 3_000.0),
        ]);
        let shifts = shift_table(&[("51-4041", 0.25, 0.25)]);
        // Drop the other occupation from the distribution entirely.
        let one_share: Vec<OccupationBaseShare> =
            shares.into_iter().filter(|share| share.occcd == "51-4041").collect();
        let auto_shares = BTreeMap::from([(7, 1.0)]);
        let raw_base_totals: FxHashMap<SegmentId, f64> = [(7, 4_000.0)].into_iter().collect();
        let inputs = DistributionInputs {
            shares: &one_share,
            auto_shares: &auto_shares,
            shifts: &shifts,
            raw_base_totals: &raw_base_totals,
            base_year: 2024,
            horizon_year: 2034,
            tolerance: 0.05,
        };
        let segment_branch = branch(&[(7, 2024, 4_000.0)]);
        let mut quality = QualityLog::new();
        let (rows, validation) = distribute_branch(&segment_branch, &inputs, &mut quality);

        assert_eq!(rows.len(), 1);
        assert_eq!(quality.count_of(IssueKind::ValidationExceeded), 1);
        // The forecast itself is left untouched.
        assert!((rows[0].employment - 1_000.0).abs() < 1e-9);
        assert!((validation[0].pct_diff.unwrap() + 75.0).abs() < 1e-9);
    }

    fn shift_table(entries: &[(&str, f64, f64)]) -> ShiftTable {
        use crate::models::{IndustryAssignment, ShiftRecord, Stage};
        use crate::registry::{SegmentLookup, shifts::aggregate_shifts};

        let lookup = SegmentLookup::from_rows(vec![IndustryAssignment {
            naics_code: "3361".to_string(),
            naics_title: String::new(),
            segment_id: 7,
            segment_name: "7. Core Automotive".to_string(),
            stage: Stage::Oem,
            base_employment: 72_030.0,
        }]);
        let rows: Vec<ShiftRecord> = entries
            .iter()
            .map(|(occ, base, horizon)| ShiftRecord {
                naics_code: "3361".to_string(),
                occupation_code: occ.to_string(),
                occupation_title: String::new(),
                share_base: *base,
                share_horizon: *horizon,
            })
            .collect();
        let mut quality = QualityLog::new();
        aggregate_shifts(&rows, &lookup, &mut quality)
    }
}
