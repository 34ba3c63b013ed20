//! National occupational-shift projections.
//!
//! The source table is industry-level: for each industry × occupation it
//! gives the occupation's share of industry employment at the base and
//! horizon years. The distributor needs segment-level shares, so member
//! industries are combined with base-year employment weights from the
//! segment lookup. An industry absent for an occupation contributes zero
//! share for it, which keeps each segment's shares summing to roughly one.

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use super::{RegisterLoader, SegmentLookup};
use crate::error::Result;
use crate::models::{SegmentId, ShiftRecord};
use crate::quality::{IssueKind, QualityLog};
use crate::reader;

/// Loader for the occupational-shift table
pub struct ShiftRegistry;

impl RegisterLoader for ShiftRegistry {
    type Row = ShiftRecord;

    fn register_name(&self) -> &'static str {
        "occupational shift"
    }

    fn load(&self, path: &Path) -> Result<Vec<ShiftRecord>> {
        reader::read_csv_rows(
            path,
            "occupational shift",
            &["naics_code", "occupation_code", "share_base", "share_horizon"],
        )
    }
}

/// Segment-level shift endpoints for one occupation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftShares {
    pub share_base: f64,
    pub share_horizon: f64,
}

/// Employment-weighted, segment-level view of the shift table
#[derive(Debug, Clone, Default)]
pub struct ShiftTable {
    by_key: FxHashMap<(SegmentId, String), ShiftShares>,
}

impl ShiftTable {
    /// Shift endpoints for a segment × occupation pair, if covered
    #[must_use]
    pub fn get(&self, segment_id: SegmentId, occcd: &str) -> Option<&ShiftShares> {
        self.by_key.get(&(segment_id, occcd.to_string()))
    }

    #[must_use]
    pub fn contains(&self, segment_id: SegmentId, occcd: &str) -> bool {
        self.get(segment_id, occcd).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Aggregate industry-level shift rows to segment level.
///
/// Weights are the lookup's base-year employment. The denominator for a
/// segment covers every member industry that reports any occupation, so an
/// occupation missing from one member is diluted rather than dropped.
/// Industry codes without a segment assignment are flagged and skipped.
#[must_use]
pub fn aggregate_shifts(
    rows: &[ShiftRecord],
    lookup: &SegmentLookup,
    quality: &mut QualityLog,
) -> ShiftTable {
    let mut flagged: FxHashSet<&str> = FxHashSet::default();
    // Industries contributing to each segment's denominator.
    let mut covered: BTreeMap<SegmentId, FxHashSet<&str>> = BTreeMap::new();
    let mut weighted: BTreeMap<(SegmentId, &str), (f64, f64)> = BTreeMap::new();

    for row in rows {
        let Some(assignment) = lookup.get(&row.naics_code) else {
            if flagged.insert(row.naics_code.as_str()) {
                quality.flag(
                    "shifts",
                    IssueKind::UnmappedIndustry,
                    row.naics_code.clone(),
                    "shift row for industry without segment assignment; skipped",
                );
            }
            continue;
        };
        let weight = assignment.base_employment;
        if !(weight.is_finite() && weight > 0.0) {
            continue;
        }
        covered
            .entry(assignment.segment_id)
            .or_default()
            .insert(row.naics_code.as_str());
        let entry = weighted
            .entry((assignment.segment_id, row.occupation_code.as_str()))
            .or_insert((0.0, 0.0));
        entry.0 += row.share_base * weight;
        entry.1 += row.share_horizon * weight;
    }

    let denominators: BTreeMap<SegmentId, f64> = covered
        .into_iter()
        .map(|(segment_id, codes)| {
            let total = codes
                .iter()
                .filter_map(|code| lookup.get(code))
                .map(|assignment| assignment.base_employment)
                .sum::<f64>();
            (segment_id, total)
        })
        .collect();

    let mut by_key = FxHashMap::default();
    for ((segment_id, occcd), (base_sum, horizon_sum)) in weighted {
        let Some(denominator) = denominators.get(&segment_id) else {
            continue;
        };
        if *denominator <= 0.0 {
            continue;
        }
        by_key.insert(
            (segment_id, occcd.to_string()),
            ShiftShares {
                share_base: base_sum / denominator,
                share_horizon: horizon_sum / denominator,
            },
        );
    }

    ShiftTable { by_key }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndustryAssignment, Stage};

    fn lookup() -> SegmentLookup {
        SegmentLookup::from_rows(vec![
            IndustryAssignment {
                naics_code: "3361".to_string(),
                naics_title: String::new(),
                segment_id: 7,
                segment_name: "7. Core Automotive".to_string(),
                stage: Stage::Oem,
                base_employment: 60_000.0,
            },
            IndustryAssignment {
                naics_code: "3362".to_string(),
                naics_title: String::new(),
                segment_id: 7,
                segment_name: "7. Core Automotive".to_string(),
                stage: Stage::Oem,
                base_employment: 20_000.0,
            },
        ])
    }

    fn shift(code: &str, occ: &str, base: f64, horizon: f64) -> ShiftRecord {
        ShiftRecord {
            naics_code: code.to_string(),
            occupation_code: occ.to_string(),
            occupation_title: String::new(),
            share_base: base,
            share_horizon: horizon,
        }
    }

    #[test]
    fn weights_member_industries_by_base_employment() {
        let rows = vec![
            shift("3361", "51-4041", 0.02, 0.018),
            shift("3362", "51-4041", 0.04, 0.046),
        ];
        let mut quality = QualityLog::new();
        let table = aggregate_shifts(&rows, &lookup(), &mut quality);

        let shares = table.get(7, "51-4041").unwrap();
        // (0.02*60k + 0.04*20k) / 80k
        assert!((shares.share_base - 0.025).abs() < 1e-12);
        assert!((shares.share_horizon - (0.018 * 0.75 + 0.046 * 0.25)).abs() < 1e-12);
        assert!(quality.is_empty());
    }

    #[test]
    fn occupation_missing_from_one_member_is_diluted() {
        let rows = vec![
            shift("3361", "17-2141", 0.01, 0.012),
            shift("3362", "51-4041", 0.04, 0.04),
        ];
        let mut quality = QualityLog::new();
        let table = aggregate_shifts(&rows, &lookup(), &mut quality);

        let shares = table.get(7, "17-2141").unwrap();
        // Only 3361 reports the occupation, but both members are in the denominator.
        assert!((shares.share_base - (0.01 * 60_000.0 / 80_000.0)).abs() < 1e-12);
    }

    #[test]
    fn unmapped_industry_is_flagged_once_and_skipped() {
        let rows = vec![
            shift("9999", "51-4041", 0.5, 0.5),
            shift("9999", "17-2141", 0.5, 0.5),
        ];
        let mut quality = QualityLog::new();
        let table = aggregate_shifts(&rows, &lookup(), &mut quality);

        assert!(table.is_empty());
        assert_eq!(quality.count_of(IssueKind::UnmappedIndustry), 1);
    }
}
