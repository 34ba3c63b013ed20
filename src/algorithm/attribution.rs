//! Attribution splitting: the automotive portion of each segment.
//!
//! Two independently maintained share tables estimate, per industry, the
//! fraction of employment attributable to automotive production. The split
//! happens at industry level (employment × share) and aggregates up, so a
//! segment's adjusted series is exactly the sum of its members' automotive
//! portions. The per-segment weighted-mean share is kept alongside: the
//! base-year value feeds the occupation distributor and is held fixed
//! across the forecast horizon, a deliberate simplifying assumption.
//!
//! An industry missing from a share table is excluded from both the
//! numerator and denominator of the weighted mean (it is unknown, not
//! non-automotive) and flagged once for audit.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use super::aggregate::{SegmentYearTotal, StageYearTotal};
use crate::error::{ForecastError, Result};
use crate::models::{AttributionSource, IndustryEmployment, SegmentId, Stage};
use crate::quality::{IssueKind, QualityLog};
use crate::registry::SegmentLookup;

/// Per segment × year attribution diagnostic row
#[derive(Debug, Clone, serde::Serialize)]
pub struct AttributionDiagnostic {
    pub attribution: &'static str,
    pub segment_id: SegmentId,
    pub segment_name: String,
    pub year: i32,
    /// Raw segment employment, all members
    pub employment_raw: f64,
    /// Employment of members covered by the share table
    pub employment_covered: f64,
    /// Automotive portion of the covered employment
    pub employment_adjusted: f64,
    /// Employment-weighted mean share over covered members
    pub weighted_share: Option<f64>,
}

/// Result of splitting one attribution definition
#[derive(Debug, Clone)]
pub struct AttributionOutcome {
    pub source: AttributionSource,
    /// Weighted-mean auto share per segment at the base year
    pub base_year_shares: BTreeMap<SegmentId, f64>,
    /// Attribution-adjusted historical segment series
    pub segments: Vec<SegmentYearTotal>,
    /// Attribution-adjusted historical stage series
    pub stages: Vec<StageYearTotal>,
    pub diagnostics: Vec<AttributionDiagnostic>,
}

impl AttributionOutcome {
    /// Base-year auto share for one segment
    #[must_use]
    pub fn base_share(&self, segment_id: SegmentId) -> Option<f64> {
        self.base_year_shares.get(&segment_id).copied()
    }
}

struct SegmentYearAccumulator {
    raw: f64,
    covered: f64,
    adjusted: f64,
}

/// Split industry employment into its automotive portion and aggregate to
/// segment and stage level.
pub fn split_attribution(
    records: &[IndustryEmployment],
    lookup: &SegmentLookup,
    shares: &FxHashMap<String, f64>,
    source: AttributionSource,
    base_year: i32,
    quality: &mut QualityLog,
) -> Result<AttributionOutcome> {
    let mut unmapped: Vec<String> = Vec::new();
    let mut uncovered: FxHashSet<&str> = FxHashSet::default();
    let mut segment_acc: BTreeMap<(SegmentId, i32), SegmentYearAccumulator> = BTreeMap::new();
    let mut stage_adjusted: BTreeMap<(Stage, i32), f64> = BTreeMap::new();

    for record in records {
        let Some(assignment) = lookup.get(&record.naics_code) else {
            if !unmapped.contains(&record.naics_code) {
                unmapped.push(record.naics_code.clone());
            }
            continue;
        };
        let employment = match record.employment {
            Some(value) if value.is_finite() => value,
            // Suppressions are already flagged by the aggregator.
            _ => 0.0,
        };
        let entry = segment_acc
            .entry((assignment.segment_id, record.year))
            .or_insert(SegmentYearAccumulator { raw: 0.0, covered: 0.0, adjusted: 0.0 });
        entry.raw += employment;

        match shares.get(&record.naics_code) {
            Some(share) => {
                entry.covered += employment;
                entry.adjusted += employment * share;
                *stage_adjusted.entry((assignment.stage, record.year)).or_insert(0.0) +=
                    employment * share;
            }
            None => {
                if uncovered.insert(record.naics_code.as_str()) {
                    quality.flag(
                        "attribution",
                        IssueKind::MissingAttributionShare,
                        format!("{} ({})", record.naics_code, source.label()),
                        "industry excluded from weighted auto share",
                    );
                }
            }
        }
    }

    if !unmapped.is_empty() {
        unmapped.sort();
        return Err(ForecastError::UnmappedIndustry { codes: unmapped });
    }

    let names = lookup.segment_names();
    let mut base_year_shares = BTreeMap::new();
    let mut segments = Vec::new();
    let mut diagnostics = Vec::new();

    for ((segment_id, year), acc) in &segment_acc {
        let segment_name = names
            .get(segment_id)
            .cloned()
            .unwrap_or_else(|| segment_id.to_string());
        let weighted_share =
            if acc.covered > 0.0 { Some(acc.adjusted / acc.covered) } else { None };
        if *year == base_year {
            base_year_shares.insert(*segment_id, weighted_share.unwrap_or(0.0));
        }
        segments.push(SegmentYearTotal {
            segment_id: *segment_id,
            segment_name: segment_name.clone(),
            year: *year,
            employment: acc.adjusted,
        });
        diagnostics.push(AttributionDiagnostic {
            attribution: source.label(),
            segment_id: *segment_id,
            segment_name,
            year: *year,
            employment_raw: acc.raw,
            employment_covered: acc.covered,
            employment_adjusted: acc.adjusted,
            weighted_share,
        });
    }

    for (segment_id, share) in &base_year_shares {
        if !(0.0..=1.0).contains(share) {
            log::warn!(
                "weighted auto share {share:.4} for segment {segment_id} outside [0, 1]; audit the {} table",
                source.label()
            );
        }
    }

    let stages = stage_adjusted
        .into_iter()
        .map(|((stage, year), employment)| StageYearTotal { stage, year, employment })
        .collect();

    Ok(AttributionOutcome { source, base_year_shares, segments, stages, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndustryAssignment;

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
                naics_code: "3363".to_string(),
                naics_title: String::new(),
                segment_id: 7,
                segment_name: "7. Core Automotive".to_string(),
                stage: Stage::Oem,
                base_employment: 20_000.0,
            },
        ])
    }

    fn obs(code: &str, year: i32, employment: f64) -> IndustryEmployment {
        IndustryEmployment { naics_code: code.to_string(), year, employment: Some(employment) }
    }

    fn shares(pairs: &[(&str, f64)]) -> FxHashMap<String, f64> {
        pairs.iter().map(|(code, share)| (code.to_string(), *share)).collect()
    }

    #[test]
    fn weighted_mean_uses_same_year_employment() {
        let records = vec![obs("3361", 2024, 60_000.0), obs("3363", 2024, 20_000.0)];
        let table = shares(&[("3361", 0.5), ("3363", 0.25)]);
        let mut quality = QualityLog::new();
        let outcome =
            split_attribution(&records, &lookup(), &table, AttributionSource::Bea, 2024, &mut quality)
                .unwrap();

        // (0.5*60k + 0.25*20k) / 80k
        assert!((outcome.base_share(7).unwrap() - 0.4375).abs() < 1e-12);
        let adjusted = &outcome.segments[0];
        assert!((adjusted.employment - 35_000.0).abs() < 1e-9);
        assert!(quality.is_empty());
    }

    #[test]
    fn uncovered_industry_is_excluded_not_zeroed() {
        let records = vec![obs("3361", 2024, 60_000.0), obs("3363", 2024, 20_000.0)];
        let table = shares(&[("3361", 0.5)]);
        let mut quality = QualityLog::new();
        let outcome =
            split_attribution(&records, &lookup(), &table, AttributionSource::Bea, 2024, &mut quality)
                .unwrap();

        // Weighted mean over the covered member only, not dragged down to 0.375.
        assert!((outcome.base_share(7).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(quality.count_of(IssueKind::MissingAttributionShare), 1);

        let diagnostic = &outcome.diagnostics[0];
        assert_eq!(diagnostic.employment_raw, 80_000.0);
        assert_eq!(diagnostic.employment_covered, 60_000.0);
        assert_eq!(diagnostic.employment_adjusted, 30_000.0);
    }

    #[test]
    fn shares_stay_within_unit_interval() {
        let records = vec![obs("3361", 2024, 60_000.0), obs("3363", 2024, 20_000.0)];
        let table = shares(&[("3361", 1.0), ("3363", 0.0)]);
        let mut quality = QualityLog::new();
        let outcome =
            split_attribution(&records, &lookup(), &table, AttributionSource::Lightcast, 2024, &mut quality)
                .unwrap();
        let share = outcome.base_share(7).unwrap();
        assert!((0.0..=1.0).contains(&share));
    }
}
