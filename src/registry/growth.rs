//! Year-over-year growth-rate tables.
//!
//! Each growth source provides one file at segment level and one at stage
//! level, covering the years after the base year. Rates are percent change
//! per year.

use std::path::Path;

use rustc_hash::FxHashMap;

use super::RegisterLoader;
use crate::error::Result;
use crate::models::{GrowthSource, SegmentGrowthRate, SegmentId, Stage, StageGrowthRate};
use crate::reader;

/// Loader for a segment-level growth-rate file
pub struct SegmentGrowthRegistry {
    source: GrowthSource,
}

impl SegmentGrowthRegistry {
    #[must_use]
    pub fn new(source: GrowthSource) -> Self {
        Self { source }
    }
}

impl RegisterLoader for SegmentGrowthRegistry {
    type Row = SegmentGrowthRate;

    fn register_name(&self) -> &'static str {
        match self.source {
            GrowthSource::Moody => "moody segment growth rates",
            GrowthSource::Bls => "bls segment growth rates",
        }
    }

    fn load(&self, path: &Path) -> Result<Vec<SegmentGrowthRate>> {
        reader::read_csv_rows(
            path,
            self.register_name(),
            &["segment_id", "year", "employment_yoy_pct"],
        )
    }
}

/// Loader for a stage-level growth-rate file
pub struct StageGrowthRegistry {
    source: GrowthSource,
}

impl StageGrowthRegistry {
    #[must_use]
    pub fn new(source: GrowthSource) -> Self {
        Self { source }
    }
}

impl RegisterLoader for StageGrowthRegistry {
    type Row = StageGrowthRate;

    fn register_name(&self) -> &'static str {
        match self.source {
            GrowthSource::Moody => "moody stage growth rates",
            GrowthSource::Bls => "bls stage growth rates",
        }
    }

    fn load(&self, path: &Path) -> Result<Vec<StageGrowthRate>> {
        reader::read_csv_rows(path, self.register_name(), &["stage", "year", "employment_yoy_pct"])
    }
}

/// Keyed growth-rate lookup for one source.
///
/// Duplicate keys keep their first rate; rows without a rate are treated as
/// missing coverage and left to the extender's fallback.
#[derive(Debug, Clone)]
pub struct GrowthTable {
    segment_rates: FxHashMap<(SegmentId, i32), f64>,
    stage_rates: FxHashMap<(Stage, i32), f64>,
}

impl GrowthTable {
    #[must_use]
    pub fn new(segment_rows: &[SegmentGrowthRate], stage_rows: &[StageGrowthRate]) -> Self {
        let mut segment_rates = FxHashMap::default();
        for row in segment_rows {
            if let Some(pct) = row.employment_yoy_pct {
                segment_rates.entry((row.segment_id, row.year)).or_insert(pct);
            }
        }
        let mut stage_rates = FxHashMap::default();
        for row in stage_rows {
            if let Some(pct) = row.employment_yoy_pct {
                stage_rates.entry((row.stage, row.year)).or_insert(pct);
            }
        }
        Self { segment_rates, stage_rates }
    }

    /// Percent growth for a segment in a year, if covered
    #[must_use]
    pub fn segment_rate(&self, segment_id: SegmentId, year: i32) -> Option<f64> {
        self.segment_rates.get(&(segment_id, year)).copied()
    }

    /// Percent growth for a stage in a year, if covered
    #[must_use]
    pub fn stage_rate(&self, stage: Stage, year: i32) -> Option<f64> {
        self.stage_rates.get(&(stage, year)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_rate_wins_and_blank_rates_are_missing() {
        let rows = vec![
            SegmentGrowthRate {
                segment_id: 7,
                segment_name: String::new(),
                year: 2025,
                employment_yoy_pct: Some(1.5),
            },
            SegmentGrowthRate {
                segment_id: 7,
                segment_name: String::new(),
                year: 2025,
                employment_yoy_pct: Some(9.9),
            },
            SegmentGrowthRate {
                segment_id: 7,
                segment_name: String::new(),
                year: 2026,
                employment_yoy_pct: None,
            },
        ];
        let table = GrowthTable::new(&rows, &[]);
        assert_eq!(table.segment_rate(7, 2025), Some(1.5));
        assert_eq!(table.segment_rate(7, 2026), None);
        assert_eq!(table.stage_rate(Stage::Oem, 2025), None);
    }
}
