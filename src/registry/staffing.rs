//! Base-year occupational staffing survey.

use std::path::Path;

use super::RegisterLoader;
use crate::error::Result;
use crate::models::{OccLevel, StaffingRecord, classify_occ_level, is_grand_total};
use crate::reader;

/// Loader for the detailed staffing table
pub struct StaffingRegistry;

impl RegisterLoader for StaffingRegistry {
    type Row = StaffingRecord;

    fn register_name(&self) -> &'static str {
        "staffing survey"
    }

    fn load(&self, path: &Path) -> Result<Vec<StaffingRecord>> {
        reader::read_csv_rows(
            path,
            "staffing survey",
            &["segment_id", "occcd", "year", "employment"],
        )
    }
}

/// Restrict the survey to leaf-level rows for the base year.
///
/// Each row's hierarchy level is derived from its SOC code. Rollup rows
/// (grand total, major and broad groups) must not enter share sums;
/// keeping them would double-count every segment.
#[must_use]
pub fn detailed_base_year(rows: &[StaffingRecord], base_year: i32) -> Vec<StaffingRecord> {
    rows.iter()
        .filter(|row| {
            row.year == base_year
                && classify_occ_level(&row.occcd) == OccLevel::Detailed
                && !is_grand_total(&row.occcd)
                && row.employment.is_some_and(|employment| employment.is_finite() && employment >= 0.0)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(occcd: &str, year: i32, employment: Option<f64>) -> StaffingRecord {
        StaffingRecord {
            segment_id: 7,
            occcd: occcd.to_string(),
            soctitle: String::new(),
            year,
            employment,
            ep_entry_education: None,
            ep_work_experience: None,
            ep_on_the_job_training: None,
        }
    }

    #[test]
    fn keeps_only_detailed_base_year_rows() {
        let rows = vec![
            record("00-0000", 2024, Some(50_000.0)),
            record("51-0000", 2024, Some(30_000.0)),
            record("51-4000", 2024, Some(12_000.0)),
            record("51-4041", 2024, Some(5_000.0)),
            record("51-4041", 2021, Some(4_200.0)),
            record("51-2031", 2024, None),
            record("misc", 2024, Some(100.0)),
        ];
        let filtered = detailed_base_year(&rows, 2024);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].occcd, "51-4041");
    }
}
