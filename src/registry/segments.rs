//! Industry-to-segment assignment lookup.

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::FxHashMap;

use super::RegisterLoader;
use crate::error::Result;
use crate::models::{IndustryAssignment, SegmentId, canonical_label, segment_label};
use crate::reader;

/// Loader for the segment-assignment lookup table
pub struct SegmentRegistry;

impl RegisterLoader for SegmentRegistry {
    type Row = IndustryAssignment;

    fn register_name(&self) -> &'static str {
        "segment lookup"
    }

    fn load(&self, path: &Path) -> Result<Vec<IndustryAssignment>> {
        reader::read_csv_rows(
            path,
            "segment lookup",
            &["naics_code", "segment_id", "segment_name", "stage", "base_employment"],
        )
    }
}

/// Industry-code keyed view of the segment assignments.
///
/// Duplicate codes keep their first row, matching how the source table is
/// deduplicated upstream.
#[derive(Debug, Clone)]
pub struct SegmentLookup {
    by_code: FxHashMap<String, IndustryAssignment>,
}

impl SegmentLookup {
    #[must_use]
    pub fn from_rows(rows: Vec<IndustryAssignment>) -> Self {
        let mut by_code = FxHashMap::default();
        for row in rows {
            by_code.entry(row.naics_code.clone()).or_insert(row);
        }
        Self { by_code }
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&IndustryAssignment> {
        self.by_code.get(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Canonical display name per segment id.
    ///
    /// The ten published segment labels take precedence; any other id falls
    /// back to a repaired form of the name carried in the lookup.
    #[must_use]
    pub fn segment_names(&self) -> BTreeMap<SegmentId, String> {
        let mut names = BTreeMap::new();
        for row in self.by_code.values() {
            names.entry(row.segment_id).or_insert_with(|| {
                segment_label(row.segment_id)
                    .map(str::to_string)
                    .unwrap_or_else(|| canonical_label(row.segment_id, &row.segment_name))
            });
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;

    fn assignment(code: &str, segment_id: SegmentId, name: &str, stage: Stage) -> IndustryAssignment {
        IndustryAssignment {
            naics_code: code.to_string(),
            naics_title: String::new(),
            segment_id,
            segment_name: name.to_string(),
            stage,
            base_employment: 1000.0,
        }
    }

    #[test]
    fn first_row_wins_on_duplicate_codes() {
        let lookup = SegmentLookup::from_rows(vec![
            assignment("3361", 7, "Core Automotive", Stage::Oem),
            assignment("3361", 4, "Parts & Machining", Stage::Upstream),
        ]);
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.get("3361").unwrap().segment_id, 7);
    }

    #[test]
    fn segment_names_prefer_published_labels() {
        let lookup = SegmentLookup::from_rows(vec![
            assignment("3361", 7, "Core Automotive - assembly", Stage::Oem),
            assignment("3315", 3, "Forging", Stage::Upstream),
        ]);
        let names = lookup.segment_names();
        assert_eq!(names[&7], "7. Core Automotive");
        assert_eq!(names[&3], "3. Forging & Foundries");
    }

    #[test]
    fn unpublished_segment_id_falls_back_to_repaired_lookup_name() {
        let lookup = SegmentLookup::from_rows(vec![assignment(
            "3359",
            12,
            "Aftermarket Batteries",
            Stage::Upstream,
        )]);
        assert_eq!(lookup.segment_names()[&12], "12. Aftermarket Batteries");
    }
}
