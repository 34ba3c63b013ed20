//! Supply-chain segments and stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a supply-chain segment (1..=10; 0 is the all-segment rollup)
pub type SegmentId = u8;

/// Segment id used for the cross-segment rollup in forecast outputs
pub const ALL_SEGMENTS_ID: SegmentId = 0;

/// Display name of the cross-segment rollup
pub const ALL_SEGMENTS_LABEL: &str = "0. All Segments";

/// Canonical labels for the ten supply-chain segments
pub const SEGMENT_LABELS: [(SegmentId, &str); 10] = [
    (1, "1. Materials & Processing"),
    (2, "2. Equipment Manufacturing"),
    (3, "3. Forging & Foundries"),
    (4, "4. Parts & Machining"),
    (5, "5. Component Systems"),
    (6, "6. Engineering & Design"),
    (7, "7. Core Automotive"),
    (8, "8. Motor Vehicle Parts, Materials, & Products Sales"),
    (9, "9. Dealers, Maintenance, & Repair"),
    (10, "10. Logistics"),
];

/// Look up the canonical label for a segment id
#[must_use]
pub fn segment_label(id: SegmentId) -> Option<&'static str> {
    SEGMENT_LABELS
        .iter()
        .find(|(segment_id, _)| *segment_id == id)
        .map(|(_, label)| *label)
}

/// Normalize a segment name to its canonical `"<id>. <name>"` form.
///
/// Source tables sometimes carry trailing qualifiers (`"7. Core Automotive -
/// assembly"`) or omit the numeric prefix; both are repaired here.
#[must_use]
pub fn canonical_label(id: SegmentId, name: &str) -> String {
    let base = name.split(" - ").next().unwrap_or("").trim();
    let prefix = format!("{id}. ");
    if base.starts_with(&prefix) {
        return base.to_string();
    }
    if base.is_empty() {
        return id.to_string();
    }
    format!("{prefix}{base}")
}

/// Position of a segment in the supply chain
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Stage {
    /// Suppliers feeding vehicle production
    Upstream,
    /// Vehicle and core component manufacturers
    #[serde(rename = "OEM")]
    Oem,
    /// Sales, service, and distribution
    Downstream,
}

impl Stage {
    /// All stages in supply-chain order
    pub const ALL: [Self; 3] = [Self::Upstream, Self::Oem, Self::Downstream];

    /// Display name as used in the input tables
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upstream => "Upstream",
            Self::Oem => "OEM",
            Self::Downstream => "Downstream",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_labels_cover_all_ten_segments() {
        for id in 1..=10 {
            let label = segment_label(id).unwrap();
            assert!(label.starts_with(&format!("{id}.")));
        }
        assert!(segment_label(11).is_none());
    }

    #[test]
    fn canonical_label_repairs_variants() {
        assert_eq!(canonical_label(7, "7. Core Automotive"), "7. Core Automotive");
        assert_eq!(
            canonical_label(7, "7. Core Automotive - assembly"),
            "7. Core Automotive"
        );
        assert_eq!(canonical_label(3, "Forging & Foundries"), "3. Forging & Foundries");
        assert_eq!(canonical_label(4, ""), "4");
    }

    #[test]
    fn stage_order_follows_supply_chain() {
        assert!(Stage::Upstream < Stage::Oem);
        assert!(Stage::Oem < Stage::Downstream);
        assert_eq!(Stage::Oem.label(), "OEM");
    }
}
