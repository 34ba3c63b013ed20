//! Methodology branches: attribution definition × growth-rate source.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which auto-attribution definition a branch uses
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AttributionSource {
    /// Input-output based attribution shares
    Bea,
    /// Job-postings based attribution shares
    Lightcast,
}

impl AttributionSource {
    /// Both attribution definitions
    pub const ALL: [Self; 2] = [Self::Bea, Self::Lightcast];

    /// Lowercase label used in output tables and file names
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bea => "bea",
            Self::Lightcast => "lightcast",
        }
    }
}

impl fmt::Display for AttributionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which growth-rate source extends a branch past the base year
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GrowthSource {
    /// State-level macro forecast
    Moody,
    /// National industry employment projections
    Bls,
}

impl GrowthSource {
    /// Both growth sources
    pub const ALL: [Self; 2] = [Self::Moody, Self::Bls];

    /// Lowercase label used in output tables and file names
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Moody => "moody",
            Self::Bls => "bls",
        }
    }
}

impl fmt::Display for GrowthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the four forecast branches carried side by side.
///
/// Branches are never averaged by the pipeline; sensitivity across them is a
/// reporting concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Methodology {
    pub attribution: AttributionSource,
    pub growth: GrowthSource,
}

impl Methodology {
    /// The four branches, in stable output order
    pub const ALL: [Self; 4] = [
        Self { attribution: AttributionSource::Bea, growth: GrowthSource::Moody },
        Self { attribution: AttributionSource::Bea, growth: GrowthSource::Bls },
        Self { attribution: AttributionSource::Lightcast, growth: GrowthSource::Moody },
        Self { attribution: AttributionSource::Lightcast, growth: GrowthSource::Bls },
    ];

    /// Combined label, e.g. `bea_moody`
    #[must_use]
    pub fn label(self) -> String {
        format!("{}_{}", self.attribution.label(), self.growth.label())
    }
}

impl fmt::Display for Methodology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.attribution.label(), self.growth.label())
    }
}

/// Provenance of the occupational share used for a forecast row
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ShiftSource {
    /// Share interpolated from the national occupational-shift table
    NationalProjection,
    /// No shift data for the pair; base-year share held constant
    ConstantShareFallback,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_branches_with_distinct_labels() {
        let labels: Vec<String> = Methodology::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(
            labels,
            vec!["bea_moody", "bea_bls", "lightcast_moody", "lightcast_bls"]
        );
    }
}
