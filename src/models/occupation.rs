//! SOC occupation codes: hierarchy level classification and education
//! grouping.
//!
//! Staffing tables mix rollup rows (grand total, major groups, broad
//! groups) with leaf-level detailed occupations. Only detailed rows may
//! enter share sums; anything coarser double-counts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Level of a SOC occupation code in the rollup hierarchy, derived from
/// the code's pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccLevel {
    /// Major group, e.g. `51-0000`
    Major,
    /// Broad group, e.g. `51-4000`
    Broad,
    /// Leaf-level occupation, e.g. `51-4041`
    Detailed,
    /// Code does not match any known SOC form
    Unknown,
}

struct SocParts<'a> {
    detail: &'a str,
    suffixed: bool,
}

/// Split a code into its major (2-digit) and detail (4-digit) parts.
///
/// Accepts `dd-dddd` and `dddddd`, with an optional `.dd` suffix on the
/// dashed form only.
fn soc_parts(code: &str) -> Option<SocParts<'_>> {
    let (base, suffixed) = match code.split_once('.') {
        Some((head, tail)) => {
            if tail.len() != 2 || !tail.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            (head, true)
        }
        None => (code, false),
    };
    let (major, detail) = match base.split_once('-') {
        Some((major, detail)) => (major, detail),
        None => {
            if suffixed || base.len() != 6 {
                return None;
            }
            base.split_at(2)
        }
    };
    if major.len() == 2
        && detail.len() == 4
        && major.bytes().all(|b| b.is_ascii_digit())
        && detail.bytes().all(|b| b.is_ascii_digit())
    {
        Some(SocParts { detail, suffixed })
    } else {
        None
    }
}

/// Classify a SOC code into its hierarchy level
#[must_use]
pub fn classify_occ_level(code: &str) -> OccLevel {
    let code = code.trim();
    let Some(parts) = soc_parts(code) else {
        return OccLevel::Unknown;
    };
    if parts.detail == "0000" && !parts.suffixed {
        OccLevel::Major
    } else if parts.detail.ends_with("00") {
        OccLevel::Broad
    } else {
        OccLevel::Detailed
    }
}

/// True for the `00-0000` grand-total row
#[must_use]
pub fn is_grand_total(code: &str) -> bool {
    let digits: String = code.chars().filter(char::is_ascii_digit).collect();
    digits == "000000"
}

/// Grouped entry-education requirement
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EducationGroup {
    #[serde(rename = "HS or less")]
    HsOrLess,
    #[serde(rename = "SC or associate's")]
    SomeCollegeOrAssociate,
    #[serde(rename = "BA+")]
    BaPlus,
}

impl EducationGroup {
    /// Display label used in summary tables
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HsOrLess => "HS or less",
            Self::SomeCollegeOrAssociate => "SC or associate's",
            Self::BaPlus => "BA+",
        }
    }
}

impl fmt::Display for EducationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a BLS typical-entry-education string to its grouped bucket
#[must_use]
pub fn group_education(entry_education: &str) -> Option<EducationGroup> {
    match entry_education.trim() {
        "No formal educational credential" | "High school diploma or equivalent" => {
            Some(EducationGroup::HsOrLess)
        }
        "Postsecondary nondegree award"
        | "Associate's degree"
        | "Some college, no degree" => Some(EducationGroup::SomeCollegeOrAssociate),
        "Bachelor's degree" | "Master's degree" | "Doctoral or professional degree" => {
            Some(EducationGroup::BaPlus)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_dashed_codes() {
        assert_eq!(classify_occ_level("51-0000"), OccLevel::Major);
        assert_eq!(classify_occ_level("51-4000"), OccLevel::Broad);
        assert_eq!(classify_occ_level("51-4041"), OccLevel::Detailed);
        assert_eq!(classify_occ_level("51-4041.02"), OccLevel::Detailed);
        assert_eq!(classify_occ_level("51-4000.00"), OccLevel::Broad);
    }

    #[test]
    fn classifies_undashed_codes() {
        assert_eq!(classify_occ_level("510000"), OccLevel::Major);
        assert_eq!(classify_occ_level("514000"), OccLevel::Broad);
        assert_eq!(classify_occ_level("514041"), OccLevel::Detailed);
    }

    #[test]
    fn rejects_malformed_codes() {
        assert_eq!(classify_occ_level(""), OccLevel::Unknown);
        assert_eq!(classify_occ_level("abc"), OccLevel::Unknown);
        assert_eq!(classify_occ_level("51-40"), OccLevel::Unknown);
        assert_eq!(classify_occ_level("51-40411"), OccLevel::Unknown);
        assert_eq!(classify_occ_level("514041.02"), OccLevel::Unknown);
    }

    #[test]
    fn grand_total_detection() {
        assert!(is_grand_total("00-0000"));
        assert!(is_grand_total("000000"));
        assert!(!is_grand_total("51-0000"));
    }

    #[test]
    fn education_grouping_matches_published_buckets() {
        assert_eq!(
            group_education("High school diploma or equivalent"),
            Some(EducationGroup::HsOrLess)
        );
        assert_eq!(
            group_education("Associate's degree"),
            Some(EducationGroup::SomeCollegeOrAssociate)
        );
        assert_eq!(group_education("Master's degree"), Some(EducationGroup::BaPlus));
        assert_eq!(group_education("Apprenticeship"), None);
    }
}
