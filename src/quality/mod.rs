//! Data-quality reporting.
//!
//! Recoverable data conditions are flagged here instead of failing the run:
//! suppressed source values, codes without attribution or growth coverage,
//! occupation pairs without shift data, and validation-tolerance breaches.
//! The log is written out with the other tables so every fallback taken
//! during a run is auditable.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::reader;

/// Kind of flagged data condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Employment value suppressed at the source; treated as zero
    SuppressedValue,
    /// Industry code observed in data but absent from a lookup table
    UnmappedIndustry,
    /// Industry code with no attribution share; excluded from the weighted mean
    MissingAttributionShare,
    /// Segment or stage without a growth rate for a horizon year; zero growth applied
    MissingGrowthRate,
    /// Occupation pair without shift data; base-year share held constant
    NoShiftData,
    /// Occupation sum deviates from the segment total beyond tolerance
    ValidationExceeded,
}

impl IssueKind {
    /// Short name used in log lines
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuppressedValue => "suppressed value",
            Self::UnmappedIndustry => "unmapped industry",
            Self::MissingAttributionShare => "missing attribution share",
            Self::MissingGrowthRate => "missing growth rate",
            Self::NoShiftData => "no shift data",
            Self::ValidationExceeded => "validation exceeded",
        }
    }
}

/// One flagged condition
#[derive(Debug, Clone, Serialize)]
pub struct QualityIssue {
    /// Pipeline stage that raised the flag
    pub stage: &'static str,
    pub kind: IssueKind,
    /// The affected key (code, segment/year, pair)
    pub key: String,
    pub detail: String,
}

/// Accumulator for flagged conditions during a run.
///
/// Branches running in parallel each build their own log; logs are merged
/// before reporting.
#[derive(Debug, Default)]
pub struct QualityLog {
    issues: Vec<QualityIssue>,
}

impl QualityLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue and surface it on the warn log
    pub fn flag(
        &mut self,
        stage: &'static str,
        kind: IssueKind,
        key: impl Into<String>,
        detail: impl Into<String>,
    ) {
        let issue = QualityIssue { stage, kind, key: key.into(), detail: detail.into() };
        log::warn!("[{}] {}: {} ({})", issue.stage, kind.as_str(), issue.key, issue.detail);
        self.issues.push(issue);
    }

    /// Record a high-volume issue on the debug log only.
    ///
    /// Callers are expected to emit one summary warning per kind.
    pub fn flag_quiet(
        &mut self,
        stage: &'static str,
        kind: IssueKind,
        key: impl Into<String>,
        detail: impl Into<String>,
    ) {
        let issue = QualityIssue { stage, kind, key: key.into(), detail: detail.into() };
        log::debug!("[{}] {}: {} ({})", issue.stage, kind.as_str(), issue.key, issue.detail);
        self.issues.push(issue);
    }

    /// Absorb another log, preserving its order
    pub fn merge(&mut self, other: Self) {
        self.issues.extend(other.issues);
    }

    #[must_use]
    pub fn issues(&self) -> &[QualityIssue] {
        &self.issues
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of issues of one kind
    #[must_use]
    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|issue| issue.kind == kind).count()
    }

    /// Write the full log as a table; no file is produced for a clean run
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if self.issues.is_empty() {
            return Ok(());
        }
        reader::write_csv_rows(path, "data quality report", &self.issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_preserves_counts_by_kind() {
        let mut log = QualityLog::new();
        log.flag_quiet("aggregate", IssueKind::SuppressedValue, "3361/2020", "suppressed");

        let mut other = QualityLog::new();
        other.flag_quiet("growth", IssueKind::MissingGrowthRate, "segment 4/2033", "zero growth");
        other.flag_quiet("growth", IssueKind::MissingGrowthRate, "segment 4/2034", "zero growth");

        log.merge(other);
        assert_eq!(log.len(), 3);
        assert_eq!(log.count_of(IssueKind::MissingGrowthRate), 2);
        assert_eq!(log.count_of(IssueKind::ValidationExceeded), 0);
    }
}
