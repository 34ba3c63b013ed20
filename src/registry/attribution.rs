//! Auto-attribution share tables.
//!
//! The two attribution files are independently sourced and arrive with
//! inconsistent formatting: shares as fractions or percents (sometimes with
//! a literal `%`), codes with stray suffixes, and occasional duplicates.
//! Loading normalizes all of that: codes reduce to their leading 4 digits,
//! shares to a clamped fraction, duplicates to their mean.

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use super::RegisterLoader;
use crate::error::{ForecastError, Result};
use crate::models::{AttributionShare, AttributionSource};
use crate::reader;

#[derive(Debug, Deserialize)]
struct RawAttributionRow {
    naics_code: String,
    auto_share: String,
}

/// Loader for one attribution-share table
pub struct AttributionRegistry {
    source: AttributionSource,
}

impl AttributionRegistry {
    #[must_use]
    pub fn new(source: AttributionSource) -> Self {
        Self { source }
    }
}

impl RegisterLoader for AttributionRegistry {
    type Row = AttributionShare;

    fn register_name(&self) -> &'static str {
        match self.source {
            AttributionSource::Bea => "bea attribution shares",
            AttributionSource::Lightcast => "lightcast attribution shares",
        }
    }

    fn load(&self, path: &Path) -> Result<Vec<AttributionShare>> {
        let label = self.register_name();
        let raw: Vec<RawAttributionRow> =
            reader::read_csv_rows(path, label, &["naics_code", "auto_share"])?;

        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in &raw {
            let Some(code) = normalize_naics(&row.naics_code) else {
                log::debug!("{label}: skipping row with unusable code {:?}", row.naics_code);
                continue;
            };
            let Some(share) = parse_share(&row.auto_share) else {
                log::debug!("{label}: skipping row with unusable share {:?}", row.auto_share);
                continue;
            };
            grouped.entry(code).or_default().push(share);
        }

        if grouped.is_empty() {
            return Err(ForecastError::EmptyTable { label, path: path.to_path_buf() });
        }

        Ok(grouped
            .into_iter()
            .map(|(naics_code, shares)| {
                let mean = shares.iter().sum::<f64>() / shares.len() as f64;
                AttributionShare { naics_code, auto_share: mean }
            })
            .collect())
    }
}

/// Build a code-keyed share map for the splitter
#[must_use]
pub fn share_table(rows: &[AttributionShare]) -> FxHashMap<String, f64> {
    rows.iter()
        .map(|row| (row.naics_code.clone(), row.auto_share))
        .collect()
}

/// Reduce a raw code to its leading 4 digits; needs a run of at least 4
fn normalize_naics(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if bytes[start].is_ascii_digit() {
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end - start >= 4 {
                return Some(raw[start..start + 4].to_string());
            }
            start = end;
        } else {
            start += 1;
        }
    }
    None
}

/// Parse a share as a fraction in [0, 1]; percent inputs are rescaled
fn parse_share(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_end_matches('%').trim();
    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let fraction = if value > 1.0 { value / 100.0 } else { value };
    Some(fraction.clamp(0.0, 1.0))
}
