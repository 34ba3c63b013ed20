//! Historical industry employment series (QCEW, long format).

use std::path::Path;

use super::RegisterLoader;
use crate::error::Result;
use crate::models::IndustryEmployment;
use crate::reader;

/// Loader for the industry employment time series.
///
/// Rows with a blank employment field are kept: a blank means the value was
/// suppressed at the source, and the aggregator flags it for audit.
pub struct QcewRegistry;

impl RegisterLoader for QcewRegistry {
    type Row = IndustryEmployment;

    fn register_name(&self) -> &'static str {
        "industry employment"
    }

    fn load(&self, path: &Path) -> Result<Vec<IndustryEmployment>> {
        reader::read_csv_rows(path, "industry employment", &["naics_code", "year", "employment"])
    }
}
