//! Configuration for a pipeline run.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ForecastError, Result};
use crate::models::{AttributionSource, GrowthSource};

/// Configuration for the forecast pipeline.
///
/// All input paths are resolved as given; use [`PipelineConfig::with_root`]
/// to rebase the default relative layout onto another directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Industry-to-segment assignment lookup
    pub segment_lookup: PathBuf,
    /// Historical industry employment series (long format)
    pub industry_employment: PathBuf,
    /// Attribution shares, input-output definition
    pub attribution_bea: PathBuf,
    /// Attribution shares, job-postings definition
    pub attribution_lightcast: PathBuf,
    /// Segment growth rates from the state macro forecast
    pub segment_growth_moody: PathBuf,
    /// Stage growth rates from the state macro forecast
    pub stage_growth_moody: PathBuf,
    /// Segment growth rates from the national industry projections
    pub segment_growth_bls: PathBuf,
    /// Stage growth rates from the national industry projections
    pub stage_growth_bls: PathBuf,
    /// Base-year detailed staffing table
    pub staffing: PathBuf,
    /// National occupational-shift table
    pub occupation_shift: PathBuf,
    /// Directory receiving all generated tables
    pub output_dir: PathBuf,
    /// First year of the forecast window (last historical year)
    pub base_year: i32,
    /// Last year of the forecast window
    pub horizon_year: i32,
    /// Year extracted as a standalone snapshot
    pub snapshot_year: i32,
    /// Relative tolerance for the occupation-sum validation check
    pub validation_tolerance: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segment_lookup: PathBuf::from("data/lookups/segment_assignments.csv"),
            industry_employment: PathBuf::from("data/interim/qcew_naics_employment.csv"),
            attribution_bea: PathBuf::from("data/raw/auto_attribution_bea.csv"),
            attribution_lightcast: PathBuf::from("data/raw/auto_attribution_lightcast.csv"),
            segment_growth_moody: PathBuf::from("data/interim/segment_growth_moody.csv"),
            stage_growth_moody: PathBuf::from("data/interim/stage_growth_moody.csv"),
            segment_growth_bls: PathBuf::from("data/interim/segment_growth_bls.csv"),
            stage_growth_bls: PathBuf::from("data/interim/stage_growth_bls.csv"),
            staffing: PathBuf::from("data/processed/staffing_detailed.csv"),
            occupation_shift: PathBuf::from("data/raw/occupation_shift.csv"),
            output_dir: PathBuf::from("data/processed"),
            base_year: 2024,
            horizon_year: 2034,
            snapshot_year: 2030,
            validation_tolerance: 0.05,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; absent fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ForecastError::Io {
            label: "pipeline config",
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Rebase every path in the configuration onto `root`
    #[must_use]
    pub fn with_root(mut self, root: &Path) -> Self {
        for path in [
            &mut self.segment_lookup,
            &mut self.industry_employment,
            &mut self.attribution_bea,
            &mut self.attribution_lightcast,
            &mut self.segment_growth_moody,
            &mut self.stage_growth_moody,
            &mut self.segment_growth_bls,
            &mut self.stage_growth_bls,
            &mut self.staffing,
            &mut self.occupation_shift,
            &mut self.output_dir,
        ] {
            let rebased = root.join(path.as_path());
            *path = rebased;
        }
        self
    }

    /// Path of the attribution table for one definition
    #[must_use]
    pub fn attribution_path(&self, source: AttributionSource) -> &Path {
        match source {
            AttributionSource::Bea => &self.attribution_bea,
            AttributionSource::Lightcast => &self.attribution_lightcast,
        }
    }

    /// Segment- and stage-level growth-rate paths for one source
    #[must_use]
    pub fn growth_paths(&self, source: GrowthSource) -> (&Path, &Path) {
        match source {
            GrowthSource::Moody => (&self.segment_growth_moody, &self.stage_growth_moody),
            GrowthSource::Bls => (&self.segment_growth_bls, &self.stage_growth_bls),
        }
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Configuration:")?;
        writeln!(f, "  Base Year: {}", self.base_year)?;
        writeln!(f, "  Horizon Year: {}", self.horizon_year)?;
        writeln!(f, "  Snapshot Year: {}", self.snapshot_year)?;
        writeln!(f, "  Validation Tolerance: {}", self.validation_tolerance)?;
        writeln!(f, "  Output Directory: {}", self.output_dir.display())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_root_rebases_every_path() {
        let config = PipelineConfig::default().with_root(Path::new("/srv/run"));
        assert!(config.segment_lookup.starts_with("/srv/run"));
        assert!(config.output_dir.starts_with("/srv/run"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"base_year": 2021, "horizon_year": 2031}"#).unwrap();
        assert_eq!(config.base_year, 2021);
        assert_eq!(config.horizon_year, 2031);
        assert_eq!(config.snapshot_year, 2030);
        assert_eq!(config.validation_tolerance, 0.05);
    }
}
