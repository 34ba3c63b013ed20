//! End-to-end pipeline orchestration.
//!
//! A run is a single pass: load every register, aggregate, split by
//! attribution, extend the four methodology branches, distribute across
//! occupations, and write the output tables. Branches share no mutable
//! state, so they are computed in parallel; each carries its own quality
//! log, merged before reporting.

use std::path::PathBuf;
use std::time::Instant;

use itertools::Itertools;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::algorithm::growth::{SegmentBranch, StageBranch};
use crate::algorithm::occupation::{OccupationForecastRow, ValidationRow};
use crate::algorithm::{
    DistributionInputs, aggregate_employment, base_shares, distribute_branch,
    extend_segments, extend_stages, flag_missing_shift_coverage, split_attribution,
};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{AttributionSource, GrowthSource, Methodology, SegmentId};
use crate::quality::QualityLog;
use crate::reader;
use crate::registry::attribution::share_table;
use crate::registry::shifts::aggregate_shifts;
use crate::registry::staffing::detailed_base_year;
use crate::registry::{
    self, AttributionRegistry, GrowthTable, QcewRegistry, SegmentGrowthRegistry,
    SegmentLookup, SegmentRegistry, ShiftRegistry, StaffingRegistry, StageGrowthRegistry,
};
use crate::report::{self, ReportPaths};
use crate::utils::progress;

/// The forecast pipeline, configured for one run
pub struct Pipeline {
    config: PipelineConfig,
}

/// Counts and file locations from a completed run
#[derive(Debug)]
pub struct RunSummary {
    pub branches: usize,
    pub segments: usize,
    pub occupations: usize,
    pub forecast_rows: usize,
    pub quality_issues: usize,
    pub outputs: Vec<PathBuf>,
}

struct BranchResult {
    segment_branch: SegmentBranch,
    stage_branch: StageBranch,
    rows: Vec<OccupationForecastRow>,
    validation: Vec<ValidationRow>,
    quality: QualityLog,
}

const fn attribution_index(source: AttributionSource) -> usize {
    match source {
        AttributionSource::Bea => 0,
        AttributionSource::Lightcast => 1,
    }
}

const fn growth_index(source: GrowthSource) -> usize {
    match source {
        GrowthSource::Moody => 0,
        GrowthSource::Bls => 1,
    }
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline and write every output table.
    ///
    /// Outputs are regenerated wholesale; nothing is mutated in place, so a
    /// rerun over unchanged inputs reproduces the same files.
    pub fn run(&self) -> Result<RunSummary> {
        let cfg = &self.config;
        let start = Instant::now();
        log::info!("{cfg}");

        let mut quality = QualityLog::new();

        // Load every register up front; all inputs are pre-staged local files.
        let lookup = SegmentLookup::from_rows(registry::load_register(
            &SegmentRegistry,
            &cfg.segment_lookup,
        )?);
        let employment = registry::load_register(&QcewRegistry, &cfg.industry_employment)?;

        let mut attribution_tables = Vec::with_capacity(AttributionSource::ALL.len());
        for source in AttributionSource::ALL {
            let rows = registry::load_register(
                &AttributionRegistry::new(source),
                cfg.attribution_path(source),
            )?;
            attribution_tables.push(share_table(&rows));
        }

        let mut growth_tables = Vec::with_capacity(GrowthSource::ALL.len());
        for source in GrowthSource::ALL {
            let (segment_path, stage_path) = cfg.growth_paths(source);
            let segment_rows =
                registry::load_register(&SegmentGrowthRegistry::new(source), segment_path)?;
            let stage_rows =
                registry::load_register(&StageGrowthRegistry::new(source), stage_path)?;
            growth_tables.push(GrowthTable::new(&segment_rows, &stage_rows));
        }

        let staffing_rows = registry::load_register(&StaffingRegistry, &cfg.staffing)?;
        let shift_rows = registry::load_register(&ShiftRegistry, &cfg.occupation_shift)?;

        // Stage 1: segment and stage aggregation.
        let aggregation = aggregate_employment(&employment, &lookup, &mut quality)?;
        let raw_base_totals: FxHashMap<SegmentId, f64> =
            aggregation.segment_totals_for(cfg.base_year);
        log::info!(
            "Aggregated {} segment-year totals across {} assigned industries",
            aggregation.segments.len(),
            lookup.len()
        );

        // Stage 2: attribution split, one outcome per definition.
        let mut outcomes = Vec::with_capacity(AttributionSource::ALL.len());
        for source in AttributionSource::ALL {
            let outcome = split_attribution(
                &employment,
                &lookup,
                &attribution_tables[attribution_index(source)],
                source,
                cfg.base_year,
                &mut quality,
            )?;
            log::info!(
                "Computed {} base-year auto shares for {} segments",
                source,
                outcome.base_year_shares.len()
            );
            outcomes.push(outcome);
        }

        // Base-year occupational mix and shift coverage.
        let detailed = detailed_base_year(&staffing_rows, cfg.base_year);
        let shares = base_shares(&detailed);
        let occupations = shares.iter().map(|share| share.occcd.as_str()).unique().count();
        log::info!(
            "Normalized {} base shares over {occupations} detailed occupations",
            shares.len()
        );

        let shifts = aggregate_shifts(&shift_rows, &lookup, &mut quality);
        flag_missing_shift_coverage(&shares, &shifts, &mut quality);

        // Stages 3 and 4 per branch, in parallel; branches are independent.
        let pb = progress::create_main_progress_bar(
            Methodology::ALL.len() as u64,
            Some("computing methodology branches"),
        );
        let branch_results: Vec<BranchResult> = Methodology::ALL
            .par_iter()
            .map(|methodology| {
                let mut branch_quality = QualityLog::new();
                let outcome = &outcomes[attribution_index(methodology.attribution)];
                let growth_table = &growth_tables[growth_index(methodology.growth)];

                let segment_branch = extend_segments(
                    &outcome.segments,
                    growth_table,
                    *methodology,
                    cfg.horizon_year,
                    &mut branch_quality,
                );
                let stage_branch = extend_stages(
                    &outcome.stages,
                    growth_table,
                    *methodology,
                    cfg.horizon_year,
                    &mut branch_quality,
                );

                let inputs = DistributionInputs {
                    shares: &shares,
                    auto_shares: &outcome.base_year_shares,
                    shifts: &shifts,
                    raw_base_totals: &raw_base_totals,
                    base_year: cfg.base_year,
                    horizon_year: cfg.horizon_year,
                    tolerance: cfg.validation_tolerance,
                };
                let (rows, validation) =
                    distribute_branch(&segment_branch, &inputs, &mut branch_quality);

                pb.inc(1);
                BranchResult { segment_branch, stage_branch, rows, validation, quality: branch_quality }
            })
            .collect();
        progress::finish_progress_bar(&pb, Some("branches complete"));

        let mut segment_branches = Vec::with_capacity(branch_results.len());
        let mut stage_branches = Vec::with_capacity(branch_results.len());
        let mut forecast_rows = Vec::new();
        let mut validation_rows = Vec::new();
        for result in branch_results {
            quality.merge(result.quality);
            segment_branches.push(result.segment_branch);
            stage_branches.push(result.stage_branch);
            forecast_rows.extend(result.rows);
            validation_rows.extend(result.validation);
        }

        let forecast_rows = report::with_all_segment_rollup(forecast_rows);
        let snapshot_rows = report::snapshot(&forecast_rows, cfg.snapshot_year);
        let sensitivity = report::sensitivity_summary(&forecast_rows);
        let education = report::education_summary(&forecast_rows, cfg.snapshot_year);
        let diagnostics: Vec<_> =
            outcomes.into_iter().flat_map(|outcome| outcome.diagnostics).collect();

        // Write every output table.
        let paths =
            ReportPaths::new(&cfg.output_dir, cfg.base_year, cfg.horizon_year, cfg.snapshot_year);
        let mut outputs = Vec::new();

        let (segment_history, stage_history) = report::history_rows(&aggregation);
        reader::write_csv_rows(&paths.segment_history, "segment history", &segment_history)?;
        outputs.push(paths.segment_history.clone());
        reader::write_csv_rows(&paths.stage_history, "stage history", &stage_history)?;
        outputs.push(paths.stage_history.clone());

        reader::write_csv_rows(
            &paths.segment_series,
            "segment series",
            &report::segment_series_rows(&segment_branches),
        )?;
        outputs.push(paths.segment_series.clone());

        reader::write_csv_rows(
            &paths.stage_series,
            "stage series",
            &report::stage_series_rows(&stage_branches),
        )?;
        outputs.push(paths.stage_series.clone());

        reader::write_csv_rows(&paths.occupation_forecasts, "occupation forecasts", &forecast_rows)?;
        outputs.push(paths.occupation_forecasts.clone());

        reader::write_csv_rows(&paths.snapshot, "snapshot extract", &snapshot_rows)?;
        outputs.push(paths.snapshot.clone());

        reader::write_csv_rows(&paths.sensitivity, "sensitivity summary", &sensitivity)?;
        outputs.push(paths.sensitivity.clone());

        if education.is_empty() {
            log::info!("No education metadata in the staffing table; skipping education summary");
        } else {
            reader::write_csv_rows(&paths.education, "education summary", &education)?;
            outputs.push(paths.education.clone());
        }

        reader::write_csv_rows(&paths.validation, "forecast validation", &validation_rows)?;
        outputs.push(paths.validation.clone());

        reader::write_csv_rows(
            &paths.attribution_diagnostics,
            "attribution diagnostics",
            &diagnostics,
        )?;
        outputs.push(paths.attribution_diagnostics.clone());

        quality.write_csv(&paths.quality)?;
        if !quality.is_empty() {
            outputs.push(paths.quality.clone());
        }

        let summary = RunSummary {
            branches: Methodology::ALL.len(),
            segments: raw_base_totals.len(),
            occupations,
            forecast_rows: forecast_rows.len(),
            quality_issues: quality.len(),
            outputs,
        };
        log::info!(
            "Pipeline complete in {:?}: {} forecast rows across branches {}; {} quality issues",
            start.elapsed(),
            summary.forecast_rows,
            Methodology::ALL.iter().map(|methodology| methodology.label()).join(", "),
            summary.quality_issues
        );
        Ok(summary)
    }
}
