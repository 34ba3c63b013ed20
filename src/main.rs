use std::path::Path;
use std::process::ExitCode;

use log::{error, info};

use auto_workforce::{Pipeline, PipelineConfig};

fn main() -> ExitCode {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional arguments: a config file and a data root to rebase onto.
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(config_path) => match PipelineConfig::from_json_file(Path::new(&config_path)) {
            Ok(config) => config,
            Err(err) => {
                error!("Failed to load config {config_path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => PipelineConfig::default(),
    };
    let config = match args.next() {
        Some(root) => config.with_root(Path::new(&root)),
        None => config,
    };

    let pipeline = Pipeline::new(config);
    match pipeline.run() {
        Ok(summary) => {
            info!(
                "Wrote {} output tables ({} forecast rows, {} occupations, {} quality issues)",
                summary.outputs.len(),
                summary.forecast_rows,
                summary.occupations,
                summary.quality_issues
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Pipeline failed: {err}");
            ExitCode::FAILURE
        }
    }
}
