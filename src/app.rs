//! Top-level application orchestration.
//!
//! `src/main.rs` sets up logging and exit codes; this module is the "real
//! main" that:
//! - parses CLI arguments
//! - assembles run parameters
//! - runs the selected mode pipeline
//! - logs results and warnings, prints summaries and previews

use clap::Parser;
use log::{debug, info, warn};

use crate::cli::{Command, ParamArgs};
use crate::config::Params;
use crate::domain::{ErrorbarConfig, EvalConfig, GradesConfig, HistConfig, PeriodsConfig, ResidualConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `labfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    dispatch(cli.command)
}

/// Run one subcommand.
pub fn dispatch(command: Command) -> Result<(), AppError> {
    match command {
        Command::Errorbar(args) => handle_errorbar(&params_from_args(&args)?),
        Command::Residual(args) => handle_residual(&params_from_args(&args)?),
        Command::Hist(args) => handle_hist(&params_from_args(&args)?),
        Command::Periods(args) => handle_periods(&params_from_args(&args)?),
        Command::Eval(args) => handle_eval(&params_from_args(&args)?),
        Command::Grades(args) => handle_grades(&params_from_args(&args)?),
    }
}

pub fn params_from_args(args: &ParamArgs) -> Result<Params, AppError> {
    let params = Params::load(&args.configs, &args.params)?;
    debug!("parameters: {params:?}");
    Ok(params)
}

fn handle_errorbar(params: &Params) -> Result<(), AppError> {
    let config = ErrorbarConfig::from_params(params)?;
    let run = pipeline::run_errorbar(&config)?;
    log_chart_run(&run);
    info!("plot saved to {}", config.graphic_path.display());
    if let Some(path) = &config.results_path {
        info!("fit results saved to {}", path.display());
    }
    Ok(())
}

fn handle_residual(params: &Params) -> Result<(), AppError> {
    let config = ResidualConfig::from_params(params)?;
    let run = pipeline::run_residual(&config)?;
    log_chart_run(&run);
    info!("residual plot saved to {}", config.graphic_path.display());
    Ok(())
}

fn handle_hist(params: &Params) -> Result<(), AppError> {
    let config = HistConfig::from_params(params)?;
    let run = pipeline::run_hist(&config)?;
    log_warnings(&run.warnings);

    let m = run.metrics;
    info!("{}: n={}", config.column, m.count);
    if let (Some(mean), Some(std), Some(sem)) = (m.mean, m.std, m.sem) {
        info!("mean = {mean}, std = {std}, sem = {sem}");
    }
    if let Some(preview) = &run.preview {
        println!("{preview}");
    }
    info!("histogram saved to {}", config.graphic_path.display());
    Ok(())
}

fn handle_periods(params: &Params) -> Result<(), AppError> {
    let config = PeriodsConfig::from_params(params)?;
    let run = pipeline::run_periods(&config)?;
    log_warnings(&run.warnings);
    println!("{}", crate::report::format_metrics_table(&run.evaluation));
    info!(
        "raw data saved to {}, evaluation saved to {}",
        config.raw_data_path.display(),
        config.evaluation_data_path.display()
    );
    Ok(())
}

fn handle_eval(params: &Params) -> Result<(), AppError> {
    let config = EvalConfig::from_params(params)?;
    info!("reading raw data from {}", config.raw_data_path.display());
    let run = pipeline::run_eval(&config)?;
    log_warnings(&run.warnings);
    println!("{}", crate::report::format_metrics_table(&run.evaluation));
    info!("evaluation saved to {}", config.evaluation_data_path.display());
    Ok(())
}

fn handle_grades(params: &Params) -> Result<(), AppError> {
    let config = GradesConfig::from_params(params)?;
    let summary = pipeline::run_grades(&config)?;
    println!("{}", crate::report::format_grade_summary(&summary));
    info!("final grade: {}", summary.final_grade);
    Ok(())
}

fn log_chart_run(run: &pipeline::ChartRun) {
    log_warnings(&run.warnings);
    for s in &run.series {
        debug!("selected {} model ({})", s.fit.model, s.spec.y_column);
        if s.fit.params.is_empty() {
            info!("fits are deactivated ({})", s.spec.y_column);
        } else {
            info!("{}", crate::report::format_fit(s.name(), &s.fit).trim_end());
        }
    }
    if let Some(preview) = &run.preview {
        println!("{preview}");
    }
}

fn log_warnings(warnings: &[String]) {
    for w in warnings {
        warn!("{w}");
    }
}
