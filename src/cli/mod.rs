//! Command-line parsing for the lab toolkit.
//!
//! Every subcommand takes the same two options: JSON config files and
//! `key=value` bindings. The mode-specific options live in those, not in
//! clap flags, so one config file can drive a whole lab report.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "labfit", version, about = "Physics lab toolkit: model fits, plots, period timing, grades")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Errorbar plot of one or more y-series with optional model fits.
    Errorbar(ParamArgs),
    /// Residual plot of one series against its fitted model.
    Residual(ParamArgs),
    /// Histogram of one column with a Gaussian overlay.
    Hist(ParamArgs),
    /// Period countings from stopwatch lap times, plus their evaluation.
    Periods(ParamArgs),
    /// Evaluate an existing raw period table.
    Eval(ParamArgs),
    /// Credit-weighted average grade from a module table.
    Grades(ParamArgs),
}

/// Parameter sources shared by all subcommands.
#[derive(Debug, Args, Clone, Default)]
pub struct ParamArgs {
    /// JSON config file (object of option name -> value). Repeatable; later files win.
    #[arg(short = 'c', long = "config", value_name = "JSON")]
    pub configs: Vec<PathBuf>,

    /// Single binding `key=value`, applied after config files. Repeatable.
    /// The value is read as JSON when it parses, otherwise as a string.
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}
