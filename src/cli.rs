// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;

/// Command-line arguments for `lazydag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lazydag",
    version,
    about = "Inspect the execution plan a lazy operation graph would dispatch.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML) defining `[session]` and `[op.<key>]`.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Operation whose result is requested. May be repeated.
    #[arg(long = "target", value_name = "KEY")]
    pub targets: Vec<String>,

    /// Treat this operation as already executed. May be repeated.
    #[arg(long = "evaluated", value_name = "KEY")]
    pub evaluated: Vec<String>,

    /// Print the whole graph in definition order instead of extracting.
    #[arg(long)]
    pub full: bool,

    /// Print one line per engine segment instead of the JSON plan.
    #[arg(long)]
    pub segments: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LAZYDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
