// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `assetflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetflow",
    version,
    about = "Compile Sass, bundle and minify assets referenced from HTML, and serve the result with live reload.",
    long_about = None
)]
pub struct CliArgs {
    /// Which pipeline to run. Defaults to `build`.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to a TOML file overriding the default paths and server settings.
    ///
    /// Without this flag `assetflow.toml` is used when present, otherwise
    /// built-in defaults (`./app/` -> `./public/`).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// Overrides `ASSETFLOW_LOG`; `info` when neither is set.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate config, print the task graph and watch bindings, but
    /// don't run anything.
    #[arg(long, global = true)]
    pub dry_run: bool,
}

impl CliArgs {
    /// The selected pipeline, falling back to the default build pipeline.
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Build)
    }
}

/// Pipeline entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve, compile stylesheets, bundle and copy fonts once (no watching).
    Build,
    /// Run every task once, then re-run the affected tasks on source changes.
    Watch,
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
