// src/errors.rs

//! Crate-wide error type.
//!
//! Stylesheet compile errors have no variant: they go through the notifier
//! and never fail a task.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Reference block error in {file:?}: {message}")]
    Reference { file: PathBuf, message: String },

    #[error("Minification failed for {path:?}: {message}")]
    Minify { path: PathBuf, message: String },

    #[error("Dev server failed to start: {0}")]
    ServerStart(String),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineError>;
