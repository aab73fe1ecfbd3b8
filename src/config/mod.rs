// src/config/mod.rs

//! The optional `assetflow.toml`: paths, dev server address and watch
//! behaviour. Missing keys take the fixed layout's defaults; the result is
//! validated once and shared read-only afterwards.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, PathConfig, RawConfigFile, ServerConfig, WatchSection};
