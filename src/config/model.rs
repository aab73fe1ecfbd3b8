// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::TriggerWhileRunningBehaviour;

/// Configuration as read from the optional TOML file.
///
/// ```toml
/// [paths]
/// source_root = "./app/"
/// output_root = "./public/"
/// sass_dir = "sass"
///
/// [server]
/// port = 3000
///
/// [watch]
/// triggered_while_running_behaviour = "queue"
/// queue_length = 1
/// ```
///
/// All sections and keys are optional; omitted values fall back to the
/// fixed layout (`./app/` compiled into `./public/`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration.
///
/// Constructed once at startup (via `TryFrom<RawConfigFile>`), shared behind
/// an `Arc`, and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    paths: PathConfig,
    server: ServerConfig,
    watch: WatchSection,
}

impl ConfigFile {
    /// Construct a `ConfigFile` without validation.
    ///
    /// Only `validate.rs` should call this.
    pub(crate) fn new_unchecked(paths: PathConfig, server: ServerConfig, watch: WatchSection) -> Self {
        Self {
            paths,
            server,
            watch,
        }
    }

    pub fn paths(&self) -> &PathConfig {
        &self.paths
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }
}

/// `[paths]` section: where sources live and where output goes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    /// Root of the sources (`./app/`).
    pub source_root: PathBuf,
    /// Root of the generated site (`./public/`).
    pub output_root: PathBuf,
    /// Stylesheet sources, relative to `source_root`.
    pub sass_dir: PathBuf,
    /// Plain scripts, relative to both roots.
    pub js_dir: PathBuf,
    /// Compiled stylesheets, relative to `output_root`.
    pub css_dir: PathBuf,
    /// Fonts, relative to both roots.
    pub font_dir: PathBuf,
    /// Third-party packages; searched by Sass imports and reference blocks.
    pub dependency_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("./app/"),
            output_root: PathBuf::from("./public/"),
            sass_dir: PathBuf::from("sass"),
            js_dir: PathBuf::from("js"),
            css_dir: PathBuf::from("css"),
            font_dir: PathBuf::from("fonts"),
            dependency_dir: PathBuf::from("./node_modules"),
        }
    }
}

impl PathConfig {
    /// Layout rooted at `base`: `<base>/app`, `<base>/public`,
    /// `<base>/node_modules`, default sub-directories.
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            source_root: base.join("app"),
            output_root: base.join("public"),
            dependency_dir: base.join("node_modules"),
            ..Self::default()
        }
    }

    pub fn sass_source(&self) -> PathBuf {
        self.source_root.join(&self.sass_dir)
    }

    pub fn css_output(&self) -> PathBuf {
        self.output_root.join(&self.css_dir)
    }

    pub fn js_source(&self) -> PathBuf {
        self.source_root.join(&self.js_dir)
    }

    pub fn js_output(&self) -> PathBuf {
        self.output_root.join(&self.js_dir)
    }

    pub fn font_source(&self) -> PathBuf {
        self.source_root.join(&self.font_dir)
    }

    pub fn font_output(&self) -> PathBuf {
        self.output_root.join(&self.font_dir)
    }
}

/// `[server]` section for the dev server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    /// `0` lets the OS pick a free port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `[watch]` section.
///
/// Controls what happens when changes arrive while a run is active.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSection {
    /// `"queue"` (default) or `"cancel"`.
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Maximum number of queued runs to remember.
    pub queue_length: usize,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
            queue_length: 1,
        }
    }
}
