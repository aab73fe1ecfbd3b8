#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetflow::config::{ConfigFile, PathConfig, RawConfigFile, ServerConfig, WatchSection};
use assetflow::server::ReloadHub;
use assetflow::tasks::{Notifier, TaskContext};
use assetflow::types::TriggerWhileRunningBehaviour;
use tempfile::TempDir;

/// Lays out a project in a temp dir: `app/` sources, `public/` output and
/// `node_modules/` dependencies, with a matching `ConfigFile`.
///
/// The server binds port 0 so parallel tests never collide.
pub struct SiteBuilder {
    dir: TempDir,
    paths: PathConfig,
    watch: WatchSection,
    port: u16,
}

impl SiteBuilder {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let paths = PathConfig::rooted_at(dir.path());
        fs::create_dir_all(&paths.source_root).expect("create source root");
        Self {
            dir,
            paths,
            watch: WatchSection::default(),
            port: 0,
        }
    }

    /// Write a file relative to the source root (`app/`).
    pub fn source(self, rel: &str, contents: &str) -> Self {
        write(&self.paths.source_root.join(rel), contents);
        self
    }

    /// Write a file relative to the dependency dir (`node_modules/`).
    pub fn dependency(self, rel: &str, contents: &str) -> Self {
        write(&self.paths.dependency_dir.join(rel), contents);
        self
    }

    /// Write a file relative to the output root (`public/`).
    pub fn output(self, rel: &str, contents: &str) -> Self {
        write(&self.paths.output_root.join(rel), contents);
        self
    }

    pub fn watch_behaviour(mut self, behaviour: TriggerWhileRunningBehaviour, queue_length: usize) -> Self {
        self.watch = WatchSection {
            triggered_while_running_behaviour: behaviour,
            queue_length,
        };
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn build(self) -> Site {
        let raw = RawConfigFile {
            paths: self.paths,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: self.port,
            },
            watch: self.watch,
        };
        let config = ConfigFile::try_from(raw).expect("site layout should validate");
        Site {
            dir: self.dir,
            config,
        }
    }
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built project. The temp dir lives as long as this value.
pub struct Site {
    dir: TempDir,
    config: ConfigFile,
}

impl Site {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn paths(&self) -> &PathConfig {
        self.config.paths()
    }

    pub fn source_path(&self, rel: &str) -> PathBuf {
        self.paths().source_root.join(rel)
    }

    pub fn output_path(&self, rel: &str) -> PathBuf {
        self.paths().output_root.join(rel)
    }

    pub fn write_source(&self, rel: &str, contents: &str) {
        write(&self.source_path(rel), contents);
    }

    pub fn read_output(&self, rel: &str) -> String {
        let path = self.output_path(rel);
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {:?}: {e}", path))
    }

    pub fn output_exists(&self, rel: &str) -> bool {
        self.output_path(rel).exists()
    }

    /// Task context over this site with a fresh reload hub.
    pub fn context(&self, notifier: Arc<dyn Notifier>) -> TaskContext {
        self.context_with_hub(ReloadHub::new(), notifier)
    }

    pub fn context_with_hub(&self, hub: ReloadHub, notifier: Arc<dyn Notifier>) -> TaskContext {
        TaskContext::new(Arc::new(self.config.clone()), hub, notifier)
    }
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write fixture file");
}
