use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Identity of one of the pipeline's build tasks.
///
/// The set is closed: every task the pipeline can run is listed here, which
/// lets the graph, the scheduler and the watch bindings refer to tasks without
/// stringly-typed names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    /// Static file server with live reload over the output root.
    DevServer,
    /// `sass/*.scss` -> `css/*.css`.
    StylesheetCompile,
    /// HTML reference blocks -> concatenated, minified bundles.
    AssetBundle,
    /// `js/**/*.js` copied verbatim.
    ScriptCopy,
    /// `fonts/**/*` copied verbatim.
    FontCopy,
}

impl TaskId {
    /// Every task, in the canonical startup order.
    pub const ALL: [TaskId; 5] = [
        TaskId::DevServer,
        TaskId::StylesheetCompile,
        TaskId::AssetBundle,
        TaskId::ScriptCopy,
        TaskId::FontCopy,
    ];

    /// Stable name used in logs, config and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            TaskId::DevServer => "dev-server",
            TaskId::StylesheetCompile => "stylesheets",
            TaskId::AssetBundle => "bundle",
            TaskId::ScriptCopy => "scripts",
            TaskId::FontCopy => "fonts",
        }
    }

    /// Long-lived tasks report progress once they are up and then keep running.
    pub fn is_long_lived(self) -> bool {
        matches!(self, TaskId::DevServer)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        TaskId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| {
                format!(
                    "unknown task '{s}' (expected one of: dev-server, stylesheets, bundle, scripts, fonts)"
                )
            })
    }
}

/// Behaviour when a change trigger arrives while a run is already in progress.
///
/// - `Queue`: remember the trigger and start a new run when the current one
///   finishes (default behaviour).
/// - `Cancel`: drop any previously queued run and only keep the latest
///   trigger batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    Queue,
    Cancel,
}

impl Default for TriggerWhileRunningBehaviour {
    fn default() -> Self {
        TriggerWhileRunningBehaviour::Queue
    }
}
