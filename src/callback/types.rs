//! Callback event types consumed by the reporter
//!
//! The orchestration runtime owns execution; it describes what happened
//! through an ordered stream of [`CallbackEvent`]s. Every event carries only
//! the fields the reporter needs: host name, task name, the raw result
//! payload, and the changed / ignore-errors flags.
//!
//! ## Event Categories
//!
//! - **Playbook Events**: playbook start
//! - **Play Events**: play start
//! - **Task Events**: task start
//! - **Runner Events**: per-host outcome (ok, failed, unreachable, skipped, rescued)
//! - **Stats Events**: end of the play, triggers report delivery

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Payload key holding the changed flag.
pub const CHANGED_KEY: &str = "changed";

// ============================================================================
// Core Event Enum
// ============================================================================

/// All lifecycle events the reporter reacts to, in the order a runtime
/// emits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CallbackEvent {
    /// First event of a run.
    PlaybookStart {
        /// Playbook being executed
        playbook: PlaybookInfo,
    },

    /// A play begins; resets per-play state.
    PlayStart {
        /// Play being executed
        play: PlayInfo,
    },

    /// A task begins.
    TaskStart {
        /// Task being executed
        task: TaskInfo,
        /// Whether the task has a when condition
        #[serde(default)]
        is_conditional: bool,
    },

    /// A task completed on a host.
    RunnerOk {
        /// Per-host result
        result: HostResult,
    },

    /// A task failed on a host.
    RunnerFailed {
        /// Per-host result
        result: HostResult,
        /// Whether the failure was ignored via ignore_errors
        #[serde(default)]
        ignore_errors: bool,
    },

    /// A host could not be reached.
    RunnerUnreachable {
        /// Per-host result
        result: HostResult,
    },

    /// A task was skipped on a host.
    RunnerSkipped {
        /// Per-host result
        result: HostResult,
    },

    /// A failed task was rescued on a host.
    RunnerRescued {
        /// Per-host result
        result: HostResult,
    },

    /// Final statistics; the play is over.
    Stats {},
}

impl CallbackEvent {
    /// Returns the event type name as a string.
    pub fn event_type(&self) -> &'static str {
        match self {
            CallbackEvent::PlaybookStart { .. } => "playbook_start",
            CallbackEvent::PlayStart { .. } => "play_start",
            CallbackEvent::TaskStart { .. } => "task_start",
            CallbackEvent::RunnerOk { .. } => "runner_ok",
            CallbackEvent::RunnerFailed { .. } => "runner_failed",
            CallbackEvent::RunnerUnreachable { .. } => "runner_unreachable",
            CallbackEvent::RunnerSkipped { .. } => "runner_skipped",
            CallbackEvent::RunnerRescued { .. } => "runner_rescued",
            CallbackEvent::Stats {} => "stats",
        }
    }

    /// Returns the host associated with this event, if any.
    pub fn host(&self) -> Option<&str> {
        match self {
            CallbackEvent::RunnerOk { result }
            | CallbackEvent::RunnerFailed { result, .. }
            | CallbackEvent::RunnerUnreachable { result }
            | CallbackEvent::RunnerSkipped { result }
            | CallbackEvent::RunnerRescued { result } => Some(&result.host),
            _ => None,
        }
    }
}

// ============================================================================
// Context Structs
// ============================================================================

/// Version information about the runtime driving the playbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeInfo {
    /// Version of the orchestration tool
    #[serde(default)]
    pub tool_version: Option<String>,
    /// Version of the interpreter/runtime hosting the tool
    #[serde(default)]
    pub runtime_version: Option<String>,
}

/// Information about a playbook being executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookInfo {
    /// Path to the playbook file
    pub path: PathBuf,
    /// Extra-var sources passed to the run, in command-line order
    #[serde(default)]
    pub extra_vars: Vec<JsonValue>,
    /// Runtime version information
    #[serde(default)]
    pub runtime: RuntimeInfo,
}

impl PlaybookInfo {
    /// Create a new PlaybookInfo.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            extra_vars: Vec::new(),
            runtime: RuntimeInfo::default(),
        }
    }

    /// Add an extra-var source.
    pub fn with_extra_vars(mut self, vars: JsonValue) -> Self {
        self.extra_vars.push(vars);
        self
    }

    /// Set the runtime information.
    pub fn with_runtime(mut self, runtime: RuntimeInfo) -> Self {
        self.runtime = runtime;
        self
    }

    /// Playbook name: the file name of its path.
    pub fn name(&self) -> String {
        file_name(&self.path)
    }

    /// Merge every object-valued extra-var source; later sources win.
    pub fn merged_extra_vars(&self) -> IndexMap<String, JsonValue> {
        let mut merged = IndexMap::new();
        for source in &self.extra_vars {
            if let JsonValue::Object(map) = source {
                for (key, value) in map {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        merged
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Information about a play being executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayInfo {
    /// Name of the play
    pub name: String,
    /// Resolved hosts for this play
    #[serde(default)]
    pub hosts: Vec<String>,
}

impl PlayInfo {
    /// Create a new PlayInfo.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hosts: Vec::new(),
        }
    }

    /// Set the resolved hosts.
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }
}

/// Information about a task being executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInfo {
    /// Task name
    pub name: String,
}

impl TaskInfo {
    /// Create a new TaskInfo.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ============================================================================
// Result Payload
// ============================================================================

/// A single field of a raw result payload.
///
/// Runtimes that track set-typed values (fact lists gathered as sets, for
/// instance) hand them over as [`ResultField::Set`]; everything else is plain
/// JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultField {
    /// Any JSON value
    Json(JsonValue),
    /// An unordered set of strings
    Set(BTreeSet<String>),
}

impl ResultField {
    /// Borrow the JSON value, if this field is one.
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            ResultField::Json(value) => Some(value),
            ResultField::Set(_) => None,
        }
    }
}

impl From<JsonValue> for ResultField {
    fn from(value: JsonValue) -> Self {
        ResultField::Json(value)
    }
}

impl From<BTreeSet<String>> for ResultField {
    fn from(set: BTreeSet<String>) -> Self {
        ResultField::Set(set)
    }
}

/// Result of one task on one host, as emitted by the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostResult {
    /// Host the task ran against
    pub host: String,
    /// Raw module result
    #[serde(default)]
    pub payload: IndexMap<String, ResultField>,
}

impl HostResult {
    /// Create an empty result for a host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            payload: IndexMap::new(),
        }
    }

    /// Set a payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<ResultField>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Set the changed flag.
    pub fn with_changed(self, changed: bool) -> Self {
        self.with_field(CHANGED_KEY, JsonValue::Bool(changed))
    }

    /// Whether the result reports a change on the host.
    pub fn changed(&self) -> bool {
        self.payload
            .get(CHANGED_KEY)
            .and_then(ResultField::as_json)
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_callback_event_type() {
        let event = CallbackEvent::PlaybookStart {
            playbook: PlaybookInfo::new("site.yml"),
        };
        assert_eq!(event.event_type(), "playbook_start");
        assert_eq!(CallbackEvent::Stats {}.event_type(), "stats");
    }

    #[test]
    fn test_callback_event_host() {
        let event = CallbackEvent::RunnerFailed {
            result: HostResult::new("db1"),
            ignore_errors: false,
        };
        assert_eq!(event.host(), Some("db1"));

        let event = CallbackEvent::TaskStart {
            task: TaskInfo::new("ping"),
            is_conditional: false,
        };
        assert_eq!(event.host(), None);
    }

    #[test]
    fn test_playbook_name_is_file_name() {
        let info = PlaybookInfo::new("/srv/playbooks/deploy.yml");
        assert_eq!(info.name(), "deploy.yml");
    }

    #[test]
    fn test_merged_extra_vars_ignores_non_objects() {
        let info = PlaybookInfo::new("site.yml")
            .with_extra_vars(json!({"env": "staging", "replicas": 2}))
            .with_extra_vars(json!("@vars/prod.yml"))
            .with_extra_vars(json!({"env": "prod"}));

        let merged = info.merged_extra_vars();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["env"], json!("prod"));
        assert_eq!(merged["replicas"], json!(2));
    }

    #[test]
    fn test_host_result_changed() {
        assert!(HostResult::new("web1").with_changed(true).changed());
        assert!(!HostResult::new("web1").with_changed(false).changed());
        assert!(!HostResult::new("web1").changed());
        assert!(!HostResult::new("web1")
            .with_field("changed", json!("yes"))
            .changed());
    }

    #[test]
    fn test_event_deserializes_from_json_line() {
        let line = r#"{"event":"runner_failed","result":{"host":"web1","payload":{"msg":"boom"}},"ignore_errors":true}"#;
        let event: CallbackEvent = serde_json::from_str(line).unwrap();
        match event {
            CallbackEvent::RunnerFailed {
                result,
                ignore_errors,
            } => {
                assert_eq!(result.host, "web1");
                assert!(ignore_errors);
                assert_eq!(result.payload["msg"], ResultField::Json(json!("boom")));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_stats_event_deserializes_without_fields() {
        let event: CallbackEvent = serde_json::from_str(r#"{"event":"stats"}"#).unwrap();
        assert_eq!(event.event_type(), "stats");
    }
}
