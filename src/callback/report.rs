//! Report document assembled at the end of a play.
//!
//! Field names on the wire match what reporting dashboards already consume,
//! which is why a few of them (`ansible_facts`, `ansible_version`,
//! `python_version`) are renamed on serialization.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::types::RuntimeInfo;

/// Placeholder for metadata that could not be determined.
pub const UNKNOWN: &str = "unknown";

/// Formats a timestamp the way every report field carries it.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ============================================================================
// Host Level
// ============================================================================

/// Per-host counters for one play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStats {
    /// Successful task runs (changed or not)
    pub ok: u32,
    /// Successful task runs that changed the host
    pub changed: u32,
    /// Unreachable attempts
    pub unreachable: u32,
    /// Failed task runs
    pub failed: u32,
    /// Skipped task runs
    pub skipped: u32,
    /// Failures rescued by a rescue block
    pub rescued: u32,
    /// Failures ignored via ignore_errors
    pub ignored: u32,
}

impl HostStats {
    /// Check if this host makes the play fail.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.unreachable > 0
    }
}

/// Status of a task on one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    /// Task succeeded
    Success,
    /// Task failed
    Failed,
    /// Host could not be reached
    Unreachable,
    /// Task was skipped
    Skipped,
    /// Failure was rescued
    Rescued,
    /// Failure was ignored
    Ignored,
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostStatus::Success => "success",
            HostStatus::Failed => "failed",
            HostStatus::Unreachable => "unreachable",
            HostStatus::Skipped => "skipped",
            HostStatus::Rescued => "rescued",
            HostStatus::Ignored => "ignored",
        };
        f.write_str(s)
    }
}

/// Stored outcome of one task on one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostOutcome {
    /// Outcome status
    pub status: HostStatus,
    /// Whether the host was changed
    pub changed: bool,
    /// Duration reported by the module, if any
    pub duration: Option<JsonValue>,
    /// Facts gathered by the task
    #[serde(rename = "ansible_facts")]
    pub facts: JsonValue,
    /// Standard output, as the module returned it
    pub stdout: JsonValue,
    /// Standard error, as the module returned it
    pub stderr: JsonValue,
}

impl HostOutcome {
    /// Builds an outcome from an already sanitized payload.
    ///
    /// Only the status, changed flag, duration, facts and output streams are
    /// kept; every other field of the payload is dropped. Output streams keep
    /// whatever JSON value the module produced and default to `""`.
    pub fn from_sanitized(status: HostStatus, payload: &IndexMap<String, JsonValue>) -> Self {
        Self {
            status,
            changed: payload
                .get("changed")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            duration: payload.get("duration").cloned(),
            facts: payload
                .get("ansible_facts")
                .cloned()
                .unwrap_or_else(|| JsonValue::Object(Default::default())),
            stdout: stream_field(payload, "stdout"),
            stderr: stream_field(payload, "stderr"),
        }
    }
}

fn stream_field(payload: &IndexMap<String, JsonValue>, key: &str) -> JsonValue {
    payload
        .get(key)
        .cloned()
        .unwrap_or_else(|| JsonValue::String(String::new()))
}

// ============================================================================
// Task Level
// ============================================================================

/// Lifecycle of a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Draft, still collecting host outcomes
    Running,
    /// Finalized and part of the report
    Completed,
}

/// One task of the play with its per-host outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Unique task identifier
    pub task_id: String,
    /// Task name
    pub name: String,
    /// When the task started
    pub start_time: String,
    /// When the task was finalized
    pub end_time: Option<String>,
    /// Draft or completed
    pub status: TaskStatus,
    /// Seconds between start and finalize
    pub duration: f64,
    /// Outcome per host, in arrival order
    pub host_results: IndexMap<String, HostOutcome>,
    #[serde(skip)]
    started: Option<Instant>,
}

impl TaskRecord {
    /// Opens a new draft starting now.
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            task_id: Uuid::new_v4().to_string(),
            name: name.into(),
            start_time: format_timestamp(Utc::now()),
            end_time: None,
            status: TaskStatus::Running,
            duration: 0.0,
            host_results: IndexMap::new(),
            started: Some(Instant::now()),
        }
    }

    /// Stores the outcome for a host, replacing any earlier one.
    pub fn record(&mut self, host: impl Into<String>, outcome: HostOutcome) {
        self.host_results.insert(host.into(), outcome);
    }

    /// Closes the draft: end time, duration and `completed` status.
    pub fn finalize(mut self) -> Self {
        self.end_time = Some(format_timestamp(Utc::now()));
        self.duration = self
            .started
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        self.status = TaskStatus::Completed;
        self
    }
}

// ============================================================================
// Report Level
// ============================================================================

/// Overall status of a play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// No host failed or was unreachable
    #[default]
    Success,
    /// At least one host failed or was unreachable
    Failed,
}

impl ReportStatus {
    /// Derives the play status from per-host counters.
    ///
    /// The scan stops at the first host that failed or was unreachable.
    pub fn from_stats<'a, I>(stats: I) -> Self
    where
        I: IntoIterator<Item = &'a HostStats>,
    {
        if stats.into_iter().any(HostStats::has_failures) {
            ReportStatus::Failed
        } else {
            ReportStatus::Success
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Success => write!(f, "success"),
            ReportStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Playbook section of the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybookSection {
    /// Playbook file name
    pub name: Option<String>,
    /// Playbook path
    pub path: Option<String>,
}

/// Inventory section of the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySection {
    /// Hosts targeted by the play
    pub hosts: Vec<String>,
}

/// Play section of the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaySection {
    /// Play name
    pub name: Option<String>,
    /// Hosts targeted by the play
    pub hosts: Vec<String>,
}

/// Where and by whom the run was executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEnvironment {
    /// Orchestration tool version
    #[serde(rename = "ansible_version")]
    pub tool_version: String,
    /// Interpreter/runtime version
    #[serde(rename = "python_version")]
    pub runtime_version: String,
    /// Hostname of the controller
    pub controller_hostname: String,
    /// User running the playbook
    pub user: String,
}

impl ExecutionEnvironment {
    /// Combines runtime-reported versions with controller metadata.
    pub fn new(runtime: &RuntimeInfo, controller_hostname: &str, user: &str) -> Self {
        Self {
            tool_version: runtime
                .tool_version
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            runtime_version: runtime
                .runtime_version
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            controller_hostname: controller_hostname.to_string(),
            user: user.to_string(),
        }
    }
}

/// Hostname of the machine running the reporter.
pub fn controller_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

/// Name of the user running the reporter.
pub fn current_user() -> String {
    nix::unistd::User::from_uid(nix::unistd::getuid())
        .ok()
        .flatten()
        .map(|user| user.name)
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// The consolidated report for one play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Identifier of the reporter instance's run
    pub play_id: String,
    /// When the play started, if a play start was seen
    pub start_time: Option<String>,
    /// When the report was assembled
    pub end_time: String,
    /// Overall status
    pub status: ReportStatus,
    /// Play duration in seconds
    pub duration: f64,
    /// Playbook name and path
    pub playbook: PlaybookSection,
    /// Targeted hosts
    pub inventory: InventorySection,
    /// Play name and hosts
    pub play: PlaySection,
    /// Completed tasks, in start order
    pub tasks: Vec<TaskRecord>,
    /// Per-host counters
    pub stats: IndexMap<String, HostStats>,
    /// Extra variables supplied to the run
    pub extra_vars: IndexMap<String, JsonValue>,
    /// Controller metadata
    pub execution_environment: ExecutionEnvironment,
}

impl Report {
    /// Hosts whose counters make the play fail.
    pub fn failed_hosts(&self) -> Vec<&str> {
        self.stats
            .iter()
            .filter(|(_, stats)| stats.has_failures())
            .map(|(host, _)| host.as_str())
            .collect()
    }
}
