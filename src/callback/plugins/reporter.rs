//! Execution reporter callback.
//!
//! Aggregates one play's worth of outcomes and, when the runtime emits the
//! final `stats` event, assembles a single [`Report`] and hands it to a
//! [`ReportSender`].
//!
//! # Aggregation
//!
//! - `play_start` resets the task list and zeroes the counters of every
//!   host in the play.
//! - `task_start` opens a task draft. A draft still open at that point is
//!   finalized and appended first, so back-to-back task starts never lose
//!   host outcomes.
//! - Runner events bump the host's counters and store a sanitized outcome in
//!   the open draft. Outcomes arriving with no open draft only count.
//! - `stats` finalizes the open draft, builds the report and delivers it.
//!
//! # Failure Isolation
//!
//! Nothing here returns an error to the runtime. A missing URL disables
//! delivery with a warning; delivery failures are logged with `error!`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use playreport::prelude::*;
//!
//! let mut reporter = ReporterCallback::from_settings(None);
//! for event in runtime_events {
//!     reporter.on_event(&event);
//! }
//! ```

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::callback::report::{
    controller_hostname, current_user, format_timestamp, ExecutionEnvironment, HostOutcome,
    HostStats, HostStatus, InventorySection, PlaySection, PlaybookSection, Report, ReportStatus,
    TaskRecord,
};
use crate::callback::sanitize::sanitize_payload;
use crate::callback::types::{CallbackEvent, HostResult, PlayInfo, PlaybookInfo, RuntimeInfo};
use crate::config::ReporterConfig;
use crate::notify::{ReportSender, WebhookSender};
use crate::traits::ExecutionCallback;

/// Per-run aggregation state.
///
/// Owned by exactly one [`ReporterCallback`]; every event handler gets it by
/// mutable reference.
#[derive(Debug, Default)]
pub struct AggregationContext {
    /// Playbook file name
    pub playbook_name: Option<String>,
    /// Playbook path
    pub playbook_path: Option<String>,
    /// Merged extra variables
    pub extra_vars: IndexMap<String, JsonValue>,
    /// Runtime version information
    pub runtime: RuntimeInfo,
    /// Current play name
    pub play_name: Option<String>,
    /// Hosts of the current play
    pub hosts: Vec<String>,
    /// Wall-clock play start
    pub play_started_at: Option<DateTime<Utc>>,
    play_clock: Option<Instant>,
    /// Finalized tasks of the current play
    pub tasks: Vec<TaskRecord>,
    /// Open task draft
    pub current_task: Option<TaskRecord>,
    /// Per-host counters of the current play
    pub stats: IndexMap<String, HostStats>,
}

impl AggregationContext {
    fn playbook_started(&mut self, playbook: &PlaybookInfo) {
        self.playbook_name = Some(playbook.name());
        self.playbook_path = Some(playbook.path.to_string_lossy().into_owned());
        self.extra_vars = playbook.merged_extra_vars();
        self.runtime = playbook.runtime.clone();
    }

    fn play_started(&mut self, play: &PlayInfo) {
        self.play_started_at = Some(Utc::now());
        self.play_clock = Some(Instant::now());
        self.play_name = Some(play.name.clone());
        self.hosts = play.hosts.clone();

        self.tasks.clear();
        self.current_task = None;
        self.stats = self
            .hosts
            .iter()
            .map(|host| (host.clone(), HostStats::default()))
            .collect();
    }

    fn task_started(&mut self, name: &str) {
        if let Some(previous) = self.current_task.take() {
            debug!(
                "Task '{}' still open when '{}' started; finalizing it",
                previous.name, name
            );
            self.tasks.push(previous.finalize());
        }
        self.current_task = Some(TaskRecord::start(name));
    }

    /// Counters for a host, created on first sight for hosts outside the
    /// play's host list.
    fn host_stats(&mut self, host: &str) -> &mut HostStats {
        if !self.stats.contains_key(host) {
            debug!("Outcome for host '{}' outside the play's host list", host);
        }
        self.stats.entry(host.to_string()).or_default()
    }

    fn host_outcome(&mut self, result: &HostResult, status: HostStatus) {
        let changed = result.changed();
        let stats = self.host_stats(&result.host);
        match status {
            HostStatus::Success => {
                stats.ok += 1;
                if changed {
                    stats.changed += 1;
                }
            }
            HostStatus::Failed => stats.failed += 1,
            HostStatus::Ignored => stats.ignored += 1,
            HostStatus::Unreachable => stats.unreachable += 1,
            HostStatus::Skipped => stats.skipped += 1,
            HostStatus::Rescued => stats.rescued += 1,
        }

        match self.current_task.as_mut() {
            Some(task) => {
                let payload = sanitize_payload(&result.payload);
                task.record(
                    result.host.clone(),
                    HostOutcome::from_sanitized(status, &payload),
                );
            }
            None => debug!(
                "No open task for {} outcome on '{}'; counters updated only",
                status, result.host
            ),
        }
    }

    fn finish_play(&mut self) {
        if let Some(task) = self.current_task.take() {
            self.tasks.push(task.finalize());
        }
    }

    fn build_report(
        &self,
        play_id: &str,
        controller_hostname: &str,
        user: &str,
    ) -> Report {
        let duration = self
            .play_clock
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        Report {
            play_id: play_id.to_string(),
            start_time: self.play_started_at.map(format_timestamp),
            end_time: format_timestamp(Utc::now()),
            status: ReportStatus::from_stats(self.stats.values()),
            duration,
            playbook: PlaybookSection {
                name: self.playbook_name.clone(),
                path: self.playbook_path.clone(),
            },
            inventory: InventorySection {
                hosts: self.hosts.clone(),
            },
            play: PlaySection {
                name: self.play_name.clone(),
                hosts: self.hosts.clone(),
            },
            tasks: self.tasks.clone(),
            stats: self.stats.clone(),
            extra_vars: self.extra_vars.clone(),
            execution_environment: ExecutionEnvironment::new(
                &self.runtime,
                controller_hostname,
                user,
            ),
        }
    }
}

/// Callback that reports each play to an HTTP endpoint.
pub struct ReporterCallback {
    play_id: String,
    controller_hostname: String,
    user: String,
    sender: Option<Box<dyn ReportSender>>,
    context: AggregationContext,
    last_report: Option<Report>,
}

impl ReporterCallback {
    /// Creates a reporter from configuration.
    ///
    /// Without a URL, or if the HTTP client cannot be built, the reporter
    /// still aggregates but never sends.
    pub fn new(config: &ReporterConfig) -> Self {
        let sender: Option<Box<dyn ReportSender>> = if config.is_enabled() {
            match WebhookSender::from_config(config) {
                Ok(sender) => Some(Box::new(sender)),
                Err(e) => {
                    warn!("Report delivery disabled: {}", e);
                    None
                }
            }
        } else {
            warn!("No API URL configured for the reporter; reports will not be sent");
            None
        };

        Self::with_sender(sender)
    }

    /// Creates a reporter from the standard configuration sources.
    ///
    /// Configuration errors are logged and leave reporting disabled.
    pub fn from_settings(settings_path: Option<&Path>) -> Self {
        match ReporterConfig::load(settings_path) {
            Ok(config) => Self::new(&config),
            Err(e) => {
                warn!("Failed to load reporter configuration: {}", e);
                Self::with_sender(None)
            }
        }
    }

    /// Creates a reporter with an explicit delivery backend.
    pub fn with_sender(sender: Option<Box<dyn ReportSender>>) -> Self {
        Self {
            play_id: Uuid::new_v4().to_string(),
            controller_hostname: controller_hostname(),
            user: current_user(),
            sender,
            context: AggregationContext::default(),
            last_report: None,
        }
    }

    /// Identifier stamped on every report of this run.
    pub fn play_id(&self) -> &str {
        &self.play_id
    }

    /// Whether reports are delivered anywhere.
    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Current aggregation state.
    pub fn context(&self) -> &AggregationContext {
        &self.context
    }

    /// The most recently assembled report.
    pub fn last_report(&self) -> Option<&Report> {
        self.last_report.as_ref()
    }

    fn on_stats(&mut self) {
        self.context.finish_play();

        let report = self
            .context
            .build_report(&self.play_id, &self.controller_hostname, &self.user);

        if report.status == ReportStatus::Failed {
            debug!("Play failed on: {}", report.failed_hosts().join(", "));
        }

        self.deliver(&report);
        self.last_report = Some(report);
    }

    fn deliver(&self, report: &Report) {
        let play = report.play.name.as_deref().unwrap_or("<unnamed>");

        let Some(sender) = self.sender.as_ref() else {
            warn!(
                "API URL not configured; report for play '{}' was not sent",
                play
            );
            return;
        };

        match sender.send(report) {
            Ok(()) => info!("Report for play '{}' sent ({})", play, report.status),
            Err(e) => error!(
                "Failed to send report for play '{}' via {}: {}",
                play,
                sender.name(),
                e
            ),
        }
    }
}

impl std::fmt::Debug for ReporterCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterCallback")
            .field("play_id", &self.play_id)
            .field("sender", &self.sender.as_ref().map(|s| s.name()))
            .field("context", &self.context)
            .finish()
    }
}

impl ExecutionCallback for ReporterCallback {
    fn name(&self) -> &str {
        "reporter"
    }

    fn on_event(&mut self, event: &CallbackEvent) {
        match event {
            CallbackEvent::PlaybookStart { playbook } => {
                self.context.playbook_started(playbook);
            }
            CallbackEvent::PlayStart { play } => {
                self.context.play_started(play);
                info!("Play '{}' started (id {})", play.name, self.play_id);
            }
            CallbackEvent::TaskStart { task, .. } => self.context.task_started(&task.name),
            CallbackEvent::RunnerOk { result } => {
                self.context.host_outcome(result, HostStatus::Success);
            }
            CallbackEvent::RunnerFailed {
                result,
                ignore_errors,
            } => {
                let status = if *ignore_errors {
                    HostStatus::Ignored
                } else {
                    HostStatus::Failed
                };
                self.context.host_outcome(result, status);
            }
            CallbackEvent::RunnerUnreachable { result } => {
                self.context.host_outcome(result, HostStatus::Unreachable);
            }
            CallbackEvent::RunnerSkipped { result } => {
                self.context.host_outcome(result, HostStatus::Skipped);
            }
            CallbackEvent::RunnerRescued { result } => {
                self.context.host_outcome(result, HostStatus::Rescued);
            }
            CallbackEvent::Stats {} => self.on_stats(),
        }
    }
}
