//! Shared test utilities for the Playreport test suite.
//!
//! - A recording [`ReportSender`] that keeps every report it is handed
//! - Event builders for common playbook shapes

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use playreport::callback::report::Report;
use playreport::callback::types::{CallbackEvent, HostResult, PlayInfo, PlaybookInfo, TaskInfo};
use playreport::notify::{NotificationError, NotificationResult, ReportSender};

// ============================================================================
// Recording Sender
// ============================================================================

/// Sender that stores reports instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSender {
    pub reports: Arc<Mutex<Vec<Report>>>,
    pub fail_with_status: Option<u16>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every delivery fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }
}

impl ReportSender for RecordingSender {
    fn name(&self) -> &str {
        "Recording"
    }

    fn send(&self, report: &Report) -> NotificationResult<()> {
        self.reports.lock().push(report.clone());
        match self.fail_with_status {
            Some(status) => Err(NotificationError::http(status, "simulated failure")),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Event Builders
// ============================================================================

pub fn playbook_start(path: &str) -> CallbackEvent {
    CallbackEvent::PlaybookStart {
        playbook: PlaybookInfo::new(path),
    }
}

pub fn play_start(name: &str, hosts: &[&str]) -> CallbackEvent {
    CallbackEvent::PlayStart {
        play: PlayInfo::new(name).with_hosts(hosts.iter().copied()),
    }
}

pub fn task_start(name: &str) -> CallbackEvent {
    CallbackEvent::TaskStart {
        task: TaskInfo::new(name),
        is_conditional: false,
    }
}

pub fn ok(host: &str, changed: bool) -> CallbackEvent {
    CallbackEvent::RunnerOk {
        result: HostResult::new(host).with_changed(changed),
    }
}

pub fn failed(host: &str, ignore_errors: bool) -> CallbackEvent {
    CallbackEvent::RunnerFailed {
        result: HostResult::new(host),
        ignore_errors,
    }
}

pub fn unreachable(host: &str) -> CallbackEvent {
    CallbackEvent::RunnerUnreachable {
        result: HostResult::new(host),
    }
}

pub fn skipped(host: &str) -> CallbackEvent {
    CallbackEvent::RunnerSkipped {
        result: HostResult::new(host),
    }
}

pub fn rescued(host: &str) -> CallbackEvent {
    CallbackEvent::RunnerRescued {
        result: HostResult::new(host),
    }
}

pub fn stats() -> CallbackEvent {
    CallbackEvent::Stats {}
}
