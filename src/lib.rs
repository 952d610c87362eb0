//! # Playreport - Execution Reporting for Playbook Runs
//!
//! Playreport listens to the lifecycle events of an automation playbook run
//! (playbook start, play start, task start, per-host outcomes, final stats),
//! aggregates per-host and per-task outcomes for the play, and posts one
//! consolidated JSON report to an HTTP endpoint when the play ends.
//!
//! The orchestration runtime owns everything else: inventory, scheduling,
//! connections, templating and module execution. Playreport only observes.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐   CallbackEvent   ┌──────────────────────────┐
//! │ Orchestration runtime │ ────────────────▶ │ ReporterCallback         │
//! └──────────────────────┘   (in order)      │  AggregationContext      │
//!                                             │  sanitize → HostOutcome  │
//!                                             └────────────┬─────────────┘
//!                                                          │ stats
//!                                                          ▼
//!                                             ┌──────────────────────────┐
//!                                             │ Report ─▶ WebhookSender  │
//!                                             │        (HTTP POST, JSON) │
//!                                             └──────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use playreport::prelude::*;
//!
//! let config = ReporterConfig::default().with_api_url("https://dashboard.example.com/api/plays");
//! let mut reporter = ReporterCallback::new(&config);
//!
//! reporter.on_event(&CallbackEvent::PlayStart {
//!     play: PlayInfo::new("webservers").with_hosts(["web1"]),
//! });
//! reporter.on_event(&CallbackEvent::TaskStart {
//!     task: TaskInfo::new("Install nginx"),
//!     is_conditional: false,
//! });
//! reporter.on_event(&CallbackEvent::RunnerOk {
//!     result: HostResult::new("web1").with_changed(true),
//! });
//! reporter.on_event(&CallbackEvent::Stats {});
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod callback;
pub mod config;
pub mod error;
pub mod notify;
pub mod traits;

/// Convenient re-exports of commonly used types and traits.
pub mod prelude {
    pub use crate::callback::{
        CallbackEvent, HostResult, HostStats, HostStatus, PlayInfo, PlaybookInfo, Report,
        ReportStatus, ReporterCallback, ResultField, RuntimeInfo, TaskInfo,
    };
    pub use crate::config::ReporterConfig;
    pub use crate::error::{Error, Result};
    pub use crate::notify::{NotificationError, ReportSender, WebhookSender};
    pub use crate::traits::ExecutionCallback;
}

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
