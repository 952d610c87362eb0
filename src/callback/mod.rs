//! Callback system for execution events
//!
//! The orchestration runtime emits [`CallbackEvent`]s; listeners implement
//! [`ExecutionCallback`] and receive them through one dispatch method.
//!
//! # Architecture
//!
//! 1. **[`types`]**: the event enum and the descriptors it carries
//! 2. **[`sanitize`]**: stripping raw result payloads down to JSON-safe data
//! 3. **[`report`]**: the report document and its building blocks
//! 4. **[`plugins`]**: the listeners themselves
//!
//! [`CallbackEvent`]: types::CallbackEvent
//! [`ExecutionCallback`]: crate::traits::ExecutionCallback

pub mod plugins;
pub mod report;
pub mod sanitize;
pub mod types;

pub use plugins::{AggregationContext, ReporterCallback};
pub use report::{
    ExecutionEnvironment, HostOutcome, HostStats, HostStatus, Report, ReportStatus, TaskRecord,
    TaskStatus,
};
pub use types::{CallbackEvent, HostResult, PlayInfo, PlaybookInfo, ResultField, RuntimeInfo, TaskInfo};

/// A boxed callback for dynamic dispatch.
pub type BoxedCallback = Box<dyn crate::traits::ExecutionCallback>;
