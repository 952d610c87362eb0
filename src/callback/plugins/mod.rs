//! Callback plugins.
//!
//! - [`ReporterCallback`] - aggregates a play and posts one JSON report

pub mod reporter;

pub use reporter::{AggregationContext, ReporterCallback};
