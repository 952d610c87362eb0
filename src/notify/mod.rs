//! Report delivery.
//!
//! A [`ReportSender`] takes a finished [`Report`] and ships it somewhere.
//! The only production sender is the [`WebhookSender`], which POSTs the
//! report as JSON. Delivery is synchronous and attempted once; the caller
//! logs failures and moves on.

pub mod error;
pub mod webhook;

pub use error::{NotificationError, NotificationResult};
pub use webhook::WebhookSender;

use crate::callback::report::Report;

/// Trait for report delivery backends.
pub trait ReportSender: Send {
    /// Returns the name of this sender.
    fn name(&self) -> &str;

    /// Delivers a report, blocking until done or timed out.
    fn send(&self, report: &Report) -> NotificationResult<()>;
}
