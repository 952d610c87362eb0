//! Core traits for Playreport.
//!
//! The orchestration runtime talks to listeners through a single dispatch
//! method: every lifecycle notification is a [`CallbackEvent`] and arrives in
//! emission order on the runtime's dispatch thread.

use crate::callback::types::CallbackEvent;

// ============================================================================
// Callback Traits
// ============================================================================

/// Listener for execution events.
///
/// Implementations must never panic or surface errors to the caller; a
/// listener failing must not change the outcome of the playbook run.
pub trait ExecutionCallback {
    /// Returns the name of this callback.
    fn name(&self) -> &str;

    /// Handles one lifecycle event.
    fn on_event(&mut self, event: &CallbackEvent);

    /// Handles a batch of events in order.
    fn replay<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a CallbackEvent>,
        Self: Sized,
    {
        for event in events {
            self.on_event(event);
        }
    }
}
