//! Observability for certificate runs
//!
//! - Structured logging (JSON, stderr)
//! - Typed lifecycle events
//! - Begin/complete scopes
//! - Run statistics
//!
//! Observability is read-only: nothing here changes what is written to the
//! certificate.
//!
//! # Usage
//!
//! ```ignore
//! use unsolvcert::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::TaskLoaded, &[("variables", "12")]);
//!
//! let scope = ObservationScope::new("CERTIFY");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;
mod stats;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};
pub use stats::RunStats;

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::LedgerOpened);
        log_event_with_fields(Event::TaskLoaded, &[("variables", "2")]);
    }
}
