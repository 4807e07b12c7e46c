//! Observable events
//!
//! Every diagnostic record names one of these. Events are explicit and
//! typed; the string form is what lands in the log line.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    // Lifecycle
    BootStart,
    BootComplete,
    ShutdownStart,
    ShutdownComplete,

    /// Diagnostic sink could not be opened; a null sink is used
    DiagnosticSinkUnavailable,

    // Recovery
    RecoveryStart,
    RecoveryComplete,

    // Planning
    /// A strategy was resolved from its configuration key
    PlannerSelected,
    /// The configured key is not in the strategy table
    PlannerKeyUnrecognized,
    /// A merge-join node was added to a plan
    MergeJoinCreated,

    // Requests
    RequestFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::BootComplete => "BOOT_COMPLETE",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::DiagnosticSinkUnavailable => "DIAGNOSTIC_SINK_UNAVAILABLE",
            Event::RecoveryStart => "RECOVERY_START",
            Event::RecoveryComplete => "RECOVERY_COMPLETE",
            Event::PlannerSelected => "PLANNER_SELECTED",
            Event::PlannerKeyUnrecognized => "PLANNER_KEY_UNRECOGNIZED",
            Event::MergeJoinCreated => "MERGE_JOIN_CREATED",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Default severity for records of this event
    pub fn severity(&self) -> Severity {
        match self {
            Event::DiagnosticSinkUnavailable | Event::PlannerKeyUnrecognized => Severity::Warn,
            Event::RequestFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::MergeJoinCreated.as_str(), "MERGE_JOIN_CREATED");
        assert_eq!(Event::PlannerKeyUnrecognized.to_string(), "PLANNER_KEY_UNRECOGNIZED");
    }

    #[test]
    fn test_fallback_is_a_warning() {
        assert_eq!(Event::PlannerKeyUnrecognized.severity(), Severity::Warn);
        assert_eq!(Event::MergeJoinCreated.severity(), Severity::Info);
    }
}
