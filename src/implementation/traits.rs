//! Normalizer trait and process status types.

use std::fmt;

use crate::BenchResult;
use crate::bench::config::ImplementationSpec;

/// How a normalizer process ended, as far as it could be observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationStatus {
    /// Normal exit with the given code
    Exited(i32),
    /// Terminated by a signal
    Signaled { number: i32, name: String },
    /// Still alive when the wait gave up
    Running,
    /// Exit status could not be determined
    Unknown,
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationStatus::Exited(code) => write!(f, "returned {code}"),
            TerminationStatus::Signaled { name, .. } => write!(f, "killed with signal {name}"),
            TerminationStatus::Running => write!(f, "still running"),
            TerminationStatus::Unknown => write!(f, "unknown status"),
        }
    }
}

/// A normalizer reachable through a one-line request/response channel.
pub trait Normalizer {
    /// Implementation name used in records and logs.
    fn name(&self) -> &str;

    /// Sends one formula and waits for the one-line reply.
    ///
    /// `Ok(None)` means the peer closed its output before replying, which
    /// callers treat as a fatal failure of the implementation.
    fn query(&mut self, formula: &str) -> BenchResult<Option<String>>;

    /// Exit status after a failed query, waiting briefly for the peer to end.
    fn termination_status(&mut self) -> TerminationStatus;

    /// Closes the channel and lets the peer terminate.
    fn shutdown(&mut self) -> BenchResult<()>;
}

/// Opens a fresh [`Normalizer`] for an implementation.
pub trait Launcher {
    fn launch(&self, spec: &ImplementationSpec) -> BenchResult<Box<dyn Normalizer>>;
}
