//! Benchmark driver: replays a formula stream against each implementation.
//!
//! # Design
//!
//! Implementations run strictly one after the other. For each one the stream
//! is rewound and a fresh normalizer is launched, then every non-blank line
//! is parsed, sent, timed and checked, and one `ResultRecord` is written per
//! formula. A normalizer that stops answering aborts the whole run; records
//! written until then stay valid. Classification failures only count errors.

use std::io::{BufRead, Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::bench::config::ImplementationSpec;
use crate::classify::is_normalized;
use crate::core::schema::{InputClassification, ResultRecord};
use crate::formula::Formula;
use crate::implementation::{Launcher, Normalizer, TerminationStatus};
use crate::storage::RecordSink;
use crate::{BenchError, BenchResult};

use super::equivalence::EquivalenceOracle;

/// Per-implementation counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationReport {
    pub name: String,
    /// Replies that were not equivalent, not normalized or unparseable
    pub errors: usize,
    /// Records written
    pub records: usize,
}

impl ImplementationReport {
    fn new(name: &str) -> Self {
        ImplementationReport {
            name: name.to_string(),
            errors: 0,
            records: 0,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every implementation went through the whole stream
    Completed,
    /// Stopped on user request
    Interrupted,
    /// An implementation stopped answering
    Failed {
        implementation: String,
        status: TerminationStatus,
    },
}

/// Result of [`BenchmarkDriver::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// One entry per implementation started, in run order
    pub reports: Vec<ImplementationReport>,
    pub status: RunStatus,
}

impl RunOutcome {
    pub fn total_errors(&self) -> usize {
        self.reports.iter().map(|r| r.errors).sum()
    }

    pub fn fatal_errors(&self) -> usize {
        usize::from(matches!(self.status, RunStatus::Failed { .. }))
    }

    pub fn report(&self, name: &str) -> Option<&ImplementationReport> {
        self.reports.iter().find(|r| r.name == name)
    }

    /// Completed with no error at all.
    pub fn success(&self) -> bool {
        self.status == RunStatus::Completed && self.total_errors() == 0
    }

    /// Turns a fatal failure into the corresponding error.
    pub fn into_result(self) -> BenchResult<RunOutcome> {
        match self.status {
            RunStatus::Failed {
                implementation,
                status,
            } => Err(BenchError::ImplementationDied {
                implementation,
                status,
            }),
            _ => Ok(self),
        }
    }
}

enum StreamEnd {
    Exhausted,
    Interrupted,
    Died,
}

pub struct BenchmarkDriver<'a> {
    launcher: &'a dyn Launcher,
    oracle: Option<&'a dyn EquivalenceOracle>,
    interrupt: Option<&'a AtomicBool>,
    label: String,
}

impl<'a> BenchmarkDriver<'a> {
    /// `label` names the formula stream in every record.
    pub fn new(launcher: &'a dyn Launcher, label: impl Into<String>) -> Self {
        BenchmarkDriver {
            launcher,
            oracle: None,
            interrupt: None,
            label: label.into(),
        }
    }

    /// Check every reply for equivalence with its input.
    pub fn with_oracle(mut self, oracle: &'a dyn EquivalenceOracle) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Stop before the next formula once `flag` is raised.
    pub fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    fn interrupted(&self) -> bool {
        self.interrupt.is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Run every implementation over `stream`, writing records to `sink`.
    pub fn run<R, S>(
        &self,
        stream: &mut R,
        implementations: &[ImplementationSpec],
        sink: &mut S,
    ) -> BenchResult<RunOutcome>
    where
        R: BufRead + Seek,
        S: RecordSink + ?Sized,
    {
        let mut reports = Vec::with_capacity(implementations.len());

        for spec in implementations {
            if self.interrupted() {
                return Ok(RunOutcome {
                    reports,
                    status: RunStatus::Interrupted,
                });
            }
            stream.seek(SeekFrom::Start(0))?;
            let mut normalizer = self.launcher.launch(spec)?;
            info!(implementation = %spec.name, command = %spec.command_line(), "starting");

            let mut report = ImplementationReport::new(&spec.name);
            let end = self.run_stream(stream, normalizer.as_mut(), sink, &mut report);

            let end = match end {
                Ok(end) => end,
                Err(e) => {
                    if let Err(shutdown) = normalizer.shutdown() {
                        warn!(implementation = %spec.name, "shutdown failed: {shutdown}");
                    }
                    return Err(e);
                }
            };

            match end {
                StreamEnd::Exhausted => {
                    normalizer.shutdown()?;
                    info!("Finished with {}: {} errors.", spec.name, report.errors);
                    reports.push(report);
                }
                StreamEnd::Interrupted => {
                    if let Err(e) = normalizer.shutdown() {
                        warn!(implementation = %spec.name, "shutdown failed: {e}");
                    }
                    warn!("Interrupted by the user with {} errors.", report.errors);
                    reports.push(report);
                    return Ok(RunOutcome {
                        reports,
                        status: RunStatus::Interrupted,
                    });
                }
                StreamEnd::Died => {
                    let status = normalizer.termination_status();
                    error!(
                        "Something went wrong during the execution of {} ({status}).",
                        spec.name
                    );
                    if let Err(e) = normalizer.shutdown() {
                        debug!(implementation = %spec.name, "shutdown after failure: {e}");
                    }
                    reports.push(report);
                    return Ok(RunOutcome {
                        reports,
                        status: RunStatus::Failed {
                            implementation: spec.name.clone(),
                            status,
                        },
                    });
                }
            }
        }

        Ok(RunOutcome {
            reports,
            status: RunStatus::Completed,
        })
    }

    fn run_stream<R, S>(
        &self,
        stream: &mut R,
        normalizer: &mut dyn Normalizer,
        sink: &mut S,
        report: &mut ImplementationReport,
    ) -> BenchResult<StreamEnd>
    where
        R: BufRead,
        S: RecordSink + ?Sized,
    {
        let mut line = String::new();
        let mut line_number = 0usize;

        loop {
            if self.interrupted() {
                return Ok(StreamEnd::Interrupted);
            }
            line.clear();
            if stream.read_line(&mut line)? == 0 {
                return Ok(StreamEnd::Exhausted);
            }
            line_number += 1;

            let text = line.trim_end();
            if text.is_empty() {
                continue;
            }
            let formula: Formula = text.parse().map_err(|e| {
                BenchError::Message(format!("{}:{line_number}: {e}", self.label))
            })?;
            let request = formula.to_string();
            info!("({line_number:4}) [{}] {text}", normalizer.name());

            let start = Instant::now();
            let reply = normalizer.query(&request)?;
            let elapsed = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);

            let Some(reply) = reply else {
                if self.interrupted() {
                    return Ok(StreamEnd::Interrupted);
                }
                return Ok(StreamEnd::Died);
            };

            let result = match reply.parse::<Formula>() {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(line = line_number, "---- unparseable reply {reply:?}: {e}");
                    report.errors += 1;
                    None
                }
            };

            if let Some(result) = &result {
                if !self.check_reply(&formula, result)? {
                    report.errors += 1;
                }
            }

            let record = ResultRecord::new(
                &self.label,
                text,
                normalizer.name(),
                elapsed,
                InputClassification::of(&formula),
                result.as_ref(),
            );
            sink.write(&record)?;
            report.records += 1;
        }
    }

    /// One error at most per reply; equivalence is checked first.
    fn check_reply(&self, input: &Formula, result: &Formula) -> BenchResult<bool> {
        if let Some(oracle) = self.oracle {
            if !oracle.equivalent(input, result)? {
                warn!("---- not equivalent {result}");
                return Ok(false);
            }
        }
        if !is_normalized(result) {
            warn!("---- not normalized {result}");
            return Ok(false);
        }
        Ok(true)
    }
}
