//! Logical equivalence checks between an input formula and its normal form.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::formula::Formula;
use crate::{BenchError, BenchResult};

/// Decides whether two formulas denote the same language.
pub trait EquivalenceOracle {
    fn equivalent(&self, left: &Formula, right: &Formula) -> BenchResult<bool>;
}

impl<F> EquivalenceOracle for F
where
    F: Fn(&Formula, &Formula) -> BenchResult<bool>,
{
    fn equivalent(&self, left: &Formula, right: &Formula) -> BenchResult<bool> {
        self(left, right)
    }
}

/// Equivalence through Spot's `ltlfilt`.
///
/// `ltlfilt -q -f A --equivalent-to B` exits with 0 when `A` is kept, i.e.
/// equivalent to `B`, and with 1 when it is filtered out.
#[derive(Debug, Clone)]
pub struct LtlfiltOracle {
    program: PathBuf,
}

impl Default for LtlfiltOracle {
    fn default() -> Self {
        LtlfiltOracle {
            program: PathBuf::from("ltlfilt"),
        }
    }
}

impl LtlfiltOracle {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        LtlfiltOracle {
            program: program.into(),
        }
    }

    fn command(&self, left: &Formula, right: &Formula) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-q")
            .arg("-f")
            .arg(left.to_string())
            .arg("--equivalent-to")
            .arg(right.to_string())
            .stdin(Stdio::null());
        cmd
    }
}

impl EquivalenceOracle for LtlfiltOracle {
    fn equivalent(&self, left: &Formula, right: &Formula) -> BenchResult<bool> {
        let output = self.command(left, right).output().map_err(|e| {
            BenchError::Message(format!("failed to run {}: {e}", self.program.display()))
        })?;
        debug!(status = ?output.status, "ltlfilt finished");
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(BenchError::Message(format!(
                "{} failed ({}): {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}
