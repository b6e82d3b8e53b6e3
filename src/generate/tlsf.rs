//! LTL specifications extracted from a TLSF benchmark tree with syfco.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::formula::Formula;
use crate::{BenchError, BenchResult};

pub const DEFAULT_TLSF_DIR: &str = "tests/TLSF_2021/benchmarks";
pub const DEFAULT_SYFCO: &str = "scripts/syfco";

/// Runs syfco over every file of a benchmark directory.
#[derive(Debug, Clone)]
pub struct TlsfSource {
    pub directory: PathBuf,
    pub syfco: PathBuf,
}

impl Default for TlsfSource {
    fn default() -> Self {
        TlsfSource {
            directory: PathBuf::from(DEFAULT_TLSF_DIR),
            syfco: PathBuf::from(DEFAULT_SYFCO),
        }
    }
}

impl TlsfSource {
    pub fn new(directory: impl Into<PathBuf>, syfco: impl Into<PathBuf>) -> Self {
        TlsfSource {
            directory: directory.into(),
            syfco: syfco.into(),
        }
    }

    /// Benchmark files in name order.
    pub fn files(&self) -> BenchResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.directory).map_err(|e| {
            BenchError::Generator(format!(
                "cannot list TLSF directory {}: {e}",
                self.directory.display()
            ))
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// The whole specification of `file` as a single formula in negation
    /// normal form.
    pub fn convert(&self, file: &Path) -> BenchResult<Formula> {
        let output = Command::new(&self.syfco)
            .arg(file)
            .args(["-f", "ltlxba", "-m", "fully"])
            .output()
            .map_err(|e| {
                BenchError::Generator(format!(
                    "failed to launch syfco at {}: {e}",
                    self.syfco.display()
                ))
            })?;
        if !output.status.success() {
            return Err(BenchError::Generator(format!(
                "syfco failed on {}: {}",
                file.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let formula: Formula = text.trim().parse().map_err(|e| {
            BenchError::Generator(format!("syfco output for {}: {e}", file.display()))
        })?;
        Ok(formula.negative_normal_form())
    }

    /// Lazily converts each benchmark; a listing failure is the only item.
    pub fn formulas(&self) -> Box<dyn Iterator<Item = BenchResult<Formula>>> {
        match self.files() {
            Ok(files) => {
                let source = self.clone();
                Box::new(files.into_iter().map(move |file| {
                    tracing::debug!(file = %file.display(), "converting TLSF specification");
                    source.convert(&file)
                }))
            }
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}
