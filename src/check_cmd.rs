use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::bench::{resolve_implementations, select_implementations};
use crate::engine::{
    BenchmarkDriver, LtlfiltOracle, RunOutcome, RunStatus, install_handler, interrupt_flag,
};
use crate::implementation::{Launcher, ProcessLauncher};
use crate::storage::CsvRecordWriter;
use crate::{BenchError, BenchResult};

pub const DEFAULT_IMPLEMENTATIONS: &str = "owl,cpp";
pub const DEFAULT_OUTPUT: &str = "result.csv";

#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Formula file, one formula per line
    pub test: PathBuf,
    /// Comma-separated implementation names, run in this order
    pub imp: String,
    pub equiv_check: bool,
    pub ltlfilt: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
}

impl CheckOptions {
    pub fn new(test: impl Into<PathBuf>) -> Self {
        CheckOptions {
            test: test.into(),
            imp: DEFAULT_IMPLEMENTATIONS.to_string(),
            equiv_check: false,
            ltlfilt: PathBuf::from("ltlfilt"),
            output: PathBuf::from(DEFAULT_OUTPUT),
            config: None,
        }
    }
}

/// Runs the selected implementations over the test file with `launcher`,
/// writing one CSV row per formula and implementation.
pub fn execute(options: &CheckOptions, launcher: &dyn Launcher) -> BenchResult<RunOutcome> {
    let available = resolve_implementations(options.config.as_deref())?;
    let selected = select_implementations(&available, &options.imp);
    if selected.is_empty() {
        warn!("no implementation selected");
    }

    let file = File::open(&options.test).map_err(|e| {
        BenchError::Message(format!("cannot open {}: {e}", options.test.display()))
    })?;
    let mut stream = BufReader::new(file);
    let mut sink = CsvRecordWriter::create(&options.output)?;

    install_handler()?;
    let oracle = LtlfiltOracle::new(&options.ltlfilt);
    let mut driver = BenchmarkDriver::new(launcher, options.test.display().to_string())
        .with_interrupt(interrupt_flag());
    if options.equiv_check {
        driver = driver.with_oracle(&oracle);
    }

    let outcome = driver.run(&mut stream, &selected, &mut sink)?;
    info!(output = %options.output.display(), "results written");
    Ok(outcome)
}

/// `check`: fails unless every implementation went through the whole file
/// without a single error.
pub fn run(options: CheckOptions) -> BenchResult<()> {
    let outcome = execute(&options, &ProcessLauncher::new())?.into_result()?;
    match outcome.status {
        RunStatus::Interrupted => Err(BenchError::Message(format!(
            "interrupted by the user with {} errors",
            outcome.total_errors()
        ))),
        _ if outcome.total_errors() > 0 => Err(BenchError::Message(format!(
            "{} normalization errors",
            outcome.total_errors()
        ))),
        _ => Ok(()),
    }
}

/// `list`: prints the known implementations and their command lines.
pub fn list(config: Option<&Path>) -> BenchResult<()> {
    for spec in resolve_implementations(config)? {
        println!("{}\t{}", spec.name, spec.command_line());
    }
    Ok(())
}
