use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::bench::config::resolve_implementations;
use crate::core::EnvironmentInfo;
use crate::report::{Summary, SummaryDocument, SummaryInput, render_all, summarize, write_json};
use crate::storage::read_records_from_path;
use crate::BenchResult;

/// Summaries of the given result files; files without rows are reported and
/// skipped.
pub fn collect_summaries(inputs: &[String]) -> BenchResult<Vec<Summary>> {
    let mut summaries = Vec::with_capacity(inputs.len());
    for arg in inputs {
        let input = SummaryInput::parse(arg);
        let records = read_records_from_path(Path::new(&input.path))?;
        if records.is_empty() {
            println!("No data in {}.", input.path);
            continue;
        }
        summaries.push(summarize(&input.path, &records, input.ignore_normalized));
    }
    Ok(summaries)
}

/// Options of `summarize`.
#[derive(Debug, Clone, Default)]
pub struct SummarizeOptions {
    pub inputs: Vec<String>,
    /// JSON output file
    pub output: Option<PathBuf>,
    /// Implementation table whose command lines go into the JSON document
    pub config: Option<PathBuf>,
    pub ltlfilt: Option<PathBuf>,
}

/// Benchmark setup of the implementations appearing in `summaries`.
pub fn environment(summaries: &[Summary], options: &SummarizeOptions) -> BenchResult<EnvironmentInfo> {
    let table = resolve_implementations(options.config.as_deref())?;
    let mut used: Vec<&str> = Vec::new();
    for name in summaries.iter().flat_map(|s| &s.implementations) {
        if !used.contains(&name.as_str()) {
            used.push(name);
        }
    }
    let mut env = EnvironmentInfo::for_implementations(&table, used).with_machine();
    if let Some(ltlfilt) = &options.ltlfilt {
        env = env.with_ltlfilt(ltlfilt);
    }
    Ok(env)
}

/// `summarize`: prints a report per result file and optionally writes all
/// summaries as JSON.
pub fn run(options: SummarizeOptions) -> BenchResult<()> {
    let summaries = collect_summaries(&options.inputs)?;
    if !summaries.is_empty() {
        print!("{}", render_all(&summaries, std::io::stdout().is_terminal()));
    }

    if let Some(path) = &options.output {
        let env = environment(&summaries, &options)?;
        let document = SummaryDocument::new(summaries, env);
        write_json(path, &document)?;
        info!(path = %path.display(), "summary written");
    }
    Ok(())
}
