use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use tracing::debug;

use crate::generate::CorpusFilter;
use crate::{BenchError, BenchResult};

/// `filter`: prints the lines of `source` accepted by `filter`.
pub fn run(source: PathBuf, filter: CorpusFilter) -> BenchResult<()> {
    let file = File::open(&source)
        .map_err(|e| BenchError::Message(format!("cannot open {}: {e}", source.display())))?;
    let stats = filter
        .apply(BufReader::new(file), std::io::stdout().lock())
        .map_err(|e| match e {
            BenchError::Message(m) => BenchError::Message(format!("{}: {m}", source.display())),
            other => other,
        })?;
    debug!(read = stats.read, kept = stats.kept, "filtered {}", source.display());
    Ok(())
}
