use std::io::{BufWriter, Write};

use tracing::debug;

use crate::BenchResult;
use crate::generate::{GeneratorOptions, Method, generator};

/// Writes the generated formulas to `out`, one per line, and returns how
/// many were written.
pub fn write_formulas<W: Write>(
    method: Method,
    options: &GeneratorOptions,
    out: W,
) -> BenchResult<usize> {
    let mut out = BufWriter::new(out);
    let mut written = 0;
    for formula in generator(method, options) {
        writeln!(out, "{}", formula?)?;
        written += 1;
    }
    out.flush()?;
    debug!(%method, written, "formulas generated");
    Ok(written)
}

/// `generate`: prints a test file on stdout.
pub fn run(method: Method, options: GeneratorOptions) -> BenchResult<()> {
    write_formulas(method, &options, std::io::stdout().lock())?;
    Ok(())
}
