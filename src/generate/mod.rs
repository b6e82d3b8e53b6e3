//! Test-case generation.
//!
//! - `families`: the `hard` and `uw` parametric families
//! - `random`: seeded random formulas of fixed size
//! - `tlsf`: specifications of a TLSF benchmark tree via syfco
//! - `filter`: selection of lines from an existing formula file

pub mod families;
pub mod filter;
pub mod random;
pub mod tlsf;

use std::fmt;
use std::str::FromStr;

use crate::BenchResult;
use crate::classify::is_gf_normalized;
use crate::formula::Formula;

pub use families::{HardFamily, UwFamily};
pub use filter::{CorpusFilter, FilterStats, NormalClass, parse_bool_flag};
pub use random::RandomFormulas;
pub use tlsf::TlsfSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Random,
    RandomNorm,
    RandomNotNorm,
    Hard,
    Uw,
    Tlsf,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::Random,
        Method::RandomNorm,
        Method::RandomNotNorm,
        Method::Hard,
        Method::Uw,
        Method::Tlsf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Method::Random => "random",
            Method::RandomNorm => "random_norm",
            Method::RandomNotNorm => "random_notnorm",
            Method::Hard => "hard",
            Method::Uw => "uw",
            Method::Tlsf => "tlsf",
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Method::ALL.iter().map(|m| m.name()).collect();
                format!("unknown method '{s}' (expected one of {})", names.join(", "))
            })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Number of formulas.
    pub count: usize,
    /// Size of random formulas.
    pub size: usize,
    pub seed: u64,
    pub tlsf: TlsfSource,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            count: 50,
            size: 15,
            seed: random::DEFAULT_SEED,
            tlsf: TlsfSource::default(),
        }
    }
}

pub type FormulaStream = Box<dyn Iterator<Item = BenchResult<Formula>>>;

/// Fresh lazy stream of at most `options.count` formulas; calling it again
/// restarts the sequence.
pub fn generator(method: Method, options: &GeneratorOptions) -> FormulaStream {
    let random = || RandomFormulas::new(options.size, options.seed);
    let stream: FormulaStream = match method {
        Method::Random => Box::new(random().map(Ok)),
        Method::RandomNorm => Box::new(random().filter(is_gf_normalized).map(Ok)),
        Method::RandomNotNorm => Box::new(random().filter(|f| !is_gf_normalized(f)).map(Ok)),
        Method::Hard => Box::new(HardFamily::new().map(Ok)),
        Method::Uw => Box::new(UwFamily::new().map(Ok)),
        Method::Tlsf => options.tlsf.formulas(),
    };
    Box::new(stream.take(options.count))
}
