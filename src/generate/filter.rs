//! Filtering of formula files by size, normal-form status and duplicates.

use std::collections::HashSet;
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::classify::{
    NestingContext, is_delta_two_normalized, is_gf_normalized, is_normalized, tree_size,
};
use crate::formula::Formula;
use crate::{BenchError, BenchResult};

/// Normal form tested by `--normalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalClass {
    /// Boolean combination of recurrence and persistence formulas.
    #[default]
    Normal,
    /// Persistence formulas and `GF(guarantee)` blocks.
    Gf,
    /// The Δ₂ nesting discipline.
    Delta2,
}

impl NormalClass {
    pub fn holds(self, f: &Formula) -> bool {
        match self {
            NormalClass::Normal => is_normalized(f),
            NormalClass::Gf => is_gf_normalized(f),
            NormalClass::Delta2 => is_delta_two_normalized(f, NestingContext::None),
        }
    }
}

impl FromStr for NormalClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(NormalClass::Normal),
            "gf" => Ok(NormalClass::Gf),
            "delta2" => Ok(NormalClass::Delta2),
            other => Err(format!(
                "unknown normal form '{other}' (expected normal, gf or delta2)"
            )),
        }
    }
}

impl fmt::Display for NormalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NormalClass::Normal => "normal",
            NormalClass::Gf => "gf",
            NormalClass::Delta2 => "delta2",
        })
    }
}

/// Lenient boolean for command-line flags.
pub fn parse_bool_flag(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err(format!("boolean value expected, got '{s}'")),
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorpusFilter {
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub normalized: Option<bool>,
    pub class: NormalClass,
    pub no_dups: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub read: usize,
    pub kept: usize,
}

impl CorpusFilter {
    pub fn accepts(&self, f: &Formula) -> bool {
        if self.min.is_some() || self.max.is_some() {
            let size = tree_size(f);
            if self.max.is_some_and(|max| size > max) || self.min.is_some_and(|min| size < min) {
                return false;
            }
        }
        self.normalized.is_none_or(|wanted| self.class.holds(f) == wanted)
    }

    /// Copies the accepted lines of `input` to `output` unchanged.
    pub fn apply<R: BufRead, W: Write>(&self, input: R, mut output: W) -> BenchResult<FilterStats> {
        let mut seen = HashSet::new();
        let mut stats = FilterStats::default();

        for (index, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            stats.read += 1;

            let f: Formula = line
                .parse()
                .map_err(|e| BenchError::Message(format!("line {}: {e}", index + 1)))?;
            if !self.accepts(&f) {
                continue;
            }
            if self.no_dups && !seen.insert(line.clone()) {
                continue;
            }
            writeln!(output, "{line}")?;
            stats.kept += 1;
        }
        output.flush()?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(filter: &CorpusFilter, input: &str) -> (String, FilterStats) {
        let mut out = Vec::new();
        let stats = filter.apply(input.as_bytes(), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn test_size_bounds() {
        let filter = CorpusFilter {
            min: Some(2),
            max: Some(3),
            ..Default::default()
        };
        let (out, stats) = run(&filter, "a\nFa\na U b\nG(a U b)\n");
        assert_eq!(out, "Fa\na U b\n");
        assert_eq!(stats, FilterStats { read: 4, kept: 2 });
    }

    #[test]
    fn test_constants_do_not_count_towards_size() {
        let filter = CorpusFilter {
            max: Some(2),
            ..Default::default()
        };
        let (out, _) = run(&filter, "G1\nF(1 U 0)\nF(a U b)\n");
        assert_eq!(out, "G1\nF(1 U 0)\n");
    }

    #[test]
    fn test_normalized_by_class() {
        let input = "GFa\nG(a U b)\nFGFa\n";
        let normal = CorpusFilter {
            normalized: Some(true),
            ..Default::default()
        };
        assert_eq!(run(&normal, input).0, "GFa\nG(a U b)\n");

        let not_gf = CorpusFilter {
            normalized: Some(false),
            class: NormalClass::Gf,
            ..Default::default()
        };
        assert_eq!(run(&not_gf, input).0, "G(a U b)\nFGFa\n");

        let delta2 = CorpusFilter {
            normalized: Some(true),
            class: NormalClass::Delta2,
            ..Default::default()
        };
        assert_eq!(run(&delta2, input).0, "GFa\n");
    }

    #[test]
    fn test_duplicates_by_exact_text() {
        let filter = CorpusFilter {
            no_dups: true,
            ..Default::default()
        };
        let (out, stats) = run(&filter, "a U b\n\na U b\na  U b\n");
        assert_eq!(out, "a U b\na  U b\n");
        assert_eq!(stats, FilterStats { read: 3, kept: 2 });
    }

    #[test]
    fn test_bad_line_names_line_number() {
        let mut out = Vec::new();
        let err = CorpusFilter::default()
            .apply("a\n\n(a U\n".as_bytes(), &mut out)
            .unwrap_err();
        assert!(err.to_string().starts_with("line 3:"), "{err}");
    }

    #[test]
    fn test_parse_bool_flag() {
        for yes in ["yes", "True", "t", "Y", "1"] {
            assert_eq!(parse_bool_flag(yes), Ok(true));
        }
        for no in ["no", "FALSE", "f", "n", "0"] {
            assert_eq!(parse_bool_flag(no), Ok(false));
        }
        assert!(parse_bool_flag("maybe").is_err());
    }

    #[test]
    fn test_class_names() {
        for class in [NormalClass::Normal, NormalClass::Gf, NormalClass::Delta2] {
            assert_eq!(class.to_string().parse::<NormalClass>(), Ok(class));
        }
        assert!("sigma2".parse::<NormalClass>().is_err());
    }
}
