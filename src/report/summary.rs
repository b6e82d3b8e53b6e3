//! Per-implementation statistics over a set of result records.
//!
//! Records are grouped by implementation in order of first appearance and
//! aligned by formula: the n-th occurrence of a (file, formula) pair for one
//! implementation is matched with the n-th occurrence for every other one.
//! Only formulas answered by every implementation are summarized.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::schema::ResultRecord;

/// Statistics of one implementation. Percentages are in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationSummary {
    pub name: String,
    /// Formulas on which it was (one of) the fastest
    pub fastest: f64,
    /// Sum of round-trip times in milliseconds
    pub total_time_ms: f64,
    /// Formulas on which its output was (one of) the smallest
    pub smallest_formula: f64,
    /// Formulas on which its output was smaller than every other one
    pub strictly_smallest: f64,
    pub mean_blowup: Option<f64>,
    pub median_blowup: Option<f64>,
    pub worst_blowup: Option<f64>,
    pub mean_blowup_dag: Option<f64>,
    pub median_blowup_dag: Option<f64>,
    pub worst_blowup_dag: Option<f64>,
    /// Outputs not in GF-normal form
    pub not_gfnorm: f64,
    /// Outputs not in Δ₂
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Result file the records come from
    pub file: String,
    #[serde(default)]
    pub filters: Vec<String>,
    pub implementations: Vec<String>,
    /// Number of formulas summarized
    pub formulae: usize,
    pub already_normalized: f64,
    pub already_gfnorm: f64,
    pub per_implementation: Vec<ImplementationSummary>,
}

impl Summary {
    pub fn implementation(&self, name: &str) -> Option<&ImplementationSummary> {
        self.per_implementation.iter().find(|s| s.name == name)
    }
}

/// A result file as named on the command line; a leading `#` asks to skip
/// formulas that were normalized before the transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryInput {
    pub path: String,
    pub ignore_normalized: bool,
}

impl SummaryInput {
    pub fn parse(arg: &str) -> Self {
        match arg.strip_prefix('#') {
            Some(path) => SummaryInput {
                path: path.to_string(),
                ignore_normalized: true,
            },
            None => SummaryInput {
                path: arg.to_string(),
                ignore_normalized: false,
            },
        }
    }
}

fn percent(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * hits as f64 / total as f64
    }
}

struct Ratios(Vec<f64>);

impl Ratios {
    fn collect(rows: impl Iterator<Item = (Option<u64>, u64)>) -> Ratios {
        let mut values: Vec<f64> = rows
            .filter(|(_, init)| *init > 0)
            .filter_map(|(fin, init)| fin.map(|f| f as f64 / init as f64))
            .collect();
        values.sort_by(f64::total_cmp);
        Ratios(values)
    }

    fn mean(&self) -> Option<f64> {
        (!self.0.is_empty()).then(|| self.0.iter().sum::<f64>() / self.0.len() as f64)
    }

    fn median(&self) -> Option<f64> {
        let n = self.0.len();
        match n {
            0 => None,
            _ if n % 2 == 0 => Some((self.0[n / 2 - 1] + self.0[n / 2]) / 2.0),
            _ => Some(self.0[n / 2]),
        }
    }

    fn max(&self) -> Option<f64> {
        self.0.last().copied()
    }
}

/// Align records into rows with one record per implementation.
fn align(records: &[ResultRecord]) -> (Vec<String>, Vec<Vec<&ResultRecord>>) {
    let mut implementations: Vec<String> = Vec::new();
    for r in records {
        if !implementations.contains(&r.imp) {
            implementations.push(r.imp.clone());
        }
    }
    let Some(first) = implementations.first().cloned() else {
        return (implementations, Vec::new());
    };

    let mut occurrences: HashMap<(&str, &str, &str), usize> = HashMap::new();
    let mut by_key: HashMap<(&str, &str, &str, usize), &ResultRecord> = HashMap::new();
    let mut order: Vec<(&str, &str, usize)> = Vec::new();
    for r in records {
        let seen = occurrences
            .entry((r.imp.as_str(), r.file.as_str(), r.formula.as_str()))
            .or_insert(0);
        by_key.insert((r.imp.as_str(), r.file.as_str(), r.formula.as_str(), *seen), r);
        if r.imp == first {
            order.push((r.file.as_str(), r.formula.as_str(), *seen));
        }
        *seen += 1;
    }

    let rows = order
        .into_iter()
        .filter_map(|(file, formula, nth)| {
            implementations
                .iter()
                .map(|imp| by_key.get(&(imp.as_str(), file, formula, nth)).copied())
                .collect::<Option<Vec<_>>>()
        })
        .collect();
    (implementations, rows)
}

/// Summarize the records of one result file.
pub fn summarize(file: &str, records: &[ResultRecord], ignore_normalized: bool) -> Summary {
    let (implementations, mut rows) = align(records);
    if ignore_normalized {
        rows.retain(|row| !row[0].already_normal);
    }
    let total = rows.len();
    let count = |pred: &dyn Fn(&[&ResultRecord]) -> bool| rows.iter().filter(|r| pred(r)).count();

    let per_implementation = implementations
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let fastest = count(&|row| {
                let min = row.iter().map(|r| r.time).min();
                Some(row[i].time) == min
            });
            let smallest = count(&|row| {
                let min = row.iter().filter_map(|r| r.fin_size).min();
                row[i].fin_size.is_some() && row[i].fin_size == min
            });
            let strictly = count(&|row| match row[i].fin_size {
                Some(own) => row
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .all(|(_, r)| r.fin_size.is_some_and(|other| other > own)),
                None => false,
            });
            let tree = Ratios::collect(rows.iter().map(|row| (row[i].fin_size, row[i].init_size)));
            let dag = Ratios::collect(
                rows.iter()
                    .map(|row| (row[i].fin_dagsize, row[i].init_dagsize)),
            );

            ImplementationSummary {
                name: name.clone(),
                fastest: percent(fastest, total),
                total_time_ms: rows.iter().map(|row| row[i].time as f64).sum::<f64>() / 1e6,
                smallest_formula: percent(smallest, total),
                strictly_smallest: percent(strictly, total),
                mean_blowup: tree.mean(),
                median_blowup: tree.median(),
                worst_blowup: tree.max(),
                mean_blowup_dag: dag.mean(),
                median_blowup_dag: dag.median(),
                worst_blowup_dag: dag.max(),
                not_gfnorm: percent(count(&|row| !row[i].final_gfnorm), total),
                errors: count(&|row| !row[i].final_normal),
            }
        })
        .collect();

    Summary {
        file: file.to_string(),
        filters: if ignore_normalized {
            vec!["not-normalized".to_string()]
        } else {
            Vec::new()
        },
        implementations,
        formulae: total,
        already_normalized: percent(count(&|row| row[0].already_normal), total),
        already_gfnorm: percent(count(&|row| row[0].already_gfnorm), total),
        per_implementation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(imp: &str, formula: &str, time: u64, init: u64, fin: Option<u64>) -> ResultRecord {
        ResultRecord {
            file: "t.ltl".into(),
            formula: formula.into(),
            already_normal: formula.starts_with('n'),
            already_gfnorm: false,
            imp: imp.into(),
            time,
            init_size: init,
            init_dagsize: init,
            fin_size: fin,
            fin_dagsize: fin,
            final_normal: fin.is_some(),
            final_gfnorm: fin.is_some_and(|s| s % 2 == 0),
        }
    }

    #[test]
    fn test_strictly_smaller_everywhere() {
        let records = vec![
            record("A", "f1", 10, 4, Some(4)),
            record("A", "f2", 10, 4, Some(6)),
            record("B", "f1", 5, 4, Some(5)),
            record("B", "f2", 5, 4, Some(8)),
        ];
        let summary = summarize("t.csv", &records, false);
        let a = summary.implementation("A").unwrap();
        let b = summary.implementation("B").unwrap();

        assert_eq!(summary.implementations, vec!["A", "B"]);
        assert_eq!(summary.formulae, 2);
        assert_eq!(a.strictly_smallest, 100.0);
        assert_eq!(b.strictly_smallest, 0.0);
        assert_eq!(a.smallest_formula, 100.0);
        assert_eq!(a.fastest, 0.0);
        assert_eq!(b.fastest, 100.0);
    }

    #[test]
    fn test_ties_count_for_every_tied_implementation() {
        let records = vec![
            record("A", "f1", 7, 4, Some(3)),
            record("B", "f1", 7, 4, Some(3)),
        ];
        let summary = summarize("t.csv", &records, false);
        for s in &summary.per_implementation {
            assert_eq!(s.fastest, 100.0);
            assert_eq!(s.smallest_formula, 100.0);
            assert_eq!(s.strictly_smallest, 0.0);
        }
    }

    #[test]
    fn test_blowup_statistics() {
        let records = vec![
            record("A", "f1", 1_000_000, 2, Some(2)),
            record("A", "f2", 2_000_000, 2, Some(6)),
            record("A", "f3", 3_000_000, 4, Some(8)),
            // zero input size and missing output are left out of the ratios
            record("A", "f4", 0, 0, Some(1)),
            record("A", "f5", 0, 3, None),
        ];
        let summary = summarize("t.csv", &records, false);
        let a = &summary.per_implementation[0];

        assert_eq!(a.mean_blowup, Some(2.0));
        assert_eq!(a.median_blowup, Some(2.0));
        assert_eq!(a.worst_blowup, Some(3.0));
        assert_eq!(a.worst_blowup_dag, Some(3.0));
        assert!((a.total_time_ms - 6.0).abs() < 1e-9);
        assert_eq!(a.errors, 1);
    }

    #[test]
    fn test_ignore_normalized_inputs() {
        let records = vec![
            record("A", "n1", 1, 1, Some(1)),
            record("A", "f1", 1, 1, Some(1)),
            record("B", "n1", 1, 1, Some(1)),
            record("B", "f1", 1, 1, Some(1)),
        ];
        let all = summarize("t.csv", &records, false);
        assert_eq!(all.formulae, 2);
        assert_eq!(all.already_normalized, 50.0);

        let filtered = summarize("t.csv", &records, true);
        assert_eq!(filtered.formulae, 1);
        assert_eq!(filtered.already_normalized, 0.0);
        assert_eq!(filtered.filters, vec!["not-normalized"]);
    }

    #[test]
    fn test_rows_missing_for_some_implementation_are_dropped() {
        // B died after the first formula
        let records = vec![
            record("A", "f1", 1, 2, Some(2)),
            record("A", "f2", 1, 2, Some(2)),
            record("B", "f1", 1, 2, Some(2)),
        ];
        let summary = summarize("t.csv", &records, false);
        assert_eq!(summary.formulae, 1);
    }

    #[test]
    fn test_repeated_formulas_are_matched_by_occurrence() {
        let records = vec![
            record("A", "f1", 1, 2, Some(2)),
            record("A", "f1", 1, 2, Some(4)),
            record("B", "f1", 1, 2, Some(3)),
            record("B", "f1", 1, 2, Some(3)),
        ];
        let summary = summarize("t.csv", &records, false);
        assert_eq!(summary.formulae, 2);
        assert_eq!(summary.implementation("A").unwrap().strictly_smallest, 50.0);
        assert_eq!(summary.implementation("B").unwrap().strictly_smallest, 50.0);
    }

    #[test]
    fn test_empty_input() {
        let summary = summarize("t.csv", &[], false);
        assert!(summary.implementations.is_empty());
        assert_eq!(summary.formulae, 0);
        assert_eq!(summary.already_normalized, 0.0);
    }

    #[test]
    fn test_summary_input_prefix() {
        assert_eq!(
            SummaryInput::parse("#out.csv"),
            SummaryInput {
                path: "out.csv".into(),
                ignore_normalized: true
            }
        );
        assert!(!SummaryInput::parse("out.csv").ignore_normalized);
    }
}
