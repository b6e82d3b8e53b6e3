//! Structural size metrics.

use std::collections::{HashMap, HashSet};

use crate::formula::Formula;

/// Number of nodes counting every occurrence of a shared subformula, with
/// constants counting zero.
pub fn tree_size(f: &Formula) -> u64 {
    let mut sizes: HashMap<&Formula, u64> = HashMap::new();
    let mut stack = vec![(f, false)];

    while let Some((g, expanded)) = stack.pop() {
        if sizes.contains_key(g) {
            continue;
        }
        if g.is_constant() {
            sizes.insert(g, 0);
            continue;
        }
        if !expanded {
            stack.push((g, true));
            stack.extend(g.children().iter().map(|c| (c, false)));
            continue;
        }
        let size = g
            .children()
            .iter()
            .map(|c| sizes.get(c).copied().unwrap_or(0))
            .fold(1u64, u64::saturating_add);
        sizes.insert(g, size);
    }
    sizes.get(f).copied().unwrap_or(0)
}

/// Number of distinct subformulas reachable from `f`, constants excluded.
pub fn dag_size(f: &Formula) -> u64 {
    let mut seen: HashSet<&Formula> = HashSet::new();
    let mut stack = vec![f];

    while let Some(g) = stack.pop() {
        if g.is_constant() || !seen.insert(g) {
            continue;
        }
        stack.extend(g.children());
    }
    seen.len() as u64
}
