//! Seeded random formulas of a fixed size.
//!
//! Sizes count every node including constants, so size 1 is a leaf, size 2
//! a unary operator over a leaf, and a binary operator of size `n` splits
//! the remaining `n - 1` nodes between its operands.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::formula::{Formula, Kind};

pub const DEFAULT_SEED: u64 = 31788;
pub const DEFAULT_PROPOSITIONS: [&str; 4] = ["a", "b", "c", "d"];

// Consecutive duplicates after which the formula space is taken as exhausted.
const MAX_DUPLICATE_DRAWS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
enum Leaf {
    Ap,
    True,
    False,
}

const LEAVES: [(Leaf, u32); 3] = [(Leaf::Ap, 3), (Leaf::True, 1), (Leaf::False, 1)];

const UNARY: [Kind; 3] = [Kind::X, Kind::F, Kind::G];

const BINARY: [Kind; 6] = [Kind::And, Kind::Or, Kind::U, Kind::W, Kind::R, Kind::M];

/// Endless stream of distinct random formulas of exactly `size` nodes.
///
/// The stream ends early only when `size` admits too few distinct formulas.
pub struct RandomFormulas {
    rng: StdRng,
    size: usize,
    propositions: Vec<String>,
    seen: HashSet<Formula>,
}

impl RandomFormulas {
    pub fn new(size: usize, seed: u64) -> Self {
        Self::with_propositions(size, seed, &DEFAULT_PROPOSITIONS)
    }

    pub fn with_propositions(size: usize, seed: u64, propositions: &[&str]) -> Self {
        RandomFormulas {
            rng: StdRng::seed_from_u64(seed),
            size: size.max(1),
            propositions: propositions.iter().map(|p| p.to_string()).collect(),
            seen: HashSet::new(),
        }
    }

    fn pick_leaf(&mut self) -> Leaf {
        let total: u32 = LEAVES.iter().map(|(_, w)| w).sum();
        let mut ticket = self.rng.gen_range(0..total);
        for (leaf, weight) in LEAVES {
            if ticket < weight {
                return leaf;
            }
            ticket -= weight;
        }
        Leaf::Ap
    }

    fn leaf(&mut self) -> Formula {
        match self.pick_leaf() {
            Leaf::Ap if !self.propositions.is_empty() => {
                let i = self.rng.gen_range(0..self.propositions.len());
                Formula::ap(&self.propositions[i])
            }
            Leaf::True | Leaf::Ap => Formula::tt(),
            Leaf::False => Formula::ff(),
        }
    }

    fn draw(&mut self, size: usize) -> Formula {
        match size {
            0 | 1 => self.leaf(),
            2 => {
                let kind = UNARY[self.rng.gen_range(0..UNARY.len())];
                Formula::with_children(kind, vec![self.leaf()])
            }
            _ => {
                let pick = self.rng.gen_range(0..UNARY.len() + BINARY.len());
                if pick < UNARY.len() {
                    let arg = self.draw(size - 1);
                    Formula::with_children(UNARY[pick], vec![arg])
                } else {
                    let left_size = self.rng.gen_range(1..=size - 2);
                    let left = self.draw(left_size);
                    let right = self.draw(size - 1 - left_size);
                    Formula::with_children(BINARY[pick - UNARY.len()], vec![left, right])
                }
            }
        }
    }
}

impl Iterator for RandomFormulas {
    type Item = Formula;

    fn next(&mut self) -> Option<Formula> {
        for _ in 0..MAX_DUPLICATE_DRAWS {
            let f = self.draw(self.size);
            if self.seen.insert(f.clone()) {
                return Some(f);
            }
        }
        tracing::warn!(
            size = self.size,
            drawn = self.seen.len(),
            "random formula space exhausted"
        );
        None
    }
}
