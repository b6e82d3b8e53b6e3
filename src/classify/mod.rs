//! Syntactic normal-form classification.
//!
//! All predicates are pure and total over [`Formula`]. Traversals use an
//! explicit work list since test families nest operators without bound.

pub mod metrics;

use crate::formula::{Formula, Kind};

pub use metrics::{dag_size, tree_size};

/// Position of a subformula relative to the temporal operators above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NestingContext {
    None,
    InsideG,
    InsideU,
    InsideW,
}

/// Operand of a "globally" shape: `G x`, `x W false` or `false R x`.
pub fn as_g(f: &Formula) -> Option<&Formula> {
    let c = f.children();
    match f.kind() {
        Kind::G => Some(&c[0]),
        Kind::W if c[1].is_ff() => Some(&c[0]),
        Kind::R if c[0].is_ff() => Some(&c[1]),
        _ => None,
    }
}

/// Operand of an "eventually" shape: `F x`, `x M true` or `true U x`.
pub fn as_f(f: &Formula) -> Option<&Formula> {
    let c = f.children();
    match f.kind() {
        Kind::F => Some(&c[0]),
        Kind::M if c[1].is_tt() => Some(&c[0]),
        Kind::U if c[0].is_tt() => Some(&c[1]),
        _ => None,
    }
}

/// Operand `h` of a `G(F(h))` shape.
pub fn as_gf(f: &Formula) -> Option<&Formula> {
    as_g(f).and_then(as_f)
}

/// Whether `f` respects the Δ₂ nesting discipline starting from `ctx`: a
/// single top-level `GF` block, no U-family operator below a W-family one and
/// no W-family operator inside a `GF` block.
pub fn is_delta_two_normalized(f: &Formula, ctx: NestingContext) -> bool {
    let mut pending = vec![(f, ctx)];

    while let Some((g, ctx)) = pending.pop() {
        if let Some(h) = as_gf(g) {
            if ctx != NestingContext::None {
                return false;
            }
            pending.push((h, NestingContext::InsideG));
            continue;
        }

        let child_ctx = match g.kind() {
            Kind::U | Kind::F | Kind::M => {
                if ctx == NestingContext::InsideW {
                    return false;
                }
                match ctx {
                    NestingContext::None => NestingContext::InsideU,
                    deeper => deeper,
                }
            }
            Kind::W | Kind::G | Kind::R => {
                if ctx == NestingContext::InsideG {
                    return false;
                }
                NestingContext::InsideW
            }
            _ => ctx,
        };
        pending.extend(g.children().iter().map(|c| (c, child_ctx)));
    }
    true
}

/// Whether `f` is a boolean combination of persistence formulas and
/// `GF(guarantee)` blocks.
pub fn is_gf_normalized(f: &Formula) -> bool {
    let mut pending = vec![f];

    while let Some(g) = pending.pop() {
        if g.kind().is_junction() {
            pending.extend(g.children());
            continue;
        }
        let accepted = g.is_syntactic_persistence()
            || as_gf(g).is_some_and(Formula::is_syntactic_guarantee);
        if !accepted {
            return false;
        }
    }
    true
}

/// Whether `f` is a boolean combination of persistence and recurrence
/// formulas, i.e. syntactically in Δ₂.
pub fn is_normalized(f: &Formula) -> bool {
    let mut pending = vec![f];

    while let Some(g) = pending.pop() {
        if g.is_syntactic_persistence() || g.is_syntactic_recurrence() {
            continue;
        }
        if !g.kind().is_junction() {
            return false;
        }
        pending.extend(g.children());
    }
    true
}
