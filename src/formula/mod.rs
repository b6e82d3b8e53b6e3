//! Interned LTL formulas.
//!
//! A [`Formula`] is an immutable operator tree whose nodes are hash-consed:
//! building the same kind over the same children twice yields the same node,
//! so equality and hashing are by identity. Every node also carries its
//! syntactic classes (guarantee, safety, recurrence, persistence), computed
//! bottom-up when the node is created.
//!
//! The text syntax accepted by [`Formula::from_str`](std::str::FromStr) and
//! produced by `Display` is the infix syntax exchanged with normalizers
//! (`G(a U b) | F!c`, `(a W b) M c`, `GFa`, ...).

mod intern;
mod nnf;
mod parse;
mod print;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use parse::ParseError;

/// Operator of a formula node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Tt,
    Ff,
    Ap,
    Not,
    And,
    Or,
    Implies,
    Equiv,
    Xor,
    X,
    F,
    G,
    U,
    W,
    R,
    M,
}

impl Kind {
    /// Number of children, or `None` for the n-ary junctions.
    pub fn arity(self) -> Option<usize> {
        match self {
            Kind::Tt | Kind::Ff | Kind::Ap => Some(0),
            Kind::Not | Kind::X | Kind::F | Kind::G => Some(1),
            Kind::Implies | Kind::Equiv | Kind::Xor => Some(2),
            Kind::U | Kind::W | Kind::R | Kind::M => Some(2),
            Kind::And | Kind::Or => None,
        }
    }

    pub fn is_constant(self) -> bool {
        matches!(self, Kind::Tt | Kind::Ff)
    }

    /// Conjunction or disjunction.
    pub fn is_junction(self) -> bool {
        matches!(self, Kind::And | Kind::Or)
    }
}

/// Syntactic classes of the temporal hierarchy a formula belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntacticClasses {
    pub guarantee: bool,
    pub safety: bool,
    pub recurrence: bool,
    pub persistence: bool,
}

impl SyntacticClasses {
    pub const ALL: SyntacticClasses = SyntacticClasses {
        guarantee: true,
        safety: true,
        recurrence: true,
        persistence: true,
    };

    /// Classes of the negation.
    pub fn dual(self) -> Self {
        SyntacticClasses {
            guarantee: self.safety,
            safety: self.guarantee,
            recurrence: self.persistence,
            persistence: self.recurrence,
        }
    }

    pub fn meet(self, other: Self) -> Self {
        SyntacticClasses {
            guarantee: self.guarantee && other.guarantee,
            safety: self.safety && other.safety,
            recurrence: self.recurrence && other.recurrence,
            persistence: self.persistence && other.persistence,
        }
    }

    fn derive(kind: Kind, children: &[Formula]) -> Self {
        let arg = |i: usize| children[i].classes();
        match kind {
            Kind::Tt | Kind::Ff | Kind::Ap => Self::ALL,
            Kind::Not => arg(0).dual(),
            Kind::X => arg(0),
            Kind::And | Kind::Or => children
                .iter()
                .fold(Self::ALL, |acc, c| acc.meet(c.classes())),
            Kind::Implies => arg(0).dual().meet(arg(1)),
            Kind::Equiv | Kind::Xor => {
                let (a, b) = (arg(0), arg(1));
                a.meet(a.dual()).meet(b).meet(b.dual())
            }
            Kind::F => {
                let a = arg(0);
                SyntacticClasses {
                    guarantee: a.guarantee,
                    safety: false,
                    recurrence: a.guarantee,
                    persistence: a.persistence,
                }
            }
            Kind::G => {
                let a = arg(0);
                SyntacticClasses {
                    guarantee: false,
                    safety: a.safety,
                    recurrence: a.recurrence,
                    persistence: a.safety,
                }
            }
            Kind::U => {
                let (a, b) = (arg(0), arg(1));
                SyntacticClasses {
                    guarantee: a.guarantee && b.guarantee,
                    safety: false,
                    recurrence: a.recurrence && b.guarantee,
                    persistence: a.persistence && b.persistence,
                }
            }
            Kind::M => {
                let (a, b) = (arg(0), arg(1));
                SyntacticClasses {
                    guarantee: a.guarantee && b.guarantee,
                    safety: false,
                    recurrence: a.guarantee && b.recurrence,
                    persistence: a.persistence && b.persistence,
                }
            }
            Kind::R => {
                let (a, b) = (arg(0), arg(1));
                SyntacticClasses {
                    guarantee: false,
                    safety: a.safety && b.safety,
                    recurrence: a.recurrence && b.recurrence,
                    persistence: a.persistence && b.safety,
                }
            }
            Kind::W => {
                let (a, b) = (arg(0), arg(1));
                SyntacticClasses {
                    guarantee: false,
                    safety: a.safety && b.safety,
                    recurrence: a.recurrence && b.recurrence,
                    persistence: a.safety && b.persistence,
                }
            }
        }
    }
}

pub(crate) struct Node {
    kind: Kind,
    name: Option<Box<str>>,
    children: Box<[Formula]>,
    classes: SyntacticClasses,
}

// Unlinks uniquely owned descendants one at a time so that dropping a deep
// formula does not recurse once per level.
impl Drop for Node {
    fn drop(&mut self) {
        let mut orphans: Vec<Formula> = std::mem::take(&mut self.children).into_vec();
        while let Some(Formula(node)) = orphans.pop() {
            if let Ok(mut node) = Arc::try_unwrap(node) {
                orphans.extend(std::mem::take(&mut node.children).into_vec());
            }
        }
    }
}

/// Shared handle to an interned formula node.
#[derive(Clone)]
pub struct Formula(Arc<Node>);

impl Formula {
    fn make(kind: Kind, name: Option<&str>, children: Vec<Formula>) -> Formula {
        debug_assert!(kind.arity().is_none_or(|n| n == children.len()));
        intern::intern(kind, name, children)
    }

    fn junction(kind: Kind, operands: Vec<Formula>) -> Formula {
        let mut flat = Vec::with_capacity(operands.len());
        for op in operands {
            if op.kind() == kind {
                flat.extend(op.children().iter().cloned());
            } else {
                flat.push(op);
            }
        }
        match flat.len() {
            0 if kind == Kind::And => Formula::tt(),
            0 => Formula::ff(),
            1 => flat.pop().unwrap_or_else(Formula::tt),
            _ => Formula::make(kind, None, flat),
        }
    }

    pub fn tt() -> Formula {
        Formula::make(Kind::Tt, None, Vec::new())
    }

    pub fn ff() -> Formula {
        Formula::make(Kind::Ff, None, Vec::new())
    }

    pub fn constant(value: bool) -> Formula {
        if value { Formula::tt() } else { Formula::ff() }
    }

    pub fn ap(name: &str) -> Formula {
        Formula::make(Kind::Ap, Some(name), Vec::new())
    }

    pub fn not(arg: Formula) -> Formula {
        Formula::make(Kind::Not, None, vec![arg])
    }

    /// N-ary conjunction; nested conjunctions are flattened, a single operand
    /// is returned unchanged and an empty one yields `true`.
    pub fn and(operands: Vec<Formula>) -> Formula {
        Formula::junction(Kind::And, operands)
    }

    /// N-ary disjunction, the dual of [`Formula::and`].
    pub fn or(operands: Vec<Formula>) -> Formula {
        Formula::junction(Kind::Or, operands)
    }

    pub fn implies(left: Formula, right: Formula) -> Formula {
        Formula::make(Kind::Implies, None, vec![left, right])
    }

    pub fn equiv(left: Formula, right: Formula) -> Formula {
        Formula::make(Kind::Equiv, None, vec![left, right])
    }

    pub fn xor(left: Formula, right: Formula) -> Formula {
        Formula::make(Kind::Xor, None, vec![left, right])
    }

    pub fn next(arg: Formula) -> Formula {
        Formula::make(Kind::X, None, vec![arg])
    }

    pub fn eventually(arg: Formula) -> Formula {
        Formula::make(Kind::F, None, vec![arg])
    }

    pub fn globally(arg: Formula) -> Formula {
        Formula::make(Kind::G, None, vec![arg])
    }

    pub fn until(left: Formula, right: Formula) -> Formula {
        Formula::make(Kind::U, None, vec![left, right])
    }

    pub fn weak_until(left: Formula, right: Formula) -> Formula {
        Formula::make(Kind::W, None, vec![left, right])
    }

    pub fn release(left: Formula, right: Formula) -> Formula {
        Formula::make(Kind::R, None, vec![left, right])
    }

    pub fn strong_release(left: Formula, right: Formula) -> Formula {
        Formula::make(Kind::M, None, vec![left, right])
    }

    /// Builds a binary or unary node of the given kind.
    pub(crate) fn with_children(kind: Kind, mut children: Vec<Formula>) -> Formula {
        match kind {
            Kind::And => Formula::and(children),
            Kind::Or => Formula::or(children),
            _ => {
                children.truncate(kind.arity().unwrap_or(children.len()));
                Formula::make(kind, None, children)
            }
        }
    }

    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    pub fn children(&self) -> &[Formula] {
        &self.0.children
    }

    /// Name of an atomic proposition.
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn classes(&self) -> SyntacticClasses {
        self.0.classes
    }

    pub fn is_tt(&self) -> bool {
        self.kind() == Kind::Tt
    }

    pub fn is_ff(&self) -> bool {
        self.kind() == Kind::Ff
    }

    pub fn is_constant(&self) -> bool {
        self.kind().is_constant()
    }

    pub fn is_syntactic_guarantee(&self) -> bool {
        self.0.classes.guarantee
    }

    pub fn is_syntactic_safety(&self) -> bool {
        self.0.classes.safety
    }

    pub fn is_syntactic_recurrence(&self) -> bool {
        self.0.classes.recurrence
    }

    pub fn is_syntactic_persistence(&self) -> bool {
        self.0.classes.persistence
    }

    /// Identity of the interned node, stable while the formula is alive.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Formula({self})")
    }
}
