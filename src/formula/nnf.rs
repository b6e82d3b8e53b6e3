//! Negation normal form.

use std::collections::HashMap;

use super::{Formula, Kind};

struct Nnf {
    memo: HashMap<(Formula, bool), Formula>,
}

impl Nnf {
    fn rewrite(&mut self, f: &Formula, negated: bool) -> Formula {
        if let Some(done) = self.memo.get(&(f.clone(), negated)) {
            return done.clone();
        }
        let c = f.children();
        let result = match (f.kind(), negated) {
            (Kind::Tt, _) | (Kind::Ff, _) => Formula::constant(f.is_tt() != negated),
            (Kind::Ap, false) => f.clone(),
            (Kind::Ap, true) => Formula::not(f.clone()),
            (Kind::Not, _) => self.rewrite(&c[0], !negated),
            (Kind::And, false) | (Kind::Or, true) => Formula::and(self.all(c, negated)),
            (Kind::Or, false) | (Kind::And, true) => Formula::or(self.all(c, negated)),
            (Kind::Implies, false) => {
                Formula::or(vec![self.rewrite(&c[0], true), self.rewrite(&c[1], false)])
            }
            (Kind::Implies, true) => {
                Formula::and(vec![self.rewrite(&c[0], false), self.rewrite(&c[1], true)])
            }
            (Kind::Equiv, _) | (Kind::Xor, _) => {
                // a <-> b is (a & b) | (!a & !b); a xor b is (a & !b) | (!a & b)
                let same = (f.kind() == Kind::Equiv) != negated;
                let (a, na) = (self.rewrite(&c[0], false), self.rewrite(&c[0], true));
                let (b, nb) = (self.rewrite(&c[1], false), self.rewrite(&c[1], true));
                if same {
                    Formula::or(vec![Formula::and(vec![a, b]), Formula::and(vec![na, nb])])
                } else {
                    Formula::or(vec![Formula::and(vec![a, nb]), Formula::and(vec![na, b])])
                }
            }
            (Kind::X, _) => Formula::next(self.rewrite(&c[0], negated)),
            (Kind::F, false) | (Kind::G, true) => Formula::eventually(self.rewrite(&c[0], negated)),
            (Kind::G, false) | (Kind::F, true) => Formula::globally(self.rewrite(&c[0], negated)),
            (Kind::U, false) | (Kind::R, true) => {
                let (l, r) = self.pair(c, negated);
                Formula::until(l, r)
            }
            (Kind::R, false) | (Kind::U, true) => {
                let (l, r) = self.pair(c, negated);
                Formula::release(l, r)
            }
            (Kind::W, false) | (Kind::M, true) => {
                let (l, r) = self.pair(c, negated);
                Formula::weak_until(l, r)
            }
            (Kind::M, false) | (Kind::W, true) => {
                let (l, r) = self.pair(c, negated);
                Formula::strong_release(l, r)
            }
        };
        self.memo.insert((f.clone(), negated), result.clone());
        result
    }

    fn all(&mut self, children: &[Formula], negated: bool) -> Vec<Formula> {
        children.iter().map(|c| self.rewrite(c, negated)).collect()
    }

    fn pair(&mut self, children: &[Formula], negated: bool) -> (Formula, Formula) {
        (
            self.rewrite(&children[0], negated),
            self.rewrite(&children[1], negated),
        )
    }
}

impl Formula {
    /// Pushes negations down to atomic propositions and eliminates `->`,
    /// `<->` and `xor`.
    pub fn negative_normal_form(&self) -> Formula {
        Nnf {
            memo: HashMap::new(),
        }
        .rewrite(self, false)
    }
}
