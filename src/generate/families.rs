//! Parametric formula families of growing size.

use crate::formula::Formula;

/// `a0`, then `((prev) U b_n) W a_n` for n = 1, 2, …
///
/// Each step nests a U below a W, so no member past the first is in the
/// Δ₂ nesting discipline and normalizers have to restructure the whole
/// formula.
#[derive(Debug, Clone, Default)]
pub struct HardFamily {
    n: usize,
    current: Option<Formula>,
}

impl HardFamily {
    pub fn new() -> Self {
        HardFamily::default()
    }
}

impl Iterator for HardFamily {
    type Item = Formula;

    fn next(&mut self) -> Option<Formula> {
        let next = match self.current.take() {
            None => Formula::ap("a0"),
            Some(prev) => {
                self.n += 1;
                let a = Formula::ap(&format!("a{}", self.n));
                let b = Formula::ap(&format!("b{}", self.n));
                Formula::weak_until(Formula::until(prev, b), a)
            }
        };
        self.current = Some(next.clone());
        Some(next)
    }
}

/// `f_n W b` where `f_0 = a0` and `f_n = f_{n-1} U a_n`: a single W on top
/// of a growing chain of U.
#[derive(Debug, Clone, Default)]
pub struct UwFamily {
    n: usize,
    chain: Option<Formula>,
}

impl UwFamily {
    pub fn new() -> Self {
        UwFamily::default()
    }
}

impl Iterator for UwFamily {
    type Item = Formula;

    fn next(&mut self) -> Option<Formula> {
        let chain = match self.chain.take() {
            None => Formula::ap("a0"),
            Some(prev) => {
                self.n += 1;
                Formula::until(prev, Formula::ap(&format!("a{}", self.n)))
            }
        };
        self.chain = Some(chain.clone());
        Some(Formula::weak_until(chain, Formula::ap("b")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{NestingContext, is_delta_two_normalized, tree_size};

    #[test]
    fn test_hard_family_members() {
        let members: Vec<String> = HardFamily::new().take(3).map(|f| f.to_string()).collect();
        assert_eq!(
            members,
            vec!["a0", "(a0 U b1) W a1", "(((a0 U b1) W a1) U b2) W a2"]
        );
    }

    #[test]
    fn test_hard_family_grows_by_four() {
        let sizes: Vec<u64> = HardFamily::new().take(4).map(|f| tree_size(&f)).collect();
        assert_eq!(sizes, vec![1, 5, 9, 13]);
    }

    #[test]
    fn test_hard_family_violates_nesting() {
        for f in HardFamily::new().skip(1).take(5) {
            assert!(!is_delta_two_normalized(&f, NestingContext::None));
        }
    }

    #[test]
    fn test_uw_family_members() {
        let members: Vec<String> = UwFamily::new().take(3).map(|f| f.to_string()).collect();
        assert_eq!(members, vec!["a0 W b", "(a0 U a1) W b", "((a0 U a1) U a2) W b"]);
    }

    #[test]
    fn test_families_restart() {
        let first: Vec<Formula> = HardFamily::new().take(3).collect();
        let again: Vec<Formula> = HardFamily::new().take(3).collect();
        assert_eq!(first, again);
    }
}
