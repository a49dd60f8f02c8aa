//! Term and literal ordering (Knuth-Bendix).
//!
//! KBO compares terms by weight first (with the variable-occurrence side
//! condition), then by symbol precedence, then lexicographically on
//! arguments. Symbol weights default to 1 and precedence defaults to the
//! interning order; both can be overridden per symbol.

use super::interner::FunctionId;
use super::literal::{LiteralBank, LiteralId};
use super::term::{TermBank, TermData, TermId, Var};
use std::collections::HashMap;

/// Result of comparing two terms or literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOrdering {
    Greater,
    Less,
    Equal,
    Incomparable,
}

impl TermOrdering {
    pub fn reversed(self) -> TermOrdering {
        match self {
            TermOrdering::Greater => TermOrdering::Less,
            TermOrdering::Less => TermOrdering::Greater,
            other => other,
        }
    }
}

/// How literals are compared when computing maximal literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiteralComparisonMode {
    /// Weight, then predicate precedence, then argument comparison.
    #[default]
    Standard,
    /// Predicate precedence decides before weight.
    Predicate,
    /// Standard with the predicate precedence reversed.
    Reverse,
}

/// Configuration for the Knuth-Bendix ordering.
#[derive(Debug, Clone)]
pub struct KboConfig {
    /// Per-symbol weight overrides (default weight is 1).
    pub symbol_weights: HashMap<FunctionId, u32>,
    /// Per-symbol precedence overrides (default is the interning order).
    pub precedence: HashMap<FunctionId, u32>,
    /// Weight of variables; must be positive.
    pub variable_weight: u32,
}

impl Default for KboConfig {
    fn default() -> Self {
        KboConfig {
            symbol_weights: HashMap::new(),
            precedence: HashMap::new(),
            variable_weight: 1,
        }
    }
}

/// Knuth-Bendix ordering over interned terms.
#[derive(Debug, Clone, Default)]
pub struct Kbo {
    config: KboConfig,
}

impl Kbo {
    pub fn new(config: KboConfig) -> Self {
        Kbo { config }
    }

    /// Install a precedence table, replacing any previous overrides.
    pub fn set_precedence(&mut self, precedence: HashMap<FunctionId, u32>) {
        self.config.precedence = precedence;
    }

    fn symbol_weight(&self, id: FunctionId) -> u32 {
        self.config.symbol_weights.get(&id).copied().unwrap_or(1)
    }

    fn precedence(&self, id: FunctionId) -> (u32, u32) {
        // Explicit precedence first, interning order as the tie-breaker.
        (
            self.config.precedence.get(&id).copied().unwrap_or(0),
            id.as_u32(),
        )
    }

    /// KBO weight of a term (uses configured symbol weights, not the cached
    /// symbol count).
    pub fn term_weight(&self, terms: &TermBank, t: TermId) -> u64 {
        match terms.data(t) {
            TermData::Var(_) => u64::from(self.config.variable_weight),
            TermData::App(f, args) => {
                u64::from(self.symbol_weight(*f))
                    + args.iter().map(|&a| self.term_weight(terms, a)).sum::<u64>()
            }
        }
    }

    fn count_vars(&self, terms: &TermBank, t: TermId, counts: &mut HashMap<Var, i64>, delta: i64) {
        match terms.data(t) {
            TermData::Var(v) => {
                *counts.entry(*v).or_insert(0) += delta;
            }
            TermData::App(_, args) => {
                for &a in args {
                    self.count_vars(terms, a, counts, delta);
                }
            }
        }
    }

    /// Compare two terms.
    pub fn compare(&self, terms: &TermBank, s: TermId, t: TermId) -> TermOrdering {
        if s == t {
            return TermOrdering::Equal;
        }

        // Variable cases: a variable is smaller than any term containing it.
        match (terms.data(s), terms.data(t)) {
            (TermData::Var(v), _) => {
                return if terms.occurs(*v, t) {
                    TermOrdering::Less
                } else {
                    TermOrdering::Incomparable
                };
            }
            (_, TermData::Var(v)) => {
                return if terms.occurs(*v, s) {
                    TermOrdering::Greater
                } else {
                    TermOrdering::Incomparable
                };
            }
            _ => {}
        }

        // Variable condition: s can only dominate t if no variable occurs
        // more often in t than in s (and dually).
        let mut counts = HashMap::new();
        self.count_vars(terms, s, &mut counts, 1);
        self.count_vars(terms, t, &mut counts, -1);
        let s_covers_t = counts.values().all(|&c| c >= 0);
        let t_covers_s = counts.values().all(|&c| c <= 0);

        let ws = self.term_weight(terms, s);
        let wt = self.term_weight(terms, t);

        if ws > wt {
            return if s_covers_t {
                TermOrdering::Greater
            } else {
                TermOrdering::Incomparable
            };
        }
        if wt > ws {
            return if t_covers_s {
                TermOrdering::Less
            } else {
                TermOrdering::Incomparable
            };
        }

        // Equal weights: precedence on head symbols, then lexicographic.
        let (fs, s_args, ft, t_args) = match (terms.data(s), terms.data(t)) {
            (TermData::App(fs, s_args), TermData::App(ft, t_args)) => (fs, s_args, ft, t_args),
            _ => unreachable!("variable cases handled above"),
        };

        if fs != ft {
            let ord = if self.precedence(*fs) > self.precedence(*ft) {
                TermOrdering::Greater
            } else {
                TermOrdering::Less
            };
            return match ord {
                TermOrdering::Greater if s_covers_t => TermOrdering::Greater,
                TermOrdering::Less if t_covers_s => TermOrdering::Less,
                _ => TermOrdering::Incomparable,
            };
        }

        // Same head: first differing argument decides.
        for (&sa, &ta) in s_args.iter().zip(t_args.iter()) {
            match self.compare(terms, sa, ta) {
                TermOrdering::Equal => continue,
                TermOrdering::Greater if s_covers_t => return TermOrdering::Greater,
                TermOrdering::Less if t_covers_s => return TermOrdering::Less,
                _ => return TermOrdering::Incomparable,
            }
        }
        TermOrdering::Equal
    }

    /// Compare two literals by extending KBO to atoms: weight with variable
    /// condition, predicate precedence, then argument-wise comparison.
    /// Polarity breaks exact atom ties (negative greater, the usual
    /// convention for selection).
    pub fn compare_literals(
        &self,
        terms: &TermBank,
        literals: &LiteralBank,
        l1: LiteralId,
        l2: LiteralId,
        mode: LiteralComparisonMode,
    ) -> TermOrdering {
        if l1 == l2 {
            return TermOrdering::Equal;
        }

        let p1 = literals.predicate(l1);
        let p2 = literals.predicate(l2);

        if mode == LiteralComparisonMode::Predicate && p1 != p2 {
            return self.predicate_ordering(p1.as_u32(), p2.as_u32(), mode);
        }

        let mut counts = HashMap::new();
        for &a in literals.args(l1) {
            self.count_vars(terms, a, &mut counts, 1);
        }
        for &a in literals.args(l2) {
            self.count_vars(terms, a, &mut counts, -1);
        }
        let l1_covers = counts.values().all(|&c| c >= 0);
        let l2_covers = counts.values().all(|&c| c <= 0);

        let w1 = u64::from(literals.weight(l1));
        let w2 = u64::from(literals.weight(l2));
        if w1 > w2 {
            return if l1_covers {
                TermOrdering::Greater
            } else {
                TermOrdering::Incomparable
            };
        }
        if w2 > w1 {
            return if l2_covers {
                TermOrdering::Less
            } else {
                TermOrdering::Incomparable
            };
        }

        if p1 != p2 {
            let ord = self.predicate_ordering(p1.as_u32(), p2.as_u32(), mode);
            return match ord {
                TermOrdering::Greater if l1_covers => TermOrdering::Greater,
                TermOrdering::Less if l2_covers => TermOrdering::Less,
                _ => TermOrdering::Incomparable,
            };
        }

        for (&a1, &a2) in literals.args(l1).iter().zip(literals.args(l2).iter()) {
            match self.compare(terms, a1, a2) {
                TermOrdering::Equal => continue,
                TermOrdering::Greater if l1_covers => return TermOrdering::Greater,
                TermOrdering::Less if l2_covers => return TermOrdering::Less,
                _ => return TermOrdering::Incomparable,
            }
        }

        // Same atom, different polarity: the negative literal is greater.
        if l1.is_positive() == l2.is_positive() {
            TermOrdering::Equal
        } else if l2.is_positive() {
            TermOrdering::Greater
        } else {
            TermOrdering::Less
        }
    }

    fn predicate_ordering(&self, p1: u32, p2: u32, mode: LiteralComparisonMode) -> TermOrdering {
        let greater = if mode == LiteralComparisonMode::Reverse {
            p1 < p2
        } else {
            p1 > p2
        };
        if greater {
            TermOrdering::Greater
        } else {
            TermOrdering::Less
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::interner::Interner;

    struct TestContext {
        interner: Interner,
        terms: TermBank,
        literals: LiteralBank,
        kbo: Kbo,
    }

    impl TestContext {
        fn new() -> Self {
            let interner = Interner::new();
            let literals = LiteralBank::new(interner.equality());
            TestContext {
                interner,
                terms: TermBank::new(),
                literals,
                kbo: Kbo::default(),
            }
        }

        fn var(&mut self, index: u32) -> TermId {
            self.terms.var(Var::new(index))
        }

        fn const_(&mut self, name: &str) -> TermId {
            let id = self.interner.function(name, 0).unwrap();
            self.terms.constant(id)
        }

        fn func(&mut self, name: &str, args: Vec<TermId>) -> TermId {
            let id = self.interner.function(name, args.len() as u32).unwrap();
            self.terms.app(id, args)
        }
    }

    #[test]
    fn test_subterm_is_smaller() {
        let mut ctx = TestContext::new();
        let x = ctx.var(0);
        let fx = ctx.func("f", vec![x]);

        assert_eq!(ctx.kbo.compare(&ctx.terms, fx, x), TermOrdering::Greater);
        assert_eq!(ctx.kbo.compare(&ctx.terms, x, fx), TermOrdering::Less);
    }

    #[test]
    fn test_equal_terms() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        assert_eq!(ctx.kbo.compare(&ctx.terms, a, a), TermOrdering::Equal);
    }

    #[test]
    fn test_weight_dominates() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let fa = ctx.func("f", vec![a]);
        let b = ctx.const_("b");

        assert_eq!(ctx.kbo.compare(&ctx.terms, fa, b), TermOrdering::Greater);
    }

    #[test]
    fn test_disjoint_variables_incomparable() {
        let mut ctx = TestContext::new();
        let x = ctx.var(0);
        let y = ctx.var(1);
        let fx = ctx.func("f", vec![x]);

        assert_eq!(ctx.kbo.compare(&ctx.terms, x, y), TermOrdering::Incomparable);
        assert_eq!(
            ctx.kbo.compare(&ctx.terms, fx, y),
            TermOrdering::Incomparable
        );
    }

    #[test]
    fn test_precedence_breaks_weight_ties() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let b = ctx.const_("b");

        // Same weight; interning order makes b later, hence greater.
        assert_eq!(ctx.kbo.compare(&ctx.terms, b, a), TermOrdering::Greater);
        assert_eq!(ctx.kbo.compare(&ctx.terms, a, b), TermOrdering::Less);
    }

    #[test]
    fn test_explicit_precedence_override() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let b = ctx.const_("b");
        let a_id = ctx.interner.get_function("a").unwrap();

        let mut precedence = HashMap::new();
        precedence.insert(a_id, 10);
        ctx.kbo.set_precedence(precedence);

        assert_eq!(ctx.kbo.compare(&ctx.terms, a, b), TermOrdering::Greater);
    }

    #[test]
    fn test_lexicographic_same_head() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let b = ctx.const_("b");
        let fab = ctx.func("f", vec![a, b]);
        let fba = ctx.func("f", vec![b, a]);

        // First argument decides: b > a.
        assert_eq!(ctx.kbo.compare(&ctx.terms, fba, fab), TermOrdering::Greater);
    }

    #[test]
    fn test_variable_condition_blocks() {
        let mut ctx = TestContext::new();
        let x = ctx.var(0);
        let y = ctx.var(1);
        let fxx = ctx.func("f", vec![x, x]);
        let gy = ctx.func("g", vec![y]);

        // f(X,X) vs g(Y): weights 3 vs 2, but Y does not occur in f(X,X).
        assert_eq!(
            ctx.kbo.compare(&ctx.terms, fxx, gy),
            TermOrdering::Incomparable
        );
    }

    #[test]
    fn test_literal_comparison_weight() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let fa = ctx.func("f", vec![a]);
        let p = ctx.interner.predicate("p", 1).unwrap();

        let light = ctx.literals.literal(p, vec![a], true, &ctx.terms);
        let heavy = ctx.literals.literal(p, vec![fa], true, &ctx.terms);

        assert_eq!(
            ctx.kbo.compare_literals(
                &ctx.terms,
                &ctx.literals,
                heavy,
                light,
                LiteralComparisonMode::Standard
            ),
            TermOrdering::Greater
        );
    }

    #[test]
    fn test_literal_polarity_tiebreak() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let p = ctx.interner.predicate("p", 1).unwrap();

        let pos = ctx.literals.literal(p, vec![a], true, &ctx.terms);
        let neg = pos.complement();

        assert_eq!(
            ctx.kbo.compare_literals(
                &ctx.terms,
                &ctx.literals,
                neg,
                pos,
                LiteralComparisonMode::Standard
            ),
            TermOrdering::Greater
        );
    }
}
