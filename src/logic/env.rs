//! The shared environment: signature, term and literal banks, ordering.
//!
//! Everything that would otherwise be process-wide state (the signature, the
//! interned term store, the simplification ordering) is an explicit value
//! threaded through the core. Constructing a prover takes an `Env`; tests
//! construct their own in isolation.

use super::clause::Clause;
use super::interner::{Interner, PredicateId};
use super::literal::{LiteralBank, LiteralId};
use super::ordering::{Kbo, KboConfig, TermOrdering};
use super::term::{TermBank, TermId, Var};
use super::unification::Substitution;
use crate::error::Result;

/// The prover environment.
pub struct Env {
    pub interner: Interner,
    pub terms: TermBank,
    pub literals: LiteralBank,
    pub ordering: Kbo,
}

impl Default for Env {
    fn default() -> Self {
        Env::new()
    }
}

impl Env {
    pub fn new() -> Self {
        Env::with_ordering(KboConfig::default())
    }

    pub fn with_ordering(config: KboConfig) -> Self {
        let interner = Interner::new();
        let literals = LiteralBank::new(interner.equality());
        Env {
            interner,
            terms: TermBank::new(),
            literals,
            ordering: Kbo::new(config),
        }
    }

    /// Compare two terms under the environment's ordering.
    pub fn compare(&self, s: TermId, t: TermId) -> TermOrdering {
        self.ordering.compare(&self.terms, s, t)
    }

    /// Apply a substitution to a literal, interning the instance.
    pub fn apply_literal(&mut self, literal: LiteralId, subst: &Substitution) -> LiteralId {
        let predicate = self.literals.predicate(literal);
        let positive = literal.is_positive();
        let args: Vec<TermId> = self
            .literals
            .args(literal)
            .to_vec()
            .into_iter()
            .map(|a| subst.apply(&mut self.terms, a))
            .collect();
        self.literals.literal(predicate, args, positive, &self.terms)
    }

    /// Rename a literal by offsetting every variable index.
    pub fn offset_literal(&mut self, literal: LiteralId, by: u32) -> LiteralId {
        if by == 0 {
            return literal;
        }
        let predicate = self.literals.predicate(literal);
        let positive = literal.is_positive();
        let args: Vec<TermId> = self
            .literals
            .args(literal)
            .to_vec()
            .into_iter()
            .map(|a| self.terms.offset_vars(a, by))
            .collect();
        self.literals.literal(predicate, args, positive, &self.terms)
    }

    /// Replace every occurrence of a subterm in a literal.
    pub fn replace_in_literal(&mut self, literal: LiteralId, from: TermId, to: TermId) -> LiteralId {
        let predicate = self.literals.predicate(literal);
        let positive = literal.is_positive();
        let args: Vec<TermId> = self
            .literals
            .args(literal)
            .to_vec()
            .into_iter()
            .map(|a| self.terms.replace(a, from, to))
            .collect();
        self.literals.literal(predicate, args, positive, &self.terms)
    }

    /// Largest variable index used by a clause, if any.
    pub fn clause_max_var(&self, clause: &Clause) -> Option<u32> {
        clause
            .literals
            .iter()
            .filter_map(|&l| self.literals.max_var(l, &self.terms))
            .max()
    }

    // === Convenience builders (input construction and tests) ===

    /// A variable term with the given index.
    pub fn var(&mut self, index: u32) -> TermId {
        self.terms.var(Var::new(index))
    }

    /// A function application by symbol name.
    pub fn app(&mut self, name: &str, args: Vec<TermId>) -> Result<TermId> {
        let f = self.interner.function(name, args.len() as u32)?;
        Ok(self.terms.app(f, args))
    }

    /// A constant term by symbol name.
    pub fn constant(&mut self, name: &str) -> Result<TermId> {
        self.app(name, Vec::new())
    }

    /// A literal by predicate name.
    pub fn literal(&mut self, name: &str, args: Vec<TermId>, positive: bool) -> Result<LiteralId> {
        let p: PredicateId = self.interner.predicate(name, args.len() as u32)?;
        Ok(self.literals.literal(p, args, positive, &self.terms))
    }

    /// An equality (or disequality) literal.
    pub fn equality(&mut self, lhs: TermId, rhs: TermId, positive: bool) -> LiteralId {
        self.literals.equality(lhs, rhs, positive, &self.terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_literal() {
        let mut env = Env::new();
        let x = env.var(0);
        let a = env.constant("a").unwrap();
        let lit = env.literal("p", vec![x], true).unwrap();

        let mut subst = Substitution::new();
        subst.bind(Var::new(0), a);

        let instance = env.apply_literal(lit, &subst);
        let expected = env.literal("p", vec![a], true).unwrap();
        assert_eq!(instance, expected);
    }

    #[test]
    fn test_offset_literal() {
        let mut env = Env::new();
        let x = env.var(0);
        let lit = env.literal("p", vec![x], false).unwrap();

        let shifted = env.offset_literal(lit, 3);
        let x3 = env.var(3);
        let expected = env.literal("p", vec![x3], false).unwrap();
        assert_eq!(shifted, expected);
        assert_eq!(env.offset_literal(lit, 0), lit);
    }

    #[test]
    fn test_replace_in_literal() {
        let mut env = Env::new();
        let a = env.constant("a").unwrap();
        let b = env.constant("b").unwrap();
        let fa = env.app("f", vec![a]).unwrap();
        let lit = env.literal("p", vec![fa, a], true).unwrap();

        let replaced = env.replace_in_literal(lit, a, b);
        let fb = env.app("f", vec![b]).unwrap();
        let expected = env.literal("p", vec![fb, b], true).unwrap();
        assert_eq!(replaced, expected);
    }
}
