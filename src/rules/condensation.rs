//! Condensation: replace a clause by a proper factor that subsumes it.

use super::common::dedup_literals;
use super::subsumption::subsumes;
use super::Simplification;
use crate::logic::{unify_args, Clause, ClauseArena, ClauseId, Env, Rule, Substitution};
use std::sync::Arc;

pub fn condensation(env: &mut Env, arena: &ClauseArena, id: ClauseId) -> Option<Simplification> {
    let clause = Arc::clone(arena.get(id));
    if clause.len() < 2 {
        return None;
    }

    for i in 0..clause.literals.len() {
        for j in (i + 1)..clause.literals.len() {
            let first = clause.literals[i];
            let second = clause.literals[j];
            if first.is_positive() != second.is_positive()
                || env.literals.predicate(first) != env.literals.predicate(second)
            {
                continue;
            }

            let mut subst = Substitution::new();
            let first_args = env.literals.args(first).to_vec();
            let second_args = env.literals.args(second).to_vec();
            if !unify_args(&env.terms, &first_args, &second_args, &mut subst) {
                continue;
            }

            let literals: Vec<_> = clause
                .literals
                .iter()
                .map(|&literal| env.apply_literal(literal, &subst))
                .collect();
            let literals = dedup_literals(literals);
            if literals.len() >= clause.literals.len() {
                continue;
            }

            let candidate = Clause::derived(
                literals,
                Rule::Condensation,
                &[(id, &clause)],
                &env.literals,
            );
            // Only a factor that subsumes the original clause may replace it.
            if subsumes(env, &candidate, &clause) {
                return Some(Simplification::Replaced { clause: candidate });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ClauseOrigin;

    #[test]
    fn test_condensation_shrinks() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();

        // p(X) | p(a): the factor p(a) subsumes the original, so the
        // clause condenses to p(a).
        let x = env.var(0);
        let a = env.constant("a").unwrap();
        let px = env.literal("p", vec![x], true).unwrap();
        let pa = env.literal("p", vec![a], true).unwrap();

        let id = arena.insert(Clause::input(vec![px, pa], ClauseOrigin::Axiom, &env.literals));

        match condensation(&mut env, &arena, id) {
            Some(Simplification::Replaced { clause }) => {
                assert_eq!(clause.literals, vec![pa]);
            }
            other => panic!("expected replacement, got {:?}", other),
        }
    }

    #[test]
    fn test_condensation_requires_subsuming_factor() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();

        // p(X, a) | p(b, X): the literals do not unify (X would need to be
        // both a and b), so no factor exists and the clause stays.
        let x = env.var(0);
        let a = env.constant("a").unwrap();
        let b = env.constant("b").unwrap();
        let pxa = env.literal("p", vec![x, a], true).unwrap();
        let pbx = env.literal("p", vec![b, x], true).unwrap();

        let id = arena.insert(Clause::input(vec![pxa, pbx], ClauseOrigin::Axiom, &env.literals));

        assert!(condensation(&mut env, &arena, id).is_none());
    }

    #[test]
    fn test_condensation_ignores_units() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let pa = env.literal("p", vec![a], true).unwrap();
        let id = arena.insert(Clause::input(vec![pa], ClauseOrigin::Axiom, &env.literals));

        assert!(condensation(&mut env, &arena, id).is_none());
    }
}
