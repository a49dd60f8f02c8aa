//! Factoring: merge two unifiable selected literals of the given clause.

use super::common::dedup_literals;
use crate::logic::{unify_args, Clause, ClauseArena, ClauseId, Env, Rule, Substitution};
use std::sync::Arc;

pub fn factoring(env: &mut Env, arena: &ClauseArena, given_id: ClauseId) -> Vec<Clause> {
    let given = Arc::clone(arena.get(given_id));
    let mut children = Vec::new();

    let selected = &given.literals[..given.selected];
    for i in 0..selected.len() {
        for j in (i + 1)..given.literals.len() {
            let first = given.literals[i];
            let second = given.literals[j];
            if first.is_positive() != second.is_positive()
                || env.literals.predicate(first) != env.literals.predicate(second)
                || env.literals.is_equality(first)
            {
                continue;
            }

            let mut subst = Substitution::new();
            let first_args = env.literals.args(first).to_vec();
            let second_args = env.literals.args(second).to_vec();
            if !unify_args(&env.terms, &first_args, &second_args, &mut subst) {
                continue;
            }

            // The two literals collapse under the unifier; instantiating the
            // whole clause and dropping duplicates merges them.
            let literals: Vec<_> = given
                .literals
                .iter()
                .map(|&literal| env.apply_literal(literal, &subst))
                .collect();
            let literals = dedup_literals(literals);
            if literals.len() >= given.literals.len() {
                continue;
            }

            children.push(Clause::derived(
                literals,
                Rule::Factoring,
                &[(given_id, &given)],
                &env.literals,
            ));
        }
    }

    children
}
