//! Binary resolution.
//!
//! Resolves a selected literal of the given clause against complementary
//! selected literals of Active clauses, found through the generating-literal
//! index. Equality literals are left to the equality rules.

use super::common::{dedup_literals, instantiate_rest, rename_offset};
use crate::index::IndexManager;
use crate::logic::{unify_args, Clause, ClauseArena, ClauseId, Env, Rule, Substitution};
use std::sync::Arc;

pub fn resolution(
    env: &mut Env,
    arena: &ClauseArena,
    indexes: &IndexManager,
    given_id: ClauseId,
) -> Vec<Clause> {
    let index = match indexes.generating_literals() {
        Some(index) => index,
        None => return Vec::new(),
    };
    let given = Arc::clone(arena.get(given_id));
    let mut children = Vec::new();

    for (given_pos, &given_lit) in given.literals[..given.selected].iter().enumerate() {
        if env.literals.is_equality(given_lit) {
            continue;
        }

        let candidates: Vec<_> = index.complement_candidates(env, given_lit).collect();
        for (partner_lit, partner_id) in candidates {
            let partner = Arc::clone(arena.get(partner_id));
            let partner_pos = match partner.literals.iter().position(|&l| l == partner_lit) {
                Some(pos) => pos,
                None => continue,
            };

            let offset = rename_offset(env, &given);
            let partner_lit_renamed = env.offset_literal(partner_lit, offset);

            let mut subst = Substitution::new();
            let given_args = env.literals.args(given_lit).to_vec();
            let partner_args = env.literals.args(partner_lit_renamed).to_vec();
            if !unify_args(&env.terms, &given_args, &partner_args, &mut subst) {
                continue;
            }

            let mut literals: Vec<_> = given
                .literals
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != given_pos)
                .map(|(_, &literal)| env.apply_literal(literal, &subst))
                .collect();
            literals.extend(instantiate_rest(env, &partner, partner_pos, offset, &subst));
            let literals = dedup_literals(literals);

            children.push(Clause::derived(
                literals,
                Rule::Resolution,
                &[(given_id, &given), (partner_id, &partner)],
                &env.literals,
            ));
        }
    }

    children
}
