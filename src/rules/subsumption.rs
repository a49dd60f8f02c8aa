//! Clause subsumption.
//!
//! `C` subsumes `D` if some substitution over `C`'s variables maps every
//! literal of `C` onto a literal of `D`. The check matches literal by
//! literal with backtracking over the assignment of `C`-literals to
//! `D`-literals; weight and length prefilters keep the search cheap.

use super::Simplification;
use crate::containers::ActiveClauseContainer;
use crate::logic::{match_args, Clause, ClauseArena, ClauseId, Env, Substitution};
use std::sync::Arc;

/// Does `subsumer` subsume `subsumee`?
pub fn subsumes(env: &Env, subsumer: &Clause, subsumee: &Clause) -> bool {
    if subsumer.len() > subsumee.len() || subsumer.weight > subsumee.weight {
        return false;
    }
    let mut used = vec![false; subsumee.literals.len()];
    find_mapping(env, subsumer, subsumee, 0, &Substitution::new(), &mut used)
}

fn find_mapping(
    env: &Env,
    subsumer: &Clause,
    subsumee: &Clause,
    position: usize,
    subst: &Substitution,
    used: &mut Vec<bool>,
) -> bool {
    if position >= subsumer.literals.len() {
        return true;
    }
    let literal = subsumer.literals[position];

    for (i, &candidate) in subsumee.literals.iter().enumerate() {
        if used[i]
            || candidate.is_positive() != literal.is_positive()
            || env.literals.predicate(candidate) != env.literals.predicate(literal)
        {
            continue;
        }

        let mut extended = subst.clone();
        if match_args(
            &env.terms,
            env.literals.args(literal),
            env.literals.args(candidate),
            &mut extended,
        ) {
            used[i] = true;
            if find_mapping(env, subsumer, subsumee, position + 1, &extended, used) {
                return true;
            }
            used[i] = false;
        }
    }
    false
}

/// Delete the clause if an Active clause subsumes it.
pub fn forward_subsumption(
    env: &mut Env,
    arena: &ClauseArena,
    active: &ActiveClauseContainer,
    id: ClauseId,
) -> Option<Simplification> {
    let clause = arena.get(id);
    for candidate_id in active.iter() {
        if candidate_id == id {
            continue;
        }
        let candidate = arena.get(candidate_id);
        if subsumes(env, candidate, clause) {
            return Some(Simplification::Deleted {
                premises: vec![candidate_id],
            });
        }
    }
    None
}

/// Active clauses subsumed by the newly activated clause.
pub fn backward_subsumption(
    env: &Env,
    arena: &ClauseArena,
    active: &ActiveClauseContainer,
    given_id: ClauseId,
) -> Vec<ClauseId> {
    let given = Arc::clone(arena.get(given_id));
    active
        .iter()
        .filter(|&id| id != given_id)
        .filter(|&id| subsumes(env, &given, arena.get(id)))
        .collect()
}
