//! Demodulation: rewriting with unit equalities.
//!
//! Forward demodulation rewrites a new clause with the indexed unit
//! equalities of the Active set; backward demodulation rewrites Active
//! clauses with a newly activated unit equality. Rewrites only fire when
//! the instantiated rule is oriented (`lσ` greater than `rσ`), so each step
//! strictly decreases the clause under the ordering.

use super::Simplification;
use crate::index::{demodulation_lhs_pairs, IndexManager, IndexTag, TermEntry};
use crate::logic::{
    match_terms, Clause, ClauseArena, ClauseId, Env, LiteralId, Rule, Substitution, TermId,
    TermOrdering,
};
use std::sync::Arc;

/// Try to rewrite `clause_id` with one indexed unit equality. The first
/// applicable rewrite wins; the loop re-runs simplification on the
/// replacement.
pub fn forward_demodulation(
    env: &mut Env,
    arena: &ClauseArena,
    indexes: &IndexManager,
    clause_id: ClauseId,
    redundancy_check: bool,
) -> Option<Simplification> {
    let index = indexes.term_index(IndexTag::DemodulationLhs)?;
    let clause = Arc::clone(arena.get(clause_id));

    for (pos, &literal) in clause.literals.iter().enumerate() {
        let args = env.literals.args(literal).to_vec();
        for arg in args {
            let mut subterms = Vec::new();
            env.terms.non_variable_subterms(arg, &mut subterms);
            for target in subterms {
                let candidates: Vec<TermEntry> =
                    index.candidates_generalizations(env, target).collect();
                for entry in candidates {
                    if entry.clause == clause_id {
                        continue;
                    }
                    let unit = arena.get(entry.clause);
                    debug_assert_eq!(unit.len(), 1);

                    let (lhs, rhs) = match find_rule_sides(env, unit.literals[0], entry.term) {
                        Some(sides) => sides,
                        None => continue,
                    };

                    let mut subst = Substitution::new();
                    if !match_terms(&env.terms, lhs, target, &mut subst) {
                        continue;
                    }
                    let rhs_inst = subst.apply(&mut env.terms, rhs);
                    // The instance must be oriented left to right.
                    if env.compare(target, rhs_inst) != TermOrdering::Greater {
                        continue;
                    }
                    if redundancy_check
                        && !top_level_rewrite_allowed(env, literal, target, rhs_inst)
                    {
                        continue;
                    }

                    let rewritten = env.replace_in_literal(literal, target, rhs_inst);
                    let mut literals = clause.literals.clone();
                    literals[pos] = rewritten;

                    let replacement = Clause::derived(
                        literals,
                        Rule::Demodulation,
                        &[(clause_id, &clause), (entry.clause, unit)],
                        &env.literals,
                    );
                    return Some(Simplification::Replaced {
                        clause: replacement,
                    });
                }
            }
        }
    }
    None
}

/// Rewrite Active clauses with a newly activated unit equality. Returns
/// `(victim, replacement)` pairs; the caller removes each victim and feeds
/// the replacement back through Unprocessed.
pub fn backward_demodulation(
    env: &mut Env,
    arena: &ClauseArena,
    indexes: &IndexManager,
    given_id: ClauseId,
) -> Vec<(ClauseId, Clause)> {
    let index = match indexes.term_index(IndexTag::DemodulationSubterms) {
        Some(index) => index,
        None => return Vec::new(),
    };
    let given = Arc::clone(arena.get(given_id));
    if given.len() != 1 {
        return Vec::new();
    }

    let mut results = Vec::new();
    let mut rewritten_clauses = std::collections::HashSet::new();

    for (lhs, rhs) in demodulation_lhs_pairs(env, given.literals[0]) {
        let candidates: Vec<TermEntry> = index.candidates_instances(env, lhs).collect();
        for entry in candidates {
            if entry.clause == given_id || rewritten_clauses.contains(&entry.clause) {
                continue;
            }

            let mut subst = Substitution::new();
            if !match_terms(&env.terms, lhs, entry.term, &mut subst) {
                continue;
            }
            let rhs_inst = subst.apply(&mut env.terms, rhs);
            if env.compare(entry.term, rhs_inst) != TermOrdering::Greater {
                continue;
            }

            let victim = Arc::clone(arena.get(entry.clause));
            let literals: Vec<LiteralId> = victim
                .literals
                .iter()
                .map(|&l| env.replace_in_literal(l, entry.term, rhs_inst))
                .collect();
            if literals == victim.literals {
                continue;
            }

            let replacement = Clause::derived(
                literals,
                Rule::Demodulation,
                &[(entry.clause, &victim), (given_id, &given)],
                &env.literals,
            );
            rewritten_clauses.insert(entry.clause);
            results.push((entry.clause, replacement));
        }
    }
    results
}

/// The oriented `(lhs, rhs)` of the unit rule whose indexed side is
/// `indexed`.
fn find_rule_sides(env: &Env, literal: LiteralId, indexed: TermId) -> Option<(TermId, TermId)> {
    demodulation_lhs_pairs(env, literal)
        .into_iter()
        .find(|&(lhs, _)| lhs == indexed)
}

/// Rewriting a whole top-level side of an equality literal is only a
/// simplification if the result stays below the original under the ordering
/// extended to literals; rewriting the larger side `s` of `s = t` to `s'`
/// needs `t` or `s'` to stay below `s`.
fn top_level_rewrite_allowed(env: &Env, literal: LiteralId, target: TermId, rhs_inst: TermId) -> bool {
    let (lhs, rhs) = match env.literals.equality_sides(literal) {
        Some(sides) if literal.is_positive() => sides,
        _ => return true,
    };
    let other = if target == lhs {
        rhs
    } else if target == rhs {
        lhs
    } else {
        // Not a whole side; the rewrite happens strictly below the top.
        return true;
    };
    // Rewriting the strictly greater side is only redundancy-preserving
    // when the replacement still dominates the other side.
    match env.compare(target, other) {
        TermOrdering::Greater => env.compare(rhs_inst, other) == TermOrdering::Greater,
        _ => true,
    }
}
