//! Superposition: `l = r | C1`, `L[l'] | C2` with `σ = mgu(l, l')` yields
//! `(L[r] | C1 | C2)σ`, provided `l'` is not a variable, `lσ` is greater
//! than `rσ`, and a rewritten equality literal is not rewritten only below
//! its smaller side.
//!
//! Both directions run against the indices: the given clause's equalities
//! rewrite Active clauses through the subterm index, and Active equalities
//! rewrite the given clause through the left-hand-side index. Every
//! occurrence of the unified subterm in the target literal is rewritten at
//! once.

use super::common::{contains_subterm, dedup_literals, rename_offset};
use crate::index::{rewritable_subterms, superposition_lhs_pairs, IndexManager, IndexTag, TermEntry};
use crate::logic::{
    unify, Clause, ClauseArena, ClauseId, Env, LiteralId, Rule, Substitution, TermId, TermOrdering,
};
use std::sync::Arc;

/// One superposition attempt, with all terms in the shared (renamed)
/// namespace.
struct Attempt<'a> {
    from_clause: &'a Clause,
    from_id: ClauseId,
    from_pos: usize,
    from_offset: u32,
    into_clause: &'a Clause,
    into_id: ClauseId,
    into_pos: usize,
    into_offset: u32,
    /// The equality side being unified with `target` (renamed).
    lhs: TermId,
    /// The replacement side (renamed).
    rhs: TermId,
    /// The rewritten subterm occurrence in the target literal (renamed).
    target: TermId,
}

pub fn superposition(
    env: &mut Env,
    arena: &ClauseArena,
    indexes: &IndexManager,
    given_id: ClauseId,
) -> Vec<Clause> {
    let given = Arc::clone(arena.get(given_id));
    let mut children = Vec::new();

    // Given as the rewriting side: its equalities against indexed subterms.
    if indexes.term_index(IndexTag::SuperpositionSubterms).is_some() {
        for given_pos in 0..given.selected {
            let literal = given.literals[given_pos];
            for (lhs, rhs) in superposition_lhs_pairs(env, literal) {
                let index = indexes
                    .term_index(IndexTag::SuperpositionSubterms)
                    .expect("checked above");
                let candidates: Vec<TermEntry> = index.candidates_unifiable(env, lhs).collect();
                for entry in candidates {
                    let partner = Arc::clone(arena.get(entry.clause));
                    let partner_pos = match position_of(&partner, entry.literal) {
                        Some(pos) => pos,
                        None => continue,
                    };
                    let offset = rename_offset(env, &given);
                    let target = env.terms.offset_vars(entry.term, offset);

                    let mut subst = Substitution::new();
                    if !unify(&env.terms, lhs, target, &mut subst) {
                        continue;
                    }

                    let attempt = Attempt {
                        from_clause: &given,
                        from_id: given_id,
                        from_pos: given_pos,
                        from_offset: 0,
                        into_clause: &partner,
                        into_id: entry.clause,
                        into_pos: partner_pos,
                        into_offset: offset,
                        lhs,
                        rhs,
                        target,
                    };
                    if let Some(child) = build_child(env, &attempt, subst) {
                        children.push(child);
                    }
                }
            }
        }
    }

    // Given as the rewritten side: indexed equalities against its subterms.
    if indexes.term_index(IndexTag::SuperpositionLhs).is_some() {
        for given_pos in 0..given.selected {
            let literal = given.literals[given_pos];
            let mut subterms = Vec::new();
            rewritable_subterms(env, literal, &mut subterms);
            subterms.dedup();

            for target in subterms {
                let index = indexes
                    .term_index(IndexTag::SuperpositionLhs)
                    .expect("checked above");
                let candidates: Vec<TermEntry> = index.candidates_unifiable(env, target).collect();
                for entry in candidates {
                    let partner = Arc::clone(arena.get(entry.clause));
                    let partner_pos = match position_of(&partner, entry.literal) {
                        Some(pos) => pos,
                        None => continue,
                    };
                    let (side_a, side_b) = match env.literals.equality_sides(entry.literal) {
                        Some(sides) => sides,
                        None => continue,
                    };
                    let rhs_side = if entry.term == side_a { side_b } else { side_a };

                    let offset = rename_offset(env, &given);
                    let lhs = env.terms.offset_vars(entry.term, offset);
                    let rhs = env.terms.offset_vars(rhs_side, offset);

                    let mut subst = Substitution::new();
                    if !unify(&env.terms, lhs, target, &mut subst) {
                        continue;
                    }

                    let attempt = Attempt {
                        from_clause: &partner,
                        from_id: entry.clause,
                        from_pos: partner_pos,
                        from_offset: offset,
                        into_clause: &given,
                        into_id: given_id,
                        into_pos: given_pos,
                        into_offset: 0,
                        lhs,
                        rhs,
                        target,
                    };
                    if let Some(child) = build_child(env, &attempt, subst) {
                        children.push(child);
                    }
                }
            }
        }
    }

    children
}

fn position_of(clause: &Clause, literal: LiteralId) -> Option<usize> {
    clause.literals.iter().position(|&l| l == literal)
}

fn build_child(env: &mut Env, attempt: &Attempt<'_>, subst: Substitution) -> Option<Clause> {
    let lhs_inst = subst.apply(&mut env.terms, attempt.lhs);
    let rhs_inst = subst.apply(&mut env.terms, attempt.rhs);
    if env.compare(lhs_inst, rhs_inst) != TermOrdering::Greater {
        return None;
    }

    let into_literal = attempt.into_clause.literals[attempt.into_pos];
    let into_literal = env.offset_literal(into_literal, attempt.into_offset);

    // Rewriting only below the smaller side of an equality is redundant.
    if env.literals.is_equality(into_literal) {
        let (side_a, side_b) = env
            .literals
            .equality_sides(into_literal)
            .expect("equality literal has two sides");
        let in_a = contains_subterm(&env.terms, side_a, attempt.target);
        let in_b = contains_subterm(&env.terms, side_b, attempt.target);
        let side_a_inst = subst.apply(&mut env.terms, side_a);
        let side_b_inst = subst.apply(&mut env.terms, side_b);
        match env.compare(side_a_inst, side_b_inst) {
            TermOrdering::Less if in_a && !in_b => return None,
            TermOrdering::Greater if in_b && !in_a => return None,
            _ => {}
        }
    }

    let target_inst = subst.apply(&mut env.terms, attempt.target);
    let into_instance = env.apply_literal(into_literal, &subst);
    let rewritten = env.replace_in_literal(into_instance, target_inst, rhs_inst);

    let mut literals = vec![rewritten];
    for (i, &literal) in attempt.into_clause.literals.iter().enumerate() {
        if i != attempt.into_pos {
            let renamed = env.offset_literal(literal, attempt.into_offset);
            literals.push(env.apply_literal(renamed, &subst));
        }
    }
    for (i, &literal) in attempt.from_clause.literals.iter().enumerate() {
        if i != attempt.from_pos {
            let renamed = env.offset_literal(literal, attempt.from_offset);
            literals.push(env.apply_literal(renamed, &subst));
        }
    }
    let literals = dedup_literals(literals);

    Some(Clause::derived(
        literals,
        Rule::Superposition,
        &[
            (attempt.from_id, attempt.from_clause),
            (attempt.into_id, attempt.into_clause),
        ],
        &env.literals,
    ))
}
