//! Shared helpers for the inference rules.

use crate::logic::{Clause, Env, LiteralId, Substitution, TermBank, TermData, TermId};

/// Offset that renames `partner` apart from `given`: one past the largest
/// variable index `given` uses.
pub(crate) fn rename_offset(env: &Env, given: &Clause) -> u32 {
    env.clause_max_var(given).map_or(0, |max| max + 1)
}

/// Instantiate every literal of `clause` except the one at `skip`, renaming
/// by `offset` first.
pub(crate) fn instantiate_rest(
    env: &mut Env,
    clause: &Clause,
    skip: usize,
    offset: u32,
    subst: &Substitution,
) -> Vec<LiteralId> {
    clause
        .literals
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != skip)
        .map(|(_, &literal)| {
            let renamed = env.offset_literal(literal, offset);
            env.apply_literal(renamed, subst)
        })
        .collect()
}

/// Remove duplicate literals, keeping first occurrences.
pub(crate) fn dedup_literals(literals: Vec<LiteralId>) -> Vec<LiteralId> {
    let mut seen = std::collections::HashSet::new();
    literals
        .into_iter()
        .filter(|&literal| seen.insert(literal))
        .collect()
}

/// True iff `needle` occurs in `haystack` (including as the whole term).
pub(crate) fn contains_subterm(terms: &TermBank, haystack: TermId, needle: TermId) -> bool {
    if haystack == needle {
        return true;
    }
    match terms.data(haystack) {
        TermData::Var(_) => false,
        TermData::App(_, args) => args.iter().any(|&a| contains_subterm(terms, a, needle)),
    }
}
