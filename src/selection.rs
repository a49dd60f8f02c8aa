//! Literal selection strategies.
//!
//! The strategy numbers follow Hoder et al., "Selecting the selection"
//! (2016):
//! - 0: select all literals
//! - 20: select all maximal literals
//! - 21: unique maximal, else max-weight negative, else all maximal
//! - 22: max-weight negative literal, else all maximal
//!
//! Selection runs once, when a clause is activated: the chosen literals are
//! moved to the front of the literal sequence and the clause's `selected`
//! count is set before the clause reaches any index.

use crate::logic::{Clause, Env, LiteralComparisonMode, LiteralId, TermOrdering};
use serde::{Deserialize, Serialize};

/// Which literal selection strategy to run at activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// Selection 0: all literals.
    Total,
    /// Selection 20: all maximal literals.
    Maximal,
    /// Selection 21: unique maximal, else max-weight negative, else maximal.
    #[default]
    UniqueMaximalOrNegative,
    /// Selection 22: max-weight negative, else all maximal.
    NegativeOrMaximal,
}

impl SelectionStrategy {
    /// Compute the selection: the reordered literal sequence (selected
    /// literals in front) and the number selected.
    pub fn select(
        self,
        env: &Env,
        clause: &Clause,
        mode: LiteralComparisonMode,
    ) -> (Vec<LiteralId>, usize) {
        let literals = &clause.literals;
        if literals.len() <= 1 {
            return (literals.clone(), literals.len());
        }

        match self {
            SelectionStrategy::Total => (literals.clone(), literals.len()),
            SelectionStrategy::Maximal => reorder(literals, maximal_indices(env, literals, mode)),
            SelectionStrategy::UniqueMaximalOrNegative => {
                let maximal = maximal_indices(env, literals, mode);
                if maximal.len() == 1 {
                    return reorder(literals, maximal);
                }
                match max_weight_negative(env, literals) {
                    Some(neg) => reorder(literals, vec![neg]),
                    None => reorder(literals, maximal),
                }
            }
            SelectionStrategy::NegativeOrMaximal => match max_weight_negative(env, literals) {
                Some(neg) => reorder(literals, vec![neg]),
                None => reorder(literals, maximal_indices(env, literals, mode)),
            },
        }
    }
}

/// Indices of the maximal literals under the literal ordering.
fn maximal_indices(env: &Env, literals: &[LiteralId], mode: LiteralComparisonMode) -> Vec<usize> {
    let mut maximal = Vec::new();
    for i in 0..literals.len() {
        let dominated = (0..literals.len()).any(|j| {
            j != i
                && env.ordering.compare_literals(
                    &env.terms,
                    &env.literals,
                    literals[j],
                    literals[i],
                    mode,
                ) == TermOrdering::Greater
        });
        if !dominated {
            maximal.push(i);
        }
    }
    maximal
}

/// Index of the heaviest negative literal, if the clause has any negative
/// literal.
fn max_weight_negative(env: &Env, literals: &[LiteralId]) -> Option<usize> {
    literals
        .iter()
        .enumerate()
        .filter(|(_, l)| !l.is_positive())
        .max_by_key(|(_, &l)| env.literals.weight(l))
        .map(|(i, _)| i)
}

/// Move the literals at `chosen` indices to the front, preserving relative
/// order on both sides.
fn reorder(literals: &[LiteralId], chosen: Vec<usize>) -> (Vec<LiteralId>, usize) {
    let selected = chosen.len();
    let mut front: Vec<LiteralId> = chosen.iter().map(|&i| literals[i]).collect();
    let chosen_set: std::collections::HashSet<usize> = chosen.into_iter().collect();
    for (i, &lit) in literals.iter().enumerate() {
        if !chosen_set.contains(&i) {
            front.push(lit);
        }
    }
    (front, selected)
}
