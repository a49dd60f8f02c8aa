//! Generating and simplifying inference rules.
//!
//! Rules are a tagged set dispatched through a small table: each rule is a
//! plain function over the index snapshot and a clause. Generating rules
//! return child clauses (not yet in the arena); simplifying rules report
//! whether the clause is deleted or replaced. A rule finding no candidates
//! returns the empty set; that is not an error.

pub mod common;
pub mod condensation;
pub mod demodulation;
pub mod equality;
pub mod factoring;
pub mod normalize;
pub mod resolution;
pub mod subsumption;
pub mod superposition;

use crate::containers::ActiveClauseContainer;
use crate::index::IndexManager;
use crate::logic::{Clause, ClauseArena, ClauseId, Env};

/// The generating inference rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratingRule {
    Resolution,
    Factoring,
    EqualityResolution,
    EqualityFactoring,
    Superposition,
}

impl GeneratingRule {
    pub const ALL: [GeneratingRule; 5] = [
        GeneratingRule::Resolution,
        GeneratingRule::Factoring,
        GeneratingRule::EqualityResolution,
        GeneratingRule::EqualityFactoring,
        GeneratingRule::Superposition,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GeneratingRule::Resolution => "Resolution",
            GeneratingRule::Factoring => "Factoring",
            GeneratingRule::EqualityResolution => "EqualityResolution",
            GeneratingRule::EqualityFactoring => "EqualityFactoring",
            GeneratingRule::Superposition => "Superposition",
        }
    }

    /// Run the rule with `given` against the indexed Active clauses.
    pub fn apply(
        self,
        env: &mut Env,
        arena: &ClauseArena,
        indexes: &IndexManager,
        given: ClauseId,
    ) -> Vec<Clause> {
        match self {
            GeneratingRule::Resolution => resolution::resolution(env, arena, indexes, given),
            GeneratingRule::Factoring => factoring::factoring(env, arena, given),
            GeneratingRule::EqualityResolution => {
                equality::equality_resolution(env, arena, given)
            }
            GeneratingRule::EqualityFactoring => equality::equality_factoring(env, arena, given),
            GeneratingRule::Superposition => {
                superposition::superposition(env, arena, indexes, given)
            }
        }
    }
}

/// Outcome of a forward simplification rule on one clause.
#[derive(Debug)]
pub enum Simplification {
    /// The clause is redundant and leaves the search space.
    Deleted { premises: Vec<ClauseId> },
    /// The clause is replaced by a simpler one (same or smaller weight).
    Replaced { clause: Clause },
}

/// The forward simplification rules, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplifyingRule {
    /// Drop `t != t` literals and duplicate literals.
    Normalization,
    /// Delete tautologies (complementary pair or `t = t`).
    TautologyDeletion,
    /// Rewrite with unit equalities from the demodulation index.
    ForwardDemodulation,
    /// Delete clauses subsumed by an Active clause.
    ForwardSubsumption,
    /// Replace a clause by a proper factor that subsumes it.
    Condensation,
}

impl SimplifyingRule {
    pub fn name(self) -> &'static str {
        match self {
            SimplifyingRule::Normalization => "Normalization",
            SimplifyingRule::TautologyDeletion => "TautologyDeletion",
            SimplifyingRule::ForwardDemodulation => "ForwardDemodulation",
            SimplifyingRule::ForwardSubsumption => "ForwardSubsumption",
            SimplifyingRule::Condensation => "Condensation",
        }
    }

    /// Try the rule on one clause; `None` keeps the clause unchanged.
    pub fn apply_forward(
        self,
        env: &mut Env,
        arena: &ClauseArena,
        indexes: &IndexManager,
        active: &ActiveClauseContainer,
        id: ClauseId,
        demodulation_redundancy_check: bool,
    ) -> Option<Simplification> {
        match self {
            SimplifyingRule::Normalization => normalize::normalize(env, arena, id),
            SimplifyingRule::TautologyDeletion => normalize::tautology_deletion(env, arena, id),
            SimplifyingRule::ForwardDemodulation => demodulation::forward_demodulation(
                env,
                arena,
                indexes,
                id,
                demodulation_redundancy_check,
            ),
            SimplifyingRule::ForwardSubsumption => {
                subsumption::forward_subsumption(env, arena, active, id)
            }
            SimplifyingRule::Condensation => condensation::condensation(env, arena, id),
        }
    }
}
