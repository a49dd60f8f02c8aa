//! Run statistics and the termination report.

use crate::logic::{ClauseId, Rule};
use serde::Serialize;

/// Why the saturation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TerminationReason {
    /// The empty clause was derived.
    Refutation,
    /// The clause set is saturated.
    Satisfiable,
    TimeLimit,
    MemoryLimit,
    /// Saturated, but the strategy discarded clauses: no verdict.
    RefutationNotFound,
    #[default]
    Unknown,
}

/// Counters and the outcome of one saturation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    pub termination_reason: TerminationReason,
    pub initial_clauses: u64,
    pub generated_clauses: u64,
    pub activations: u64,
    pub passive_added: u64,
    pub iterations: u64,
    pub forward_simplified: u64,
    pub forward_subsumed: u64,
    pub backward_simplified: u64,
    pub backward_subsumed: u64,
    pub tautologies_deleted: u64,
    /// Clauses dropped by age/weight limits without being redundant.
    pub discarded_non_redundant: u64,
    pub limit_tightenings: u64,
    pub final_active: u64,
    pub final_passive: u64,
    /// The empty clause, when the reason is `Refutation`.
    pub refutation: Option<ClauseId>,
}

impl Statistics {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("statistics serialize")
    }
}

/// One node of the refutation's inference graph.
#[derive(Debug, Clone, Serialize)]
pub struct ProofStep {
    pub clause: ClauseId,
    pub rule: Rule,
    pub parents: Vec<ClauseId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_serialize() {
        let mut stats = Statistics::default();
        stats.generated_clauses = 42;
        stats.termination_reason = TerminationReason::Satisfiable;

        let json = stats.to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["generated_clauses"].as_u64(), Some(42));
        assert_eq!(value["termination_reason"].as_str(), Some("Satisfiable"));
        assert!(value["refutation"].is_null());
    }
}
