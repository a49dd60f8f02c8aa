//! Clause containers: Unprocessed, Passive, Active.
//!
//! Each container owns an `added` / `removed` / `selected` event triple and
//! performs the store transitions of the clauses it holds; `store` mirrors
//! container membership exactly, and a clause is in at most one container at
//! a time. Within a container, `added` fires strictly before any later
//! `selected` or `removed` for the same clause.

pub mod active;
pub mod passive;
pub mod split;
pub mod unprocessed;

pub use active::ActiveClauseContainer;
pub use passive::AgeWeightPassive;
pub use split::{PredicateSplitPassive, SplitQueueConfig};
pub use unprocessed::UnprocessedClauseContainer;

use crate::event::Event;
use crate::logic::{Clause, ClauseArena, ClauseId, ClauseRef, LiteralBank};

/// The event triple every clause container exposes.
#[derive(Default)]
pub struct ClauseEvents {
    pub added: Event<ClauseRef>,
    pub removed: Event<ClauseRef>,
    pub selected: Event<ClauseRef>,
}

impl ClauseEvents {
    pub fn new() -> Self {
        ClauseEvents::default()
    }
}

/// Priority container of clauses awaiting selection.
///
/// Besides the container operations proper, a passive container supports a
/// side-effect-free selection rehearsal (`simulation_*`) used by the limit
/// controller to predict which clauses would be chosen under tightened
/// limits, and admission predicates over its age/weight limits.
pub trait PassiveClauseContainer {
    fn add(&mut self, arena: &mut ClauseArena, id: ClauseId);

    /// Remove a clause that is still passive (backward simplification).
    fn remove(&mut self, arena: &mut ClauseArena, id: ClauseId);

    /// Pop the next clause according to the selection policy. Must only be
    /// called on a non-empty container.
    fn pop_selected(&mut self, arena: &mut ClauseArena) -> ClauseRef;

    fn is_empty(&self) -> bool;

    /// Upper estimate of the number of contained clauses.
    fn size_estimate(&self) -> usize;

    /// Start a selection rehearsal. Real balances and contents are not
    /// touched and no events fire until the rehearsal is (optionally)
    /// committed via `set_limits_from_simulation`.
    fn simulation_init(&mut self);
    fn simulation_has_next(&mut self) -> bool;
    fn simulation_pop_selected(&mut self);

    /// Drop all limits. Returns whether any limit was tightened (never, but
    /// the signature matches `set_limits_from_simulation`).
    fn set_limits_to_max(&mut self) -> bool;

    /// Install the limits predicted by the last rehearsal. Returns whether
    /// at least one limit was tightened.
    fn set_limits_from_simulation(&mut self) -> bool;

    /// Evict clauses no queue can select under the current limits. Returns
    /// the clauses that left the container entirely; `removed` has fired for
    /// each.
    fn on_limits_updated(&mut self, arena: &mut ClauseArena) -> Vec<ClauseId>;

    fn age_limited(&self) -> bool;
    fn weight_limited(&self) -> bool;

    /// Loosest age limit over the underlying queues, `None` if unlimited.
    fn age_limit(&self) -> Option<u32>;
    /// Loosest weight limit over the underlying queues, `None` if unlimited.
    fn weight_limit(&self) -> Option<u32>;

    /// True iff some queue the clause would be stored in admits its age.
    fn fulfils_age_limit(&self, clause: &Clause) -> bool;
    /// True iff some queue the clause would be stored in admits its weight.
    fn fulfils_weight_limit(&self, clause: &Clause) -> bool;

    /// True iff children generated from this clause could still be admitted
    /// by some queue.
    fn children_potentially_fulfil_limits(&self, clause: &Clause, literals: &LiteralBank) -> bool;

    fn events(&self) -> &ClauseEvents;
}
