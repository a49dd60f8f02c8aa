//! The Active container: clauses participating in generating inferences.
//!
//! Set-like with O(1) removal. On a `Tightened` limits change the container
//! sweeps the generating-literal index once, deduplicating clauses through a
//! visited set, and discards every Active clause the new limits rule out.
//! Removals are batched (collected first, applied second) and issued in
//! reverse of the clauses' addition order, so a replay of the event stream
//! is deterministic.

use super::ClauseEvents;
use crate::index::LiteralIndex;
use crate::logic::{ClauseArena, ClauseId, ClauseRef, LiteralBank, Store};
use crate::saturation::limits::{Limits, LimitsChange};
use indexmap::IndexMap;
use std::collections::HashSet;

pub struct ActiveClauseContainer {
    /// Members with their addition sequence numbers.
    clauses: IndexMap<ClauseId, u64>,
    next_seq: u64,
    pub events: ClauseEvents,
}

impl Default for ActiveClauseContainer {
    fn default() -> Self {
        ActiveClauseContainer::new()
    }
}

impl ActiveClauseContainer {
    pub fn new() -> Self {
        ActiveClauseContainer {
            clauses: IndexMap::new(),
            next_seq: 0,
            events: ClauseEvents::new(),
        }
    }

    pub fn add(&mut self, arena: &mut ClauseArena, id: ClauseId) {
        debug_assert_eq!(arena.store(id), Store::Selected);
        debug_assert!(!self.clauses.contains_key(&id));
        arena.set_store(id, Store::Active);
        self.clauses.insert(id, self.next_seq);
        self.next_seq += 1;
        self.events.added.fire(&arena.clause_ref(id));
    }

    /// Remove a clause that is no longer needed by the inference process
    /// (backward simplified, subsumed, or limit-discarded).
    pub fn remove(&mut self, arena: &mut ClauseArena, id: ClauseId) {
        assert_eq!(arena.store(id), Store::Active, "store must be Active on remove");
        self.clauses.swap_remove(&id);
        arena.set_store(id, Store::None);
        self.events.removed.fire(&arena.clause_ref(id));
    }

    pub fn contains(&self, id: ClauseId) -> bool {
        self.clauses.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ClauseId> + '_ {
        self.clauses.keys().copied()
    }

    /// Current members as event payloads (used to seed late-created indices).
    pub fn clause_refs(&self, arena: &ClauseArena) -> Vec<ClauseRef> {
        self.iter().map(|id| arena.clause_ref(id)).collect()
    }

    /// The limit-driven discard pass.
    ///
    /// Walks the generating-literal index once and removes each Active
    /// clause that the tightened limits rule out:
    /// - age above the limit: discard iff the effective weight exceeds the
    ///   weight limit;
    /// - age at the limit: discard iff the weight minus the heaviest
    ///   selected literal's weight reaches the weight limit;
    /// - age below the limit: keep.
    ///
    /// Returns the discarded clauses; they are reported by the caller as
    /// discarded non-redundant.
    pub fn on_limits_updated(
        &mut self,
        change: LimitsChange,
        arena: &mut ClauseArena,
        generating_index: Option<&LiteralIndex>,
        limits: &Limits,
        literals: &LiteralBank,
    ) -> Vec<ClauseId> {
        if change == LimitsChange::Loosened {
            return Vec::new();
        }
        let generating_index = match generating_index {
            Some(index) => index,
            None => return Vec::new(),
        };
        if !limits.age_limited() || !limits.weight_limited() {
            return Vec::new();
        }
        let age_limit = limits.age_limit().expect("age limited");
        let weight_limit = limits.weight_limit().expect("weight limited");

        let mut checked: HashSet<ClauseId> = HashSet::new();
        let mut batch: Vec<(u64, ClauseId)> = Vec::new();

        for (_, id) in generating_index.get_all() {
            let clause = arena.get(id);
            if clause.age < age_limit || !checked.insert(id) {
                continue;
            }

            let should_remove = if clause.age > age_limit {
                clause.weight > weight_limit
            } else {
                let max_selected = clause.max_selected_literal_weight(literals);
                clause.weight - max_selected >= weight_limit
            };

            if should_remove {
                debug_assert_eq!(arena.store(id), Store::Active);
                let seq = self.clauses[&id];
                batch.push((seq, id));
            }
        }

        // Apply in reverse of addition order.
        batch.sort_by(|a, b| b.0.cmp(&a.0));
        let discarded: Vec<ClauseId> = batch.into_iter().map(|(_, id)| id).collect();
        for &id in &discarded {
            self.remove(arena, id);
            debug_assert_ne!(arena.store(id), Store::Active);
        }
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Clause, ClauseOrigin, Env};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Build a two-literal clause with a selected literal of weight
    /// `selected_weight` and a second literal of weight `rest_weight`, then
    /// move it to Active through the proper store transitions.
    fn activate(
        env: &mut Env,
        arena: &mut ClauseArena,
        active: &mut ActiveClauseContainer,
        age: u32,
        selected_weight: u32,
        rest_weight: u32,
    ) -> ClauseId {
        let sel = literal_of_weight(env, selected_weight);
        let rest = literal_of_weight(env, rest_weight);
        let mut clause = Clause::input(vec![sel, rest], ClauseOrigin::Axiom, &env.literals);
        clause.age = age;
        clause.selected = 1;
        let id = arena.insert(clause);
        arena.set_store(id, Store::Selected);
        active.add(arena, id);
        id
    }

    /// A positive literal with the given symbol count (predicate plus
    /// variable arguments).
    fn literal_of_weight(env: &mut Env, weight: u32) -> crate::logic::LiteralId {
        assert!(weight >= 1);
        let args: Vec<_> = (0..weight - 1).map(|i| env.var(i)).collect();
        let name = format!("p{}", weight - 1);
        env.literal(&name, args, true).unwrap()
    }

    fn index_for(env: &Env, arena: &ClauseArena, active: &ActiveClauseContainer) -> LiteralIndex {
        let mut index = LiteralIndex::new();
        for id in active.iter() {
            index.handle_clause(env, &arena.clause_ref(id), true);
        }
        index
    }

    #[test]
    fn test_add_remove_events_and_store() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let mut active = ActiveClauseContainer::new();

        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = log.clone();
        let _t1 = active
            .events
            .added
            .subscribe(move |cr| l1.borrow_mut().push(("added", cr.id)));
        let l2 = log.clone();
        let _t2 = active
            .events
            .removed
            .subscribe(move |cr| l2.borrow_mut().push(("removed", cr.id)));

        let id = activate(&mut env, &mut arena, &mut active, 0, 2, 2);
        assert_eq!(arena.store(id), Store::Active);
        assert!(active.contains(id));

        active.remove(&mut arena, id);
        assert_eq!(arena.store(id), Store::None);
        assert!(active.is_empty());

        assert_eq!(*log.borrow(), vec![("added", id), ("removed", id)]);
    }

    #[test]
    fn test_lrs_discard_at_age_limit() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let mut active = ActiveClauseContainer::new();

        // All clauses age 10; weight = selected 1-weight literal plus a rest
        // literal of weight k, so weight - maxSelected = k.
        let ids: Vec<ClauseId> = (1..=100)
            .map(|k| activate(&mut env, &mut arena, &mut active, 10, 1, k))
            .collect();

        let index = index_for(&env, &arena, &active);
        let mut limits = Limits::default();
        limits.set_limits(Some(10), Some(50));

        let discarded = active.on_limits_updated(
            LimitsChange::Tightened,
            &mut arena,
            Some(&index),
            &limits,
            &env.literals,
        );

        // weight - maxSelected >= 50 means k >= 50: exactly 51 clauses.
        assert_eq!(discarded.len(), 51);
        for &id in &ids {
            let clause = arena.get(id);
            let over = clause.weight - clause.max_selected_literal_weight(&env.literals) >= 50;
            assert_eq!(!active.contains(id), over);
            if over {
                assert_eq!(arena.store(id), Store::None);
            } else {
                assert_eq!(arena.store(id), Store::Active);
            }
        }
    }

    #[test]
    fn test_lrs_discard_above_age_limit_uses_weight() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let mut active = ActiveClauseContainer::new();

        let light = activate(&mut env, &mut arena, &mut active, 12, 1, 2);
        let heavy = activate(&mut env, &mut arena, &mut active, 12, 1, 60);
        let young = activate(&mut env, &mut arena, &mut active, 3, 1, 90);

        let index = index_for(&env, &arena, &active);
        let mut limits = Limits::default();
        limits.set_limits(Some(10), Some(50));

        let discarded = active.on_limits_updated(
            LimitsChange::Tightened,
            &mut arena,
            Some(&index),
            &limits,
            &env.literals,
        );

        assert_eq!(discarded, vec![heavy]);
        assert!(active.contains(light));
        assert!(active.contains(young));
    }

    #[test]
    fn test_lrs_batch_removed_in_reverse_added_order() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let mut active = ActiveClauseContainer::new();

        let first = activate(&mut env, &mut arena, &mut active, 11, 1, 60);
        let second = activate(&mut env, &mut arena, &mut active, 11, 1, 70);

        let removed_order = Rc::new(RefCell::new(Vec::new()));
        let ro = removed_order.clone();
        let _t = active
            .events
            .removed
            .subscribe(move |cr| ro.borrow_mut().push(cr.id));

        let index = index_for(&env, &arena, &active);
        let mut limits = Limits::default();
        limits.set_limits(Some(10), Some(50));

        active.on_limits_updated(
            LimitsChange::Tightened,
            &mut arena,
            Some(&index),
            &limits,
            &env.literals,
        );

        assert_eq!(*removed_order.borrow(), vec![second, first]);
    }

    #[test]
    fn test_loosened_change_is_ignored() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let mut active = ActiveClauseContainer::new();

        activate(&mut env, &mut arena, &mut active, 12, 1, 60);
        let index = index_for(&env, &arena, &active);
        let mut limits = Limits::default();
        limits.set_limits(Some(10), Some(50));

        let discarded = active.on_limits_updated(
            LimitsChange::Loosened,
            &mut arena,
            Some(&index),
            &limits,
            &env.literals,
        );
        assert!(discarded.is_empty());
        assert_eq!(active.len(), 1);
    }
}
