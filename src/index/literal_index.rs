//! Index of the selected literals of Active clauses.
//!
//! Generating inferences resolve against selected literals only, so the
//! index discriminates by predicate and polarity; the limit-driven discard
//! pass walks all entries. Entries keep their insertion order, which the
//! discard pass relies on to report removals deterministically.

use crate::logic::{ClauseId, ClauseRef, Env, LiteralId};
use indexmap::IndexSet;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use super::QueryCursor;

/// One indexed selected-literal occurrence.
pub type LiteralEntry = (LiteralId, ClauseId);

#[derive(Default)]
pub struct LiteralIndex {
    /// All entries, insertion-ordered.
    entries: IndexSet<LiteralEntry>,
    /// Entries grouped by predicate and polarity.
    by_header: HashMap<(u32, bool), IndexSet<LiteralEntry>>,
    generation: Rc<Cell<u64>>,
}

impl LiteralIndex {
    pub fn new() -> Self {
        LiteralIndex::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn header(env: &Env, literal: LiteralId) -> (u32, bool) {
        (
            env.literals.predicate(literal).as_u32(),
            literal.is_positive(),
        )
    }

    /// Maintain the index from a clause event: insert or remove the selected
    /// literals of the clause.
    pub fn handle_clause(&mut self, env: &Env, cr: &ClauseRef, adding: bool) {
        self.generation.set(self.generation.get() + 1);
        for &literal in cr.clause.selected_literals() {
            let entry = (literal, cr.id);
            if adding {
                self.entries.insert(entry);
                self.by_header
                    .entry(Self::header(env, literal))
                    .or_default()
                    .insert(entry);
            } else {
                self.entries.shift_remove(&entry);
                if let Some(group) = self.by_header.get_mut(&Self::header(env, literal)) {
                    group.shift_remove(&entry);
                }
            }
        }
    }

    /// All entries in insertion order.
    pub fn get_all(&self) -> QueryCursor<LiteralEntry> {
        QueryCursor::new(
            self.entries.iter().copied().collect(),
            Rc::clone(&self.generation),
        )
    }

    /// Entries whose literal has the same predicate and the opposite
    /// polarity; unification candidates for resolving against `literal`.
    pub fn complement_candidates(&self, env: &Env, literal: LiteralId) -> QueryCursor<LiteralEntry> {
        let (predicate, positive) = Self::header(env, literal);
        let items = self
            .by_header
            .get(&(predicate, !positive))
            .map(|group| group.iter().copied().collect())
            .unwrap_or_default();
        QueryCursor::new(items, Rc::clone(&self.generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Clause, ClauseArena, ClauseOrigin};

    fn activated_clause(
        env: &mut Env,
        arena: &mut ClauseArena,
        literals: Vec<LiteralId>,
        selected: usize,
    ) -> ClauseRef {
        let mut clause = Clause::input(literals, ClauseOrigin::Axiom, &env.literals);
        clause.selected = selected;
        let id = arena.insert(clause);
        arena.clause_ref(id)
    }

    #[test]
    fn test_only_selected_literals_indexed() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let p = env.literal("p", vec![a], true).unwrap();
        let q = env.literal("q", vec![a], true).unwrap();

        let cr = activated_clause(&mut env, &mut arena, vec![p, q], 1);

        let mut index = LiteralIndex::new();
        index.handle_clause(&env, &cr, true);

        assert_eq!(index.len(), 1);
        let all: Vec<_> = index.get_all().collect();
        assert_eq!(all, vec![(p, cr.id)]);
    }

    #[test]
    fn test_complement_candidates() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let p_pos = env.literal("p", vec![a], true).unwrap();
        let x = env.var(0);
        let p_neg = env.literal("p", vec![x], false).unwrap();
        let q_pos = env.literal("q", vec![a], true).unwrap();

        let c1 = activated_clause(&mut env, &mut arena, vec![p_pos], 1);
        let c2 = activated_clause(&mut env, &mut arena, vec![q_pos], 1);

        let mut index = LiteralIndex::new();
        index.handle_clause(&env, &c1, true);
        index.handle_clause(&env, &c2, true);

        let candidates: Vec<_> = index.complement_candidates(&env, p_neg).collect();
        assert_eq!(candidates, vec![(p_pos, c1.id)]);

        let candidates: Vec<_> = index.complement_candidates(&env, q_pos.complement()).collect();
        assert_eq!(candidates, vec![(q_pos, c2.id)]);
    }

    #[test]
    fn test_remove_on_clause_event() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let p = env.literal("p", vec![a], true).unwrap();

        let cr = activated_clause(&mut env, &mut arena, vec![p], 1);

        let mut index = LiteralIndex::new();
        index.handle_clause(&env, &cr, true);
        assert_eq!(index.len(), 1);

        index.handle_clause(&env, &cr, false);
        assert!(index.is_empty());
    }

    #[test]
    #[should_panic(expected = "index mutated while a query cursor is live")]
    fn test_cursor_generation_guard() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let p = env.literal("p", vec![a], true).unwrap();

        let cr = activated_clause(&mut env, &mut arena, vec![p], 1);

        let mut index = LiteralIndex::new();
        index.handle_clause(&env, &cr, true);

        let mut cursor = index.get_all();
        index.handle_clause(&env, &cr, false);
        let _ = cursor.next();
    }
}
