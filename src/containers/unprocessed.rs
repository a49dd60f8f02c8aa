//! The Unprocessed container: clauses produced but not yet admitted to
//! Passive.
//!
//! Insertion order is kept; `pop` takes from the back by default (stack
//! discipline, which keeps recently generated clauses hot) or from the
//! front when configured FIFO.

use super::ClauseEvents;
use crate::logic::{ClauseArena, ClauseId, ClauseRef, Store};
use std::collections::VecDeque;

pub struct UnprocessedClauseContainer {
    data: VecDeque<ClauseId>,
    fifo: bool,
    pub events: ClauseEvents,
}

impl UnprocessedClauseContainer {
    pub fn new(fifo: bool) -> Self {
        UnprocessedClauseContainer {
            data: VecDeque::new(),
            fifo,
            events: ClauseEvents::new(),
        }
    }

    pub fn add(&mut self, arena: &mut ClauseArena, id: ClauseId) {
        debug_assert_eq!(arena.store(id), Store::None);
        arena.set_store(id, Store::Unprocessed);
        self.data.push_back(id);
        self.events.added.fire(&arena.clause_ref(id));
    }

    /// Pop the next clause, or `None` if the container is empty. The popped
    /// clause leaves the container (store becomes `None`) and `selected`
    /// fires for it.
    pub fn pop(&mut self, arena: &mut ClauseArena) -> Option<ClauseRef> {
        let id = if self.fifo {
            self.data.pop_front()?
        } else {
            self.data.pop_back()?
        };
        debug_assert_eq!(arena.store(id), Store::Unprocessed);
        arena.set_store(id, Store::None);
        let cr = arena.clause_ref(id);
        self.events.selected.fire(&cr);
        Some(cr)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}
