//! Term and literal indices over Active clauses, and their manager.
//!
//! Each index pairs an indexing structure with a clause-event handler: the
//! manager subscribes to the Active container's `added`/`removed` events,
//! queues the observed clause handles, and routes them to every live index
//! when the saturation loop flushes at its next barrier. The four term index
//! variants differ only in which terms they extract from a clause; the
//! extraction rule is evaluated once, at the moment the clause becomes
//! Active, and clauses are immutable while Active, so insert and remove see
//! the same terms.
//!
//! Queries return lazy cursors; the underlying index must not be mutated
//! while a cursor is live, which a generation counter enforces on each
//! `next`.

pub mod discrimination_tree;
pub mod literal_index;

pub use discrimination_tree::{DiscriminationTree, TermEntry};
pub use literal_index::{LiteralEntry, LiteralIndex};

use crate::containers::ClauseEvents;
use crate::event::Subscription;
use crate::logic::{
    match_terms, unify, ClauseRef, Env, LiteralId, Substitution, TermId, TermOrdering,
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

// =============================================================================
// Query cursor
// =============================================================================

/// Lazy query result cursor. Iteration panics if the index is mutated while
/// the cursor is live.
pub struct QueryCursor<T> {
    items: std::vec::IntoIter<T>,
    generation: Rc<Cell<u64>>,
    expected: u64,
}

impl<T> QueryCursor<T> {
    pub(crate) fn new(items: Vec<T>, generation: Rc<Cell<u64>>) -> Self {
        let expected = generation.get();
        QueryCursor {
            items: items.into_iter(),
            generation,
            expected,
        }
    }
}

impl<T> Iterator for QueryCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        assert_eq!(
            self.generation.get(),
            self.expected,
            "index mutated while a query cursor is live"
        );
        self.items.next()
    }
}

// =============================================================================
// Term index variants
// =============================================================================

/// Which terms a term index extracts from an Active clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermIndexKind {
    /// Rewritable non-variable subterms of all selected literals
    /// (backward superposition).
    SuperpositionSubterms,
    /// Superposition left-hand sides of selected positive equalities
    /// (forward superposition).
    SuperpositionLhs,
    /// All non-variable subterms of all literals (backward demodulation).
    DemodulationSubterms,
    /// Demodulation-oriented sides of unit positive equalities
    /// (forward demodulation).
    DemodulationLhs,
}

/// A query hit: the indexed term occurrence and, on request, the verified
/// substitution against the query.
#[derive(Debug, Clone)]
pub struct TermQueryResult {
    pub term: TermId,
    pub literal: LiteralId,
    pub clause: crate::logic::ClauseId,
    pub substitution: Option<Substitution>,
}

/// Non-variable subterms a superposition inference may rewrite inside a
/// literal: for a positive equality only the non-smaller side's subterms,
/// for anything else all argument subterms.
pub fn rewritable_subterms(env: &Env, literal: LiteralId, out: &mut Vec<TermId>) {
    if literal.is_positive() && env.literals.is_equality(literal) {
        let (lhs, rhs) = env
            .literals
            .equality_sides(literal)
            .expect("equality literal has two sides");
        match env.compare(lhs, rhs) {
            TermOrdering::Greater => env.terms.non_variable_subterms(lhs, out),
            TermOrdering::Less => env.terms.non_variable_subterms(rhs, out),
            TermOrdering::Equal => {}
            TermOrdering::Incomparable => {
                env.terms.non_variable_subterms(lhs, out);
                env.terms.non_variable_subterms(rhs, out);
            }
        }
    } else {
        for &arg in env.literals.args(literal) {
            env.terms.non_variable_subterms(arg, out);
        }
    }
}

/// Oriented `(from, into)` side pairs of a positive equality usable as
/// superposition left-hand sides. Variables never qualify.
pub fn superposition_lhs_pairs(env: &Env, literal: LiteralId) -> Vec<(TermId, TermId)> {
    let (lhs, rhs) = match env.literals.equality_sides(literal) {
        Some(sides) if literal.is_positive() => sides,
        _ => return Vec::new(),
    };
    let mut pairs = match env.compare(lhs, rhs) {
        TermOrdering::Greater => vec![(lhs, rhs)],
        TermOrdering::Less => vec![(rhs, lhs)],
        TermOrdering::Equal => Vec::new(),
        TermOrdering::Incomparable => vec![(lhs, rhs), (rhs, lhs)],
    };
    pairs.retain(|&(from, _)| !env.terms.is_var(from));
    pairs
}

/// Oriented `(from, into)` side pairs of a unit positive equality usable for
/// demodulation. An unordered side qualifies only if it binds every variable
/// of the other side.
pub fn demodulation_lhs_pairs(env: &Env, literal: LiteralId) -> Vec<(TermId, TermId)> {
    let (lhs, rhs) = match env.literals.equality_sides(literal) {
        Some(sides) if literal.is_positive() => sides,
        _ => return Vec::new(),
    };
    let mut pairs = match env.compare(lhs, rhs) {
        TermOrdering::Greater => vec![(lhs, rhs)],
        TermOrdering::Less => vec![(rhs, lhs)],
        TermOrdering::Equal => Vec::new(),
        TermOrdering::Incomparable => {
            let mut lhs_vars = std::collections::HashSet::new();
            let mut rhs_vars = std::collections::HashSet::new();
            env.terms.collect_vars(lhs, &mut lhs_vars);
            env.terms.collect_vars(rhs, &mut rhs_vars);
            let mut pairs = Vec::new();
            if rhs_vars.is_subset(&lhs_vars) {
                pairs.push((lhs, rhs));
            }
            if lhs_vars.is_subset(&rhs_vars) {
                pairs.push((rhs, lhs));
            }
            pairs
        }
    };
    pairs.retain(|&(from, _)| !env.terms.is_var(from));
    pairs
}

/// Discrimination tree plus the extraction rule of one index variant.
pub struct TermIndex {
    kind: TermIndexKind,
    tree: DiscriminationTree,
    generation: Rc<Cell<u64>>,
}

impl TermIndex {
    pub fn new(kind: TermIndexKind) -> Self {
        TermIndex {
            kind,
            tree: DiscriminationTree::new(),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn kind(&self) -> TermIndexKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The terms this index extracts from one literal of the clause.
    fn extract_from_literal(&self, env: &Env, literal: LiteralId, out: &mut Vec<TermId>) {
        match self.kind {
            TermIndexKind::SuperpositionSubterms => rewritable_subterms(env, literal, out),
            TermIndexKind::SuperpositionLhs => {
                out.extend(superposition_lhs_pairs(env, literal).iter().map(|&(from, _)| from));
            }
            TermIndexKind::DemodulationSubterms => {
                for &arg in env.literals.args(literal) {
                    env.terms.non_variable_subterms(arg, out);
                }
            }
            TermIndexKind::DemodulationLhs => {
                out.extend(demodulation_lhs_pairs(env, literal).iter().map(|&(from, _)| from));
            }
        }
    }

    /// The `(term, literal)` pairs the extraction rule yields for a clause.
    fn extract(&self, env: &Env, cr: &ClauseRef) -> Vec<(TermId, LiteralId)> {
        let clause = &cr.clause;
        let literals: &[LiteralId] = match self.kind {
            TermIndexKind::SuperpositionSubterms | TermIndexKind::SuperpositionLhs => {
                clause.selected_literals()
            }
            TermIndexKind::DemodulationSubterms => &clause.literals,
            TermIndexKind::DemodulationLhs => {
                if clause.len() != 1 {
                    return Vec::new();
                }
                &clause.literals
            }
        };

        let mut pairs = Vec::new();
        for &literal in literals {
            let mut terms = Vec::new();
            self.extract_from_literal(env, literal, &mut terms);
            // Each (term, literal) pair occupies exactly one slot.
            let mut seen = std::collections::HashSet::new();
            for term in terms {
                if seen.insert(term) {
                    pairs.push((term, literal));
                }
            }
        }
        pairs
    }

    /// Maintain the index from a clause event.
    pub fn handle_clause(&mut self, env: &Env, cr: &ClauseRef, adding: bool) {
        self.generation.set(self.generation.get() + 1);
        for (term, literal) in self.extract(env, cr) {
            let entry = TermEntry {
                term,
                literal,
                clause: cr.id,
            };
            if adding {
                self.tree.insert(&env.terms, entry);
            } else {
                self.tree.remove(&env.terms, entry);
            }
        }
    }

    /// Structural candidates for unification with `query`, unverified: all
    /// variables behave as wildcards. Callers standardize apart and unify
    /// for real.
    pub fn candidates_unifiable(&self, env: &Env, query: TermId) -> QueryCursor<TermEntry> {
        QueryCursor::new(
            self.tree.unifiable(&env.terms, query),
            Rc::clone(&self.generation),
        )
    }

    /// Structural candidates generalizing `query`, unverified.
    pub fn candidates_generalizations(&self, env: &Env, query: TermId) -> QueryCursor<TermEntry> {
        QueryCursor::new(
            self.tree.generalizations(&env.terms, query),
            Rc::clone(&self.generation),
        )
    }

    /// Structural candidates instantiating `query`, unverified.
    pub fn candidates_instances(&self, env: &Env, query: TermId) -> QueryCursor<TermEntry> {
        QueryCursor::new(
            self.tree.instances(&env.terms, query),
            Rc::clone(&self.generation),
        )
    }

    /// Entries whose term unifies with `query`. Query and stored terms share
    /// one variable namespace; callers that need standardized-apart results
    /// rename before querying.
    pub fn get_unifications(
        &self,
        env: &Env,
        query: TermId,
        with_subst: bool,
    ) -> QueryCursor<TermQueryResult> {
        let results = self
            .tree
            .unifiable(&env.terms, query)
            .into_iter()
            .filter_map(|entry| {
                let mut subst = Substitution::new();
                if unify(&env.terms, entry.term, query, &mut subst) {
                    Some(Self::result(entry, subst, with_subst))
                } else {
                    None
                }
            })
            .collect();
        QueryCursor::new(results, Rc::clone(&self.generation))
    }

    /// Entries whose term generalizes `query` (stored `s` with `sθ = query`).
    pub fn get_generalizations(
        &self,
        env: &Env,
        query: TermId,
        with_subst: bool,
    ) -> QueryCursor<TermQueryResult> {
        let results = self
            .tree
            .generalizations(&env.terms, query)
            .into_iter()
            .filter_map(|entry| {
                let mut subst = Substitution::new();
                if match_terms(&env.terms, entry.term, query, &mut subst) {
                    Some(Self::result(entry, subst, with_subst))
                } else {
                    None
                }
            })
            .collect();
        QueryCursor::new(results, Rc::clone(&self.generation))
    }

    /// Entries whose term instantiates `query` (stored `s` with `queryθ = s`).
    pub fn get_instances(
        &self,
        env: &Env,
        query: TermId,
        with_subst: bool,
    ) -> QueryCursor<TermQueryResult> {
        let results = self
            .tree
            .instances(&env.terms, query)
            .into_iter()
            .filter_map(|entry| {
                let mut subst = Substitution::new();
                if match_terms(&env.terms, query, entry.term, &mut subst) {
                    Some(Self::result(entry, subst, with_subst))
                } else {
                    None
                }
            })
            .collect();
        QueryCursor::new(results, Rc::clone(&self.generation))
    }

    fn result(entry: TermEntry, subst: Substitution, with_subst: bool) -> TermQueryResult {
        TermQueryResult {
            term: entry.term,
            literal: entry.literal,
            clause: entry.clause,
            substitution: with_subst.then_some(subst),
        }
    }
}

// =============================================================================
// Index manager
// =============================================================================

/// Tag naming an index variant in the manager's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexTag {
    GeneratingLiterals,
    SuperpositionSubterms,
    SuperpositionLhs,
    DemodulationSubterms,
    DemodulationLhs,
}

impl IndexTag {
    fn term_kind(self) -> Option<TermIndexKind> {
        match self {
            IndexTag::GeneratingLiterals => None,
            IndexTag::SuperpositionSubterms => Some(TermIndexKind::SuperpositionSubterms),
            IndexTag::SuperpositionLhs => Some(TermIndexKind::SuperpositionLhs),
            IndexTag::DemodulationSubterms => Some(TermIndexKind::DemodulationSubterms),
            IndexTag::DemodulationLhs => Some(TermIndexKind::DemodulationLhs),
        }
    }
}

enum IndexSlot {
    Literals(LiteralIndex),
    Terms(TermIndex),
}

impl IndexSlot {
    fn handle_clause(&mut self, env: &Env, cr: &ClauseRef, adding: bool) {
        match self {
            IndexSlot::Literals(index) => index.handle_clause(env, cr, adding),
            IndexSlot::Terms(index) => index.handle_clause(env, cr, adding),
        }
    }
}

/// Reference-counted registry of indices, maintained from the Active
/// container's events.
///
/// `request` creates the index on first use (seeding it from the clauses
/// already Active) and `release` destroys it when the last user lets go.
/// Event payloads are queued as they fire and routed to the indices when the
/// saturation loop flushes them at its next barrier.
#[derive(Default)]
pub struct IndexManager {
    slots: HashMap<IndexTag, (usize, IndexSlot)>,
    pending: Rc<RefCell<VecDeque<(ClauseRef, bool)>>>,
    subscriptions: Vec<Subscription>,
}

impl IndexManager {
    pub fn new() -> Self {
        IndexManager::default()
    }

    /// Subscribe to an Active container's events. The subscriptions live as
    /// long as the manager.
    pub fn attach(&mut self, events: &ClauseEvents) {
        let pending = Rc::clone(&self.pending);
        self.subscriptions.push(
            events
                .added
                .subscribe(move |cr| pending.borrow_mut().push_back((cr.clone(), true))),
        );
        let pending = Rc::clone(&self.pending);
        self.subscriptions.push(
            events
                .removed
                .subscribe(move |cr| pending.borrow_mut().push_back((cr.clone(), false))),
        );
    }

    /// Route queued clause events to every live index.
    pub fn process_pending(&mut self, env: &Env) {
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let (cr, adding) = match next {
                Some(op) => op,
                None => break,
            };
            for (_, slot) in self.slots.values_mut() {
                slot.handle_clause(env, &cr, adding);
            }
        }
    }

    /// Get or create the index named by `tag`, seeding a new one from the
    /// clauses currently Active.
    pub fn request(&mut self, tag: IndexTag, env: &Env, active: &[ClauseRef]) {
        let entry = self.slots.entry(tag).or_insert_with(|| {
            let mut slot = match tag.term_kind() {
                Some(kind) => IndexSlot::Terms(TermIndex::new(kind)),
                None => IndexSlot::Literals(LiteralIndex::new()),
            };
            for cr in active {
                slot.handle_clause(env, cr, true);
            }
            (0, slot)
        });
        entry.0 += 1;
    }

    /// Drop one reference to the index; the index is destroyed when the
    /// count reaches zero.
    pub fn release(&mut self, tag: IndexTag) {
        let remove = match self.slots.get_mut(&tag) {
            Some(entry) => {
                debug_assert!(entry.0 > 0);
                entry.0 -= 1;
                entry.0 == 0
            }
            None => false,
        };
        if remove {
            self.slots.remove(&tag);
        }
    }

    pub fn has(&self, tag: IndexTag) -> bool {
        self.slots.contains_key(&tag)
    }

    pub fn generating_literals(&self) -> Option<&LiteralIndex> {
        match self.slots.get(&IndexTag::GeneratingLiterals) {
            Some((_, IndexSlot::Literals(index))) => Some(index),
            _ => None,
        }
    }

    pub fn term_index(&self, tag: IndexTag) -> Option<&TermIndex> {
        match self.slots.get(&tag) {
            Some((_, IndexSlot::Terms(index))) => Some(index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Clause, ClauseArena, ClauseOrigin};

    fn active_clause(
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
    fn test_superposition_lhs_extraction_oriented() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let fa = env.app("f", vec![a]).unwrap();
        // f(a) = a orients left to right.
        let eq = env.equality(fa, a, true);
        let cr = active_clause(&mut env, &mut arena, vec![eq], 1);

        let mut index = TermIndex::new(TermIndexKind::SuperpositionLhs);
        index.handle_clause(&env, &cr, true);

        assert_eq!(index.len(), 1);
        let hits: Vec<_> = index.get_generalizations(&env, fa, false).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].term, fa);
    }

    #[test]
    fn test_superposition_lhs_unordered_keeps_both_sides() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let x = env.var(0);
        let y = env.var(1);
        let fxy = env.app("f", vec![x, y]).unwrap();
        let fyx = env.app("f", vec![y, x]).unwrap();
        let eq = env.equality(fxy, fyx, true);
        let cr = active_clause(&mut env, &mut arena, vec![eq], 1);

        let mut index = TermIndex::new(TermIndexKind::SuperpositionLhs);
        index.handle_clause(&env, &cr, true);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_demodulation_lhs_units_only() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let fa = env.app("f", vec![a]).unwrap();
        let eq = env.equality(fa, a, true);
        let p = env.literal("p", vec![a], true).unwrap();

        let unit = active_clause(&mut env, &mut arena, vec![eq], 1);
        let non_unit = active_clause(&mut env, &mut arena, vec![eq, p], 2);

        let mut index = TermIndex::new(TermIndexKind::DemodulationLhs);
        index.handle_clause(&env, &unit, true);
        index.handle_clause(&env, &non_unit, true);

        // Only the unit clause's oriented side is indexed.
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_demodulation_subterms_covers_all_literals() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let fa = env.app("f", vec![a]).unwrap();
        let p = env.literal("p", vec![fa], true).unwrap();
        let q = env.literal("q", vec![a], false).unwrap();

        // Only one literal is selected, but demodulation indexes both.
        let cr = active_clause(&mut env, &mut arena, vec![p, q], 1);

        let mut index = TermIndex::new(TermIndexKind::DemodulationSubterms);
        index.handle_clause(&env, &cr, true);

        // f(a) and a from p, a from q; a is shared between literals so it
        // occupies one slot per literal.
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_insert_remove_symmetry() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let fa = env.app("f", vec![a]).unwrap();
        let eq = env.equality(fa, a, true);
        let cr = active_clause(&mut env, &mut arena, vec![eq], 1);

        let mut index = TermIndex::new(TermIndexKind::SuperpositionSubterms);
        index.handle_clause(&env, &cr, true);
        assert!(!index.is_empty());

        index.handle_clause(&env, &cr, false);
        assert!(index.is_empty());
    }

    #[test]
    fn test_get_unifications_verifies() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let x = env.var(0);
        let a = env.constant("a").unwrap();
        let b = env.constant("b").unwrap();
        let fxx = env.app("f", vec![x, x]).unwrap();
        let gb = env.app("g", vec![b]).unwrap();
        let eq = env.equality(fxx, gb, true);
        let cr = active_clause(&mut env, &mut arena, vec![eq], 1);

        let mut index = TermIndex::new(TermIndexKind::SuperpositionLhs);
        index.handle_clause(&env, &cr, true);

        // f(a, b) is a structural candidate for f(X, X) but fails real
        // unification; the cursor must filter it out.
        let fab = env.app("f", vec![a, b]).unwrap();
        assert_eq!(index.get_unifications(&env, fab, false).count(), 0);

        let faa = env.app("f", vec![a, a]).unwrap();
        let hits: Vec<_> = index.get_unifications(&env, faa, true).collect();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].substitution.is_some());
    }

    #[test]
    fn test_manager_request_release_refcount() {
        let env = Env::new();
        let mut manager = IndexManager::new();

        manager.request(IndexTag::GeneratingLiterals, &env, &[]);
        manager.request(IndexTag::GeneratingLiterals, &env, &[]);
        assert!(manager.generating_literals().is_some());

        manager.release(IndexTag::GeneratingLiterals);
        assert!(manager.generating_literals().is_some());
        manager.release(IndexTag::GeneratingLiterals);
        assert!(manager.generating_literals().is_none());
    }

    #[test]
    fn test_manager_routes_events_on_flush() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let p = env.literal("p", vec![a], true).unwrap();
        let cr = active_clause(&mut env, &mut arena, vec![p], 1);

        let events = ClauseEvents::new();
        let mut manager = IndexManager::new();
        manager.attach(&events);
        manager.request(IndexTag::GeneratingLiterals, &env, &[]);

        events.added.fire(&cr);
        assert_eq!(manager.generating_literals().unwrap().len(), 0);

        manager.process_pending(&env);
        assert_eq!(manager.generating_literals().unwrap().len(), 1);

        events.removed.fire(&cr);
        manager.process_pending(&env);
        assert_eq!(manager.generating_literals().unwrap().len(), 0);
    }

    #[test]
    fn test_request_seeds_from_active() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();
        let a = env.constant("a").unwrap();
        let p = env.literal("p", vec![a], true).unwrap();
        let cr = active_clause(&mut env, &mut arena, vec![p], 1);

        let mut manager = IndexManager::new();
        manager.request(IndexTag::GeneratingLiterals, &env, &[cr]);
        assert_eq!(manager.generating_literals().unwrap().len(), 1);
    }
}
