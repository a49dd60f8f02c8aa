//! Discrimination tree over interned terms.
//!
//! Indexed terms are flattened into their preorder symbol string, with
//! variables collapsed to a wildcard; entries live at the leaf reached by
//! that string. Retrieval walks the trie against the query's flattening and
//! returns candidate entries for the three query modes (unifiable,
//! generalizations, instances). Candidates are structural over-approximations
//! in which all variables behave as wildcards; callers confirm them with
//! real unification or matching.

use crate::logic::{ClauseId, FunctionId, LiteralId, TermBank, TermData, TermId};
use std::collections::HashMap;

/// One node key of the flattened preorder traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FlatKey {
    /// Function symbol with its arity (needed to skip subterms).
    App(FunctionId, u32),
    /// Any variable.
    Star,
}

fn flatten(terms: &TermBank, term: TermId, keys: &mut Vec<FlatKey>) {
    match terms.data(term) {
        TermData::Var(_) => keys.push(FlatKey::Star),
        TermData::App(f, args) => {
            keys.push(FlatKey::App(*f, args.len() as u32));
            for &arg in args {
                flatten(terms, arg, keys);
            }
        }
    }
}

/// Number of flat keys the subterm starting at `pos` occupies.
fn subterm_size(keys: &[FlatKey], pos: usize) -> usize {
    match keys[pos] {
        FlatKey::Star => 1,
        FlatKey::App(_, arity) => {
            let mut size = 1;
            for _ in 0..arity {
                size += subterm_size(keys, pos + size);
            }
            size
        }
    }
}

/// An indexed occurrence: a term inside a literal of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermEntry {
    pub term: TermId,
    pub literal: LiteralId,
    pub clause: ClauseId,
}

#[derive(Debug, Default)]
struct Node {
    children: HashMap<FlatKey, Node>,
    entries: Vec<TermEntry>,
}

impl Node {
    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.entries.is_empty()
    }
}

/// Retrieval mode of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Either side's variables may absorb the other side's subterms.
    Unifiable,
    /// Stored wildcards absorb query subterms (stored generalizes query).
    Generalizations,
    /// Query variables absorb stored subterms (stored instantiates query).
    Instances,
}

#[derive(Debug, Default)]
pub struct DiscriminationTree {
    root: Node,
    len: usize,
}

impl DiscriminationTree {
    pub fn new() -> Self {
        DiscriminationTree::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, terms: &TermBank, entry: TermEntry) {
        let mut keys = Vec::new();
        flatten(terms, entry.term, &mut keys);

        let mut node = &mut self.root;
        for key in keys {
            node = node.children.entry(key).or_default();
        }
        node.entries.push(entry);
        self.len += 1;
    }

    /// Remove one occurrence of the entry; empty branches are pruned.
    pub fn remove(&mut self, terms: &TermBank, entry: TermEntry) {
        let mut keys = Vec::new();
        flatten(terms, entry.term, &mut keys);
        if Self::remove_rec(&mut self.root, &keys, 0, entry) {
            self.len -= 1;
        }
    }

    fn remove_rec(node: &mut Node, keys: &[FlatKey], pos: usize, entry: TermEntry) -> bool {
        if pos == keys.len() {
            if let Some(at) = node.entries.iter().position(|e| *e == entry) {
                node.entries.remove(at);
                return true;
            }
            return false;
        }
        let key = keys[pos];
        let removed = match node.children.get_mut(&key) {
            Some(child) => {
                let removed = Self::remove_rec(child, keys, pos + 1, entry);
                if removed && child.is_empty() {
                    node.children.remove(&key);
                }
                removed
            }
            None => false,
        };
        removed
    }

    /// Candidates whose stored term may unify with the query term.
    pub fn unifiable(&self, terms: &TermBank, query: TermId) -> Vec<TermEntry> {
        self.retrieve(terms, query, Mode::Unifiable)
    }

    /// Candidates whose stored term may generalize the query term.
    pub fn generalizations(&self, terms: &TermBank, query: TermId) -> Vec<TermEntry> {
        self.retrieve(terms, query, Mode::Generalizations)
    }

    /// Candidates whose stored term may instantiate the query term.
    pub fn instances(&self, terms: &TermBank, query: TermId) -> Vec<TermEntry> {
        self.retrieve(terms, query, Mode::Instances)
    }

    fn retrieve(&self, terms: &TermBank, query: TermId, mode: Mode) -> Vec<TermEntry> {
        let mut keys = Vec::new();
        flatten(terms, query, &mut keys);
        let mut results = Vec::new();
        Self::retrieve_rec(&self.root, &keys, 0, mode, &mut results);
        results
    }

    fn retrieve_rec(
        node: &Node,
        keys: &[FlatKey],
        pos: usize,
        mode: Mode,
        results: &mut Vec<TermEntry>,
    ) {
        if pos == keys.len() {
            results.extend_from_slice(&node.entries);
            return;
        }

        let key = keys[pos];
        let query_star = key == FlatKey::Star;

        // A query wildcard absorbs one whole stored subterm: every child
        // branch is followed across that subterm.
        if query_star && mode != Mode::Generalizations {
            let mut after_skip = Vec::new();
            for (&child_key, child) in &node.children {
                let to_skip = match child_key {
                    FlatKey::Star => 0,
                    FlatKey::App(_, arity) => arity as usize,
                };
                Self::skip_subterms(child, to_skip, &mut after_skip);
            }
            for child in after_skip {
                Self::retrieve_rec(child, keys, pos + 1, mode, results);
            }
            // The stored Star child was covered by the skip (zero extra).
            return;
        }

        // Exact branch (including Star-to-Star for generalizations).
        if let Some(child) = node.children.get(&key) {
            Self::retrieve_rec(child, keys, pos + 1, mode, results);
        }

        // A stored wildcard absorbs one whole query subterm.
        if !query_star && mode != Mode::Instances {
            if let Some(star_child) = node.children.get(&FlatKey::Star) {
                let skip = subterm_size(keys, pos);
                Self::retrieve_rec(star_child, keys, pos + skip, mode, results);
            }
        }
    }

    /// Collect the nodes reached after skipping `count` stored subterms.
    fn skip_subterms<'a>(node: &'a Node, count: usize, out: &mut Vec<&'a Node>) {
        if count == 0 {
            out.push(node);
            return;
        }
        for (&key, child) in &node.children {
            let extra = match key {
                FlatKey::Star => 0,
                FlatKey::App(_, arity) => arity as usize,
            };
            Self::skip_subterms(child, count - 1 + extra, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Clause, ClauseArena, ClauseOrigin, Env};

    struct Fixture {
        env: Env,
        arena: ClauseArena,
        ids: Vec<ClauseId>,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                env: Env::new(),
                arena: ClauseArena::new(),
                ids: Vec::new(),
            }
        }

        /// Mint an entry for `term`, backed by a fresh dummy clause. The
        /// literal handle is irrelevant to the tree's behaviour here.
        fn entry(&mut self, term: TermId) -> TermEntry {
            let lit = self.env.literal("d", vec![], true).unwrap();
            let id = self
                .arena
                .insert(Clause::input(vec![lit], ClauseOrigin::Axiom, &self.env.literals));
            self.ids.push(id);
            TermEntry {
                term,
                literal: lit,
                clause: id,
            }
        }
    }

    #[test]
    fn test_exact_retrieval() {
        let mut fx = Fixture::new();
        let a = fx.env.constant("a").unwrap();
        let b = fx.env.constant("b").unwrap();
        let fa = fx.env.app("f", vec![a]).unwrap();
        let fb = fx.env.app("f", vec![b]).unwrap();

        let mut tree = DiscriminationTree::new();
        let ea = fx.entry(fa);
        let eb = fx.entry(fb);
        tree.insert(&fx.env.terms, ea);
        tree.insert(&fx.env.terms, eb);
        assert_eq!(tree.len(), 2);

        let results = tree.generalizations(&fx.env.terms, fa);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].term, fa);
    }

    #[test]
    fn test_stored_wildcard_generalizes() {
        let mut fx = Fixture::new();
        let x = fx.env.var(0);
        let a = fx.env.constant("a").unwrap();
        let fx_term = fx.env.app("f", vec![x]).unwrap();
        let ga = fx.env.app("g", vec![a]).unwrap();
        let fga = fx.env.app("f", vec![ga]).unwrap();

        let mut tree = DiscriminationTree::new();
        let e = fx.entry(fx_term);
        tree.insert(&fx.env.terms, e);

        // f(X) generalizes both f(a) and f(g(a)).
        let fa = fx.env.app("f", vec![a]).unwrap();
        assert_eq!(tree.generalizations(&fx.env.terms, fa).len(), 1);
        assert_eq!(tree.generalizations(&fx.env.terms, fga).len(), 1);

        // But f(X) is not a generalization candidate for g(a).
        assert!(tree.generalizations(&fx.env.terms, ga).is_empty());
    }

    #[test]
    fn test_instances_retrieval() {
        let mut fx = Fixture::new();
        let x = fx.env.var(0);
        let a = fx.env.constant("a").unwrap();
        let fa = fx.env.app("f", vec![a]).unwrap();
        let fx_term = fx.env.app("f", vec![x]).unwrap();

        let mut tree = DiscriminationTree::new();
        let e = fx.entry(fa);
        tree.insert(&fx.env.terms, e);

        // Query f(X): stored f(a) is an instance.
        let results = tree.instances(&fx.env.terms, fx_term);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].term, fa);

        // Query a is not instantiated by f(a).
        assert!(tree.instances(&fx.env.terms, a).is_empty());

        // Stored variables are not instances of concrete queries.
        let mut tree = DiscriminationTree::new();
        let e = fx.entry(fx_term);
        tree.insert(&fx.env.terms, e);
        assert!(tree.instances(&fx.env.terms, fa).is_empty());
    }

    #[test]
    fn test_unifiable_retrieval() {
        let mut fx = Fixture::new();
        let x = fx.env.var(0);
        let y = fx.env.var(1);
        let a = fx.env.constant("a").unwrap();
        let b = fx.env.constant("b").unwrap();
        let fxb = fx.env.app("f", vec![x, b]).unwrap();
        let fay = fx.env.app("f", vec![a, y]).unwrap();
        let fab = fx.env.app("f", vec![a, b]).unwrap();
        let gab = fx.env.app("g", vec![a, b]).unwrap();

        let mut tree = DiscriminationTree::new();
        let e0 = fx.entry(fxb);
        let e1 = fx.entry(gab);
        tree.insert(&fx.env.terms, e0);
        tree.insert(&fx.env.terms, e1);

        let results = tree.unifiable(&fx.env.terms, fay);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].term, fxb);

        let results = tree.unifiable(&fx.env.terms, fab);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_remove_prunes() {
        let mut fx = Fixture::new();
        let a = fx.env.constant("a").unwrap();
        let fa = fx.env.app("f", vec![a]).unwrap();

        let mut tree = DiscriminationTree::new();
        let e0 = fx.entry(fa);
        let e1 = fx.entry(fa);
        tree.insert(&fx.env.terms, e0);
        tree.insert(&fx.env.terms, e1);

        tree.remove(&fx.env.terms, e0);
        assert_eq!(tree.len(), 1);
        let results = tree.generalizations(&fx.env.terms, fa);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].clause, e1.clause);

        tree.remove(&fx.env.terms, e1);
        assert!(tree.is_empty());
        assert!(tree.root.children.is_empty());
    }

    #[test]
    fn test_deep_wildcard_skip() {
        let mut fx = Fixture::new();
        let x = fx.env.var(0);
        let y = fx.env.var(1);
        let a = fx.env.constant("a").unwrap();
        let c = fx.env.constant("c").unwrap();
        let fxy = fx.env.app("f", vec![x, y]).unwrap();

        let mut tree = DiscriminationTree::new();
        let e = fx.entry(fxy);
        tree.insert(&fx.env.terms, e);

        // f(g(c), a): both wildcards must skip the right amounts.
        let gc = fx.env.app("g", vec![c]).unwrap();
        let query = fx.env.app("f", vec![gc, a]).unwrap();
        assert_eq!(tree.generalizations(&fx.env.terms, query).len(), 1);
    }
}
