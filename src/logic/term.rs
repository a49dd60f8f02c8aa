//! Hash-consed first-order terms.
//!
//! Terms live in a [`TermBank`] arena and are referred to by [`TermId`].
//! Interning makes equality an id comparison and lets every consumer treat
//! terms as copyable handles. Terms are immutable once created and are never
//! evicted within a run; clauses own no term storage.
//!
//! Variables carry a non-negative index; fresh variants of a clause are made
//! by offsetting variable indices, which keeps renaming O(term size) with no
//! name bookkeeping.

use super::interner::{FunctionId, Interner};
use std::collections::HashMap;
use std::fmt;

/// A first-order variable, identified by its index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(u32);

impl Var {
    pub fn new(index: u32) -> Self {
        Var(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn offset(self, by: u32) -> Var {
        Var(self.0 + by)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

/// Handle of an interned term. Equality of handles is equality of terms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Structure of an interned term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermData {
    Var(Var),
    /// Function application; constants are applications with no arguments.
    App(FunctionId, Vec<TermId>),
}

/// Arena of hash-consed terms with cached symbol counts.
#[derive(Debug, Default)]
pub struct TermBank {
    data: Vec<TermData>,
    weights: Vec<u32>,
    lookup: HashMap<TermData, TermId>,
}

impl TermBank {
    pub fn new() -> Self {
        TermBank::default()
    }

    fn intern(&mut self, data: TermData, weight: u32) -> TermId {
        if let Some(&id) = self.lookup.get(&data) {
            return id;
        }
        let id = TermId(self.data.len() as u32);
        self.data.push(data.clone());
        self.weights.push(weight);
        self.lookup.insert(data, id);
        id
    }

    /// Intern a variable term.
    pub fn var(&mut self, var: Var) -> TermId {
        self.intern(TermData::Var(var), 1)
    }

    /// Intern a function application. Argument handles must come from this bank.
    pub fn app(&mut self, function: FunctionId, args: Vec<TermId>) -> TermId {
        let weight = 1 + args.iter().map(|&a| self.weight(a)).sum::<u32>();
        self.intern(TermData::App(function, args), weight)
    }

    /// Intern a constant (nullary application).
    pub fn constant(&mut self, function: FunctionId) -> TermId {
        self.app(function, Vec::new())
    }

    pub fn data(&self, id: TermId) -> &TermData {
        &self.data[id.0 as usize]
    }

    /// Cached symbol count of the term.
    pub fn weight(&self, id: TermId) -> u32 {
        self.weights[id.0 as usize]
    }

    pub fn is_var(&self, id: TermId) -> bool {
        matches!(self.data(id), TermData::Var(_))
    }

    pub fn as_var(&self, id: TermId) -> Option<Var> {
        match self.data(id) {
            TermData::Var(v) => Some(*v),
            TermData::App(..) => None,
        }
    }

    /// Number of distinct interned terms.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True iff `var` occurs in `term`.
    pub fn occurs(&self, var: Var, term: TermId) -> bool {
        match self.data(term) {
            TermData::Var(v) => *v == var,
            TermData::App(_, args) => args.iter().any(|&a| self.occurs(var, a)),
        }
    }

    /// Collect the variables of a term.
    pub fn collect_vars(&self, term: TermId, out: &mut std::collections::HashSet<Var>) {
        match self.data(term) {
            TermData::Var(v) => {
                out.insert(*v);
            }
            TermData::App(_, args) => {
                for &a in args {
                    self.collect_vars(a, out);
                }
            }
        }
    }

    /// Largest variable index in the term, if any.
    pub fn max_var(&self, term: TermId) -> Option<u32> {
        match self.data(term) {
            TermData::Var(v) => Some(v.index()),
            TermData::App(_, args) => args.iter().filter_map(|&a| self.max_var(a)).max(),
        }
    }

    /// All subterms in preorder, the term itself first. Repeated subterms
    /// appear once per occurrence.
    pub fn subterms(&self, term: TermId, out: &mut Vec<TermId>) {
        out.push(term);
        if let TermData::App(_, args) = self.data(term) {
            for &a in args {
                self.subterms(a, out);
            }
        }
    }

    /// All non-variable subterms in preorder, the term itself first if it is
    /// not a variable.
    pub fn non_variable_subterms(&self, term: TermId, out: &mut Vec<TermId>) {
        match self.data(term) {
            TermData::Var(_) => {}
            TermData::App(_, args) => {
                out.push(term);
                for &a in args {
                    self.non_variable_subterms(a, out);
                }
            }
        }
    }

    /// Rename a term by offsetting every variable index.
    pub fn offset_vars(&mut self, term: TermId, by: u32) -> TermId {
        if by == 0 {
            return term;
        }
        match self.data(term).clone() {
            TermData::Var(v) => self.var(v.offset(by)),
            TermData::App(f, args) => {
                let new_args = args.iter().map(|&a| self.offset_vars(a, by)).collect();
                self.app(f, new_args)
            }
        }
    }

    /// Replace every occurrence of `from` in `term` by `to`.
    pub fn replace(&mut self, term: TermId, from: TermId, to: TermId) -> TermId {
        if term == from {
            return to;
        }
        match self.data(term).clone() {
            TermData::Var(_) => term,
            TermData::App(f, args) => {
                let new_args: Vec<TermId> =
                    args.iter().map(|&a| self.replace(a, from, to)).collect();
                if new_args == args {
                    term
                } else {
                    self.app(f, new_args)
                }
            }
        }
    }

    /// Format a term with symbol names resolved through the interner.
    pub fn display<'a>(&'a self, term: TermId, interner: &'a Interner) -> TermDisplay<'a> {
        TermDisplay {
            bank: self,
            term,
            interner,
        }
    }
}

/// Display wrapper resolving symbol names through the interner.
pub struct TermDisplay<'a> {
    bank: &'a TermBank,
    term: TermId,
    interner: &'a Interner,
}

impl<'a> fmt::Display for TermDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bank.data(self.term) {
            TermData::Var(v) => write!(f, "{}", v),
            TermData::App(func, args) => {
                write!(f, "{}", self.interner.function_name(*func))?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    for (i, &arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}", self.bank.display(arg, self.interner))?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Interner, TermBank) {
        (Interner::new(), TermBank::new())
    }

    #[test]
    fn test_hash_consing() {
        let (mut interner, mut bank) = setup();
        let f = interner.function("f", 1).unwrap();
        let a = interner.function("a", 0).unwrap();

        let ca = bank.constant(a);
        let ca2 = bank.constant(a);
        assert_eq!(ca, ca2);

        let fa = bank.app(f, vec![ca]);
        let fa2 = bank.app(f, vec![ca2]);
        assert_eq!(fa, fa2);
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn test_weight_is_symbol_count() {
        let (mut interner, mut bank) = setup();
        let f = interner.function("f", 2).unwrap();
        let a = interner.function("a", 0).unwrap();

        let x = bank.var(Var::new(0));
        let ca = bank.constant(a);
        let fxa = bank.app(f, vec![x, ca]);

        assert_eq!(bank.weight(x), 1);
        assert_eq!(bank.weight(ca), 1);
        assert_eq!(bank.weight(fxa), 3);
    }

    #[test]
    fn test_occurs_and_vars() {
        let (mut interner, mut bank) = setup();
        let f = interner.function("f", 2).unwrap();

        let x = bank.var(Var::new(0));
        let y = bank.var(Var::new(1));
        let fxy = bank.app(f, vec![x, y]);

        assert!(bank.occurs(Var::new(0), fxy));
        assert!(bank.occurs(Var::new(1), fxy));
        assert!(!bank.occurs(Var::new(2), fxy));
        assert_eq!(bank.max_var(fxy), Some(1));

        let mut vars = std::collections::HashSet::new();
        bank.collect_vars(fxy, &mut vars);
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_offset_vars() {
        let (mut interner, mut bank) = setup();
        let f = interner.function("f", 1).unwrap();

        let x = bank.var(Var::new(0));
        let fx = bank.app(f, vec![x]);
        let shifted = bank.offset_vars(fx, 5);

        assert_ne!(fx, shifted);
        assert_eq!(bank.max_var(shifted), Some(5));
        assert_eq!(bank.offset_vars(fx, 0), fx);
    }

    #[test]
    fn test_replace() {
        let (mut interner, mut bank) = setup();
        let f = interner.function("f", 1).unwrap();
        let a = interner.function("a", 0).unwrap();
        let b = interner.function("b", 0).unwrap();

        let ca = bank.constant(a);
        let cb = bank.constant(b);
        let fa = bank.app(f, vec![ca]);
        let ffa = bank.app(f, vec![fa]);

        let fb = bank.app(f, vec![cb]);
        let replaced = bank.replace(ffa, fa, cb);
        assert_eq!(replaced, fb);

        // No occurrence: unchanged handle.
        assert_eq!(bank.replace(ffa, cb, ca), ffa);
    }

    #[test]
    fn test_non_variable_subterms() {
        let (mut interner, mut bank) = setup();
        let f = interner.function("f", 2).unwrap();
        let a = interner.function("a", 0).unwrap();

        let x = bank.var(Var::new(0));
        let ca = bank.constant(a);
        let fxa = bank.app(f, vec![x, ca]);

        let mut out = Vec::new();
        bank.non_variable_subterms(fxa, &mut out);
        assert_eq!(out, vec![fxa, ca]);
    }

    #[test]
    fn test_display() {
        let (mut interner, mut bank) = setup();
        let f = interner.function("f", 2).unwrap();
        let a = interner.function("a", 0).unwrap();

        let x = bank.var(Var::new(0));
        let ca = bank.constant(a);
        let fxa = bank.app(f, vec![x, ca]);

        assert_eq!(format!("{}", bank.display(fxa, &interner)), "f(X0,a)");
    }
}
