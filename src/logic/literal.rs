//! Interned literals.
//!
//! A literal is a predicate applied to terms together with a polarity.
//! Literals are interned in a [`LiteralBank`]; the two polarities of an atom
//! are allocated as an adjacent id pair, so complementing a literal is a bit
//! flip and needs no lookup.

use super::interner::{Interner, PredicateId};
use super::term::{TermBank, TermId, Var};
use std::collections::HashMap;
use std::fmt;

/// Handle of an interned literal. Even ids are positive, odd ids negative;
/// `complement` toggles the low bit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiteralId(u32);

impl LiteralId {
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// The same atom with the opposite polarity. O(1).
    pub fn complement(self) -> LiteralId {
        LiteralId(self.0 ^ 1)
    }

    /// True iff this is the positive literal of its atom pair.
    pub fn is_positive(self) -> bool {
        self.0 & 1 == 0
    }

    fn pair(self) -> usize {
        (self.0 >> 1) as usize
    }
}

impl fmt::Display for LiteralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AtomData {
    predicate: PredicateId,
    args: Vec<TermId>,
}

/// Arena of interned literals with cached symbol counts.
#[derive(Debug)]
pub struct LiteralBank {
    atoms: Vec<AtomData>,
    weights: Vec<u32>,
    lookup: HashMap<AtomData, u32>,
    equality: PredicateId,
}

impl LiteralBank {
    pub fn new(equality: PredicateId) -> Self {
        LiteralBank {
            atoms: Vec::new(),
            weights: Vec::new(),
            lookup: HashMap::new(),
            equality,
        }
    }

    /// Intern a literal. Both polarities of the atom share one entry.
    pub fn literal(
        &mut self,
        predicate: PredicateId,
        args: Vec<TermId>,
        positive: bool,
        terms: &TermBank,
    ) -> LiteralId {
        let atom = AtomData { predicate, args };
        let pair = match self.lookup.get(&atom) {
            Some(&pair) => pair,
            None => {
                let pair = self.atoms.len() as u32;
                let weight = 1 + atom.args.iter().map(|&a| terms.weight(a)).sum::<u32>();
                self.atoms.push(atom.clone());
                self.weights.push(weight);
                self.lookup.insert(atom, pair);
                pair
            }
        };
        LiteralId((pair << 1) | u32::from(!positive))
    }

    /// Intern an equality or disequality literal.
    pub fn equality(
        &mut self,
        lhs: TermId,
        rhs: TermId,
        positive: bool,
        terms: &TermBank,
    ) -> LiteralId {
        self.literal(self.equality, vec![lhs, rhs], positive, terms)
    }

    pub fn predicate(&self, literal: LiteralId) -> PredicateId {
        self.atoms[literal.pair()].predicate
    }

    pub fn args(&self, literal: LiteralId) -> &[TermId] {
        &self.atoms[literal.pair()].args
    }

    /// Cached symbol count of the literal (predicate plus argument symbols).
    pub fn weight(&self, literal: LiteralId) -> u32 {
        self.weights[literal.pair()]
    }

    pub fn is_equality(&self, literal: LiteralId) -> bool {
        self.atoms[literal.pair()].predicate == self.equality
    }

    /// The two sides of an equality literal.
    pub fn equality_sides(&self, literal: LiteralId) -> Option<(TermId, TermId)> {
        if !self.is_equality(literal) {
            return None;
        }
        match self.args(literal) {
            [lhs, rhs] => Some((*lhs, *rhs)),
            _ => None,
        }
    }

    /// Collect the variables of a literal.
    pub fn collect_vars(
        &self,
        literal: LiteralId,
        terms: &TermBank,
        out: &mut std::collections::HashSet<Var>,
    ) {
        for &arg in self.args(literal) {
            terms.collect_vars(arg, out);
        }
    }

    /// Largest variable index in the literal, if any.
    pub fn max_var(&self, literal: LiteralId, terms: &TermBank) -> Option<u32> {
        self.args(literal)
            .iter()
            .filter_map(|&a| terms.max_var(a))
            .max()
    }

    /// Number of distinct interned atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Format a literal with names resolved through the interner.
    pub fn display<'a>(
        &'a self,
        literal: LiteralId,
        terms: &'a TermBank,
        interner: &'a Interner,
    ) -> LiteralDisplay<'a> {
        LiteralDisplay {
            bank: self,
            literal,
            terms,
            interner,
        }
    }
}

/// Display wrapper resolving names through the interner.
pub struct LiteralDisplay<'a> {
    bank: &'a LiteralBank,
    literal: LiteralId,
    terms: &'a TermBank,
    interner: &'a Interner,
}

impl<'a> fmt::Display for LiteralDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lit = self.literal;
        if self.bank.is_equality(lit) {
            let args = self.bank.args(lit);
            let op = if lit.is_positive() { "=" } else { "!=" };
            return write!(
                f,
                "{} {} {}",
                self.terms.display(args[0], self.interner),
                op,
                self.terms.display(args[1], self.interner)
            );
        }
        if !lit.is_positive() {
            write!(f, "~")?;
        }
        write!(
            f,
            "{}",
            self.interner.predicate_name(self.bank.predicate(lit))
        )?;
        let args = self.bank.args(lit);
        if !args.is_empty() {
            write!(f, "(")?;
            for (i, &arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", self.terms.display(arg, self.interner))?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
