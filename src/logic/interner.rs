//! Symbol interning for the signature.
//!
//! Function and predicate symbols are interned to small copy ids; names live
//! in one arena per symbol namespace. Ids are O(1) to compare and hash.
//! Constants are functions of arity zero. The equality predicate `=` is
//! interned at construction so every consumer can test for it by id.
//!
//! Re-declaring a symbol with a different arity is a user error, surfaced
//! before any clause is built from it.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Id of an interned function symbol (constants have arity 0).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub(crate) u32);

/// Id of an interned predicate symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredicateId(pub(crate) u32);

impl FunctionId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl PredicateId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

impl fmt::Display for PredicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct SymbolEntry {
    name: String,
    arity: u32,
}

#[derive(Debug, Clone, Default)]
struct SymbolArena {
    entries: Vec<SymbolEntry>,
    lookup: HashMap<String, u32>,
}

impl SymbolArena {
    /// Intern a name with an arity (get-or-create). Arity conflicts are
    /// reported to the caller.
    fn intern(&mut self, name: &str, arity: u32) -> std::result::Result<u32, u32> {
        if let Some(&id) = self.lookup.get(name) {
            let existing = self.entries[id as usize].arity;
            if existing != arity {
                return Err(existing);
            }
            return Ok(id);
        }
        let id = self.entries.len() as u32;
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            arity,
        });
        self.lookup.insert(name.to_string(), id);
        Ok(id)
    }

    fn name(&self, id: u32) -> &str {
        &self.entries[id as usize].name
    }

    fn arity(&self, id: u32) -> u32 {
        self.entries[id as usize].arity
    }

    fn get(&self, name: &str) -> Option<u32> {
        self.lookup.get(name).copied()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The signature: interned function and predicate symbols.
#[derive(Debug, Clone)]
pub struct Interner {
    functions: SymbolArena,
    predicates: SymbolArena,
    equality: PredicateId,
}

impl Default for Interner {
    fn default() -> Self {
        Interner::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        let mut predicates = SymbolArena::default();
        let eq = predicates
            .intern("=", 2)
            .expect("empty arena cannot conflict");
        Interner {
            functions: SymbolArena::default(),
            predicates,
            equality: PredicateId(eq),
        }
    }

    /// Intern a function symbol (get-or-create).
    pub fn function(&mut self, name: &str, arity: u32) -> Result<FunctionId> {
        self.functions
            .intern(name, arity)
            .map(FunctionId)
            .map_err(|existing| {
                Error::User(format!(
                    "function symbol '{}' redeclared with arity {} (was {})",
                    name, arity, existing
                ))
            })
    }

    /// Intern a predicate symbol (get-or-create).
    pub fn predicate(&mut self, name: &str, arity: u32) -> Result<PredicateId> {
        self.predicates
            .intern(name, arity)
            .map(PredicateId)
            .map_err(|existing| {
                Error::User(format!(
                    "predicate symbol '{}' redeclared with arity {} (was {})",
                    name, arity, existing
                ))
            })
    }

    /// The pre-interned equality predicate.
    pub fn equality(&self) -> PredicateId {
        self.equality
    }

    pub fn function_name(&self, id: FunctionId) -> &str {
        self.functions.name(id.0)
    }

    pub fn function_arity(&self, id: FunctionId) -> u32 {
        self.functions.arity(id.0)
    }

    pub fn predicate_name(&self, id: PredicateId) -> &str {
        self.predicates.name(id.0)
    }

    pub fn predicate_arity(&self, id: PredicateId) -> u32 {
        self.predicates.arity(id.0)
    }

    pub fn get_function(&self, name: &str) -> Option<FunctionId> {
        self.functions.get(name).map(FunctionId)
    }

    pub fn get_predicate(&self, name: &str) -> Option<PredicateId> {
        self.predicates.get(name).map(PredicateId)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }
}
