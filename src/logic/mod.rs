//! First-order logic entities: signature, terms, literals, clauses,
//! ordering, unification, and the shared environment.

pub mod clause;
pub mod env;
pub mod interner;
pub mod literal;
pub mod ordering;
pub mod term;
pub mod unification;

pub use clause::{
    Clause, ClauseArena, ClauseDisplay, ClauseId, ClauseOrigin, ClauseRef, Inference, Rule, Store,
};
pub use env::Env;
pub use interner::{FunctionId, Interner, PredicateId};
pub use literal::{LiteralBank, LiteralId};
pub use ordering::{Kbo, KboConfig, LiteralComparisonMode, TermOrdering};
pub use term::{TermBank, TermData, TermId, Var};
pub use unification::{match_args, match_terms, unify, unify_args, Substitution};
