//! Unification and one-way matching over interned terms.
//!
//! Substitutions are triangular: a binding may map a variable to a term that
//! itself contains bound variables, and bindings are resolved when the
//! substitution is applied. Callers standardize clauses apart (by offsetting
//! variable indices) before unifying across clauses.

use super::term::{TermBank, TermData, TermId, Var};
use std::collections::HashMap;

/// A variable-to-term binding set.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    map: HashMap<Var, TermId>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution::default()
    }

    pub fn get(&self, var: Var) -> Option<TermId> {
        self.map.get(&var).copied()
    }

    pub fn bind(&mut self, var: Var, term: TermId) {
        self.map.insert(var, term);
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Follow bindings from a term handle until it is not a bound variable.
    pub fn deref(&self, terms: &TermBank, mut t: TermId) -> TermId {
        loop {
            match terms.data(t) {
                TermData::Var(v) => match self.get(*v) {
                    Some(bound) if bound != t => t = bound,
                    _ => return t,
                },
                TermData::App(..) => return t,
            }
        }
    }

    /// Apply the substitution, building the instantiated term.
    pub fn apply(&self, terms: &mut TermBank, t: TermId) -> TermId {
        let t = self.deref(terms, t);
        match terms.data(t).clone() {
            TermData::Var(_) => t,
            TermData::App(f, args) => {
                let new_args: Vec<TermId> = args.iter().map(|&a| self.apply(terms, a)).collect();
                if new_args == args {
                    t
                } else {
                    terms.app(f, new_args)
                }
            }
        }
    }
}

/// Occurs check modulo the current bindings.
fn occurs_deref(subst: &Substitution, terms: &TermBank, var: Var, t: TermId) -> bool {
    let t = subst.deref(terms, t);
    match terms.data(t) {
        TermData::Var(v) => *v == var,
        TermData::App(_, args) => args.iter().any(|&a| occurs_deref(subst, terms, var, a)),
    }
}

/// Unify two terms, extending `subst`. Returns false and leaves `subst` in
/// an unspecified extension state on failure; callers clone when they need
/// to backtrack.
pub fn unify(terms: &TermBank, s: TermId, t: TermId, subst: &mut Substitution) -> bool {
    let s = subst.deref(terms, s);
    let t = subst.deref(terms, t);
    if s == t {
        return true;
    }
    match (terms.data(s), terms.data(t)) {
        (TermData::Var(v), _) => {
            if occurs_deref(subst, terms, *v, t) {
                return false;
            }
            subst.bind(*v, t);
            true
        }
        (_, TermData::Var(v)) => {
            if occurs_deref(subst, terms, *v, s) {
                return false;
            }
            subst.bind(*v, s);
            true
        }
        (TermData::App(f, f_args), TermData::App(g, g_args)) => {
            if f != g || f_args.len() != g_args.len() {
                return false;
            }
            let pairs: Vec<(TermId, TermId)> = f_args
                .iter()
                .copied()
                .zip(g_args.iter().copied())
                .collect();
            pairs.into_iter().all(|(a, b)| unify(terms, a, b, subst))
        }
    }
}

/// Unify two argument lists pairwise.
pub fn unify_args(terms: &TermBank, s: &[TermId], t: &[TermId], subst: &mut Substitution) -> bool {
    s.len() == t.len()
        && s.iter()
            .zip(t.iter())
            .all(|(&a, &b)| unify(terms, a, b, subst))
}

/// One-way matching: extend `subst` over the pattern's variables so that
/// `pattern[subst] == target`. Target variables are treated as constants.
pub fn match_terms(
    terms: &TermBank,
    pattern: TermId,
    target: TermId,
    subst: &mut Substitution,
) -> bool {
    match terms.data(pattern) {
        TermData::Var(v) => match subst.get(*v) {
            Some(bound) => bound == target,
            None => {
                subst.bind(*v, target);
                true
            }
        },
        TermData::App(f, f_args) => match terms.data(target) {
            TermData::App(g, g_args) if f == g && f_args.len() == g_args.len() => {
                let pairs: Vec<(TermId, TermId)> = f_args
                    .iter()
                    .copied()
                    .zip(g_args.iter().copied())
                    .collect();
                pairs
                    .into_iter()
                    .all(|(p, t)| match_terms(terms, p, t, subst))
            }
            _ => false,
        },
    }
}

/// Match two argument lists pairwise (one-way).
pub fn match_args(
    terms: &TermBank,
    pattern: &[TermId],
    target: &[TermId],
    subst: &mut Substitution,
) -> bool {
    pattern.len() == target.len()
        && pattern
            .iter()
            .zip(target.iter())
            .all(|(&p, &t)| match_terms(terms, p, t, subst))
}
