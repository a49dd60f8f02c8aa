//! Equality resolution and equality factoring.

use super::common::dedup_literals;
use crate::logic::{unify, Clause, ClauseArena, ClauseId, Env, Rule, Substitution, TermOrdering};
use std::sync::Arc;

/// Equality resolution: `s != t | C` with `σ = mgu(s, t)` yields `Cσ`.
pub fn equality_resolution(env: &mut Env, arena: &ClauseArena, given_id: ClauseId) -> Vec<Clause> {
    let given = Arc::clone(arena.get(given_id));
    let mut children = Vec::new();

    for (pos, &literal) in given.literals[..given.selected].iter().enumerate() {
        if literal.is_positive() || !env.literals.is_equality(literal) {
            continue;
        }
        let (lhs, rhs) = env
            .literals
            .equality_sides(literal)
            .expect("equality literal has two sides");

        let mut subst = Substitution::new();
        if !unify(&env.terms, lhs, rhs, &mut subst) {
            continue;
        }

        let literals: Vec<_> = given
            .literals
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != pos)
            .map(|(_, &l)| env.apply_literal(l, &subst))
            .collect();
        let literals = dedup_literals(literals);

        children.push(Clause::derived(
            literals,
            Rule::EqualityResolution,
            &[(given_id, &given)],
            &env.literals,
        ));
    }

    children
}

/// Equality factoring: `s = t | u = v | C` with `σ = mgu(s, u)` and
/// `sσ` not smaller than `tσ` yields `(t != v | u = v | C)σ`.
pub fn equality_factoring(env: &mut Env, arena: &ClauseArena, given_id: ClauseId) -> Vec<Clause> {
    let given = Arc::clone(arena.get(given_id));
    let mut children = Vec::new();

    for first_pos in 0..given.selected {
        let first = given.literals[first_pos];
        if !first.is_positive() || !env.literals.is_equality(first) {
            continue;
        }
        for second_pos in 0..given.literals.len() {
            if second_pos == first_pos {
                continue;
            }
            let second = given.literals[second_pos];
            if !second.is_positive() || !env.literals.is_equality(second) {
                continue;
            }

            let (s1, t1) = env.literals.equality_sides(first).expect("equality");
            let (s2, t2) = env.literals.equality_sides(second).expect("equality");

            // Either side of either equality may take the `s` role.
            for (s, t) in [(s1, t1), (t1, s1)] {
                for (u, v) in [(s2, t2), (t2, s2)] {
                    let mut subst = Substitution::new();
                    if !unify(&env.terms, s, u, &mut subst) {
                        continue;
                    }

                    let s_inst = subst.apply(&mut env.terms, s);
                    let t_inst = subst.apply(&mut env.terms, t);
                    if env.compare(s_inst, t_inst) == TermOrdering::Less {
                        continue;
                    }

                    let v_inst = subst.apply(&mut env.terms, v);
                    let residual = env.equality(t_inst, v_inst, false);

                    let mut literals = vec![residual];
                    for (i, &l) in given.literals.iter().enumerate() {
                        if i != first_pos {
                            literals.push(env.apply_literal(l, &subst));
                        }
                    }
                    let literals = dedup_literals(literals);

                    children.push(Clause::derived(
                        literals,
                        Rule::EqualityFactoring,
                        &[(given_id, &given)],
                        &env.literals,
                    ));
                }
            }
        }
    }

    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ClauseOrigin;

    #[test]
    fn test_equality_resolution() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();

        // f(X) != f(a) | p(X) yields p(a).
        let x = env.var(0);
        let a = env.constant("a").unwrap();
        let fx = env.app("f", vec![x]).unwrap();
        let fa = env.app("f", vec![a]).unwrap();
        let neq = env.equality(fx, fa, false);
        let px = env.literal("p", vec![x], true).unwrap();

        let mut clause = Clause::input(vec![neq, px], ClauseOrigin::Axiom, &env.literals);
        clause.selected = 1;
        let given = arena.insert(clause);

        let children = equality_resolution(&mut env, &arena, given);
        assert_eq!(children.len(), 1);
        let pa = env.literal("p", vec![a], true).unwrap();
        assert_eq!(children[0].literals, vec![pa]);
    }

    #[test]
    fn test_equality_resolution_positive_ignored() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();

        let a = env.constant("a").unwrap();
        let eq = env.equality(a, a, true);
        let mut clause = Clause::input(vec![eq], ClauseOrigin::Axiom, &env.literals);
        clause.selected = 1;
        let given = arena.insert(clause);

        assert!(equality_resolution(&mut env, &arena, given).is_empty());
    }

    #[test]
    fn test_equality_factoring() {
        let mut env = Env::new();
        let mut arena = ClauseArena::new();

        // f(X) = a | f(b) = c: unifying the two left sides gives
        // (a != c | f(b) = c) after instantiation.
        let x = env.var(0);
        let a = env.constant("a").unwrap();
        let b = env.constant("b").unwrap();
        let c = env.constant("c").unwrap();
        let fx = env.app("f", vec![x]).unwrap();
        let fb = env.app("f", vec![b]).unwrap();
        let eq1 = env.equality(fx, a, true);
        let eq2 = env.equality(fb, c, true);

        let mut clause = Clause::input(vec![eq1, eq2], ClauseOrigin::Axiom, &env.literals);
        clause.selected = 2;
        let given = arena.insert(clause);

        let children = equality_factoring(&mut env, &arena, given);
        assert!(!children.is_empty());
        let expected_residual = env.equality(a, c, false);
        assert!(children
            .iter()
            .any(|child| child.literals.contains(&expected_residual)));
    }
}
