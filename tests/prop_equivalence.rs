//! Property-based testing for rewrite soundness.
//!
//! These tests generate random expression trees over a small identity
//! alphabet and verify that rewriting preserves the truth table under
//! every assignment, settles to a structural fixpoint, and leaves the
//! settled tree in disjunction-of-conjunctions shape.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use boolean_dnf::{Expr, Literal};

const IDENTS: [&str; 4] = ["w", "x", "y", "z"];

/// Arbitrary expression trees over the identity alphabet, biased toward
/// small operator nodes so settling stays cheap.
fn arb_expr() -> impl Strategy<Value = Expr<&'static str>> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Expr::constant),
        (0..IDENTS.len(), any::<bool>()).prop_map(|(i, negated)| {
            let lit = Literal::new(IDENTS[i]);
            Expr::Literal(if negated { lit.complement() } else { lit })
        }),
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(Expr::negate),
            prop::collection::vec(inner.clone(), 2..4)
                .prop_map(|children| Expr::conjoin(children).unwrap()),
            prop::collection::vec(inner, 2..4)
                .prop_map(|children| Expr::disjoin(children).unwrap()),
        ]
    })
}

/// Every assignment of the identity alphabet.
fn assignments() -> Vec<HashMap<&'static str, bool>> {
    (0..1u32 << IDENTS.len())
        .map(|bits| {
            IDENTS
                .iter()
                .enumerate()
                .map(|(i, ident)| (*ident, bits & (1 << i) != 0))
                .collect()
        })
        .collect()
}

/// Iterates until two consecutive outputs are structurally equal, the way
/// a caller without knowledge of the nesting depth is expected to.
fn settle(e: &Expr<&'static str>) -> Expr<&'static str> {
    let mut current = e.simplify().unwrap();
    for _ in 0..64 {
        let next = current.simplify().unwrap();
        if next == current {
            return next;
        }
        current = next;
    }
    panic!("no structural fixpoint within 64 passes: {:?}", e);
}

fn assert_unique_literal_children(children: &[std::rc::Rc<Expr<&'static str>>]) {
    let mut seen: HashSet<(&'static str, bool)> = HashSet::new();
    for child in children {
        if let Expr::Literal(lit) = &**child {
            assert!(
                seen.insert((*lit.ident(), lit.is_negated())),
                "duplicate literal {:?} among siblings",
                lit
            );
        }
    }
}

/// A settled tree is a disjunction of flat conjunctions of literals: no
/// negation nodes, no constants inside operators, no same-kind nesting, no
/// 1-child operators, and no repeated name+polarity sibling pairs.
fn assert_dnf_shape(e: &Expr<&'static str>) {
    match e {
        Expr::Const(_) | Expr::Literal(_) => {}
        Expr::Not(_) => panic!("negation survived settling: {:?}", e),
        Expr::And(children) => {
            assert!(children.len() >= 2, "degenerate conjunction: {:?}", e);
            assert_unique_literal_children(children);
            for child in children {
                assert!(
                    child.is_literal(),
                    "conjunction child is not a literal after settling: {:?}",
                    child
                );
            }
        }
        Expr::Or(children) => {
            assert!(children.len() >= 2, "degenerate disjunction: {:?}", e);
            assert_unique_literal_children(children);
            for child in children {
                match &**child {
                    Expr::Literal(_) => {}
                    Expr::And(inner) => {
                        assert!(inner.len() >= 2, "degenerate conjunction: {:?}", child);
                        assert_unique_literal_children(inner);
                        for leaf in inner {
                            assert!(
                                leaf.is_literal(),
                                "conjunction child is not a literal after settling: {:?}",
                                leaf
                            );
                        }
                    }
                    other => panic!("disjunction child is not a term: {:?}", other),
                }
            }
        }
    }
}

proptest! {
    /// One rewriting pass preserves the truth table.
    #[test]
    fn simplify_preserves_semantics(e in arb_expr()) {
        let simplified = e.simplify().unwrap();
        for vals in assignments() {
            prop_assert_eq!(e.evaluate(&vals), simplified.evaluate(&vals));
        }
    }

    /// Bounded fixpoint iteration preserves the truth table at any depth.
    #[test]
    fn normalize_preserves_semantics(e in arb_expr(), passes in 0usize..4) {
        let normalized = e.normalize(passes).unwrap();
        for vals in assignments() {
            prop_assert_eq!(e.evaluate(&vals), normalized.evaluate(&vals));
        }
    }

    /// Iterating to a structural fixpoint terminates and is idempotent.
    #[test]
    fn settling_is_idempotent(e in arb_expr()) {
        let settled = settle(&e);
        prop_assert_eq!(settled.simplify().unwrap(), settled);
    }

    /// The fixpoint is in disjunction-of-conjunctions shape.
    #[test]
    fn settled_trees_are_sums_of_products(e in arb_expr()) {
        let settled = settle(&e);
        assert_dnf_shape(&settled);
        for vals in assignments() {
            prop_assert_eq!(e.evaluate(&vals), settled.evaluate(&vals));
        }
    }

    /// Identity mapping keeps the truth table aligned with the mapped
    /// assignment.
    #[test]
    fn map_commutes_with_evaluate(e in arb_expr()) {
        let upper = e.map(|ident| ident.to_uppercase());
        for vals in assignments() {
            let mapped: HashMap<String, bool> = vals
                .iter()
                .map(|(ident, value)| (ident.to_uppercase(), *value))
                .collect();
            prop_assert_eq!(e.evaluate(&vals), upper.evaluate(&mapped));
        }
    }
}
