// boolean_dnf: a Rust crate for Boolean-expression normalization.
//
// Copyright (c) 2026 Chris Fallin <cfallin@c1f.net>. Released under the MIT
// License.
//

use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::mem;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::RewriteError;
use crate::expr::{Expr, Literal, OpKind};

const REDUCE_ALLOCED_SIZE: usize = 8;

type ChildList<T> = SmallVec<[Rc<Expr<T>>; REDUCE_ALLOCED_SIZE]>;

impl OpKind {
    /// The constant that forces this operator's result when present as an
    /// operand: `false` for AND, `true` for OR. The complementary constant
    /// is the operator's identity and contributes nothing as an operand.
    fn absorbing(self) -> bool {
        match self {
            OpKind::And => false,
            OpKind::Or => true,
        }
    }

    /// Builds the operator node of this kind over `children`.
    fn node<T>(self, children: Vec<Rc<Expr<T>>>) -> Expr<T>
    where
        T: Clone + Debug + Eq + Hash,
    {
        match self {
            OpKind::And => Expr::And(children),
            OpKind::Or => Expr::Or(children),
        }
    }
}

/// Clones out of an `Rc` only when the subtree is still shared elsewhere.
fn unshare<T>(e: Rc<Expr<T>>) -> Expr<T>
where
    T: Clone + Debug + Eq + Hash,
{
    Rc::try_unwrap(e).unwrap_or_else(|shared| (*shared).clone())
}

fn check_arity(kind: OpKind, arity: usize) -> Result<(), RewriteError> {
    if arity < 2 {
        return Err(RewriteError::MalformedOperator { kind, arity });
    }
    Ok(())
}

/// Outcome of feeding one candidate child to the literal/constant rules.
enum Absorbed {
    /// Candidate handled: kept, or dropped as a duplicate or an identity
    /// constant.
    Taken,
    /// The whole node collapses to the operator's absorbing constant.
    Collapse,
    /// Not a literal or constant; the candidate needs a full rewriting pass
    /// before the reduction can continue.
    Defer,
}

/// What a paused reduction asks of the driving loop.
enum Step<T>
where
    T: Clone + Debug + Eq + Hash,
{
    /// Rewrite this subexpression, then feed the result back in through
    /// [`Reduction::resume`].
    Recurse(Rc<Expr<T>>),
    /// The reduction ran to completion.
    Finished(Expr<T>),
}

/// In-flight state of one short-circuit reduction of an AND or OR node:
/// the identities seen at each polarity, the surviving children, and the
/// queue of candidates still to examine. The queue is seeded with the
/// node's direct children and grows as same-kind subexpressions are
/// flattened into it.
struct Reduction<T>
where
    T: Clone + Debug + Eq + Hash,
{
    op: OpKind,
    worklist: VecDeque<Rc<Expr<T>>>,
    out: ChildList<T>,
    seen_pos: HashSet<T>,
    seen_neg: HashSet<T>,
}

impl<T> Reduction<T>
where
    T: Clone + Debug + Eq + Hash,
{
    fn new(op: OpKind, children: &[Rc<Expr<T>>]) -> Reduction<T> {
        Reduction {
            op,
            worklist: children.iter().cloned().collect(),
            out: SmallVec::new(),
            seen_pos: HashSet::new(),
            seen_neg: HashSet::new(),
        }
    }

    /// Drains candidates until the queue empties or one needs a full
    /// rewriting pass first.
    fn run(&mut self) -> Step<T> {
        while let Some(candidate) = self.worklist.pop_front() {
            match self.absorb(&candidate) {
                Absorbed::Taken => {}
                Absorbed::Collapse => return Step::Finished(Expr::Const(self.op.absorbing())),
                Absorbed::Defer => return Step::Recurse(candidate),
            }
        }
        Step::Finished(self.finish())
    }

    /// Re-admits the rewritten form of a deferred candidate, then keeps
    /// draining.
    fn resume(&mut self, rewritten: Expr<T>) -> Step<T> {
        match rewritten {
            // A same-kind operator flattens into the queue: associativity,
            // and no nested same-kind wrapping in the output.
            Expr::And(children) if self.op == OpKind::And => self.worklist.extend(children),
            Expr::Or(children) if self.op == OpKind::Or => self.worklist.extend(children),
            // A leaf re-enters the admission rules, which may still collapse
            // the whole node.
            leaf @ (Expr::Literal(_) | Expr::Const(_)) => {
                self.worklist.push_front(Rc::new(leaf));
            }
            // Opposite-kind operator, kept opaque.
            other => self.out.push(Rc::new(other)),
        }
        self.run()
    }

    /// Applies the literal/constant admission rules; `Defer` for any other
    /// node kind.
    fn absorb(&mut self, candidate: &Rc<Expr<T>>) -> Absorbed {
        match &**candidate {
            Expr::Literal(lit) => self.absorb_literal(candidate, lit),
            Expr::Const(value) => self.absorb_const(*value),
            _ => Absorbed::Defer,
        }
    }

    fn absorb_literal(&mut self, candidate: &Rc<Expr<T>>, lit: &Literal<T>) -> Absorbed {
        let (own, opposite) = if lit.is_negated() {
            (&mut self.seen_neg, &self.seen_pos)
        } else {
            (&mut self.seen_pos, &self.seen_neg)
        };
        if opposite.contains(lit.ident()) {
            // The literal's inverse was OP'd together with itself; the
            // whole node is a constant.
            log::trace!(
                "contradiction on {:?}: {} collapses to {}",
                lit.ident(),
                self.op,
                self.op.absorbing()
            );
            return Absorbed::Collapse;
        }
        if own.insert(lit.ident().clone()) {
            self.out.push(candidate.clone());
        }
        Absorbed::Taken
    }

    fn absorb_const(&self, value: bool) -> Absorbed {
        if value == self.op.absorbing() {
            log::trace!("absorbing constant: {} collapses to {}", self.op, value);
            Absorbed::Collapse
        } else {
            // The identity constant contributes nothing and is skipped.
            Absorbed::Taken
        }
    }

    fn finish(&mut self) -> Expr<T> {
        if self.out.is_empty() {
            // An emptied child list collapses to false for both operator
            // kinds; every candidate was an identity constant or a
            // duplicate.
            return Expr::Const(false);
        }
        if self.out.len() == 1 {
            return unshare(self.out.remove(0));
        }
        self.op.node(mem::take(&mut self.out).into_vec())
    }
}

/// A suspended rewrite awaiting the result of a sub-rewrite.
enum Frame<T>
where
    T: Clone + Debug + Eq + Hash,
{
    /// De Morgan push-down: the children of the negated operator still to
    /// be negated, and the converted children built so far. Yields the
    /// dual operator node once the last child returns; the built node is
    /// reduced on a later encounter, not here.
    DeMorgan {
        op: OpKind,
        pending: VecDeque<Rc<Expr<T>>>,
        built: Vec<Rc<Expr<T>>>,
    },
    /// A short-circuit reduction paused on a non-leaf candidate.
    Reduce(Reduction<T>),
}

/// What dispatching one node produced.
enum Dispatched<T>
where
    T: Clone + Debug + Eq + Hash,
{
    /// The node was already a fixed point, or folded to one outright.
    Done(Expr<T>),
    /// A frame was suspended; rewrite the second field next.
    Push(Frame<T>, Rc<Expr<T>>),
    /// An equivalent node to dispatch instead (double negation).
    Again(Rc<Expr<T>>),
}

/// Dispatches one node by kind: negations to the push-down rules,
/// disjunctions to the reducer, conjunctions to distribution (which falls
/// back to the reducer), constants and literals to themselves.
fn dispatch<T>(e: &Rc<Expr<T>>) -> Result<Dispatched<T>, RewriteError>
where
    T: Clone + Debug + Eq + Hash,
{
    match &**e {
        Expr::Const(_) | Expr::Literal(_) => Ok(Dispatched::Done((**e).clone())),
        Expr::Not(inner) => Ok(normalize_not(inner)),
        Expr::Or(children) => {
            check_arity(OpKind::Or, children.len())?;
            Ok(start_reduction(OpKind::Or, children))
        }
        Expr::And(children) => {
            check_arity(OpKind::And, children.len())?;
            Ok(distribute(children))
        }
    }
}

/// Pushes a negation one level down. Total over every node kind: De Morgan
/// for the operators, a polarity flip for literals, cancellation for a
/// nested negation, complement for constants.
fn normalize_not<T>(inner: &Rc<Expr<T>>) -> Dispatched<T>
where
    T: Clone + Debug + Eq + Hash,
{
    match &**inner {
        // De Morgan: the negated operator flips kind and each child
        // re-enters the rewriter as a fresh negation.
        Expr::Or(children) => demorgan(OpKind::And, children),
        Expr::And(children) => demorgan(OpKind::Or, children),
        // Same identity, flipped polarity; a nested NOT is never built.
        Expr::Literal(lit) => Dispatched::Done(Expr::Literal(lit.complement())),
        // Both negations drop, and the grandchild still gets a full pass
        // of its own.
        Expr::Not(grandchild) => Dispatched::Again(grandchild.clone()),
        Expr::Const(value) => Dispatched::Done(Expr::Const(!value)),
    }
}

fn demorgan<T>(op: OpKind, children: &[Rc<Expr<T>>]) -> Dispatched<T>
where
    T: Clone + Debug + Eq + Hash,
{
    let mut pending: VecDeque<Rc<Expr<T>>> = children.iter().cloned().collect();
    match pending.pop_front() {
        Some(first) => Dispatched::Push(
            Frame::DeMorgan {
                op,
                pending,
                built: Vec::with_capacity(children.len()),
            },
            Rc::new(Expr::Not(first)),
        ),
        // A childless operator under a negation dualizes to another
        // childless operator; the arity contract is enforced only when the
        // node itself is dispatched.
        None => Dispatched::Done(op.node(Vec::new())),
    }
}

fn start_reduction<T>(op: OpKind, children: &[Rc<Expr<T>>]) -> Dispatched<T>
where
    T: Clone + Debug + Eq + Hash,
{
    let mut reduction = Reduction::new(op, children);
    match reduction.run() {
        Step::Recurse(child) => Dispatched::Push(Frame::Reduce(reduction), child),
        Step::Finished(result) => Dispatched::Done(result),
    }
}

/// Distributes a conjunction over its last disjunction child, if any; a
/// pure conjunction goes straight to the reducer.
fn distribute<T>(children: &[Rc<Expr<T>>]) -> Dispatched<T>
where
    T: Clone + Debug + Eq + Hash,
{
    // Scan from the end for a disjunction operand.
    let found = children
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, c)| match &**c {
            Expr::Or(branches) => Some((i, branches)),
            _ => None,
        });
    let (position, branches) = match found {
        Some(f) => f,
        None => return start_reduction(OpKind::And, children),
    };

    // The remaining children are the common factors, aliased by reference
    // into every distributed branch.
    let factors: Vec<Rc<Expr<T>>> = children
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != position)
        .map(|(_, c)| c.clone())
        .collect();

    if branches.is_empty() {
        return Dispatched::Done(Expr::Const(false));
    }
    log::trace!(
        "distributing {} branch(es) over {} common factor(s)",
        branches.len(),
        factors.len()
    );
    if branches.len() == 1 {
        // A lone branch degenerates to a single conjunction, still passed
        // through the reducer rather than returned raw.
        let mut product = factors;
        product.push(branches[0].clone());
        return start_reduction(OpKind::And, &product);
    }

    let distributed: Vec<Rc<Expr<T>>> = branches
        .iter()
        .map(|branch| {
            let mut product = factors.clone();
            product.push(branch.clone());
            Rc::new(Expr::And(product))
        })
        .collect();
    start_reduction(OpKind::Or, &distributed)
}

/// One full rewriting pass over `root`.
///
/// The dispatcher, the reducer and distribution are mutually recursive on
/// paper; here the recursion is replaced by an explicit frame stack, so
/// native call-stack depth stays constant no matter how deeply the input
/// (or the deeper structure distribution creates) is nested.
pub fn simplify<T>(root: &Expr<T>) -> Result<Expr<T>, RewriteError>
where
    T: Clone + Debug + Eq + Hash,
{
    let mut frames: Vec<Frame<T>> = Vec::new();
    let mut next = Rc::new(root.clone());
    'dispatch: loop {
        let mut result = match dispatch(&next)? {
            Dispatched::Done(r) => r,
            Dispatched::Push(frame, task) => {
                frames.push(frame);
                next = task;
                continue 'dispatch;
            }
            Dispatched::Again(task) => {
                next = task;
                continue 'dispatch;
            }
        };
        // Unwind the produced value through the suspended frames until one
        // of them schedules more work or the stack empties.
        loop {
            match frames.pop() {
                None => return Ok(result),
                Some(Frame::DeMorgan {
                    op,
                    mut pending,
                    mut built,
                }) => {
                    built.push(Rc::new(result));
                    if let Some(child) = pending.pop_front() {
                        frames.push(Frame::DeMorgan { op, pending, built });
                        next = Rc::new(Expr::Not(child));
                        continue 'dispatch;
                    }
                    // All children converted: the dual node is the De
                    // Morgan result, as built.
                    result = op.node(built);
                }
                Some(Frame::Reduce(mut reduction)) => match reduction.resume(result) {
                    Step::Recurse(child) => {
                        frames.push(Frame::Reduce(reduction));
                        next = child;
                        continue 'dispatch;
                    }
                    Step::Finished(finished) => result = finished,
                },
            }
        }
    }
}

/// Applies [`simplify`] `iterations + 1` times. Each distributive expansion
/// can expose new disjunctions inside newly built conjunctions that only
/// the next pass flattens; callers pick the pass count, there is no
/// automatic fixpoint detection.
pub fn normalize<T>(root: &Expr<T>, iterations: usize) -> Result<Expr<T>, RewriteError>
where
    T: Clone + Debug + Eq + Hash,
{
    log::debug!("normalize: {} pass(es)", iterations + 1);
    let mut current = simplify(root)?;
    for _ in 0..iterations {
        current = simplify(&current)?;
    }
    Ok(current)
}

mod test {
    use super::*;
    use crate::error::RewriteError;
    use crate::expr::{Expr, Literal, OpKind};
    use std::collections::HashMap;

    fn lit(name: &'static str) -> Expr<&'static str> {
        Expr::literal(name)
    }

    fn nlit(name: &'static str) -> Expr<&'static str> {
        Expr::Literal(Literal::new(name).complement())
    }

    fn run_test(orig: Expr<&'static str>, expected: Expr<&'static str>) {
        let output = orig.simplify().unwrap();
        println!(
            "Simplify: {:?} -> {:?} (expected {:?})",
            orig, output, expected
        );
        assert!(output == expected);
    }

    /// Checks that `a` and `b` agree under every assignment of the given
    /// identities.
    fn assert_semantically_equal(
        a: &Expr<&'static str>,
        b: &Expr<&'static str>,
        idents: &[&'static str],
    ) {
        for bits in 0..(1u32 << idents.len()) {
            let vals: HashMap<&'static str, bool> = idents
                .iter()
                .enumerate()
                .map(|(i, ident)| (*ident, bits & (1 << i) != 0))
                .collect();
            assert_eq!(
                a.evaluate(&vals),
                b.evaluate(&vals),
                "disagree under {:?}",
                vals
            );
        }
    }

    #[test]
    fn demorgan_or() {
        run_test(
            Expr::negate(Expr::or(lit("x"), lit("y"))),
            Expr::conjoin(vec![nlit("x"), nlit("y")]).unwrap(),
        );
    }

    #[test]
    fn demorgan_and() {
        run_test(
            Expr::negate(Expr::and(lit("x"), lit("y"))),
            Expr::disjoin(vec![nlit("x"), nlit("y")]).unwrap(),
        );
    }

    #[test]
    fn demorgan_negates_operator_children() {
        // The inner conjunction dualizes in the same pass.
        run_test(
            Expr::negate(Expr::or(lit("x"), Expr::and(lit("y"), lit("z")))),
            Expr::conjoin(vec![
                nlit("x"),
                Expr::disjoin(vec![nlit("y"), nlit("z")]).unwrap(),
            ])
            .unwrap(),
        );
    }

    #[test]
    fn double_negation() {
        run_test(Expr::negate(Expr::negate(lit("x"))), lit("x"));
    }

    #[test]
    fn negated_constant() {
        run_test(Expr::negate(Expr::constant(true)), Expr::constant(false));
        run_test(Expr::negate(Expr::constant(false)), Expr::constant(true));
    }

    #[test]
    fn contradiction_collapses_and() {
        run_test(
            Expr::conjoin(vec![lit("x"), Expr::negate(lit("x"))]).unwrap(),
            Expr::constant(false),
        );
    }

    #[test]
    fn tautology_collapses_or() {
        run_test(
            Expr::disjoin(vec![lit("x"), Expr::negate(lit("x"))]).unwrap(),
            Expr::constant(true),
        );
    }

    #[test]
    fn duplicate_literals_drop() {
        run_test(
            Expr::disjoin(vec![lit("x"), lit("x"), lit("y")]).unwrap(),
            Expr::disjoin(vec![lit("x"), lit("y")]).unwrap(),
        );
    }

    #[test]
    fn duplicate_elimination_is_polarity_aware() {
        run_test(
            Expr::conjoin(vec![lit("x"), lit("y"), lit("x")]).unwrap(),
            Expr::conjoin(vec![lit("x"), lit("y")]).unwrap(),
        );
        // Opposite polarities of different names are not duplicates.
        run_test(
            Expr::conjoin(vec![lit("x"), nlit("y")]).unwrap(),
            Expr::conjoin(vec![lit("x"), nlit("y")]).unwrap(),
        );
    }

    #[test]
    fn shortcircuit_and() {
        run_test(
            Expr::conjoin(vec![Expr::constant(false), lit("x"), lit("y")]).unwrap(),
            Expr::constant(false),
        );
    }

    #[test]
    fn shortcircuit_or() {
        run_test(
            Expr::disjoin(vec![Expr::constant(true), lit("x")]).unwrap(),
            Expr::constant(true),
        );
    }

    #[test]
    fn identity_constants_drop() {
        run_test(
            Expr::conjoin(vec![lit("x"), Expr::constant(true), lit("y")]).unwrap(),
            Expr::conjoin(vec![lit("x"), lit("y")]).unwrap(),
        );
    }

    #[test]
    fn singleton_degenerates() {
        // Dropping the identity constant leaves one survivor, which is
        // unwrapped rather than kept in a 1-child node.
        run_test(
            Expr::disjoin(vec![lit("x"), Expr::constant(false)]).unwrap(),
            lit("x"),
        );
    }

    #[test]
    fn all_identity_constants_collapse_to_false() {
        // The emptied-list contract: false for both operator kinds.
        run_test(
            Expr::conjoin(vec![Expr::constant(true), Expr::constant(true)]).unwrap(),
            Expr::constant(false),
        );
        run_test(
            Expr::disjoin(vec![Expr::constant(false), Expr::constant(false)]).unwrap(),
            Expr::constant(false),
        );
    }

    #[test]
    fn associative_flattening() {
        run_test(
            Expr::and(lit("x"), Expr::and(lit("y"), lit("z"))),
            Expr::conjoin(vec![lit("x"), lit("y"), lit("z")]).unwrap(),
        );
        run_test(
            Expr::or(Expr::or(lit("x"), lit("y")), lit("z")),
            Expr::disjoin(vec![lit("x"), lit("y"), lit("z")]).unwrap(),
        );
    }

    #[test]
    fn contradiction_found_across_nesting() {
        // The nested conjunction flattens first, then contradicts.
        run_test(
            Expr::and(lit("x"), Expr::and(lit("y"), Expr::negate(lit("x")))),
            Expr::constant(false),
        );
    }

    #[test]
    fn distributive_law() {
        // The last disjunction child is distributed; its branches pair with
        // the remaining factor and re-expand in the same pass.
        run_test(
            Expr::and(Expr::or(lit("a"), lit("b")), Expr::or(lit("c"), lit("d"))),
            Expr::disjoin(vec![
                Expr::conjoin(vec![lit("c"), lit("a")]).unwrap(),
                Expr::conjoin(vec![lit("c"), lit("b")]).unwrap(),
                Expr::conjoin(vec![lit("d"), lit("a")]).unwrap(),
                Expr::conjoin(vec![lit("d"), lit("b")]).unwrap(),
            ])
            .unwrap(),
        );
    }

    #[test]
    fn distribution_preserves_semantics() {
        let orig = Expr::and(lit("x"), Expr::or(lit("y"), lit("z")));
        let expanded = orig.simplify().unwrap();
        assert_semantically_equal(&orig, &expanded, &["x", "y", "z"]);
        // And the expansion really is a disjunction of conjunctions.
        assert!(expanded.is_or());
    }

    #[test]
    fn distribution_reaches_fixpoint_in_one_extra_pass() {
        let orig = Expr::and(lit("x"), Expr::or(lit("y"), lit("z")));
        let once = orig.simplify().unwrap();
        let twice = once.simplify().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn xor_normalizes_to_dnf() {
        let dnf = Expr::xor(lit("x"), lit("y")).normalize(1).unwrap();
        assert_eq!(
            dnf,
            Expr::disjoin(vec![
                Expr::conjoin(vec![lit("x"), nlit("y")]).unwrap(),
                Expr::conjoin(vec![lit("y"), nlit("x")]).unwrap(),
            ])
            .unwrap()
        );
        assert_semantically_equal(&Expr::xor(lit("x"), lit("y")), &dnf, &["x", "y"]);
    }

    #[test]
    fn normalize_zero_iterations_is_one_pass() {
        let e = Expr::and(lit("x"), Expr::or(lit("y"), lit("z")));
        assert_eq!(e.normalize(0).unwrap(), e.simplify().unwrap());
    }

    #[test]
    fn malformed_conjoin_rejected() {
        assert_eq!(
            Expr::conjoin(vec![lit("x")]),
            Err(RewriteError::MalformedOperator {
                kind: OpKind::And,
                arity: 1,
            })
        );
    }

    #[test]
    fn malformed_disjoin_rejected() {
        assert_eq!(
            Expr::<&'static str>::disjoin(vec![]),
            Err(RewriteError::MalformedOperator {
                kind: OpKind::Or,
                arity: 0,
            })
        );
    }

    #[test]
    fn malformed_node_aborts_rewrite() {
        // A hand-built 1-child node bypasses the constructors; the rewrite
        // fails loudly instead of degrading.
        let bad: Expr<&'static str> = Expr::And(vec![Rc::new(lit("x"))]);
        assert_eq!(
            bad.simplify(),
            Err(RewriteError::MalformedOperator {
                kind: OpKind::And,
                arity: 1,
            })
        );
    }

    #[test]
    fn malformed_node_aborts_from_nesting() {
        // The violation surfaces even when the bad node is buried, and no
        // partial result is produced.
        let bad = Expr::or(lit("x"), Expr::Or(vec![Rc::new(lit("y"))]));
        assert_eq!(
            bad.simplify(),
            Err(RewriteError::MalformedOperator {
                kind: OpKind::Or,
                arity: 1,
            })
        );
    }

    #[test]
    fn deep_negation_chain_is_stack_safe() {
        let mut e = lit("x");
        for _ in 0..10_000 {
            e = Expr::negate(e);
        }
        assert_eq!(e.simplify().unwrap(), lit("x"));
    }

    #[test]
    fn deep_conjunction_chain_is_stack_safe() {
        let mut e = Expr::and(lit("a"), lit("b"));
        for _ in 0..10_000 {
            e = Expr::and(lit("a"), e);
        }
        assert_eq!(
            e.simplify().unwrap(),
            Expr::conjoin(vec![lit("a"), lit("b")]).unwrap()
        );
    }
}
