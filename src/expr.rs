// boolean_dnf: a Rust crate for Boolean-expression normalization.
//
// Copyright (c) 2026 Chris Fallin <cfallin@c1f.net>. Released under the MIT
// License.
//

use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::rc::Rc;

use itertools::Itertools;

use crate::error::RewriteError;
use crate::simplify;

/// The two associative operator kinds. Used to parameterize reduction and to
/// name the offending node in a [`RewriteError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// N-ary conjunction.
    And,
    /// N-ary disjunction.
    Or,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OpKind::And => write!(f, "AND"),
            OpKind::Or => write!(f, "OR"),
        }
    }
}

/// A `Literal` names a Boolean proposition and carries a local polarity
/// flag. Two literals with equal identities refer to the same underlying
/// proposition even when they are distinct instances; the polarity belongs
/// to each instance, not to the shared identity.
///
/// ```
/// use boolean_dnf::Literal;
///
/// let a = Literal::new("ready");
/// let b = Literal::new("ready").complement();
/// assert!(a.same_ident(&b));
/// assert!(!a.is_negated() && b.is_negated());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal<T>
where
    T: Clone + Debug + Eq + Hash,
{
    ident: T,
    negated: bool,
}

impl<T> Literal<T>
where
    T: Clone + Debug + Eq + Hash,
{
    /// Creates a positive-polarity literal for `ident`.
    pub fn new(ident: T) -> Literal<T> {
        Literal {
            ident,
            negated: false,
        }
    }

    /// The identity this literal refers to.
    pub fn ident(&self) -> &T {
        &self.ident
    }

    /// Whether this instance is negated.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// A literal with the same identity and flipped polarity.
    pub fn complement(&self) -> Literal<T> {
        Literal {
            ident: self.ident.clone(),
            negated: !self.negated,
        }
    }

    /// Identity comparison: `true` iff both literals refer to the same
    /// proposition, regardless of polarity.
    pub fn same_ident(&self, other: &Literal<T>) -> bool {
        self.ident == other.ident
    }
}

/// An `Expr` is a symbolic Boolean expression tree. It may contain
/// constants, literals (named free variables with a polarity), and the
/// fundamental operations NOT, AND, OR, where AND and OR are n-ary.
///
/// Children of compound nodes are held by shared immutable reference:
/// rewriting never mutates a node in place, so a subtree may safely be
/// aliased from several parents (the structure is a DAG, never a cycle).
///
/// ```
/// use boolean_dnf::Expr;
///
/// let x = Expr::literal("x");
/// let contradiction = x.clone() & !x;
/// assert_eq!(contradiction.simplify().unwrap(), Expr::constant(false));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr<T>
where
    T: Clone + Debug + Eq + Hash,
{
    /// A boolean constant: true or false.
    Const(bool),

    /// A named proposition with local polarity.
    Literal(Literal<T>),

    /// The logical complement of the contained expression argument.
    Not(Rc<Expr<T>>),

    /// The logical AND of the child expressions. Nodes built through the
    /// public constructors always have at least 2 children.
    And(Vec<Rc<Expr<T>>>),

    /// The logical OR of the child expressions, with the same arity
    /// contract as AND.
    Or(Vec<Rc<Expr<T>>>),
}

impl<T> Expr<T>
where
    T: Clone + Debug + Eq + Hash,
{
    /// Builds a constant node.
    pub fn constant(value: bool) -> Expr<T> {
        Expr::Const(value)
    }

    /// Builds a fresh positive-polarity literal node for `ident`. Two calls
    /// with equal identities produce distinct instances that the rewriting
    /// engine still recognizes as the same proposition.
    pub fn literal(ident: T) -> Expr<T> {
        Expr::Literal(Literal::new(ident))
    }

    /// Builds a NOT node around an argument, consuming the argument
    /// expression.
    pub fn negate(e: Expr<T>) -> Expr<T> {
        Expr::Not(Rc::new(e))
    }

    /// Builds an AND node around two arguments, consuming the argument
    /// expressions.
    pub fn and(e1: Expr<T>, e2: Expr<T>) -> Expr<T> {
        Expr::And(vec![Rc::new(e1), Rc::new(e2)])
    }

    /// Builds an OR node around two arguments, consuming the argument
    /// expressions.
    pub fn or(e1: Expr<T>, e2: Expr<T>) -> Expr<T> {
        Expr::Or(vec![Rc::new(e1), Rc::new(e2)])
    }

    /// Builds an n-ary AND node. Fewer than 2 children violate the
    /// construction contract and fail with
    /// [`RewriteError::MalformedOperator`].
    ///
    /// ```
    /// use boolean_dnf::Expr;
    ///
    /// let e = Expr::conjoin(vec![
    ///     Expr::literal("a"),
    ///     Expr::literal("b"),
    ///     Expr::literal("c"),
    /// ]).unwrap();
    /// assert_eq!(e.to_text(), "(a * b * c)");
    ///
    /// assert!(Expr::conjoin(vec![Expr::literal("a")]).is_err());
    /// ```
    pub fn conjoin(children: Vec<Expr<T>>) -> Result<Expr<T>, RewriteError> {
        if children.len() < 2 {
            return Err(RewriteError::MalformedOperator {
                kind: OpKind::And,
                arity: children.len(),
            });
        }
        Ok(Expr::And(children.into_iter().map(Rc::new).collect()))
    }

    /// Builds an n-ary OR node, with the same arity contract as
    /// [`Expr::conjoin`].
    pub fn disjoin(children: Vec<Expr<T>>) -> Result<Expr<T>, RewriteError> {
        if children.len() < 2 {
            return Err(RewriteError::MalformedOperator {
                kind: OpKind::Or,
                arity: children.len(),
            });
        }
        Ok(Expr::Or(children.into_iter().map(Rc::new).collect()))
    }

    pub fn xor(e1: Expr<T>, e2: Expr<T>) -> Expr<T> {
        let nand = !(e1.clone() & e2.clone());
        let or = e1 | e2;
        nand & or
    }

    /// Returns `true` if this `Expr` is a constant.
    pub fn is_const(&self) -> bool {
        match self {
            Expr::Const(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this `Expr` is a literal.
    pub fn is_literal(&self) -> bool {
        match self {
            Expr::Literal(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this `Expr` is a NOT node.
    pub fn is_not(&self) -> bool {
        match self {
            Expr::Not(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this `Expr` is an AND node.
    pub fn is_and(&self) -> bool {
        match self {
            Expr::And(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this `Expr` is an OR node.
    pub fn is_or(&self) -> bool {
        match self {
            Expr::Or(_) => true,
            _ => false,
        }
    }

    /// Evaluates the expression with a particular set of identity
    /// assignments. If any identities are not assigned, they default to
    /// `false`.
    pub fn evaluate(&self, vals: &HashMap<T, bool>) -> bool {
        match self {
            Expr::Const(value) => *value,
            Expr::Literal(lit) => *vals.get(lit.ident()).unwrap_or(&false) != lit.is_negated(),
            Expr::Not(x) => !x.evaluate(vals),
            Expr::And(children) => children.iter().all(|c| c.evaluate(vals)),
            Expr::Or(children) => children.iter().any(|c| c.evaluate(vals)),
        }
    }

    /// Evaluates the expression using the provided function to map literal
    /// identities to boolean values. This is a generalization of
    /// [`Expr::evaluate`], where the lookup in a hashmap is replaced with an
    /// arbitrary computation.
    ///
    ///```
    /// use boolean_dnf::Expr;
    ///
    /// let expression = Expr::literal(10) | Expr::literal(3);
    ///
    /// // check if the expression satisfies a predicate
    /// assert!(expression.evaluate_with(|&x| x > 5));
    /// ```
    pub fn evaluate_with<F>(&self, f: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.evaluate_with1(&f)
    }

    fn evaluate_with1<F>(&self, f: &F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        match self {
            Expr::Const(value) => *value,
            Expr::Literal(lit) => f(lit.ident()) != lit.is_negated(),
            Expr::Not(x) => !x.evaluate_with1(f),
            Expr::And(children) => children.iter().all(|c| c.evaluate_with1(f)),
            Expr::Or(children) => children.iter().any(|c| c.evaluate_with1(f)),
        }
    }

    /// Rewrites the expression once using well-known logic identities:
    /// De Morgan push-down of negations, short-circuiting on absorbing
    /// constants and contradicting literal pairs, duplicate-literal
    /// elimination, and distribution of ANDs over ORs toward a
    /// disjunction-of-conjunctions form.
    ///
    /// A single pass may leave structure that only a further pass can
    /// flatten, because distribution exposes new disjunctions inside newly
    /// built conjunctions; use [`Expr::normalize`] to apply a bounded number
    /// of passes.
    ///
    /// ```
    /// use boolean_dnf::Expr;
    ///
    /// let expr = Expr::negate(Expr::or(Expr::literal("a"), Expr::literal("b")));
    /// assert_eq!(expr.simplify().unwrap().to_text(), "(!a * !b)");
    /// ```
    pub fn simplify(&self) -> Result<Expr<T>, RewriteError> {
        simplify::simplify(self)
    }

    /// Applies [`Expr::simplify`] `iterations + 1` times. There is no
    /// automatic fixpoint detection: callers either know the formula's
    /// nesting depth or iterate until two consecutive outputs are
    /// structurally equal.
    ///
    /// ```
    /// use boolean_dnf::Expr;
    ///
    /// let (x, y) = (Expr::literal("x"), Expr::literal("y"));
    /// let dnf = Expr::xor(x, y).normalize(1).unwrap();
    /// assert_eq!(dnf.to_text(), "((x * !y) + (y * !x))");
    /// ```
    pub fn normalize(&self, iterations: usize) -> Result<Expr<T>, RewriteError> {
        simplify::normalize(self, iterations)
    }

    /// Map literal identities using the specified mapping function.
    pub fn map<F, R>(&self, f: F) -> Expr<R>
    where
        F: Fn(&T) -> R,
        R: Clone + Debug + Eq + Hash,
    {
        self.map1(&f)
    }

    fn map1<F, R>(&self, f: &F) -> Expr<R>
    where
        F: Fn(&T) -> R,
        R: Clone + Debug + Eq + Hash,
    {
        match self {
            Expr::Const(value) => Expr::Const(*value),
            Expr::Literal(lit) => Expr::Literal(Literal {
                ident: f(lit.ident()),
                negated: lit.is_negated(),
            }),
            Expr::Not(x) => Expr::Not(Rc::new(x.map1(f))),
            Expr::And(children) => Expr::And(children.iter().map(|c| Rc::new(c.map1(f))).collect()),
            Expr::Or(children) => Expr::Or(children.iter().map(|c| Rc::new(c.map1(f))).collect()),
        }
    }
}

impl<T> Expr<T>
where
    T: Clone + Debug + Eq + Hash + fmt::Display,
{
    /// Renders the expression in infix notation: constants as
    /// `TRUE`/`FALSE`, a negated literal as `!name`, a conjunction as
    /// `(a * b * …)`, a disjunction as `(a + b + …)`, and a negated
    /// compound as `!(expr)`.
    ///
    /// ```
    /// use boolean_dnf::Expr;
    ///
    /// let e = Expr::and(
    ///     Expr::literal("a"),
    ///     Expr::or(Expr::literal("b"), !Expr::literal("c")),
    /// );
    /// assert_eq!(e.to_text(), "(a * (b + !(c)))");
    /// ```
    pub fn to_text(&self) -> String {
        match self {
            Expr::Const(true) => "TRUE".to_string(),
            Expr::Const(false) => "FALSE".to_string(),
            Expr::Literal(lit) => {
                if lit.is_negated() {
                    format!("!{}", lit.ident())
                } else {
                    lit.ident().to_string()
                }
            }
            Expr::Not(x) => format!("!({})", x.to_text()),
            Expr::And(children) => {
                format!("({})", children.iter().map(|c| c.to_text()).join(" * "))
            }
            Expr::Or(children) => {
                format!("({})", children.iter().map(|c| c.to_text()).join(" + "))
            }
        }
    }
}

impl<T> fmt::Display for Expr<T>
where
    T: Clone + Debug + Eq + Hash + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl<T> Not for Expr<T>
where
    T: Clone + Debug + Eq + Hash,
{
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::negate(self)
    }
}

impl<T> BitAnd<Expr<T>> for Expr<T>
where
    T: Clone + Debug + Eq + Hash,
{
    type Output = Self;

    fn bitand(self, rhs: Expr<T>) -> Self::Output {
        Self::and(self, rhs)
    }
}

impl<T> BitAndAssign<Expr<T>> for Expr<T>
where
    T: Clone + Debug + Eq + Hash,
{
    fn bitand_assign(&mut self, rhs: Expr<T>) {
        *self = Self::and(self.clone(), rhs);
    }
}

impl<T> BitOr<Expr<T>> for Expr<T>
where
    T: Clone + Debug + Eq + Hash,
{
    type Output = Self;

    fn bitor(self, rhs: Expr<T>) -> Self::Output {
        Self::or(self, rhs)
    }
}

impl<T> BitOrAssign<Expr<T>> for Expr<T>
where
    T: Clone + Debug + Eq + Hash,
{
    fn bitor_assign(&mut self, rhs: Expr<T>) {
        *self = Self::or(self.clone(), rhs);
    }
}

impl<T> BitXor<Expr<T>> for Expr<T>
where
    T: Clone + Debug + Eq + Hash,
{
    type Output = Self;

    fn bitxor(self, rhs: Expr<T>) -> Self::Output {
        Self::xor(self, rhs)
    }
}

impl<T> BitXorAssign<Expr<T>> for Expr<T>
where
    T: Clone + Debug + Eq + Hash,
{
    fn bitxor_assign(&mut self, rhs: Expr<T>) {
        *self = Self::xor(self.clone(), rhs);
    }
}
