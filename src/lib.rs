// boolean_dnf: a Rust crate for Boolean-expression normalization.
//
// Copyright (c) 2026 Chris Fallin <cfallin@c1f.net>. Released under the MIT
// License.
//

#![allow(unused_imports)]
#![allow(dead_code)]

//! # boolean\_dnf Boolean-expression normalization library
//!
//! This crate rewrites symbolic Boolean expression trees — constants,
//! named literals with a polarity, negations, and n-ary `AND` / `OR`
//! nodes — into an equivalent, smaller or canonical form. Negations are
//! pushed down with DeMorgan's Law, duplicate literals are dropped,
//! contradictions and absorbing constants short-circuit whole operators,
//! and conjunctions are distributed over their disjunction operands toward
//! a disjunction-of-conjunctions (sum-of-products) form. The engine
//! reduces; it does not guarantee a minimal cover.
//!
//! The main pieces of interest are:
//!
//! * `Expr`, an AST enum for `AND` / `OR` / `NOT`-based expressions, with
//!   the smart constructors and the `simplify` / `normalize` entry points.
//! * `Literal`, a named proposition reference with a local polarity flag.
//! * `RewriteError`, the failure taxonomy for contract-violating input.
//!
//! ```
//! use boolean_dnf::Expr;
//!
//! let gate = Expr::literal("enable") & (Expr::literal("a") | Expr::literal("b"));
//! let dnf = gate.normalize(1).unwrap();
//! assert_eq!(dnf.to_text(), "((enable * a) + (enable * b))");
//! ```

mod error;
mod expr;
mod simplify;

pub use error::*;
pub use expr::*;
