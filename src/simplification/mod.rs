//! Simplification framework - reduces expressions to a canonical shorter form
//!
//! The engine walks the tree bottom-up and applies priority-ordered rules
//! until a full pass changes nothing:
//! - constant folding of pure-number subtrees (`numeric`)
//! - identities for `+0`, `*1`, `^1`, `^0`, nested powers (`algebraic`)
//! - like-term and like-factor collection (`algebraic`)
//! - `log`/`exp` inverses (`exponential`)
//! - canonical ordering of sum terms and product factors, always last
//!
//! Simplification never changes the value an expression represents where
//! both forms are defined, and simplifying a simplified tree returns an equal
//! tree.
pub(crate) mod engine;
mod rules;

use log::debug;

use crate::Expr;

/// Simplify an expression with the default iteration limit
///
/// # Example
/// ```
/// use funcalc::{parse, simplify};
///
/// let e = parse("x + x + 2*3").unwrap();
/// assert_eq!(simplify(e).to_string(), "2*x + 6");
/// ```
pub fn simplify(expr: Expr) -> Expr {
    simplify_with_limit(expr, engine::DEFAULT_MAX_ITERATIONS)
}

/// Simplify with an explicit cap on full rewrite passes
pub fn simplify_with_limit(expr: Expr, max_iterations: usize) -> Expr {
    let before = expr.node_count();
    let result = engine::Simplifier::new()
        .with_max_iterations(max_iterations)
        .simplify(expr);
    debug!("simplified {} nodes into {}", before, result.node_count());
    result
}
