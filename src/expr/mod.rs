//! Expression tree for single-variable calculus.
//!
//! This module defines:
//! - `Expr` - The central tree node type
//! - `ExprKind` - The variants of expression nodes (Number, Symbol, Sum, ...)
//! - `Constant` - The named symbol constants `pi` and `e`
//!
//! # Architecture
//!
//! ## N-ary Sum/Product
//! Instead of binary `Add(left, right)`, we use N-ary `Sum(Vec<Arc<Expr>>)`.
//! - `a + b + c` is `Sum([a, b, c])`, flattened by the constructors
//! - Subtraction is `Sum([a, Product([-1, b])])`
//! - Division is `Product([a, Pow(b, -1)])`
//!
//! No node encodes subtraction or division directly, so the simplifier and the
//! differentiator only need rules for sums, products and powers.
//!
//! ## Structural Hashing
//! Each `Expr` carries a pre-computed hash for O(1) equality rejection. The
//! hash of a Sum or Product is commutative, matching the order-insensitive
//! equality of those nodes.
//!
//! ## Values, not identities
//! Variables are plain `Symbol(String)` nodes compared by name. Every
//! transformation builds a new tree; nodes are never mutated in place.

mod analysis;
mod constructors;
mod ordering;

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::functions::Function;

pub(crate) use analysis::FactorParts;
pub use ordering::{expr_cmp, term_cmp};

/// Named symbol constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    /// Canonical text name
    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
        }
    }

    /// Numeric value used when an expression is reduced to a scalar
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }
}

/// A symbolic expression.
///
/// Cheap to clone: children are shared through `Arc`.
#[derive(Debug, Clone)]
pub struct Expr {
    /// Structural hash for O(1) equality rejection
    pub(crate) hash: u64,
    /// The kind of expression (structure)
    pub(crate) kind: ExprKind,
}

impl Deref for Expr {
    type Target = ExprKind;
    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

/// The kind (structure) of an expression node.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Constant number (e.g., 3, 0.25)
    Number(f64),

    /// Variable (e.g., "x", "t")
    Symbol(String),

    /// Named constant (`pi`, `e`)
    Constant(Constant),

    /// N-ary sum: a + b + c + ...
    Sum(Vec<Arc<Expr>>),

    /// N-ary product: a * b * c * ...
    Product(Vec<Arc<Expr>>),

    /// Exponentiation (binary - not associative)
    Pow(Arc<Expr>, Arc<Expr>),

    /// Application of one of the fixed built-in functions
    FunctionCall { func: Function, arg: Arc<Expr> },
}

impl Expr {
    pub(crate) fn new(kind: ExprKind) -> Self {
        let hash = compute_expr_hash(&kind);
        Expr { hash, kind }
    }

    /// Borrow the node kind
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Unwrap an `Arc<Expr>`, cloning only when it is shared
    pub(crate) fn unwrap_arc(arc: Arc<Expr>) -> Expr {
        Arc::try_unwrap(arc).unwrap_or_else(|shared| (*shared).clone())
    }
}

// =============================================================================
// EQUALITY AND HASHING
// =============================================================================

// Structural equality. Sum terms and Product factors compare as multisets,
// so `x + 1` equals `1 + x`.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        if self.hash != other.hash {
            return false;
        }
        match (&self.kind, &other.kind) {
            (ExprKind::Number(a), ExprKind::Number(b)) => a == b,
            (ExprKind::Symbol(a), ExprKind::Symbol(b)) => a == b,
            (ExprKind::Constant(a), ExprKind::Constant(b)) => a == b,
            (ExprKind::Sum(a), ExprKind::Sum(b)) | (ExprKind::Product(a), ExprKind::Product(b)) => {
                multiset_eq(a, b)
            }
            (ExprKind::Pow(b1, e1), ExprKind::Pow(b2, e2)) => b1 == b2 && e1 == e2,
            (
                ExprKind::FunctionCall { func: f1, arg: a1 },
                ExprKind::FunctionCall { func: f2, arg: a2 },
            ) => f1 == f2 && a1 == a2,
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

fn multiset_eq(a: &[Arc<Expr>], b: &[Arc<Expr>]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    // Fast path: same order
    if a.iter().zip(b).all(|(x, y)| x == y) {
        return true;
    }
    let mut used = vec![false; b.len()];
    'outer: for x in a {
        for (j, y) in b.iter().enumerate() {
            if !used[j] && x == y {
                used[j] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

/// Compute the structural hash of a node from its children's cached hashes
pub(crate) fn compute_expr_hash(kind: &ExprKind) -> u64 {
    let mut hasher = FxHasher::default();
    std::mem::discriminant(kind).hash(&mut hasher);
    match kind {
        ExprKind::Number(n) => {
            // Normalize -0.0 to 0.0 before hashing
            let normalized = if *n == 0.0 { 0.0 } else { *n };
            normalized.to_bits().hash(&mut hasher);
        }
        ExprKind::Symbol(s) => s.hash(&mut hasher),
        ExprKind::Constant(c) => c.hash(&mut hasher),
        ExprKind::Sum(children) | ExprKind::Product(children) => {
            // Commutative: order of children does not matter
            let mut acc: u64 = 0;
            for c in children {
                acc = acc.wrapping_add(c.hash);
            }
            acc.hash(&mut hasher);
        }
        ExprKind::Pow(base, exp) => {
            base.hash.hash(&mut hasher);
            exp.hash.hash(&mut hasher);
        }
        ExprKind::FunctionCall { func, arg } => {
            func.hash(&mut hasher);
            arg.hash.hash(&mut hasher);
        }
    }
    hasher.finish()
}

// =============================================================================
// DROP IMPLEMENTATION - Iterative drop to prevent stack overflow
// =============================================================================

impl Drop for Expr {
    fn drop(&mut self) {
        fn drain_children(kind: &mut ExprKind, queue: &mut Vec<Arc<Expr>>) {
            match kind {
                ExprKind::Sum(children) | ExprKind::Product(children) => {
                    queue.extend(std::mem::take(children));
                }
                ExprKind::Pow(base, exp) => {
                    queue.push(std::mem::replace(base, leaf()));
                    queue.push(std::mem::replace(exp, leaf()));
                }
                ExprKind::FunctionCall { arg, .. } => {
                    queue.push(std::mem::replace(arg, leaf()));
                }
                ExprKind::Number(_) | ExprKind::Symbol(_) | ExprKind::Constant(_) => {}
            }
        }

        let mut work_queue = Vec::new();
        drain_children(&mut self.kind, &mut work_queue);

        while let Some(child_arc) = work_queue.pop() {
            if let Ok(mut child_expr) = Arc::try_unwrap(child_arc) {
                drain_children(&mut child_expr.kind, &mut work_queue);
            }
        }
    }
}

/// Shared placeholder leaf swapped into binary nodes while they are dropped
fn leaf() -> Arc<Expr> {
    static LEAF: std::sync::LazyLock<Arc<Expr>> = std::sync::LazyLock::new(|| {
        Arc::new(Expr {
            hash: 0,
            kind: ExprKind::Number(0.0),
        })
    });
    Arc::clone(&LEAF)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_flattening() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let z = Expr::symbol("z");

        let inner = Expr::sum(vec![x, y]);
        let outer = Expr::sum(vec![inner, z]);

        match &outer.kind {
            ExprKind::Sum(terms) => assert_eq!(terms.len(), 3),
            _ => panic!("Expected Sum"),
        }
    }

    #[test]
    fn test_product_flattening() {
        let inner = Expr::product(vec![Expr::symbol("a"), Expr::symbol("b")]);
        let outer = Expr::product(vec![inner, Expr::symbol("c")]);

        match &outer.kind {
            ExprKind::Product(factors) => assert_eq!(factors.len(), 3),
            _ => panic!("Expected Product"),
        }
    }

    #[test]
    fn test_subtraction_as_sum() {
        let result = Expr::sub_expr(Expr::symbol("x"), Expr::symbol("y"));
        match &result.kind {
            ExprKind::Sum(terms) => {
                assert_eq!(terms.len(), 2);
                assert!(matches!(terms[1].kind, ExprKind::Product(_)));
            }
            _ => panic!("Expected Sum from subtraction"),
        }
    }

    #[test]
    fn test_division_as_product() {
        let result = Expr::div_expr(Expr::number(1.0), Expr::symbol("x"));
        match &result.kind {
            ExprKind::Product(factors) => {
                assert_eq!(factors.len(), 2);
                assert!(matches!(factors[1].kind, ExprKind::Pow(_, _)));
            }
            _ => panic!("Expected Product from division"),
        }
    }

    #[test]
    fn test_commutative_equality() {
        let a = Expr::sum(vec![Expr::symbol("x"), Expr::number(1.0)]);
        let b = Expr::sum(vec![Expr::number(1.0), Expr::symbol("x")]);
        assert_eq!(a, b);

        let c = Expr::pow(Expr::symbol("x"), Expr::number(2.0));
        let d = Expr::pow(Expr::number(2.0), Expr::symbol("x"));
        assert_ne!(c, d);
    }

    #[test]
    fn test_deep_tree_drops_without_overflow() {
        let mut e = Expr::symbol("x");
        for _ in 0..100_000 {
            e = Expr::func(Function::Sin, e);
        }
        drop(e);
    }
}
