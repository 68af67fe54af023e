//! Expression visitor pattern for tree traversal
//!
//! Provides a clean interface for walking the expression tree without
//! manually handling the recursive structure.

use std::sync::Arc;

use crate::expr::{Constant, Expr, ExprKind};
use crate::functions::Function;

/// Trait for visiting expression nodes
///
/// Each method returns a boolean indicating whether to continue visiting children.
/// All methods default to "continue", so a visitor only overrides what it needs.
///
/// # Example
/// ```
/// use funcalc::{Expr, visitor::{ExprVisitor, walk_expr}};
///
/// struct NumberSum(f64);
///
/// impl ExprVisitor for NumberSum {
///     fn visit_number(&mut self, n: f64) -> bool {
///         self.0 += n;
///         true
///     }
/// }
///
/// let e = Expr::number(2.0) + Expr::number(3.0) * Expr::symbol("x");
/// let mut v = NumberSum(0.0);
/// walk_expr(&e, &mut v);
/// assert_eq!(v.0, 5.0);
/// ```
pub trait ExprVisitor {
    /// Visit a number literal
    fn visit_number(&mut self, _n: f64) -> bool {
        true
    }

    /// Visit a variable
    fn visit_symbol(&mut self, _name: &str) -> bool {
        true
    }

    /// Visit a named constant
    fn visit_constant(&mut self, _c: Constant) -> bool {
        true
    }

    /// Visit a function application, returns true to visit the argument
    fn visit_function(&mut self, _func: Function, _arg: &Expr) -> bool {
        true
    }

    /// Visit a sum or product ("+" or "*"), returns true to visit the operands
    fn visit_nary(&mut self, _op: &str, _children: &[Arc<Expr>]) -> bool {
        true
    }

    /// Visit a power, returns true to visit base and exponent
    fn visit_pow(&mut self, _base: &Expr, _exp: &Expr) -> bool {
        true
    }
}

/// Walk an expression tree with a visitor
///
/// Visits nodes in pre-order (parent before children).
pub fn walk_expr<V: ExprVisitor>(expr: &Expr, visitor: &mut V) {
    match &expr.kind {
        ExprKind::Number(n) => {
            visitor.visit_number(*n);
        }
        ExprKind::Symbol(s) => {
            visitor.visit_symbol(s);
        }
        ExprKind::Constant(c) => {
            visitor.visit_constant(*c);
        }
        ExprKind::FunctionCall { func, arg } => {
            if visitor.visit_function(*func, arg) {
                walk_expr(arg, visitor);
            }
        }
        ExprKind::Sum(terms) => {
            if visitor.visit_nary("+", terms) {
                for t in terms {
                    walk_expr(t, visitor);
                }
            }
        }
        ExprKind::Product(factors) => {
            if visitor.visit_nary("*", factors) {
                for f in factors {
                    walk_expr(f, visitor);
                }
            }
        }
        ExprKind::Pow(base, exp) => {
            if visitor.visit_pow(base, exp) {
                walk_expr(base, visitor);
                walk_expr(exp, visitor);
            }
        }
    }
}

/// A simple visitor that counts nodes
#[derive(Default)]
pub struct NodeCounter {
    pub count: usize,
}

impl ExprVisitor for NodeCounter {
    fn visit_number(&mut self, _n: f64) -> bool {
        self.count += 1;
        true
    }

    fn visit_symbol(&mut self, _name: &str) -> bool {
        self.count += 1;
        true
    }

    fn visit_constant(&mut self, _c: Constant) -> bool {
        self.count += 1;
        true
    }

    fn visit_function(&mut self, _func: Function, _arg: &Expr) -> bool {
        self.count += 1;
        true
    }

    fn visit_nary(&mut self, _op: &str, _children: &[Arc<Expr>]) -> bool {
        self.count += 1;
        true
    }

    fn visit_pow(&mut self, _base: &Expr, _exp: &Expr) -> bool {
        self.count += 1;
        true
    }
}
