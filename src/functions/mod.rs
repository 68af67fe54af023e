//! The fixed set of built-in functions
//!
//! This module is the single source of truth for the function set
//! {sin, cos, tan, log, exp, sqrt, abs}: their names, numeric evaluation,
//! derivative formulas and (for linear arguments) antiderivatives.

use std::fmt;
use std::sync::Arc;

use crate::expr::{Expr, ExprKind};

pub(crate) mod definitions;
pub(crate) mod registry;

pub(crate) use registry::Registry;

/// A built-in single-argument function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Log,
    Exp,
    Sqrt,
    Abs,
}

impl Function {
    /// Every function, in declaration order
    pub const ALL: [Function; 7] = [
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Log,
        Function::Exp,
        Function::Sqrt,
        Function::Abs,
    ];

    /// Canonical name as written in input text
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Log => "log",
            Function::Exp => "exp",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
        }
    }

    /// Look up a function by its canonical name (case-sensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Registry::get(name).map(|def| def.func)
    }

    /// True for the trigonometric functions
    pub fn is_trig(self) -> bool {
        matches!(self, Function::Sin | Function::Cos | Function::Tan)
    }

    /// Evaluate numerically; `None` outside the real domain
    pub fn eval(self, x: f64) -> Option<f64> {
        Registry::get(self.name()).and_then(|def| (def.eval)(x))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== Helpers for building derivative expressions =====

/// Multiply, optimizing for common cases (0 and 1)
pub(crate) fn mul_opt(a: Expr, b: Expr) -> Expr {
    match (&a.kind, &b.kind) {
        (ExprKind::Number(x), _) if *x == 0.0 => Expr::number(0.0),
        (_, ExprKind::Number(x)) if *x == 0.0 => Expr::number(0.0),
        (ExprKind::Number(x), _) if *x == 1.0 => b,
        (_, ExprKind::Number(x)) if *x == 1.0 => a,
        _ => Expr::product(vec![a, b]),
    }
}

/// Negate an expression
pub(crate) fn neg(e: Expr) -> Expr {
    Expr::negate(e)
}

/// Apply `func` to a shared argument
pub(crate) fn apply(func: Function, arg: &Arc<Expr>) -> Expr {
    Expr::func_arc(func, Arc::clone(arg))
}
