//! Constructors and operator overloads for `Expr`.
//!
//! Sums and products flatten nested nodes of the same kind on construction;
//! no other rewriting happens here (that is the simplifier's job), so the
//! parser's output keeps the shape the user wrote.

use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use super::{Constant, Expr, ExprKind};
use crate::functions::Function;

impl Expr {
    /// Create a number expression
    pub fn number(n: f64) -> Self {
        Expr::new(ExprKind::Number(n))
    }

    /// Create a variable expression
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::new(ExprKind::Symbol(name.into()))
    }

    /// Create a named constant expression
    pub fn constant(c: Constant) -> Self {
        Expr::new(ExprKind::Constant(c))
    }

    /// Create a function application
    pub fn func(func: Function, arg: Expr) -> Self {
        Expr::new(ExprKind::FunctionCall {
            func,
            arg: Arc::new(arg),
        })
    }

    /// Create a function application from a shared argument
    pub(crate) fn func_arc(func: Function, arg: Arc<Expr>) -> Self {
        Expr::new(ExprKind::FunctionCall { func, arg })
    }

    /// Create a power expression
    pub fn pow(base: Expr, exponent: Expr) -> Self {
        Expr::new(ExprKind::Pow(Arc::new(base), Arc::new(exponent)))
    }

    /// Raise to a numeric exponent
    pub fn pow_of(self, exponent: f64) -> Self {
        Expr::pow(self, Expr::number(exponent))
    }

    /// Create `expr^-1`
    pub fn recip(expr: Expr) -> Self {
        Expr::pow(expr, Expr::number(-1.0))
    }

    /// Create an N-ary sum, flattening nested sums.
    /// An empty sum is `0`; a single term is returned unchanged.
    pub fn sum(terms: Vec<Expr>) -> Self {
        Expr::sum_from_arcs(terms.into_iter().map(Arc::new).collect())
    }

    pub(crate) fn sum_from_arcs(terms: Vec<Arc<Expr>>) -> Self {
        let mut flat: Vec<Arc<Expr>> = Vec::with_capacity(terms.len());
        for t in terms {
            if let ExprKind::Sum(inner) = &t.kind {
                flat.extend(inner.iter().cloned());
            } else {
                flat.push(t);
            }
        }
        match flat.len() {
            0 => Expr::number(0.0),
            1 => Expr::unwrap_arc(flat.remove(0)),
            _ => Expr::new(ExprKind::Sum(flat)),
        }
    }

    /// Create an N-ary product, flattening nested products.
    /// An empty product is `1`; a single factor is returned unchanged.
    pub fn product(factors: Vec<Expr>) -> Self {
        Expr::product_from_arcs(factors.into_iter().map(Arc::new).collect())
    }

    pub(crate) fn product_from_arcs(factors: Vec<Arc<Expr>>) -> Self {
        let mut flat: Vec<Arc<Expr>> = Vec::with_capacity(factors.len());
        for f in factors {
            if let ExprKind::Product(inner) = &f.kind {
                flat.extend(inner.iter().cloned());
            } else {
                flat.push(f);
            }
        }
        match flat.len() {
            0 => Expr::number(1.0),
            1 => Expr::unwrap_arc(flat.remove(0)),
            _ => Expr::new(ExprKind::Product(flat)),
        }
    }

    /// Create `-expr` as `Product([-1, expr])`
    pub fn negate(expr: Expr) -> Self {
        Expr::product(vec![Expr::number(-1.0), expr])
    }

    /// Create `left - right` as `Sum([left, -right])`
    pub fn sub_expr(left: Expr, right: Expr) -> Self {
        Expr::sum(vec![left, Expr::negate(right)])
    }

    /// Create `left / right` as `Product([left, right^-1])`
    pub fn div_expr(left: Expr, right: Expr) -> Self {
        Expr::product(vec![left, Expr::recip(right)])
    }

    // Function shorthands used by the calculus rules

    pub fn sin(self) -> Self {
        Expr::func(Function::Sin, self)
    }

    pub fn cos(self) -> Self {
        Expr::func(Function::Cos, self)
    }

    pub fn tan(self) -> Self {
        Expr::func(Function::Tan, self)
    }

    pub fn log(self) -> Self {
        Expr::func(Function::Log, self)
    }

    pub fn exp(self) -> Self {
        Expr::func(Function::Exp, self)
    }

    pub fn sqrt(self) -> Self {
        Expr::func(Function::Sqrt, self)
    }

    pub fn abs(self) -> Self {
        Expr::func(Function::Abs, self)
    }
}

// ===== Operator overloads =====

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::sum(vec![self, rhs])
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::sub_expr(self, rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::product(vec![self, rhs])
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::div_expr(self, rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self)
    }
}

impl Mul<Expr> for f64 {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::product(vec![Expr::number(self), rhs])
    }
}

impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Expr::number(n)
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::symbol(name)
    }
}
