//! Numeric evaluation by substitution
//!
//! Every occurrence of the variable is replaced by the given value and the
//! tree is reduced bottom-up. Subtrees that become pure numbers are folded to
//! a single `Number`; anything that still mentions other variables is handed
//! to the simplifier and returned as a residual expression.
//!
//! # Example
//! ```
//! use funcalc::{evaluate_at, parse};
//!
//! let expr = parse("x**2 + 2*x + 1").unwrap();
//! let value = evaluate_at(&expr, "x", 3.0).unwrap();
//! assert_eq!(value.as_number(), Some(16.0));
//! ```

use log::debug;

use crate::error::CalcError;
use crate::{Expr, ExprKind, simplify};

struct Reducer<'a> {
    var: &'a str,
    value: f64,
    /// Replace `pi` and `e` by their values (only when nothing else stays symbolic)
    numeric_constants: bool,
}

impl Reducer<'_> {
    fn reduce(&self, expr: &Expr) -> Result<Expr, CalcError> {
        match &expr.kind {
            ExprKind::Number(_) => Ok(expr.clone()),
            ExprKind::Symbol(name) if name == self.var => Ok(Expr::number(self.value)),
            ExprKind::Symbol(_) => Ok(expr.clone()),
            ExprKind::Constant(c) if self.numeric_constants => Ok(Expr::number(c.value())),
            ExprKind::Constant(_) => Ok(expr.clone()),

            ExprKind::Sum(terms) => {
                let reduced = terms
                    .iter()
                    .map(|t| self.reduce(t))
                    .collect::<Result<Vec<_>, _>>()?;
                match numbers(&reduced) {
                    Some(values) => Ok(Expr::number(values.iter().sum())),
                    None => Ok(Expr::sum(reduced)),
                }
            }

            ExprKind::Product(factors) => {
                let reduced = factors
                    .iter()
                    .map(|f| self.reduce(f))
                    .collect::<Result<Vec<_>, _>>()?;
                match numbers(&reduced) {
                    Some(values) => Ok(Expr::number(values.iter().product())),
                    None => Ok(Expr::product(reduced)),
                }
            }

            ExprKind::Pow(base, exp) => {
                let b = self.reduce(base)?;
                let e = self.reduce(exp)?;
                let negative_exponent = e.as_number().is_some_and(|ev| ev < 0.0);
                match (b.as_number(), e.as_number()) {
                    (Some(bv), Some(ev)) => {
                        if bv == 0.0 && ev < 0.0 {
                            // Name the denominator as the user wrote it
                            return Err(CalcError::division_by_zero(base));
                        }
                        let v = bv.powf(ev);
                        if v.is_finite() {
                            return Ok(Expr::number(v));
                        }
                    }
                    // A residual denominator such as `y - y` can still vanish
                    (None, _) if negative_exponent && simplify(b.clone()).is_zero_num() => {
                        return Err(CalcError::division_by_zero(base));
                    }
                    _ => {}
                }
                Ok(Expr::pow(b, e))
            }

            ExprKind::FunctionCall { func, arg } => {
                let a = self.reduce(arg)?;
                // Outside the real domain the call stays symbolic
                if let Some(v) = a.as_number().and_then(|n| func.eval(n))
                    && v.is_finite()
                {
                    return Ok(Expr::number(v));
                }
                Ok(Expr::func(*func, a))
            }
        }
    }
}

fn numbers(exprs: &[Expr]) -> Option<Vec<f64>> {
    exprs.iter().map(Expr::as_number).collect()
}

/// Replace every occurrence of `var` by `value` without reducing
pub fn substitute(expr: &Expr, var: &str, value: f64) -> Expr {
    match &expr.kind {
        ExprKind::Symbol(name) if name == var => Expr::number(value),
        ExprKind::Number(_) | ExprKind::Symbol(_) | ExprKind::Constant(_) => expr.clone(),
        ExprKind::Sum(terms) => Expr::sum(terms.iter().map(|t| substitute(t, var, value)).collect()),
        ExprKind::Product(factors) => {
            Expr::product(factors.iter().map(|f| substitute(f, var, value)).collect())
        }
        ExprKind::Pow(base, exp) => {
            Expr::pow(substitute(base, var, value), substitute(exp, var, value))
        }
        ExprKind::FunctionCall { func, arg } => Expr::func(*func, substitute(arg, var, value)),
    }
}

/// Substitute `value` for `var` and reduce.
///
/// Returns a `Number` when the expression only depends on `var`; otherwise
/// the simplified residual expression.
///
/// # Errors
/// `DivisionByZero` when a denominator evaluates to zero, naming the
/// denominator as written in `expr`.
pub fn evaluate_at(expr: &Expr, var: &str, value: f64) -> Result<Expr, CalcError> {
    let numeric_constants = expr.free_symbols().iter().all(|s| s == var);
    let reducer = Reducer {
        var,
        value,
        numeric_constants,
    };
    let reduced = reducer.reduce(expr)?;
    debug!("evaluated {} at {} = {}: {}", expr, var, value, reduced);

    if reduced.as_number().is_some() {
        return Ok(reduced);
    }
    let residual = simplify(reduced);
    if residual.has_zero_denominator() {
        return Err(CalcError::division_by_zero(expr));
    }
    Ok(residual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn eval(input: &str, value: f64) -> Result<Expr, CalcError> {
        evaluate_at(&parse(input).unwrap(), "x", value)
    }

    #[test]
    fn test_polynomial_value() {
        assert_eq!(eval("x**2 + 2*x + 1", 3.0).unwrap(), Expr::number(16.0));
        assert_eq!(eval("1/x", 4.0).unwrap(), Expr::number(0.25));
    }

    #[test]
    fn test_constants_reduce() {
        let v = eval("pi*x", 2.0).unwrap().as_number().unwrap();
        assert!((v - 2.0 * std::f64::consts::PI).abs() < 1e-12);
        let v = eval("e**x", 1.0).unwrap().as_number().unwrap();
        assert!((v - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_division_by_zero() {
        match eval("1/(x**2 - 1)", 1.0) {
            Err(CalcError::DivisionByZero { fragment }) => assert_eq!(fragment, "x^2 - 1"),
            other => panic!("expected division by zero, got {:?}", other),
        }
        assert!(matches!(eval("1/x", 0.0), Err(CalcError::DivisionByZero { .. })));
    }

    #[test]
    fn test_small_denominators() {
        let v = eval("1/x**2", 1e-6).unwrap().as_number().unwrap();
        assert!((v - 1e12).abs() <= 1e-6 * 1e12, "{v}");
        let v = eval("1/x", 1e-11).unwrap().as_number().unwrap();
        assert!((v - 1e11).abs() <= 1e-6 * 1e11, "{v}");
        assert_eq!(eval("x", 1e-11).unwrap(), Expr::number(1e-11));
    }

    #[test]
    fn test_symbolic_zero_denominator() {
        match eval("y/(y - y)", 1.0) {
            Err(CalcError::DivisionByZero { fragment }) => assert_eq!(fragment, "y - y"),
            other => panic!("expected division by zero, got {:?}", other),
        }
        match eval("x*y/(y*x - x*y)", 2.0) {
            Err(CalcError::DivisionByZero { .. }) => {}
            other => panic!("expected division by zero, got {:?}", other),
        }
        assert_eq!(eval("y/(y + 1)", 1.0).unwrap().to_string(), "y/(y + 1)");
    }

    #[test]
    fn test_residual_expression() {
        let out = eval("x*y + x", 2.0).unwrap();
        assert_eq!(out.to_string(), "2*y + 2");
        // Constants stay symbolic next to other variables
        let out = eval("pi*y", 2.0).unwrap();
        assert_eq!(out.to_string(), "pi*y");
    }

    #[test]
    fn test_outside_domain_stays_symbolic() {
        let out = eval("log(x)", 0.0).unwrap();
        assert_eq!(out, Expr::number(0.0).log());
        let out = eval("sqrt(x)", -4.0).unwrap();
        assert_eq!(out, Expr::number(-4.0).sqrt());
    }

    #[test]
    fn test_substitute_keeps_shape() {
        let expr = parse("x + sin(x)").unwrap();
        let s = substitute(&expr, "x", 0.0);
        assert_eq!(s, Expr::number(0.0) + Expr::number(0.0).sin());
    }
}
