//! Indefinite integration over a fixed rule table
//!
//! The integrand is simplified first and then matched, in order, against:
//! 1. a bare constant `c` → `c*x`
//! 2. a sum → term by term (one unsolved term leaves the whole integral unsolved)
//! 3. constant factors of a product → pulled out of the integral
//! 4. the table: powers of a linear argument, constants raised to a linear
//!    exponent, and built-in functions of a linear argument
//! 5. rational functions `P(x)/Q(x)` (see [`rational`])
//!
//! Anything else is reported as [`Integral::Unsolved`] with its cause. The
//! search never recurses into anything larger than its input, so it always
//! terminates.
//!
//! # Example
//! ```
//! use funcalc::{integrate, parse, Integral};
//!
//! let expr = parse("1/x").unwrap();
//! match integrate(&expr, "x") {
//!     Integral::Closed(result) => assert_eq!(result.to_string(), "log(|x|)"),
//!     Integral::Unsolved(reason) => panic!("unsolved: {reason}"),
//! }
//! ```

mod rational;

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::expr::{Constant, Expr, ExprKind};
use crate::functions::{Function, Registry};
use crate::{differentiate, simplify};

/// Why an integral has no closed form in the supported function set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsolvedReason {
    /// No rule in the table matches the integrand
    NoMethod,
    /// The integrand or a needed coefficient is undefined (non-finite
    /// number, logarithm of a non-positive or unit base)
    Undefined,
    /// A zero denominator was met while integrating
    DivisionByZero,
}

impl UnsolvedReason {
    /// Short human-readable cause
    pub fn describe(self) -> &'static str {
        match self {
            UnsolvedReason::NoMethod => "no implemented integration method applies",
            UnsolvedReason::Undefined => "the integral does not converge or is undefined",
            UnsolvedReason::DivisionByZero => "a division by zero was encountered while integrating",
        }
    }
}

impl fmt::Display for UnsolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Outcome of an integration: a closed-form antiderivative or the reason there is none.
///
/// `Unsolved` is a successful outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Integral {
    /// Antiderivative without the constant of integration
    Closed(Expr),
    Unsolved(UnsolvedReason),
}

impl Integral {
    pub fn is_closed(&self) -> bool {
        matches!(self, Integral::Closed(_))
    }

    /// The antiderivative, if one was found
    pub fn expr(&self) -> Option<&Expr> {
        match self {
            Integral::Closed(e) => Some(e),
            Integral::Unsolved(_) => None,
        }
    }
}

/// Integrate `expr` with respect to `var`
pub fn integrate(expr: &Expr, var: &str) -> Integral {
    let integrand = simplify(expr.clone());

    if integrand.has_zero_denominator() {
        debug!("integrand {} divides by zero", integrand);
        return Integral::Unsolved(UnsolvedReason::DivisionByZero);
    }
    if has_non_finite(&integrand) {
        return Integral::Unsolved(UnsolvedReason::Undefined);
    }

    match integrate_term(&integrand, var) {
        Ok(result) => Integral::Closed(simplify(result)),
        Err(reason) => {
            debug!("integral of {} unsolved: {}", integrand, reason);
            Integral::Unsolved(reason)
        }
    }
}

fn integrate_term(e: &Expr, var: &str) -> Result<Expr, UnsolvedReason> {
    // Constants, including zero
    if e.is_free_of(var) {
        return Ok(Expr::product(vec![e.clone(), Expr::symbol(var)]));
    }

    match &e.kind {
        // Linearity
        ExprKind::Sum(terms) => {
            let parts = terms
                .iter()
                .map(|t| integrate_term(t, var))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::sum(parts))
        }
        ExprKind::Product(factors) => integrate_product(e, factors, var),
        _ => match table_lookup(e, var)? {
            Some(result) => Ok(result),
            None => rational::integrate(e, var)?.ok_or(UnsolvedReason::NoMethod),
        },
    }
}

/// Pull constant factors out, then integrate what is left
fn integrate_product(
    e: &Expr,
    factors: &[Arc<Expr>],
    var: &str,
) -> Result<Expr, UnsolvedReason> {
    let (constant, dependent): (Vec<Arc<Expr>>, Vec<Arc<Expr>>) =
        factors.iter().cloned().partition(|f| f.is_free_of(var));

    if !constant.is_empty() {
        let rest = Expr::product_from_arcs(dependent);
        let inner = integrate_term(&rest, var)?;
        let mut scaled = constant;
        scaled.push(Arc::new(inner));
        return Ok(Expr::product_from_arcs(scaled));
    }

    rational::integrate(e, var)?.ok_or(UnsolvedReason::NoMethod)
}

/// Slope `a` of a linear argument `a*x + b`, if the argument is linear in `var`
fn linear_slope(u: &Expr, var: &str) -> Option<Expr> {
    let slope = differentiate(u, var);
    (slope.is_free_of(var) && !slope.is_zero_num()).then_some(slope)
}

/// `expr / slope`, skipping a unit slope
fn over(expr: Expr, slope: Expr) -> Expr {
    if slope.is_one_num() {
        expr
    } else {
        Expr::product(vec![expr, Expr::recip(slope)])
    }
}

/// Direct antiderivatives of a single non-sum, non-product term
fn table_lookup(e: &Expr, var: &str) -> Result<Option<Expr>, UnsolvedReason> {
    match &e.kind {
        // x -> x^2/2
        ExprKind::Symbol(_) => Ok(Some(Expr::product(vec![
            Expr::number(0.5),
            Expr::symbol(var).pow_of(2.0),
        ]))),

        // (a*x + b)^n -> (a*x + b)^(n+1) / (a*(n+1)); n = -1 -> log(|a*x + b|)/a
        ExprKind::Pow(base, exp) if exp.is_free_of(var) => {
            let Some(slope) = linear_slope(base, var) else {
                return Ok(None);
            };
            if exp.is_neg_one_num() {
                let log_abs = Expr::func(Function::Log, Expr::func_arc(Function::Abs, Arc::clone(base)));
                return Ok(Some(over(log_abs, slope)));
            }
            let raised = match exp.as_number() {
                Some(n) => Expr::number(n + 1.0),
                None => Expr::sum(vec![(**exp).clone(), Expr::number(1.0)]),
            };
            let power = Expr::new(ExprKind::Pow(Arc::clone(base), Arc::new(raised.clone())));
            Ok(Some(over(power, Expr::product(vec![slope, raised]))))
        }

        // c^(a*x + b) -> c^(a*x + b) / (a*log(c))
        ExprKind::Pow(base, exp) if base.is_free_of(var) => {
            let Some(slope) = linear_slope(exp, var) else {
                return Ok(None);
            };
            let log_c = match (&base.kind, base.as_number()) {
                (ExprKind::Constant(Constant::E), _) => Expr::number(1.0),
                (_, Some(c)) if c <= 0.0 || c == 1.0 => return Err(UnsolvedReason::Undefined),
                _ => Expr::func_arc(Function::Log, Arc::clone(base)),
            };
            Ok(Some(over(e.clone(), Expr::product(vec![slope, log_c]))))
        }

        // f(a*x + b) -> F(a*x + b) / a
        ExprKind::FunctionCall { func, arg } => {
            let Some(antiderivative) = Registry::of(*func).and_then(|def| def.antiderivative) else {
                return Ok(None);
            };
            match linear_slope(arg, var) {
                Some(slope) => Ok(Some(over(antiderivative(arg), slope))),
                None => Ok(None),
            }
        }

        _ => Ok(None),
    }
}

fn has_non_finite(e: &Expr) -> bool {
    match &e.kind {
        ExprKind::Number(n) => !n.is_finite(),
        ExprKind::Pow(base, exp) => has_non_finite(base) || has_non_finite(exp),
        ExprKind::Sum(children) | ExprKind::Product(children) => {
            children.iter().any(|c| has_non_finite(c))
        }
        ExprKind::FunctionCall { arg, .. } => has_non_finite(arg),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn int(input: &str) -> Integral {
        integrate(&parse(input).unwrap(), "x")
    }

    fn closed(input: &str) -> String {
        match int(input) {
            Integral::Closed(e) => e.to_string(),
            Integral::Unsolved(reason) => panic!("{input} unsolved: {reason}"),
        }
    }

    #[test]
    fn test_constants() {
        assert_eq!(closed("5"), "5*x");
        assert_eq!(closed("0"), "0");
        assert_eq!(closed("y"), "x*y");
    }

    #[test]
    fn test_monomials() {
        assert_eq!(closed("x"), "x^2/2");
        assert_eq!(closed("x**2"), "x^3/3");
        assert_eq!(closed("1/x"), "log(|x|)");
        assert_eq!(closed("3*x**2 + 2*x + 1"), "x^3 + x^2 + x");
    }

    #[test]
    fn test_linear_arguments() {
        assert_eq!(closed("exp(x)"), "exp(x)");
        assert_eq!(closed("cos(x)"), "sin(x)");
        assert_eq!(closed("sin(x)"), "-cos(x)");
        assert_eq!(closed("exp(2*x)"), "exp(2*x)/2");
        assert_eq!(closed("1/(2*x + 1)"), "log(|2*x + 1|)/2");
    }

    #[test]
    fn test_exponential_base() {
        assert_eq!(closed("e**x"), "e^x");
        assert_eq!(closed("2**x"), "2^x/log(2)");
        assert_eq!(int("0**x"), Integral::Unsolved(UnsolvedReason::Undefined));
    }

    #[test]
    fn test_unsolved_causes() {
        assert_eq!(int("sin(x**2)"), Integral::Unsolved(UnsolvedReason::NoMethod));
        assert_eq!(int("x*exp(x)"), Integral::Unsolved(UnsolvedReason::NoMethod));
        assert_eq!(int("x/0"), Integral::Unsolved(UnsolvedReason::DivisionByZero));
        // One unsolved term leaves the whole sum unsolved
        assert_eq!(int("x + exp(x**2)"), Integral::Unsolved(UnsolvedReason::NoMethod));
    }

    #[test]
    fn test_derivative_recovers_integrand() {
        for input in ["x**3", "sin(2*x)", "1/x", "exp(x) + x", "sqrt(x)", "(x + 1)/(x - 1)"] {
            let expr = parse(input).unwrap();
            let Integral::Closed(anti) = integrate(&expr, "x") else {
                panic!("{input} should integrate");
            };
            let back = differentiate(&anti, "x");
            for v in [0.5, 1.5, 2.5] {
                let lhs = crate::evaluate_at(&back, "x", v).unwrap().as_number().unwrap();
                let rhs = crate::evaluate_at(&expr, "x", v).unwrap().as_number().unwrap();
                assert!((lhs - rhs).abs() < 1e-9, "{input} at {v}: {lhs} vs {rhs}");
            }
        }
    }
}
