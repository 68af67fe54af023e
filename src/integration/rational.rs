//! Rational functions `P(x)/Q(x)` with numeric coefficients
//!
//! After polynomial long division the proper part `R/Q` is integrated when
//! `Q` is linear or quadratic:
//! - linear `Q`: `r/q1 * log(|Q|)`
//! - `R` proportional to `Q'`: `k * log(|Q|)`
//! - two real roots: partial fractions into two logarithms
//! - a repeated root `r`: a logarithm plus `-k/(a*(x - r))`
//!
//! A quadratic without real roots needs `atan`, which is not in the function
//! set, and higher-degree denominators are not factored.

use std::sync::Arc;

use super::UnsolvedReason;
use crate::expr::{Expr, ExprKind};
use crate::functions::Function;
use crate::traits::{approx_eq, cancels, is_integer};

/// Highest degree expanded into coefficients
const MAX_DEGREE: f64 = 64.0;

/// Dense univariate polynomial, coefficients in ascending order
#[derive(Debug, Clone, PartialEq)]
struct Poly {
    coeffs: Vec<f64>,
}

impl Poly {
    fn constant(c: f64) -> Self {
        Poly { coeffs: vec![c] }
    }

    fn var() -> Self {
        Poly {
            coeffs: vec![0.0, 1.0],
        }
    }

    /// Convert an expression built from numbers, `var`, sums, products and
    /// non-negative integer powers
    fn try_from_expr(expr: &Expr, var: &str) -> Option<Self> {
        match &expr.kind {
            ExprKind::Number(n) => Some(Poly::constant(*n)),
            ExprKind::Symbol(s) if s == var => Some(Poly::var()),
            ExprKind::Sum(terms) => terms.iter().try_fold(Poly::constant(0.0), |acc, t| {
                Some(acc.add(&Poly::try_from_expr(t, var)?))
            }),
            ExprKind::Product(factors) => factors.iter().try_fold(Poly::constant(1.0), |acc, f| {
                Some(acc.mul(&Poly::try_from_expr(f, var)?))
            }),
            ExprKind::Pow(base, exp) => {
                let n = exp
                    .as_number()
                    .filter(|n| *n >= 0.0 && *n <= MAX_DEGREE && is_integer(*n))?;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n = n as u32;
                Some(Poly::try_from_expr(base, var)?.pow(n))
            }
            _ => None,
        }
    }

    /// Degree, with the zero polynomial at degree 0
    fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    fn coeff(&self, i: usize) -> f64 {
        self.coeffs.get(i).copied().unwrap_or(0.0)
    }

    fn leading(&self) -> f64 {
        self.coeffs.last().copied().unwrap_or(0.0)
    }

    fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| *c == 0.0)
    }

    fn is_finite(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_finite())
    }

    /// Drop zero leading coefficients
    fn trimmed(mut self) -> Self {
        while self.coeffs.len() > 1 && self.coeffs.last() == Some(&0.0) {
            self.coeffs.pop();
        }
        if self.coeffs.is_empty() {
            self.coeffs.push(0.0);
        }
        self
    }

    fn add(&self, other: &Poly) -> Poly {
        let len = self.coeffs.len().max(other.coeffs.len());
        let coeffs = (0..len).map(|i| self.coeff(i) + other.coeff(i)).collect();
        Poly { coeffs }.trimmed()
    }

    fn mul(&self, other: &Poly) -> Poly {
        let mut coeffs = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Poly { coeffs }.trimmed()
    }

    fn pow(&self, n: u32) -> Poly {
        (0..n).fold(Poly::constant(1.0), |acc, _| acc.mul(self))
    }

    /// Long division: `self = quotient * divisor + remainder`
    fn div_rem(&self, divisor: &Poly) -> Result<(Poly, Poly), UnsolvedReason> {
        let lead = divisor.leading();
        if divisor.is_zero() || lead == 0.0 {
            return Err(UnsolvedReason::DivisionByZero);
        }

        let d = divisor.degree();
        let mut remainder = self.coeffs.clone();
        if remainder.len() <= d {
            return Ok((Poly::constant(0.0), self.clone()));
        }

        // Largest magnitude subtracted into the remainder, to tell noise from value
        let mut scale = self.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        let mut quotient = vec![0.0; remainder.len() - d];
        for k in (0..quotient.len()).rev() {
            let q = remainder[k + d] / lead;
            quotient[k] = q;
            for (j, c) in divisor.coeffs.iter().enumerate() {
                scale = scale.max((q * c).abs());
                remainder[k + j] -= q * c;
            }
        }
        remainder.truncate(d.max(1));
        for r in &mut remainder {
            if cancels(*r, scale) {
                *r = 0.0;
            }
        }
        Ok((Poly { coeffs: quotient }.trimmed(), Poly { coeffs: remainder }.trimmed()))
    }

    /// Expression `c_n*x^n + ... + c_0`
    fn to_expr(&self, var: &str) -> Expr {
        let terms = self
            .coeffs
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, c)| **c != 0.0)
            .map(|(i, c)| monomial(*c, var, i as f64))
            .collect();
        Expr::sum(terms)
    }

    /// Antiderivative term by term
    fn integral_expr(&self, var: &str) -> Expr {
        let terms = self
            .coeffs
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, c)| **c != 0.0)
            .map(|(i, c)| {
                let n = i as f64 + 1.0;
                monomial(c / n, var, n)
            })
            .collect();
        Expr::sum(terms)
    }
}

fn monomial(c: f64, var: &str, power: f64) -> Expr {
    let x_n = match power {
        p if p == 0.0 => return Expr::number(c),
        p if p == 1.0 => Expr::symbol(var),
        p => Expr::symbol(var).pow_of(p),
    };
    Expr::product(vec![Expr::number(c), x_n])
}

/// `log(|u|)`
fn log_abs(u: Expr) -> Expr {
    Expr::func(Function::Log, Expr::func(Function::Abs, u))
}

/// `x - r`, with `r` dropped when it is noise next to roots of size `scale`
fn shifted(var: &str, r: f64, scale: f64) -> Expr {
    if cancels(r, scale) {
        Expr::symbol(var)
    } else {
        Expr::sum(vec![Expr::symbol(var), Expr::number(-r)])
    }
}

/// Split into polynomial numerator and denominator factors.
/// `None` when some factor is not a polynomial or a negative integer power of one.
fn split_quotient(expr: &Expr, var: &str) -> Option<(Poly, Poly)> {
    let factors: Vec<Arc<Expr>> = match &expr.kind {
        ExprKind::Product(factors) => factors.clone(),
        _ => vec![Arc::new(expr.clone())],
    };

    let mut numer = Poly::constant(1.0);
    let mut denom = Poly::constant(1.0);
    for factor in &factors {
        if let ExprKind::Pow(base, exp) = &factor.kind
            && let Some(n) = exp.as_number()
            && n < 0.0
        {
            if !is_integer(n) || -n > MAX_DEGREE {
                return None;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let k = (-n) as u32;
            denom = denom.mul(&Poly::try_from_expr(base, var)?.pow(k));
        } else {
            numer = numer.mul(&Poly::try_from_expr(factor, var)?);
        }
    }
    Some((numer, denom))
}

/// Integrate a rational function of `var`.
///
/// `Ok(None)` when `expr` is not a rational function or its proper part is
/// outside the supported denominators.
pub(super) fn integrate(expr: &Expr, var: &str) -> Result<Option<Expr>, UnsolvedReason> {
    let Some((numer, denom)) = split_quotient(expr, var) else {
        return Ok(None);
    };
    if !numer.is_finite() || !denom.is_finite() {
        return Err(UnsolvedReason::Undefined);
    }

    let (quotient, remainder) = numer.div_rem(&denom)?;
    let mut parts = vec![quotient.integral_expr(var)];

    if !remainder.is_zero() {
        match integrate_proper(&remainder, &denom, var)? {
            Some(part) => parts.push(part),
            None => return Ok(None),
        }
    }
    Ok(Some(Expr::sum(parts)))
}

/// `R/Q` with `deg R < deg Q`
fn integrate_proper(r: &Poly, q: &Poly, var: &str) -> Result<Option<Expr>, UnsolvedReason> {
    let result = match q.degree() {
        1 => {
            // r0 / (q1*x + q0)
            let k = r.coeff(0) / q.coeff(1);
            Some(Expr::product(vec![Expr::number(k), log_abs(q.to_expr(var))]))
        }
        2 => integrate_over_quadratic(r, q, var),
        _ => None,
    };

    match result {
        Some(e) if !has_non_finite_coefficient(&e) => Ok(Some(e)),
        Some(_) => Err(UnsolvedReason::Undefined),
        None => Ok(None),
    }
}

/// `(p*x + s) / (a*x^2 + b*x + c)`
fn integrate_over_quadratic(r: &Poly, q: &Poly, var: &str) -> Option<Expr> {
    let (p, s) = (r.coeff(1), r.coeff(0));
    let (a, b, c) = (q.coeff(2), q.coeff(1), q.coeff(0));

    // Numerator proportional to the derivative 2*a*x + b
    if p != 0.0 && approx_eq(s, p * b / (2.0 * a)) {
        let k = p / (2.0 * a);
        return Some(Expr::product(vec![Expr::number(k), log_abs(q.to_expr(var))]));
    }

    let disc = b * b - 4.0 * a * c;
    if cancels(disc, (b * b).max((4.0 * a * c).abs())) {
        // a*(x - r)^2: p/a * log|x - r| - (p*r + s)/(a*(x - r))
        let root = -b / (2.0 * a);
        let log_coeff = p / a;
        let pole_coeff = -(p * root + s) / a;
        let pole = Expr::product(vec![
            Expr::number(pole_coeff),
            Expr::recip(shifted(var, root, root.abs())),
        ]);
        if log_coeff == 0.0 {
            return Some(pole);
        }
        return Some(Expr::sum(vec![
            Expr::product(vec![
                Expr::number(log_coeff),
                log_abs(shifted(var, root, root.abs())),
            ]),
            pole,
        ]));
    }
    if disc < 0.0 {
        return None;
    }

    // a*(x - r1)*(x - r2), r1 > r2
    let sqrt_disc = disc.sqrt();
    let r1 = (-b + sqrt_disc) / (2.0 * a);
    let r2 = (-b - sqrt_disc) / (2.0 * a);
    let coeff1 = (p * r1 + s) / (a * (r1 - r2));
    let coeff2 = (p * r2 + s) / (a * (r2 - r1));

    let root_scale = r1.abs().max(r2.abs());
    let coeff_scale = coeff1.abs().max(coeff2.abs());
    let mut terms = Vec::with_capacity(2);
    for (k, root) in [(coeff1, r1), (coeff2, r2)] {
        if !cancels(k, coeff_scale) {
            terms.push(Expr::product(vec![
                Expr::number(k),
                log_abs(shifted(var, root, root_scale)),
            ]));
        }
    }
    Some(Expr::sum(terms))
}

fn has_non_finite_coefficient(e: &Expr) -> bool {
    match &e.kind {
        ExprKind::Number(n) => !n.is_finite(),
        ExprKind::Sum(children) | ExprKind::Product(children) => {
            children.iter().any(|c| has_non_finite_coefficient(c))
        }
        ExprKind::Pow(base, exp) => has_non_finite_coefficient(base) || has_non_finite_coefficient(exp),
        ExprKind::FunctionCall { arg, .. } => has_non_finite_coefficient(arg),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, simplify};

    fn rational(input: &str) -> Option<String> {
        let expr = simplify(parse(input).unwrap());
        integrate(&expr, "x")
            .unwrap()
            .map(|e| simplify(e).to_string())
    }

    #[test]
    fn test_long_division() {
        let n = Poly {
            coeffs: vec![-1.0, 0.0, 1.0],
        };
        let d = Poly {
            coeffs: vec![-1.0, 1.0],
        };
        let (q, r) = n.div_rem(&d).unwrap();
        assert_eq!(q.coeffs, vec![1.0, 1.0]);
        assert!(r.is_zero());
    }

    #[test]
    fn test_polynomial_product() {
        assert_eq!(rational("x*(x + 1)").as_deref(), Some("x^3/3 + x^2/2"));
    }

    #[test]
    fn test_linear_denominator_after_division() {
        assert_eq!(
            rational("(x + 1)/(x - 1)").as_deref(),
            Some("x + 2*log(|x - 1|)")
        );
    }

    #[test]
    fn test_distinct_roots() {
        assert_eq!(
            rational("1/(x**2 - 1)").as_deref(),
            Some("log(|x - 1|)/2 - log(|x + 1|)/2")
        );
    }

    #[test]
    fn test_derivative_over_function() {
        assert_eq!(rational("2*x/(x**2 + 1)").as_deref(), Some("log(|x^2 + 1|)"));
    }

    #[test]
    fn test_repeated_root() {
        assert_eq!(rational("1/(x**2 - 2*x + 1)").as_deref(), Some("-1/(x - 1)"));
    }

    #[test]
    fn test_unsupported_denominators() {
        // Needs atan
        assert_eq!(rational("1/(x**2 + 1)"), None);
        assert_eq!(rational("1/(x**3 + x + 1)"), None);
        assert_eq!(rational("sin(x)/x"), None);
    }

    #[test]
    fn test_small_coefficients_kept() {
        let p = Poly {
            coeffs: vec![1.0, 1e-11],
        }
        .trimmed();
        assert_eq!(p.degree(), 1);
        let text = rational("1/(0.00000000001*x + 1)").unwrap();
        assert!(text.ends_with("*log(|0.00000000001*x + 1|)"), "{text}");
    }

    #[test]
    fn test_zero_divisor() {
        let zero = Poly::constant(0.0);
        assert_eq!(
            Poly::var().div_rem(&zero),
            Err(UnsolvedReason::DivisionByZero)
        );
    }
}
