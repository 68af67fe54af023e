// Differentiation engine - applies calculus rules
//
// The rule functions keep the obvious zero/one shortcuts inline so that
// derivatives of long products do not build large intermediate trees before
// the simplifier runs.

use std::sync::Arc;

use log::debug;

use crate::expr::{Constant, Expr, ExprKind};
use crate::functions::{Registry, mul_opt};
use crate::simplify;

impl Expr {
    /// Differentiate with respect to `var` without simplifying
    pub(crate) fn derive(&self, var: &str) -> Expr {
        match &self.kind {
            // Base cases
            ExprKind::Number(_) | ExprKind::Constant(_) => Expr::number(0.0),

            ExprKind::Symbol(name) => {
                if name == var {
                    Expr::number(1.0)
                } else {
                    Expr::number(0.0)
                }
            }

            // Sum rule: (u + v + ...)' = u' + v' + ...
            ExprKind::Sum(terms) => {
                let primes: Vec<Expr> = terms
                    .iter()
                    .map(|t| t.derive(var))
                    .filter(|p| !p.is_zero_num())
                    .collect();
                Expr::sum(primes)
            }

            // Product rule: (f1*f2*...*fn)' = sum over i of f1*...*fi'*...*fn
            ExprKind::Product(factors) => {
                let mut terms = Vec::with_capacity(factors.len());
                for (i, factor) in factors.iter().enumerate() {
                    let prime = factor.derive(var);
                    if prime.is_zero_num() {
                        continue;
                    }
                    let mut parts: Vec<Arc<Expr>> = Vec::with_capacity(factors.len());
                    for (j, other) in factors.iter().enumerate() {
                        if i == j {
                            if !prime.is_one_num() {
                                parts.push(Arc::new(prime.clone()));
                            }
                        } else {
                            parts.push(Arc::clone(other));
                        }
                    }
                    terms.push(Expr::product_from_arcs(parts));
                }
                Expr::sum(terms)
            }

            ExprKind::Pow(u, v) => derive_power(u, v, var),

            // Chain rule through the registered derivative: f'(u) * u'
            ExprKind::FunctionCall { func, arg } => {
                let arg_prime = arg.derive(var);
                if arg_prime.is_zero_num() {
                    return Expr::number(0.0);
                }
                match Registry::of(*func) {
                    Some(def) => (def.derivative)(arg, arg_prime),
                    None => Expr::number(0.0),
                }
            }
        }
    }
}

/// Power rule with logarithmic differentiation for variable exponents
fn derive_power(u: &Arc<Expr>, v: &Arc<Expr>, var: &str) -> Expr {
    let u_depends = u.contains_var(var);
    let v_depends = v.contains_var(var);

    match (u_depends, v_depends) {
        (false, false) => Expr::number(0.0),

        // (u^n)' = n * u^(n-1) * u'
        (true, false) => {
            let u_prime = u.derive(var);
            let n_minus_1 = match v.as_number() {
                Some(n) => Expr::number(n - 1.0),
                None => Expr::sum(vec![(**v).clone(), Expr::number(-1.0)]),
            };
            let lowered = Expr::pow((**u).clone(), n_minus_1);
            mul_opt(Expr::product(vec![(**v).clone(), lowered]), u_prime)
        }

        // (c^v)' = c^v * log(c) * v'
        (false, true) => {
            let v_prime = v.derive(var);
            let power = Expr::pow((**u).clone(), (**v).clone());
            let log_c = log_of_base(u);
            mul_opt(mul_opt(power, log_c), v_prime)
        }

        // (u^v)' = u^v * (v' * log(u) + v * u'/u)
        (true, true) => {
            let u_prime = u.derive(var);
            let v_prime = v.derive(var);
            let term1 = mul_opt(v_prime, log_of_base(u));
            let term2 = mul_opt(
                (**v).clone(),
                mul_opt(u_prime, Expr::recip((**u).clone())),
            );
            let power = Expr::pow((**u).clone(), (**v).clone());
            mul_opt(power, Expr::sum(vec![term1, term2]))
        }
    }
}

fn log_of_base(base: &Arc<Expr>) -> Expr {
    match base.kind {
        ExprKind::Constant(Constant::E) => Expr::number(1.0),
        _ => Expr::func_arc(crate::Function::Log, Arc::clone(base)),
    }
}

/// Differentiate `expr` with respect to `var` and simplify the result
///
/// # Example
/// ```
/// use funcalc::{differentiate, parse};
///
/// let expr = parse("x**3").unwrap();
/// assert_eq!(differentiate(&expr, "x").to_string(), "3*x^2");
/// ```
pub fn differentiate(expr: &Expr, var: &str) -> Expr {
    let raw = expr.derive(var);
    debug!("raw derivative of {} has {} nodes", expr, raw.node_count());
    simplify(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn d(input: &str) -> String {
        let expr = parse(input).unwrap();
        differentiate(&expr, "x").to_string()
    }

    #[test]
    fn test_polynomial() {
        assert_eq!(d("x**2 + 2*x + 1"), "2*x + 2");
        assert_eq!(d("5"), "0");
        assert_eq!(d("y"), "0");
        assert_eq!(d("pi*x"), "pi");
    }

    #[test]
    fn test_product_rule() {
        assert_eq!(d("sin(x)*cos(x)"), "cos(x)^2 - sin(x)^2");
        assert_eq!(d("x*exp(x)"), "x*exp(x) + exp(x)");
    }

    #[test]
    fn test_quotient_as_product() {
        assert_eq!(d("1/x"), "-1/x^2");
    }

    #[test]
    fn test_chain_rule() {
        assert_eq!(d("sin(x**2)"), "2*x*cos(x^2)");
        assert_eq!(d("log(x)"), "1/x");
        assert_eq!(d("exp(3*x)"), "3*exp(3*x)");
        assert_eq!(d("sqrt(x)"), "1/(2*sqrt(x))");
        assert_eq!(d("tan(x)"), "1/cos(x)^2");
    }

    #[test]
    fn test_exponential_bases() {
        assert_eq!(d("e**x"), "e^x");
        assert_eq!(d("2**x"), "2^x*log(2)");
    }

    #[test]
    fn test_variable_base_and_exponent() {
        // (x^x)' = x^x * (log(x) + 1)
        let expr = parse("x**x").unwrap();
        let result = differentiate(&expr, "x");
        let at = |v: f64| crate::evaluator::evaluate_at(&result, "x", v);
        // d/dx x^x at x = 2 is 4*(log 2 + 1)
        let expected = 4.0 * (2.0f64.ln() + 1.0);
        match at(2.0) {
            Ok(value) => assert!((value.as_number().unwrap() - expected).abs() < 1e-9),
            Err(e) => panic!("evaluation failed: {e}"),
        }
    }

    #[test]
    fn test_other_variable() {
        let expr = parse("x*y + y**2").unwrap();
        assert_eq!(differentiate(&expr, "y").to_string(), "x + 2*y");
    }
}
