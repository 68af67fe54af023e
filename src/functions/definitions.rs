//! Function definitions for the function registry
//!
//! Contains evaluation, differentiation and antiderivative rules for the
//! built-in functions. Every formula is expressed with functions from the same
//! fixed set, so `tan' = sec^2` is written `cos(u)^-2` and `sign(u)` is
//! written `u/|u|`.

use std::sync::Arc;

use super::registry::FunctionDefinition;
use super::{Function, apply, mul_opt, neg};
use crate::Expr;

/// Return all function definitions for populating the registry
pub(crate) fn all_definitions() -> Vec<FunctionDefinition> {
    vec![
        // Trigonometric
        FunctionDefinition {
            name: "sin",
            func: Function::Sin,
            eval: |x| Some(x.sin()),
            derivative: |u, u_prime| {
                // d/dx sin(u) = cos(u) * u'
                mul_opt(apply(Function::Cos, u), u_prime)
            },
            antiderivative: Some(|u: &Arc<Expr>| neg(apply(Function::Cos, u))),
        },
        FunctionDefinition {
            name: "cos",
            func: Function::Cos,
            eval: |x| Some(x.cos()),
            derivative: |u, u_prime| {
                // d/dx cos(u) = -sin(u) * u'
                mul_opt(neg(apply(Function::Sin, u)), u_prime)
            },
            antiderivative: Some(|u: &Arc<Expr>| apply(Function::Sin, u)),
        },
        FunctionDefinition {
            name: "tan",
            func: Function::Tan,
            eval: |x| {
                let v = x.tan();
                // tan is undefined where cos vanishes
                (x.cos().abs() > 1e-15).then_some(v)
            },
            derivative: |u, u_prime| {
                // d/dx tan(u) = sec^2(u) * u' = cos(u)^-2 * u'
                mul_opt(apply(Function::Cos, u).pow_of(-2.0), u_prime)
            },
            // -log(|cos(u)|)
            antiderivative: Some(|u: &Arc<Expr>| neg(apply(Function::Cos, u).abs().log())),
        },
        // Exponential and logarithm
        FunctionDefinition {
            name: "log",
            func: Function::Log,
            eval: |x| (x > 0.0).then(|| x.ln()),
            derivative: |u, u_prime| {
                // d/dx log(u) = u' / u
                mul_opt(Expr::recip((**u).clone()), u_prime)
            },
            // u*log(u) - u
            antiderivative: Some(|u: &Arc<Expr>| {
                Expr::sum(vec![
                    Expr::product(vec![(**u).clone(), apply(Function::Log, u)]),
                    neg((**u).clone()),
                ])
            }),
        },
        FunctionDefinition {
            name: "exp",
            func: Function::Exp,
            eval: |x| Some(x.exp()),
            derivative: |u, u_prime| {
                // d/dx exp(u) = exp(u) * u'
                mul_opt(apply(Function::Exp, u), u_prime)
            },
            antiderivative: Some(|u: &Arc<Expr>| apply(Function::Exp, u)),
        },
        // Roots and magnitude
        FunctionDefinition {
            name: "sqrt",
            func: Function::Sqrt,
            eval: |x| (x >= 0.0).then(|| x.sqrt()),
            derivative: |u, u_prime| {
                // d/dx sqrt(u) = u' / (2*sqrt(u))
                mul_opt(
                    Expr::product(vec![
                        Expr::number(0.5),
                        Expr::recip(apply(Function::Sqrt, u)),
                    ]),
                    u_prime,
                )
            },
            // (2/3) * u * sqrt(u)
            antiderivative: Some(|u: &Arc<Expr>| {
                Expr::product(vec![
                    Expr::number(2.0 / 3.0),
                    (**u).clone(),
                    apply(Function::Sqrt, u),
                ])
            }),
        },
        FunctionDefinition {
            name: "abs",
            func: Function::Abs,
            eval: |x| Some(x.abs()),
            derivative: |u, u_prime| {
                // d/dx |u| = sign(u) * u' = u/|u| * u'
                mul_opt(
                    Expr::product(vec![(**u).clone(), Expr::recip(apply(Function::Abs, u))]),
                    u_prime,
                )
            },
            // u*|u|/2
            antiderivative: Some(|u: &Arc<Expr>| {
                Expr::product(vec![
                    Expr::number(0.5),
                    (**u).clone(),
                    apply(Function::Abs, u),
                ])
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str) -> FunctionDefinition {
        all_definitions()
            .into_iter()
            .find(|d| d.name == name)
            .unwrap()
    }

    #[test]
    fn test_sin_derivative_shape() {
        let x = Arc::new(Expr::symbol("x"));
        let d = (def("sin").derivative)(&x, Expr::number(1.0));
        assert_eq!(d, Expr::symbol("x").cos());
    }

    #[test]
    fn test_log_eval_domain() {
        let log = def("log");
        assert_eq!((log.eval)(-1.0), None);
        assert_eq!((log.eval)(1.0), Some(0.0));
    }

    #[test]
    fn test_every_definition_has_antiderivative() {
        for d in all_definitions() {
            assert!(d.antiderivative.is_some(), "{} has no antiderivative", d.name);
        }
    }
}
