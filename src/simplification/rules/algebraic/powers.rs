use std::sync::Arc;

use crate::functions::Function;
use crate::simplification::rules::{NodeKind, RuleContext};
use crate::traits::is_integer;
use crate::{Expr, ExprKind};

fn is_even_integer(n: f64) -> bool {
    is_integer(n) && n % 2.0 == 0.0
}

rule!(
    PowerZeroRule,
    "power_zero",
    90,
    Algebraic,
    &[NodeKind::Pow],
    |expr: &Expr, _context: &RuleContext| {
        if let ExprKind::Pow(_u, v) = &expr.kind
            && matches!(v.kind, ExprKind::Number(n) if n == 0.0)
        {
            return Some(Expr::number(1.0));
        }
        None
    }
);

rule!(
    PowerOneRule,
    "power_one",
    90,
    Algebraic,
    &[NodeKind::Pow],
    |expr: &Expr, _context: &RuleContext| {
        if let ExprKind::Pow(u, v) = &expr.kind
            && matches!(v.kind, ExprKind::Number(n) if n == 1.0)
        {
            return Some((**u).clone());
        }
        None
    }
);

rule!(
    OneBaseRule,
    "one_base",
    90,
    Algebraic,
    &[NodeKind::Pow],
    |expr: &Expr, _context: &RuleContext| {
        // 1^x = 1
        if let ExprKind::Pow(u, _v) = &expr.kind
            && matches!(u.kind, ExprKind::Number(n) if n == 1.0)
        {
            return Some(Expr::number(1.0));
        }
        None
    }
);

rule!(
    PowerPowerRule,
    "power_power",
    75,
    Algebraic,
    &[NodeKind::Pow],
    |expr: &Expr, _context: &RuleContext| {
        if let ExprKind::Pow(u, v) = &expr.kind
            && let ExprKind::Pow(base, exp_inner) = &u.kind
        {
            // (x^2)^(1/2) is |x|, not x: keep even inner powers under fractional outer ones
            let outer_integer = v.as_number().is_some_and(is_integer);
            let inner_even = exp_inner.as_number().is_some_and(is_even_integer);
            if inner_even && !outer_integer {
                return None;
            }

            let new_exp = Expr::product(vec![(**exp_inner).clone(), (**v).clone()]);
            return Some(Expr::pow((**base).clone(), new_exp));
        }
        None
    }
);

rule!(
    PowerOfProductRule,
    "power_of_product",
    70,
    Algebraic,
    &[NodeKind::Pow],
    |expr: &Expr, _context: &RuleContext| {
        // (a*b)^n -> a^n * b^n for integer n
        if let ExprKind::Pow(u, v) = &expr.kind
            && let ExprKind::Product(factors) = &u.kind
            && v.as_number().is_some_and(is_integer)
        {
            let powered: Vec<Expr> = factors
                .iter()
                .map(|f| Expr::pow((**f).clone(), (**v).clone()))
                .collect();
            return Some(Expr::product(powered));
        }
        None
    }
);

rule!(
    EvenPowerOfRootRule,
    "even_power_of_root",
    70,
    Algebraic,
    &[NodeKind::Pow],
    |expr: &Expr, _context: &RuleContext| {
        // sqrt(u)^(2k) -> u^k, |u|^(2k) -> u^(2k)
        if let ExprKind::Pow(u, v) = &expr.kind
            && let ExprKind::FunctionCall { func, arg } = &u.kind
            && let Some(n) = v.as_number()
            && is_even_integer(n)
        {
            return match func {
                Function::Sqrt => Some(Expr::pow((**arg).clone(), Expr::number(n / 2.0))),
                Function::Abs => Some(Expr::pow((**arg).clone(), Expr::number(n))),
                _ => None,
            };
        }
        None
    }
);

rule!(
    AbsIdempotentRule,
    "abs_idempotent",
    85,
    Algebraic,
    &[NodeKind::Function],
    |expr: &Expr, _context: &RuleContext| {
        // abs(abs(u)) = abs(u), abs(-u) = abs(u)
        if let ExprKind::FunctionCall {
            func: Function::Abs,
            arg,
        } = &expr.kind
        {
            match &arg.kind {
                ExprKind::FunctionCall {
                    func: Function::Abs,
                    ..
                } => return Some((**arg).clone()),
                ExprKind::Product(factors) => {
                    if let Some(first) = factors.first()
                        && first.is_neg_one_num()
                    {
                        let rest = Expr::product_from_arcs(factors[1..].to_vec());
                        return Some(Expr::func_arc(Function::Abs, Arc::new(rest)));
                    }
                }
                _ => {}
            }
        }
        None
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplification::rules::Rule;

    fn ctx() -> RuleContext {
        RuleContext::default()
    }

    #[test]
    fn test_power_power() {
        let x = Expr::symbol("x");
        let e = Expr::pow(x.clone().pow_of(2.0), Expr::number(3.0));
        let out = PowerPowerRule.apply(&e, &ctx());
        assert_eq!(
            out,
            Some(Expr::pow(
                x.clone(),
                Expr::product(vec![Expr::number(2.0), Expr::number(3.0)])
            ))
        );

        let root_of_square = Expr::pow(x.pow_of(2.0), Expr::number(0.5));
        assert_eq!(PowerPowerRule.apply(&root_of_square, &ctx()), None);
    }

    #[test]
    fn test_identities() {
        let x = Expr::symbol("x");
        assert_eq!(PowerOneRule.apply(&x.clone().pow_of(1.0), &ctx()), Some(x.clone()));
        assert_eq!(
            PowerZeroRule.apply(&x.clone().pow_of(0.0), &ctx()),
            Some(Expr::number(1.0))
        );
        assert_eq!(
            OneBaseRule.apply(&Expr::pow(Expr::number(1.0), x), &ctx()),
            Some(Expr::number(1.0))
        );
    }

    #[test]
    fn test_sqrt_squared() {
        let x = Expr::symbol("x");
        let e = x.clone().sqrt().pow_of(2.0);
        assert_eq!(
            EvenPowerOfRootRule.apply(&e, &ctx()),
            Some(x.pow_of(1.0))
        );
    }

    #[test]
    fn test_abs_of_negation() {
        let x = Expr::symbol("x");
        let e = Expr::negate(x.clone()).abs();
        assert_eq!(AbsIdempotentRule.apply(&e, &ctx()), Some(x.clone().abs()));
        let e = x.clone().abs().abs();
        assert_eq!(AbsIdempotentRule.apply(&e, &ctx()), Some(x.abs()));
    }
}
