//! Constant folding and numeric identities.
//!
//! Folding never produces a non-finite value: `1/0`, `0^-1` and `log(0)` stay
//! symbolic so the evaluator can report them.

use std::sync::Arc;

use crate::simplification::rules::{NodeKind, Rule, RuleContext};
use crate::traits::{as_fraction, cancels, is_integer, snap};
use crate::{Expr, ExprKind};

/// A folded value is kept only when it displays exactly: an integer or a small fraction
fn clean_value(v: f64) -> Option<f64> {
    if !v.is_finite() {
        return None;
    }
    if v == 0.0 {
        return Some(0.0);
    }
    let snapped = snap(v);
    if snapped.fract() == 0.0 {
        return Some(snapped);
    }
    as_fraction(v).map(|_| v)
}

rule!(
    SumConstantFoldRule,
    "sum_constant_fold",
    100,
    Numeric,
    &[NodeKind::Sum],
    |expr: &Expr, _context: &RuleContext| {
        let ExprKind::Sum(terms) = &expr.kind else {
            return None;
        };

        let mut total = 0.0;
        let mut scale: f64 = 0.0;
        let mut count = 0;
        let mut rest: Vec<Arc<Expr>> = Vec::with_capacity(terms.len());
        for term in terms {
            if let ExprKind::Number(n) = term.kind {
                total += n;
                scale = scale.max(n.abs());
                count += 1;
            } else {
                rest.push(Arc::clone(term));
            }
        }

        // A single non-zero number is already folded
        if count == 0 || (count == 1 && total != 0.0) || !total.is_finite() {
            return None;
        }

        // Cancellation leaves rounding noise
        if count > 1 {
            total = if cancels(total, scale) { 0.0 } else { snap(total) };
        }
        if total != 0.0 {
            rest.push(Arc::new(Expr::number(total)));
        }
        Some(Expr::sum_from_arcs(rest))
    }
);

rule!(
    ProductConstantFoldRule,
    "product_constant_fold",
    100,
    Numeric,
    &[NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| {
        let ExprKind::Product(factors) = &expr.kind else {
            return None;
        };

        let mut coeff = 1.0;
        let mut count = 0;
        let mut rest: Vec<Arc<Expr>> = Vec::with_capacity(factors.len());
        for factor in factors {
            if let ExprKind::Number(n) = factor.kind {
                coeff *= n;
                count += 1;
            } else {
                rest.push(Arc::clone(factor));
            }
        }

        if !coeff.is_finite() {
            return None;
        }
        let coeff = snap(coeff);
        if coeff == 0.0 {
            return Some(Expr::number(0.0));
        }
        // A single coefficient other than 1 is already folded
        if count == 0 || (count == 1 && coeff != 1.0) {
            return None;
        }

        if coeff != 1.0 || rest.is_empty() {
            rest.insert(0, Arc::new(Expr::number(coeff)));
        }
        Some(Expr::product_from_arcs(rest))
    }
);

rule!(
    PowConstantFoldRule,
    "pow_constant_fold",
    100,
    Numeric,
    &[NodeKind::Pow],
    |expr: &Expr, _context: &RuleContext| {
        let ExprKind::Pow(base, exp) = &expr.kind else {
            return None;
        };
        let (b, e) = (base.as_number()?, exp.as_number()?);

        // 0^-n is a division by zero, left for the evaluator to report
        if b == 0.0 && e < 0.0 {
            return None;
        }
        // Negative base with fractional exponent has no real value
        if b < 0.0 && !is_integer(e) {
            return None;
        }
        clean_value(b.powf(e)).map(Expr::number)
    }
);

rule!(
    FunctionConstantFoldRule,
    "function_constant_fold",
    95,
    Numeric,
    &[NodeKind::Function],
    |expr: &Expr, _context: &RuleContext| {
        let ExprKind::FunctionCall { func, arg } = &expr.kind else {
            return None;
        };
        let value = func.eval(arg.as_number()?)?;
        clean_value(value).map(Expr::number)
    }
);

rule!(
    DistributeCoefficientRule,
    "distribute_coefficient",
    60,
    Numeric,
    &[NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| {
        // c * (a + b) -> c*a + c*b
        let ExprKind::Product(factors) = &expr.kind else {
            return None;
        };
        let [coeff, sum] = factors.as_slice() else {
            return None;
        };
        let c = coeff.as_number()?;
        let ExprKind::Sum(terms) = &sum.kind else {
            return None;
        };
        Some(Expr::sum(
            terms
                .iter()
                .map(|t| match t.as_number() {
                    Some(n) => Expr::number(c * n),
                    None => Expr::product_from_arcs(vec![Arc::new(Expr::number(c)), Arc::clone(t)]),
                })
                .collect(),
        ))
    }
);

/// Get all numeric rules
pub(crate) fn get_numeric_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(SumConstantFoldRule),
        Arc::new(ProductConstantFoldRule),
        Arc::new(PowConstantFoldRule),
        Arc::new(FunctionConstantFoldRule),
        Arc::new(DistributeCoefficientRule),
    ]
}
