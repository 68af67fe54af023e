use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::simplification::rules::{NodeKind, RuleContext};
use crate::traits::{cancels, is_one};
use crate::{Expr, ExprKind};

/// Rebuild `coeff * rest`, dropping a unit coefficient
fn scaled(coeff: f64, rest: Expr) -> Expr {
    if rest.is_one_num() {
        return Expr::number(coeff);
    }
    if is_one(coeff) {
        return rest;
    }
    Expr::product(vec![Expr::number(coeff), rest])
}

rule!(
    CollectLikeTermsRule,
    "collect_like_terms",
    50,
    Algebraic,
    &[NodeKind::Sum],
    |expr: &Expr, _context: &RuleContext| {
        // 2*x + 3*x -> 5*x, x - x -> 0
        let ExprKind::Sum(terms) = &expr.kind else {
            return None;
        };

        // First-seen order of the non-numeric parts, with summed coefficients
        // and the largest coefficient that went into each sum
        let mut groups: Vec<(Expr, f64, f64)> = Vec::with_capacity(terms.len());
        let mut index: FxHashMap<Expr, usize> = FxHashMap::default();
        let mut merged = false;

        for term in terms {
            let parts = term.factor_parts();
            let rest = parts.rest_expr();
            match index.get(&rest) {
                Some(&i) => {
                    let group = &mut groups[i];
                    group.1 += parts.coeff;
                    group.2 = group.2.max(parts.coeff.abs());
                    merged = true;
                }
                None => {
                    index.insert(rest.clone(), groups.len());
                    groups.push((rest, parts.coeff, parts.coeff.abs()));
                }
            }
        }

        let dropped = groups.iter().any(|(_, c, scale)| cancels(*c, *scale));
        if !merged && !dropped {
            return None;
        }

        let rebuilt: Vec<Expr> = groups
            .into_iter()
            .filter(|(_, c, scale)| !cancels(*c, *scale))
            .map(|(rest, c, _)| scaled(c, rest))
            .collect();
        Some(Expr::sum(rebuilt))
    }
);

rule!(
    CollectLikeFactorsRule,
    "collect_like_factors",
    55,
    Algebraic,
    &[NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| {
        // x * x^2 -> x^(1+2), sin(x) * sin(x) -> sin(x)^(1+1)
        let ExprKind::Product(factors) = &expr.kind else {
            return None;
        };

        let mut numbers: Vec<Arc<Expr>> = Vec::new();
        let mut groups: Vec<(Expr, Vec<Expr>)> = Vec::with_capacity(factors.len());
        let mut index: FxHashMap<Expr, usize> = FxHashMap::default();
        let mut merged = false;

        for factor in factors {
            if matches!(factor.kind, ExprKind::Number(_)) {
                numbers.push(Arc::clone(factor));
                continue;
            }
            let (base, exponent) = factor.base_and_exponent();
            match index.get(&base) {
                Some(&i) => {
                    groups[i].1.push(exponent);
                    merged = true;
                }
                None => {
                    index.insert(base.clone(), groups.len());
                    groups.push((base, vec![exponent]));
                }
            }
        }

        if !merged {
            return None;
        }

        let mut rebuilt = numbers;
        for (base, mut exponents) in groups {
            let factor = if exponents.len() == 1 {
                match exponents.pop() {
                    Some(e) if e.is_one_num() => base,
                    Some(e) => Expr::pow(base, e),
                    None => base,
                }
            } else {
                Expr::pow(base, Expr::sum(exponents))
            };
            rebuilt.push(Arc::new(factor));
        }
        Some(Expr::product_from_arcs(rebuilt))
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
    fn test_collect_terms() {
        let x = Expr::symbol("x");
        let e = Expr::sum(vec![2.0 * x.clone(), 3.0 * x.clone(), Expr::number(1.0)]);
        assert_eq!(
            CollectLikeTermsRule.apply(&e, &ctx()),
            Some(5.0 * x.clone() + Expr::number(1.0))
        );

        let opposite = x.clone() - x.clone();
        assert_eq!(CollectLikeTermsRule.apply(&opposite, &ctx()), Some(Expr::number(0.0)));

        let distinct = x.clone() + x.pow_of(2.0);
        assert_eq!(CollectLikeTermsRule.apply(&distinct, &ctx()), None);
    }

    #[test]
    fn test_small_coefficients_are_kept() {
        let x = Expr::symbol("x");
        let tiny = Expr::sum(vec![1e-11 * x.clone(), Expr::number(1.0)]);
        assert_eq!(CollectLikeTermsRule.apply(&tiny, &ctx()), None);

        let twice = Expr::sum(vec![1e-11 * x.clone(), 1e-11 * x.clone()]);
        assert_eq!(CollectLikeTermsRule.apply(&twice, &ctx()), Some(2e-11 * x.clone()));

        // Rounding noise relative to the merged coefficients still cancels
        let noisy = Expr::sum(vec![0.1 * x.clone(), 0.2 * x.clone(), -0.3 * x.clone()]);
        assert_eq!(CollectLikeTermsRule.apply(&noisy, &ctx()), Some(Expr::number(0.0)));
    }

    #[test]
    fn test_collect_factors() {
        let x = Expr::symbol("x");
        let e = Expr::product(vec![Expr::number(3.0), x.clone(), x.clone().pow_of(2.0)]);
        let expected = Expr::product(vec![
            Expr::number(3.0),
            Expr::pow(x.clone(), Expr::sum(vec![Expr::number(1.0), Expr::number(2.0)])),
        ]);
        assert_eq!(CollectLikeFactorsRule.apply(&e, &ctx()), Some(expected));

        let single = x.clone() * x.clone().sin();
        assert_eq!(CollectLikeFactorsRule.apply(&single, &ctx()), None);
    }
}
