use std::cmp::Ordering;
use std::sync::Arc;

use crate::expr::{expr_cmp, term_cmp};
use crate::simplification::rules::{NodeKind, RuleContext};
use crate::{Expr, ExprKind};

fn sorted_by(
    children: &[Arc<Expr>],
    cmp: fn(&Expr, &Expr) -> Ordering,
) -> Option<Vec<Arc<Expr>>> {
    if children.is_sorted_by(|a, b| cmp(a, b) != Ordering::Greater) {
        return None;
    }
    let mut sorted = children.to_vec();
    sorted.sort_by(|a, b| cmp(a, b));
    Some(sorted)
}

rule!(
    CanonicalOrderRule,
    "canonical_order",
    1,
    Algebraic,
    &[NodeKind::Sum, NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| {
        // Sums by descending degree, products with the coefficient first
        match &expr.kind {
            ExprKind::Sum(terms) => sorted_by(terms, term_cmp).map(Expr::sum_from_arcs),
            ExprKind::Product(factors) => sorted_by(factors, expr_cmp).map(Expr::product_from_arcs),
            _ => None,
        }
    }
);
