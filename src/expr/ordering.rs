//! Canonical ordering for expressions.
//!
//! `expr_cmp` orders product factors; `term_cmp` orders the terms of a sum
//! (highest polynomial degree first, bare numbers last).

use std::cmp::Ordering as CmpOrdering;

use super::{Expr, ExprKind};

/// Compare expressions for canonical ordering.
/// Order: Numbers < Constants < Symbols < Sum < `FunctionCall` < Pow < Product,
/// with powers keyed on their base so `x` sits next to `x^2`.
pub fn expr_cmp(a: &Expr, b: &Expr) -> CmpOrdering {
    use ExprKind::{Number, Pow};

    // Returns: (Base, Exponent, IsAtomic). Exponent None means 1.
    fn extract_key(e: &Expr) -> (&Expr, Option<&Expr>, bool) {
        match &e.kind {
            Pow(b, exp) => (b.as_ref(), Some(exp.as_ref()), false),
            _ => (e, None, true),
        }
    }

    // 1. Numbers always come first
    if let (Number(x), Number(y)) = (&a.kind, &b.kind) {
        return x.partial_cmp(y).unwrap_or(CmpOrdering::Equal);
    }
    if matches!(a.kind, Number(_)) {
        return CmpOrdering::Less;
    }
    if matches!(b.kind, Number(_)) {
        return CmpOrdering::Greater;
    }

    let (base_a, exp_a, atomic_a) = extract_key(a);
    let (base_b, exp_b, atomic_b) = extract_key(b);

    // 2. Both atomic: strict type ordering (prevents comparing x vs x forever)
    if atomic_a && atomic_b {
        return expr_cmp_type_strict(a, b);
    }

    // 3. Compare bases; recursion is safe because one side is a Pow
    let base_cmp = expr_cmp(base_a, base_b);
    if base_cmp != CmpOrdering::Equal {
        return base_cmp;
    }

    // 4. Same base: implied exponent 1 sorts before explicit ones
    match (exp_a, exp_b) {
        (Some(e_a), Some(e_b)) => expr_cmp(e_a, e_b),
        (Some(e_a), None) => exponent_vs_one(e_a),
        (None, Some(e_b)) => exponent_vs_one(e_b).reverse(),
        (None, None) => CmpOrdering::Equal,
    }
}

fn exponent_vs_one(e: &Expr) -> CmpOrdering {
    match e.as_number() {
        Some(n) => n.partial_cmp(&1.0).unwrap_or(CmpOrdering::Equal),
        None => CmpOrdering::Greater,
    }
}

/// Fallback: strict type comparisons for atomic terms
fn expr_cmp_type_strict(a: &Expr, b: &Expr) -> CmpOrdering {
    use ExprKind::{Constant, FunctionCall, Number, Pow, Product, Sum, Symbol};
    match (&a.kind, &b.kind) {
        (Number(x), Number(y)) => x.partial_cmp(y).unwrap_or(CmpOrdering::Equal),
        (Number(_), _) => CmpOrdering::Less,
        (_, Number(_)) => CmpOrdering::Greater,

        (Constant(x), Constant(y)) => x.cmp(y),
        (Constant(_), _) => CmpOrdering::Less,
        (_, Constant(_)) => CmpOrdering::Greater,

        (Symbol(x), Symbol(y)) => x.cmp(y),
        (Symbol(_), _) => CmpOrdering::Less,
        (_, Symbol(_)) => CmpOrdering::Greater,

        (Sum(t1), Sum(t2)) => cmp_children(t1, t2),
        (Sum(_), _) => CmpOrdering::Less,
        (_, Sum(_)) => CmpOrdering::Greater,

        (FunctionCall { func: f1, arg: a1 }, FunctionCall { func: f2, arg: a2 }) => f1
            .name()
            .cmp(f2.name())
            .then_with(|| expr_cmp(a1, a2)),
        (FunctionCall { .. }, _) => CmpOrdering::Less,
        (_, FunctionCall { .. }) => CmpOrdering::Greater,

        (Pow(b1, e1), Pow(b2, e2)) => expr_cmp(b1, b2).then_with(|| expr_cmp(e1, e2)),
        (Pow(_, _), _) => CmpOrdering::Less,
        (_, Pow(_, _)) => CmpOrdering::Greater,

        (Product(f1), Product(f2)) => cmp_children(f1, f2),
    }
}

fn cmp_children(a: &[std::sync::Arc<Expr>], b: &[std::sync::Arc<Expr>]) -> CmpOrdering {
    a.len().cmp(&b.len()).then_with(|| {
        for (x, y) in a.iter().zip(b.iter()) {
            match expr_cmp(x, y) {
                CmpOrdering::Equal => {}
                other => return other,
            }
        }
        CmpOrdering::Equal
    })
}

/// Total polynomial degree of a term over all variables (0 for anything else)
fn degree(e: &Expr) -> f64 {
    match &e.kind {
        ExprKind::Symbol(_) => 1.0,
        ExprKind::Pow(base, exp) => match (&base.kind, exp.as_number()) {
            (ExprKind::Symbol(_), Some(n)) => n,
            _ => 0.0,
        },
        ExprKind::Product(factors) => factors.iter().map(|f| degree(f)).sum(),
        _ => 0.0,
    }
}

/// Compare two terms of a sum: higher degree first, numbers last,
/// then by the non-numeric part, then by coefficient.
pub fn term_cmp(a: &Expr, b: &Expr) -> CmpOrdering {
    let a_num = matches!(a.kind, ExprKind::Number(_));
    let b_num = matches!(b.kind, ExprKind::Number(_));
    if a_num != b_num {
        return a_num.cmp(&b_num);
    }

    let deg_cmp = degree(b)
        .partial_cmp(&degree(a))
        .unwrap_or(CmpOrdering::Equal);
    if deg_cmp != CmpOrdering::Equal {
        return deg_cmp;
    }

    let pa = a.factor_parts();
    let pb = b.factor_parts();
    let rest_a = pa.rest_expr();
    let rest_b = pb.rest_expr();
    expr_cmp(&rest_a, &rest_b).then_with(|| {
        pa.coeff
            .partial_cmp(&pb.coeff)
            .unwrap_or(CmpOrdering::Equal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_first_in_products() {
        let mut factors = vec![Expr::symbol("x"), Expr::number(2.0)];
        factors.sort_by(expr_cmp);
        assert_eq!(factors[0], Expr::number(2.0));
    }

    #[test]
    fn test_power_next_to_base() {
        let x = Expr::symbol("x");
        let x2 = x.clone().pow_of(2.0);
        assert_eq!(expr_cmp(&x, &x2), CmpOrdering::Less);
        assert_eq!(expr_cmp(&x2, &x), CmpOrdering::Greater);
    }

    #[test]
    fn test_terms_by_descending_degree() {
        let x = Expr::symbol("x");
        let mut terms = vec![
            Expr::number(1.0),
            2.0 * x.clone(),
            x.clone().pow_of(2.0),
        ];
        terms.sort_by(term_cmp);
        assert_eq!(terms[0], x.clone().pow_of(2.0));
        assert_eq!(terms[2], Expr::number(1.0));
    }

    #[test]
    fn test_functions_alphabetical() {
        let x = Expr::symbol("x");
        let cos2 = x.clone().cos().pow_of(2.0);
        let neg_sin2 = Expr::negate(x.sin().pow_of(2.0));
        assert_eq!(term_cmp(&cos2, &neg_sin2), CmpOrdering::Less);
    }
}
