//! Structural queries on expressions: free variables, size, shape predicates.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::{Constant, Expr, ExprKind};
use crate::functions::Function;
use crate::traits;
use crate::visitor::{ExprVisitor, NodeCounter, walk_expr};

/// A product split into its numeric coefficient and the remaining factors
pub(crate) struct FactorParts {
    pub coeff: f64,
    pub rest: Vec<Arc<Expr>>,
}

impl FactorParts {
    /// Rebuild the non-numeric part (1 when there is none)
    pub fn rest_expr(&self) -> Expr {
        Expr::product_from_arcs(self.rest.clone())
    }
}

struct SymbolCollector {
    names: BTreeSet<String>,
}

impl ExprVisitor for SymbolCollector {
    fn visit_symbol(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string());
        true
    }
}

struct FunctionFinder<'a> {
    targets: &'a [Function],
    found: bool,
}

impl ExprVisitor for FunctionFinder<'_> {
    fn visit_function(&mut self, func: Function, _arg: &Expr) -> bool {
        if self.targets.contains(&func) {
            self.found = true;
        }
        !self.found
    }
}

impl Expr {
    /// Return the number if this is a `Number` node
    pub fn as_number(&self) -> Option<f64> {
        match &self.kind {
            ExprKind::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Return the variable name if this is a `Symbol` node
    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Symbol(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Check if this expression is exactly the number zero
    #[inline]
    pub fn is_zero_num(&self) -> bool {
        self.as_number() == Some(0.0)
    }

    /// Check if this expression is the number one (with tolerance)
    #[inline]
    pub fn is_one_num(&self) -> bool {
        self.as_number().is_some_and(traits::is_one)
    }

    /// Check if this expression is the number negative one (with tolerance)
    #[inline]
    pub fn is_neg_one_num(&self) -> bool {
        self.as_number().is_some_and(traits::is_neg_one)
    }

    /// The set of variable names appearing in the expression
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut collector = SymbolCollector {
            names: BTreeSet::new(),
        };
        walk_expr(self, &mut collector);
        collector.names
    }

    /// True when the variable `var` occurs anywhere in the expression
    pub fn contains_var(&self, var: &str) -> bool {
        match &self.kind {
            ExprKind::Symbol(s) => s == var,
            ExprKind::Number(_) | ExprKind::Constant(_) => false,
            ExprKind::Sum(children) | ExprKind::Product(children) => {
                children.iter().any(|c| c.contains_var(var))
            }
            ExprKind::Pow(base, exp) => base.contains_var(var) || exp.contains_var(var),
            ExprKind::FunctionCall { arg, .. } => arg.contains_var(var),
        }
    }

    /// True when the expression is constant with respect to `var`
    #[inline]
    pub fn is_free_of(&self, var: &str) -> bool {
        !self.contains_var(var)
    }

    /// True when the expression has no variables at all
    pub fn is_closed(&self) -> bool {
        self.free_symbols().is_empty()
    }

    /// Nesting depth (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Symbol(_) | ExprKind::Constant(_) => 1,
            ExprKind::Sum(children) | ExprKind::Product(children) => {
                1 + children.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
            ExprKind::Pow(base, exp) => 1 + base.depth().max(exp.depth()),
            ExprKind::FunctionCall { arg, .. } => 1 + arg.depth(),
        }
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        let mut counter = NodeCounter::default();
        walk_expr(self, &mut counter);
        counter.count
    }

    /// True when any of the given functions is applied somewhere in the tree
    pub fn contains_any_function(&self, targets: &[Function]) -> bool {
        let mut finder = FunctionFinder {
            targets,
            found: false,
        };
        walk_expr(self, &mut finder);
        finder.found
    }

    /// True when the tree contains an exponential: `exp(u)`, `e^u`, or a
    /// constant raised to a power that depends on `var`
    pub fn contains_exponential(&self, var: &str) -> bool {
        match &self.kind {
            ExprKind::FunctionCall {
                func: Function::Exp,
                ..
            } => true,
            ExprKind::Pow(base, exp) => {
                matches!(base.kind, ExprKind::Constant(Constant::E))
                    || (base.is_free_of(var) && exp.contains_var(var))
                    || base.contains_exponential(var)
                    || exp.contains_exponential(var)
            }
            ExprKind::Sum(children) | ExprKind::Product(children) => {
                children.iter().any(|c| c.contains_exponential(var))
            }
            ExprKind::FunctionCall { arg, .. } => arg.contains_exponential(var),
            _ => false,
        }
    }

    /// True when the expression is a polynomial in `var`: built from sums,
    /// products and non-negative integer powers of `var`-dependent bases,
    /// with every other part free of `var`.
    pub fn is_polynomial_in(&self, var: &str) -> bool {
        if self.is_free_of(var) {
            return true;
        }
        match &self.kind {
            ExprKind::Symbol(_) => true,
            ExprKind::Sum(children) | ExprKind::Product(children) => {
                children.iter().all(|c| c.is_polynomial_in(var))
            }
            ExprKind::Pow(base, exp) => {
                exp.as_number()
                    .is_some_and(|n| n >= 0.0 && traits::is_integer(n))
                    && base.is_polynomial_in(var)
            }
            _ => false,
        }
    }

    /// True when the tree contains `0^-n`
    pub(crate) fn has_zero_denominator(&self) -> bool {
        match &self.kind {
            ExprKind::Pow(base, exp) => {
                (base.is_zero_num() && exp.as_number().is_some_and(|n| n < 0.0))
                    || base.has_zero_denominator()
                    || exp.has_zero_denominator()
            }
            ExprKind::Sum(children) | ExprKind::Product(children) => {
                children.iter().any(|c| c.has_zero_denominator())
            }
            ExprKind::FunctionCall { arg, .. } => arg.has_zero_denominator(),
            _ => false,
        }
    }

    /// Split a term into numeric coefficient and the remaining factors.
    /// `3*x*y` gives `(3, [x, y])`, `x` gives `(1, [x])`, `5` gives `(5, [])`.
    pub(crate) fn factor_parts(&self) -> FactorParts {
        match &self.kind {
            ExprKind::Number(n) => FactorParts {
                coeff: *n,
                rest: Vec::new(),
            },
            ExprKind::Product(factors) => {
                let mut coeff = 1.0;
                let mut rest = Vec::with_capacity(factors.len());
                for f in factors {
                    if let ExprKind::Number(n) = f.kind {
                        coeff *= n;
                    } else {
                        rest.push(Arc::clone(f));
                    }
                }
                FactorParts { coeff, rest }
            }
            _ => FactorParts {
                coeff: 1.0,
                rest: vec![Arc::new(self.clone())],
            },
        }
    }

    /// Split a factor into base and exponent: `x^3` gives `(x, 3)`, `x` gives `(x, 1)`
    pub(crate) fn base_and_exponent(&self) -> (Expr, Expr) {
        match &self.kind {
            ExprKind::Pow(base, exp) => ((**base).clone(), (**exp).clone()),
            _ => (self.clone(), Expr::number(1.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_symbols() {
        let e = Expr::symbol("x") * Expr::symbol("y").sin() + Expr::constant(Constant::Pi);
        let names: Vec<String> = e.free_symbols().into_iter().collect();
        assert_eq!(names, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_depth_and_count() {
        let e = Expr::symbol("x").sin().cos();
        assert_eq!(e.depth(), 3);
        assert_eq!(e.node_count(), 3);
    }

    #[test]
    fn test_polynomial_shape() {
        let x = Expr::symbol("x");
        let poly = x.clone().pow_of(2.0) + 2.0 * x.clone() + Expr::number(1.0);
        assert!(poly.is_polynomial_in("x"));
        assert!(!x.clone().sin().is_polynomial_in("x"));
        assert!(!Expr::recip(x.clone()).is_polynomial_in("x"));
        // Functions of other variables are coefficients
        assert!((Expr::symbol("a").sin() * x).is_polynomial_in("x"));
    }

    #[test]
    fn test_exponential_shape() {
        let x = Expr::symbol("x");
        assert!(x.clone().exp().contains_exponential("x"));
        assert!(Expr::pow(Expr::number(2.0), x.clone()).contains_exponential("x"));
        assert!(!x.clone().pow_of(2.0).contains_exponential("x"));
    }

    #[test]
    fn test_factor_parts() {
        let e = Expr::product(vec![
            Expr::number(3.0),
            Expr::symbol("x"),
            Expr::number(2.0),
        ]);
        let parts = e.factor_parts();
        assert_eq!(parts.coeff, 6.0);
        assert_eq!(parts.rest_expr(), Expr::symbol("x"));
    }

    #[test]
    fn test_zero_denominator() {
        let x = Expr::symbol("x");
        assert!((x.clone() * Expr::recip(Expr::number(0.0))).has_zero_denominator());
        assert!(Expr::recip(Expr::number(0.0)).sin().has_zero_denominator());
        assert!(!Expr::recip(Expr::number(1e-11)).has_zero_denominator());
        assert!(!Expr::pow(Expr::number(0.0), x).has_zero_denominator());
    }
}
