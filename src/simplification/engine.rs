//! Core simplification engine with rule-based architecture
//!
//! Implements bottom-up tree traversal, priority-ordered rule application,
//! cycle detection, and configurable limits (iterations, depth).

use super::rules::{NodeKind, RuleContext, RuleRegistry};
use crate::{Expr, ExprKind};
use log::{trace, warn};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::sync::OnceLock;

/// Default number of full passes before giving up on a fixed point
pub(crate) const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default recursion limit for the bottom-up walk
const DEFAULT_MAX_DEPTH: usize = 500;

/// Rewrites allowed on a single node within one pass
const MAX_NODE_REWRITES: usize = 64;

/// Global rule registry singleton - built once, reused across all simplifications
fn global_registry() -> &'static RuleRegistry {
    static REGISTRY: OnceLock<RuleRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = RuleRegistry::new();
        registry.load_all_rules();
        registry.order_by_priority();
        registry
    })
}

/// Main simplification engine
pub(crate) struct Simplifier {
    max_iterations: usize,
    max_depth: usize,
    context: RuleContext,
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplifier {
    pub(crate) fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_depth: DEFAULT_MAX_DEPTH,
            context: RuleContext::default(),
        }
    }

    pub(crate) fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Main simplification entry point
    pub(crate) fn simplify(&mut self, expr: Expr) -> Expr {
        let mut current = Arc::new(expr);
        let mut iterations = 0;
        // Structural hashes of every pass result, for cheap cycle detection
        let mut seen_hashes: FxHashSet<u64> = FxHashSet::default();

        loop {
            if iterations >= self.max_iterations {
                warn!(
                    "simplification exceeded maximum iterations ({}), returning partial result",
                    self.max_iterations
                );
                break;
            }

            let original = Arc::clone(&current);
            current = self.apply_rules_bottom_up(current, 0);

            if *current == *original {
                break;
            }

            trace!("pass {}: {} -> {}", iterations, original, current);

            // Add after checking, so the first pass never looks like a cycle
            if !seen_hashes.insert(current.hash) {
                trace!("cycle detected after {} passes, stopping", iterations + 1);
                break;
            }

            iterations += 1;
        }

        Expr::unwrap_arc(current)
    }

    /// Apply rules bottom-up through the expression tree
    fn apply_rules_bottom_up(&mut self, expr: Arc<Expr>, depth: usize) -> Arc<Expr> {
        if depth > self.max_depth {
            return expr;
        }

        match &expr.kind {
            ExprKind::Sum(terms) => match self.simplify_children(terms, depth) {
                None => self.apply_rules_to_node(expr, depth),
                Some(new_terms) => {
                    let new_expr = Arc::new(Expr::sum_from_arcs(new_terms));
                    self.apply_rules_to_node(new_expr, depth)
                }
            },

            ExprKind::Product(factors) => match self.simplify_children(factors, depth) {
                None => self.apply_rules_to_node(expr, depth),
                Some(new_factors) => {
                    let new_expr = Arc::new(Expr::product_from_arcs(new_factors));
                    self.apply_rules_to_node(new_expr, depth)
                }
            },

            ExprKind::Pow(u, v) => {
                let u_simplified = self.apply_rules_bottom_up(Arc::clone(u), depth + 1);
                let v_simplified = self.apply_rules_bottom_up(Arc::clone(v), depth + 1);

                if Arc::ptr_eq(&u_simplified, u) && Arc::ptr_eq(&v_simplified, v) {
                    self.apply_rules_to_node(expr, depth)
                } else {
                    let new_expr = Arc::new(Expr::new(ExprKind::Pow(u_simplified, v_simplified)));
                    self.apply_rules_to_node(new_expr, depth)
                }
            }

            ExprKind::FunctionCall { func, arg } => {
                let arg_simplified = self.apply_rules_bottom_up(Arc::clone(arg), depth + 1);

                if Arc::ptr_eq(&arg_simplified, arg) {
                    self.apply_rules_to_node(expr, depth)
                } else {
                    let new_expr = Arc::new(Expr::func_arc(*func, arg_simplified));
                    self.apply_rules_to_node(new_expr, depth)
                }
            }

            _ => self.apply_rules_to_node(expr, depth),
        }
    }

    /// Simplify each child; `None` when no child changed
    fn simplify_children(&mut self, children: &[Arc<Expr>], depth: usize) -> Option<Vec<Arc<Expr>>> {
        let simplified: Vec<Arc<Expr>> = children
            .iter()
            .map(|c| self.apply_rules_bottom_up(Arc::clone(c), depth + 1))
            .collect();

        let changed = simplified
            .iter()
            .zip(children.iter())
            .any(|(new, old)| !Arc::ptr_eq(new, old));

        changed.then_some(simplified)
    }

    /// Rewrite a single node until no rule for its kind applies.
    ///
    /// After every rewrite the scan restarts from the highest-priority rule
    /// for the (possibly new) node kind.
    fn apply_rules_to_node(&mut self, mut current: Arc<Expr>, depth: usize) -> Arc<Expr> {
        self.context.set_depth(depth);

        'rewrite: for _ in 0..MAX_NODE_REWRITES {
            let kind = NodeKind::of(current.as_ref());
            for rule in global_registry().get_rules_for_kind(kind) {
                if let Some(new_expr) = rule.apply(&current, &self.context) {
                    if new_expr == *current {
                        continue;
                    }
                    trace!("{}: {} => {}", rule.name(), current, new_expr);
                    current = Arc::new(new_expr);
                    continue 'rewrite;
                }
            }
            break;
        }

        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simplify(e: Expr) -> Expr {
        Simplifier::new().simplify(e)
    }

    #[test]
    fn test_fixed_point_reached() {
        let x = Expr::symbol("x");
        // (x + 0) * 1 + x  ->  2*x
        let e = Expr::sum(vec![
            Expr::product(vec![x.clone() + Expr::number(0.0), Expr::number(1.0)]),
            x.clone(),
        ]);
        assert_eq!(simplify(e), 2.0 * x);
    }

    #[test]
    fn test_nested_powers_collapse() {
        let x = Expr::symbol("x");
        let e = Expr::pow(x.clone().pow_of(2.0), Expr::number(3.0));
        assert_eq!(simplify(e), x.pow_of(6.0));
    }

    #[test]
    fn test_iteration_limit_returns_partial_result() {
        let x = Expr::symbol("x");
        let e = Expr::sum(vec![x.clone(), x.clone(), x.clone()]);
        let out = Simplifier::new().with_max_iterations(1).simplify(e);
        assert_eq!(out, 3.0 * x);
    }

    #[test]
    fn test_depth_limit_leaves_deep_nodes() {
        let x = Expr::symbol("x");
        let inner = x.clone() + Expr::number(0.0);
        let e = inner.clone().sin();
        let out = Simplifier::new().with_max_depth(0).simplify(e.clone());
        assert_eq!(out, e);
        assert_eq!(simplify(inner.sin()), x.sin());
    }
}
