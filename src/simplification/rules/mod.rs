use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{Expr, ExprKind};

/// Declare a unit-struct rule with its name, priority, category and kinds.
///
/// ```ignore
/// rule!(PowerOneRule, "power_one", 80, Algebraic, &[NodeKind::Pow], |expr: &Expr, _context: &RuleContext| {
///     ...
/// });
/// ```
macro_rules! rule {
    ($name:ident, $label:expr, $priority:expr, $category:ident, $kinds:expr, $apply:expr) => {
        pub(crate) struct $name;

        impl $crate::simplification::rules::Rule for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn priority(&self) -> i32 {
                $priority
            }

            fn category(&self) -> $crate::simplification::rules::RuleCategory {
                $crate::simplification::rules::RuleCategory::$category
            }

            fn applies_to(&self) -> &'static [$crate::simplification::rules::NodeKind] {
                $kinds
            }

            fn apply(
                &self,
                expr: &$crate::Expr,
                context: &$crate::simplification::rules::RuleContext,
            ) -> Option<$crate::Expr> {
                let apply: fn(
                    &$crate::Expr,
                    &$crate::simplification::rules::RuleContext,
                ) -> Option<$crate::Expr> = $apply;
                apply(expr, context)
            }
        }
    };
}

/// Numeric simplification rules
pub(crate) mod numeric;

/// Algebraic simplification rules
pub(crate) mod algebraic;

/// Exponential and logarithmic simplification rules
pub(crate) mod exponential;

/// Node kind for fast rule filtering.
/// Rules declare which node kinds they can apply to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum NodeKind {
    Number,
    Symbol,
    Constant,
    Sum,
    Product,
    Pow,
    Function, // Any function call
}

impl NodeKind {
    const ALL: [NodeKind; 7] = [
        NodeKind::Number,
        NodeKind::Symbol,
        NodeKind::Constant,
        NodeKind::Sum,
        NodeKind::Product,
        NodeKind::Pow,
        NodeKind::Function,
    ];

    /// Get the kind of an expression (cheap O(1) operation)
    #[inline]
    pub(crate) fn of(expr: &Expr) -> Self {
        match &expr.kind {
            ExprKind::Number(_) => NodeKind::Number,
            ExprKind::Symbol(_) => NodeKind::Symbol,
            ExprKind::Constant(_) => NodeKind::Constant,
            ExprKind::Sum(_) => NodeKind::Sum,
            ExprKind::Product(_) => NodeKind::Product,
            ExprKind::Pow(_, _) => NodeKind::Pow,
            ExprKind::FunctionCall { .. } => NodeKind::Function,
        }
    }
}

/// Core trait for all simplification rules
pub(crate) trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn priority(&self) -> i32;
    fn category(&self) -> RuleCategory;

    /// Which node kinds this rule can apply to.
    /// Rules will ONLY be checked against expressions matching these kinds.
    fn applies_to(&self) -> &'static [NodeKind];

    /// Rewrite `expr`, or return `None` when the rule does not match.
    /// A rule must never return an expression equal to its input.
    fn apply(&self, expr: &Expr, context: &RuleContext) -> Option<Expr>;
}

/// Categories of simplification rules
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum RuleCategory {
    Numeric,   // Constant folding, identities
    Algebraic, // Powers, like terms, ordering
    Exponential,
}

/// Priority ranges:
/// - 90-100: constant folding and identities
/// - 50-89: structural rewrites (powers, distribution, collection)
/// - 1-9: canonical ordering, always last
///
/// Context passed to rules during application
#[derive(Clone, Debug, Default)]
pub(crate) struct RuleContext {
    pub depth: usize,
}

impl RuleContext {
    pub(crate) fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }
}

/// Rule Registry for loading rules and indexing them by node kind
pub(crate) struct RuleRegistry {
    pub(crate) rules: Vec<Arc<dyn Rule>>,
    /// Rules indexed by node kind for fast lookup
    rules_by_kind: FxHashMap<NodeKind, Vec<Arc<dyn Rule>>>,
}

impl RuleRegistry {
    pub(crate) fn new() -> Self {
        Self {
            rules: Vec::new(),
            rules_by_kind: FxHashMap::default(),
        }
    }

    pub(crate) fn load_all_rules(&mut self) {
        self.rules.extend(numeric::get_numeric_rules());
        self.rules.extend(algebraic::get_algebraic_rules());
        self.rules.extend(exponential::get_exponential_rules());
    }

    /// Sort by priority (higher first, category breaks ties) and build the kind index
    pub(crate) fn order_by_priority(&mut self) {
        self.rules.sort_by_key(|r| {
            (
                std::cmp::Reverse(r.priority()),
                match r.category() {
                    RuleCategory::Numeric => 0,
                    RuleCategory::Algebraic => 1,
                    RuleCategory::Exponential => 2,
                },
            )
        });

        self.build_kind_index();
    }

    /// Build the index of rules by node kind
    fn build_kind_index(&mut self) {
        self.rules_by_kind.clear();

        for kind in NodeKind::ALL {
            self.rules_by_kind.insert(kind, Vec::new());
        }

        for rule in &self.rules {
            for &kind in rule.applies_to() {
                if let Some(rules) = self.rules_by_kind.get_mut(&kind) {
                    rules.push(Arc::clone(rule));
                }
            }
        }
    }

    /// Get only rules that apply to a specific node kind
    #[inline]
    pub(crate) fn get_rules_for_kind(&self, kind: NodeKind) -> &[Arc<dyn Rule>] {
        self.rules_by_kind
            .get(&kind)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_sorted_by_priority() {
        let mut registry = RuleRegistry::new();
        registry.load_all_rules();
        registry.order_by_priority();
        let priorities: Vec<i32> = registry.rules.iter().map(|r| r.priority()).collect();
        assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_rule_names_unique() {
        let mut registry = RuleRegistry::new();
        registry.load_all_rules();
        let mut names: Vec<&str> = registry.rules.iter().map(|r| r.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_sum_rules_indexed() {
        let mut registry = RuleRegistry::new();
        registry.load_all_rules();
        registry.order_by_priority();
        let names: Vec<&str> = registry
            .get_rules_for_kind(NodeKind::Sum)
            .iter()
            .map(|r| r.name())
            .collect();
        assert!(names.contains(&"sum_constant_fold"));
        assert!(names.contains(&"collect_like_terms"));
        assert_eq!(names.last(), Some(&"canonical_order"));
    }
}
