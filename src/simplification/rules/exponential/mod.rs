use std::sync::Arc;

use crate::expr::Constant;
use crate::functions::Function;
use crate::simplification::rules::{NodeKind, Rule, RuleCategory, RuleContext};
use crate::{Expr, ExprKind};

fn is_euler(e: &Expr) -> bool {
    matches!(e.kind, ExprKind::Constant(Constant::E))
}

/// The exponent of `exp(u)` or `e^u`
fn exponential_argument(e: &Expr) -> Option<&Arc<Expr>> {
    match &e.kind {
        ExprKind::FunctionCall {
            func: Function::Exp,
            arg,
        } => Some(arg),
        ExprKind::Pow(base, exp) if is_euler(base) => Some(exp),
        _ => None,
    }
}

/// Rule for log(e) = 1, log(exp(u)) = u and log(e^u) = u
pub(crate) struct LogOfExpRule;

impl Rule for LogOfExpRule {
    fn name(&self) -> &'static str {
        "log_of_exp"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Exponential
    }

    fn applies_to(&self) -> &'static [NodeKind] {
        &[NodeKind::Function]
    }

    fn apply(&self, expr: &Expr, _context: &RuleContext) -> Option<Expr> {
        if let ExprKind::FunctionCall {
            func: Function::Log,
            arg,
        } = &expr.kind
        {
            if is_euler(arg) {
                return Some(Expr::number(1.0));
            }
            return exponential_argument(arg).map(|u| (**u).clone());
        }
        None
    }
}

/// Rule for exp(log(u)) = u and e^(log(u)) = u
pub(crate) struct ExpOfLogRule;

impl Rule for ExpOfLogRule {
    fn name(&self) -> &'static str {
        "exp_of_log"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Exponential
    }

    fn applies_to(&self) -> &'static [NodeKind] {
        &[NodeKind::Function, NodeKind::Pow]
    }

    fn apply(&self, expr: &Expr, _context: &RuleContext) -> Option<Expr> {
        let exponent = exponential_argument(expr)?;
        if let ExprKind::FunctionCall {
            func: Function::Log,
            arg,
        } = &exponent.kind
        {
            return Some((**arg).clone());
        }
        None
    }
}

/// Get all exponential rules
pub(crate) fn get_exponential_rules() -> Vec<Arc<dyn Rule>> {
    vec![Arc::new(LogOfExpRule), Arc::new(ExpOfLogRule)]
}
