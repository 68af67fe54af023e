//! Step-by-step explanations of an operation
//!
//! Every narration starts with the original expression and ends with the
//! result. For `derive` and `integrate` exactly one line in between names the
//! rule family, picked from an ordered table of shape predicates: the first
//! matching shape wins even when several apply. An unsolved integral only
//! reports the family as tried.

use std::fmt;

use crate::builder::{Operation, Outcome};
use crate::functions::Function;
use crate::integration::Integral;
use crate::Expr;

/// Structural family of an expression, used to pick the explanatory line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Polynomial,
    Trigonometric,
    Exponential,
    Logarithmic,
}

type ShapePredicate = fn(&Expr, &str) -> bool;

/// Checked top to bottom; the first match is narrated
const SHAPES: [(Shape, ShapePredicate); 4] = [
    (Shape::Polynomial, |e, var| e.is_polynomial_in(var)),
    (Shape::Trigonometric, |e, _| {
        e.contains_any_function(&[Function::Sin, Function::Cos, Function::Tan])
    }),
    (Shape::Exponential, |e, var| e.contains_exponential(var)),
    (Shape::Logarithmic, |e, _| e.contains_any_function(&[Function::Log])),
];

impl Shape {
    /// The first shape in table order that `expr` has, if any
    pub fn classify(expr: &Expr, var: &str) -> Option<Shape> {
        SHAPES
            .iter()
            .find(|(_, matches)| matches(expr, var))
            .map(|(shape, _)| *shape)
    }

    fn derivative_rule(self, var: &str) -> String {
        match self {
            Shape::Polynomial => format!(
                "Apply the power rule to each term: d/d{var}({var}^n) = n*{var}^(n-1)"
            ),
            Shape::Trigonometric => format!(
                "Apply the trigonometric derivatives with the chain rule: \
                 d/d{var} sin(u) = cos(u)*u', d/d{var} cos(u) = -sin(u)*u', \
                 d/d{var} tan(u) = u'/cos(u)^2"
            ),
            Shape::Exponential => format!(
                "Apply the exponential rule with the chain rule: d/d{var} exp(u) = exp(u)*u'"
            ),
            Shape::Logarithmic => format!(
                "Apply the logarithm rule with the chain rule: d/d{var} log(u) = u'/u"
            ),
        }
    }

    fn integral_rule(self, var: &str) -> String {
        match self {
            Shape::Polynomial => format!(
                "Apply the power rule for integration: ∫{var}^n d{var} = {var}^(n+1)/(n+1), n ≠ -1"
            ),
            Shape::Trigonometric => format!(
                "Use the standard trigonometric integrals: ∫sin({var}) d{var} = -cos({var}), \
                 ∫cos({var}) d{var} = sin({var})"
            ),
            Shape::Exponential => {
                format!("Use the exponential integral: ∫exp({var}) d{var} = exp({var})")
            }
            Shape::Logarithmic => format!(
                "Use the logarithmic integrals: ∫1/{var} d{var} = log(|{var}|), \
                 ∫log({var}) d{var} = {var}*log({var}) - {var}"
            ),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Polynomial => "polynomial",
            Shape::Trigonometric => "trigonometric",
            Shape::Exponential => "exponential",
            Shape::Logarithmic => "logarithmic",
        };
        f.write_str(name)
    }
}

/// Explain how `outcome` was obtained from `original`
pub fn narrate(
    operation: Operation,
    original: &Expr,
    outcome: &Outcome,
    var: &str,
    value: Option<f64>,
) -> Vec<String> {
    let mut steps = vec![format!("Original expression: f({var}) = {original}")];

    match (operation, outcome) {
        (Operation::Evaluate, Outcome::Expr(result)) => {
            let at = value.map_or_else(|| var.to_string(), |v| Expr::number(v).to_string());
            steps.push(format!("Substitute {var} = {at}"));
            if result.as_number().is_none() {
                steps.push(format!(
                    "The expression depends on variables other than {var}; the simplified form is returned"
                ));
            }
            steps.push(format!("Result: f({at}) = {result}"));
        }

        (Operation::Derive, Outcome::Expr(result)) => {
            if let Some(shape) = Shape::classify(original, var) {
                steps.push(shape.derivative_rule(var));
            }
            steps.push(format!("Result: f'({var}) = {result}"));
        }

        (Operation::Integrate, Outcome::Integral(integral)) => {
            let shape = Shape::classify(original, var);
            match integral {
                Integral::Closed(result) => {
                    if let Some(shape) = shape {
                        steps.push(shape.integral_rule(var));
                    }
                    steps.push(format!("Result: ∫f({var}) d{var} = {result} + C"));
                }
                Integral::Unsolved(reason) => {
                    if let Some(shape) = shape {
                        steps.push(format!(
                            "Tried the {shape} integration rules; none of them applies"
                        ));
                    }
                    steps.push(format!(
                        "The integral could not be resolved symbolically: {reason}"
                    ));
                    steps.push(format!(
                        "Result: ∫f({var}) d{var} has no closed form in the supported functions"
                    ));
                }
            }
        }

        (Operation::Simplify, Outcome::Expr(result)) => {
            if result == original {
                steps.push("The expression is already in simplest form".to_string());
            } else {
                steps.push(
                    "Fold constants, collect like terms and combine powers".to_string(),
                );
            }
            steps.push(format!("Result: {result}"));
        }

        // Operation and outcome always come from the same dispatch
        (_, Outcome::Expr(result)) => steps.push(format!("Result: {result}")),
        (_, Outcome::Integral(integral)) => {
            if let Some(result) = integral.expr() {
                steps.push(format!("Result: {result}"));
            }
        }
    }

    steps
}
