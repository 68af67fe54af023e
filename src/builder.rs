//! Builder API for running one calculus operation on a function string
//!
//! Provides a fluent interface for configuring limits and the variable, then
//! running the whole pipeline: normalize, parse, compute, render, narrate.
//!
//! # Example
//! ```
//! use funcalc::builder::{Calculator, Operation, OperationRequest};
//!
//! let request = OperationRequest::new("x^2 + 2*x + 1", Operation::Derive);
//! let result = Calculator::new().run(&request).unwrap();
//! assert_eq!(result.result, "2*x + 2");
//! assert_eq!(result.function, "x**2 + 2*x + 1");
//! ```

use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::expr::Constant;
use crate::functions::Function;
use crate::integration::Integral;
use crate::narration::narrate;
use crate::simplification::engine::DEFAULT_MAX_ITERATIONS;
use crate::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, Expr, differentiate, evaluate_at, integrate, normalize,
    parse_with_limits, simplify_with_limit,
};

/// Variable used when a request names none
pub const DEFAULT_VARIABLE: &str = "x";

/// The four calculus operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Evaluate,
    Derive,
    Integrate,
    Simplify,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Evaluate => "evaluate",
            Operation::Derive => "derive",
            Operation::Integrate => "integrate",
            Operation::Simplify => "simplify",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One operation on one function string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub function: String,
    pub operation: Operation,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub variable: Option<String>,
}

impl OperationRequest {
    pub fn new(function: impl Into<String>, operation: Operation) -> Self {
        Self {
            function: function.into(),
            operation,
            value: None,
            variable: None,
        }
    }

    /// Value substituted by `evaluate`
    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }
}

/// Rendered outcome of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub operation: Operation,
    /// The input after normalization
    pub function: String,
    pub result: String,
    pub steps: Vec<String>,
    /// Absent when an integral stays unsolved
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub latex_result: Option<String>,
}

/// Computed value before rendering
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Expr(Expr),
    Integral(Integral),
}

impl Outcome {
    /// Text form; an unsolved integral explains its cause
    pub fn render(&self) -> String {
        match self {
            Outcome::Expr(e) | Outcome::Integral(Integral::Closed(e)) => e.to_string(),
            Outcome::Integral(Integral::Unsolved(reason)) => {
                format!("Integral could not be resolved symbolically: {reason}")
            }
        }
    }

    pub fn latex(&self) -> Option<String> {
        match self {
            Outcome::Expr(e) => Some(e.to_latex()),
            Outcome::Integral(Integral::Closed(e)) => Some(format!("{} + C", e.to_latex())),
            Outcome::Integral(Integral::Unsolved(_)) => None,
        }
    }
}

/// Builder for running operations with configurable limits
#[derive(Debug, Clone)]
pub struct Calculator {
    max_depth: usize,
    max_nodes: usize,
    max_iterations: usize,
    variable: Option<String>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            variable: None,
        }
    }
}

impl Calculator {
    /// Create a calculator with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum expression depth accepted by the parser
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set maximum node count accepted by the parser
    pub fn max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = nodes;
        self
    }

    /// Set the iteration cap of the `simplify` operation
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Variable used when a request does not name one
    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.variable = Some(name.into());
        self
    }

    /// Normalize and parse `input` under this calculator's limits
    ///
    /// Returns the normalized text along with the tree.
    pub fn parse(&self, input: &str) -> Result<(String, Expr), CalcError> {
        let normalized = normalize(input)?;
        let expr = parse_with_limits(&normalized, self.max_depth, self.max_nodes)?;
        Ok((normalized, expr))
    }

    /// Run the requested operation
    ///
    /// # Errors
    /// Input errors from normalization, parsing and variable validation,
    /// `MissingValue` for `evaluate` without a value, and `DivisionByZero`
    /// when evaluation meets a zero denominator. An integral without a
    /// closed form is not an error.
    pub fn run(&self, request: &OperationRequest) -> Result<OperationResult, CalcError> {
        let var = request
            .variable
            .as_deref()
            .or(self.variable.as_deref())
            .unwrap_or(DEFAULT_VARIABLE);
        validate_variable(var)?;

        let (normalized, expr) = self.parse(&request.function)?;
        debug!("{} '{}' with respect to {}", request.operation, normalized, var);

        let free = expr.free_symbols();
        if !free.is_empty() && !free.contains(var) {
            warn!(
                "variable '{}' does not appear in '{}' (free variables: {:?})",
                var, normalized, free
            );
        }

        let outcome = match request.operation {
            Operation::Evaluate => {
                let value = request.value.ok_or(CalcError::MissingValue)?;
                Outcome::Expr(evaluate_at(&expr, var, value)?)
            }
            Operation::Derive => Outcome::Expr(differentiate(&expr, var)),
            Operation::Integrate => Outcome::Integral(integrate(&expr, var)),
            Operation::Simplify => {
                Outcome::Expr(simplify_with_limit(expr.clone(), self.max_iterations))
            }
        };

        let steps = narrate(request.operation, &expr, &outcome, var, request.value);
        Ok(OperationResult {
            operation: request.operation,
            function: normalized,
            result: outcome.render(),
            steps,
            latex_result: outcome.latex(),
        })
    }
}

/// A variable is an ASCII identifier that names neither a function nor a constant
fn validate_variable(name: &str) -> Result<(), CalcError> {
    let mut chars = name.chars();
    let well_formed = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric());
    let reserved =
        name == "ln" || Function::from_name(name).is_some() || Constant::from_name(name).is_some();

    if well_formed && !reserved {
        Ok(())
    } else {
        Err(CalcError::InvalidVariable(name.to_string()))
    }
}
