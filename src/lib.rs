//! Single-variable symbolic calculus
//!
//! Evaluate, differentiate, integrate and simplify function strings, with a
//! rendered result, a LaTeX form and step-by-step narration.
//!
//! # Features
//! - Normalizer for `^`/`**` power notation and the `ln` alias
//! - Pratt parser with explicit depth and size limits
//! - N-ary expression tree with structural hashing
//! - Rule-based simplifier that runs to a fixed point
//! - Integrator over a fixed rule table with explicit "unsolved" outcomes
//! - Optional HTTP daemon (`server` feature)
//!
//! # Usage Examples
//!
//! ## String API
//! ```
//! assert_eq!(funcalc::derive_str("sin(x)*cos(x)", "x").unwrap(), "cos(x)^2 - sin(x)^2");
//! assert_eq!(funcalc::evaluate_str("x^2 + 2*x + 1", "x", 3.0).unwrap(), "16");
//! ```
//!
//! ## Expression API
//! ```
//! use funcalc::{differentiate, integrate, parse, Integral};
//!
//! let expr = parse("x**2").unwrap();
//! assert_eq!(differentiate(&expr, "x").to_string(), "2*x");
//! match integrate(&expr, "x") {
//!     Integral::Closed(anti) => assert_eq!(anti.to_string(), "x^3/3"),
//!     Integral::Unsolved(reason) => panic!("{reason}"),
//! }
//! ```
//!
//! ## Requests with steps
//! ```
//! use funcalc::builder::{Calculator, Operation, OperationRequest};
//!
//! let request = OperationRequest::new("1/x", Operation::Integrate);
//! let result = Calculator::new().run(&request).unwrap();
//! assert_eq!(result.result, "log(|x|)");
//! assert_eq!(result.steps.last().unwrap(), "Result: ∫f(x) dx = log(|x|) + C");
//! ```

pub mod builder;
pub mod catalog;
mod differentiation;
mod display;
mod error;
mod evaluator;
mod expr;
pub mod functions;
mod integration;
pub mod narration;
mod normalizer;
mod parser;
mod simplification;
mod traits;
pub mod visitor;

#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod tests;

use std::sync::Once;

// Re-export key types for easier usage
pub use builder::{Calculator, Operation, OperationRequest, OperationResult};
pub use differentiation::differentiate;
pub use display::LatexFormatter;
pub use error::{CalcError, ErrorKind, Span};
pub use evaluator::{evaluate_at, substitute};
pub use expr::{Constant, Expr, ExprKind, expr_cmp, term_cmp};
pub use functions::Function;
pub use integration::{Integral, UnsolvedReason, integrate};
pub use normalizer::normalize;
pub use parser::{parse, parse_with_limits};
pub use simplification::{simplify, simplify_with_limit};

/// Default maximum expression depth
pub const DEFAULT_MAX_DEPTH: usize = 100;
/// Default maximum expression node count
pub const DEFAULT_MAX_NODES: usize = 10_000;

static LOGGER: Once = Once::new();

/// Install `env_logger` once, filtered by `RUST_LOG` (default `info`)
///
/// Safe to call repeatedly; later calls do nothing.
pub fn init_logger() {
    LOGGER.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        // Another logger may already be installed by the host program
        let _ = env_logger::Builder::from_env(env).try_init();
    });
}

fn run_str(request: OperationRequest) -> Result<String, CalcError> {
    Calculator::new().run(&request).map(|r| r.result)
}

/// Evaluate `formula` at `var = value`
///
/// # Example
/// ```
/// assert_eq!(funcalc::evaluate_str("1/x", "x", 4.0).unwrap(), "0.25");
/// assert!(funcalc::evaluate_str("1/(x^2 - 1)", "x", 1.0).is_err());
/// ```
pub fn evaluate_str(formula: &str, var: &str, value: f64) -> Result<String, CalcError> {
    run_str(OperationRequest::new(formula, Operation::Evaluate).variable(var).value(value))
}

/// Differentiate `formula` with respect to `var`
pub fn derive_str(formula: &str, var: &str) -> Result<String, CalcError> {
    run_str(OperationRequest::new(formula, Operation::Derive).variable(var))
}

/// Integrate `formula` with respect to `var`
///
/// An integral without a closed form is `Ok` with text naming the cause.
///
/// # Example
/// ```
/// let text = funcalc::integrate_str("sin(x^2)", "x").unwrap();
/// assert!(text.starts_with("Integral could not be resolved symbolically"));
/// ```
pub fn integrate_str(formula: &str, var: &str) -> Result<String, CalcError> {
    run_str(OperationRequest::new(formula, Operation::Integrate).variable(var))
}

/// Simplify `formula`
pub fn simplify_str(formula: &str) -> Result<String, CalcError> {
    run_str(OperationRequest::new(formula, Operation::Simplify))
}
