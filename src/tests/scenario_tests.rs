//! End-to-end requests through the calculator, one per documented scenario

use crate::builder::{Calculator, Operation, OperationRequest};
use crate::{CalcError, ErrorKind};

fn run(function: &str, operation: Operation) -> Result<crate::OperationResult, CalcError> {
    Calculator::new().run(&OperationRequest::new(function, operation))
}

#[test]
fn test_evaluate_polynomial() {
    let request = OperationRequest::new("x^2 + 2*x + 1", Operation::Evaluate).value(3.0);
    let result = Calculator::new().run(&request).unwrap();
    assert_eq!(result.result, "16");
    assert_eq!(result.function, "x**2 + 2*x + 1");
}

#[test]
fn test_derive_product() {
    let result = run("sin(x)*cos(x)", Operation::Derive).unwrap();
    assert_eq!(result.result, "cos(x)^2 - sin(x)^2");
    assert_eq!(result.latex_result.as_deref(), Some(r"\cos\left(x\right)^{2} - \sin\left(x\right)^{2}"));
    // Trigonometric shape narrated between the original and the result
    assert_eq!(result.steps.len(), 3);
    assert!(result.steps[1].contains("trigonometric"));
}

#[test]
fn test_integrate_closed_forms() {
    let result = run("exp(x)", Operation::Integrate).unwrap();
    assert_eq!(result.result, "exp(x)");
    assert!(result.steps.last().unwrap().ends_with("exp(x) + C"));

    let result = run("1/x", Operation::Integrate).unwrap();
    assert_eq!(result.result, "log(|x|)");
    assert_eq!(result.latex_result.as_deref(), Some(r"\log\left(\left|x\right|\right) + C"));
}

#[test]
fn test_integrate_without_closed_form() {
    let result = run("sin(x^2)", Operation::Integrate).unwrap();
    assert!(result.result.contains("could not be resolved symbolically"));
    assert!(result.result.contains("no implemented integration method"));
    assert!(result.latex_result.is_none());
    assert!(result.steps.iter().all(|s| !s.contains("+ C")));
}

#[test]
fn test_evaluate_division_by_zero() {
    let request = OperationRequest::new("1/(x^2 - 1)", Operation::Evaluate).value(1.0);
    let err = Calculator::new().run(&request).unwrap_err();
    assert_eq!(err, CalcError::division_by_zero("x^2 - 1"));
    assert_eq!(err.kind(), ErrorKind::Domain);
    assert!(err.is_client_error());
}

#[test]
fn test_dangling_operator() {
    let err = run("x^", Operation::Derive).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(err.to_string().contains("'^'"), "message should name the fragment: {err}");

    let err = run("x**", Operation::Derive).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(err.to_string().contains("'**'"), "message should name the fragment: {err}");
}

#[test]
fn test_sum_with_zero_term() {
    let result = run("x + 0", Operation::Integrate).unwrap();
    assert_eq!(result.result, "x^2/2");
    let result = run("0", Operation::Integrate).unwrap();
    assert_eq!(result.result, "0");
}

#[test]
fn test_residual_evaluation() {
    let request = OperationRequest::new("x*y + x", Operation::Evaluate).value(2.0);
    let result = Calculator::new().run(&request).unwrap();
    assert_eq!(result.result, "2*y + 2");
}

#[test]
fn test_unsolved_causes_are_distinguished() {
    let no_method = run("x*exp(x)", Operation::Integrate).unwrap().result;
    let undefined = run("0^x", Operation::Integrate).unwrap().result;
    let zero_div = run("x/0", Operation::Integrate).unwrap().result;
    assert!(no_method.contains("no implemented integration method"));
    assert!(undefined.contains("does not converge or is undefined"));
    assert!(zero_div.contains("division by zero"));
}

#[test]
fn test_simplify_narration() {
    let result = run("x + x + 2*3", Operation::Simplify).unwrap();
    assert_eq!(result.result, "2*x + 6");
    assert_eq!(result.steps.first().unwrap(), "Original expression: f(x) = x + x + 2*3");
    assert_eq!(result.steps.last().unwrap(), "Result: 2*x + 6");
}

fn evaluate(function: &str, value: f64) -> Result<crate::OperationResult, CalcError> {
    Calculator::new().run(&OperationRequest::new(function, Operation::Evaluate).value(value))
}

fn as_f64(text: &str) -> f64 {
    text.parse().unwrap_or_else(|_| panic!("not a plain number: {text}"))
}

#[test]
fn test_small_but_nonzero_denominators() {
    let v = as_f64(&evaluate("1/x^2", 1e-6).unwrap().result);
    assert!((v - 1e12).abs() <= 1e-6 * 1e12, "{v}");
    let v = as_f64(&evaluate("1/x", 1e-11).unwrap().result);
    assert!((v - 1e11).abs() <= 1e-6 * 1e11, "{v}");
    assert!(evaluate("1/x", 0.0).is_err());
}

#[test]
fn test_small_values_render_as_decimals() {
    let result = evaluate("x", 1e-11).unwrap();
    assert_eq!(result.result, "0.00000000001");
    assert_eq!(result.steps[1], "Substitute x = 0.00000000001");
    assert_eq!(result.steps[2], "Result: f(0.00000000001) = 0.00000000001");
}

#[test]
fn test_small_coefficients_survive_simplify_and_derive() {
    let result = run("x/100000000000 + 1", Operation::Simplify).unwrap();
    assert_ne!(result.result, "1");
    assert!(result.result.contains("x/100000000000"), "{}", result.result);

    let derived = run("x^2/100000000000 + x", Operation::Derive).unwrap().result;
    assert_ne!(derived, "1");
    // 2*x/1e11 + 1 at x = 5e10
    let v = as_f64(&crate::evaluate_str(&derived, "x", 5e10).unwrap());
    assert!((v - 2.0).abs() < 1e-9, "{derived} gave {v}");
}

#[test]
fn test_symbolic_zero_denominator_is_reported() {
    let err = evaluate("y/(y - y)", 1.0).unwrap_err();
    assert_eq!(err, CalcError::division_by_zero("y - y"));
    assert!(err.is_client_error());
}

#[test]
fn test_unsolved_integral_does_not_claim_a_rule() {
    let result = run("x*exp(x)", Operation::Integrate).unwrap();
    assert!(result.steps.iter().all(|s| !s.starts_with("Use ")));
    assert!(result.steps[1].starts_with("Tried the exponential integration rules"));
}

#[test]
fn test_leading_unit_factor_hidden() {
    let result = run("1/3*x", Operation::Simplify).unwrap();
    assert_eq!(result.steps[0], "Original expression: f(x) = x/3");
    assert_eq!(result.result, "x/3");
}
