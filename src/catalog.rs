//! Sample inputs grouped by family, served by `GET /examples`

use serde::Serialize;

/// Static example functions, one list per family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Examples {
    pub polynomials: &'static [&'static str],
    pub trigonometric: &'static [&'static str],
    pub exponential: &'static [&'static str],
    pub logarithmic: &'static [&'static str],
    pub rational: &'static [&'static str],
}

pub const EXAMPLES: Examples = Examples {
    polynomials: &["x^2 + 2*x + 1", "3*x^3 - 2*x^2 + x - 5", "x^4 - 16"],
    trigonometric: &["sin(x)", "cos(x)^2", "sin(x)*cos(x)", "tan(x)"],
    exponential: &["exp(x)", "2^x", "x*exp(x)", "exp(-x^2)"],
    logarithmic: &["log(x)", "x*log(x)", "log(x^2 + 1)"],
    rational: &["1/(x^2 + 1)", "x/(x^2 - 4)", "(x^2 + 1)/(x - 1)"],
};

impl Examples {
    /// Every example, family by family
    pub fn all(&self) -> impl Iterator<Item = &'static str> {
        [
            self.polynomials,
            self.trigonometric,
            self.exponential,
            self.logarithmic,
            self.rational,
        ]
        .into_iter()
        .flatten()
        .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Calculator, Operation, OperationRequest};

    #[test]
    fn test_every_example_runs() {
        let calc = Calculator::new();
        for function in EXAMPLES.all() {
            for operation in [Operation::Derive, Operation::Integrate, Operation::Simplify] {
                let request = OperationRequest::new(function, operation);
                assert!(calc.run(&request).is_ok(), "{operation} '{function}' failed");
            }
            let request = OperationRequest::new(function, Operation::Evaluate).value(3.0);
            assert!(calc.run(&request).is_ok(), "evaluate '{function}' failed");
        }
    }

    #[test]
    fn test_serializes_by_family() {
        let json = serde_json::to_value(EXAMPLES).unwrap();
        assert_eq!(json["rational"][2], "(x^2 + 1)/(x - 1)");
        assert_eq!(json.as_object().map(|o| o.len()), Some(5));
    }
}
