//! Parser module - converts normalized text to an expression tree
//!
//! Grammar, loosest to tightest binding:
//! `+ -` (left), `* /` (left), unary `-`, `**` (right), atoms.
//! Atoms are numbers, variables, the constants `pi` and `e`, parenthesized
//! expressions and calls `f(arg)` of the built-in functions. There is no
//! implicit multiplication: `2x` and `x y` are rejected.
mod lexer;
mod pratt;
mod tokens;

use log::debug;

use crate::error::CalcError;
use crate::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, Expr};

/// Parse normalized text into an expression tree
///
/// The input is expected to come from [`normalize`](crate::normalize): power
/// is written `**` and `ln` has already become `log`.
///
/// # Example
/// ```
/// use funcalc::{parse, Expr};
///
/// let expr = parse("x**2 + sin(x)").unwrap();
/// assert_eq!(expr, Expr::symbol("x").pow_of(2.0) + Expr::symbol("x").sin());
/// ```
///
/// # Errors
/// Returns `CalcError` if:
/// - The input is empty or contains characters the lexer does not know
/// - Parentheses are unbalanced or a function is used without `(`
/// - A function call has an empty argument or more than one argument
/// - Tokens remain after a complete expression
/// - Nesting exceeds the default depth limit or the tree is too large
pub fn parse(input: &str) -> Result<Expr, CalcError> {
    parse_with_limits(input, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES)
}

/// Parse with explicit nesting and size limits
///
/// # Errors
/// Same as [`parse`]; `MaxDepthExceeded` / `MaxNodesExceeded` use the given limits.
pub fn parse_with_limits(
    input: &str,
    max_depth: usize,
    max_nodes: usize,
) -> Result<Expr, CalcError> {
    if input.trim().is_empty() {
        return Err(CalcError::EmptyExpression);
    }

    // Pipeline: lex -> parse -> size checks
    let tokens = lexer::lex(input)?;
    let expr = pratt::parse_expression(&tokens, input, max_depth)?;

    if expr.depth() > max_depth {
        return Err(CalcError::MaxDepthExceeded);
    }
    if expr.node_count() > max_nodes {
        return Err(CalcError::MaxNodesExceeded);
    }

    debug!("parsed '{}' into {} nodes", input, expr.node_count());
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Span;
    use crate::expr::{Constant, ExprKind};

    fn x() -> Expr {
        Expr::symbol("x")
    }

    #[test]
    fn test_precedence() {
        // 1 + 2*x**2 = 1 + (2 * (x**2))
        let e = parse("1 + 2*x**2").unwrap();
        let expected = Expr::number(1.0) + Expr::number(2.0) * x().pow_of(2.0);
        assert_eq!(e, expected);
    }

    #[test]
    fn test_power_right_associative() {
        let e = parse("x**2**3").unwrap();
        let expected = Expr::pow(x(), Expr::pow(Expr::number(2.0), Expr::number(3.0)));
        assert_eq!(e, expected);
    }

    #[test]
    fn test_unary_minus_below_power() {
        // -x**2 = -(x**2)
        let e = parse("-x**2").unwrap();
        assert_eq!(e, Expr::negate(x().pow_of(2.0)));
        // 2*-x is accepted
        assert_eq!(parse("2*-x").unwrap(), Expr::number(2.0) * Expr::negate(x()));
    }

    #[test]
    fn test_subtraction_and_division_shapes() {
        let e = parse("x - y").unwrap();
        assert!(matches!(e.kind(), ExprKind::Sum(_)));
        let e = parse("x / y").unwrap();
        assert_eq!(e, Expr::product(vec![x(), Expr::recip(Expr::symbol("y"))]));
    }

    #[test]
    fn test_constants_and_exp() {
        assert_eq!(parse("e").unwrap(), Expr::constant(Constant::E));
        assert_eq!(parse("pi").unwrap(), Expr::constant(Constant::Pi));
        assert_eq!(parse("exp(x)").unwrap(), x().exp());
        assert_eq!(
            parse("e**x").unwrap(),
            Expr::pow(Expr::constant(Constant::E), x())
        );
        // Identifiers that merely start with e are variables
        assert_eq!(parse("ex").unwrap(), Expr::symbol("ex"));
    }

    #[test]
    fn test_function_errors() {
        assert!(matches!(
            parse("sin x"),
            Err(CalcError::MissingFunctionArguments { .. })
        ));
        assert!(matches!(
            parse("sin()"),
            Err(CalcError::EmptyArgument { .. })
        ));
        assert!(matches!(
            parse("log(x, 2)"),
            Err(CalcError::TooManyArguments { .. })
        ));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        match parse("(x + 1") {
            Err(CalcError::UnbalancedParentheses { fragment, span }) => {
                assert_eq!(fragment, "(x + 1");
                assert_eq!(span, Span::new(0, 6));
            }
            other => panic!("expected unbalanced parentheses, got {:?}", other),
        }
        match parse("x + 1)") {
            Err(CalcError::UnbalancedParentheses { fragment, .. }) => assert_eq!(fragment, ")"),
            other => panic!("expected unbalanced parentheses, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_input() {
        match parse("2 x") {
            Err(CalcError::TrailingInput { fragment, .. }) => assert_eq!(fragment, "x"),
            other => panic!("expected trailing input, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_operator() {
        match parse("x**") {
            Err(CalcError::UnexpectedEndOfInput { after }) => assert_eq!(after, "**"),
            other => panic!("expected end of input, got {:?}", other),
        }
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}x{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(parse(&deep), Err(CalcError::MaxDepthExceeded));
        let shallow = format!("{}x{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(parse(&shallow).unwrap(), x());
    }

    #[test]
    fn test_node_limit() {
        let long = vec!["x"; 50].join(" + ");
        assert_eq!(
            parse_with_limits(&long, 100, 10),
            Err(CalcError::MaxNodesExceeded)
        );
    }
}
