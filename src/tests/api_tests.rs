use crate::visitor::{ExprVisitor, walk_expr};
use crate::{
    CalcError, Constant, Expr, Function, Integral, LatexFormatter, derive_str, differentiate,
    evaluate_str, init_logger, integrate, integrate_str, normalize, parse, simplify, simplify_str,
};

#[test]
fn test_string_api() {
    assert_eq!(derive_str("x^3", "x").unwrap(), "3*x^2");
    assert_eq!(derive_str("t^2 + t", "t").unwrap(), "2*t + 1");
    assert_eq!(evaluate_str("sqrt(x)", "x", 9.0).unwrap(), "3");
    assert_eq!(integrate_str("cos(x)", "x").unwrap(), "sin(x)");
    assert_eq!(simplify_str("x*1 + 0").unwrap(), "x");
}

#[test]
fn test_string_api_errors() {
    assert_eq!(derive_str("", "x"), Err(CalcError::EmptyExpression));
    assert_eq!(derive_str("x", "sin"), Err(CalcError::InvalidVariable("sin".to_string())));
    assert!(matches!(
        simplify_str("x $ 2"),
        Err(CalcError::InvalidCharacters { .. })
    ));
    assert!(matches!(
        simplify_str("(x + 1"),
        Err(CalcError::UnbalancedParentheses { .. })
    ));
    assert!(matches!(
        simplify_str("sin x"),
        Err(CalcError::MissingFunctionArguments { .. })
    ));
}

#[test]
fn test_operator_construction() {
    let x = Expr::symbol("x");
    let built = x.clone().pow_of(2.0) + Expr::number(2.0) * x.clone() + Expr::number(1.0);
    assert_eq!(built, parse("x**2 + 2*x + 1").unwrap());
    assert_eq!(differentiate(&built, "x").to_string(), "2*x + 2");
}

#[test]
fn test_expression_round_trip_through_tree_api() {
    let expr = parse("exp(2*x) + pi").unwrap();
    let Integral::Closed(anti) = integrate(&expr, "x") else {
        panic!("should integrate");
    };
    // pi integrates to pi*x
    assert!(anti.contains_any_function(&[Function::Exp]));
    assert!(anti.free_symbols().contains("x"));
    assert_eq!(simplify(differentiate(&anti, "x")), simplify(expr));
}

#[test]
fn test_visitor_collects_functions() {
    struct Functions(Vec<Function>);

    impl ExprVisitor for Functions {
        fn visit_function(&mut self, func: Function, _arg: &Expr) -> bool {
            self.0.push(func);
            true
        }
    }

    let expr = parse("sin(cos(x)) + log(x)").unwrap();
    let mut v = Functions(Vec::new());
    walk_expr(&expr, &mut v);
    v.0.sort();
    assert_eq!(v.0, vec![Function::Sin, Function::Cos, Function::Log]);
}

#[test]
fn test_constants_and_latex() {
    let expr = parse("pi*x**2").unwrap();
    assert!(matches!(
        parse("e").unwrap().kind(),
        crate::ExprKind::Constant(Constant::E)
    ));
    let latex = LatexFormatter { expr: &expr }.to_string();
    assert_eq!(latex, expr.to_latex());
    assert!(latex.contains(r"\pi"));
    assert_eq!(parse("sqrt(x)/2").unwrap().to_latex(), r"\frac{\sqrt{x}}{2}");
}

#[test]
fn test_normalize_then_parse() {
    let text = normalize("ln(x)^2").unwrap();
    assert_eq!(text, "log(x)**2");
    assert_eq!(parse(&text).unwrap(), Expr::symbol("x").log().pow_of(2.0));
}

#[test]
fn test_init_logger_is_repeatable() {
    init_logger();
    init_logger();
}
