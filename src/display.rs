//! Display implementations for expressions.
//!
//! This module provides two output formats:
//!
//! ## Standard Display (`to_string()` / `{}`)
//! Plain text that [`normalize`](crate::normalize) and [`parse`](crate::parse)
//! read back (except `|u|`, which is how `abs(u)` is shown):
//! - `x^2 + 2*x + 1`
//! - `cos(x)^2 - sin(x)^2`
//! - `x^3/3`, `log(|x|)`
//!
//! ## LaTeX Format (`to_latex()`)
//! For typesetting:
//! - `x^{2} + 2x + 1`
//! - `\frac{x^{3}}{3}`, `\log\left(\left|x\right|\right)`
//!
//! # Display Behavior Notes for N-ary AST
//! - Sum displays terms with +/- signs based on leading coefficients
//! - Product factors with negative numeric exponents go to the denominator;
//!   several denominators are grouped: `1/(2*sqrt(x))`
//! - A leading fractional coefficient `p/q` is split across numerator and denominator

use std::fmt;
use std::sync::Arc;

use crate::expr::{Constant, Expr, ExprKind};
use crate::functions::Function;
use crate::traits::{as_fraction, is_integer, is_one};

// =============================================================================
// HELPER TYPES & FUNCTIONS
// =============================================================================

/// Internal display mode to consolidate redundant formatting logic
#[derive(Clone, Copy, PartialEq, Eq)]
enum FormatMode {
    Standard,
    Latex,
}

/// Context for deciding whether parentheses are needed
#[derive(Clone, Copy)]
enum ParenContext {
    /// Term of a sum, or numerator factor of a product
    Factor,
    /// Factor after `/`
    Denominator,
    /// Base of a power
    PowerBase,
}

/// A standalone number is shown as `p/q` when its decimal form is long
fn standalone_fraction(n: f64) -> Option<(i64, i64)> {
    if n.to_string().len() > 8 {
        as_fraction(n)
    } else {
        None
    }
}

/// Check if an expression is negative (has a negative leading coefficient)
/// Returns `Some(positive_equivalent)` if the expression has a negative sign
fn extract_negative(expr: &Expr) -> Option<Expr> {
    match &expr.kind {
        ExprKind::Product(factors) => {
            if let Some(first) = factors.first()
                && let ExprKind::Number(n) = first.kind
                && n < 0.0
            {
                if is_one(-n) {
                    // Exactly -1: just remove it
                    return Some(Expr::product_from_arcs(factors[1..].to_vec()));
                }
                // Other negative coefficient like -2, -3.5: replace with positive
                let mut new_factors: Vec<Arc<Expr>> = Vec::with_capacity(factors.len());
                new_factors.push(Arc::new(Expr::number(-n)));
                new_factors.extend_from_slice(&factors[1..]);
                return Some(Expr::product_from_arcs(new_factors));
            }
            None
        }
        ExprKind::Number(n) if *n < 0.0 => Some(Expr::number(-*n)),
        _ => None,
    }
}

fn needs_parens(expr: &Expr, context: ParenContext) -> bool {
    match (&expr.kind, context) {
        (ExprKind::Sum(_), _) => true,
        (ExprKind::Product(_), ParenContext::Denominator | ParenContext::PowerBase) => true,
        (ExprKind::Pow(_, _), ParenContext::PowerBase) => true,
        (ExprKind::Pow(_, exp), ParenContext::Denominator) => {
            // b^-n is itself shown as a quotient
            exp.as_number().is_some_and(|n| n < 0.0)
        }
        (ExprKind::Number(n), ParenContext::PowerBase | ParenContext::Denominator) => {
            *n < 0.0 || standalone_fraction(*n).is_some()
        }
        _ => false,
    }
}

/// Consolidated parenthesis wrapping logic
fn format_wrapped(
    f: &mut fmt::Formatter<'_>,
    expr: &Expr,
    mode: FormatMode,
    context: ParenContext,
) -> fmt::Result {
    if needs_parens(expr, context) {
        let (open, close) = match mode {
            FormatMode::Standard => ("(", ")"),
            FormatMode::Latex => (r"\left(", r"\right)"),
        };
        write!(f, "{open}")?;
        format_expr(f, expr, mode)?;
        write!(f, "{close}")
    } else {
        format_expr(f, expr, mode)
    }
}

fn format_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, mode: FormatMode) -> fmt::Result {
    match &expr.kind {
        ExprKind::Number(n) => format_number_expr(f, *n, mode),
        ExprKind::Symbol(s) => write!(f, "{s}"),
        ExprKind::Constant(c) => match (c, mode) {
            (Constant::Pi, FormatMode::Latex) => write!(f, r"\pi"),
            _ => write!(f, "{}", c.name()),
        },
        ExprKind::Sum(terms) => format_sum_expr(f, terms, mode),
        ExprKind::Product(factors) => format_product_expr(f, factors, mode),
        ExprKind::Pow(base, exp) => format_pow_expr(f, base, exp, mode),
        ExprKind::FunctionCall { func, arg } => format_function_call_expr(f, *func, arg, mode),
    }
}

/// Format a number based on the display mode
fn format_number_expr(f: &mut fmt::Formatter<'_>, n: f64, mode: FormatMode) -> fmt::Result {
    if n.is_nan() {
        return match mode {
            FormatMode::Standard => write!(f, "NaN"),
            FormatMode::Latex => write!(f, r"\text{{NaN}}"),
        };
    }
    if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        return match mode {
            FormatMode::Standard => write!(f, "{sign}Infinity"),
            FormatMode::Latex => write!(f, r"{sign}\infty"),
        };
    }

    if is_integer(n) {
        #[allow(clippy::cast_possible_truncation)]
        let n_int = n as i64;
        return write!(f, "{n_int}");
    }

    if let Some((p, q)) = standalone_fraction(n) {
        return match mode {
            FormatMode::Standard => write!(f, "{p}/{q}"),
            FormatMode::Latex if p < 0 => write!(f, r"-\frac{{{}}}{{{q}}}", -p),
            FormatMode::Latex => write!(f, r"\frac{{{p}}}{{{q}}}"),
        };
    }
    write!(f, "{n}")
}

/// Unified Sum formatting
fn format_sum_expr(f: &mut fmt::Formatter<'_>, terms: &[Arc<Expr>], mode: FormatMode) -> fmt::Result {
    if terms.is_empty() {
        return write!(f, "0");
    }

    for (i, term) in terms.iter().enumerate() {
        match (i, extract_negative(term)) {
            (0, Some(positive_term)) => {
                write!(f, "-")?;
                format_wrapped(f, &positive_term, mode, ParenContext::Factor)?;
            }
            (0, None) => format_wrapped(f, term, mode, ParenContext::Factor)?,
            (_, Some(positive_term)) => {
                write!(f, " - ")?;
                format_wrapped(f, &positive_term, mode, ParenContext::Factor)?;
            }
            (_, None) => {
                write!(f, " + ")?;
                format_wrapped(f, term, mode, ParenContext::Factor)?;
            }
        }
    }
    Ok(())
}

/// Unified Product formatting
fn format_product_expr(
    f: &mut fmt::Formatter<'_>,
    factors: &[Arc<Expr>],
    mode: FormatMode,
) -> fmt::Result {
    if factors.is_empty() {
        return write!(f, "1");
    }

    // Leading negative coefficient: print "-" then the positive rest
    if let Some(positive) = extract_negative_product(factors) {
        write!(f, "-")?;
        return match &positive.kind {
            ExprKind::Product(rest) => format_product_body(f, rest, mode),
            _ => format_wrapped(f, &positive, mode, ParenContext::Factor),
        };
    }

    format_product_body(f, factors, mode)
}

fn extract_negative_product(factors: &[Arc<Expr>]) -> Option<Expr> {
    let first = factors.first()?;
    match first.kind {
        ExprKind::Number(n) if n < 0.0 && factors.len() > 1 => {
            let product = Expr::product_from_arcs(factors.to_vec());
            extract_negative(&product)
        }
        _ => None,
    }
}

/// Split product factors into numerator and denominator parts
fn split_fraction(factors: &[Arc<Expr>]) -> (Vec<Expr>, Vec<Expr>) {
    let mut numer = Vec::with_capacity(factors.len());
    let mut denom = Vec::new();

    for (i, fac) in factors.iter().enumerate() {
        match &fac.kind {
            // `1/3*x` is read as `1 * 3^-1 * x`
            ExprKind::Number(c) if *c == 1.0 && factors.len() > 1 => {}
            ExprKind::Number(c) if i == 0 && *c > 0.0 => {
                if let Some((p, q)) = as_fraction(*c) {
                    if p != 1 {
                        numer.push(Expr::number(p as f64));
                    }
                    denom.push(Expr::number(q as f64));
                } else {
                    numer.push((**fac).clone());
                }
            }
            ExprKind::Pow(base, exp) if exp.as_number().is_some_and(|n| n < 0.0) => {
                let n = exp.as_number().unwrap_or(-1.0);
                if is_one(-n) {
                    denom.push((**base).clone());
                } else {
                    denom.push(Expr::pow((**base).clone(), Expr::number(-n)));
                }
            }
            _ => numer.push((**fac).clone()),
        }
    }
    (numer, denom)
}

fn format_product_body(
    f: &mut fmt::Formatter<'_>,
    factors: &[Arc<Expr>],
    mode: FormatMode,
) -> fmt::Result {
    let (numer, denom) = split_fraction(factors);

    match mode {
        FormatMode::Standard => {
            format_factor_list(f, &numer, mode)?;
            match denom.as_slice() {
                [] => Ok(()),
                [single] => {
                    write!(f, "/")?;
                    format_wrapped(f, single, mode, ParenContext::Denominator)
                }
                several => {
                    write!(f, "/(")?;
                    format_factor_list(f, several, mode)?;
                    write!(f, ")")
                }
            }
        }
        FormatMode::Latex => {
            if denom.is_empty() {
                return format_factor_list(f, &numer, mode);
            }
            write!(f, r"\frac{{")?;
            format_factor_list(f, &numer, mode)?;
            write!(f, "}}{{")?;
            format_factor_list(f, &denom, mode)?;
            write!(f, "}}")
        }
    }
}

/// Factors joined by `*` (text) or `\cdot` (LaTeX, implicit after a coefficient).
/// A `-1` factor followed by another factor is written as a bare sign.
fn format_factor_list(f: &mut fmt::Formatter<'_>, factors: &[Expr], mode: FormatMode) -> fmt::Result {
    if factors.is_empty() {
        return write!(f, "1");
    }
    let mut after_sign = false;
    for (i, fac) in factors.iter().enumerate() {
        if i > 0 && !after_sign {
            match mode {
                FormatMode::Standard => write!(f, "*")?,
                FormatMode::Latex => {
                    let after_coefficient = i == 1 && factors[0].as_number().is_some();
                    if !(after_coefficient && fac.as_number().is_none()) {
                        write!(f, r" \cdot ")?;
                    }
                }
            }
        }
        after_sign = false;

        let number = fac.as_number();
        if number == Some(-1.0) && i + 1 < factors.len() {
            write!(f, "-")?;
            after_sign = true;
        } else if i > 0 && number.is_some_and(|n| n < 0.0) {
            write!(f, "(")?;
            format_expr(f, fac, mode)?;
            write!(f, ")")?;
        } else {
            format_wrapped(f, fac, mode, ParenContext::Factor)?;
        }
    }
    Ok(())
}

/// Unified Power formatting
fn format_pow_expr(f: &mut fmt::Formatter<'_>, base: &Expr, exp: &Expr, mode: FormatMode) -> fmt::Result {
    // b^-n is shown as 1/b^n
    if let Some(n) = exp.as_number()
        && n < 0.0
    {
        let positive = if is_one(-n) {
            base.clone()
        } else {
            Expr::pow(base.clone(), Expr::number(-n))
        };
        return match mode {
            FormatMode::Standard => {
                write!(f, "1/")?;
                format_wrapped(f, &positive, mode, ParenContext::Denominator)
            }
            FormatMode::Latex => {
                write!(f, r"\frac{{1}}{{")?;
                format_expr(f, &positive, mode)?;
                write!(f, "}}")
            }
        };
    }

    format_wrapped(f, base, mode, ParenContext::PowerBase)?;

    match mode {
        FormatMode::Latex => {
            write!(f, "^{{")?;
            format_expr(f, exp, mode)?;
            write!(f, "}}")
        }
        FormatMode::Standard => {
            let exp_simple = match &exp.kind {
                ExprKind::Number(n) => *n >= 0.0 && standalone_fraction(*n).is_none(),
                ExprKind::Symbol(_) | ExprKind::Constant(_) | ExprKind::FunctionCall { .. } => true,
                _ => false,
            };
            if exp_simple {
                write!(f, "^")?;
                format_expr(f, exp, mode)
            } else {
                write!(f, "^(")?;
                format_expr(f, exp, mode)?;
                write!(f, ")")
            }
        }
    }
}

/// Unified Function Call formatting
fn format_function_call_expr(
    f: &mut fmt::Formatter<'_>,
    func: Function,
    arg: &Expr,
    mode: FormatMode,
) -> fmt::Result {
    match (mode, func) {
        (FormatMode::Standard, Function::Abs) => {
            write!(f, "|")?;
            format_expr(f, arg, mode)?;
            write!(f, "|")
        }
        (FormatMode::Standard, _) => {
            write!(f, "{}(", func.name())?;
            format_expr(f, arg, mode)?;
            write!(f, ")")
        }
        (FormatMode::Latex, Function::Abs) => {
            write!(f, r"\left|")?;
            format_expr(f, arg, mode)?;
            write!(f, r"\right|")
        }
        (FormatMode::Latex, Function::Sqrt) => {
            write!(f, r"\sqrt{{")?;
            format_expr(f, arg, mode)?;
            write!(f, "}}")
        }
        (FormatMode::Latex, Function::Exp) => {
            write!(f, "e^{{")?;
            format_expr(f, arg, mode)?;
            write!(f, "}}")
        }
        (FormatMode::Latex, _) => {
            write!(f, r"\{}\left(", func.name())?;
            format_expr(f, arg, mode)?;
            write!(f, r"\right)")
        }
    }
}

// =============================================================================
// DISPLAY IMPLEMENTATION
// =============================================================================

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_expr(f, self, FormatMode::Standard)
    }
}

// =============================================================================
// LATEX FORMATTER
// =============================================================================

pub struct LatexFormatter<'expr> {
    pub(crate) expr: &'expr Expr,
}

impl fmt::Display for LatexFormatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_expr(f, self.expr, FormatMode::Latex)
    }
}

impl Expr {
    /// Convert the expression to LaTeX format.
    ///
    /// Returns a string suitable for rendering in LaTeX math environments.
    pub fn to_latex(&self) -> String {
        LatexFormatter { expr: self }.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::symbol("x")
    }

    #[test]
    fn test_display_number() {
        assert_eq!(Expr::number(3.0).to_string(), "3");
        assert_eq!(Expr::number(-2.0).to_string(), "-2");
        assert_eq!(Expr::number(0.25).to_string(), "0.25");
        assert_eq!(Expr::number(1.0 / 3.0).to_string(), "1/3");
        assert_eq!(Expr::number(f64::INFINITY).to_string(), "Infinity");
    }

    #[test]
    fn test_display_sum_signs() {
        let e = Expr::sum(vec![
            x().pow_of(2.0),
            Expr::product(vec![Expr::number(-2.0), x()]),
            Expr::number(-1.0),
        ]);
        assert_eq!(e.to_string(), "x^2 - 2*x - 1");
        let e = Expr::sum(vec![Expr::negate(x()), Expr::number(1.0)]);
        assert_eq!(e.to_string(), "-x + 1");
    }

    #[test]
    fn test_display_quotients() {
        assert_eq!(Expr::recip(x()).to_string(), "1/x");
        assert_eq!(Expr::div_expr(x(), Expr::symbol("y")).to_string(), "x/y");
        let third = Expr::product(vec![Expr::number(1.0 / 3.0), x().pow_of(3.0)]);
        assert_eq!(third.to_string(), "x^3/3");
        let two_thirds = Expr::product(vec![Expr::number(2.0 / 3.0), x()]);
        assert_eq!(two_thirds.to_string(), "2*x/3");
        let half = Expr::product(vec![Expr::number(0.5), Expr::recip(x().sqrt())]);
        assert_eq!(half.to_string(), "1/(2*sqrt(x))");
        let sum_over = Expr::div_expr(x() + Expr::number(1.0), x() - Expr::number(1.0));
        assert_eq!(sum_over.to_string(), "(x + 1)/(x - 1)");
    }

    #[test]
    fn test_display_small_magnitudes() {
        assert_eq!(Expr::number(1e-11).to_string(), "0.00000000001");
        assert_eq!(Expr::number(-3e-4).to_string(), "-0.0003");
        let scaled = Expr::product(vec![Expr::number(2e-11), x()]);
        assert_eq!(scaled.to_string(), "0.00000000002*x");
        assert!(!scaled.to_latex().contains("frac"));
    }

    #[test]
    fn test_display_drops_unit_factor() {
        let third = Expr::product(vec![Expr::number(1.0), Expr::recip(Expr::number(3.0)), x()]);
        assert_eq!(third.to_string(), "x/3");
        assert_eq!(third.to_latex(), r"\frac{x}{3}");
        let reciprocal = Expr::product(vec![Expr::number(1.0), Expr::recip(x())]);
        assert_eq!(reciprocal.to_string(), "1/x");
    }

    #[test]
    fn test_display_powers() {
        let e = Expr::pow(x() + Expr::number(1.0), Expr::number(2.0));
        assert_eq!(e.to_string(), "(x + 1)^2");
        let e = Expr::pow(x(), Expr::number(0.5));
        assert_eq!(e.to_string(), "x^0.5");
        let e = Expr::pow(x(), Expr::symbol("y") + Expr::number(1.0));
        assert_eq!(e.to_string(), "x^(y + 1)");
        let e = Expr::pow(Expr::pow(x(), Expr::number(2.0)), Expr::number(3.0));
        assert_eq!(e.to_string(), "(x^2)^3");
        assert_eq!(x().cos().pow_of(-2.0).to_string(), "1/cos(x)^2");
    }

    #[test]
    fn test_display_functions() {
        assert_eq!(x().abs().log().to_string(), "log(|x|)");
        assert_eq!(
            Expr::negate(x().sin().pow_of(2.0)).to_string(),
            "-sin(x)^2"
        );
        assert_eq!(Expr::constant(Constant::Pi).to_string(), "pi");
    }

    #[test]
    fn test_latex() {
        let third = Expr::product(vec![Expr::number(1.0 / 3.0), x().pow_of(3.0)]);
        assert_eq!(third.to_latex(), r"\frac{x^{3}}{3}");
        assert_eq!(x().abs().log().to_latex(), r"\log\left(\left|x\right|\right)");
        assert_eq!(x().exp().to_latex(), "e^{x}");
        assert_eq!((2.0 * x()).to_latex(), "2x");
        assert_eq!(x().sqrt().to_latex(), r"\sqrt{x}");
        assert_eq!(
            (Expr::constant(Constant::Pi) * x()).to_latex(),
            r"\pi \cdot x"
        );
    }
}
