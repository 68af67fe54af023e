//! Text-level rewriting that runs before parsing
//!
//! Rewrites are anchored regular expressions applied in a fixed order:
//! 1. `a ^ b` becomes `a**b` when `^` sits between an identifier, digit or `)`
//!    on the left and an identifier, digit or `(` on the right
//! 2. the alias `ln` becomes `log` (whole word, case-sensitive)
//!
//! The letter `e` is never rewritten; the parser decides whether a standalone
//! `e` is Euler's constant, so `exp` is never touched.
//!
//! After rewriting, every character must be an ASCII letter, a digit, one of
//! `+-*/().,` or a space.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::error::{CalcError, Span};

static POWER_CARET: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_)])\s*\^\s*([A-Za-z0-9_(])"));

static LN_ALIAS: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\bln\b"));

fn pattern(re: &'static LazyLock<Result<Regex, regex::Error>>) -> Result<&'static Regex, CalcError> {
    re.as_ref()
        .map_err(|e| CalcError::Internal(format!("normalizer pattern: {e}")))
}

/// True for characters the parser accepts
#[inline]
fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.' | ',' | ' ')
}

/// Normalize a raw function string into parser-ready text.
///
/// # Errors
/// - `EmptyExpression` for empty or whitespace-only input
/// - `InvalidCharacters` naming the first character outside the whitelist
///   (a `^` that could not be rewritten is reported here)
///
/// # Example
/// ```
/// use funcalc::normalize;
///
/// assert_eq!(normalize("x^2 + ln(x)").unwrap(), "x**2 + log(x)");
/// assert_eq!(normalize("exp(x)").unwrap(), "exp(x)");
/// assert!(normalize("x^").is_err());
/// ```
pub fn normalize(input: &str) -> Result<String, CalcError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CalcError::EmptyExpression);
    }

    let power = pattern(&POWER_CARET)?;
    let mut text = trimmed.to_string();
    // Chains like `x^y^z` share the middle operand, so one pass is not enough
    while power.is_match(&text) {
        text = power.replace_all(&text, "$1**$2").into_owned();
    }

    let text = pattern(&LN_ALIAS)?.replace_all(&text, "log").into_owned();

    if let Some((pos, c)) = text.char_indices().find(|&(_, c)| !is_allowed(c)) {
        return Err(CalcError::InvalidCharacters {
            input: input.to_string(),
            fragment: c.to_string(),
            span: Span::new(pos, pos + c.len_utf8()),
        });
    }

    debug!("normalized '{}' -> '{}'", input, text);
    Ok(text)
}
