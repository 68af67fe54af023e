use std::fmt;

/// Source location span for error reporting
/// Represents a range of characters in the normalized input string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start position (0-indexed byte offset)
    pub start: usize,
    /// End position (exclusive, 0-indexed byte offset)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Create a span for a single position
    pub fn at(pos: usize) -> Self {
        Span {
            start: pos,
            end: pos + 1,
        }
    }

    /// Check if this span has valid location info
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Format the span for display (1-indexed for users)
    pub fn display(&self) -> String {
        if !self.is_valid() {
            String::new()
        } else if self.end - self.start == 1 {
            format!(" at position {}", self.start + 1)
        } else {
            format!(" at positions {}-{}", self.start + 1, self.end)
        }
    }
}

/// Coarse classification used at the transport boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unparseable input; the caller must fix the request
    Input,
    /// Well-formed input whose value is undefined (division by zero)
    Domain,
    /// Unexpected failure inside a pipeline stage
    Internal,
}

/// Errors that can occur while normalizing, parsing or computing
#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    // Normalization errors
    EmptyExpression,
    InvalidCharacters {
        input: String,
        fragment: String,
        span: Span,
    },

    // Parsing errors
    InvalidNumber {
        value: String,
        span: Span,
    },
    UnexpectedToken {
        expected: String,
        got: String,
        span: Option<Span>,
    },
    UnexpectedEndOfInput {
        after: String,
    },
    UnbalancedParentheses {
        fragment: String,
        span: Span,
    },
    MissingFunctionArguments {
        name: String,
        span: Span,
    },
    EmptyArgument {
        name: String,
        span: Span,
    },
    TooManyArguments {
        name: String,
        span: Span,
    },
    TrailingInput {
        fragment: String,
        span: Span,
    },

    // Request errors
    InvalidVariable(String),
    MissingValue,

    // Domain errors
    DivisionByZero {
        fragment: String,
    },

    // Safety limits
    MaxDepthExceeded,
    MaxNodesExceeded,

    Internal(String),
}

impl CalcError {
    /// Classify the error for the transport layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::DivisionByZero { .. } => ErrorKind::Domain,
            CalcError::Internal(_) => ErrorKind::Internal,
            _ => ErrorKind::Input,
        }
    }

    /// True for errors the caller caused (input and domain errors)
    pub fn is_client_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }

    pub(crate) fn unexpected(expected: impl Into<String>, got: impl Into<String>, span: Span) -> Self {
        CalcError::UnexpectedToken {
            expected: expected.into(),
            got: got.into(),
            span: Some(span),
        }
    }

    pub(crate) fn division_by_zero(fragment: impl fmt::Display) -> Self {
        CalcError::DivisionByZero {
            fragment: fragment.to_string(),
        }
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::EmptyExpression => write!(f, "empty expression"),
            CalcError::InvalidCharacters {
                input,
                fragment,
                span,
            } => {
                write!(
                    f,
                    "invalid characters in '{}': '{}'{}",
                    input,
                    fragment,
                    span.display()
                )
            }
            CalcError::InvalidNumber { value, span } => {
                write!(f, "invalid number format: '{}'{}", value, span.display())
            }
            CalcError::UnexpectedToken {
                expected,
                got,
                span,
            } => {
                write!(
                    f,
                    "expected {}, but got '{}'{}",
                    expected,
                    got,
                    span.map_or(String::new(), |s| s.display())
                )
            }
            CalcError::UnexpectedEndOfInput { after } => {
                write!(f, "unexpected end of input after '{}'", after)
            }
            CalcError::UnbalancedParentheses { fragment, span } => {
                write!(
                    f,
                    "unbalanced parentheses: '{}'{}",
                    fragment,
                    span.display()
                )
            }
            CalcError::MissingFunctionArguments { name, span } => {
                write!(
                    f,
                    "function '{}' must be followed by '('{}",
                    name,
                    span.display()
                )
            }
            CalcError::EmptyArgument { name, span } => {
                write!(f, "empty argument in '{}()'{}", name, span.display())
            }
            CalcError::TooManyArguments { name, span } => {
                write!(
                    f,
                    "function '{}' takes exactly one argument{}",
                    name,
                    span.display()
                )
            }
            CalcError::TrailingInput { fragment, span } => {
                write!(
                    f,
                    "unexpected trailing input '{}'{}",
                    fragment,
                    span.display()
                )
            }
            CalcError::InvalidVariable(name) => {
                write!(f, "invalid variable name '{}'", name)
            }
            CalcError::MissingValue => write!(f, "a value is required to evaluate"),
            CalcError::DivisionByZero { fragment } => {
                write!(f, "division by zero in '{}'", fragment)
            }
            CalcError::MaxDepthExceeded => {
                write!(f, "expression nesting depth exceeds maximum limit")
            }
            CalcError::MaxNodesExceeded => {
                write!(f, "expression size exceeds maximum node count limit")
            }
            CalcError::Internal(msg) => write!(f, "internal engine error: {}", msg),
        }
    }
}

impl std::error::Error for CalcError {}
