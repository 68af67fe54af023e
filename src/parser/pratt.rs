use crate::error::{CalcError, Span};
use crate::expr::{Constant, Expr};
use crate::functions::Function;
use crate::parser::tokens::{Operator, Token, TokenKind, UNARY_PRECEDENCE};

/// Parse tokens into an expression tree using Pratt parsing
pub(crate) fn parse_expression(
    tokens: &[Token],
    input: &str,
    max_depth: usize,
) -> Result<Expr, CalcError> {
    if tokens.is_empty() {
        return Err(CalcError::EmptyExpression);
    }

    let mut parser = Parser {
        tokens,
        input,
        pos: 0,
        depth: 0,
        max_depth,
    };

    let expr = parser.parse_expr(0)?;

    // Anything left over is either a stray ')' or trailing tokens
    if let Some(token) = parser.current() {
        let fragment = input[token.span.start..].trim_end().to_string();
        let span = Span::new(token.span.start, input.trim_end().len());
        return Err(match token.kind {
            TokenKind::RightParen => CalcError::UnbalancedParentheses { fragment, span },
            _ => CalcError::TrailingInput { fragment, span },
        });
    }

    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    input: &'a str,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Text of the most recently consumed token, for end-of-input errors
    fn previous_text(&self) -> String {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or_else(String::new, |t| self.slice(t.span))
    }

    fn slice(&self, span: Span) -> String {
        self.input
            .get(span.start..span.end)
            .unwrap_or_default()
            .to_string()
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, CalcError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(CalcError::MaxDepthExceeded);
        }

        // Parse left side (prefix)
        let mut left = self.parse_prefix()?;

        // Parse operators and right side (infix)
        while let Some(token) = self.current() {
            let op = match token.kind {
                TokenKind::Operator(op) => op,
                _ => break,
            };

            if op.precedence() < min_precedence {
                break;
            }

            left = self.parse_infix(left, op)?;
        }

        self.depth -= 1;
        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, CalcError> {
        let token = self
            .current()
            .ok_or_else(|| CalcError::UnexpectedEndOfInput {
                after: self.previous_text(),
            })?;

        match &token.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::number(*n))
            }

            TokenKind::Identifier(name) => {
                self.advance();
                if let Some(func) = Function::from_name(name) {
                    self.parse_call(func, token.span)
                } else if let Some(c) = Constant::from_name(name) {
                    Ok(Expr::constant(c))
                } else {
                    Ok(Expr::symbol(name.clone()))
                }
            }

            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect_close(token.span.start)?;
                Ok(inner)
            }

            TokenKind::Operator(Operator::Sub) => {
                self.advance();
                let operand = self.parse_expr(UNARY_PRECEDENCE)?;
                Ok(Expr::negate(operand))
            }

            TokenKind::Operator(Operator::Add) => {
                self.advance();
                self.parse_expr(UNARY_PRECEDENCE)
            }

            other => Err(CalcError::unexpected(
                "expression",
                other.to_string(),
                token.span,
            )),
        }
    }

    fn parse_infix(&mut self, left: Expr, op: Operator) -> Result<Expr, CalcError> {
        self.advance(); // consume operator
        let right = self.parse_expr(op.right_precedence())?;

        Ok(match op {
            Operator::Add => Expr::sum(vec![left, right]),
            Operator::Sub => Expr::sub_expr(left, right),
            Operator::Mul => Expr::product(vec![left, right]),
            Operator::Div => Expr::div_expr(left, right),
            Operator::Pow => Expr::pow(left, right),
        })
    }

    /// Parse `( argument )` after a function name. Exactly one argument.
    fn parse_call(&mut self, func: Function, name_span: Span) -> Result<Expr, CalcError> {
        let name = func.name().to_string();
        match self.current() {
            Some(t) if t.kind == TokenKind::LeftParen => self.advance(),
            _ => {
                return Err(CalcError::MissingFunctionArguments {
                    name,
                    span: name_span,
                });
            }
        }

        if let Some(t) = self.current()
            && t.kind == TokenKind::RightParen
        {
            return Err(CalcError::EmptyArgument {
                name,
                span: Span::new(name_span.start, t.span.end),
            });
        }

        let arg = self.parse_expr(0)?;

        if let Some(t) = self.current()
            && t.kind == TokenKind::Comma
        {
            return Err(CalcError::TooManyArguments {
                name,
                span: Span::new(name_span.start, t.span.end),
            });
        }

        self.expect_close(name_span.start)?;
        Ok(Expr::func(func, arg))
    }

    /// Consume a `)` that closes the group opened at byte `open`
    fn expect_close(&mut self, open: usize) -> Result<(), CalcError> {
        match self.current() {
            Some(t) if t.kind == TokenKind::RightParen => {
                self.advance();
                Ok(())
            }
            Some(t) => Err(CalcError::unexpected(
                "')'",
                self.slice(t.span),
                t.span,
            )),
            None => {
                let end = self.input.trim_end().len();
                Err(CalcError::UnbalancedParentheses {
                    fragment: self.input.get(open..end).unwrap_or_default().to_string(),
                    span: Span::new(open, end),
                })
            }
        }
    }
}
