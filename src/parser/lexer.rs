use crate::error::{CalcError, Span};
use crate::parser::tokens::{Operator, Token, TokenKind};

/// Split normalized text into tokens, recording each token's byte span
pub(crate) fn lex(input: &str) -> Result<Vec<Token>, CalcError> {
    let bytes = input.as_bytes();
    // Rough guess: one token per two characters
    let mut tokens = Vec::with_capacity(input.len() / 2 + 1);
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;

        let kind = match c {
            b' ' => {
                pos += 1;
                continue;
            }
            b'0'..=b'9' | b'.' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                    pos += 1;
                }
                let text = &input[start..pos];
                let value = text.parse::<f64>().map_err(|_| CalcError::InvalidNumber {
                    value: text.to_string(),
                    span: Span::new(start, pos),
                })?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    span: Span::new(start, pos),
                });
                continue;
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                    pos += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Identifier(input[start..pos].to_string()),
                    span: Span::new(start, pos),
                });
                continue;
            }
            b'*' if bytes.get(pos + 1) == Some(&b'*') => {
                pos += 2;
                tokens.push(Token {
                    kind: TokenKind::Operator(Operator::Pow),
                    span: Span::new(start, pos),
                });
                continue;
            }
            b'+' => TokenKind::Operator(Operator::Add),
            b'-' => TokenKind::Operator(Operator::Sub),
            b'*' => TokenKind::Operator(Operator::Mul),
            b'/' => TokenKind::Operator(Operator::Div),
            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b',' => TokenKind::Comma,
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(CalcError::InvalidCharacters {
                    input: input.to_string(),
                    fragment: ch.to_string(),
                    span: Span::new(start, start + ch.len_utf8()),
                });
            }
        };

        pos += 1;
        tokens.push(Token {
            kind,
            span: Span::new(start, pos),
        });
    }

    Ok(tokens)
}
