//! Arithmetic expression parsing.
//!
//! Implements operator precedence with binding-power tables: `*` and `/`
//! bind tighter than `+` and `-`, all left-associative. Factors are
//! parenthesised expressions, attributes, and literals; literal tokens
//! with opaque payloads (geometry, envelope, timestamp, duration) run
//! through the injected factories exactly once each.

use cql_common::token::TokenKind;

use crate::ast::{ArithmeticOp, Expr, Value};
use crate::error::CqlError;

use super::Parser;

/// Returns (left_bp, right_bp) for infix arithmetic operators.
///
/// Left < right means left-associative. Returns `None` if the token is
/// not an arithmetic operator.
fn infix_binding_power(op: TokenKind) -> Option<(u8, u8)> {
    match op {
        // Additive: left-associative
        TokenKind::Plus | TokenKind::Minus => Some((1, 2)),
        // Multiplicative: left-associative, tighter
        TokenKind::Star | TokenKind::Slash => Some((3, 4)),
        _ => None,
    }
}

impl<'a, V> Parser<'a, V> {
    /// Parse an expression at the lowest binding power.
    pub(super) fn expression(&mut self) -> Result<Expr<V>, CqlError> {
        self.expr_bp(0)
    }

    /// Core binding-power loop: parse a factor, then consume operators
    /// whose left binding power admits them.
    fn expr_bp(&mut self, min_bp: u8) -> Result<Expr<V>, CqlError> {
        let mut lhs = self.factor()?;
        loop {
            let Some((l_bp, r_bp)) = infix_binding_power(self.current()) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            let op = match self.current() {
                TokenKind::Plus => ArithmeticOp::Add,
                TokenKind::Minus => ArithmeticOp::Sub,
                TokenKind::Star => ArithmeticOp::Mul,
                _ => ArithmeticOp::Div,
            };
            self.advance();
            let rhs = self.expr_bp(r_bp)?;
            lhs = Expr::Arithmetic {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                op,
            };
        }
        Ok(lhs)
    }

    /// `factor := '(' expression ')' | attribute | literal`
    ///
    /// A `-` immediately before a number literal is the leading sign the
    /// lexer deliberately leaves unconsumed; it is folded into the
    /// literal here.
    fn factor(&mut self) -> Result<Expr<V>, CqlError> {
        match self.current() {
            TokenKind::LParen => {
                self.advance();
                let expr = self.expr_bp(0)?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Minus => {
                self.advance();
                if self.at(TokenKind::Number) {
                    let value = self.number_value()?;
                    Ok(Expr::Literal(Value::Number(-value)))
                } else {
                    Err(self.unexpected(
                        "expected a number after unary `-`",
                        vec![TokenKind::Number],
                    ))
                }
            }
            TokenKind::Number => Ok(Expr::Literal(Value::Number(self.number_value()?))),
            TokenKind::String => {
                let value = self.string_value();
                self.advance();
                Ok(Expr::Literal(Value::String(value)))
            }
            TokenKind::Identifier => {
                let name = self.current_text().to_string();
                self.advance();
                Ok(Expr::Attribute(name))
            }
            TokenKind::Timestamp => {
                let text = self.current_text();
                let span = self.current_span();
                let value = (self.time_factory)(text)
                    .map_err(|err| CqlError::literal(format!("invalid timestamp: {err}"), span))?;
                self.advance();
                Ok(Expr::Literal(Value::Time(value)))
            }
            TokenKind::Duration => {
                let text = self.current_text();
                let span = self.current_span();
                let value = (self.duration_factory)(text)
                    .map_err(|err| CqlError::literal(format!("invalid duration: {err}"), span))?;
                self.advance();
                Ok(Expr::Literal(Value::Duration(value)))
            }
            TokenKind::Geometry => {
                let text = self.current_text();
                let span = self.current_span();
                let value = (self.geometry_factory)(text)
                    .map_err(|err| CqlError::literal(format!("invalid geometry: {err}"), span))?;
                self.advance();
                Ok(Expr::Literal(Value::Geometry(value)))
            }
            TokenKind::Envelope => {
                let span = self.current_span();
                let [minx, miny, maxx, maxy] = self.envelope_values()?;
                let value = (self.bbox_factory)(minx, miny, maxx, maxy).map_err(|err| {
                    CqlError::literal(format!("invalid bounding box: {err}"), span)
                })?;
                self.advance();
                Ok(Expr::Literal(Value::BBox(value)))
            }
            _ => Err(self.unexpected(
                "expected an expression",
                vec![
                    TokenKind::Number,
                    TokenKind::String,
                    TokenKind::Identifier,
                    TokenKind::LParen,
                ],
            )),
        }
    }

    /// Re-read the four coordinates from the current `Envelope` token.
    /// The lexer validated the shape; any residual parse failure is
    /// surfaced as a syntax error rather than a panic.
    fn envelope_values(&self) -> Result<[f64; 4], CqlError> {
        let text = self.current_text();
        let span = self.current_span();
        let malformed = || CqlError::syntax("malformed ENVELOPE literal", span, vec![]);
        let open = text.find('(').ok_or_else(malformed)?;
        let inner = text[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
        let mut values = [0.0f64; 4];
        let mut words = inner.split_whitespace();
        for slot in &mut values {
            let word = words.next().ok_or_else(malformed)?;
            *slot = word.parse().map_err(|_| malformed())?;
        }
        if words.next().is_some() {
            return Err(malformed());
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        let add = infix_binding_power(TokenKind::Plus).expect("+ is infix");
        let mul = infix_binding_power(TokenKind::Star).expect("* is infix");
        assert!(mul.0 > add.1);
    }

    #[test]
    fn all_arithmetic_operators_are_left_associative() {
        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
        ] {
            let (l_bp, r_bp) = infix_binding_power(kind).expect("arithmetic operator");
            assert!(l_bp < r_bp, "{kind:?} should be left-associative");
        }
    }

    #[test]
    fn non_arithmetic_tokens_have_no_binding_power() {
        assert_eq!(infix_binding_power(TokenKind::And), None);
        assert_eq!(infix_binding_power(TokenKind::Eq), None);
        assert_eq!(infix_binding_power(TokenKind::Eof), None);
    }
}
