//! Recursive-descent parser for CQL filter expressions.
//!
//! The parser consumes the token vector produced by the lexer and builds
//! the value-typed AST directly. Every grammar function returns
//! `Result<_, CqlError>` and fails fast on the first unexpected token --
//! there is no error recovery and no partial tree.
//!
//! The grammar is split across three files:
//!
//! - this file: the `Parser` struct, its lookahead/consumption helpers,
//!   and the boolean structure (`search_condition` / `boolean_term` /
//!   `boolean_factor` / `boolean_primary`),
//! - `predicates`: the concrete predicate forms,
//! - `expressions`: arithmetic via binding powers.
//!
//! `OR` binds loosest, then `AND`, then `NOT`; all combinations are
//! left-associative.
//!
//! # Parenthesis disambiguation
//!
//! At predicate position, `(` may open either a parenthesised condition
//! (`(a = 1 OR b = 2) AND c = 3`) or a parenthesised arithmetic LHS
//! (`(a + 1) = 2`). The two are separated without backtracking by
//! scanning ahead to the balancing `)`: a condition always contains at
//! least one token that can never occur inside an expression (a
//! comparison operator or a predicate keyword), an expression never does.
//! Backtracking would re-run literal factories, which are promised to be
//! invoked at most once per literal.

mod expressions;
mod predicates;

use cql_common::span::Span;
use cql_common::token::{Token, TokenKind};

use crate::ast::{LogicalOp, Predicate};
use crate::error::CqlError;
use crate::FactoryError;

pub(crate) struct Parser<'a, V> {
    /// All tokens from the lexer, terminated by `Eof`.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Original input (for extracting token text via spans).
    source: &'a str,
    geometry_factory: Box<dyn FnMut(&str) -> Result<V, FactoryError> + 'a>,
    bbox_factory: Box<dyn FnMut(f64, f64, f64, f64) -> Result<V, FactoryError> + 'a>,
    time_factory: Box<dyn FnMut(&str) -> Result<V, FactoryError> + 'a>,
    duration_factory: Box<dyn FnMut(&str) -> Result<V, FactoryError> + 'a>,
}

impl<'a, V> Parser<'a, V> {
    pub(crate) fn new(
        tokens: Vec<Token>,
        source: &'a str,
        geometry_factory: Box<dyn FnMut(&str) -> Result<V, FactoryError> + 'a>,
        bbox_factory: Box<dyn FnMut(f64, f64, f64, f64) -> Result<V, FactoryError> + 'a>,
        time_factory: Box<dyn FnMut(&str) -> Result<V, FactoryError> + 'a>,
        duration_factory: Box<dyn FnMut(&str) -> Result<V, FactoryError> + 'a>,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            geometry_factory,
            bbox_factory,
            time_factory,
            duration_factory,
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// Kind of the current token. Past the end this is `Eof`.
    fn current(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Span of the current token. The final `Eof` token carries a
    /// zero-length span at the end of input, so error offsets stay within
    /// `[0, input.len()]`.
    fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(token) => token.span,
            None => {
                let end = self.source.len() as u32;
                Span::new(end, end)
            }
        }
    }

    /// Text of the current token. Borrows from the input, not the parser,
    /// so the result stays usable across factory calls.
    fn current_text(&self) -> &'a str {
        let span = self.current_span();
        &self.source[span.start as usize..span.end as usize]
    }

    /// Check if the current token matches the given kind.
    fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    // ── Consumption ────────────────────────────────────────────────────

    /// Consume the current token. Stops at `Eof`.
    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// If the current token matches `kind`, consume it and return true.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail.
    fn expect(&mut self, kind: TokenKind) -> Result<(), CqlError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected `{kind}`"), vec![kind]))
        }
    }

    /// Build a syntax error at the current token.
    fn unexpected(&self, message: &str, expected: Vec<TokenKind>) -> CqlError {
        CqlError::syntax(
            format!("{message}, found `{}`", self.current()),
            self.current_span(),
            expected,
        )
    }

    // ── Value extraction ───────────────────────────────────────────────

    /// Decoded payload of the current `String` token (quotes stripped).
    fn string_value(&self) -> String {
        let text = self.current_text();
        text[1..text.len() - 1].to_string()
    }

    /// Consume a `String` token and return its decoded payload.
    fn expect_string_literal(&mut self) -> Result<String, CqlError> {
        if !self.at(TokenKind::String) {
            return Err(self.unexpected("expected a string literal", vec![TokenKind::String]));
        }
        let value = self.string_value();
        self.advance();
        Ok(value)
    }

    /// Consume a `Number` token and return its value.
    fn number_value(&mut self) -> Result<f64, CqlError> {
        if !self.at(TokenKind::Number) {
            return Err(self.unexpected("expected a number", vec![TokenKind::Number]));
        }
        let text = self.current_text();
        let span = self.current_span();
        let value = text
            .parse::<f64>()
            .map_err(|_| CqlError::syntax(format!("invalid number literal `{text}`"), span, vec![]))?;
        self.advance();
        Ok(value)
    }

    /// Consume a number with an optional leading `-`.
    fn signed_number_value(&mut self) -> Result<f64, CqlError> {
        if self.eat(TokenKind::Minus) {
            Ok(-self.number_value()?)
        } else {
            self.number_value()
        }
    }

    // ── Boolean structure ──────────────────────────────────────────────

    /// Parse the whole input: one search condition followed by `Eof`.
    pub(crate) fn parse_root(&mut self) -> Result<Predicate<V>, CqlError> {
        let predicate = self.search_condition()?;
        if !self.at(TokenKind::Eof) {
            return Err(self.unexpected("unexpected trailing input", vec![TokenKind::Eof]));
        }
        Ok(predicate)
    }

    /// `search_condition := boolean_term ( OR boolean_term )*`
    fn search_condition(&mut self) -> Result<Predicate<V>, CqlError> {
        let mut lhs = self.boolean_term()?;
        while self.eat(TokenKind::Or) {
            let rhs = self.boolean_term()?;
            lhs = Predicate::combine(lhs, rhs, LogicalOp::Or);
        }
        Ok(lhs)
    }

    /// `boolean_term := boolean_factor ( AND boolean_factor )*`
    fn boolean_term(&mut self) -> Result<Predicate<V>, CqlError> {
        let mut lhs = self.boolean_factor()?;
        while self.eat(TokenKind::And) {
            let rhs = self.boolean_factor()?;
            lhs = Predicate::combine(lhs, rhs, LogicalOp::And);
        }
        Ok(lhs)
    }

    /// `boolean_factor := [ NOT ] boolean_primary`
    fn boolean_factor(&mut self) -> Result<Predicate<V>, CqlError> {
        if self.eat(TokenKind::Not) {
            Ok(Predicate::negate(self.boolean_primary()?))
        } else {
            self.boolean_primary()
        }
    }

    /// `boolean_primary := predicate | '(' search_condition ')'`
    fn boolean_primary(&mut self) -> Result<Predicate<V>, CqlError> {
        if self.at(TokenKind::LParen) && self.paren_encloses_condition() {
            self.advance();
            let predicate = self.search_condition()?;
            self.expect(TokenKind::RParen)?;
            return Ok(predicate);
        }
        self.predicate()
    }

    /// Whether the `(` at the current position opens a parenthesised
    /// condition rather than a parenthesised expression. See the module
    /// docs for why this is decidable by scanning ahead.
    fn paren_encloses_condition(&self) -> bool {
        let mut depth = 0u32;
        for token in &self.tokens[self.pos..] {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return false;
                    }
                }
                TokenKind::Eof => return false,
                kind if is_condition_marker(kind) => return true,
                _ => {}
            }
        }
        false
    }
}

/// Token kinds that can occur in a condition but never inside a pure
/// expression.
fn is_condition_marker(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::And
            | TokenKind::Or
            | TokenKind::Not
            | TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::Between
            | TokenKind::Like
            | TokenKind::Ilike
            | TokenKind::In
            | TokenKind::Is
            | TokenKind::Null
            | TokenKind::Before
            | TokenKind::After
            | TokenKind::During
            | TokenKind::Intersects
            | TokenKind::Disjoint
            | TokenKind::Contains
            | TokenKind::Within
            | TokenKind::Touches
            | TokenKind::Crosses
            | TokenKind::Overlaps
            | TokenKind::Equals
            | TokenKind::Relate
            | TokenKind::Dwithin
            | TokenKind::Beyond
            | TokenKind::Bbox
    )
}

#[cfg(test)]
mod tests {
    use crate::ast::{ComparisonOp, Expr, LogicalOp, Predicate};
    use crate::parse_raw;

    #[test]
    fn parenthesised_condition_groups_predicates() {
        let ast = parse_raw("(a = 1 OR b = 2) AND c = 3").expect("input should parse");
        match ast {
            Predicate::Combination { lhs, op, .. } => {
                assert_eq!(op, LogicalOp::And);
                assert!(matches!(*lhs, Predicate::Combination { op: LogicalOp::Or, .. }));
            }
            other => panic!("expected AND combination, got {other:?}"),
        }
    }

    #[test]
    fn parenthesised_expression_stays_an_expression() {
        let ast = parse_raw("(a + 1) = 2").expect("input should parse");
        match ast {
            Predicate::Comparison { lhs, op, .. } => {
                assert_eq!(op, ComparisonOp::Eq);
                assert!(matches!(lhs, Expr::Arithmetic { .. }));
            }
            other => panic!("expected comparison, got {other:?}"),
        }
    }

    #[test]
    fn doubly_parenthesised_condition() {
        let ast = parse_raw("((a = 1))").expect("input should parse");
        assert!(matches!(ast, Predicate::Comparison { .. }));
    }

    #[test]
    fn not_binds_tighter_than_and() {
        let ast = parse_raw("NOT a = 1 AND b = 2").expect("input should parse");
        match ast {
            Predicate::Combination { lhs, op, .. } => {
                assert_eq!(op, LogicalOp::And);
                assert!(matches!(*lhs, Predicate::Not(_)));
            }
            other => panic!("expected AND combination, got {other:?}"),
        }
    }
}
