//! Concrete predicate forms.
//!
//! Each expression-led predicate is recognised by reading the left-hand
//! side and dispatching on the next token; spatial and BBOX predicates
//! are call-form and dispatch on their introducing keyword instead. The
//! multi-word temporal operators and the two-word distance units are
//! assembled here from single tokens.

use cql_common::token::TokenKind;

use crate::ast::{
    ComparisonOp, DistanceUnits, Expr, PeriodComponent, Predicate, SpatialOp, TemporalOp,
    TemporalOperand,
};
use crate::error::CqlError;

use super::Parser;

impl<'a, V> Parser<'a, V> {
    /// `predicate := comparison | between | like | in | null | temporal
    ///             | spatial | bbox`
    pub(super) fn predicate(&mut self) -> Result<Predicate<V>, CqlError> {
        match self.current() {
            TokenKind::Intersects
            | TokenKind::Disjoint
            | TokenKind::Contains
            | TokenKind::Within
            | TokenKind::Touches
            | TokenKind::Crosses
            | TokenKind::Overlaps
            | TokenKind::Equals
            | TokenKind::Relate
            | TokenKind::Dwithin
            | TokenKind::Beyond => self.spatial_predicate(),
            TokenKind::Bbox => self.bbox_predicate(),
            _ => {
                let lhs = self.expression()?;
                self.predicate_with_lhs(lhs)
            }
        }
    }

    /// Dispatch on the token following an already-parsed LHS expression.
    fn predicate_with_lhs(&mut self, lhs: Expr<V>) -> Result<Predicate<V>, CqlError> {
        match self.current() {
            kind @ (TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq) => {
                let op = match kind {
                    TokenKind::Eq => ComparisonOp::Eq,
                    TokenKind::NotEq => ComparisonOp::Ne,
                    TokenKind::Lt => ComparisonOp::Lt,
                    TokenKind::LtEq => ComparisonOp::Le,
                    TokenKind::Gt => ComparisonOp::Gt,
                    _ => ComparisonOp::Ge,
                };
                self.advance();
                let rhs = self.expression()?;
                Ok(Predicate::Comparison { lhs, rhs, op })
            }

            TokenKind::Not => {
                self.advance();
                match self.current() {
                    TokenKind::Between => {
                        self.advance();
                        self.between_predicate(lhs, true)
                    }
                    TokenKind::Like => {
                        self.advance();
                        self.like_predicate(lhs, true, true)
                    }
                    TokenKind::Ilike => {
                        self.advance();
                        self.like_predicate(lhs, false, true)
                    }
                    TokenKind::In => {
                        self.advance();
                        self.in_predicate(lhs, true)
                    }
                    _ => Err(self.unexpected(
                        "expected `BETWEEN`, `LIKE`, `ILIKE`, or `IN` after `NOT`",
                        vec![
                            TokenKind::Between,
                            TokenKind::Like,
                            TokenKind::Ilike,
                            TokenKind::In,
                        ],
                    )),
                }
            }

            TokenKind::Between => {
                self.advance();
                self.between_predicate(lhs, false)
            }
            TokenKind::Like => {
                self.advance();
                self.like_predicate(lhs, true, false)
            }
            TokenKind::Ilike => {
                self.advance();
                self.like_predicate(lhs, false, false)
            }
            TokenKind::In => {
                self.advance();
                self.in_predicate(lhs, false)
            }

            TokenKind::Is => {
                self.advance();
                let negated = self.eat(TokenKind::Not);
                self.expect(TokenKind::Null)?;
                Ok(Predicate::Null { lhs, negated })
            }

            TokenKind::Before | TokenKind::During | TokenKind::After => {
                let op = self.temporal_op()?;
                let rhs = self.temporal_operand()?;
                Ok(Predicate::Temporal { lhs, rhs, op })
            }

            _ => Err(self.unexpected(
                "expected a predicate operator",
                vec![
                    TokenKind::Eq,
                    TokenKind::NotEq,
                    TokenKind::Lt,
                    TokenKind::LtEq,
                    TokenKind::Gt,
                    TokenKind::GtEq,
                    TokenKind::Not,
                    TokenKind::Between,
                    TokenKind::Like,
                    TokenKind::Ilike,
                    TokenKind::In,
                    TokenKind::Is,
                    TokenKind::Before,
                    TokenKind::During,
                    TokenKind::After,
                ],
            )),
        }
    }

    /// `lhs [NOT] BETWEEN low AND high` -- `BETWEEN` already consumed.
    fn between_predicate(&mut self, lhs: Expr<V>, negated: bool) -> Result<Predicate<V>, CqlError> {
        let low = self.expression()?;
        self.expect(TokenKind::And)?;
        let high = self.expression()?;
        Ok(Predicate::Between {
            lhs,
            low,
            high,
            negated,
        })
    }

    /// `lhs [NOT] LIKE|ILIKE pattern` -- operator already consumed.
    fn like_predicate(
        &mut self,
        lhs: Expr<V>,
        case_sensitive: bool,
        negated: bool,
    ) -> Result<Predicate<V>, CqlError> {
        let pattern = self.expect_string_literal()?;
        Ok(Predicate::Like {
            lhs,
            pattern,
            case_sensitive,
            negated,
        })
    }

    /// `lhs [NOT] IN ( e1, e2, ... )` -- `IN` already consumed. The choice
    /// list cannot be empty.
    fn in_predicate(&mut self, lhs: Expr<V>, negated: bool) -> Result<Predicate<V>, CqlError> {
        self.expect(TokenKind::LParen)?;
        let mut choices = vec![self.expression()?];
        while self.eat(TokenKind::Comma) {
            choices.push(self.expression()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(Predicate::In {
            lhs,
            choices,
            negated,
        })
    }

    // ── Temporal ──────────────────────────────────────────────────────

    /// Read a temporal operator, including the multi-word forms
    /// `BEFORE OR DURING` and `DURING OR AFTER`.
    fn temporal_op(&mut self) -> Result<TemporalOp, CqlError> {
        match self.current() {
            TokenKind::Before => {
                self.advance();
                if self.eat(TokenKind::Or) {
                    self.expect(TokenKind::During)?;
                    Ok(TemporalOp::BeforeOrDuring)
                } else {
                    Ok(TemporalOp::Before)
                }
            }
            TokenKind::During => {
                self.advance();
                if self.eat(TokenKind::Or) {
                    self.expect(TokenKind::After)?;
                    Ok(TemporalOp::DuringOrAfter)
                } else {
                    Ok(TemporalOp::During)
                }
            }
            TokenKind::After => {
                self.advance();
                Ok(TemporalOp::After)
            }
            _ => Err(self.unexpected(
                "expected a temporal operator",
                vec![TokenKind::Before, TokenKind::During, TokenKind::After],
            )),
        }
    }

    /// Read a temporal operand: a single instant, or a `start / end`
    /// period whose sides are instants or durations. A period of two
    /// durations has no anchor and is rejected; resolving
    /// `instant +/- duration` is left to the translator.
    fn temporal_operand(&mut self) -> Result<TemporalOperand<V>, CqlError> {
        let first_span = self.current_span();
        let first = self.period_component()?;
        if self.eat(TokenKind::Slash) {
            let second_span = self.current_span();
            let second = self.period_component()?;
            if matches!(first, PeriodComponent::Duration(_))
                && matches!(second, PeriodComponent::Duration(_))
            {
                return Err(CqlError::syntax(
                    "a period must contain at least one timestamp",
                    first_span.merge(second_span),
                    vec![],
                ));
            }
            Ok(TemporalOperand::Period(first, second))
        } else {
            match first {
                PeriodComponent::Instant(value) => Ok(TemporalOperand::Instant(value)),
                PeriodComponent::Duration(_) => Err(CqlError::syntax(
                    "a lone duration is not a valid temporal operand",
                    first_span,
                    vec![TokenKind::Slash],
                )),
            }
        }
    }

    /// One side of a period: a `Timestamp` or `Duration` token, run
    /// through the matching factory.
    fn period_component(&mut self) -> Result<PeriodComponent<V>, CqlError> {
        match self.current() {
            TokenKind::Timestamp => {
                let text = self.current_text();
                let span = self.current_span();
                let value = (self.time_factory)(text)
                    .map_err(|err| CqlError::literal(format!("invalid timestamp: {err}"), span))?;
                self.advance();
                Ok(PeriodComponent::Instant(value))
            }
            TokenKind::Duration => {
                let text = self.current_text();
                let span = self.current_span();
                let value = (self.duration_factory)(text)
                    .map_err(|err| CqlError::literal(format!("invalid duration: {err}"), span))?;
                self.advance();
                Ok(PeriodComponent::Duration(value))
            }
            _ => Err(self.unexpected(
                "expected a timestamp or duration",
                vec![TokenKind::Timestamp, TokenKind::Duration],
            )),
        }
    }

    // ── Spatial and BBOX ──────────────────────────────────────────────

    /// Call-form spatial predicate:
    /// `OP ( attribute , geometry [, pattern | , distance , units] )`.
    fn spatial_predicate(&mut self) -> Result<Predicate<V>, CqlError> {
        let op_kind = self.current();
        self.advance();
        self.expect(TokenKind::LParen)?;
        let lhs = self.attribute()?;
        self.expect(TokenKind::Comma)?;
        let rhs = self.expression()?;
        let op = match op_kind {
            TokenKind::Intersects => SpatialOp::Intersects,
            TokenKind::Disjoint => SpatialOp::Disjoint,
            TokenKind::Contains => SpatialOp::Contains,
            TokenKind::Within => SpatialOp::Within,
            TokenKind::Touches => SpatialOp::Touches,
            TokenKind::Crosses => SpatialOp::Crosses,
            TokenKind::Overlaps => SpatialOp::Overlaps,
            TokenKind::Equals => SpatialOp::Equals,
            TokenKind::Relate => {
                self.expect(TokenKind::Comma)?;
                let pattern = self.expect_string_literal()?;
                SpatialOp::Relate { pattern }
            }
            TokenKind::Dwithin | TokenKind::Beyond => {
                self.expect(TokenKind::Comma)?;
                let distance = self.number_value()?;
                self.expect(TokenKind::Comma)?;
                let units = self.distance_units()?;
                if op_kind == TokenKind::Dwithin {
                    SpatialOp::Dwithin { distance, units }
                } else {
                    SpatialOp::Beyond { distance, units }
                }
            }
            other => {
                return Err(self.unexpected(
                    &format!("`{other}` is not a spatial operator"),
                    vec![],
                ))
            }
        };
        self.expect(TokenKind::RParen)?;
        Ok(Predicate::Spatial { lhs, rhs, op })
    }

    /// `BBOX ( attribute , minx , miny , maxx , maxy [, crs] )`
    fn bbox_predicate(&mut self) -> Result<Predicate<V>, CqlError> {
        self.advance(); // consume BBOX
        self.expect(TokenKind::LParen)?;
        let lhs = self.attribute()?;
        self.expect(TokenKind::Comma)?;
        let minx = self.signed_number_value()?;
        self.expect(TokenKind::Comma)?;
        let miny = self.signed_number_value()?;
        self.expect(TokenKind::Comma)?;
        let maxx = self.signed_number_value()?;
        self.expect(TokenKind::Comma)?;
        let maxy = self.signed_number_value()?;
        let crs = if self.eat(TokenKind::Comma) {
            let span = self.current_span();
            let crs = self.expect_string_literal()?;
            if crs.is_empty() {
                return Err(CqlError::syntax(
                    "CRS identifier must not be empty",
                    span,
                    vec![],
                ));
            }
            Some(crs)
        } else {
            None
        };
        self.expect(TokenKind::RParen)?;
        Ok(Predicate::BBox {
            lhs,
            minx,
            miny,
            maxx,
            maxy,
            crs,
        })
    }

    /// An attribute reference: an identifier, or a double-quoted name
    /// (quoted identifiers may contain any character except the quote).
    fn attribute(&mut self) -> Result<Expr<V>, CqlError> {
        match self.current() {
            TokenKind::Identifier => {
                let name = self.current_text().to_string();
                self.advance();
                Ok(Expr::Attribute(name))
            }
            TokenKind::String if self.current_text().starts_with('"') => {
                let name = self.string_value();
                self.advance();
                Ok(Expr::Attribute(name))
            }
            _ => Err(self.unexpected(
                "expected an attribute name",
                vec![TokenKind::Identifier],
            )),
        }
    }

    /// One of the five distance unit spellings; `statute miles` and
    /// `nautical miles` span two identifier tokens.
    fn distance_units(&mut self) -> Result<DistanceUnits, CqlError> {
        if !self.at(TokenKind::Identifier) {
            return Err(self.unexpected("expected distance units", vec![TokenKind::Identifier]));
        }
        let word = self.current_text();
        let span = self.current_span();
        let units = if word.eq_ignore_ascii_case("feet") {
            DistanceUnits::Feet
        } else if word.eq_ignore_ascii_case("meters") {
            DistanceUnits::Meters
        } else if word.eq_ignore_ascii_case("kilometers") {
            DistanceUnits::Kilometers
        } else if word.eq_ignore_ascii_case("statute") || word.eq_ignore_ascii_case("nautical") {
            let statute = word.eq_ignore_ascii_case("statute");
            self.advance();
            if !(self.at(TokenKind::Identifier)
                && self.current_text().eq_ignore_ascii_case("miles"))
            {
                return Err(self.unexpected(
                    "expected `miles` after the units qualifier",
                    vec![TokenKind::Identifier],
                ));
            }
            if statute {
                DistanceUnits::StatuteMiles
            } else {
                DistanceUnits::NauticalMiles
            }
        } else {
            return Err(CqlError::syntax(
                format!("unknown distance units `{word}`"),
                span,
                vec![],
            ));
        };
        self.advance();
        Ok(units)
    }
}
