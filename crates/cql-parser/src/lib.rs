//! Parser for OGC CQL filter expressions.
//!
//! Turns textual filters like `attr BETWEEN 2 AND 5` or
//! `INTERSECTS(geometry, POINT(1 1.0))` into a typed AST that backend
//! translators walk to build their native query forms.
//!
//! The front end has no geospatial or calendar dependency of its own:
//! geometry, bounding-box, instant, and duration literals are handed to
//! four caller-supplied factories, and whatever they return is carried
//! opaquely in the AST. [`parse_raw`] wires up identity factories that
//! keep the raw literal text, which is enough for inspection, testing,
//! and backends that interpret literals themselves.
//!
//! ```
//! use cql_parser::{parse_raw, ComparisonOp, Expr, Predicate};
//!
//! let ast = parse_raw("city = 'Vienna'").unwrap();
//! assert_eq!(
//!     ast,
//!     Predicate::Comparison {
//!         lhs: Expr::attribute("city"),
//!         rhs: Expr::string("Vienna"),
//!         op: ComparisonOp::Eq,
//!     }
//! );
//! ```

pub mod ast;
pub mod diagnostics;
pub mod error;
mod parser;
pub mod visitor;

pub use ast::{
    debug_tree, ArithmeticOp, ComparisonOp, DistanceUnits, Expr, LogicalOp, PeriodComponent,
    Predicate, SpatialOp, TemporalOp, TemporalOperand, Value,
};
pub use error::CqlError;

use cql_lexer::Lexer;
use parser::Parser;

/// Error type the literal factories may return.
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

/// Parse a CQL filter expression into an AST.
///
/// The four factories are required parameters; each is invoked at most
/// once per matching literal, and not at all when the input contains no
/// literal of that kind:
///
/// - `geometry` receives the full WKT text (e.g. `POINT(1 1.0)`),
/// - `bbox` receives the four envelope coordinates already parsed,
/// - `time` receives the raw ISO 8601 instant text,
/// - `duration` receives the raw ISO 8601 duration text.
///
/// A factory failure aborts the parse as [`CqlError::Literal`], annotated
/// with the literal's span. The input must be a single search condition;
/// trailing tokens are a syntax error, and no partial AST is ever
/// returned.
pub fn parse<'a, V>(
    input: &'a str,
    geometry: impl FnMut(&str) -> Result<V, FactoryError> + 'a,
    bbox: impl FnMut(f64, f64, f64, f64) -> Result<V, FactoryError> + 'a,
    time: impl FnMut(&str) -> Result<V, FactoryError> + 'a,
    duration: impl FnMut(&str) -> Result<V, FactoryError> + 'a,
) -> Result<Predicate<V>, CqlError> {
    let tokens = Lexer::tokenize(input)?;
    let mut parser = Parser::new(
        tokens,
        input,
        Box::new(geometry),
        Box::new(bbox),
        Box::new(time),
        Box::new(duration),
    );
    parser.parse_root()
}

/// Parse with identity factories.
///
/// Geometry, instant, and duration literals are carried as their raw
/// text; envelopes are re-rendered as `ENVELOPE (minx miny maxx maxy)`
/// text. The resulting `Predicate<String>` renders back to parseable CQL,
/// which is what the round-trip tests rely on.
pub fn parse_raw(input: &str) -> Result<Predicate<String>, CqlError> {
    parse(
        input,
        |wkt| Ok(wkt.to_string()),
        |minx, miny, maxx, maxy| Ok(format!("ENVELOPE ({minx} {miny} {maxx} {maxy})")),
        |instant| Ok(instant.to_string()),
        |duration| Ok(duration.to_string()),
    )
}
