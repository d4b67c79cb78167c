use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// A token produced by the CQL lexer.
///
/// A token carries only its kind and its location; payload text (the
/// identifier name, the number digits, the WKT body) is recovered by
/// slicing the original input with the span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Create a new token from a kind and byte offsets.
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token in the CQL filter language.
///
/// Keywords are matched case-insensitively by [`keyword_from_str`]; the
/// variant is the canonical form. The multi-word temporal operators
/// (`BEFORE OR DURING`, `DURING OR AFTER`) and the distance units inside
/// `DWITHIN`/`BEYOND` are assembled by the parser from these tokens, not
/// recognised by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    And,
    Or,
    Not,
    Like,
    Ilike,
    Is,
    Null,
    In,
    Between,
    Before,
    After,
    During,

    // ── Spatial operator keywords ──────────────────────────────────────
    Intersects,
    Disjoint,
    Contains,
    Within,
    Touches,
    Crosses,
    Overlaps,
    Equals,
    Relate,
    Dwithin,
    Beyond,
    Bbox,

    // ── Operators ──────────────────────────────────────────────────────
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,

    // ── Delimiters ─────────────────────────────────────────────────────
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,

    // ── Literals ───────────────────────────────────────────────────────
    /// Numeric literal, integer- or float-shaped: `5`, `2.5`, `.5`, `1e10`.
    Number,
    /// Quoted string, either `'...'` or `"..."`. A double-quoted lexeme
    /// doubles as a quoted identifier where the grammar expects an
    /// attribute; everywhere else it is a string literal.
    String,
    /// Unquoted identifier (attribute name).
    Identifier,
    /// ISO 8601 instant, captured verbatim: `2000-01-01T00:00:00Z`.
    Timestamp,
    /// ISO 8601 duration, captured verbatim: `PT4S`.
    Duration,
    /// WKT geometry, captured verbatim including the keyword: `POINT(1 1)`.
    Geometry,
    /// Bounding rectangle literal: `ENVELOPE(minx miny maxx maxy)`.
    Envelope,

    // ── Special ────────────────────────────────────────────────────────
    /// End of input.
    Eof,
    /// Invalid input. Internal to the lexer; `tokenize` surfaces a
    /// `LexError` instead of letting this kind escape.
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Like => "LIKE",
            TokenKind::Ilike => "ILIKE",
            TokenKind::Is => "IS",
            TokenKind::Null => "NULL",
            TokenKind::In => "IN",
            TokenKind::Between => "BETWEEN",
            TokenKind::Before => "BEFORE",
            TokenKind::After => "AFTER",
            TokenKind::During => "DURING",
            TokenKind::Intersects => "INTERSECTS",
            TokenKind::Disjoint => "DISJOINT",
            TokenKind::Contains => "CONTAINS",
            TokenKind::Within => "WITHIN",
            TokenKind::Touches => "TOUCHES",
            TokenKind::Crosses => "CROSSES",
            TokenKind::Overlaps => "OVERLAPS",
            TokenKind::Equals => "EQUALS",
            TokenKind::Relate => "RELATE",
            TokenKind::Dwithin => "DWITHIN",
            TokenKind::Beyond => "BEYOND",
            TokenKind::Bbox => "BBOX",
            TokenKind::Eq => "=",
            TokenKind::NotEq => "<>",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Timestamp => "timestamp",
            TokenKind::Duration => "duration",
            TokenKind::Geometry => "geometry",
            TokenKind::Envelope => "envelope",
            TokenKind::Eof => "end of input",
            TokenKind::Error => "error",
        };
        f.write_str(text)
    }
}

/// Look up a keyword from its string representation, case-insensitively.
///
/// Returns `Some(TokenKind)` if the string is a CQL keyword, `None`
/// otherwise. The lexer calls this to distinguish keywords from attribute
/// identifiers after scanning an identifier-shaped lexeme. The WKT
/// geometry keywords and `ENVELOPE` are not in this table; the lexer
/// handles them before keyword lookup because they introduce whole
/// literals.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s.to_ascii_uppercase().as_str() {
        "AND" => Some(TokenKind::And),
        "OR" => Some(TokenKind::Or),
        "NOT" => Some(TokenKind::Not),
        "LIKE" => Some(TokenKind::Like),
        "ILIKE" => Some(TokenKind::Ilike),
        "IS" => Some(TokenKind::Is),
        "NULL" => Some(TokenKind::Null),
        "IN" => Some(TokenKind::In),
        "BETWEEN" => Some(TokenKind::Between),
        "BEFORE" => Some(TokenKind::Before),
        "AFTER" => Some(TokenKind::After),
        "DURING" => Some(TokenKind::During),
        "INTERSECTS" => Some(TokenKind::Intersects),
        "DISJOINT" => Some(TokenKind::Disjoint),
        "CONTAINS" => Some(TokenKind::Contains),
        "WITHIN" => Some(TokenKind::Within),
        "TOUCHES" => Some(TokenKind::Touches),
        "CROSSES" => Some(TokenKind::Crosses),
        "OVERLAPS" => Some(TokenKind::Overlaps),
        "EQUALS" => Some(TokenKind::Equals),
        "RELATE" => Some(TokenKind::Relate),
        "DWITHIN" => Some(TokenKind::Dwithin),
        "BEYOND" => Some(TokenKind::Beyond),
        "BBOX" => Some(TokenKind::Bbox),
        _ => None,
    }
}
