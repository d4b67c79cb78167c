// CQL lexer -- tokenizer for OGC CQL filter expressions.

mod cursor;

use cursor::Cursor;
use cql_common::error::{LexError, LexErrorKind};
use cql_common::span::Span;
use cql_common::token::{keyword_from_str, Token, TokenKind};

/// The CQL lexer. Converts a filter expression string into a stream of
/// tokens.
///
/// Wraps a [`Cursor`] for byte-level iteration and implements
/// `Iterator<Item = Token>` so callers can consume tokens lazily or
/// collect them into a `Vec`. Lexing is single-pass and restartable:
/// re-lexing the same input yields identical output.
///
/// Literal recognition order matters in two places: at a digit the lexer
/// probes for an ISO 8601 timestamp before falling back to a number (so
/// `2000-01-01` is one instant, not `2000 - 01 - 01`), and at a letter it
/// probes for an ISO 8601 duration before identifier scanning (so `PT4S`
/// is a duration but `Price` is an attribute).
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    source: &'src str,
    /// Whether we have already emitted the `Eof` token.
    emitted_eof: bool,
    /// Errors recorded while lexing; `tokenize` surfaces the first one.
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given input.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            source,
            emitted_eof: false,
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire input, failing on the first lexical error.
    ///
    /// The returned vector includes the final `Eof` token.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next() {
            if token.kind == TokenKind::Error {
                return Err(lexer.error_for(token.span));
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// The error recorded for an `Error` token.
    fn error_for(&mut self, span: Span) -> LexError {
        self.errors.drain(..).next().unwrap_or_else(|| {
            let c = self.source[span.start as usize..].chars().next().unwrap_or(' ');
            LexError::new(LexErrorKind::UnexpectedCharacter(c), span)
        })
    }

    /// Produce the next token.
    fn produce_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            // ── Delimiters ──────────────────────────────────────────────
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            ',' => self.single_char_token(TokenKind::Comma, start),

            // ── Operators ───────────────────────────────────────────────
            '=' => self.single_char_token(TokenKind::Eq, start),
            '<' => self.lex_lt(start),
            '>' => self.lex_gt(start),
            '+' => self.single_char_token(TokenKind::Plus, start),
            '-' => self.single_char_token(TokenKind::Minus, start),
            '*' => self.single_char_token(TokenKind::Star, start),
            '/' => self.single_char_token(TokenKind::Slash, start),

            // ── String literals ─────────────────────────────────────────
            '\'' | '"' => self.lex_string(c, start),

            // ── Numbers and timestamps ──────────────────────────────────
            '.' if self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number(start)
            }
            '0'..='9' => {
                if let Some(len) = probe_timestamp(self.cursor.rest()) {
                    self.cursor.advance_bytes(len);
                    Token::new(TokenKind::Timestamp, start, self.cursor.pos())
                } else {
                    self.lex_number(start)
                }
            }

            // ── Identifiers, keywords, durations, geometry ──────────────
            c if is_ident_start(c) => self.lex_word(start),

            // ── Unknown character ───────────────────────────────────────
            _ => {
                self.cursor.advance();
                let span = Span::new(start, self.cursor.pos());
                self.errors
                    .push(LexError::new(LexErrorKind::UnexpectedCharacter(c), span));
                Token::new(TokenKind::Error, start, self.cursor.pos())
            }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Skip whitespace (space, tab, newline, carriage return).
    fn skip_whitespace(&mut self) {
        self.cursor.eat_while(is_whitespace);
    }

    /// Consume one character and return a token of the given kind.
    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// `<` -> `Lt`, `<=` -> `LtEq`, `<>` -> `NotEq`
    fn lex_lt(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '<'
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                Token::new(TokenKind::LtEq, start, self.cursor.pos())
            }
            Some('>') => {
                self.cursor.advance();
                Token::new(TokenKind::NotEq, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Lt, start, self.cursor.pos()),
        }
    }

    /// `>` -> `Gt`, `>=` -> `GtEq`
    fn lex_gt(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '>'
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            Token::new(TokenKind::GtEq, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Gt, start, self.cursor.pos())
        }
    }

    // ── String literals ───────────────────────────────────────────────

    /// Lex a quoted string. Either quote style delimits; no escape
    /// sequences are interpreted, so the first matching quote terminates.
    fn lex_string(&mut self, quote: char, start: u32) -> Token {
        self.cursor.advance(); // consume opening quote
        self.cursor.eat_while(|c| c != quote);
        if self.cursor.is_eof() {
            let span = Span::new(start, self.cursor.pos());
            self.errors
                .push(LexError::new(LexErrorKind::UnterminatedString, span));
            return Token::new(TokenKind::Error, start, self.cursor.pos());
        }
        self.cursor.advance(); // consume closing quote
        Token::new(TokenKind::String, start, self.cursor.pos())
    }

    // ── Number literals ───────────────────────────────────────────────

    /// Lex a number literal: digits with optional fraction and exponent.
    /// A leading `.` with digits is accepted; a leading sign is not (the
    /// parser treats `-` as unary minus).
    fn lex_number(&mut self, start: u32) -> Token {
        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        } else {
            self.cursor.eat_while(|c| c.is_ascii_digit());
            if self.cursor.peek() == Some('.')
                && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
            {
                self.cursor.advance();
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
        }
        if self.at_exponent() {
            self.cursor.advance(); // consume 'e'/'E'
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        Token::new(TokenKind::Number, start, self.cursor.pos())
    }

    /// Whether the cursor sits on an exponent marker actually followed by
    /// digits (`e10`, `E+5`), rather than an identifier adjoining the
    /// number.
    fn at_exponent(&self) -> bool {
        if !matches!(self.cursor.peek(), Some('e' | 'E')) {
            return false;
        }
        let rest = self.cursor.rest().as_bytes();
        match rest.get(1) {
            Some(c) if c.is_ascii_digit() => true,
            Some(b'+') | Some(b'-') => rest.get(2).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    // ── Identifiers, keywords, durations, geometry ────────────────────

    /// Lex an identifier-shaped lexeme: a duration, a WKT geometry or
    /// envelope opener, a keyword, or a plain identifier.
    fn lex_word(&mut self, start: u32) -> Token {
        if let Some(len) = probe_duration(self.cursor.rest()) {
            self.cursor.advance_bytes(len);
            return Token::new(TokenKind::Duration, start, self.cursor.pos());
        }

        self.cursor.advance(); // consume first char
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());

        if is_geometry_keyword(text) && self.next_significant_is_lparen() {
            return self.lex_geometry(start);
        }
        if text.eq_ignore_ascii_case("ENVELOPE") && self.next_significant_is_lparen() {
            return self.lex_envelope(start);
        }

        let kind = keyword_from_str(text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, start, self.cursor.pos())
    }

    /// Whether the next non-whitespace character is `(`, without consuming
    /// anything.
    fn next_significant_is_lparen(&self) -> bool {
        self.cursor.rest().chars().find(|c| !is_whitespace(*c)) == Some('(')
    }

    /// Capture a WKT geometry body verbatim. The keyword has been consumed
    /// and the next significant character is `(`; consumes through the
    /// balancing `)` so nested rings (`POLYGON((...))`) stay intact.
    fn lex_geometry(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c != '(');
        self.cursor.advance(); // consume '('
        let mut depth: u32 = 1;
        loop {
            match self.cursor.peek() {
                None => {
                    let span = Span::new(start, self.cursor.pos());
                    self.errors
                        .push(LexError::new(LexErrorKind::UnterminatedGeometry, span));
                    return Token::new(TokenKind::Error, start, self.cursor.pos());
                }
                Some('(') => {
                    depth += 1;
                    self.cursor.advance();
                }
                Some(')') => {
                    depth -= 1;
                    self.cursor.advance();
                    if depth == 0 {
                        return Token::new(TokenKind::Geometry, start, self.cursor.pos());
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Validate and capture an `ENVELOPE(minx miny maxx maxy)` literal.
    /// The keyword has been consumed. The parser re-reads the four numbers
    /// from the token text.
    fn lex_envelope(&mut self, start: u32) -> Token {
        self.cursor.eat_while(is_whitespace);
        self.cursor.advance(); // consume '('
        for _ in 0..4 {
            self.cursor.eat_while(is_whitespace);
            if !self.eat_signed_number() {
                return self.envelope_error(start);
            }
        }
        self.cursor.eat_while(is_whitespace);
        if self.cursor.peek() != Some(')') {
            return self.envelope_error(start);
        }
        self.cursor.advance(); // consume ')'
        Token::new(TokenKind::Envelope, start, self.cursor.pos())
    }

    /// Consume one envelope coordinate: optional sign, digits, optional
    /// fraction. Returns false if no digits were present. Coordinates may
    /// be negative even though bare number tokens carry no sign.
    fn eat_signed_number(&mut self) -> bool {
        if matches!(self.cursor.peek(), Some('+' | '-')) {
            self.cursor.advance();
        }
        let mut any = false;
        while self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.advance();
            any = true;
        }
        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            while self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.cursor.advance();
                any = true;
            }
        }
        any
    }

    fn envelope_error(&mut self, start: u32) -> Token {
        let span = Span::new(start, self.cursor.pos());
        self.errors
            .push(LexError::new(LexErrorKind::MalformedEnvelope, span));
        Token::new(TokenKind::Error, start, self.cursor.pos())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.produce_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

// ── Character classes ──────────────────────────────────────────────────

/// Whitespace separating tokens: space, tab, newline, carriage return.
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether an identifier-shaped lexeme is one of the WKT geometry
/// keywords.
fn is_geometry_keyword(s: &str) -> bool {
    matches!(
        s.to_ascii_uppercase().as_str(),
        "POINT"
            | "LINESTRING"
            | "POLYGON"
            | "MULTIPOINT"
            | "MULTILINESTRING"
            | "MULTIPOLYGON"
            | "GEOMETRYCOLLECTION"
    )
}

// ── Literal probes ─────────────────────────────────────────────────────

fn at(b: &[u8], i: usize, byte: u8) -> bool {
    b.get(i) == Some(&byte)
}

fn digits_at(b: &[u8], start: usize, count: usize) -> bool {
    (start..start + count).all(|i| b.get(i).is_some_and(|c| c.is_ascii_digit()))
}

fn scan_digits(b: &[u8], mut i: usize) -> usize {
    while b.get(i).is_some_and(|c| c.is_ascii_digit()) {
        i += 1;
    }
    i
}

/// Measure an ISO 8601 instant at the start of `s`: `YYYY-MM-DD`,
/// optionally followed by `THH:MM:SS`, fractional seconds, and a zone
/// (`Z` or `+HH:MM`/`-HH:MM`). Returns the matched byte length, or `None`
/// if the text is not an instant (including when the match would run into
/// an adjoining alphanumeric character).
fn probe_timestamp(s: &str) -> Option<usize> {
    let b = s.as_bytes();
    if !(digits_at(b, 0, 4)
        && at(b, 4, b'-')
        && digits_at(b, 5, 2)
        && at(b, 7, b'-')
        && digits_at(b, 8, 2))
    {
        return None;
    }
    let mut i = 10;
    if at(b, i, b'T')
        && digits_at(b, i + 1, 2)
        && at(b, i + 3, b':')
        && digits_at(b, i + 4, 2)
        && at(b, i + 6, b':')
        && digits_at(b, i + 7, 2)
    {
        i += 9;
        if at(b, i, b'.') {
            let j = scan_digits(b, i + 1);
            if j > i + 1 {
                i = j;
            }
        }
        if at(b, i, b'Z') {
            i += 1;
        } else if (at(b, i, b'+') || at(b, i, b'-'))
            && digits_at(b, i + 1, 2)
            && at(b, i + 3, b':')
            && digits_at(b, i + 4, 2)
        {
            i += 6;
        }
    }
    match b.get(i) {
        Some(c) if c.is_ascii_alphanumeric() => None,
        _ => Some(i),
    }
}

/// Measure an ISO 8601 duration at the start of `s`: `P` followed by the
/// standard duration grammar (`P3W`, `P1Y2M3D`, `PT4S`, `P1DT12H`, ...).
/// At least one component is required, so a bare `P` or an identifier like
/// `Price` does not match. Returns the matched byte length.
fn probe_duration(s: &str) -> Option<usize> {
    let b = s.as_bytes();
    if !at(b, 0, b'P') {
        return None;
    }
    let mut i = 1;
    let mut matched = false;

    // Week form: P<n>W
    let j = scan_digits(b, i);
    if j > i && at(b, j, b'W') {
        i = j + 1;
        matched = true;
    } else {
        // Date components: (<n>Y)?(<n>M)?(<n>D)?
        for suffix in [b'Y', b'M', b'D'] {
            let j = scan_digits(b, i);
            if j > i && at(b, j, suffix) {
                i = j + 1;
                matched = true;
            }
        }
        // Time components: T(<n>H)?(<n>M)?(<n>(.<n>)?S)?
        if at(b, i, b'T') {
            let t_start = i;
            i += 1;
            let mut timed = false;
            for suffix in [b'H', b'M'] {
                let j = scan_digits(b, i);
                if j > i && at(b, j, suffix) {
                    i = j + 1;
                    timed = true;
                }
            }
            let j = scan_digits(b, i);
            if j > i {
                let mut k = j;
                if at(b, k, b'.') {
                    let m = scan_digits(b, k + 1);
                    if m > k + 1 {
                        k = m;
                    }
                }
                if at(b, k, b'S') {
                    i = k + 1;
                    timed = true;
                }
            }
            if timed {
                matched = true;
            } else {
                i = t_start;
            }
        }
    }

    if !matched {
        return None;
    }
    match b.get(i) {
        Some(c) if c.is_ascii_alphanumeric() || *c == b'_' => None,
        _ => Some(i),
    }
}
