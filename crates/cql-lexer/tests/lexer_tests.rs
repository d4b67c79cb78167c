//! Lexer integration tests: token kind/span sequences for every literal
//! class, the timestamp/duration/geometry disambiguation rules, and the
//! failure cases.

use cql_common::error::LexErrorKind;
use cql_common::span::Span;
use cql_common::token::TokenKind;
use cql_lexer::Lexer;

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::tokenize(source)
        .expect("input should lex")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn texts(source: &str) -> Vec<String> {
    Lexer::tokenize(source)
        .expect("input should lex")
        .into_iter()
        .map(|t| source[t.span.start as usize..t.span.end as usize].to_string())
        .collect()
}

// ── Keywords and identifiers ───────────────────────────────────────────

#[test]
fn keywords_are_case_insensitive() {
    assert_eq!(
        kinds("attr not between 2 AND 5"),
        vec![
            TokenKind::Identifier,
            TokenKind::Not,
            TokenKind::Between,
            TokenKind::Number,
            TokenKind::And,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
    assert_eq!(kinds("And")[0], TokenKind::And);
    assert_eq!(kinds("ilike")[0], TokenKind::Ilike);
    assert_eq!(kinds("Dwithin")[0], TokenKind::Dwithin);
}

#[test]
fn identifiers_preserve_case() {
    let tokens = texts("camelCase snake_case _leading");
    assert_eq!(tokens[0], "camelCase");
    assert_eq!(tokens[1], "snake_case");
    assert_eq!(tokens[2], "_leading");
}

#[test]
fn units_words_are_plain_identifiers() {
    assert_eq!(
        kinds("meters feet statute miles"),
        vec![
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

// ── Strings ────────────────────────────────────────────────────────────

#[test]
fn both_quote_styles_lex_as_strings() {
    assert_eq!(
        kinds(r#"'single' "double""#),
        vec![TokenKind::String, TokenKind::String, TokenKind::Eof]
    );
}

#[test]
fn string_payload_spans_include_quotes() {
    let tokens = texts("attr = 'some%'");
    assert_eq!(tokens[2], "'some%'");
}

#[test]
fn strings_have_no_escape_sequences() {
    // A backslash is ordinary content; the first matching quote ends it.
    assert_eq!(
        kinds(r"'a\'"),
        vec![TokenKind::String, TokenKind::Eof]
    );
}

// ── Numbers ────────────────────────────────────────────────────────────

#[test]
fn number_forms() {
    assert_eq!(
        kinds("5 2.5 .5 1e10 1.5E-3"),
        vec![
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn leading_minus_is_its_own_token() {
    assert_eq!(
        kinds("-5"),
        vec![TokenKind::Minus, TokenKind::Number, TokenKind::Eof]
    );
}

#[test]
fn number_followed_by_identifier_splits() {
    assert_eq!(
        kinds("10 meters"),
        vec![TokenKind::Number, TokenKind::Identifier, TokenKind::Eof]
    );
}

// ── Timestamps and durations ───────────────────────────────────────────

#[test]
fn timestamp_is_one_token() {
    let tokens = texts("attr BEFORE 2000-01-01T00:00:00Z");
    assert_eq!(tokens[2], "2000-01-01T00:00:00Z");
    assert_eq!(kinds("attr BEFORE 2000-01-01T00:00:00Z")[2], TokenKind::Timestamp);
}

#[test]
fn date_only_timestamp() {
    assert_eq!(kinds("2000-01-01")[0], TokenKind::Timestamp);
}

#[test]
fn arithmetic_on_numbers_is_not_a_timestamp() {
    assert_eq!(
        kinds("2000 - 01"),
        vec![
            TokenKind::Number,
            TokenKind::Minus,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn period_lexes_as_three_tokens() {
    assert_eq!(
        kinds("2000-01-01T00:00:00Z / PT4S"),
        vec![
            TokenKind::Timestamp,
            TokenKind::Slash,
            TokenKind::Duration,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn duration_forms_lex_verbatim() {
    for duration in ["PT4S", "P1Y", "P1Y2M3DT4H5M6S", "P3W", "PT1.5S"] {
        let tokens = texts(duration);
        assert_eq!(tokens[0], duration, "{duration} should be captured verbatim");
        assert_eq!(kinds(duration)[0], TokenKind::Duration);
    }
}

#[test]
fn identifier_starting_with_p_is_not_a_duration() {
    assert_eq!(kinds("Price")[0], TokenKind::Identifier);
    assert_eq!(kinds("P")[0], TokenKind::Identifier);
}

// ── Geometry and envelope ──────────────────────────────────────────────

#[test]
fn geometry_captured_verbatim() {
    let tokens = texts("INTERSECTS(geometry, POINT(1 1.0))");
    assert_eq!(tokens[4], "POINT(1 1.0)");
    assert_eq!(
        kinds("INTERSECTS(geometry, POINT(1 1.0))"),
        vec![
            TokenKind::Intersects,
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::Geometry,
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn geometry_with_nested_rings() {
    let source = "POLYGON((0 0, 1 0, 1 1, 0 0))";
    let tokens = texts(source);
    assert_eq!(tokens[0], source);
    assert_eq!(kinds(source)[0], TokenKind::Geometry);
}

#[test]
fn geometry_keyword_is_case_insensitive() {
    assert_eq!(kinds("point(0 0)")[0], TokenKind::Geometry);
    assert_eq!(kinds("MultiPolygon(((0 0)))")[0], TokenKind::Geometry);
}

#[test]
fn geometry_keyword_without_paren_is_identifier() {
    assert_eq!(
        kinds("POINT = 5"),
        vec![
            TokenKind::Identifier,
            TokenKind::Eq,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn envelope_is_one_token() {
    let source = "ENVELOPE (0 0.5 -1 2)";
    let tokens = texts(source);
    assert_eq!(tokens[0], source);
    assert_eq!(kinds(source)[0], TokenKind::Envelope);
}

#[test]
fn envelope_without_paren_is_identifier() {
    assert_eq!(kinds("ENVELOPE")[0], TokenKind::Identifier);
}

// ── Whitespace and determinism ─────────────────────────────────────────

#[test]
fn whitespace_is_discarded() {
    assert_eq!(kinds("attr\t=\n 5\r\n"), kinds("attr = 5"));
}

#[test]
fn relexing_yields_identical_output() {
    let source = "BBOX(geometry, 0, 0, 1, 1, \"EPSG:4326\")";
    assert_eq!(
        Lexer::tokenize(source).expect("input should lex"),
        Lexer::tokenize(source).expect("input should lex")
    );
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn unknown_character_reports_offset() {
    let err = Lexer::tokenize("attr ; 5").expect_err("`;` is not CQL");
    assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter(';'));
    assert_eq!(err.span, Span::new(5, 6));
}

#[test]
fn unterminated_string_is_an_error() {
    let err = Lexer::tokenize("attr = 'oops").expect_err("string is unterminated");
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    assert_eq!(err.span.start, 7);
}

#[test]
fn unterminated_geometry_is_an_error() {
    let err = Lexer::tokenize("POINT(1 1").expect_err("geometry is unterminated");
    assert_eq!(err.kind, LexErrorKind::UnterminatedGeometry);
    assert_eq!(err.span.start, 0);
}

#[test]
fn envelope_with_wrong_arity_is_an_error() {
    let err = Lexer::tokenize("ENVELOPE(0 0 1)").expect_err("three numbers, not four");
    assert_eq!(err.kind, LexErrorKind::MalformedEnvelope);
}

#[test]
fn envelope_with_comma_separators_is_an_error() {
    let err = Lexer::tokenize("ENVELOPE(0, 0, 1, 1)").expect_err("commas are not separators");
    assert_eq!(err.kind, LexErrorKind::MalformedEnvelope);
}

// ── Serialization ──────────────────────────────────────────────────────

#[test]
fn tokens_serialize_for_tooling() {
    let tokens = Lexer::tokenize("attr = 5").expect("input should lex");
    let json = serde_json::to_value(&tokens).expect("tokens serialize");
    assert_eq!(json[0]["kind"], "Identifier");
    assert_eq!(json[1]["kind"], "Eq");
    assert_eq!(json[2]["span"]["start"], 7);
}
