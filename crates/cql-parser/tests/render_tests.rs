//! Renderer tests: deterministic output, debug trees, and the
//! render-then-reparse round trip.

use cql_parser::{debug_tree, parse_raw};
use insta::assert_snapshot;

fn rendered(input: &str) -> String {
    parse_raw(input).expect("input should parse").to_string()
}

// ── Rendered output ────────────────────────────────────────────────────

#[test]
fn render_comparison() {
    assert_snapshot!(rendered("attr = \"A\""), @"attr = 'A'");
}

#[test]
fn render_between() {
    assert_snapshot!(rendered("attr NOT BETWEEN 2 AND 5"), @"attr NOT BETWEEN 2 AND 5");
}

#[test]
fn render_in_requotes_consistently() {
    assert_snapshot!(rendered("attr NOT IN (\"A\", 'B')"), @"attr NOT IN ('A', 'B')");
}

#[test]
fn render_null() {
    assert_snapshot!(rendered("attr IS NOT NULL"), @"attr IS NOT NULL");
}

#[test]
fn render_like() {
    assert_snapshot!(rendered("attr ILIKE 'some%'"), @"attr ILIKE 'some%'");
}

#[test]
fn render_combination_is_fully_parenthesised() {
    assert_snapshot!(
        rendered("a = 1 AND b = 2 OR c = 3"),
        @"((a = 1 AND b = 2) OR c = 3)"
    );
}

#[test]
fn render_not_parenthesises_its_body() {
    assert_snapshot!(rendered("NOT (x = 1)"), @"NOT (x = 1)");
}

#[test]
fn render_arithmetic_is_fully_parenthesised() {
    assert_snapshot!(rendered("attr = 3 + 5 * 2"), @"attr = (3 + (5 * 2))");
}

#[test]
fn render_temporal_period() {
    assert_snapshot!(
        rendered("t BEFORE OR DURING 2000-01-01T00:00:00Z / PT4S"),
        @"t BEFORE OR DURING 2000-01-01T00:00:00Z / PT4S"
    );
}

#[test]
fn render_spatial_geometry_verbatim() {
    assert_snapshot!(
        rendered("INTERSECTS(geometry, POINT(1 1.0))"),
        @"INTERSECTS(geometry, POINT(1 1.0))"
    );
}

#[test]
fn render_dwithin_units() {
    assert_snapshot!(
        rendered("DWITHIN(geometry, POINT(0 0), 10, meters)"),
        @"DWITHIN(geometry, POINT(0 0), 10, meters)"
    );
}

#[test]
fn render_relate_pattern() {
    assert_snapshot!(
        rendered("RELATE(geometry, POINT(0 0), 'T*****FF*')"),
        @"RELATE(geometry, POINT(0 0), 'T*****FF*')"
    );
}

#[test]
fn render_bbox_with_crs() {
    assert_snapshot!(
        rendered("BBOX(geometry, 0, 0, 1, 1, \"EPSG:4326\")"),
        @"BBOX(geometry, 0, 0, 1, 1, 'EPSG:4326')"
    );
}

#[test]
fn render_envelope_argument() {
    assert_snapshot!(
        rendered("CONTAINS(geometry, ENVELOPE(0 0 1 1))"),
        @"CONTAINS(geometry, ENVELOPE (0 0 1 1))"
    );
}

#[test]
fn render_double_quoted_value_requotes_as_string() {
    // In value position a double-quoted lexeme is a string literal.
    assert_snapshot!(rendered("\"my attr\" IS NULL"), @"'my attr' IS NULL");
}

#[test]
fn render_quoted_attribute_in_spatial_position() {
    assert_snapshot!(
        rendered("INTERSECTS(\"the geom\", POINT(0 0))"),
        @r#"INTERSECTS("the geom", POINT(0 0))"#
    );
}

// ── Debug tree ─────────────────────────────────────────────────────────

#[test]
fn debug_tree_shows_precedence() {
    let ast = parse_raw("attr = 3 + 5 * 2").expect("input should parse");
    let expected = "\
Comparison =
  Attribute attr
  Arithmetic +
    Number 3
    Arithmetic *
      Number 5
      Number 2
";
    assert_eq!(debug_tree(&ast), expected);
}

#[test]
fn debug_tree_shows_spatial_arguments() {
    let ast = parse_raw("DWITHIN(geometry, POINT(0 0), 10, meters)").expect("input should parse");
    let expected = "\
Spatial DWITHIN distance=10 units=meters
  Attribute geometry
  Geometry POINT(0 0)
";
    assert_eq!(debug_tree(&ast), expected);
}

#[test]
fn debug_tree_shows_temporal_periods() {
    let ast = parse_raw("t DURING 2000-01-01T00:00:00Z / PT4S").expect("input should parse");
    let expected = "\
Temporal DURING
  Attribute t
  Period
    Instant 2000-01-01T00:00:00Z
    Duration PT4S
";
    assert_eq!(debug_tree(&ast), expected);
}

#[test]
fn debug_trees_of_distinct_trees_differ() {
    let a = parse_raw("attr BETWEEN 2 AND 5").expect("input should parse");
    let b = parse_raw("attr NOT BETWEEN 2 AND 5").expect("input should parse");
    assert_ne!(debug_tree(&a), debug_tree(&b));
}

// ── Round trip ─────────────────────────────────────────────────────────

#[test]
fn render_then_reparse_reproduces_the_tree() {
    let inputs = [
        "attr = 'A'",
        "attr <> 5",
        "attr BETWEEN 2 AND 5",
        "attr NOT BETWEEN 2 AND 5",
        "attr LIKE 'some%'",
        "attr NOT ILIKE 'some%'",
        "attr IN (1, 2, 3)",
        "attr NOT IN ('A', 'B')",
        "attr IS NULL",
        "attr IS NOT NULL",
        "attr = 3 + 5 * 2",
        "attr = 3 / (5 - 2)",
        "attr = -5",
        "a = 1 AND b = 2 OR c = 3",
        "NOT (x = 1)",
        "NOT (a = 1 OR b = 2) AND c IS NULL",
        "(a + 1) = 2",
        "\"my attr\" IS NULL",
        "INTERSECTS(\"the geom\", POINT(0 0))",
        "date BEFORE 2000-01-01T00:00:00Z",
        "date BEFORE OR DURING 2000-01-01T00:00:00Z / PT4S",
        "date DURING PT4S / 2000-01-01T00:00:00Z",
        "date DURING OR AFTER 2000-01-01T00:00:00Z / 2000-01-02T00:00:00Z",
        "date AFTER 2000-01-01T00:00:00Z",
        "INTERSECTS(geometry, POINT(1 1.0))",
        "WITHIN(geometry, POLYGON((0 0, 1 0, 1 1, 0 0)))",
        "CONTAINS(geometry, ENVELOPE(0 0 1 1))",
        "RELATE(geometry, POINT(0 0), 'T*****FF*')",
        "DWITHIN(geometry, POINT(0 0), 10, meters)",
        "BEYOND(geometry, POINT(0 0), 2, statute miles)",
        "BBOX(geometry, 0, 0, 1, 1)",
        "BBOX(geometry, -180, -90, 180, 90, 'EPSG:4326')",
    ];
    for input in inputs {
        let first = parse_raw(input).expect("input should parse");
        let second = parse_raw(&first.to_string())
            .unwrap_or_else(|err| panic!("rendering of {input:?} should reparse: {err}"));
        assert_eq!(first, second, "round trip changed the tree for {input:?}");
    }
}
