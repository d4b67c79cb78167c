//! Deterministic rendering of the AST.
//!
//! `Display` emits valid CQL: logical combinations, `NOT` bodies, and
//! arithmetic nodes are fully parenthesised, so re-parsing the output
//! reproduces a structurally equal tree. Opaque literal payloads render
//! through their own `Display` (with identity factories that is the raw
//! literal text, which keeps the output parseable).
//!
//! [`debug_tree`] prints an indented node tree for debugging and test
//! comparison. Its exact shape is not a public contract beyond being
//! deterministic and distinct for structurally distinct trees.

use std::fmt;

use super::{
    ArithmeticOp, ComparisonOp, DistanceUnits, Expr, LogicalOp, PeriodComponent, Predicate,
    SpatialOp, TemporalOp, TemporalOperand, Value,
};

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        })
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        })
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        })
    }
}

impl fmt::Display for TemporalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemporalOp::Before => "BEFORE",
            TemporalOp::BeforeOrDuring => "BEFORE OR DURING",
            TemporalOp::During => "DURING",
            TemporalOp::DuringOrAfter => "DURING OR AFTER",
            TemporalOp::After => "AFTER",
        })
    }
}

impl fmt::Display for DistanceUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DistanceUnits::Feet => "feet",
            DistanceUnits::Meters => "meters",
            DistanceUnits::StatuteMiles => "statute miles",
            DistanceUnits::NauticalMiles => "nautical miles",
            DistanceUnits::Kilometers => "kilometers",
        })
    }
}

impl SpatialOp {
    /// The operator keyword, without the RELATE/DWITHIN/BEYOND arguments.
    pub fn keyword(&self) -> &'static str {
        match self {
            SpatialOp::Intersects => "INTERSECTS",
            SpatialOp::Disjoint => "DISJOINT",
            SpatialOp::Contains => "CONTAINS",
            SpatialOp::Within => "WITHIN",
            SpatialOp::Touches => "TOUCHES",
            SpatialOp::Crosses => "CROSSES",
            SpatialOp::Overlaps => "OVERLAPS",
            SpatialOp::Equals => "EQUALS",
            SpatialOp::Relate { .. } => "RELATE",
            SpatialOp::Dwithin { .. } => "DWITHIN",
            SpatialOp::Beyond { .. } => "BEYOND",
        }
    }
}

/// Quote a string literal, picking the quote style that avoids the
/// content. The language has no escape sequences, so content containing a
/// single quote is emitted double-quoted.
fn quoted(s: &str) -> String {
    if s.contains('\'') {
        format!("\"{s}\"")
    } else {
        format!("'{s}'")
    }
}

/// Whether an attribute name can be printed without identifier quotes.
fn is_bare_ident(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl<V: fmt::Display> fmt::Display for Value<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(&quoted(s)),
            Value::Geometry(v)
            | Value::BBox(v)
            | Value::Time(v)
            | Value::Duration(v) => write!(f, "{v}"),
        }
    }
}

impl<V: fmt::Display> fmt::Display for Expr<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Attribute(name) => {
                if is_bare_ident(name) {
                    f.write_str(name)
                } else {
                    write!(f, "\"{name}\"")
                }
            }
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Arithmetic { lhs, rhs, op } => write!(f, "({lhs} {op} {rhs})"),
        }
    }
}

impl<V: fmt::Display> fmt::Display for PeriodComponent<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodComponent::Instant(v) | PeriodComponent::Duration(v) => write!(f, "{v}"),
        }
    }
}

impl<V: fmt::Display> fmt::Display for TemporalOperand<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalOperand::Instant(v) => write!(f, "{v}"),
            TemporalOperand::Period(start, end) => write!(f, "{start} / {end}"),
        }
    }
}

impl<V: fmt::Display> fmt::Display for Predicate<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Not(inner) => write!(f, "NOT ({inner})"),
            Predicate::Combination { lhs, rhs, op } => write!(f, "({lhs} {op} {rhs})"),
            Predicate::Comparison { lhs, rhs, op } => write!(f, "{lhs} {op} {rhs}"),
            Predicate::Between {
                lhs,
                low,
                high,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{lhs} {not}BETWEEN {low} AND {high}")
            }
            Predicate::Like {
                lhs,
                pattern,
                case_sensitive,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                let op = if *case_sensitive { "LIKE" } else { "ILIKE" };
                write!(f, "{lhs} {not}{op} {}", quoted(pattern))
            }
            Predicate::In {
                lhs,
                choices,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{lhs} {not}IN (")?;
                for (i, choice) in choices.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{choice}")?;
                }
                f.write_str(")")
            }
            Predicate::Null { lhs, negated } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{lhs} IS {not}NULL")
            }
            Predicate::Temporal { lhs, rhs, op } => write!(f, "{lhs} {op} {rhs}"),
            Predicate::Spatial { lhs, rhs, op } => {
                write!(f, "{}({lhs}, {rhs}", op.keyword())?;
                match op {
                    SpatialOp::Relate { pattern } => write!(f, ", {}", quoted(pattern))?,
                    SpatialOp::Dwithin { distance, units }
                    | SpatialOp::Beyond { distance, units } => {
                        write!(f, ", {distance}, {units}")?;
                    }
                    _ => {}
                }
                f.write_str(")")
            }
            Predicate::BBox {
                lhs,
                minx,
                miny,
                maxx,
                maxy,
                crs,
            } => {
                write!(f, "BBOX({lhs}, {minx}, {miny}, {maxx}, {maxy}")?;
                if let Some(crs) = crs {
                    write!(f, ", {}", quoted(crs))?;
                }
                f.write_str(")")
            }
        }
    }
}

// ── Debug tree ─────────────────────────────────────────────────────────

/// Print an indented node tree for a predicate, two spaces per level.
pub fn debug_tree<V: fmt::Display>(predicate: &Predicate<V>) -> String {
    let mut out = String::new();
    write_predicate(&mut out, predicate, 0);
    out
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(text);
    out.push('\n');
}

fn write_predicate<V: fmt::Display>(out: &mut String, predicate: &Predicate<V>, depth: usize) {
    match predicate {
        Predicate::Not(inner) => {
            line(out, depth, "Not");
            write_predicate(out, inner, depth + 1);
        }
        Predicate::Combination { lhs, rhs, op } => {
            line(out, depth, &format!("Combination {op}"));
            write_predicate(out, lhs, depth + 1);
            write_predicate(out, rhs, depth + 1);
        }
        Predicate::Comparison { lhs, rhs, op } => {
            line(out, depth, &format!("Comparison {op}"));
            write_expr(out, lhs, depth + 1);
            write_expr(out, rhs, depth + 1);
        }
        Predicate::Between {
            lhs,
            low,
            high,
            negated,
        } => {
            line(out, depth, &format!("Between negated={negated}"));
            write_expr(out, lhs, depth + 1);
            write_expr(out, low, depth + 1);
            write_expr(out, high, depth + 1);
        }
        Predicate::Like {
            lhs,
            pattern,
            case_sensitive,
            negated,
        } => {
            line(
                out,
                depth,
                &format!(
                    "Like pattern={} case_sensitive={case_sensitive} negated={negated}",
                    quoted(pattern)
                ),
            );
            write_expr(out, lhs, depth + 1);
        }
        Predicate::In {
            lhs,
            choices,
            negated,
        } => {
            line(out, depth, &format!("In negated={negated}"));
            write_expr(out, lhs, depth + 1);
            for choice in choices {
                write_expr(out, choice, depth + 1);
            }
        }
        Predicate::Null { lhs, negated } => {
            line(out, depth, &format!("Null negated={negated}"));
            write_expr(out, lhs, depth + 1);
        }
        Predicate::Temporal { lhs, rhs, op } => {
            line(out, depth, &format!("Temporal {op}"));
            write_expr(out, lhs, depth + 1);
            match rhs {
                TemporalOperand::Instant(v) => line(out, depth + 1, &format!("Instant {v}")),
                TemporalOperand::Period(start, end) => {
                    line(out, depth + 1, "Period");
                    write_period_component(out, start, depth + 2);
                    write_period_component(out, end, depth + 2);
                }
            }
        }
        Predicate::Spatial { lhs, rhs, op } => {
            let header = match op {
                SpatialOp::Relate { pattern } => {
                    format!("Spatial RELATE pattern={}", quoted(pattern))
                }
                SpatialOp::Dwithin { distance, units } => {
                    format!("Spatial DWITHIN distance={distance} units={units}")
                }
                SpatialOp::Beyond { distance, units } => {
                    format!("Spatial BEYOND distance={distance} units={units}")
                }
                other => format!("Spatial {}", other.keyword()),
            };
            line(out, depth, &header);
            write_expr(out, lhs, depth + 1);
            write_expr(out, rhs, depth + 1);
        }
        Predicate::BBox {
            lhs,
            minx,
            miny,
            maxx,
            maxy,
            crs,
        } => {
            let header = match crs {
                Some(crs) => format!("BBox {minx} {miny} {maxx} {maxy} crs={}", quoted(crs)),
                None => format!("BBox {minx} {miny} {maxx} {maxy}"),
            };
            line(out, depth, &header);
            write_expr(out, lhs, depth + 1);
        }
    }
}

fn write_period_component<V: fmt::Display>(
    out: &mut String,
    component: &PeriodComponent<V>,
    depth: usize,
) {
    match component {
        PeriodComponent::Instant(v) => line(out, depth, &format!("Instant {v}")),
        PeriodComponent::Duration(v) => line(out, depth, &format!("Duration {v}")),
    }
}

fn write_expr<V: fmt::Display>(out: &mut String, expr: &Expr<V>, depth: usize) {
    match expr {
        Expr::Attribute(name) => line(out, depth, &format!("Attribute {name}")),
        Expr::Literal(value) => {
            let label = match value {
                Value::Number(n) => format!("Number {n}"),
                Value::String(s) => format!("String {}", quoted(s)),
                Value::Geometry(v) => format!("Geometry {v}"),
                Value::BBox(v) => format!("BBox {v}"),
                Value::Time(v) => format!("Time {v}"),
                Value::Duration(v) => format!("Duration {v}"),
            };
            line(out, depth, &label);
        }
        Expr::Arithmetic { lhs, rhs, op } => {
            line(out, depth, &format!("Arithmetic {op}"));
            write_expr(out, lhs, depth + 1);
            write_expr(out, rhs, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_render_canonically() {
        assert_eq!(ComparisonOp::Ne.to_string(), "<>");
        assert_eq!(LogicalOp::Or.to_string(), "OR");
        assert_eq!(ArithmeticOp::Div.to_string(), "/");
        assert_eq!(TemporalOp::BeforeOrDuring.to_string(), "BEFORE OR DURING");
        assert_eq!(DistanceUnits::NauticalMiles.to_string(), "nautical miles");
    }

    #[test]
    fn strings_pick_a_quote_style_that_avoids_the_content() {
        assert_eq!(quoted("plain"), "'plain'");
        assert_eq!(quoted("it's"), "\"it's\"");
    }

    #[test]
    fn integer_shaped_numbers_render_without_fraction() {
        let expr: Expr<String> = Expr::number(5.0);
        assert_eq!(expr.to_string(), "5");
        let expr: Expr<String> = Expr::number(2.5);
        assert_eq!(expr.to_string(), "2.5");
    }

    #[test]
    fn quoted_attribute_names_render_with_quotes() {
        let expr: Expr<String> = Expr::attribute("my attr");
        assert_eq!(expr.to_string(), "\"my attr\"");
        let expr: Expr<String> = Expr::attribute("plain");
        assert_eq!(expr.to_string(), "plain");
    }
}
