//! AST visitor for backend translators.
//!
//! Translators (relational query builders, document-database filters,
//! spatial SQL fragments) walk the closed variant set with this trait.
//! Override `visit_*` methods for custom behaviour at specific nodes and
//! call the `walk_*` functions to continue into children.
//!
//! Two obligations sit with the translator, not the parser:
//!
//! - every negatable node carries a `negated` flag that must be honoured
//!   uniformly;
//! - a [`TemporalOperand::Period`](crate::ast::TemporalOperand) with a
//!   duration on one side is unresolved -- the translator computes
//!   `instant +/- duration` to obtain concrete bounds, and converts
//!   `DWITHIN`/`BEYOND` distance units if the backend expects one unit.

use crate::ast::{Expr, Predicate, Value};

/// AST visitor.
///
/// The visitor can mutate its own state during traversal; the AST itself
/// remains immutable.
pub trait Visitor<V> {
    /// Visit a predicate node.
    fn visit_predicate(&mut self, predicate: &Predicate<V>) {
        walk_predicate(self, predicate);
    }

    /// Visit an expression node.
    fn visit_expr(&mut self, expr: &Expr<V>) {
        walk_expr(self, expr);
    }

    /// Visit a literal value.
    fn visit_value(&mut self, value: &Value<V>) {
        // Values have no children to walk.
        let _ = value;
    }
}

/// Traverse every child of a predicate node.
pub fn walk_predicate<V, W: Visitor<V> + ?Sized>(visitor: &mut W, predicate: &Predicate<V>) {
    match predicate {
        Predicate::Not(inner) => visitor.visit_predicate(inner),
        Predicate::Combination { lhs, rhs, .. } => {
            visitor.visit_predicate(lhs);
            visitor.visit_predicate(rhs);
        }
        Predicate::Comparison { lhs, rhs, .. } | Predicate::Spatial { lhs, rhs, .. } => {
            visitor.visit_expr(lhs);
            visitor.visit_expr(rhs);
        }
        Predicate::Between { lhs, low, high, .. } => {
            visitor.visit_expr(lhs);
            visitor.visit_expr(low);
            visitor.visit_expr(high);
        }
        Predicate::In { lhs, choices, .. } => {
            visitor.visit_expr(lhs);
            for choice in choices {
                visitor.visit_expr(choice);
            }
        }
        Predicate::Like { lhs, .. }
        | Predicate::Null { lhs, .. }
        | Predicate::Temporal { lhs, .. }
        | Predicate::BBox { lhs, .. } => {
            visitor.visit_expr(lhs);
        }
    }
}

/// Traverse every child of an expression node.
pub fn walk_expr<V, W: Visitor<V> + ?Sized>(visitor: &mut W, expr: &Expr<V>) {
    match expr {
        Expr::Attribute(_) => {}
        Expr::Literal(value) => visitor.visit_value(value),
        Expr::Arithmetic { lhs, rhs, .. } => {
            visitor.visit_expr(lhs);
            visitor.visit_expr(rhs);
        }
    }
}
