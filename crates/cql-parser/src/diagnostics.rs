//! Ariadne-based rendering of parse errors.
//!
//! Renders a [`CqlError`] against the input it came from into a labeled,
//! colorless report string. Output is colorless for consistent test
//! comparison; callers wanting terminal colors can build their own report
//! from the error's span and message.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use cql_common::span::LineIndex;

use crate::error::CqlError;

/// Stable code for each error kind.
fn error_code(error: &CqlError) -> &'static str {
    match error {
        CqlError::Lexical { .. } => "E0001",
        CqlError::Syntax { .. } => "E0002",
        CqlError::Literal { .. } => "E0003",
    }
}

/// Clamp a span to the source bounds and widen zero-length spans to one
/// character so ariadne has something to underline.
fn clamp(range: Range<usize>, source_len: usize) -> Range<usize> {
    let start = range.start.min(source_len);
    let end = range.end.min(source_len).max(start);
    if start == end {
        start..end.saturating_add(1).min(source_len).max(start)
    } else {
        start..end
    }
}

/// Render an error into a formatted diagnostic string.
pub fn render(error: &CqlError, source: &str) -> String {
    let config = Config::default().with_color(false);
    let span = error.span();
    let range = clamp(span.start as usize..span.end as usize, source.len());

    let label = match error {
        CqlError::Lexical { .. } => "not valid here",
        CqlError::Syntax { .. } => "no rule matches this",
        CqlError::Literal { .. } => "rejected by the literal factory",
    };

    let report = Report::<Range<usize>>::build(ReportKind::Error, range.clone())
        .with_code(error_code(error))
        .with_message(error.to_string())
        .with_config(config)
        .with_label(Label::new(range).with_message(label))
        .finish();

    let mut buf = Vec::new();
    if report.write(Source::from(source), &mut buf).is_err() {
        return error.to_string();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// The 1-based (line, column) position of an error within its input.
pub fn line_col(error: &CqlError, source: &str) -> (u32, u32) {
    LineIndex::new(source).line_col(error.offset())
}
