//! Shared types for the CQL front end: byte-offset spans, tokens, and
//! lexer errors. Kept free of parser dependencies so external tooling
//! (highlighters, completion engines) can consume the token stream alone.

pub mod error;
pub mod span;
pub mod token;
