//! Ccmd Lexer - directive scanning and argument lexing for command templates.
//!
//! A template is ordinary text with `{{ ... }}` directives embedded in it.
//! This crate does everything that can be done without evaluation:
//!
//! - [`scan_directives`]: find directive spans, preserving byte offsets
//! - [`classify`]: decide whether a directive is an assignment, a path
//!   reference, or a function call
//! - [`lex_args`]: split the remainder of a call into typed argument tokens
//!
//! Nothing here allocates beyond the returned vectors; tokens borrow from
//! the template.

mod args;
mod classify;
mod scanner;
mod span;

pub use args::{lex_args, ArgLexer, ArgToken, Literal};
pub use classify::{
    classify, is_identifier, AssignOp, DirectiveKind, Expr, CONTEXT_PREFIX, SIGIL,
};
pub use scanner::{scan_directives, Directives, RawDirective, CLOSE, OPEN};
pub use span::{Span, SpanError};
