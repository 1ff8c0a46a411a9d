//! Directive scanner.
//!
//! Finds `{{ ... }}` spans left to right. Matching is non-greedy: the first
//! `}}` after an opening `{{` closes the directive, so braces do not nest.
//! Newlines inside a directive are allowed. An opening `{{` with no closing
//! `}}` ends the scan; the remainder of the template is literal text.

use crate::span::Span;

/// Opening directive delimiter.
pub const OPEN: &str = "{{";
/// Closing directive delimiter.
pub const CLOSE: &str = "}}";

/// One directive found in a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawDirective<'a> {
    /// Span of the whole directive, delimiters included.
    pub span: Span,
    /// Text between the delimiters, untrimmed.
    pub inner: &'a str,
}

/// Iterator over the directives of a template, in source order.
#[derive(Clone, Debug)]
pub struct Directives<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Directives<'a> {
    /// Start scanning `source` from the beginning.
    pub fn new(source: &'a str) -> Self {
        Directives { source, pos: 0 }
    }
}

impl<'a> Iterator for Directives<'a> {
    type Item = RawDirective<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.source.get(self.pos..)?;
        let Some(open) = rest.find(OPEN) else {
            self.pos = self.source.len();
            return None;
        };
        let start = self.pos + open;
        let body_start = start + OPEN.len();
        let Some(close) = self.source[body_start..].find(CLOSE) else {
            // Unterminated: leave the rest as literal text.
            self.pos = self.source.len();
            return None;
        };
        let body_end = body_start + close;
        let end = body_end + CLOSE.len();
        self.pos = end;

        // Templates longer than u32::MAX are rejected before scanning; stop
        // rather than produce a wrapped span.
        let span = Span::try_from_range(start..end).ok()?;
        Some(RawDirective {
            span,
            inner: &self.source[body_start..body_end],
        })
    }
}

/// Collect every directive in `source`, in source order.
pub fn scan_directives(source: &str) -> Vec<RawDirective<'_>> {
    Directives::new(source).collect()
}
