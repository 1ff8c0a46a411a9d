//! Argument lexer.
//!
//! Splits the argument text of a call into typed tokens. Recognition order
//! at each position (first match wins):
//!
//! 1. `"..."` or `'...'` - quoted literal, taken verbatim (no escapes)
//! 2. `( ... )` - nested expression; parentheses nest, quotes are respected
//! 3. `$name` optionally followed by `.seg` segments - variable reference
//! 4. `.seg` segments - context path
//! 5. any other non-whitespace run - bare token, coerced to a number or
//!    boolean when it reads as one
//!
//! An unterminated quote or unbalanced group falls through to a bare token.

use crate::classify::{is_word_byte, CONTEXT_PREFIX, SIGIL};

/// A bare token after coercion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal<'a> {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(&'a str),
}

/// One lexed argument.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgToken<'a> {
    /// Contents of a quoted literal, quotes stripped.
    Quoted(&'a str),
    /// Inner text of a parenthesised nested expression.
    Group(&'a str),
    /// `$name.seg.seg` with the sigil stripped from `name`.
    Variable { name: &'a str, path: Vec<&'a str> },
    /// `.Seg.Seg` segments, prefix dots stripped.
    ContextPath(Vec<&'a str>),
    /// Bare token.
    Literal(Literal<'a>),
}

impl ArgToken<'_> {
    /// A bare variable reference with no property path, if this is one.
    pub fn as_plain_variable(&self) -> Option<&str> {
        match self {
            ArgToken::Variable { name, path } if path.is_empty() => Some(name),
            _ => None,
        }
    }

    /// Whether the token is a literal that needs no resolution.
    pub fn is_literal(&self) -> bool {
        matches!(self, ArgToken::Quoted(_) | ArgToken::Literal(_))
    }
}

/// Streaming lexer over argument text.
#[derive(Clone, Debug)]
pub struct ArgLexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> ArgLexer<'a> {
    pub fn new(src: &'a str) -> Self {
        ArgLexer { src, pos: 0 }
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    /// Try a quoted literal at the current position.
    fn quoted(&mut self, quote: char) -> Option<ArgToken<'a>> {
        let body = &self.rest()[1..];
        let close = body.find(quote)?;
        self.pos += 1 + close + 1;
        Some(ArgToken::Quoted(&body[..close]))
    }

    /// Try a balanced parenthesised group at the current position.
    fn group(&mut self) -> Option<ArgToken<'a>> {
        let rest = self.rest();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        for (i, c) in rest.char_indices() {
            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.pos += i + 1;
                        return Some(ArgToken::Group(&rest[1..i]));
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Length of the leading word run of `s`.
    fn word_len(s: &str) -> usize {
        s.bytes().take_while(|&b| is_word_byte(b)).count()
    }

    /// Consume `.seg.seg...` starting at the current position.
    fn segments(&mut self) -> Vec<&'a str> {
        let mut path = Vec::new();
        loop {
            let rest = self.rest();
            let Some(after_dot) = rest.strip_prefix(CONTEXT_PREFIX) else {
                break;
            };
            let len = Self::word_len(after_dot);
            if len == 0 {
                break;
            }
            path.push(&after_dot[..len]);
            self.pos += 1 + len;
        }
        path
    }

    /// Try a `$name.path` variable reference.
    fn variable(&mut self) -> Option<ArgToken<'a>> {
        let after_sigil = &self.rest()[SIGIL.len_utf8()..];
        let len = Self::word_len(after_sigil);
        if len == 0 {
            return None;
        }
        let name = &after_sigil[..len];
        self.pos += SIGIL.len_utf8() + len;
        let path = self.segments();
        Some(ArgToken::Variable { name, path })
    }

    /// Try a `.Context.Path` reference.
    fn context_path(&mut self) -> Option<ArgToken<'a>> {
        let path = self.segments();
        if path.is_empty() {
            None
        } else {
            Some(ArgToken::ContextPath(path))
        }
    }

    /// Consume a bare non-whitespace run.
    fn bare(&mut self) -> ArgToken<'a> {
        let rest = self.rest();
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += len;
        ArgToken::Literal(coerce_bare(&rest[..len]))
    }
}

impl<'a> Iterator for ArgLexer<'a> {
    type Item = ArgToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let first = self.rest().chars().next()?;
        let token = match first {
            '"' | '\'' => self.quoted(first),
            '(' => self.group(),
            SIGIL => self.variable(),
            CONTEXT_PREFIX => self.context_path(),
            _ => None,
        };
        Some(token.unwrap_or_else(|| self.bare()))
    }
}

/// Lex all argument tokens of `src`.
pub fn lex_args(src: &str) -> Vec<ArgToken<'_>> {
    ArgLexer::new(src).collect()
}

/// Coerce a bare token: number first, then `true`/`false`, else text.
pub(crate) fn coerce_bare(text: &str) -> Literal<'_> {
    if looks_numeric(text) {
        if let Ok(n) = text.parse::<i64>() {
            return Literal::Int(n);
        }
        if let Ok(f) = text.parse::<f64>() {
            return Literal::Float(f);
        }
    }
    match text {
        "true" => Literal::Bool(true),
        "false" => Literal::Bool(false),
        _ => Literal::Text(text),
    }
}

/// Only ASCII numerals are numbers; `inf` and `NaN` stay words.
fn looks_numeric(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}
