//! Directive classification.
//!
//! Classification is deterministic and never fails. In order:
//!
//! 1. `$name := rhs` or `$name = rhs` is an assignment.
//! 2. Text starting with the sigil or the context prefix is a path reference.
//! 3. Anything else is a function call: the first whitespace-delimited word
//!    is the function name and the rest is its argument text.

/// Prefix marking a variable reference.
pub const SIGIL: char = '$';
/// Prefix marking a context path.
pub const CONTEXT_PREFIX: char = '.';

/// Classification tag of a directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Assignment,
    PathReference,
    FunctionCall,
}

/// Which assignment operator was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `:=`
    Declare,
    /// `=`
    Reassign,
}

/// A classified directive expression, borrowing from the template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expr<'a> {
    /// `$name := rhs`. `name` has the sigil stripped; `rhs` is trimmed.
    Assignment {
        name: &'a str,
        op: AssignOp,
        rhs: &'a str,
    },
    /// `$var.path` or `.Context.Path`, trimmed.
    PathReference(&'a str),
    /// `name rest...`. `rest` is the untrimmed-on-the-right argument text.
    FunctionCall { name: &'a str, rest: &'a str },
}

impl Expr<'_> {
    /// The classification tag.
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Expr::Assignment { .. } => DirectiveKind::Assignment,
            Expr::PathReference(_) => DirectiveKind::PathReference,
            Expr::FunctionCall { .. } => DirectiveKind::FunctionCall,
        }
    }
}

/// Classify the inner text of a directive (or a nested expression).
pub fn classify(inner: &str) -> Expr<'_> {
    let text = inner.trim();
    if let Some(assignment) = split_assignment(text) {
        return assignment;
    }
    if text.starts_with(SIGIL) || text.starts_with(CONTEXT_PREFIX) {
        return Expr::PathReference(text);
    }
    match text.find(char::is_whitespace) {
        Some(i) => Expr::FunctionCall {
            name: &text[..i],
            rest: text[i..].trim_start(),
        },
        None => Expr::FunctionCall {
            name: text,
            rest: "",
        },
    }
}

/// Split `$name := rhs` at the first `=`.
///
/// The left-hand side must be exactly a sigil plus an identifier, so the
/// first `=` in the text is the operator or this is not an assignment.
fn split_assignment(text: &str) -> Option<Expr<'_>> {
    let eq = text.find('=')?;
    if text[eq + 1..].starts_with('=') {
        return None;
    }
    let (lhs, op) = match text[..eq].strip_suffix(':') {
        Some(lhs) => (lhs, AssignOp::Declare),
        None => (&text[..eq], AssignOp::Reassign),
    };
    let name = lhs.trim().strip_prefix(SIGIL)?;
    if !is_identifier(name) {
        return None;
    }
    Some(Expr::Assignment {
        name,
        op,
        rhs: text[eq + 1..].trim(),
    })
}

/// Whether `text` is a non-empty run of ASCII word characters.
pub fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(is_word_byte)
}

#[inline]
pub(crate) fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
