//! Property-based tests for the directive scanner and argument lexer.

use ccmd_lexer::{lex_args, scan_directives, ArgToken, Literal};
use proptest::prelude::*;

/// Text that can never contain a delimiter.
fn arb_literal_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?$\n]{0,40}"
}

/// Directive bodies without braces.
fn arb_body() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .$\"():=\n]{0,30}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn text_without_braces_has_no_directives(text in "[^{}]{0,80}") {
        prop_assert!(scan_directives(&text).is_empty());
    }

    #[test]
    fn spans_slice_back_to_directives(
        parts in prop::collection::vec((arb_literal_text(), arb_body()), 0..6),
        tail in arb_literal_text(),
    ) {
        let mut template = String::new();
        for (text, body) in &parts {
            template.push_str(text);
            template.push_str("{{");
            template.push_str(body);
            template.push_str("}}");
        }
        template.push_str(&tail);

        let found = scan_directives(&template);
        prop_assert_eq!(found.len(), parts.len());
        let mut last_end = 0;
        for (directive, (_, body)) in found.iter().zip(&parts) {
            prop_assert_eq!(directive.inner, body.as_str());
            let expected = format!("{{{{{body}}}}}");
            prop_assert_eq!(directive.span.slice(&template), Some(expected.as_str()));
            prop_assert!(directive.span.start >= last_end);
            last_end = directive.span.end;
        }
    }

    #[test]
    fn integers_coerce_to_numbers(n in any::<i64>()) {
        let text = n.to_string();
        prop_assert_eq!(lex_args(&text), vec![ArgToken::Literal(Literal::Int(n))]);
    }

    #[test]
    fn quoted_words_survive_verbatim(words in prop::collection::vec("[a-z ]{0,12}", 1..5)) {
        let src = words
            .iter()
            .map(|w| format!("\"{w}\""))
            .collect::<Vec<_>>()
            .join(" ");
        let expected: Vec<ArgToken<'_>> =
            words.iter().map(|w| ArgToken::Quoted(w.as_str())).collect();
        prop_assert_eq!(lex_args(&src), expected);
    }
}
