// Property tests for the tokenizer: it must never panic, must be
// deterministic, and must report positions that agree with the source.

use jolang::lexer::{lex, TokenKind};
use proptest::prelude::*;

#[test]
fn prop_lexer_never_panics() {
    proptest!(|(source in "\\PC{0,500}")| {
        let _ = lex(&source);
    });
}

#[test]
fn prop_lexer_is_deterministic() {
    proptest!(|(source in "\\PC{0,300}")| {
        prop_assert_eq!(lex(&source), lex(&source));
    });
}

#[test]
fn prop_integer_literals_round_trip() {
    proptest!(|(n in 0i64..=i64::MAX)| {
        let tokens = lex(&n.to_string()).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::Integer);
        prop_assert_eq!(tokens[0].lexeme(), n.to_string());
    });
}

#[test]
fn prop_hex_literals_are_normalised_to_decimal() {
    proptest!(|(n in 0i64..=i64::MAX)| {
        let tokens = lex(&format!("{n:#x}")).unwrap();
        prop_assert_eq!(tokens[0].lexeme(), n.to_string());
    });
}

#[test]
fn prop_identifiers_lex_as_one_token() {
    proptest!(|(name in "[a-zA-Z_][a-zA-Z0-9_]{0,20}")| {
        let tokens = lex(&name).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::Identifier);
        prop_assert_eq!(tokens[0].lexeme(), name.as_str());
    });
}

#[test]
fn prop_leading_spaces_shift_columns() {
    proptest!(|(pad in 0usize..40, name in "[a-z]{1,8}")| {
        let source = format!("{}{}", " ".repeat(pad), name);
        let tokens = lex(&source).unwrap();
        prop_assert_eq!(tokens[0].span.line, 1);
        prop_assert_eq!(tokens[0].span.column, pad);
    });
}

#[test]
fn prop_lines_are_counted() {
    proptest!(|(blank in 0usize..20)| {
        let source = format!("{}value", "\n".repeat(blank));
        let tokens = lex(&source).unwrap();
        let last = tokens.last().unwrap();
        prop_assert_eq!(last.span.line, blank + 1);
        prop_assert_eq!(last.span.column, 0);
    });
}

#[test]
fn prop_string_contents_are_preserved() {
    proptest!(|(body in "[a-zA-Z0-9 ,.!?]{0,40}")| {
        let tokens = lex(&format!("'{body}'")).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::String);
        prop_assert_eq!(tokens[0].lexeme(), body.as_str());
    });
}
