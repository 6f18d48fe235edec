// Tokenizer tests, grouped by category:
// - numbers: integer/float/hex/octal/binary classification
// - strings: quoting, escapes, unterminated literals
// - operators: longest-match operator tables
// - spans: line/column tracking
// - errors: invalid input

use jolang::lexer::{lex, Token, TokenKind};
use jolang::span::Span;

/// Lex source and expect success
pub fn lex_ok(source: &str) -> Vec<Token> {
    lex(source).expect("lexing should succeed")
}

/// Lex source and expect failure
pub fn lex_fails(source: &str) {
    assert!(lex(source).is_err(), "lexing should fail for: {source:?}");
}

/// Assert token kinds match (ignoring spans and lexemes)
pub fn assert_tokens(source: &str, expected: &[TokenKind]) {
    let actual: Vec<TokenKind> = lex_ok(source).iter().map(|t| t.kind).collect();
    assert_eq!(actual, expected, "token mismatch for source: {source:?}");
}

/// Assert the token at `idx` starts at (line, column)
pub fn assert_span(source: &str, idx: usize, line: usize, column: usize) {
    let tokens = lex_ok(source);
    assert!(idx < tokens.len(), "token index {idx} out of bounds (len={})", tokens.len());
    assert_eq!(tokens[idx].span, Span::new(line, column), "span mismatch for token {idx} in {source:?}");
}

mod strings;
mod operators;
mod spans;
mod errors;
