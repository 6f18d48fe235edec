mod common;

use common::{run_stdout, run_value};
use jolang::lexer::{tokenize, TokenKind};
use jolang::preprocessor::{preprocess, MacroTable};
use jolang::{expand_tokens, Value};

fn kinds(source: &str, macros: &mut MacroTable) -> Vec<TokenKind> {
    expand_tokens(source, macros).unwrap().iter().map(|t| t.kind).collect()
}

#[test]
fn macro_expands_to_string_argument() {
    assert_eq!(run_stdout("%macro name 'xyz'\nprint(name)"), "xyz\n");
}

#[test]
fn macro_body_can_be_an_expression() {
    assert_eq!(run_value("%macro double * 2\n21 double"), Value::Integer(42));
}

#[test]
fn self_reference_does_not_recurse() {
    let mut macros = MacroTable::new();
    assert_eq!(
        kinds("%macro a a a\na", &mut macros),
        vec![TokenKind::Identifier, TokenKind::Identifier]
    );
}

#[test]
fn only_later_tokens_expand() {
    let mut macros = MacroTable::new();
    let tokens = expand_tokens("k\n%macro k 7\nk", &mut macros).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].lexeme(), "7");
}

#[test]
fn redefinition_replaces_body() {
    assert_eq!(run_value("%macro v 1\n%macro v 2\nv"), Value::Integer(2));
}

#[test]
fn macros_match_on_kind_and_lexeme() {
    // A string with the same text as a macro name is untouched.
    assert_eq!(run_stdout("%macro x 1\nprint('x', x)"), "x 1\n");
}

#[test]
fn indented_percent_is_modulo() {
    assert_eq!(run_value("a = 7\n a % 4"), Value::Integer(3));
}

#[test]
fn stream_is_lazy_until_error() {
    let mut macros = MacroTable::new();
    let mut stream = preprocess(tokenize("ok\n%macro 1\n"), &mut macros);
    assert!(stream.next().unwrap().is_ok());
    assert!(stream.next().unwrap().is_ok());
    assert!(stream.next().unwrap().is_err());
    assert!(stream.next().is_none());
}

#[test]
fn malformed_directives() {
    for src in ["%", "%macro 0\n", "%macro", "%macro ~ []\n", "%define x 1\n", "%macro x 1"] {
        let mut macros = MacroTable::new();
        assert!(expand_tokens(src, &mut macros).is_err(), "expected failure for {src:?}");
    }
}
