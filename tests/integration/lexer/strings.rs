use super::*;

#[test]
fn single_and_double_quotes() {
    let tokens = lex_ok(r#"'abc' "def""#);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].lexeme(), "abc");
    assert_eq!(tokens[1].lexeme(), "def");
}

#[test]
fn other_quote_inside_string() {
    assert_eq!(lex_ok(r#""it's""#)[0].lexeme(), "it's");
    assert_eq!(lex_ok(r#"'say "hi"'"#)[0].lexeme(), "say \"hi\"");
}

#[test]
fn escapes() {
    assert_eq!(lex_ok(r"'a\tb\nc\\'")[0].lexeme(), "a\tb\nc\\");
    assert_eq!(lex_ok(r"'\q'")[0].lexeme(), "\\q");
}

#[test]
fn empty_string() {
    assert_eq!(lex_ok("''")[0].lexeme(), "");
}

#[test]
fn dollar_inside_string_is_not_comment() {
    assert_eq!(lex_ok("'$5'")[0].lexeme(), "$5");
}

#[test]
fn unterminated() {
    for src in ["'", "\"", "'abc", "\"abc'"] {
        lex_fails(src);
    }
}
