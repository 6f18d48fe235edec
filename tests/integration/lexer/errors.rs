use super::*;

#[test]
fn unrecognized_characters() {
    for src in ["@", "a # b", "`", "x = ?"] {
        lex_fails(src);
    }
}

#[test]
fn error_reports_position() {
    let err = lex("ok\n  @").unwrap_err();
    assert_eq!(err.span, Span::new(2, 2));
}

#[test]
fn error_after_valid_prefix() {
    let err = lex("a + 0o9").unwrap_err();
    assert_eq!(err.span, Span::new(1, 4));
    assert!(err.msg.contains("0o9"), "{}", err.msg);
}
