use super::*;

#[test]
fn first_token_at_origin() {
    assert_span("abc", 0, 1, 0);
}

#[test]
fn column_is_token_start() {
    assert_span("a >>= b", 1, 1, 2);
    assert_span("a >>= b", 2, 1, 6);
}

#[test]
fn newline_resets_column() {
    assert_span("a\n  b", 1, 1, 1);
    assert_span("a\n  b", 2, 2, 2);
}

#[test]
fn tabs_count_as_one_column() {
    assert_span("\tx", 0, 1, 1);
}

#[test]
fn comment_does_not_shift_following_line() {
    assert_span("x $ note\ny", 2, 2, 0);
}

#[test]
fn string_spanning_lines() {
    let source = "'one\ntwo' z";
    assert_span(source, 0, 1, 0);
    assert_span(source, 1, 2, 5);
}
