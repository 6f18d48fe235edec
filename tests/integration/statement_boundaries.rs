mod common;

use common::{run_stdout, run_value};
use jolang::parse_source;
use jolang::preprocessor::MacroTable;
use jolang::span::Span;
use jolang::Value;

fn parses(source: &str) -> bool {
    let mut macros = MacroTable::new();
    parse_source(source, &mut macros).is_ok()
}

#[test]
fn statements_need_separators() {
    assert!(parses("a = 1\nb = 2"));
    assert!(!parses("a = 1 b = 2"));
    assert!(!parses("k l"));
    assert!(!parses("1 l"));
    assert!(!parses("l !r"));
}

#[test]
fn closing_brace_ends_statement() {
    assert!(parses("if(1){ a = 1 }"));
    assert!(parses("while(0){a}\n"));
}

#[test]
fn blank_lines_and_comments_between_statements() {
    assert!(parses("\n\n$ header\na = 1 $ trailing\n\n\nb = 2\n"));
}

#[test]
fn keyword_statements() {
    assert!(parses("func f(a, b){\n  return a\n}"));
    assert!(parses("for(;;){ break }"));
    assert!(parses("var x = 1"));
}

#[test]
fn loop_control_placement() {
    assert!(!parses("break"));
    assert!(!parses("continue"));
    assert!(!parses("return 1"));
    assert!(!parses("while(1){ func f(){ break } }"));
    assert!(parses("func f(){ while(1){ return 2 } }"));
}

#[test]
fn malformed_constructs() {
    for src in [
        "func(){}", "if(){}", "for(;){}", "for{}", "{}", "a+a=b", "t>>", "2=", "=s", "if(x){",
        "func f(1){}", "while 1 {}",
    ] {
        assert!(!parses(src), "expected failure for {src:?}");
    }
}

#[test]
fn error_position_points_at_offending_token() {
    let mut macros = MacroTable::new();
    let err = parse_source("a = (1 + 2\nb", &mut macros).unwrap_err();
    assert_eq!(err.span, Span::new(1, 10));
}

#[test]
fn elif_else_may_follow_on_new_lines() {
    let src = "x = 2\nif(x == 1){\n  print('one')\n}\nelif(x == 2){\n  print('two')\n}\nelse{\n  print('other')\n}";
    assert_eq!(run_stdout(src), "two\n");
}

#[test]
fn multiline_arguments_and_arrays() {
    assert_eq!(run_value("xs = [\n  1,\n  2,\n]\nlen(xs)"), Value::Integer(2));
    assert_eq!(run_stdout("print(\n  'a',\n  'b'\n)"), "a b\n");
}
