// Property tests for the parser:
// 1. Determinism: the same source always produces the same tree
// 2. No panics on arbitrary token soup
// 3. Trailing blank lines and comments never change the tree

use jolang::parse_source;
use jolang::preprocessor::MacroTable;
use proptest::prelude::*;

fn parse(source: &str) -> Result<jolang::parser::ast::Block, jolang::diagnostics::SyntaxError> {
    parse_source(source, &mut MacroTable::new())
}

fn arb_atom() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000).prop_map(|n| n.to_string()),
        "[a-z]{1,6}".prop_filter("not a keyword", |s| !jolang::lexer::is_keyword(s)),
        "[a-z ]{0,8}".prop_map(|s| format!("'{s}'")),
    ]
}

fn arb_expr() -> impl Strategy<Value = String> {
    arb_atom().prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(vec!["+", "-", "*", "/", "%", "<<", "&", "||", "==", "<="]), inner.clone())
                .prop_map(|(l, op, r)| format!("{l} {op} {r}")),
            inner.clone().prop_map(|e| format!("({e})")),
            inner.clone().prop_map(|e| format!("-{e}")),
            prop::collection::vec(inner.clone(), 0..3).prop_map(|xs| format!("[{}]", xs.join(", "))),
            (inner.clone(), inner).prop_map(|(f, a)| format!("f({f}, {a})")),
        ]
    })
}

fn arb_program() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            arb_expr(),
            arb_expr().prop_map(|e| format!("x = {e}")),
            arb_expr().prop_map(|e| format!("if({e}){{ y = 1 }} else {{ y = 2 }}")),
            arb_expr().prop_map(|e| format!("while(false){{ print({e}) }}")),
            arb_expr().prop_map(|e| format!("func g(a, b){{ return {e} }}")),
        ],
        1..6,
    )
    .prop_map(|stmts| stmts.join("\n"))
}

#[test]
fn prop_generated_programs_parse() {
    proptest!(|(source in arb_program())| {
        prop_assert!(parse(&source).is_ok(), "failed to parse:\n{}", source);
    });
}

#[test]
fn prop_parse_is_deterministic() {
    proptest!(|(source in arb_program())| {
        prop_assert_eq!(parse(&source), parse(&source));
    });
}

#[test]
fn prop_parser_never_panics() {
    let soup = prop::collection::vec(
        prop::sample::select(vec![
            "x", "1", "2.5", "'s'", "(", ")", "[", "]", "{", "}", ",", ".", "+", "-", "*",
            "=", "+=", "==", "!", "~", "&&", "\n", "if", "else", "elif", "while", "for",
            "func", "return", "break", "continue", "var", "%macro", ";",
        ]),
        0..40,
    );
    proptest!(|(tokens in soup)| {
        let _ = parse(&tokens.join(" "));
    });
}

#[test]
fn prop_trailing_trivia_is_ignored() {
    proptest!(|(source in arb_program(), blank in 0usize..4, comment in "[a-z ]{0,10}")| {
        let padded = format!("{source}{}\n$ {comment}\n", "\n".repeat(blank));
        prop_assert_eq!(parse(&source), parse(&padded));
    });
}
