mod common;

use common::run_value;
use jolang::parse_source;
use jolang::parser::ast::{BinaryOp, CompareOp, Expr, Stmt, UnaryOp};
use jolang::preprocessor::MacroTable;
use jolang::Value;

fn expr(source: &str) -> Expr {
    let mut macros = MacroTable::new();
    let block = parse_source(source, &mut macros).unwrap();
    match block.stmts.into_iter().next().map(|s| s.node) {
        Some(Stmt::Expr(e)) => e.node,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn binary_op(e: &Expr) -> BinaryOp {
    match e {
        Expr::Binary { op, .. } => *op,
        other => panic!("expected binary node, got {other:?}"),
    }
}

#[test]
fn logic_or_is_loosest() {
    let e = expr("a && b || c && d");
    assert_eq!(binary_op(&e), BinaryOp::LogicOr);
}

#[test]
fn comparison_binds_looser_than_bitwise() {
    let Expr::Compare { left, op, .. } = expr("a | b == c") else { panic!() };
    assert_eq!(op, CompareOp::Equals);
    assert_eq!(binary_op(&left.node), BinaryOp::Or);
}

#[test]
fn bitwise_levels_order() {
    // | < ^ < & < shift < additive < multiplicative
    let e = expr("a | b ^ c & d << e + f * g");
    assert_eq!(binary_op(&e), BinaryOp::Or);
    let Expr::Binary { right, .. } = e else { panic!() };
    assert_eq!(binary_op(&right.node), BinaryOp::Xor);
    let Expr::Binary { right, .. } = right.node else { panic!() };
    assert_eq!(binary_op(&right.node), BinaryOp::And);
    let Expr::Binary { right, .. } = right.node else { panic!() };
    assert_eq!(binary_op(&right.node), BinaryOp::LeftShift);
    let Expr::Binary { right, .. } = right.node else { panic!() };
    assert_eq!(binary_op(&right.node), BinaryOp::Add);
    let Expr::Binary { right, .. } = right.node else { panic!() };
    assert_eq!(binary_op(&right.node), BinaryOp::Multiply);
}

#[test]
fn comparisons_chain_left() {
    let Expr::Compare { left, op, .. } = expr("1<2>3") else { panic!() };
    assert_eq!(op, CompareOp::GreaterThan);
    assert!(matches!(left.node, Expr::Compare { op: CompareOp::LesserThan, .. }));
}

#[test]
fn unary_binds_tighter_than_multiplication() {
    let Expr::Binary { left, op, .. } = expr("-a * b") else { panic!() };
    assert_eq!(op, BinaryOp::Multiply);
    assert!(matches!(left.node, Expr::Unary { op: UnaryOp::Subtract, .. }));
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(run_value("10 - 3 - 2"), Value::Integer(5));
    assert_eq!(run_value("2 * 3 % 4"), Value::Integer(2));
}

#[test]
fn parentheses_override() {
    assert_eq!(run_value("2 * (3 + 4)"), Value::Integer(14));
    assert_eq!(run_value("(1 < 2) == true"), Value::Boolean(true));
}

#[test]
fn call_chain_repeats() {
    let src = "func make(){\n  func inner(x){ return x + 1 }\n  return inner\n}\nmake()(41)";
    assert_eq!(run_value(src), Value::Integer(42));
}

#[test]
fn postfix_index_after_call() {
    let src = "func pair(){ return [1, 2] }\npair()[1]";
    assert_eq!(run_value(src), Value::Integer(2));
}
