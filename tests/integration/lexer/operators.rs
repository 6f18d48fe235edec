use super::*;
use TokenKind::*;

#[test]
fn single_char_operators() {
    assert_tokens("+ - * / % ~ ! & | ^ < > =", &[
        Add, Subtract, Multiply, Divide, Modulo, Tilde, LogicNot, BinAnd, BinOr, Xor, LesserThan,
        GreaterThan, Assign,
    ]);
}

#[test]
fn two_char_operators() {
    assert_tokens("<< >> == != <= >= && ||", &[
        LeftShift, RightShift, IsEqual, NotEqual, LessEqual, GreatEqual, LogicAnd, LogicOr,
    ]);
}

#[test]
fn inplace_operators() {
    assert_tokens("+= -= *= /= %= ^= &= |= <<= >>=", &[
        InplaceAdd, InplaceSubtract, InplaceMultiply, InplaceDivide, InplaceModulo, InplaceXor,
        InplaceBinAnd, InplaceBinOr, InplaceLeftShift, InplaceRightShift,
    ]);
}

#[test]
fn longest_match_wins() {
    assert_tokens(">>=", &[InplaceRightShift]);
    assert_tokens(">>>", &[RightShift, GreaterThan]);
    assert_tokens("===", &[IsEqual, Assign]);
    assert_tokens("a---1", &[Identifier, Subtract, Subtract, Subtract, Integer]);
}

#[test]
fn punctuation() {
    assert_tokens("( ) [ ] { } , : ; .", &[
        LeftParen, RightParen, LeftBracket, RightBracket, LeftBrace, RightBrace, Comma, Colon,
        Semicolon, Dot,
    ]);
}

#[test]
fn keywords_lex_as_identifiers() {
    // Re-tagging happens in the parser.
    assert_tokens("func while", &[Identifier, Identifier]);
}

#[test]
fn comments_are_suppressed() {
    assert_tokens("a $ comment + - *\nb", &[Identifier, Newline, Identifier]);
    assert_tokens("$ only a comment", &[]);
}
