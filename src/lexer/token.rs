use logos::Logos;
use serde::{Deserialize, Serialize};

use crate::span::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[logos(skip r"[ \t\r\f\x0B]+")]
pub enum TokenKind {
    // Literals
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,
    #[regex(r#""([^"\\]|\\(.|\n))*""#)]
    #[regex(r#"'([^'\\]|\\(.|\n))*'"#)]
    String,
    // The scanner swallows every letter, digit and dot after the leading
    // digit; the tokenizer then classifies the run.
    #[regex(r"[0-9][0-9a-zA-Z.]*")]
    Integer,
    Float,

    /// Identifier re-tagged by the parser (never produced by the scanner).
    Keyword,

    // Operators
    #[token("+")]
    Add,
    #[token("-")]
    Subtract,
    #[token("*")]
    Multiply,
    #[token("/")]
    Divide,
    #[token("%")]
    Modulo,
    #[token("~")]
    Tilde,
    #[token("!")]
    LogicNot,
    #[token("&")]
    BinAnd,
    #[token("|")]
    BinOr,
    #[token("^")]
    Xor,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("=")]
    Assign,
    #[token("+=")]
    InplaceAdd,
    #[token("-=")]
    InplaceSubtract,
    #[token("*=")]
    InplaceMultiply,
    #[token("/=")]
    InplaceDivide,
    #[token("%=")]
    InplaceModulo,
    #[token("^=")]
    InplaceXor,
    #[token("&=")]
    InplaceBinAnd,
    #[token("|=")]
    InplaceBinOr,
    #[token("<<=")]
    InplaceLeftShift,
    #[token(">>=")]
    InplaceRightShift,
    #[token("==")]
    IsEqual,
    #[token("!=")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreatEqual,
    #[token("<")]
    LesserThan,
    #[token(">")]
    GreaterThan,
    #[token("&&")]
    LogicAnd,
    #[token("||")]
    LogicOr,

    // Punctuation
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,

    // Newline (statement separator)
    #[token("\n")]
    Newline,

    // Comments (suppressed by the tokenizer)
    #[regex(r"\$[^\n]*")]
    Comment,
}

impl TokenKind {
    /// True for `=` and every in-place assignment operator.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::InplaceAdd
                | TokenKind::InplaceSubtract
                | TokenKind::InplaceMultiply
                | TokenKind::InplaceDivide
                | TokenKind::InplaceModulo
                | TokenKind::InplaceXor
                | TokenKind::InplaceBinAnd
                | TokenKind::InplaceBinOr
                | TokenKind::InplaceLeftShift
                | TokenKind::InplaceRightShift
        )
    }
}

/// Words the parser re-tags from `Identifier` to `Keyword`.
pub const KEYWORDS: &[&str] = &[
    "func", "if", "elif", "else", "while", "for", "return", "break", "continue", "var",
];

/// Returns true if the given string is a JoLang keyword.
pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

/// A positioned token. `lexeme` holds the literal content for identifiers,
/// keywords and literals; operators and punctuation carry `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Option<String>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: Option<String>, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    pub fn lexeme(&self) -> &str {
        self.lexeme.as_deref().unwrap_or("")
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme() == word
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::String => write!(f, "string"),
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::Float => write!(f, "float"),
            TokenKind::Keyword => write!(f, "keyword"),
            TokenKind::Add => write!(f, "+"),
            TokenKind::Subtract => write!(f, "-"),
            TokenKind::Multiply => write!(f, "*"),
            TokenKind::Divide => write!(f, "/"),
            TokenKind::Modulo => write!(f, "%"),
            TokenKind::Tilde => write!(f, "~"),
            TokenKind::LogicNot => write!(f, "!"),
            TokenKind::BinAnd => write!(f, "&"),
            TokenKind::BinOr => write!(f, "|"),
            TokenKind::Xor => write!(f, "^"),
            TokenKind::LeftShift => write!(f, "<<"),
            TokenKind::RightShift => write!(f, ">>"),
            TokenKind::Assign => write!(f, "="),
            TokenKind::InplaceAdd => write!(f, "+="),
            TokenKind::InplaceSubtract => write!(f, "-="),
            TokenKind::InplaceMultiply => write!(f, "*="),
            TokenKind::InplaceDivide => write!(f, "/="),
            TokenKind::InplaceModulo => write!(f, "%="),
            TokenKind::InplaceXor => write!(f, "^="),
            TokenKind::InplaceBinAnd => write!(f, "&="),
            TokenKind::InplaceBinOr => write!(f, "|="),
            TokenKind::InplaceLeftShift => write!(f, "<<="),
            TokenKind::InplaceRightShift => write!(f, ">>="),
            TokenKind::IsEqual => write!(f, "=="),
            TokenKind::NotEqual => write!(f, "!="),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::GreatEqual => write!(f, ">="),
            TokenKind::LesserThan => write!(f, "<"),
            TokenKind::GreaterThan => write!(f, ">"),
            TokenKind::LogicAnd => write!(f, "&&"),
            TokenKind::LogicOr => write!(f, "||"),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::LeftBrace => write!(f, "{{"),
            TokenKind::RightBrace => write!(f, "}}"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Comment => write!(f, "comment"),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.lexeme) {
            (TokenKind::String, Some(text)) => write!(f, "{text:?}"),
            (_, Some(text)) => write!(f, "'{text}'"),
            (kind, None) => write!(f, "'{kind}'"),
        }
    }
}
