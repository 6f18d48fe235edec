use serde::{Deserialize, Serialize};

use crate::span::Spanned;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Expression or assignment evaluated for its effect.
    Expr(Spanned<Expr>),
    Var {
        name: Spanned<String>,
        value: Option<Spanned<Expr>>,
    },
    Function {
        name: Spanned<String>,
        params: Vec<Spanned<String>>,
        body: Block,
    },
    If(IfStmt),
    While {
        condition: Spanned<Expr>,
        body: Block,
    },
    For {
        /// `[init, condition, step]`; omitted clauses are `Expr::Empty`.
        parts: Box<[Spanned<Expr>; 3]>,
        body: Block,
    },
    Return(Option<Spanned<Expr>>),
    Break,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Spanned<Expr>,
    pub body: Block,
    /// Each `elif` is an `If` with no elifs or else of its own.
    pub elifs: Vec<Spanned<IfStmt>>,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Integer(i64),
    Float(f64),
    String(String),
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    Binary {
        left: Box<Spanned<Expr>>,
        op: BinaryOp,
        right: Box<Spanned<Expr>>,
    },
    Compare {
        left: Box<Spanned<Expr>>,
        op: CompareOp,
        right: Box<Spanned<Expr>>,
    },
    Assignment {
        name: Spanned<String>,
        op: AssignOp,
        content: Box<Spanned<Expr>>,
    },
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
    Array(Vec<Spanned<Expr>>),
    Attribute {
        object: Box<Spanned<Expr>>,
        name: Spanned<String>,
    },
    Index {
        object: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    /// `[Type] expr`; reserved syntax with no runtime meaning.
    Cast {
        ty: Spanned<String>,
        expr: Box<Spanned<Expr>>,
    },
    /// Explicit placeholder for an intentionally empty expression.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Tilde,
    Add,
    Subtract,
    LogicalNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Or,
    And,
    Xor,
    LeftShift,
    RightShift,
    LogicAnd,
    LogicOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Equals,
    NotEqual,
    LessEqual,
    GreatEqual,
    LesserThan,
    GreaterThan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    InplaceAdd,
    InplaceSubtract,
    InplaceModulo,
    InplaceMultiply,
    InplaceDivide,
    InplaceRightShift,
    InplaceLeftShift,
    InplaceBinOr,
    InplaceBinAnd,
    InplaceXor,
}

impl Expr {
    pub fn is_empty(&self) -> bool {
        matches!(self, Expr::Empty)
    }
}
