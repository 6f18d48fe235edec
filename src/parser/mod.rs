pub mod ast;

use std::collections::VecDeque;

use crate::diagnostics::SyntaxError;
use crate::lexer::{is_keyword, Token, TokenKind};
use crate::span::{Span, Spanned};
use ast::*;

/// Deepest expression/block nesting accepted before giving up.
pub const MAX_NESTING: usize = 100;

type ParseResult<T> = Result<T, SyntaxError>;

pub struct Parser<I> {
    tokens: I,
    /// Tokens pulled from the stream but not yet consumed. Pushed-back
    /// tokens go to the front.
    lookahead: VecDeque<Token>,
    last_span: Span,
    depth: usize,
    loop_depth: usize,
    func_depth: usize,
}

/// Parse a whole token stream into a program body.
pub fn parse<I>(tokens: I) -> ParseResult<Block>
where
    I: Iterator<Item = Result<Token, SyntaxError>>,
{
    Parser::new(tokens).parse_program()
}

impl<I> Parser<I>
where
    I: Iterator<Item = Result<Token, SyntaxError>>,
{
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            lookahead: VecDeque::new(),
            last_span: Span::new(1, 0),
            depth: 0,
            loop_depth: 0,
            func_depth: 0,
        }
    }

    // ---- Token stream ----

    /// Pull one token from the source into the back of the buffer,
    /// re-tagging keywords. Returns false at end of input.
    fn pull(&mut self) -> ParseResult<bool> {
        match self.tokens.next() {
            Some(tok) => {
                let mut tok = tok?;
                if tok.kind == TokenKind::Identifier && is_keyword(tok.lexeme()) {
                    tok.kind = TokenKind::Keyword;
                }
                self.lookahead.push_back(tok);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn peek_nth(&mut self, n: usize) -> ParseResult<Option<&Token>> {
        while self.lookahead.len() <= n {
            if !self.pull()? {
                break;
            }
        }
        Ok(self.lookahead.get(n))
    }

    fn peek(&mut self) -> ParseResult<Option<&Token>> {
        self.peek_nth(0)
    }

    fn peek_kind(&mut self) -> ParseResult<Option<TokenKind>> {
        Ok(self.peek()?.map(|t| t.kind))
    }

    fn advance(&mut self) -> ParseResult<Option<Token>> {
        if self.lookahead.is_empty() {
            self.pull()?;
        }
        let tok = self.lookahead.pop_front();
        if let Some(tok) = &tok {
            self.last_span = tok.span;
        }
        Ok(tok)
    }

    /// Return a token to the front of the stream.
    fn push_back(&mut self, tok: Token) {
        self.lookahead.push_front(tok);
    }

    fn accept(&mut self, kind: TokenKind) -> ParseResult<Option<Token>> {
        if self.peek_kind()? == Some(kind) {
            self.advance()
        } else {
            Ok(None)
        }
    }

    fn skip_newlines(&mut self) -> ParseResult<()> {
        while self.accept(TokenKind::Newline)?.is_some() {}
        Ok(())
    }

    fn eof_error(&self, expected: &str) -> SyntaxError {
        SyntaxError::new(format!("expected {expected}, found end of input"), self.last_span)
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> ParseResult<Token> {
        match self.advance()? {
            Some(tok) if tok.kind == kind => Ok(tok),
            Some(tok) => Err(SyntaxError::new(
                format!("expected '{kind}' {context}, found {tok}"),
                tok.span,
            )),
            None => Err(self.eof_error(&format!("'{kind}' {context}"))),
        }
    }

    fn expect_ident(&mut self, context: &str) -> ParseResult<Spanned<String>> {
        match self.advance()? {
            Some(tok) if tok.kind == TokenKind::Identifier => {
                let span = tok.span;
                Ok(Spanned::new(tok.lexeme.unwrap_or_default(), span))
            }
            Some(tok) => Err(SyntaxError::new(
                format!("expected identifier {context}, found {tok}"),
                tok.span,
            )),
            None => Err(self.eof_error(&format!("identifier {context}"))),
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(SyntaxError::new("expression is nested too deeply", self.last_span));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ---- Blocks & statements ----

    pub fn parse_program(&mut self) -> ParseResult<Block> {
        let block = self.parse_block_body(false)?;
        tracing::debug!(statements = block.stmts.len(), "parsed program");
        Ok(block)
    }

    /// Statements until `}` (nested) or end of input (top level).
    fn parse_block_body(&mut self, nested: bool) -> ParseResult<Block> {
        let mut stmts = Vec::new();
        loop {
            match self.peek_kind()? {
                None if nested => return Err(self.eof_error("'}' to close block")),
                None => break,
                Some(TokenKind::Newline) => {
                    self.advance()?;
                }
                Some(TokenKind::RightBrace) if nested => break,
                Some(_) => {
                    stmts.push(self.parse_stmt()?);
                    self.expect_statement_end()?;
                }
            }
        }
        Ok(Block { stmts })
    }

    fn expect_statement_end(&mut self) -> ParseResult<()> {
        match self.peek()? {
            None => Ok(()),
            Some(tok) if tok.kind == TokenKind::RightBrace => Ok(()),
            Some(tok) if tok.kind == TokenKind::Newline => {
                self.advance()?;
                Ok(())
            }
            Some(tok) => Err(SyntaxError::new(
                format!("expected newline after statement, found {tok}"),
                tok.span,
            )),
        }
    }

    fn parse_braced_block(&mut self, context: &str) -> ParseResult<Block> {
        self.expect(TokenKind::LeftBrace, context)?;
        let block = self.nested(|p| p.parse_block_body(true))?;
        self.expect(TokenKind::RightBrace, "to close block")?;
        Ok(block)
    }

    fn parse_stmt(&mut self) -> ParseResult<Spanned<Stmt>> {
        let Some(tok) = self.peek()?.cloned() else {
            return Err(self.eof_error("statement"));
        };
        if tok.kind != TokenKind::Keyword {
            let expr = self.parse_assignment()?;
            return Ok(Spanned::new(Stmt::Expr(expr), tok.span));
        }

        match tok.lexeme() {
            "func" => self.parse_function(),
            "if" => {
                self.advance()?;
                let stmt = self.parse_if_tail()?;
                Ok(Spanned::new(Stmt::If(stmt), tok.span))
            }
            "while" => self.parse_while(),
            "for" => self.parse_for(),
            "var" => self.parse_var(),
            "return" => {
                self.advance()?;
                if self.func_depth == 0 {
                    return Err(SyntaxError::new("'return' outside function", tok.span));
                }
                let value = match self.peek_kind()? {
                    None | Some(TokenKind::Newline) | Some(TokenKind::RightBrace) => None,
                    Some(_) => Some(self.parse_assignment()?),
                };
                Ok(Spanned::new(Stmt::Return(value), tok.span))
            }
            word @ ("break" | "continue") => {
                self.advance()?;
                if self.loop_depth == 0 {
                    return Err(SyntaxError::new(format!("'{word}' outside loop"), tok.span));
                }
                let stmt = if word == "break" { Stmt::Break } else { Stmt::Continue };
                Ok(Spanned::new(stmt, tok.span))
            }
            other => Err(SyntaxError::new(format!("unexpected keyword '{other}'"), tok.span)),
        }
    }

    fn parse_function(&mut self) -> ParseResult<Spanned<Stmt>> {
        let func_tok = self.advance()?.ok_or_else(|| self.eof_error("'func'"))?;
        let name = self.expect_ident("after 'func'")?;
        self.expect(TokenKind::LeftParen, "after function name")?;

        let mut params = Vec::new();
        if self.accept(TokenKind::RightParen)?.is_none() {
            loop {
                params.push(self.expect_ident("in parameter list")?);
                if self.accept(TokenKind::Comma)?.is_some() {
                    continue;
                }
                self.expect(TokenKind::RightParen, "to close parameter list")?;
                break;
            }
        }

        // `break`/`continue` never cross a function boundary.
        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.func_depth += 1;
        let body = self.parse_braced_block("before function body");
        self.func_depth -= 1;
        self.loop_depth = saved_loops;

        Ok(Spanned::new(Stmt::Function { name, params, body: body? }, func_tok.span))
    }

    fn parse_condition(&mut self, keyword: &str) -> ParseResult<Spanned<Expr>> {
        self.expect(TokenKind::LeftParen, &format!("after '{keyword}'"))?;
        let condition = self.parse_assignment()?;
        self.expect(TokenKind::RightParen, &format!("to close '{keyword}' condition"))?;
        Ok(condition)
    }

    /// Consume `word` if it is the next keyword, looking past newlines.
    /// The newlines stay in the stream when `word` is absent.
    fn accept_continuation(&mut self, word: &str) -> ParseResult<Option<Token>> {
        let mut n = 0;
        loop {
            match self.peek_nth(n)? {
                Some(tok) if tok.kind == TokenKind::Newline => n += 1,
                Some(tok) if tok.is_keyword(word) => {
                    for _ in 0..n {
                        self.advance()?;
                    }
                    return self.advance();
                }
                _ => return Ok(None),
            }
        }
    }

    /// Everything after the `if` keyword.
    fn parse_if_tail(&mut self) -> ParseResult<IfStmt> {
        let condition = self.parse_condition("if")?;
        let body = self.parse_braced_block("after 'if' condition")?;

        let mut elifs = Vec::new();
        while let Some(elif) = self.accept_continuation("elif")? {
            let condition = self.parse_condition("elif")?;
            let body = self.parse_braced_block("after 'elif' condition")?;
            elifs.push(Spanned::new(
                IfStmt { condition, body, elifs: Vec::new(), else_block: None },
                elif.span,
            ));
        }

        let else_block = match self.accept_continuation("else")? {
            Some(_) => Some(self.parse_braced_block("after 'else'")?),
            None => None,
        };

        Ok(IfStmt { condition, body, elifs, else_block })
    }

    fn parse_loop_body(&mut self, context: &str) -> ParseResult<Block> {
        self.loop_depth += 1;
        let body = self.parse_braced_block(context);
        self.loop_depth -= 1;
        body
    }

    fn parse_while(&mut self) -> ParseResult<Spanned<Stmt>> {
        let while_tok = self.advance()?.ok_or_else(|| self.eof_error("'while'"))?;
        let condition = self.parse_condition("while")?;
        let body = self.parse_loop_body("after 'while' condition")?;
        Ok(Spanned::new(Stmt::While { condition, body }, while_tok.span))
    }

    /// One `for` header clause; an immediately following `end` leaves it empty.
    fn parse_for_clause(&mut self, end: TokenKind) -> ParseResult<Spanned<Expr>> {
        match self.peek()? {
            Some(tok) if tok.kind == end => Ok(Spanned::new(Expr::Empty, tok.span)),
            _ => self.parse_assignment(),
        }
    }

    fn parse_for(&mut self) -> ParseResult<Spanned<Stmt>> {
        let for_tok = self.advance()?.ok_or_else(|| self.eof_error("'for'"))?;
        self.expect(TokenKind::LeftParen, "after 'for'")?;
        let init = self.parse_for_clause(TokenKind::Semicolon)?;
        self.expect(TokenKind::Semicolon, "after 'for' initializer")?;
        let condition = self.parse_for_clause(TokenKind::Semicolon)?;
        self.expect(TokenKind::Semicolon, "after 'for' condition")?;
        let step = self.parse_for_clause(TokenKind::RightParen)?;
        self.expect(TokenKind::RightParen, "to close 'for' header")?;
        let body = self.parse_loop_body("after 'for' header")?;
        Ok(Spanned::new(
            Stmt::For { parts: Box::new([init, condition, step]), body },
            for_tok.span,
        ))
    }

    fn parse_var(&mut self) -> ParseResult<Spanned<Stmt>> {
        let var_tok = self.advance()?.ok_or_else(|| self.eof_error("'var'"))?;
        let name = self.expect_ident("after 'var'")?;
        let value = match self.accept(TokenKind::Assign)? {
            Some(_) => Some(self.parse_assignment()?),
            None => None,
        };
        Ok(Spanned::new(Stmt::Var { name, value }, var_tok.span))
    }

    // ---- Expressions ----

    /// `{Identifier AssignOp}* Expr`, folded right-associatively.
    pub fn parse_assignment(&mut self) -> ParseResult<Spanned<Expr>> {
        self.nested(|p| {
            let mut targets = Vec::new();
            while p.peek_kind()? == Some(TokenKind::Identifier) {
                let Some(ident) = p.advance()? else { break };
                match p.peek_kind()?.and_then(assign_op) {
                    Some(op) => {
                        p.advance()?;
                        let span = ident.span;
                        targets.push((Spanned::new(ident.lexeme.unwrap_or_default(), span), op));
                    }
                    None => {
                        p.push_back(ident);
                        break;
                    }
                }
            }

            let mut expr = p.parse_logic_or()?;
            for (name, op) in targets.into_iter().rev() {
                let span = name.span;
                expr = Spanned::new(Expr::Assignment { name, op, content: Box::new(expr) }, span);
            }
            Ok(expr)
        })
    }

    fn parse_binary_level(
        &mut self,
        ops: &[(TokenKind, BinaryOp)],
        next: fn(&mut Self) -> ParseResult<Spanned<Expr>>,
    ) -> ParseResult<Spanned<Expr>> {
        let mut node = next(self)?;
        loop {
            let Some(kind) = self.peek_kind()? else { break };
            let Some(&(_, op)) = ops.iter().find(|(k, _)| *k == kind) else { break };
            let Some(op_tok) = self.advance()? else { break };
            let right = next(self)?;
            node = Spanned::new(
                Expr::Binary { left: Box::new(node), op, right: Box::new(right) },
                op_tok.span,
            );
        }
        Ok(node)
    }

    fn parse_logic_or(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_binary_level(&[(TokenKind::LogicOr, BinaryOp::LogicOr)], Self::parse_logic_and)
    }

    fn parse_logic_and(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_binary_level(&[(TokenKind::LogicAnd, BinaryOp::LogicAnd)], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> ParseResult<Spanned<Expr>> {
        let mut node = self.parse_bit_or()?;
        loop {
            let op = match self.peek_kind()? {
                Some(TokenKind::IsEqual) => CompareOp::Equals,
                Some(TokenKind::NotEqual) => CompareOp::NotEqual,
                Some(TokenKind::LessEqual) => CompareOp::LessEqual,
                Some(TokenKind::GreatEqual) => CompareOp::GreatEqual,
                Some(TokenKind::LesserThan) => CompareOp::LesserThan,
                Some(TokenKind::GreaterThan) => CompareOp::GreaterThan,
                _ => break,
            };
            let Some(op_tok) = self.advance()? else { break };
            let right = self.parse_bit_or()?;
            node = Spanned::new(
                Expr::Compare { left: Box::new(node), op, right: Box::new(right) },
                op_tok.span,
            );
        }
        Ok(node)
    }

    fn parse_bit_or(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_binary_level(&[(TokenKind::BinOr, BinaryOp::Or)], Self::parse_xor)
    }

    fn parse_xor(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_binary_level(&[(TokenKind::Xor, BinaryOp::Xor)], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_binary_level(&[(TokenKind::BinAnd, BinaryOp::And)], Self::parse_shift)
    }

    fn parse_shift(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_binary_level(
            &[
                (TokenKind::LeftShift, BinaryOp::LeftShift),
                (TokenKind::RightShift, BinaryOp::RightShift),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_binary_level(
            &[(TokenKind::Add, BinaryOp::Add), (TokenKind::Subtract, BinaryOp::Subtract)],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_binary_level(
            &[
                (TokenKind::Multiply, BinaryOp::Multiply),
                (TokenKind::Divide, BinaryOp::Divide),
                (TokenKind::Modulo, BinaryOp::Modulo),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> ParseResult<Spanned<Expr>> {
        let op = match self.peek_kind()? {
            Some(TokenKind::Tilde) => UnaryOp::Tilde,
            Some(TokenKind::LogicNot) => UnaryOp::LogicalNot,
            Some(TokenKind::Add) => UnaryOp::Add,
            Some(TokenKind::Subtract) => UnaryOp::Subtract,
            _ => return self.parse_postfix(),
        };
        let Some(op_tok) = self.advance()? else {
            return Err(self.eof_error("expression"));
        };
        let operand = self.nested(Self::parse_unary)?;
        Ok(Spanned::new(Expr::Unary { op, operand: Box::new(operand) }, op_tok.span))
    }

    /// Atom followed by any chain of calls, attribute accesses and indexing.
    fn parse_postfix(&mut self) -> ParseResult<Spanned<Expr>> {
        let mut node = self.parse_atom()?;
        loop {
            match self.peek_kind()? {
                Some(TokenKind::LeftParen) => {
                    let Some(open) = self.advance()? else { break };
                    let args = self.parse_items(TokenKind::RightParen, false)?;
                    node = Spanned::new(Expr::Call { callee: Box::new(node), args }, open.span);
                }
                Some(TokenKind::Dot) => {
                    self.advance()?;
                    let name = self.expect_ident("after '.'")?;
                    let span = name.span;
                    node = Spanned::new(Expr::Attribute { object: Box::new(node), name }, span);
                }
                Some(TokenKind::LeftBracket) => {
                    let Some(open) = self.advance()? else { break };
                    let index = self.parse_assignment()?;
                    self.expect(TokenKind::RightBracket, "to close index")?;
                    node = Spanned::new(
                        Expr::Index { object: Box::new(node), index: Box::new(index) },
                        open.span,
                    );
                }
                _ => break,
            }
        }
        Ok(node)
    }

    /// Comma-separated expressions up to `close`; the opener is already consumed.
    fn parse_items(&mut self, close: TokenKind, trailing_comma: bool) -> ParseResult<Vec<Spanned<Expr>>> {
        let mut items = Vec::new();
        self.skip_newlines()?;
        if self.accept(close)?.is_some() {
            return Ok(items);
        }
        loop {
            items.push(self.parse_assignment()?);
            self.skip_newlines()?;
            match self.advance()? {
                Some(tok) if tok.kind == close => return Ok(items),
                Some(tok) if tok.kind == TokenKind::Comma => {
                    self.skip_newlines()?;
                    if trailing_comma && self.accept(close)?.is_some() {
                        return Ok(items);
                    }
                }
                Some(tok) => {
                    return Err(SyntaxError::new(
                        format!("expected ',' or '{close}', found {tok}"),
                        tok.span,
                    ));
                }
                None => return Err(self.eof_error(&format!("'{close}'"))),
            }
        }
    }

    fn parse_atom(&mut self) -> ParseResult<Spanned<Expr>> {
        let Some(tok) = self.advance()? else {
            return Err(self.eof_error("expression"));
        };
        let span = tok.span;
        match tok.kind {
            TokenKind::Integer => {
                let value = tok.lexeme().parse::<i64>().map_err(|_| {
                    SyntaxError::new(format!("invalid integer literal {}", tok.lexeme()), span)
                })?;
                Ok(Spanned::new(Expr::Integer(value), span))
            }
            TokenKind::Float => {
                let value = tok.lexeme().parse::<f64>().map_err(|_| {
                    SyntaxError::new(format!("invalid float literal {}", tok.lexeme()), span)
                })?;
                Ok(Spanned::new(Expr::Float(value), span))
            }
            TokenKind::String => Ok(Spanned::new(Expr::String(tok.lexeme.unwrap_or_default()), span)),
            TokenKind::Identifier => Ok(Spanned::new(Expr::Name(tok.lexeme.unwrap_or_default()), span)),
            TokenKind::LeftParen => {
                if self.accept(TokenKind::RightParen)?.is_some() {
                    return Ok(Spanned::new(Expr::Empty, span));
                }
                let expr = self.parse_assignment()?;
                self.expect(TokenKind::RightParen, "to close '('")?;
                Ok(expr)
            }
            TokenKind::LeftBracket => self.parse_array_or_cast(span),
            _ => Err(SyntaxError::new(
                format!("expected ~, -, +, ! or an expression, found {tok}"),
                span,
            )),
        }
    }

    fn is_cast_ahead(&mut self) -> ParseResult<bool> {
        let kind_at = |p: &mut Self, n| -> ParseResult<Option<TokenKind>> {
            Ok(p.peek_nth(n)?.map(|t| t.kind))
        };
        Ok(kind_at(self, 0)? == Some(TokenKind::Identifier)
            && kind_at(self, 1)? == Some(TokenKind::RightBracket)
            && matches!(
                kind_at(self, 2)?,
                Some(
                    TokenKind::Identifier
                        | TokenKind::Integer
                        | TokenKind::Float
                        | TokenKind::String
                        | TokenKind::LeftParen
                )
            ))
    }

    /// `[a, b, ...]` array literal, or `[Type] expr` cast; `[` is consumed.
    fn parse_array_or_cast(&mut self, open: Span) -> ParseResult<Spanned<Expr>> {
        if self.is_cast_ahead()? {
            let ty = self.expect_ident("in cast")?;
            self.expect(TokenKind::RightBracket, "to close cast type")?;
            let expr = self.nested(Self::parse_unary)?;
            return Ok(Spanned::new(Expr::Cast { ty, expr: Box::new(expr) }, open));
        }
        let items = self.nested(|p| p.parse_items(TokenKind::RightBracket, true))?;
        Ok(Spanned::new(Expr::Array(items), open))
    }
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::InplaceAdd => AssignOp::InplaceAdd,
        TokenKind::InplaceSubtract => AssignOp::InplaceSubtract,
        TokenKind::InplaceModulo => AssignOp::InplaceModulo,
        TokenKind::InplaceMultiply => AssignOp::InplaceMultiply,
        TokenKind::InplaceDivide => AssignOp::InplaceDivide,
        TokenKind::InplaceRightShift => AssignOp::InplaceRightShift,
        TokenKind::InplaceLeftShift => AssignOp::InplaceLeftShift,
        TokenKind::InplaceBinOr => AssignOp::InplaceBinOr,
        TokenKind::InplaceBinAnd => AssignOp::InplaceBinAnd,
        TokenKind::InplaceXor => AssignOp::InplaceXor,
        _ => return None,
    };
    Some(op)
}
