pub mod builtins;
pub mod scope;
pub mod value;

use std::rc::Rc;

use crate::diagnostics::{ErrorKind, RuntimeError, SourceFile, StackCall};
use crate::parser::ast::{BinaryOp, Block, Expr, IfStmt, Stmt};
use crate::span::{Span, Spanned};
use builtins::Host;
use scope::{merge, Frame, Scope};
use value::{Dispatch, Function, Operator, TypeTag, Value};

/// Default bound on nested calls before `RecursionError`.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

/// Remaining stack below which evaluation moves to a fresh segment.
pub(crate) const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each extra stack segment.
pub(crate) const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

type EvalResult = Result<Value, RuntimeError>;

/// Tree-walking evaluator. Owns the module scope, so consecutive `run`s
/// see each other's bindings.
pub struct Interpreter {
    host: Box<dyn Host>,
    globals: Scope,
    source: Rc<SourceFile>,
    depth: usize,
    max_call_depth: usize,
}

impl Interpreter {
    pub fn new(host: Box<dyn Host>) -> Self {
        let globals = Scope::new("module");
        builtins::install_prelude(&globals);
        Self {
            host,
            globals,
            source: Rc::new(SourceFile::new("shell", "")),
            depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    /// Execute a program in the module scope. Returns the value of the
    /// last statement.
    pub fn run(&mut self, program: &Block, source: SourceFile) -> EvalResult {
        self.source = Rc::new(source);
        self.depth = 0;
        let globals = self.globals.clone();
        let mut last = Value::Null;
        for stmt in &program.stmts {
            last = self.exec_stmt(stmt, &globals)?;
        }
        Ok(last)
    }

    // ---- Errors ----

    fn stack(&self, span: Span, scope: &Scope) -> Vec<StackCall> {
        let mut stack: Vec<StackCall> = scope.frames.iter().map(Frame::to_stack_call).collect();
        stack.push(StackCall {
            file: self.source.name.clone(),
            line: span.line,
            column: span.column,
            scope: scope.repr(),
            statement: self.source.line(span.line).to_string(),
        });
        stack
    }

    fn error(&self, kind: ErrorKind, message: impl Into<String>, span: Span, scope: &Scope) -> RuntimeError {
        let err = RuntimeError::new(kind, message).with_stack(self.stack(span, scope));
        tracing::debug!(kind = %err.kind, message = %err.message, line = span.line, "runtime error");
        err
    }

    /// Turn a dispatch outcome into a value, reporting `Empty` as an
    /// operator error described by `describe`.
    fn finish(
        &self,
        outcome: Dispatch,
        describe: impl FnOnce() -> String,
        span: Span,
        scope: &Scope,
    ) -> EvalResult {
        match outcome {
            Dispatch::Value(value) => Ok(value),
            Dispatch::Empty => Err(self.error(ErrorKind::Operator, describe(), span, scope)),
            Dispatch::Fault(msg) => Err(self.error(ErrorKind::Runtime, msg, span, scope)),
        }
    }

    fn binary(&self, left: &Value, op: Operator, right: Value, span: Span, scope: &Scope) -> EvalResult {
        let outcome = value::operate(left, op, std::slice::from_ref(&right));
        self.finish(
            outcome,
            || format!("unsupported operand types for {op}: '{}' and '{}'", left.tag(), right.tag()),
            span,
            scope,
        )
    }

    // ---- Statements ----

    fn exec_block(&mut self, block: &Block, scope: &Scope) -> EvalResult {
        let mut last = Value::Null;
        for stmt in &block.stmts {
            if scope.is_suspended() {
                return Ok(Value::Null);
            }
            last = self.exec_stmt(stmt, scope)?;
        }
        Ok(last)
    }

    fn exec_stmt(&mut self, stmt: &Spanned<Stmt>, scope: &Scope) -> EvalResult {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.exec_stmt_inner(stmt, scope))
    }

    fn exec_stmt_inner(&mut self, stmt: &Spanned<Stmt>, scope: &Scope) -> EvalResult {
        if scope.is_suspended() {
            return Ok(Value::Null);
        }
        match &stmt.node {
            Stmt::Expr(expr) => {
                let value = self.eval(expr, scope)?;
                if matches!(expr.node, Expr::Assignment { .. }) {
                    Ok(Value::Null)
                } else {
                    Ok(value)
                }
            }
            Stmt::Var { name, value } => {
                let value = match value {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::Null,
                };
                scope.set(name.node.clone(), value);
                Ok(Value::Null)
            }
            Stmt::Function { name, params, body } => {
                let func = Function {
                    name: name.node.clone(),
                    params: params.iter().map(|p| p.node.clone()).collect(),
                    body: Rc::new(body.clone()),
                    captured: Some(scope.clone()),
                    native: None,
                    return_type: TypeTag::Object,
                    bound_receiver: None,
                    source: Some(Rc::clone(&self.source)),
                };
                scope.set(name.node.clone(), Value::Function(Rc::new(func)));
                Ok(Value::Null)
            }
            Stmt::If(if_stmt) => {
                self.exec_if(if_stmt, scope)?;
                Ok(Value::Null)
            }
            Stmt::While { condition, body } => {
                let body_scope = scope.loop_scope();
                while Self::begin_iteration(&body_scope) {
                    if !self.eval(condition, &body_scope)?.is_truthy() {
                        break;
                    }
                    self.exec_block(body, &body_scope)?;
                }
                Ok(Value::Null)
            }
            Stmt::For { parts, body } => {
                let [init, condition, step] = &**parts;
                let body_scope = scope.loop_scope();
                self.eval(init, &body_scope)?;
                while Self::begin_iteration(&body_scope) {
                    if !condition.node.is_empty() && !self.eval(condition, &body_scope)?.is_truthy() {
                        break;
                    }
                    self.exec_block(body, &body_scope)?;
                    if Self::loop_finished(&body_scope) {
                        break;
                    }
                    self.eval(step, &body_scope)?;
                }
                Ok(Value::Null)
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::Null,
                };
                match &scope.func_context {
                    Some(ctx) => {
                        ctx.finish(value);
                        Ok(Value::Null)
                    }
                    None => Err(self.error(ErrorKind::Interpretation, "'return' outside function", stmt.span, scope)),
                }
            }
            Stmt::Break | Stmt::Continue => {
                let Some(ctx) = &scope.loop_context else {
                    return Err(self.error(ErrorKind::Interpretation, "loop control outside loop", stmt.span, scope));
                };
                if matches!(stmt.node, Stmt::Break) {
                    ctx.active.set(false);
                } else {
                    ctx.continue_pending.set(true);
                }
                Ok(Value::Null)
            }
        }
    }

    /// Clear a pending continue; false once the loop must stop.
    fn begin_iteration(scope: &Scope) -> bool {
        if let Some(ctx) = &scope.loop_context {
            ctx.continue_pending.set(false);
        }
        !Self::loop_finished(scope)
    }

    fn loop_finished(scope: &Scope) -> bool {
        let broken = scope.loop_context.as_ref().is_some_and(|ctx| !ctx.active.get());
        broken || scope.has_returned()
    }

    fn exec_if(&mut self, stmt: &IfStmt, scope: &Scope) -> EvalResult {
        if self.eval(&stmt.condition, scope)?.is_truthy() {
            return self.exec_block(&stmt.body, scope);
        }
        for elif in &stmt.elifs {
            if self.eval(&elif.node.condition, scope)?.is_truthy() {
                return self.exec_block(&elif.node.body, scope);
            }
        }
        match &stmt.else_block {
            Some(block) => self.exec_block(block, scope),
            None => Ok(Value::Null),
        }
    }

    // ---- Expressions ----

    fn eval(&mut self, expr: &Spanned<Expr>, scope: &Scope) -> EvalResult {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr, scope))
    }

    fn eval_inner(&mut self, expr: &Spanned<Expr>, scope: &Scope) -> EvalResult {
        let span = expr.span;
        match &expr.node {
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::Float(x) => Ok(Value::Float(*x)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Empty => Ok(Value::Null),
            Expr::Name(name) => scope.get(name).ok_or_else(|| {
                self.error(ErrorKind::Name, format!("'{name}' doesn't exist in the current scope"), span, scope)
            }),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, scope)?;
                let op = Operator::from_unary(*op);
                let outcome = value::operate(&value, op, &[]);
                self.finish(outcome, || format!("bad operand type for unary {op}: '{}'", value.tag()), span, scope)
            }
            Expr::Binary { left, op: BinaryOp::LogicAnd, right } => {
                let left = self.eval(left, scope)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right, scope)
            }
            Expr::Binary { left, op: BinaryOp::LogicOr, right } => {
                let left = self.eval(left, scope)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right, scope)
            }
            Expr::Binary { left, op, right } => {
                let left = self.eval(left, scope)?;
                let right = self.eval(right, scope)?;
                match Operator::from_binary(*op) {
                    Some(op) => self.binary(&left, op, right, span, scope),
                    None => Err(self.error(ErrorKind::Interpretation, "unknown binary operator", span, scope)),
                }
            }
            Expr::Compare { left, op, right } => {
                let left = self.eval(left, scope)?;
                let right = self.eval(right, scope)?;
                self.binary(&left, Operator::from_compare(*op), right, span, scope)
            }
            Expr::Assignment { name, op, content } => {
                let rhs = self.eval(content, scope)?;
                let value = match Operator::from_assign(*op) {
                    None => rhs,
                    Some(base) => {
                        let current = scope.get(&name.node).ok_or_else(|| {
                            self.error(
                                ErrorKind::Name,
                                format!("'{}' doesn't exist in the current scope", name.node),
                                name.span,
                                scope,
                            )
                        })?;
                        self.binary(&current, base, rhs, span, scope)?
                    }
                };
                scope.set(name.node.clone(), value.clone());
                Ok(value)
            }
            Expr::Call { callee, args } => {
                let callee = self.eval(callee, scope)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, scope)?);
                }
                self.call(&callee, values, span, scope)
            }
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item, scope)?);
                }
                Ok(Value::array(values))
            }
            Expr::Attribute { object, name } => {
                let object = self.eval(object, scope)?;
                value::attribute(&object, &name.node).ok_or_else(|| {
                    self.error(
                        ErrorKind::Operator,
                        format!("'{}' has no attribute '{}'", object.tag(), name.node),
                        name.span,
                        scope,
                    )
                })
            }
            Expr::Index { object, index } => {
                let object = self.eval(object, scope)?;
                let index = self.eval(index, scope)?;
                let outcome = value::operate(&object, Operator::Index, std::slice::from_ref(&index));
                self.finish(
                    outcome,
                    || format!("'{}' cannot be indexed by '{}'", object.tag(), index.tag()),
                    span,
                    scope,
                )
            }
            Expr::Cast { ty, .. } => Err(self.error(
                ErrorKind::Interpretation,
                format!("cast expressions are not supported (cast to '{}')", ty.node),
                span,
                scope,
            )),
        }
    }

    fn call(&mut self, callee: &Value, args: Vec<Value>, span: Span, scope: &Scope) -> EvalResult {
        let Value::Function(func) = callee else {
            return Err(self.error(
                ErrorKind::Operator,
                format!("'{}' object is not callable", callee.tag()),
                span,
                scope,
            ));
        };

        if let Some(native) = func.native {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.extend(func.bound_receiver.iter().cloned());
            full.extend(args);
            let result = native(self.host.as_mut(), full)
                .and_then(|raw| builtins::coerce_return(&func.name, raw, func.return_type));
            return result.map_err(|err| self.error(err.kind, err.message, span, scope));
        }

        if args.len() != func.params.len() {
            return Err(self.error(
                ErrorKind::Runtime,
                format!(
                    "{}() takes {} argument(s) but {} were given",
                    func.name,
                    func.params.len(),
                    args.len()
                ),
                span,
                scope,
            ));
        }
        if self.depth >= self.max_call_depth {
            return Err(self.error(
                ErrorKind::Recursion,
                format!("maximum call depth ({}) exceeded", self.max_call_depth),
                span,
                scope,
            ));
        }

        let base = func.captured.as_ref().unwrap_or(&self.globals);
        let mut call_scope = merge(base, Scope::call(func.name.clone(), &func.params, args));
        call_scope.frames = scope.frames.clone();
        call_scope.frames.push(Frame {
            file: self.source.name.clone(),
            scope: scope.repr(),
            span,
            statement: self.source.line(span.line).to_string(),
        });

        let caller_source = match &func.source {
            Some(source) => Some(std::mem::replace(&mut self.source, Rc::clone(source))),
            None => None,
        };
        self.depth += 1;
        tracing::trace!(name = %func.name, depth = self.depth, "call");
        let result = self.exec_block(&func.body, &call_scope);
        self.depth -= 1;
        if let Some(source) = caller_source {
            self.source = source;
        }
        result?;

        Ok(call_scope
            .func_context
            .as_ref()
            .map(|ctx| ctx.return_value.borrow().clone())
            .unwrap_or(Value::Null))
    }
}
