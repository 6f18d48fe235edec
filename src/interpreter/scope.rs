use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::value::Value;
use crate::diagnostics::StackCall;
use crate::span::Span;

/// Return signalling for the function a scope runs in.
#[derive(Debug)]
pub struct FuncContext {
    pub active: Cell<bool>,
    pub return_value: RefCell<Value>,
}

impl FuncContext {
    pub fn new() -> Self {
        Self { active: Cell::new(true), return_value: RefCell::new(Value::Null) }
    }

    pub fn finish(&self, value: Value) {
        *self.return_value.borrow_mut() = value;
        self.active.set(false);
    }

    pub fn has_returned(&self) -> bool {
        !self.active.get()
    }
}

impl Default for FuncContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Break/continue signalling for the innermost loop.
#[derive(Debug)]
pub struct LoopContext {
    pub active: Cell<bool>,
    pub continue_pending: Cell<bool>,
}

impl LoopContext {
    pub fn new() -> Self {
        Self { active: Cell::new(true), continue_pending: Cell::new(false) }
    }
}

impl Default for LoopContext {
    fn default() -> Self {
        Self::new()
    }
}

/// One active call, recorded at the call site.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub file: String,
    /// Scope the call was made from, as rendered in tracebacks.
    pub scope: String,
    pub span: Span,
    pub statement: String,
}

impl Frame {
    pub fn to_stack_call(&self) -> StackCall {
        StackCall {
            file: self.file.clone(),
            line: self.span.line,
            column: self.span.column,
            scope: self.scope.clone(),
            statement: self.statement.clone(),
        }
    }
}

/// Name to value environment plus control-flow markers.
#[derive(Clone)]
pub struct Scope {
    pub name: String,
    namespace: Rc<RefCell<HashMap<String, Value>>>,
    pub func_context: Option<Rc<FuncContext>>,
    pub loop_context: Option<Rc<LoopContext>>,
    pub frames: Vec<Frame>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Rc::new(RefCell::new(HashMap::new())),
            func_context: None,
            loop_context: None,
            frames: Vec::new(),
        }
    }

    /// Fresh call scope binding `params` to `args`, with its own return context.
    pub fn call(name: impl Into<String>, params: &[String], args: Vec<Value>) -> Self {
        let scope = Self { func_context: Some(Rc::new(FuncContext::new())), ..Self::new(name) };
        {
            let mut ns = scope.namespace.borrow_mut();
            for (param, arg) in params.iter().zip(args) {
                ns.insert(param.clone(), arg);
            }
        }
        scope
    }

    /// Scope for a loop body: same bindings, new loop context.
    pub fn loop_scope(&self) -> Self {
        Self { loop_context: Some(Rc::new(LoopContext::new())), ..self.clone() }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.namespace.borrow().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.namespace.borrow_mut().insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.namespace.borrow().contains_key(name)
    }

    /// True when statements in this scope must be skipped: the loop was
    /// broken, a continue is pending, or the function already returned.
    pub fn is_suspended(&self) -> bool {
        let loop_stopped = self
            .loop_context
            .as_ref()
            .is_some_and(|ctx| !ctx.active.get() || ctx.continue_pending.get());
        loop_stopped || self.has_returned()
    }

    pub fn has_returned(&self) -> bool {
        self.func_context.as_ref().is_some_and(|ctx| ctx.has_returned())
    }

    pub fn repr(&self) -> String {
        format!("<scope: {}>", self.name)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.namespace.borrow().keys().cloned().collect();
        names.sort();
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("names", &names)
            .field("frames", &self.frames.len())
            .finish()
    }
}

/// New scope holding `base`'s bindings overlaid by `overlay`'s. Control
/// contexts come from `overlay`, frames from `base`.
pub fn merge(base: &Scope, overlay: Scope) -> Scope {
    let mut namespace = base.namespace.borrow().clone();
    namespace.extend(overlay.namespace.borrow().iter().map(|(k, v)| (k.clone(), v.clone())));
    Scope {
        name: overlay.name,
        namespace: Rc::new(RefCell::new(namespace)),
        func_context: overlay.func_context,
        loop_context: overlay.loop_context,
        frames: base.frames.clone(),
    }
}
