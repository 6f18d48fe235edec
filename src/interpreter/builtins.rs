use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use super::scope::Scope;
use super::value::{Function, TypeTag, Value};
use crate::diagnostics::RuntimeError;

/// Host callable. Receives the raw positional arguments (bound methods get
/// their receiver first) and any argument count.
pub type NativeFn = fn(&mut dyn Host, Vec<Value>) -> Result<Value, RuntimeError>;

/// Where native functions do their I/O.
pub trait Host {
    fn write_out(&mut self, text: &str) -> io::Result<()>;
    /// One line without its terminator, or `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Process stdin/stdout.
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn write_out(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.write_out(prompt)?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

/// In-memory host; clones share the same buffers.
#[derive(Debug, Clone, Default)]
pub struct CaptureHost {
    output: Rc<RefCell<String>>,
    input: Rc<RefCell<VecDeque<String>>>,
}

impl CaptureHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let host = Self::default();
        host.input.borrow_mut().extend(lines.into_iter().map(Into::into));
        host
    }

    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }
}

impl Host for CaptureHost {
    fn write_out(&mut self, text: &str) -> io::Result<()> {
        self.output.borrow_mut().push_str(text);
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.output.borrow_mut().push_str(prompt);
        Ok(self.input.borrow_mut().pop_front())
    }
}

/// Free functions installed in every module scope.
pub const NATIVES: &[(&str, NativeFn, TypeTag)] = &[
    ("print", native_print, TypeTag::Null),
    ("input", native_input, TypeTag::String),
    ("pow", native_pow, TypeTag::Object),
    ("len", native_len, TypeTag::Integer),
    ("str", native_str, TypeTag::String),
];

const ARRAY_METHODS: &[(&str, NativeFn, TypeTag)] = &[
    ("append", array_append, TypeTag::Null),
    ("pop", array_pop, TypeTag::Object),
    ("length", native_len, TypeTag::Integer),
];

const STRING_METHODS: &[(&str, NativeFn, TypeTag)] = &[
    ("upper", string_upper, TypeTag::String),
    ("lower", string_lower, TypeTag::String),
    ("length", native_len, TypeTag::Integer),
];

/// Attribute table for a type.
pub fn methods(tag: TypeTag) -> &'static [(&'static str, NativeFn, TypeTag)] {
    match tag {
        TypeTag::Array => ARRAY_METHODS,
        TypeTag::String => STRING_METHODS,
        _ => &[],
    }
}

/// Bind the constants and native functions every program starts with.
pub fn install_prelude(scope: &Scope) {
    scope.set("true", Value::Boolean(true));
    scope.set("false", Value::Boolean(false));
    scope.set("null", Value::Null);
    for &(name, native, ret) in NATIVES {
        scope.set(name, Value::Function(Rc::new(Function::native(name, native, ret))));
    }
}

/// Wrap a native's raw result into its declared return type.
pub fn coerce_return(name: &str, value: Value, tag: TypeTag) -> Result<Value, RuntimeError> {
    match (tag, value) {
        (TypeTag::Null, _) => Ok(Value::Null),
        (TypeTag::Object, value) => Ok(value),
        (TypeTag::Float, Value::Integer(n)) => Ok(Value::Float(n as f64)),
        (tag, value) if value.tag() == tag => Ok(value),
        (tag, value) => Err(RuntimeError::interpretation(format!(
            "native function '{name}' returned {}, expected {tag}",
            value.tag()
        ))),
    }
}

fn io_error(err: io::Error) -> RuntimeError {
    RuntimeError::interpretation(format!("i/o failed: {err}"))
}

fn native_print(host: &mut dyn Host, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let line: Vec<String> = args.iter().map(Value::to_string).collect();
    host.write_out(&format!("{}\n", line.join(" "))).map_err(io_error)?;
    Ok(Value::Null)
}

fn native_input(host: &mut dyn Host, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let prompt = args.first().map(Value::to_string).unwrap_or_default();
    match host.read_line(&prompt).map_err(io_error)? {
        Some(line) => Ok(Value::String(line)),
        None => Err(RuntimeError::interpretation("input() reached end of input")),
    }
}

fn native_pow(_: &mut dyn Host, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match args.as_slice() {
        [Value::Integer(base), Value::Integer(exp)] if *exp >= 0 => {
            let result = u32::try_from(*exp).ok().and_then(|exp| base.checked_pow(exp));
            result
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::runtime("integer overflow in 'pow'"))
        }
        [base, exp] => match (as_float(base), as_float(exp)) {
            (Some(b), Some(e)) => Ok(Value::Float(b.powf(e))),
            _ => Err(RuntimeError::operator(format!(
                "pow() expects two numbers, got {} and {}",
                base.tag(),
                exp.tag()
            ))),
        },
        _ => Err(RuntimeError::operator(format!("pow() expects two numbers, got {} values", args.len()))),
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(n) => Some(*n as f64),
        Value::Float(x) => Some(*x),
        _ => None,
    }
}

fn native_len(_: &mut dyn Host, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let len = match args.first() {
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::Array(items)) => items.borrow().len(),
        Some(other) => return Err(RuntimeError::operator(format!("{} has no length", other.tag()))),
        None => return Err(RuntimeError::operator("len() expects one value")),
    };
    i64::try_from(len)
        .map(Value::Integer)
        .map_err(|_| RuntimeError::runtime("length does not fit in an integer"))
}

fn native_str(_: &mut dyn Host, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::String(args.first().map(Value::to_string).unwrap_or_default()))
}

fn array_append(_: &mut dyn Host, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let mut args = args.into_iter();
    match args.next() {
        Some(Value::Array(items)) => {
            items.borrow_mut().extend(args);
            Ok(Value::Null)
        }
        _ => Err(RuntimeError::operator("append() needs an Array receiver")),
    }
}

fn array_pop(_: &mut dyn Host, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match args.first() {
        Some(Value::Array(items)) => items
            .borrow_mut()
            .pop()
            .ok_or_else(|| RuntimeError::runtime("pop from empty Array")),
        _ => Err(RuntimeError::operator("pop() needs an Array receiver")),
    }
}

fn string_upper(_: &mut dyn Host, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match args.first() {
        Some(Value::String(s)) => Ok(Value::String(s.to_uppercase())),
        _ => Err(RuntimeError::operator("upper() needs a String receiver")),
    }
}

fn string_lower(_: &mut dyn Host, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match args.first() {
        Some(Value::String(s)) => Ok(Value::String(s.to_lowercase())),
        _ => Err(RuntimeError::operator("lower() needs a String receiver")),
    }
}
