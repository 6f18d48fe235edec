use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::OnceLock;

use super::builtins::{self, NativeFn};
use super::scope::Scope;
use super::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::diagnostics::SourceFile;
use crate::parser::ast::{AssignOp, BinaryOp, Block, CompareOp, UnaryOp};

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Array(Rc<RefCell<Vec<Value>>>),
    Function(Rc<Function>),
}

/// Dispatch tag. Every value carries its own tag plus `Object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Object,
    Integer,
    Float,
    String,
    Boolean,
    Null,
    Array,
    Function,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Object => "Object",
            TypeTag::Integer => "Integer",
            TypeTag::Float => "Float",
            TypeTag::String => "String",
            TypeTag::Boolean => "Boolean",
            TypeTag::Null => "Null",
            TypeTag::Array => "Array",
            TypeTag::Function => "Function",
        };
        f.write_str(name)
    }
}

/// A user-defined or native function.
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Block>,
    /// Scope active when the `func` statement ran.
    pub captured: Option<Scope>,
    pub native: Option<NativeFn>,
    /// Tag the native result is wrapped into.
    pub return_type: TypeTag,
    /// Receiver prepended to the arguments of a bound method.
    pub bound_receiver: Option<Value>,
    /// Source the body was parsed from, for tracebacks.
    pub source: Option<Rc<SourceFile>>,
}

impl Function {
    pub fn native(name: &str, native: NativeFn, return_type: TypeTag) -> Self {
        Self {
            name: name.to_string(),
            params: Vec::new(),
            body: Rc::new(Block::default()),
            captured: None,
            native: Some(native),
            return_type,
            bound_receiver: None,
            source: None,
        }
    }

    pub fn bound(name: &str, native: NativeFn, return_type: TypeTag, receiver: Value) -> Self {
        Self { bound_receiver: Some(receiver), ..Self::native(name, native, return_type) }
    }

    pub fn is_native(&self) -> bool {
        self.native.is_some()
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Integer(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Float,
            Value::String(_) => TypeTag::String,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Null => TypeTag::Null,
            Value::Array(_) => TypeTag::Array,
            Value::Function(_) => TypeTag::Function,
        }
    }

    pub fn tags(&self) -> [TypeTag; 2] {
        [self.tag(), TypeTag::Object]
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::Null => false,
            Value::Array(items) => !items.borrow().is_empty(),
            Value::Function(_) => true,
        }
    }

    /// Quoted form used by the REPL echo and inside arrays.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        render(&mut out, self, true, &mut Vec::new());
        out
    }
}

/// Arrays currently being rendered or compared, by address.
type ArrayPtr = *const RefCell<Vec<Value>>;

fn format_float(x: f64) -> String {
    let text = x.to_string();
    if x.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Append `value` to `out`. An array already on the `seen` path renders
/// as `[...]`.
fn render(out: &mut String, value: &Value, quoted: bool, seen: &mut Vec<ArrayPtr>) {
    match value {
        Value::Integer(n) => out.push_str(&n.to_string()),
        Value::Float(x) => out.push_str(&format_float(*x)),
        Value::String(s) if quoted => {
            out.push('\'');
            out.push_str(&s.replace('\\', "\\\\").replace('\'', "\\'"));
            out.push('\'');
        }
        Value::String(s) => out.push_str(s),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
        Value::Array(items) => {
            let ptr = Rc::as_ptr(items);
            if seen.contains(&ptr) {
                out.push_str("[...]");
                return;
            }
            seen.push(ptr);
            out.push('[');
            for (idx, item) in items.borrow().iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || render(out, item, true, seen));
            }
            out.push(']');
            seen.pop();
        }
        Value::Function(func) => {
            out.push_str("<function ");
            out.push_str(&func.name);
            out.push('>');
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        render(&mut out, self, false, &mut Vec::new());
        f.write_str(&out)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    equal_in(a, b, &mut Vec::new())
}

/// Structural equality. A pair of arrays already under comparison counts
/// as equal, so self-containing arrays terminate.
fn equal_in(a: &Value, b: &Value, seen: &mut Vec<(ArrayPtr, ArrayPtr)>) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let pair = (Rc::as_ptr(x), Rc::as_ptr(y));
            if seen.contains(&pair) {
                return true;
            }
            let (xs, ys) = (x.borrow(), y.borrow());
            if xs.len() != ys.len() {
                return false;
            }
            seen.push(pair);
            let equal = xs.iter().zip(ys.iter()).all(|(p, q)| {
                stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || equal_in(p, q, seen))
            });
            seen.pop();
            equal
        }
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Null, Value::Null) => true,
        _ => match (Num::of(a), Num::of(b)) {
            (Some(Num::Int(x)), Some(Num::Int(y))) => x == y,
            (Some(x), Some(y)) => x.as_f64() == y.as_f64(),
            _ => false,
        },
    }
}

// ---- Operators ----

/// Operator names values declare implementations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
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
    Equals,
    NotEqual,
    LessEqual,
    GreatEqual,
    LesserThan,
    GreaterThan,
    UnaryTilde,
    UnaryAdd,
    UnarySubtract,
    UnaryLogicalNot,
    Index,
}

impl Operator {
    /// `None` for the short-circuiting logical operators, which never dispatch.
    pub fn from_binary(op: BinaryOp) -> Option<Self> {
        let op = match op {
            BinaryOp::Add => Operator::Add,
            BinaryOp::Subtract => Operator::Subtract,
            BinaryOp::Multiply => Operator::Multiply,
            BinaryOp::Divide => Operator::Divide,
            BinaryOp::Modulo => Operator::Modulo,
            BinaryOp::Or => Operator::Or,
            BinaryOp::And => Operator::And,
            BinaryOp::Xor => Operator::Xor,
            BinaryOp::LeftShift => Operator::LeftShift,
            BinaryOp::RightShift => Operator::RightShift,
            BinaryOp::LogicAnd | BinaryOp::LogicOr => return None,
        };
        Some(op)
    }

    pub fn from_compare(op: CompareOp) -> Self {
        match op {
            CompareOp::Equals => Operator::Equals,
            CompareOp::NotEqual => Operator::NotEqual,
            CompareOp::LessEqual => Operator::LessEqual,
            CompareOp::GreatEqual => Operator::GreatEqual,
            CompareOp::LesserThan => Operator::LesserThan,
            CompareOp::GreaterThan => Operator::GreaterThan,
        }
    }

    pub fn from_unary(op: UnaryOp) -> Self {
        match op {
            UnaryOp::Tilde => Operator::UnaryTilde,
            UnaryOp::Add => Operator::UnaryAdd,
            UnaryOp::Subtract => Operator::UnarySubtract,
            UnaryOp::LogicalNot => Operator::UnaryLogicalNot,
        }
    }

    /// In-place assignment reuses the plain operator; `=` has none.
    pub fn from_assign(op: AssignOp) -> Option<Self> {
        let op = match op {
            AssignOp::Assign => return None,
            AssignOp::InplaceAdd => Operator::Add,
            AssignOp::InplaceSubtract => Operator::Subtract,
            AssignOp::InplaceModulo => Operator::Modulo,
            AssignOp::InplaceMultiply => Operator::Multiply,
            AssignOp::InplaceDivide => Operator::Divide,
            AssignOp::InplaceRightShift => Operator::RightShift,
            AssignOp::InplaceLeftShift => Operator::LeftShift,
            AssignOp::InplaceBinOr => Operator::Or,
            AssignOp::InplaceBinAnd => Operator::And,
            AssignOp::InplaceXor => Operator::Xor,
        };
        Some(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Add | Operator::UnaryAdd => "+",
            Operator::Subtract | Operator::UnarySubtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Or => "|",
            Operator::And => "&",
            Operator::Xor => "^",
            Operator::LeftShift => "<<",
            Operator::RightShift => ">>",
            Operator::Equals => "==",
            Operator::NotEqual => "!=",
            Operator::LessEqual => "<=",
            Operator::GreatEqual => ">=",
            Operator::LesserThan => "<",
            Operator::GreaterThan => ">",
            Operator::UnaryTilde => "~",
            Operator::UnaryLogicalNot => "!",
            Operator::Index => "[]",
        };
        f.write_str(symbol)
    }
}

/// Outcome of `operate`.
#[derive(Debug, PartialEq)]
pub enum Dispatch {
    Value(Value),
    /// No implementation accepts these operand types.
    Empty,
    /// Operand types were accepted but the operation failed.
    Fault(String),
}

type OperatorFn = fn(&Value, &[Value]) -> Dispatch;

#[derive(Clone, Copy)]
pub struct OperatorImpl {
    pub accepts: &'static [TypeTag],
    pub call: OperatorFn,
}

type OperatorTable = HashMap<Operator, OperatorImpl>;

const NUMERIC: &[TypeTag] = &[TypeTag::Integer, TypeTag::Float];
const ANY: &[TypeTag] = &[TypeTag::Object];

fn tables() -> &'static HashMap<TypeTag, OperatorTable> {
    static TABLES: OnceLock<HashMap<TypeTag, OperatorTable>> = OnceLock::new();
    TABLES.get_or_init(build_tables)
}

const fn entry(accepts: &'static [TypeTag], call: OperatorFn) -> OperatorImpl {
    OperatorImpl { accepts, call }
}

/// A type's table: the `Object` entries overridden by its own.
fn derive(object: &OperatorTable, own: &[(Operator, OperatorImpl)]) -> OperatorTable {
    let mut table = object.clone();
    table.extend(own.iter().copied());
    table
}

fn build_tables() -> HashMap<TypeTag, OperatorTable> {
    let object: OperatorTable = HashMap::from([
        (Operator::Equals, entry(ANY, op_equals)),
        (Operator::NotEqual, entry(ANY, op_not_equal)),
        (Operator::UnaryLogicalNot, entry(&[], op_not)),
    ]);

    let numeric_ops: [(Operator, OperatorImpl); 9] = [
        (Operator::Add, entry(NUMERIC, op_add)),
        (Operator::Subtract, entry(NUMERIC, op_subtract)),
        (Operator::Divide, entry(NUMERIC, op_divide)),
        (Operator::Modulo, entry(NUMERIC, op_modulo)),
        (Operator::LessEqual, entry(NUMERIC, op_less_equal)),
        (Operator::GreatEqual, entry(NUMERIC, op_great_equal)),
        (Operator::LesserThan, entry(NUMERIC, op_lesser)),
        (Operator::GreaterThan, entry(NUMERIC, op_greater)),
        (Operator::UnarySubtract, entry(&[], op_negate)),
    ];

    let integer = [
        (Operator::Multiply, entry(&[TypeTag::Integer, TypeTag::Float, TypeTag::String], op_multiply)),
        (Operator::Or, entry(&[TypeTag::Integer], op_bit_or)),
        (Operator::And, entry(&[TypeTag::Integer], op_bit_and)),
        (Operator::Xor, entry(&[TypeTag::Integer], op_bit_xor)),
        (Operator::LeftShift, entry(&[TypeTag::Integer], op_left_shift)),
        (Operator::RightShift, entry(&[TypeTag::Integer], op_right_shift)),
        (Operator::UnaryTilde, entry(&[], op_invert)),
        (Operator::UnaryAdd, entry(&[], op_identity)),
    ];
    let float = [
        (Operator::Multiply, entry(NUMERIC, op_multiply)),
        (Operator::UnaryAdd, entry(&[], op_identity)),
    ];
    let string = [
        (Operator::Add, entry(&[TypeTag::String], op_concat)),
        (Operator::Multiply, entry(&[TypeTag::Integer], op_multiply)),
        (Operator::Index, entry(&[TypeTag::Integer], op_index)),
    ];
    let array = [
        (Operator::Add, entry(&[TypeTag::Array], op_concat)),
        (Operator::Index, entry(&[TypeTag::Integer], op_index)),
    ];

    let mut tables = HashMap::new();
    tables.insert(TypeTag::Integer, derive(&object, &[&numeric_ops[..], &integer[..]].concat()));
    tables.insert(TypeTag::Float, derive(&object, &[&numeric_ops[..], &float[..]].concat()));
    tables.insert(TypeTag::String, derive(&object, &string));
    tables.insert(TypeTag::Array, derive(&object, &array));
    tables.insert(TypeTag::Boolean, derive(&object, &[]));
    tables.insert(TypeTag::Null, derive(&object, &[]));
    tables.insert(TypeTag::Function, derive(&object, &[]));
    tables.insert(TypeTag::Object, object);
    tables
}

/// Resolve `op` on `receiver` and apply it to `operands`.
pub fn operate(receiver: &Value, op: Operator, operands: &[Value]) -> Dispatch {
    let Some(imp) = tables().get(&receiver.tag()).and_then(|table| table.get(&op)) else {
        return Dispatch::Empty;
    };
    let accepted = operands
        .iter()
        .all(|operand| operand.tags().iter().any(|tag| imp.accepts.contains(tag)));
    if !accepted {
        return Dispatch::Empty;
    }
    (imp.call)(receiver, operands)
}

/// Resolve `name` through the receiver's attribute table.
pub fn attribute(receiver: &Value, name: &str) -> Option<Value> {
    builtins::methods(receiver.tag())
        .iter()
        .find(|(method, _, _)| *method == name)
        .map(|&(method, native, ret)| {
            Value::Function(Rc::new(Function::bound(method, native, ret, receiver.clone())))
        })
}

// ---- Implementations ----

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(n) => Some(Num::Int(*n)),
            Value::Float(x) => Some(Num::Float(*x)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(x) => x,
        }
    }
}

/// Largest string `*` repetition will build.
const MAX_STRING_BYTES: usize = 1 << 28;

fn overflow(op: &str) -> Dispatch {
    Dispatch::Fault(format!("integer overflow in '{op}'"))
}

fn arithmetic(
    a: &Value,
    b: &[Value],
    symbol: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Dispatch {
    let (Some(x), Some(y)) = (Num::of(a), b.first().and_then(Num::of)) else {
        return Dispatch::Empty;
    };
    match (x, y) {
        (Num::Int(x), Num::Int(y)) => match int_op(x, y) {
            Some(n) => Dispatch::Value(Value::Integer(n)),
            None => overflow(symbol),
        },
        (x, y) => Dispatch::Value(Value::Float(float_op(x.as_f64(), y.as_f64()))),
    }
}

fn op_add(a: &Value, b: &[Value]) -> Dispatch {
    arithmetic(a, b, "+", i64::checked_add, |x, y| x + y)
}

fn op_subtract(a: &Value, b: &[Value]) -> Dispatch {
    arithmetic(a, b, "-", i64::checked_sub, |x, y| x - y)
}

fn op_multiply(a: &Value, b: &[Value]) -> Dispatch {
    match (a, b.first()) {
        (Value::Integer(n), Some(Value::String(s))) | (Value::String(s), Some(Value::Integer(n))) => {
            let count = usize::try_from(*n).unwrap_or(0);
            match s.len().checked_mul(count) {
                Some(len) if len <= MAX_STRING_BYTES => Dispatch::Value(Value::String(s.repeat(count))),
                _ => Dispatch::Fault("repetition result is too large".to_string()),
            }
        }
        _ => arithmetic(a, b, "*", i64::checked_mul, |x, y| x * y),
    }
}

fn op_divide(a: &Value, b: &[Value]) -> Dispatch {
    let (Some(x), Some(y)) = (Num::of(a), b.first().and_then(Num::of)) else {
        return Dispatch::Empty;
    };
    if y.as_f64() == 0.0 {
        return Dispatch::Fault("division by zero".to_string());
    }
    Dispatch::Value(Value::Float(x.as_f64() / y.as_f64()))
}

fn op_modulo(a: &Value, b: &[Value]) -> Dispatch {
    let (Some(x), Some(y)) = (Num::of(a), b.first().and_then(Num::of)) else {
        return Dispatch::Empty;
    };
    if y.as_f64() == 0.0 {
        return Dispatch::Fault("modulo by zero".to_string());
    }
    // Result takes the sign of the divisor.
    match (x, y) {
        (Num::Int(x), Num::Int(y)) => match x.checked_rem(y) {
            Some(r) if r != 0 && (r < 0) != (y < 0) => Dispatch::Value(Value::Integer(r + y)),
            Some(r) => Dispatch::Value(Value::Integer(r)),
            None => overflow("%"),
        },
        (x, y) => {
            let (x, y) = (x.as_f64(), y.as_f64());
            let r = x % y;
            let r = if r != 0.0 && (r < 0.0) != (y < 0.0) { r + y } else { r };
            Dispatch::Value(Value::Float(r))
        }
    }
}

fn integers(a: &Value, b: &[Value]) -> Option<(i64, i64)> {
    match (a, b.first()) {
        (Value::Integer(x), Some(Value::Integer(y))) => Some((*x, *y)),
        _ => None,
    }
}

fn bitwise(a: &Value, b: &[Value], f: fn(i64, i64) -> i64) -> Dispatch {
    match integers(a, b) {
        Some((x, y)) => Dispatch::Value(Value::Integer(f(x, y))),
        None => Dispatch::Empty,
    }
}

fn op_bit_or(a: &Value, b: &[Value]) -> Dispatch {
    bitwise(a, b, |x, y| x | y)
}

fn op_bit_and(a: &Value, b: &[Value]) -> Dispatch {
    bitwise(a, b, |x, y| x & y)
}

fn op_bit_xor(a: &Value, b: &[Value]) -> Dispatch {
    bitwise(a, b, |x, y| x ^ y)
}

fn shift(a: &Value, b: &[Value], symbol: &str, f: fn(i64, u32) -> Option<i64>) -> Dispatch {
    let Some((x, y)) = integers(a, b) else {
        return Dispatch::Empty;
    };
    match u32::try_from(y).ok().filter(|&y| y < 64) {
        Some(y) => f(x, y).map_or_else(|| overflow(symbol), |n| Dispatch::Value(Value::Integer(n))),
        None => Dispatch::Fault(format!("shift count {y} is out of range")),
    }
}

fn op_left_shift(a: &Value, b: &[Value]) -> Dispatch {
    // Bits shifted out of the value are an overflow.
    shift(a, b, "<<", |x, y| x.checked_shl(y).filter(|&r| r >> y == x))
}

fn op_right_shift(a: &Value, b: &[Value]) -> Dispatch {
    shift(a, b, ">>", i64::checked_shr)
}

fn compare(a: &Value, b: &[Value], int_cmp: fn(&i64, &i64) -> bool, float_cmp: fn(&f64, &f64) -> bool) -> Dispatch {
    let (Some(x), Some(y)) = (Num::of(a), b.first().and_then(Num::of)) else {
        return Dispatch::Empty;
    };
    let result = match (x, y) {
        (Num::Int(x), Num::Int(y)) => int_cmp(&x, &y),
        (x, y) => float_cmp(&x.as_f64(), &y.as_f64()),
    };
    Dispatch::Value(Value::Boolean(result))
}

fn op_less_equal(a: &Value, b: &[Value]) -> Dispatch {
    compare(a, b, i64::le, f64::le)
}

fn op_great_equal(a: &Value, b: &[Value]) -> Dispatch {
    compare(a, b, i64::ge, f64::ge)
}

fn op_lesser(a: &Value, b: &[Value]) -> Dispatch {
    compare(a, b, i64::lt, f64::lt)
}

fn op_greater(a: &Value, b: &[Value]) -> Dispatch {
    compare(a, b, i64::gt, f64::gt)
}

fn op_equals(a: &Value, b: &[Value]) -> Dispatch {
    match b.first() {
        Some(b) => Dispatch::Value(Value::Boolean(values_equal(a, b))),
        None => Dispatch::Empty,
    }
}

fn op_not_equal(a: &Value, b: &[Value]) -> Dispatch {
    match b.first() {
        Some(b) => Dispatch::Value(Value::Boolean(!values_equal(a, b))),
        None => Dispatch::Empty,
    }
}

fn op_not(a: &Value, _: &[Value]) -> Dispatch {
    Dispatch::Value(Value::Boolean(!a.is_truthy()))
}

fn op_negate(a: &Value, _: &[Value]) -> Dispatch {
    match a {
        Value::Integer(n) => n.checked_neg().map_or_else(|| overflow("-"), |n| Dispatch::Value(Value::Integer(n))),
        Value::Float(x) => Dispatch::Value(Value::Float(-x)),
        _ => Dispatch::Empty,
    }
}

fn op_invert(a: &Value, _: &[Value]) -> Dispatch {
    match a {
        Value::Integer(n) => Dispatch::Value(Value::Integer(!n)),
        _ => Dispatch::Empty,
    }
}

fn op_identity(a: &Value, _: &[Value]) -> Dispatch {
    Dispatch::Value(a.clone())
}

fn op_concat(a: &Value, b: &[Value]) -> Dispatch {
    match (a, b.first()) {
        (Value::String(x), Some(Value::String(y))) => Dispatch::Value(Value::String(format!("{x}{y}"))),
        (Value::Array(x), Some(Value::Array(y))) => {
            let mut items = x.borrow().clone();
            items.extend(y.borrow().iter().cloned());
            Dispatch::Value(Value::array(items))
        }
        _ => Dispatch::Empty,
    }
}

/// Negative indices count from the end.
fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let idx = if index < 0 { index + len } else { index };
    if (0..len).contains(&idx) { usize::try_from(idx).ok() } else { None }
}

fn op_index(a: &Value, b: &[Value]) -> Dispatch {
    let Some(Value::Integer(index)) = b.first() else {
        return Dispatch::Empty;
    };
    let out_of_range = || Dispatch::Fault(format!("index {index} is out of range"));
    match a {
        Value::Array(items) => {
            let items = items.borrow();
            match normalize_index(*index, items.len()) {
                Some(i) => Dispatch::Value(items[i].clone()),
                None => out_of_range(),
            }
        }
        Value::String(s) => {
            let count = s.chars().count();
            match normalize_index(*index, count).and_then(|i| s.chars().nth(i)) {
                Some(ch) => Dispatch::Value(Value::String(ch.to_string())),
                None => out_of_range(),
            }
        }
        _ => Dispatch::Empty,
    }
}
