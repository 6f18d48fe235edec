mod common;

use common::{run_fails, run_stdout, run_value};
use jolang::diagnostics::ErrorKind;
use jolang::Value;

#[test]
fn returned_function_keeps_parameters() {
    let src = "func adder(n){\n  func add(x){ return x + n }\n  return add\n}\nadd5 = adder(5)\nadd10 = adder(10)\nprint(add5(1), add10(1))";
    assert_eq!(run_stdout(src), "6 11\n");
}

#[test]
fn closure_sees_defining_scope_not_call_site() {
    let src = "x = 'global'\nfunc show(){ return x }\nfunc caller(){\n  x = 'local'\n  return show()\n}\ncaller()";
    assert_eq!(run_value(src), Value::String("global".into()));
}

#[test]
fn callee_assignments_do_not_leak() {
    let src = "x = 1\nfunc f(){ x = 2\nreturn x }\nprint(f(), x)";
    assert_eq!(run_stdout(src), "2 1\n");
}

#[test]
fn parameters_shadow_captured_names() {
    let src = "x = 1\nfunc f(x){ return x }\nf(9)";
    assert_eq!(run_value(src), Value::Integer(9));
}

#[test]
fn recursion_through_captured_scope() {
    let src = "func fact(n){\n  if(n <= 1){ return 1 }\n  return n * fact(n - 1)\n}\nfact(10)";
    assert_eq!(run_value(src), Value::Integer(3628800));
}

#[test]
fn mutual_recursion_defined_later() {
    let src = "func even(n){ if(n == 0){ return true }\nreturn odd(n - 1) }\nfunc odd(n){ if(n == 0){ return false }\nreturn even(n - 1) }\neven(10)";
    assert_eq!(run_value(src), Value::Boolean(true));
}

#[test]
fn functions_are_values() {
    let src = "func twice(f, x){ return f(f(x)) }\nfunc inc(x){ return x + 1 }\ntwice(inc, 3)";
    assert_eq!(run_value(src), Value::Integer(5));
    assert_eq!(run_stdout("func f(){}\nprint(f)"), "<function f>\n");
}

#[test]
fn shared_array_is_mutable_through_closure() {
    let src = "log = []\nfunc record(x){ log.append(x) }\nrecord(1)\nrecord(2)\nlog";
    assert_eq!(run_value(src), Value::array(vec![Value::Integer(1), Value::Integer(2)]));
}

#[test]
fn arity_is_checked() {
    let err = run_fails("func f(a){ return a }\nf(1, 2)");
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert_eq!(err.message, "f() takes 1 argument(s) but 2 were given");
}
