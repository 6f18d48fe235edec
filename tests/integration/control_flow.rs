mod common;

use common::{run_stdout, run_value};
use jolang::Value;

#[test]
fn for_loop_continue_and_break_visit_expected_values() {
    let src = "for(i=0;i<5;i+=1){ if(i==2){continue} if(i==4){break} print(i) }";
    assert_eq!(run_stdout(src), "0\n1\n3\n");
}

#[test]
fn break_skips_step() {
    let src = "for(i=0;i<5;i+=1){ if(i==2){break} }\ni";
    assert_eq!(run_value(src), Value::Integer(2));
}

#[test]
fn continue_still_runs_step() {
    let src = "n = 0\nfor(i=0;i<6;i+=1){\n  if(i % 2){continue}\n  n += i\n}\nn";
    assert_eq!(run_value(src), Value::Integer(6));
}

#[test]
fn for_with_empty_condition_runs_until_break() {
    let src = "c = 0\nfor(;;){\n  c += 1\n  if(c == 7){break}\n}\nc";
    assert_eq!(run_value(src), Value::Integer(7));
}

#[test]
fn while_with_continue() {
    let src = "i = 0\nwhile(i < 5){\n  i += 1\n  if(i == 3){continue}\n  print(i)\n}";
    assert_eq!(run_stdout(src), "1\n2\n4\n5\n");
}

#[test]
fn while_false_never_runs() {
    assert_eq!(run_stdout("while(0){ print('no') }\nprint('done')"), "done\n");
}

#[test]
fn break_only_leaves_innermost_loop() {
    let src = "for(i=0;i<3;i+=1){\n  j = 0\n  while(1){\n    j += 1\n    if(j > i){break}\n  }\n  print(i, j)\n}";
    assert_eq!(run_stdout(src), "0 1\n1 2\n2 3\n");
}

#[test]
fn return_from_nested_loops() {
    let src = "func find(target){\n  for(i=0;i<10;i+=1){\n    for(j=0;j<10;j+=1){\n      if(i * j == target){ return [i, j] }\n    }\n  }\n  return null\n}\nfind(12)";
    assert_eq!(run_value(src), Value::array(vec![Value::Integer(2), Value::Integer(6)]));
}

#[test]
fn return_without_value_is_null() {
    assert_eq!(run_value("func f(){ return }\nf()"), Value::Null);
    assert_eq!(run_value("func g(){ 1 }\ng()"), Value::Null);
}

#[test]
fn statements_after_return_do_not_run() {
    let src = "func f(){\n  print('a')\n  return 1\n  print('b')\n}\nf()";
    assert_eq!(run_stdout(src), "a\n");
}

#[test]
fn if_elif_else_selects_one_branch() {
    let src = "func grade(n){\n  if(n >= 90){ return 'A' } elif(n >= 80){ return 'B' } elif(n >= 70){ return 'C' } else { return 'F' }\n}\nprint(grade(95), grade(85), grade(75), grade(10))";
    assert_eq!(run_stdout(src), "A B C F\n");
}

#[test]
fn truthiness_in_conditions() {
    let src ="if(''){print(1)} elif([]){print(2)} elif(0.0){print(3)} elif(null){print(4)} else {print(5)}";
    assert_eq!(run_stdout(src), "5\n");
    assert_eq!(run_stdout("if('x'){print('yes')}"), "yes\n");
}
