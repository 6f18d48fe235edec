use jolang::diagnostics::{Error, ErrorKind};
use jolang::interpreter::builtins::CaptureHost;
use jolang::repl::{process_line, LineOutcome};
use jolang::{Session, Value};

fn session() -> (Session, CaptureHost) {
    let host = CaptureHost::new();
    (Session::new(Box::new(host.clone())), host)
}

#[test]
fn bindings_survive_between_inputs() {
    let (mut session, _) = session();
    session.eval("counter = 1").unwrap();
    session.eval("counter += 41").unwrap();
    assert_eq!(session.eval("counter").unwrap(), Value::Integer(42));
    assert!(session.interpreter().globals().contains("counter"));
}

#[test]
fn functions_survive_between_inputs() {
    let (mut session, host) = session();
    session.eval("func greet(who){ print('hi', who) }").unwrap();
    session.eval("greet('Ada')").unwrap();
    assert_eq!(host.output(), "hi Ada\n");
}

#[test]
fn macros_survive_between_inputs() {
    let (mut session, _) = session();
    session.eval("%macro ANSWER 42\n").unwrap();
    assert!(session.macros().contains("ANSWER"));
    assert_eq!(session.eval("ANSWER + 0").unwrap(), Value::Integer(42));
}

#[test]
fn failed_input_keeps_earlier_bindings() {
    let (mut session, _) = session();
    session.eval("kept = 'yes'").unwrap();
    let err = session.eval("changed = 1\nboom()").unwrap_err();
    assert!(matches!(err, Error::Runtime(ref e) if e.kind == ErrorKind::Name));
    assert_eq!(session.eval("kept").unwrap(), Value::String("yes".into()));
    // Statements before the failure already ran.
    assert_eq!(session.eval("changed").unwrap(), Value::Integer(1));
}

#[test]
fn shell_errors_name_the_shell() {
    let (mut session, _) = session();
    match session.eval("nope").unwrap_err() {
        Error::Runtime(err) => assert_eq!(err.stack[0].file, "shell"),
        other => panic!("expected runtime error, got {other}"),
    }
}

#[test]
fn process_line_quits_on_keywords() {
    let (mut session, _) = session();
    for line in ["quit", "exit", "  QUIT  "] {
        assert!(matches!(process_line(&mut session, line), LineOutcome::Quit), "{line:?}");
    }
}

#[test]
fn process_line_echoes_repr() {
    let (mut session, _) = session();
    match process_line(&mut session, "'a' + 'b'") {
        LineOutcome::Echo(text) => assert_eq!(text, "'ab'"),
        other => panic!("expected echo, got {other:?}"),
    }
    match process_line(&mut session, "[1, 'x']") {
        LineOutcome::Echo(text) => assert_eq!(text, "[1, 'x']"),
        other => panic!("expected echo, got {other:?}"),
    }
}

#[test]
fn process_line_is_silent_for_statements() {
    let (mut session, host) = session();
    assert!(matches!(process_line(&mut session, ""), LineOutcome::Silent));
    assert!(matches!(process_line(&mut session, "x = 3"), LineOutcome::Silent));
    assert!(matches!(process_line(&mut session, "print(x)"), LineOutcome::Silent));
    assert_eq!(host.output(), "3\n");
}

#[test]
fn process_line_accepts_macro_definitions() {
    let (mut session, _) = session();
    assert!(matches!(process_line(&mut session, "%macro TWICE * 2"), LineOutcome::Silent));
    match process_line(&mut session, "21 TWICE") {
        LineOutcome::Echo(text) => assert_eq!(text, "42"),
        other => panic!("expected echo, got {other:?}"),
    }
}

#[test]
fn process_line_reports_failures() {
    let (mut session, _) = session();
    assert!(matches!(
        process_line(&mut session, "1 +"),
        LineOutcome::Failed(Error::Syntax(_))
    ));
    assert!(matches!(
        process_line(&mut session, "1 / 0"),
        LineOutcome::Failed(Error::Runtime(_))
    ));
}
