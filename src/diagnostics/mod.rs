use crate::span::Span;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Lexical or grammatical error. Raised eagerly and never recovered from.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("SyntaxError: {msg} at {span}")]
pub struct SyntaxError {
    pub msg: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(msg: impl Into<String>, span: Span) -> Self {
        Self { msg: msg.into(), span }
    }
}

/// Class of a runtime error, printed as the last line of a traceback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Interpretation,
    Name,
    Operator,
    Runtime,
    Recursion,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Interpretation => "InterpretationError",
            ErrorKind::Name => "NameError",
            ErrorKind::Operator => "OperatorError",
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::Recursion => "RecursionError",
        };
        f.write_str(name)
    }
}

/// One entry of a traceback: where evaluation was when the error surfaced.
#[derive(Debug, Clone, PartialEq)]
pub struct StackCall {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub scope: String,
    pub statement: String,
}

impl StackCall {
    fn render(&self) -> String {
        format!(
            "  File '{}', line {} column {} in {}:\n    {}\n    {}^",
            self.file,
            self.line,
            self.column,
            self.scope,
            self.statement,
            " ".repeat(self.column),
        )
    }
}

/// An error raised while evaluating a program, carrying the call stack.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    pub stack: Vec<StackCall>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), stack: Vec::new() }
    }

    pub fn operator(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Operator, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    pub fn interpretation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Interpretation, message)
    }

    pub fn with_stack(mut self, stack: Vec<StackCall>) -> Self {
        self.stack = stack;
        self
    }

    /// Render the oldest-to-newest traceback followed by `<Kind>: <message>`.
    pub fn traceback(&self) -> String {
        let mut out = String::from("Traceback (old-to-recent calls):\n");
        for call in &self.stack {
            out.push_str(&call.render());
            out.push('\n');
        }
        out.push_str(&self.to_string());
        out
    }
}

/// Source text split into lines, used to quote the offending statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub name: String,
    lines: Vec<String>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, code: &str) -> Self {
        Self {
            name: name.into(),
            lines: code.lines().map(str::to_string).collect(),
        }
    }

    /// Line `number` (1-based), or an empty string when out of range.
    pub fn line(&self, number: usize) -> &str {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("config error: {msg}")]
    Config { msg: String, path: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Config { msg: msg.into(), path }
    }
}

/// Character offset of a position inside `source`, clamped to its length.
fn char_offset(source: &str, span: Span) -> usize {
    let mut offset = 0;
    for (idx, line) in source.split('\n').enumerate() {
        if idx + 1 == span.line {
            return offset + span.column.min(line.chars().count());
        }
        offset += line.chars().count() + 1;
    }
    source.chars().count()
}

/// Render an error for terminal output: ariadne reports for syntax errors,
/// tracebacks for runtime errors.
pub fn render_error(source: &str, filename: &str, err: &Error) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        Error::Syntax(syntax) => {
            let len = source.chars().count();
            let start = char_offset(source, syntax.span);
            let end = (start + 1).min(len).max(start);
            let report = Report::build(ReportKind::Error, (), start)
                .with_message(format!("SyntaxError in {filename}"))
                .with_label(Label::new(start..end).with_message(&syntax.msg))
                .finish();
            if report.eprint(Source::from(source)).is_err() {
                eprintln!("{syntax}");
            }
        }
        Error::Runtime(runtime) => {
            eprintln!("{}", runtime.traceback());
        }
        Error::Config { msg, path } => {
            eprintln!("error[config]: {msg}");
            eprintln!("  --> {}", path.display());
        }
        Error::Io(io) => {
            eprintln!("error: {io}");
        }
    }
}
