use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::config::ReplConfig;
use crate::diagnostics::{render_error, Error};
use crate::Session;

/// What one shell line produced.
#[derive(Debug)]
pub enum LineOutcome {
    Quit,
    /// Blank line, or a result of `null`.
    Silent,
    Echo(String),
    Failed(Error),
}

/// Feed one line through the session.
pub fn process_line(session: &mut Session, line: &str) -> LineOutcome {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
        return LineOutcome::Quit;
    }
    if trimmed.is_empty() {
        return LineOutcome::Silent;
    }
    // A macro definition needs its terminating newline.
    match session.eval(&format!("{line}\n")) {
        Ok(value) if value.is_null() => LineOutcome::Silent,
        Ok(value) => LineOutcome::Echo(value.repr()),
        Err(err) => LineOutcome::Failed(err),
    }
}

/// Interactive loop. Ends on `quit`/`exit`, Ctrl-C or end of input.
pub fn run(session: &mut Session, config: &ReplConfig) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline(&config.prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if config.history && !line.trim().is_empty() {
            editor.add_history_entry(line.as_str())?;
        }
        match process_line(session, &line) {
            LineOutcome::Quit => break,
            LineOutcome::Silent => {}
            LineOutcome::Echo(text) => println!("{text}"),
            LineOutcome::Failed(err) => render_error(&line, "shell", &err),
        }
    }
    Ok(())
}
