pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod preprocessor;
pub mod parser;
pub mod interpreter;
pub mod config;
pub mod repl;

use config::Config;
use diagnostics::{Error, SourceFile, SyntaxError};
use interpreter::builtins::Host;
use interpreter::Interpreter;
use lexer::{tokenize, Token};
use parser::ast::Block;
use preprocessor::{preprocess, MacroTable};

pub use interpreter::value::Value;

/// Tokenize and macro-expand `source`, recording definitions into `macros`.
pub fn expand_tokens(source: &str, macros: &mut MacroTable) -> Result<Vec<Token>, SyntaxError> {
    preprocess(tokenize(source), macros).collect()
}

/// Parse a source string (tokenize → preprocess → parse), threading the macro table.
pub fn parse_source(source: &str, macros: &mut MacroTable) -> Result<Block, SyntaxError> {
    parser::parse(preprocess(tokenize(source), macros))
}

/// Run a whole program in a fresh session. Returns the last statement's value.
pub fn run_source(name: &str, source: &str, host: Box<dyn Host>, config: &Config) -> Result<Value, Error> {
    Session::with_config(host, config).eval_named(name, source)
}

/// Interpreter state that outlives a single input: the macro table and the
/// module scope.
pub struct Session {
    macros: MacroTable,
    interpreter: Interpreter,
}

impl Session {
    pub fn new(host: Box<dyn Host>) -> Self {
        Self::with_config(host, &Config::default())
    }

    pub fn with_config(host: Box<dyn Host>, config: &Config) -> Self {
        Self {
            macros: MacroTable::new(),
            interpreter: Interpreter::new(host).with_max_call_depth(config.interpreter.max_call_depth),
        }
    }

    /// Evaluate one shell input.
    pub fn eval(&mut self, input: &str) -> Result<Value, Error> {
        self.eval_named("shell", input)
    }

    pub fn eval_named(&mut self, name: &str, input: &str) -> Result<Value, Error> {
        let program = parse_source(input, &mut self.macros)?;
        let value = self.interpreter.run(&program, SourceFile::new(name, input))?;
        Ok(value)
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }
}
