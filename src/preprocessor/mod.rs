use std::collections::{HashMap, VecDeque};

use crate::diagnostics::SyntaxError;
use crate::lexer::{Token, TokenKind};

/// Key a macro is looked up by: the token kind plus its literal content.
pub type MacroKey = (TokenKind, Option<String>);

/// Macro definitions accumulated while preprocessing.
///
/// Owned by the caller so a REPL can keep definitions alive across inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroTable {
    macros: HashMap<MacroKey, Vec<Token>>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &Token, replacement: Vec<Token>) {
        self.macros.insert((name.kind, name.lexeme.clone()), replacement);
    }

    pub fn get(&self, token: &Token) -> Option<&[Token]> {
        self.macros
            .get(&(token.kind, token.lexeme.clone()))
            .map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros
            .contains_key(&(TokenKind::Identifier, Some(name.to_string())))
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

/// Lazy token-to-token rewriting stage.
pub struct Preprocessor<'m, I> {
    tokens: I,
    macros: &'m mut MacroTable,
    pending: VecDeque<Token>,
    failed: bool,
}

/// Wrap a token stream, expanding macros from (and recording definitions into) `macros`.
pub fn preprocess<I>(tokens: I, macros: &mut MacroTable) -> Preprocessor<'_, I>
where
    I: Iterator<Item = Result<Token, SyntaxError>>,
{
    Preprocessor { tokens, macros, pending: VecDeque::new(), failed: false }
}

impl<I> Preprocessor<'_, I>
where
    I: Iterator<Item = Result<Token, SyntaxError>>,
{
    /// Consume a `%macro NAME body...` directive; `percent` is the leading `%`.
    fn define(&mut self, percent: &Token) -> Result<(), SyntaxError> {
        let directive = self.tokens.next().transpose()?.ok_or_else(|| {
            SyntaxError::new("expected 'macro' after '%' directive, found end of input", percent.span)
        })?;
        if directive.kind != TokenKind::Identifier || directive.lexeme() != "macro" {
            return Err(SyntaxError::new(
                format!("expected 'macro' after '%' directive, found {directive}"),
                directive.span,
            ));
        }

        let name = self.tokens.next().transpose()?.ok_or_else(|| {
            SyntaxError::new("expected macro name, found end of input", directive.span)
        })?;
        if name.kind != TokenKind::Identifier {
            return Err(SyntaxError::new(
                format!("macro name must be an identifier, found {name}"),
                name.span,
            ));
        }

        let mut replacement = Vec::new();
        loop {
            match self.tokens.next().transpose()? {
                Some(tok) if tok.kind == TokenKind::Newline => break,
                Some(tok) => replacement.push(tok),
                None => {
                    return Err(SyntaxError::new(
                        format!("macro '{}' is not terminated by a newline", name.lexeme()),
                        name.span,
                    ));
                }
            }
        }

        tracing::debug!(name = name.lexeme(), tokens = replacement.len(), "macro defined");
        self.macros.define(&name, replacement);
        Ok(())
    }

    fn step(&mut self) -> Result<Option<Token>, SyntaxError> {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                return Ok(Some(tok));
            }
            let Some(tok) = self.tokens.next().transpose()? else {
                return Ok(None);
            };

            if tok.kind == TokenKind::Modulo && tok.span.column == 0 {
                self.define(&tok)?;
                continue;
            }

            match self.macros.get(&tok) {
                Some(replacement) => {
                    tracing::trace!(name = tok.lexeme(), "macro expanded");
                    // Spliced tokens report the position of the use site.
                    self.pending.extend(replacement.iter().map(|r| Token {
                        span: tok.span,
                        ..r.clone()
                    }));
                }
                None => return Ok(Some(tok)),
            }
        }
    }
}

impl<I> Iterator for Preprocessor<'_, I>
where
    I: Iterator<Item = Result<Token, SyntaxError>>,
{
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.step() {
            Ok(tok) => tok.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
