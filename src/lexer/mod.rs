pub mod token;
pub use token::{is_keyword, Token, TokenKind};

use logos::Logos;

use crate::diagnostics::SyntaxError;
use crate::span::Span;

/// Lazy tokenizer over a source string.
///
/// Yields positioned tokens one at a time, suppressing comments. The first
/// error ends the stream.
pub struct Tokenizer<'src> {
    lexer: logos::Lexer<'src, TokenKind>,
    line: usize,
    line_start: usize,
    /// Byte offset whose character column is `column`; only moves forward.
    column_offset: usize,
    column: usize,
    failed: bool,
}

/// Start tokenizing `source`. Nothing is scanned until the iterator is polled.
pub fn tokenize(source: &str) -> Tokenizer<'_> {
    Tokenizer {
        lexer: TokenKind::lexer(source),
        line: 1,
        line_start: 0,
        column_offset: 0,
        column: 0,
        failed: false,
    }
}

/// Tokenize the whole source eagerly.
pub fn lex(source: &str) -> Result<Vec<Token>, SyntaxError> {
    tokenize(source).collect()
}

impl<'src> Tokenizer<'src> {
    /// Column (in characters) of a byte offset on the current line.
    fn column_of(&mut self, offset: usize) -> usize {
        if offset < self.column_offset {
            self.column_offset = self.line_start;
            self.column = 0;
        }
        self.column += self.lexer.source()[self.column_offset..offset].chars().count();
        self.column_offset = offset;
        self.column
    }

    fn start_line(&mut self, offset: usize) {
        self.line += 1;
        self.line_start = offset;
        self.column_offset = offset;
        self.column = 0;
    }

    /// Advance line tracking past every newline inside `range`.
    fn track_newlines(&mut self, start: usize, end: usize) {
        let text = &self.lexer.source()[start..end];
        for (idx, ch) in text.char_indices() {
            if ch == '\n' {
                self.start_line(start + idx + 1);
            }
        }
    }

    fn fail(&mut self, msg: String, span: Span) -> Option<Result<Token, SyntaxError>> {
        self.failed = true;
        Some(Err(SyntaxError::new(msg, span)))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let result = self.lexer.next()?;
            let range = self.lexer.span();
            // Snapshot the start position before any multi-line token moves it.
            let span = Span::new(self.line, self.column_of(range.start));
            let slice = self.lexer.slice();

            let kind = match result {
                Ok(kind) => kind,
                Err(()) => {
                    let msg = match slice.chars().next() {
                        Some(quote @ ('"' | '\'')) => {
                            format!("string literal starting with {quote} was never closed")
                        }
                        Some(ch) => format!("invalid syntax {ch:?}"),
                        None => "invalid syntax".to_string(),
                    };
                    return self.fail(msg, span);
                }
            };

            let token = match kind {
                TokenKind::Comment => continue,
                TokenKind::Newline => {
                    self.start_line(range.end);
                    Token::new(TokenKind::Newline, None, span)
                }
                TokenKind::Identifier => Token::new(kind, Some(slice.to_string()), span),
                TokenKind::String => {
                    let content = unescape(&slice[1..slice.len() - 1]);
                    self.track_newlines(range.start, range.end);
                    Token::new(TokenKind::String, Some(content), span)
                }
                TokenKind::Integer => match classify_number(slice) {
                    Ok((kind, lexeme)) => Token::new(kind, Some(lexeme), span),
                    Err(msg) => return self.fail(msg, span),
                },
                _ => Token::new(kind, None, span),
            };
            tracing::trace!(kind = %token.kind, line = span.line, column = span.column, "token");
            return Some(Ok(token));
        }
    }
}

fn unescape(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('0') => result.push('\0'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn all_digits(s: &str, radix: u32) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_digit(radix))
}

fn strip_radix_prefix<'a>(s: &'a str, letter: char) -> Option<&'a str> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some('0'), Some(l)) if l.eq_ignore_ascii_case(&letter) => Some(&s[2..]),
        _ => None,
    }
}

/// Classify a scanned numeric run. Integer, float, octal, hex and binary
/// grammars are tried in that order; the first full match wins.
fn classify_number(text: &str) -> Result<(TokenKind, String), String> {
    let too_large = || format!("integer literal {text:?} is too large");

    if all_digits(text, 10) {
        let value: i64 = text.parse().map_err(|_| too_large())?;
        return Ok((TokenKind::Integer, value.to_string()));
    }

    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    if text.contains('.') && all_digits(whole, 10) && (fraction.is_empty() || all_digits(fraction, 10)) {
        return Ok((TokenKind::Float, text.to_string()));
    }

    for (letter, radix) in [('o', 8), ('x', 16), ('b', 2)] {
        if let Some(digits) = strip_radix_prefix(text, letter) {
            if all_digits(digits, radix) {
                let value = i64::from_str_radix(digits, radix).map_err(|_| too_large())?;
                return Ok((TokenKind::Integer, value.to_string()));
            }
        }
    }

    Err(format!("couldn't tokenize the number {text:?}"))
}
