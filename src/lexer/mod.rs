//! # Lexer
//!
//! The lexer is line oriented: physical lines are first folded into logical
//! lines (a line indented strictly deeper than the anchor column of the last
//! foldable line continues it), then each logical line is classified as a
//! blank, a comment, a scope header, an item or a symbol declaration.
//!
//! Comment lines never fold and never move the anchor, so a `;` line may sit
//! between a line and its continuation.

mod token;

pub use token::*;

use log::trace;

use crate::diagnostics::{Code, Diagnostic, Trace};

/// The spelling of the implicit global scope in traces and lookups.
pub const GLOBAL_SCOPE: &str = "__global__";

#[derive(Debug, Clone)]
enum RawLine {
    Blank { line: usize },
    Comment { line: usize, text: String },
    Logical { line: usize, text: String },
}

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    file: &'a str,
    input: &'a str,
    /// Name of the most recently opened scope, for diagnostic traces.
    scope: String,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a str, input: &'a str) -> Self {
        Self {
            file,
            input,
            scope: GLOBAL_SCOPE.to_owned(),
            tokens: vec![],
            diagnostics: vec![],
        }
    }

    /// Consume the lexer, producing the classified token stream and every
    /// diagnostic drained along the way.
    pub fn lex(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let lines = self.fold_lines();

        for raw in lines {
            match raw {
                RawLine::Blank { line } => self.tokens.push(Token::Blank {
                    position: self.position(line),
                }),
                RawLine::Comment { line, text } => self.tokens.push(Token::Comment {
                    value: text,
                    position: self.position(line),
                }),
                RawLine::Logical { line, text } => self.classify(line, &text),
            }
        }

        (self.tokens, self.diagnostics)
    }

    fn position(&self, line: usize) -> Position {
        (self.file.to_owned(), line)
    }

    fn trace(&self, line: usize) -> Trace {
        Trace::new(self.file, line, self.scope.clone())
    }

    /// Fold physical lines into logical lines. The anchor is the indent
    /// column of the last foldable line; any deeper indented line continues
    /// that line, separated by a single space. An indented line with no
    /// anchor, or one not strictly deeper, drains E00 and then opens a fresh
    /// logical line at its own indent.
    fn fold_lines(&mut self) -> Vec<RawLine> {
        let mut lines: Vec<RawLine> = vec![];
        // (anchor indent, index into `lines` of the line being continued)
        let mut anchor: Option<(usize, usize)> = None;

        for (index, physical) in self.input.lines().enumerate() {
            let number = index + 1;
            let physical = physical.strip_suffix('\r').unwrap_or(physical);
            let trimmed = physical.trim_start();
            let indent = physical.len() - trimmed.len();

            if trimmed.is_empty() {
                lines.push(RawLine::Blank { line: number });
                continue;
            }

            if trimmed.starts_with(';') {
                lines.push(RawLine::Comment {
                    line: number,
                    text: trimmed.to_owned(),
                });
                continue;
            }

            if indent > 0 {
                match anchor {
                    Some((column, target)) if indent > column => {
                        let RawLine::Logical { text, .. } = &mut lines[target] else {
                            unreachable!("anchor must point at a logical line");
                        };
                        text.push(' ');
                        text.push_str(trimmed);
                        continue;
                    }
                    _ => {
                        self.diagnostics.push(Diagnostic::new(
                            Code::UndefinedSequence,
                            "undefined sequence: indented line does not continue anything",
                            self.trace(number),
                        ));
                        // recover by treating the line as a fresh logical
                        // line anchored at its own indent
                    }
                }
            }

            if trimmed.starts_with('[') {
                self.scope = header_name_of(trimmed);
            }

            anchor = Some((indent, lines.len()));
            lines.push(RawLine::Logical {
                line: number,
                text: trimmed.to_owned(),
            });
        }

        lines
    }

    fn classify(&mut self, line: usize, text: &str) {
        trace!("classifying line {line} '{text}'");

        if text.starts_with('[') {
            self.classify_header(line, text);
        } else if let Some(index) = text.find('=') {
            self.classify_item(line, text, index);
        } else {
            self.classify_symbol(line, text);
        }
    }

    fn classify_header(&mut self, line: usize, text: &str) {
        let Some(close) = text.find(']') else {
            self.diagnostics.push(Diagnostic::new(
                Code::MalformedLine,
                format!("header '{text}' is missing a closing ']'"),
                self.trace(line),
            ));
            return;
        };

        let name = text[1..close].trim().to_owned();
        self.scope = if name.is_empty() {
            GLOBAL_SCOPE.to_owned()
        } else {
            name.clone()
        };

        let rest = text[close + 1..].trim();
        let closures = if rest.is_empty() {
            vec![]
        } else if let Some(list) = rest.strip_prefix("::") {
            self.parse_closure_list(line, list)
        } else {
            self.diagnostics.push(Diagnostic::new(
                Code::MalformedLine,
                format!("unexpected '{rest}' after header, expected '::' and a closure list"),
                self.trace(line),
            ));
            vec![]
        };

        self.tokens.push(Token::Header {
            name,
            closures,
            position: self.position(line),
        });
    }

    /// `CLOSURE_LIST` is comma separated; each invocation is a bare
    /// identifier followed by zero or more `:symbol` arguments.
    fn parse_closure_list(&mut self, line: usize, list: &str) -> Vec<ClosureCall> {
        let mut calls = vec![];

        for invocation in list.split(',') {
            let mut words = invocation.split_whitespace();

            let Some(name) = words.next() else {
                self.diagnostics.push(Diagnostic::new(
                    Code::MalformedLine,
                    "empty closure invocation",
                    self.trace(line),
                ));
                continue;
            };

            if !is_identifier(name) {
                self.diagnostics.push(Diagnostic::new(
                    Code::MalformedLine,
                    format!("'{name}' is not a valid closure name"),
                    self.trace(line),
                ));
                continue;
            }

            let mut args = vec![];
            let mut valid = true;
            for word in words {
                match word.strip_prefix(':') {
                    Some(symbol) if is_identifier(symbol) => args.push(symbol.to_owned()),
                    _ => {
                        self.diagnostics.push(Diagnostic::new(
                            Code::MalformedLine,
                            format!("'{word}' is not a valid symbol argument"),
                            self.trace(line),
                        ));
                        valid = false;
                    }
                }
            }

            if valid {
                calls.push(ClosureCall {
                    name: name.to_owned(),
                    args,
                });
            }
        }

        calls
    }

    fn classify_item(&mut self, line: usize, text: &str, eq: usize) {
        let mut lhs = text[..eq].trim_end();
        let rhs = text[eq + 1..].trim().to_owned();

        let eval_marked = lhs.ends_with(':');
        if eval_marked {
            lhs = lhs[..lhs.len() - 1].trim_end();
        }

        let (key, type_tag) = match lhs.split_once(':') {
            Some((key, tag)) => (key.trim_end(), Some(tag.trim().to_owned())),
            None => (lhs, None),
        };

        if !is_identifier(key) {
            self.diagnostics.push(Diagnostic::new(
                Code::MalformedLine,
                format!("'{key}' is not a valid key"),
                self.trace(line),
            ));
            return;
        }

        if matches!(&type_tag, Some(tag) if !is_identifier(tag)) {
            self.diagnostics.push(Diagnostic::new(
                Code::MalformedLine,
                format!("'{lhs}' carries no valid type tag"),
                self.trace(line),
            ));
            return;
        }

        self.tokens.push(Token::Item {
            key: key.to_owned(),
            type_tag,
            rhs,
            eval_marked,
            position: self.position(line),
        });
    }

    fn classify_symbol(&mut self, line: usize, text: &str) {
        let (key, type_tag) = if let Some(symbol) = text.strip_prefix(':') {
            (symbol.trim(), None)
        } else if let Some((key, tag)) = text.split_once(':') {
            (key.trim_end(), Some(tag.trim().to_owned()))
        } else {
            (text, None)
        };

        let tag_valid = match &type_tag {
            Some(tag) => is_identifier(tag),
            None => true,
        };

        if !is_identifier(key) || !tag_valid {
            self.diagnostics.push(Diagnostic::new(
                Code::MalformedLine,
                format!("cannot classify line '{text}'"),
                self.trace(line),
            ));
            return;
        }

        self.tokens.push(Token::SymbolDecl {
            key: key.to_owned(),
            type_tag,
            position: self.position(line),
        });
    }
}

/// Best-effort scope name of a header line, for diagnostic traces during
/// folding (before the header is classified).
fn header_name_of(text: &str) -> String {
    let inner = text
        .find(']')
        .map(|close| text[1..close].trim())
        .unwrap_or("");

    if inner.is_empty() {
        GLOBAL_SCOPE.to_owned()
    } else {
        inner.to_owned()
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
