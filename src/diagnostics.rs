//! # Diagnostics
//!
//! Every phase of the compiler reports through the same currency: a
//! [`Diagnostic`] carrying a [`Code`], a human readable sentence and the
//! [`Trace`] of the value or scope it originated from. Errors abort
//! compilation at the end of their phase, warnings never do.

use std::{error::Error, fmt::Display};

/// Provenance of a value or scope: source file, line and enclosing scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    pub file: String,
    pub line: usize,
    pub scope: String,
}

impl Trace {
    pub fn new(file: impl Into<String>, line: usize, scope: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            scope: scope.into(),
        }
    }
}

impl Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}:{} [{}]", self.file, self.line, self.scope))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// The closed set of diagnostic codes the compiler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// E00: an indented line that is not a valid continuation.
    UndefinedSequence,
    /// E01: a logical line that fits no classification.
    MalformedLine,
    /// E02: a second header with an already used scope name.
    DuplicateScope,
    /// E03: a second item with an already used key in the same scope.
    DuplicateKey,
    /// E04: a closure invocation naming no registered closure.
    UnknownClosure,
    /// E05: a closure invoked with unusable arguments, or a failed eval.
    InvalidClosure,
    /// E06: a scope classified against an abstract parent misses a key.
    MissingAbstractKey,
    /// E07: a value that does not satisfy its declared type tag.
    IncorrectType,
    /// E08: an input or included file that could not be read.
    MissingInputFile,
    /// W00: a reference naming a scope that does not exist.
    UnresolvedScope,
    /// W01: a reference naming a key missing from an existing scope.
    UnresolvedKey,
}

impl Code {
    pub fn severity(&self) -> Severity {
        match self {
            Code::UnresolvedScope | Code::UnresolvedKey => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Code::UndefinedSequence => "E00",
            Code::MalformedLine => "E01",
            Code::DuplicateScope => "E02",
            Code::DuplicateKey => "E03",
            Code::UnknownClosure => "E04",
            Code::InvalidClosure => "E05",
            Code::MissingAbstractKey => "E06",
            Code::IncorrectType => "E07",
            Code::MissingInputFile => "E08",
            Code::UnresolvedScope => "W00",
            Code::UnresolvedKey => "W01",
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: Code,
    pub message: String,
    pub trace: Trace,
}

impl Diagnostic {
    pub fn new(code: Code, message: impl Into<String>, trace: Trace) -> Self {
        Self {
            code,
            message: message.into(),
            trace,
        }
    }

    pub fn is_error(&self) -> bool {
        self.code.severity() == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.code.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        f.write_fmt(format_args!(
            "{severity}[{code}]: {message}\n  --> {trace}",
            code = self.code,
            message = self.message,
            trace = self.trace
        ))
    }
}

impl Error for Diagnostic {}

/// Whether a drained diagnostic list contains anything fatal.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
