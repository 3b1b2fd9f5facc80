//! # Compiler pipeline
//!
//! A straight, synchronous pipeline: read (with include splicing), lex,
//! build the scope tables, run the closure rewrite phase, resolve
//! references, run the eval phase, type check, emit. Errors abort at the end
//! of the phase that drained them and produce no output; warnings carry
//! through. Nothing here panics on user input and nothing is thrown: the
//! outcome struct holds everything the caller needs.

use std::path::Path;

use log::{debug, info};

use crate::{
    closures,
    diagnostics::{has_errors, Diagnostic},
    emitter,
    environment::Environment,
    lexer::Token,
    loader, resolver, scope, typechecker,
};

/// Outcome of one compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    /// The emitted INI text, absent when any error was drained.
    pub ini: Option<String>,
    /// The environment as `setenv` scopes left it.
    pub environment: Environment,
    /// Every diagnostic drained, errors and warnings, in phase order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn succeeded(&self) -> bool {
        self.ini.is_some()
    }

    fn failed(diagnostics: Vec<Diagnostic>, environment: Environment) -> Self {
        Self {
            ini: None,
            environment,
            diagnostics,
        }
    }
}

/// Compile a source file (and everything it includes).
pub fn compile_file(file: &Path) -> Compilation {
    info!("compiling '{file}'", file = file.display());

    let (tokens, diagnostics) = loader::load(file);
    compile_tokens(tokens, diagnostics)
}

/// Compile an in-memory source. Includes resolve relative to the folder part
/// of `name`.
pub fn compile_source(name: &str, source: &str) -> Compilation {
    let (tokens, diagnostics) = loader::load_source(name, source);
    compile_tokens(tokens, diagnostics)
}

fn compile_tokens(tokens: Vec<Token>, mut diagnostics: Vec<Diagnostic>) -> Compilation {
    if has_errors(&diagnostics) {
        return Compilation::failed(diagnostics, Environment::default());
    }

    let (mut glut, mut drained) = scope::build(tokens);
    diagnostics.append(&mut drained);
    if has_errors(&diagnostics) {
        return Compilation::failed(diagnostics, Environment::default());
    }

    let mut environment = Environment::default();

    debug!("running closure rewrite phase");
    diagnostics.extend(closures::run(&mut glut, &mut environment));
    if has_errors(&diagnostics) {
        return Compilation::failed(diagnostics, environment);
    }

    debug!("resolving references");
    diagnostics.extend(resolver::resolve(&mut glut));

    debug!("running closure eval phase");
    diagnostics.extend(closures::run_eval(&mut glut, &mut environment));
    if has_errors(&diagnostics) {
        return Compilation::failed(diagnostics, environment);
    }

    diagnostics.extend(typechecker::check(&glut));
    if has_errors(&diagnostics) {
        return Compilation::failed(diagnostics, environment);
    }

    let ini = emitter::emit(&glut, &environment);

    Compilation {
        ini: Some(ini),
        environment,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Code;

    #[test]
    fn test_warnings_do_not_abort() {
        let compilation = compile_source("test.ini", "[Blade]\nkey = Missing::max_level");

        assert!(compilation.succeeded());
        assert_eq!(1, compilation.diagnostics.len());
        assert_eq!(Code::UnresolvedScope, compilation.diagnostics[0].code);
        assert_eq!("[Blade]\nkey=Missing::max_level\n", compilation.ini.unwrap());
    }

    #[test]
    fn test_errors_produce_no_output() {
        let compilation = compile_source("test.ini", "[Melltith]\ndamage: i32 = \"355\"");

        assert!(!compilation.succeeded());
        assert!(compilation.ini.is_none());
        assert_eq!(Code::IncorrectType, compilation.diagnostics[0].code);
    }

    #[test]
    fn test_errors_drain_within_a_phase() {
        let compilation = compile_source(
            "test.ini",
            "[C]\na: u8 = 256\nb: u8 = -1\nc: bool = maybe",
        );

        assert!(!compilation.succeeded());
        assert_eq!(3, compilation.diagnostics.len());
        assert!(compilation
            .diagnostics
            .iter()
            .all(|diagnostic| diagnostic.code == Code::IncorrectType));
    }
}
