//! # Source reader
//!
//! Loads a file into a classified token stream. `include` is the one closure
//! consumed here instead of in the runtime: invocations on the global header
//! are stripped and the named files' token streams are spliced in at the
//! include point, depth first. A canonical-path visited set elides repeated
//! includes, which also guarantees termination on include cycles.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, trace};

use crate::{
    diagnostics::{Code, Diagnostic, Trace},
    lexer::{Lexer, Token, GLOBAL_SCOPE},
};

/// Extension appended to bare include names.
const SOURCE_EXTENSION: &str = "ini";

/// Read, lex and splice the whole input tree rooted at `file`.
pub fn load(file: &Path) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut visited = vec![];
    let mut diagnostics = vec![];

    let tokens = load_file(file, None, &mut visited, &mut diagnostics);

    (tokens, diagnostics)
}

/// Lex and splice an in-memory source. Includes resolve relative to the
/// folder of `name`, which does not itself need to exist.
pub fn load_source(name: &str, content: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut visited = vec![];
    let mut diagnostics = vec![];

    let (tokens, mut lexed) = Lexer::new(name, content).lex();
    diagnostics.append(&mut lexed);

    let tokens = splice_includes(Path::new(name), tokens, &mut visited, &mut diagnostics);

    (tokens, diagnostics)
}

fn load_file(
    file: &Path,
    origin: Option<&Trace>,
    visited: &mut Vec<PathBuf>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Token> {
    debug!("loading source file '{file}'", file = file.display());

    let missing = |diagnostics: &mut Vec<Diagnostic>| {
        diagnostics.push(Diagnostic::new(
            Code::MissingInputFile,
            format!("cannot read input file '{file}'", file = file.display()),
            origin
                .cloned()
                .unwrap_or_else(|| Trace::new(file.to_string_lossy(), 0, GLOBAL_SCOPE)),
        ));
        vec![]
    };

    let Ok(canonical) = fs::canonicalize(file) else {
        return missing(diagnostics);
    };

    if visited.contains(&canonical) {
        debug!(
            "eliding repeated include of '{file}'",
            file = file.display()
        );
        return vec![];
    }
    visited.push(canonical);

    let Ok(content) = fs::read_to_string(file) else {
        return missing(diagnostics);
    };

    let (tokens, mut lexed) = Lexer::new(&file.to_string_lossy(), &content).lex();
    diagnostics.append(&mut lexed);

    splice_includes(file, tokens, visited, diagnostics)
}

/// Strip `include` invocations off global headers and splice the included
/// files' token streams in at the include point.
fn splice_includes(
    file: &Path,
    tokens: Vec<Token>,
    visited: &mut Vec<PathBuf>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Token> {
    let folder = file.parent().unwrap_or_else(|| Path::new(""));
    let mut spliced = vec![];

    for token in tokens {
        let Token::Header {
            name,
            closures,
            position,
        } = token
        else {
            spliced.push(token);
            continue;
        };

        if !name.is_empty() {
            spliced.push(Token::Header {
                name,
                closures,
                position,
            });
            continue;
        }

        let (includes, kept): (Vec<_>, Vec<_>) = closures
            .into_iter()
            .partition(|call| call.name == "include");

        spliced.push(Token::Header {
            name,
            closures: kept,
            position: position.clone(),
        });

        let origin = Trace::new(position.0.clone(), position.1, GLOBAL_SCOPE);
        for call in includes {
            for included in &call.args {
                trace!("including '{included}' from '{file}'", file = file.display());
                let path = resolve_include(folder, included);
                spliced.extend(load_file(&path, Some(&origin), visited, diagnostics));
            }
        }
    }

    spliced
}

/// Include arguments are bare symbols; resolve them against the including
/// file's folder, appending the source extension when the bare name does
/// not exist.
fn resolve_include(folder: &Path, name: &str) -> PathBuf {
    let verbatim = folder.join(name);
    if verbatim.is_file() {
        return verbatim;
    }

    folder.join(format!("{name}.{SOURCE_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_load_splices_included_tokens() {
        let (tokens, diagnostics) = load(&fixture("main.ini"));

        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        // the included [colors] scope arrives before [Blade]
        let headers = tokens
            .iter()
            .filter_map(|token| match token {
                Token::Header { name, .. } if !name.is_empty() => Some(name.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(vec!["colors".to_owned(), "Blade".to_owned()], headers);
    }

    #[test]
    fn test_include_invocations_are_consumed() {
        let (tokens, _) = load(&fixture("main.ini"));

        let leftover = tokens.iter().any(|token| {
            matches!(token, Token::Header { closures, .. }
                if closures.iter().any(|call| call.name == "include"))
        });
        assert!(!leftover);
    }

    #[test]
    fn test_include_cycle_is_elided() {
        let (tokens, diagnostics) = load(&fixture("loop_a.ini"));

        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        // each file contributes its scope exactly once
        let headers = tokens
            .iter()
            .filter(|token| matches!(token, Token::Header { name, .. } if !name.is_empty()))
            .count();
        assert_eq!(2, headers);
    }

    #[test]
    fn test_missing_include_fails() {
        let (_, diagnostics) = load(&fixture("missing.ini"));

        assert_eq!(1, diagnostics.len());
        assert_eq!(Code::MissingInputFile, diagnostics[0].code);
    }

    #[test]
    fn test_missing_entry_file_fails() {
        let (tokens, diagnostics) = load(&fixture("ghost.ini"));

        assert!(tokens.is_empty());
        assert_eq!(1, diagnostics.len());
        assert_eq!(Code::MissingInputFile, diagnostics[0].code);
    }
}
