//! # Reference resolver
//!
//! After the closure rewrite phase, every `SCOPE::KEY` occurrence in an item
//! value is replaced by the target's current text. Resolution is a single
//! pass; closures have already finalized values, so nothing needs a second
//! round. Unresolved references warn (W00 unknown scope, W01 unknown key)
//! and stay verbatim.
//!
//! Internal scopes are resolved too: they are invisible to the emitter but
//! still serve as lookup targets, and their values may have been inlined
//! elsewhere before this pass.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    diagnostics::{Code, Diagnostic},
    scope::{Glut, Value},
};

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)::([A-Za-z_][A-Za-z0-9_]*)")
        .unwrap_or_else(|_| unreachable!("the reference pattern is well formed"))
});

/// Walk every item of every scope and substitute its references in place.
pub fn resolve(glut: &mut Glut) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];
    let mut rewrites = vec![];

    for scope in glut.iter() {
        for (key, value) in &scope.llut {
            if value.placeholder || value.is_quoted() {
                continue;
            }
            if !value.text.contains("::") {
                continue;
            }

            let resolved = REFERENCE.replace_all(&value.text, |captures: &Captures| {
                substitute(glut, captures, value, &mut diagnostics)
            });

            if resolved != value.text {
                rewrites.push((scope.name.clone(), key.clone(), resolved.into_owned()));
            }
        }
    }

    for (scope, key, text) in rewrites {
        let Some(scope) = glut.get_mut(&scope) else {
            continue;
        };
        if let Some(value) = scope.llut.get(&key) {
            let rewritten = value.rewritten(text);
            scope.llut[&key] = rewritten;
        }
    }

    diagnostics
}

fn substitute(
    glut: &Glut,
    captures: &Captures,
    value: &Value,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let reference = &captures[0];
    let scope_name = &captures[1];
    let key = &captures[2];

    let Some(target) = glut.get(scope_name) else {
        diagnostics.push(Diagnostic::new(
            Code::UnresolvedScope,
            format!("reference to unknown scope '{scope_name}'"),
            value.trace.clone(),
        ));
        return reference.to_owned();
    };

    match target.llut.get(key) {
        Some(resolved) if !resolved.placeholder => resolved.text.clone(),
        _ => {
            diagnostics.push(Diagnostic::new(
                Code::UnresolvedKey,
                format!("scope '{scope_name}' has no key '{key}'"),
                value.trace.clone(),
            ));
            reference.to_owned()
        }
    }
}
