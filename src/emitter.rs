//! # Emitter
//!
//! Serializes the surviving scopes to canonical `[scope]` / `key=value` INI.
//! Internal scopes and placeholder items are skipped; global items come
//! first as a headerless preamble. Scope order is GLUT insertion order, or
//! alphabetical over the named scopes when the environment says so.

use log::debug;

use crate::{environment::Environment, lexer::GLOBAL_SCOPE, scope::Glut};

pub fn emit(glut: &Glut, environment: &Environment) -> String {
    let mut scopes = glut
        .iter()
        .filter(|scope| !scope.flags.internal)
        .collect::<Vec<_>>();

    if environment.sorted {
        // the global preamble stays first either way
        scopes.sort_by_key(|scope| (scope.name != GLOBAL_SCOPE, scope.name.clone()));
    }

    let mut output = String::new();

    for scope in scopes {
        let items = scope
            .llut
            .iter()
            .filter(|(_, value)| !value.placeholder)
            .collect::<Vec<_>>();

        if items.is_empty() && (scope.name == GLOBAL_SCOPE || scope.flags.is_abstract) {
            // nothing classified: the global preamble vanishes, and an
            // abstract scope holding only type anchors does too
            continue;
        }

        // the global preamble is emitted headerless; strict INI readers
        // treat it as the default section
        if scope.name != GLOBAL_SCOPE {
            output.push_str(&format!("[{name}]\n", name = scope.name));
        }

        for (key, value) in items {
            output.push_str(&format!("{key}={value}\n", value = value.rendered()));
        }
    }

    debug!("emitted {} bytes of INI", output.len());

    output
}
