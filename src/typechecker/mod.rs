//! # Type checker
//!
//! Runs after reference resolution and after `eval` rewrote numeric results:
//! every item carrying a declared type tag is validated against its current
//! text. Untyped items carry an inferred tag, which is informational only;
//! neither they nor placeholders are checked.

mod types;

pub use types::*;

use log::debug;

use crate::{
    diagnostics::{Code, Diagnostic},
    scope::Glut,
};

pub fn check(glut: &Glut) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    for scope in glut.iter() {
        for (key, value) in &scope.llut {
            if value.placeholder || !value.declared || value.type_tag == TypeTag::None {
                continue;
            }

            if !value.type_tag.accepts(&value.text) {
                diagnostics.push(Diagnostic::new(
                    Code::IncorrectType,
                    format!(
                        "value '{text}' of '{key}' does not satisfy declared type '{tag}'",
                        text = value.text,
                        tag = value.type_tag
                    ),
                    value.trace.clone(),
                ));
            }
        }
    }

    debug!("type check finished with {} findings", diagnostics.len());

    diagnostics
}
