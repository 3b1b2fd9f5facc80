use std::path::PathBuf;

use indexmap::IndexMap;
use log::debug;

use crate::{
    diagnostics::{Code, Diagnostic},
    scope::Value,
};

/// Compiler configuration updated by `setenv` scopes. The record is threaded
/// through one compilation; nothing is process global.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    /// Output path, overridden by a CLI output argument.
    pub output: Option<PathBuf>,
    /// Sort scopes alphabetically in the output.
    pub sorted: bool,
    /// Unrecognized keys, preserved and otherwise ignored.
    pub extras: IndexMap<String, String>,
}

impl Environment {
    /// Apply one `setenv` item. Writes are last-writer-wins.
    pub fn set(&mut self, key: &str, value: &Value) -> Option<Diagnostic> {
        debug!("setenv {key} = {text}", text = value.text);

        match key {
            "output" => self.output = Some(PathBuf::from(value.rendered())),
            "sorted" => match value.text.as_str() {
                "True" => self.sorted = true,
                "False" => self.sorted = false,
                other => {
                    return Some(Diagnostic::new(
                        Code::IncorrectType,
                        format!("environment key 'sorted' expects 'True' or 'False', got '{other}'"),
                        value.trace.clone(),
                    ))
                }
            },
            _ => {
                self.extras.insert(key.to_owned(), value.rendered());
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostics::Trace, typechecker::TypeTag};

    fn value(text: &str) -> Value {
        Value::new(text, TypeTag::None, Trace::default())
    }

    #[test]
    fn test_set_recognized_keys() {
        let mut environment = Environment::default();

        assert!(environment.set("output", &value("out.ini")).is_none());
        assert!(environment.set("sorted", &value("True")).is_none());

        assert_eq!(Some(PathBuf::from("out.ini")), environment.output);
        assert!(environment.sorted);
    }

    #[test]
    fn test_unrecognized_keys_are_preserved() {
        let mut environment = Environment::default();
        environment.set("flavor", &value("crunchy"));

        assert_eq!(Some(&"crunchy".to_owned()), environment.extras.get("flavor"));
    }

    #[test]
    fn test_invalid_bool_is_an_error() {
        let mut environment = Environment::default();
        let diagnostic = environment.set("sorted", &value("yes")).unwrap();

        assert_eq!(Code::IncorrectType, diagnostic.code);
        assert!(!environment.sorted);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut environment = Environment::default();
        environment.set("sorted", &value("True"));
        environment.set("sorted", &value("False"));

        assert!(!environment.sorted);
    }
}
