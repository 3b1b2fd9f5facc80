use crate::{diagnostics::Trace, typechecker::TypeTag};

/// The right-hand side of an item, after continuation folding. Values are
/// immutable once checked; closures that rewrite one produce a new `Value`
/// keeping the original trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub text: String,
    pub type_tag: TypeTag,
    /// Whether `type_tag` was written in source. Inferred tags are
    /// informational only and never validated.
    pub declared: bool,
    /// A key declared without a value (a type anchor or abstract
    /// requirement). Placeholders never reach the emitter.
    pub placeholder: bool,
    /// Marked with `:=` in source, asserting evaluation in an eval scope.
    pub eval_marked: bool,
    pub trace: Trace,
}

impl Value {
    /// A value with an explicitly declared type tag.
    pub fn new(text: impl Into<String>, type_tag: TypeTag, trace: Trace) -> Self {
        Self {
            text: text.into(),
            type_tag,
            declared: true,
            placeholder: false,
            eval_marked: false,
            trace,
        }
    }

    /// An untyped value: its tag is the narrowest fit of its literal shape.
    pub fn untyped(text: impl Into<String>, trace: Trace) -> Self {
        let text = text.into();
        Self {
            type_tag: TypeTag::infer(&text),
            text,
            declared: false,
            placeholder: false,
            eval_marked: false,
            trace,
        }
    }

    pub fn placeholder(type_tag: TypeTag, trace: Trace) -> Self {
        Self {
            text: String::new(),
            type_tag,
            declared: true,
            placeholder: true,
            eval_marked: false,
            trace,
        }
    }

    pub fn eval_marked(mut self) -> Self {
        self.eval_marked = true;
        self
    }

    /// A rewritten copy, keeping the trace. A declared tag is kept as well;
    /// an inferred one is re-derived from the new text.
    pub fn rewritten(&self, text: impl Into<String>) -> Self {
        let text = text.into();
        let type_tag = if self.declared {
            self.type_tag
        } else {
            TypeTag::infer(&text)
        };

        Self {
            text,
            type_tag,
            ..self.clone()
        }
    }

    /// Whether the whole text is a double-quoted string literal.
    pub fn is_quoted(&self) -> bool {
        self.text.len() >= 2 && self.text.starts_with('"') && self.text.ends_with('"')
    }

    /// The emission form: surrounding quotes stripped and escape sequences
    /// expanded; everything else verbatim.
    pub fn rendered(&self) -> String {
        if !self.is_quoted() {
            return self.text.clone();
        }

        let inner = &self.text[1..self.text.len() - 1];
        unescape::unescape(inner).unwrap_or_else(|| inner.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_strips_quotes() {
        let value = Value::new("\"355\"", TypeTag::None, Trace::default());
        assert_eq!("355", value.rendered());
    }

    #[test]
    fn test_rendered_expands_escapes() {
        let value = Value::new(r#""a \"b\"""#, TypeTag::None, Trace::default());
        assert_eq!("a \"b\"", value.rendered());
    }

    #[test]
    fn test_rendered_bare_text_verbatim() {
        let value = Value::new("275 18", TypeTag::None, Trace::default());
        assert_eq!("275 18", value.rendered());
    }

    #[test]
    fn test_rewritten_keeps_trace() {
        let trace = Trace::new("a.ini", 3, "constants");
        let value = Value::new("2**8 - 1", TypeTag::None, trace.clone());
        let rewritten = value.rewritten("255");

        assert_eq!("255", rewritten.text);
        assert_eq!(trace, rewritten.trace);
    }

    #[test]
    fn test_untyped_values_infer_their_tag() {
        let value = Value::untyped("200", Trace::default());

        assert_eq!(TypeTag::U8, value.type_tag);
        assert!(!value.declared);
    }

    #[test]
    fn test_rewritten_reinfers_an_untyped_tag() {
        let value = Value::untyped("2**8 - 1", Trace::default());
        assert_eq!(TypeTag::Str, value.type_tag);

        let rewritten = value.rewritten("255");

        assert_eq!(TypeTag::U8, rewritten.type_tag);
        assert!(!rewritten.declared);
    }

    #[test]
    fn test_rewritten_keeps_a_declared_tag() {
        let value = Value::new("46", TypeTag::U8, Trace::default());
        let rewritten = value.rewritten("hello");

        assert_eq!(TypeTag::U8, rewritten.type_tag);
        assert!(rewritten.declared);
    }
}
