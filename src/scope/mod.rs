//! # Scope model
//!
//! Two lookup tables drive the compiler: the global table (GLUT) maps scope
//! names to scopes in insertion order, and each scope's local table (LLUT)
//! maps keys to values in insertion order. The implicit global scope always
//! exists and is always first; items appearing before any header land there.

mod value;

pub use value::*;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    diagnostics::{Code, Diagnostic, Trace},
    lexer::{ClosureCall, Token, GLOBAL_SCOPE},
    typechecker::TypeTag,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub internal: bool,
    pub is_abstract: bool,
    pub inline_target: bool,
}

/// Local lookup table: key to value, insertion ordered.
pub type Llut = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub name: String,
    pub llut: Llut,
    /// Closure invocations pending from the header, in source order.
    pub closures: Vec<ClosureCall>,
    pub flags: Flags,
    /// Required keys when this scope is abstract, in declared order.
    pub abstract_keys: Vec<String>,
    pub trace: Trace,
}

impl Scope {
    pub fn new(name: impl Into<String>, trace: Trace) -> Self {
        Self {
            name: name.into(),
            llut: Llut::default(),
            closures: vec![],
            flags: Flags::default(),
            abstract_keys: vec![],
            trace,
        }
    }

    /// Whether `key` is classified here, i.e. present with an actual value.
    pub fn classifies(&self, key: &str) -> bool {
        matches!(self.llut.get(key), Some(value) if !value.placeholder)
    }
}

/// Global lookup table: scope name to scope, insertion ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Glut {
    scopes: IndexMap<String, Scope>,
}

impl Default for Glut {
    fn default() -> Self {
        let mut scopes = IndexMap::default();
        scopes.insert(
            GLOBAL_SCOPE.to_owned(),
            Scope::new(GLOBAL_SCOPE, Trace::new("", 0, GLOBAL_SCOPE)),
        );
        Self { scopes }
    }
}

impl Glut {
    pub fn contains(&self, name: &str) -> bool {
        self.scopes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Scope> {
        self.scopes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Scope> {
        self.scopes.get_mut(name)
    }

    pub fn insert(&mut self, scope: Scope) {
        self.scopes.insert(scope.name.clone(), scope);
    }

    pub fn names(&self) -> Vec<String> {
        self.scopes.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Scope> {
        self.scopes.values_mut()
    }
}

/// Walk the token stream and build the GLUT. The cursor starts at the global
/// scope; `[]` headers re-select it and append their closures. Duplicate
/// scopes and duplicate keys drain E02/E03 while building continues.
pub fn build(tokens: Vec<Token>) -> (Glut, Vec<Diagnostic>) {
    let mut glut = Glut::default();
    let mut diagnostics = vec![];
    let mut current = GLOBAL_SCOPE.to_owned();

    for token in tokens {
        match token {
            Token::Blank { .. } | Token::Comment { .. } => {}
            Token::Header {
                name,
                closures,
                position,
            } => {
                current = open_scope(&mut glut, name, closures, position, &mut diagnostics);
            }
            Token::Item {
                key,
                type_tag,
                rhs,
                eval_marked,
                position,
            } => {
                let trace = Trace::new(position.0, position.1, current.clone());

                let mut value = match type_tag {
                    Some(name) => {
                        let tag = resolve_tag(name, &trace, &mut diagnostics);
                        Value::new(rhs, tag, trace)
                    }
                    None => Value::untyped(rhs, trace),
                };
                if eval_marked {
                    value = value.eval_marked();
                }
                insert_item(&mut glut, &current, key, value, &mut diagnostics);
            }
            Token::SymbolDecl {
                key,
                type_tag,
                position,
            } => {
                let trace = Trace::new(position.0, position.1, current.clone());
                let tag = match type_tag {
                    Some(name) => resolve_tag(name, &trace, &mut diagnostics),
                    None => TypeTag::None,
                };

                let value = Value::placeholder(tag, trace);
                insert_item(&mut glut, &current, key, value, &mut diagnostics);
            }
        }
    }

    debug!("built global lookup table with {} scopes", glut.names().len());

    (glut, diagnostics)
}

fn open_scope(
    glut: &mut Glut,
    name: String,
    closures: Vec<ClosureCall>,
    position: (String, usize),
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let scope_name = if name.is_empty() {
        GLOBAL_SCOPE.to_owned()
    } else {
        name
    };

    trace!("opening scope '{scope_name}'");

    if scope_name == GLOBAL_SCOPE {
        // the global scope always exists; `[]` headers only contribute
        // closures
        let global = glut
            .get_mut(GLOBAL_SCOPE)
            .unwrap_or_else(|| unreachable!("the global scope always exists"));
        global.closures.extend(closures);
    } else if glut.contains(&scope_name) {
        diagnostics.push(Diagnostic::new(
            Code::DuplicateScope,
            format!("scope '{scope_name}' is already defined"),
            Trace::new(position.0, position.1, scope_name.clone()),
        ));
        // keep draining into the existing scope
    } else {
        let mut scope = Scope::new(
            scope_name.clone(),
            Trace::new(position.0, position.1, scope_name.clone()),
        );
        scope.closures = closures;
        glut.insert(scope);
    }

    scope_name
}

fn resolve_tag(name: String, trace: &Trace, diagnostics: &mut Vec<Diagnostic>) -> TypeTag {
    match TypeTag::parse(&name) {
        Some(tag) => tag,
        None => {
            diagnostics.push(Diagnostic::new(
                Code::MalformedLine,
                format!("'{name}' is not a known type tag"),
                trace.clone(),
            ));
            TypeTag::None
        }
    }
}

fn insert_item(
    glut: &mut Glut,
    scope_name: &str,
    key: String,
    value: Value,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let scope = glut
        .get_mut(scope_name)
        .unwrap_or_else(|| unreachable!("the current scope is always in the table"));

    if scope.llut.contains_key(&key) {
        diagnostics.push(Diagnostic::new(
            Code::DuplicateKey,
            format!("key '{key}' is already defined in scope '{scope_name}'"),
            value.trace,
        ));
        return;
    }

    scope.llut.insert(key, value);
}
