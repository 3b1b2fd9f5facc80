//! # Closure runtime
//!
//! Closures are tagged variants with an explicit dispatch table, invoked once
//! the GLUT is fully built so forward references work. Across scopes they run
//! in GLUT insertion order; within one header, left to right.
//!
//! The runtime is split in two phases: the rewrite phase (`internal`,
//! `setenv`, `abstract`, `as`, `inline`) runs before reference resolution,
//! the eval phase after it, so `eval` sees resolved reference text.
//! `include` never reaches the runtime on the global scope; the source
//! reader consumes it while splicing files.

use log::{debug, trace};

use crate::{
    diagnostics::{Code, Diagnostic, Trace},
    environment::Environment,
    eval,
    lexer::ClosureCall,
    scope::{Glut, Scope, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Rewrite,
    Eval,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closure {
    Internal,
    Setenv,
    Include { files: Vec<String> },
    Abstract { keys: Vec<String> },
    As { parent: String },
    Inline { parent: String },
    Eval,
}

impl Closure {
    /// Parse a raw header invocation. Unknown names are E04, unusable
    /// argument lists E05.
    pub fn parse(call: &ClosureCall, trace: &Trace) -> Result<Closure, Diagnostic> {
        let closure = match call.name.as_str() {
            "internal" => Closure::Internal,
            "setenv" => Closure::Setenv,
            "eval" => Closure::Eval,
            "include" => {
                return Ok(Closure::Include {
                    files: call.args.clone(),
                })
            }
            "abstract" => {
                let mut keys: Vec<String> = vec![];
                for key in &call.args {
                    if !keys.contains(key) {
                        keys.push(key.clone());
                    }
                }
                return Ok(Closure::Abstract { keys });
            }
            "as" | "inline" => {
                let [parent] = call.args.as_slice() else {
                    return Err(Diagnostic::new(
                        Code::InvalidClosure,
                        format!(
                            "closure '{name}' takes exactly one scope symbol",
                            name = call.name
                        ),
                        trace.clone(),
                    ));
                };
                return Ok(if call.name == "as" {
                    Closure::As {
                        parent: parent.clone(),
                    }
                } else {
                    Closure::Inline {
                        parent: parent.clone(),
                    }
                });
            }
            name => {
                return Err(Diagnostic::new(
                    Code::UnknownClosure,
                    format!("unknown closure '{name}'"),
                    trace.clone(),
                ))
            }
        };

        if !call.args.is_empty() {
            return Err(Diagnostic::new(
                Code::InvalidClosure,
                format!("closure '{name}' takes no arguments", name = call.name),
                trace.clone(),
            ));
        }

        Ok(closure)
    }

    fn phase(&self) -> Phase {
        match self {
            Closure::Eval => Phase::Eval,
            _ => Phase::Rewrite,
        }
    }

    /// Apply this closure to its caller scope, mutating it in place.
    pub fn apply(
        &self,
        caller: &str,
        glut: &mut Glut,
        environment: &mut Environment,
    ) -> Vec<Diagnostic> {
        trace!("applying closure {self:?} to scope '{caller}'");

        match self {
            Closure::Internal => {
                scope_mut(glut, caller).flags.internal = true;
                vec![]
            }
            Closure::Setenv => {
                let items = scope_mut(glut, caller)
                    .llut
                    .iter()
                    .filter(|(_, value)| !value.placeholder)
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect::<Vec<_>>();

                items
                    .iter()
                    .filter_map(|(key, value)| environment.set(key, value))
                    .collect()
            }
            Closure::Include { .. } => {
                // the source reader consumes include invocations on the
                // global header; one surviving to the runtime sits on a
                // named scope
                vec![Diagnostic::new(
                    Code::InvalidClosure,
                    "'include' is only valid on the global scope",
                    scope_mut(glut, caller).trace.clone(),
                )]
            }
            Closure::Abstract { keys } => {
                let scope = scope_mut(glut, caller);
                scope.flags.is_abstract = true;
                scope.abstract_keys = keys.clone();
                vec![]
            }
            Closure::As { parent } => check_coverage(caller, parent, "as", glut),
            Closure::Inline { parent } => self.apply_inline(caller, parent, glut),
            Closure::Eval => apply_eval(caller, glut),
        }
    }

    /// `inline :Parent`: coverage check, then collapse the caller into a
    /// single space-joined item inserted into the parent under the caller's
    /// name. The caller goes internal and will not be emitted itself.
    fn apply_inline(&self, caller: &str, parent: &str, glut: &mut Glut) -> Vec<Diagnostic> {
        let diagnostics = check_coverage(caller, parent, "inline", glut);
        if !diagnostics.is_empty() {
            return diagnostics;
        }

        let keys = glut
            .get(parent)
            .map(|scope| scope.abstract_keys.clone())
            .unwrap_or_default();

        let caller_scope = scope_mut(glut, caller);
        caller_scope.flags.internal = true;
        let trace = caller_scope.trace.clone();

        let joined = keys
            .iter()
            .filter_map(|key| caller_scope.llut.get(key))
            .map(|value| value.text.clone())
            .collect::<Vec<_>>()
            .join(" ");

        debug!("inlining scope '{caller}' into '{parent}' as '{joined}'");

        let parent_scope = scope_mut(glut, parent);
        parent_scope.flags.inline_target = true;

        if parent_scope.llut.contains_key(caller) {
            return vec![Diagnostic::new(
                Code::DuplicateKey,
                format!("key '{caller}' is already defined in scope '{parent}'"),
                trace,
            )];
        }

        parent_scope
            .llut
            .insert(caller.to_owned(), Value::untyped(joined, trace));

        vec![]
    }
}

/// Run the rewrite phase over every scope in GLUT insertion order.
pub fn run(glut: &mut Glut, environment: &mut Environment) -> Vec<Diagnostic> {
    run_phase(glut, environment, Phase::Rewrite)
}

/// Run the eval phase, then retire every pending closure call.
pub fn run_eval(glut: &mut Glut, environment: &mut Environment) -> Vec<Diagnostic> {
    let diagnostics = run_phase(glut, environment, Phase::Eval);

    for scope in glut.iter_mut() {
        scope.closures.clear();
    }

    diagnostics
}

fn run_phase(glut: &mut Glut, environment: &mut Environment, phase: Phase) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    for name in glut.names() {
        let Some(scope) = glut.get(&name) else {
            continue;
        };
        let calls = scope.closures.clone();
        let trace = scope.trace.clone();

        for call in &calls {
            let closure = match Closure::parse(call, &trace) {
                Ok(closure) => closure,
                Err(diagnostic) => {
                    // report bad invocations once, during the first phase
                    if phase == Phase::Rewrite {
                        diagnostics.push(diagnostic);
                    }
                    continue;
                }
            };

            if closure.phase() == phase {
                diagnostics.extend(closure.apply(&name, glut, environment));
            }
        }
    }

    diagnostics
}

/// Verify that `caller` classifies every abstract key of `parent`, draining
/// one E06 per missing key.
fn check_coverage(caller: &str, parent: &str, closure: &str, glut: &Glut) -> Vec<Diagnostic> {
    let Some(caller_scope) = glut.get(caller) else {
        unreachable!("closures are applied to scopes in the table");
    };
    let trace = caller_scope.trace.clone();

    let Some(parent_scope) = glut.get(parent) else {
        return vec![Diagnostic::new(
            Code::InvalidClosure,
            format!("closure '{closure}' names unknown scope '{parent}'"),
            trace,
        )];
    };

    if !parent_scope.flags.is_abstract {
        return vec![Diagnostic::new(
            Code::InvalidClosure,
            format!("closure '{closure}' requires '{parent}' to be abstract"),
            trace,
        )];
    }

    parent_scope
        .abstract_keys
        .iter()
        .filter(|key| !caller_scope.classifies(key))
        .map(|key| {
            Diagnostic::new(
                Code::MissingAbstractKey,
                format!("scope '{caller}' does not classify abstract key '{key}' required by '{parent}'"),
                trace.clone(),
            )
        })
        .collect()
}

/// Evaluate every classified item of an eval scope. A `:=` item that fails
/// to evaluate is an error; a plain `=` item that fails stays literal.
fn apply_eval(caller: &str, glut: &mut Glut) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    let scope = scope_mut(glut, caller);
    let keys = scope.llut.keys().cloned().collect::<Vec<_>>();

    for key in keys {
        let Some(value) = scope.llut.get(&key) else {
            continue;
        };
        if value.placeholder {
            continue;
        }

        let text = value.text.clone();
        let marked = value.eval_marked;
        let trace = value.trace.clone();

        match eval::evaluate(&text) {
            Ok(number) => {
                let rewritten = value.rewritten(number.to_string());
                scope.llut[&key] = rewritten;
            }
            Err(error) if marked => diagnostics.push(Diagnostic::new(
                Code::InvalidClosure,
                format!("cannot evaluate '{text}': {error}"),
                trace,
            )),
            Err(_) => {}
        }
    }

    diagnostics
}

fn scope_mut<'a>(glut: &'a mut Glut, name: &str) -> &'a mut Scope {
    glut.get_mut(name)
        .unwrap_or_else(|| unreachable!("closures are applied to scopes in the table"))
}
