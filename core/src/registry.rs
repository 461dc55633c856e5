//! The extension registry (component C7): name-keyed tables for
//! built-in predicates and built-in functions, plus the [`Host`] trait
//! that lets [`crate::eval`], [`crate::unify`] and built-in
//! implementations reach back into the runtime (database lookups,
//! overlay mutation, output) without those modules depending on the
//! concrete [`crate::runtime::Runtime`] type.
//!
//! Splitting the abstraction this way (a trait the runtime implements,
//! rather than a direct dependency) keeps `core::registry` free of any
//! dependency on `core::runtime`, even though `core::runtime` depends on
//! `core::registry` — its builtin dispatch
//! (`select_builtin`/`BuiltinPredicate` in `builtin.rs`) is likewise
//! decoupled from any one concrete caller.

use std::collections::HashMap;

use crate::clause::Clause;
use crate::env::Environment;
use crate::error::EngineResult;
use crate::term::Term;

/// A built-in predicate, as `fn(args, env, host) -> Result<bool>` so
/// arithmetic/type errors (§7) can propagate instead of being silently
/// swallowed as failure.
pub trait BuiltinPredicate {
    fn call(&self, args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool>;
}

impl<F> BuiltinPredicate for F
where
    F: Fn(&[Term], &mut Environment, &dyn Host) -> EngineResult<bool>,
{
    fn call(&self, args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
        self(args, env, host)
    }
}

/// A built-in function.
/// Returns `Ok(None)` when the function cannot reduce its arguments
/// (mirroring [`crate::eval::eval`]'s own "cannot reduce" result),
/// reserving `Err` for genuine type/arithmetic errors.
pub trait BuiltinFunction {
    fn call(&self, term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<Option<Term>>;
}

impl<F> BuiltinFunction for F
where
    F: Fn(&Term, &Environment, &dyn Host) -> EngineResult<Option<Term>>,
{
    fn call(&self, term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<Option<Term>> {
        self(term, env, host)
    }
}

#[derive(Default)]
pub struct ExtensionRegistry {
    predicates: HashMap<String, Box<dyn BuiltinPredicate>>,
    functions: HashMap<String, Box<dyn BuiltinFunction>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_builtin(&mut self, name: impl Into<String>, f: impl BuiltinPredicate + 'static) {
        self.predicates.insert(name.into(), Box::new(f));
    }

    pub fn register_builtin_function(
        &mut self,
        name: impl Into<String>,
        f: impl BuiltinFunction + 'static,
    ) {
        self.functions.insert(name.into(), Box::new(f));
    }

    pub fn predicate(&self, name: &str) -> Option<&dyn BuiltinPredicate> {
        self.predicates.get(name).map(|b| b.as_ref())
    }

    pub fn function(&self, name: &str) -> Option<&dyn BuiltinFunction> {
        self.functions.get(name).map(|b| b.as_ref())
    }

    pub fn has_predicate(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }
}

/// Everything a built-in predicate/function or the evaluator may need
/// from the surrounding runtime. Implemented by
/// [`crate::runtime::Runtime`]; exists as a trait purely to break the
/// module cycle described above.
pub trait Host {
    fn function(&self, name: &str) -> Option<&dyn BuiltinFunction>;
    fn predicate(&self, name: &str) -> Option<&dyn BuiltinPredicate>;

    /// All clauses (database, then overlay `assertz` entries, in
    /// insertion order) whose head name is `name`.
    fn lookup_clauses(&self, name: &str) -> Vec<Clause>;

    /// Stages `clause` in the current search's overlay (`assertz`).
    fn assertz(&self, clause: Clause);

    /// Marks clauses structurally matching `pattern`'s head for
    /// removal in the current search's overlay (`retractall`; see
    /// DESIGN.md for the exact-match-vs-unification decision).
    fn retractall(&self, pattern: Clause) -> EngineResult<()>;

    /// Routes text to the output sink used by `write`/`nl` (spec
    /// §4.6).
    fn write_out(&self, text: &str);
}
