//! Ties the clause database, overlay, and extension registry together
//! into the single object [`crate::sld::search`] needs. This is the
//! ambient "wire it all up" layer every host binary (and
//! `clara-prolog`'s `PrologRuntime` analogue) needs somewhere.

use std::cell::RefCell;
use std::io::Write;

use crate::clause::Clause;
use crate::db::ClauseStore;
use crate::error::EngineResult;
use crate::overlay::Overlay;
use crate::registry::{BuiltinFunction, BuiltinPredicate, ExtensionRegistry, Host};

/// Host-supplied knobs that don't change engine semantics but bound
/// resource use — the "periodic check... raise an error to abort" hook
/// explicitly invites a host to add, plus the original's
/// `trace` flag (`PrologRuntime.set_trace`).
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineConfig {
    /// Aborts `search` with `EngineError::StepLimitExceeded` after this
    /// many goal-queue pops. `None` means unbounded.
    pub max_steps: Option<usize>,
    /// When set, `sld::search` emits `log::trace!` lines for goal
    /// consideration/success/failure, mirroring the original's
    /// `_trace`/`logging.debug` calls.
    pub trace: bool,
}

pub struct Runtime {
    registry: ExtensionRegistry,
    db: Box<dyn ClauseStore>,
    overlay: RefCell<Overlay>,
    output: RefCell<Box<dyn Write>>,
    config: EngineConfig,
}

impl Runtime {
    pub fn new(db: Box<dyn ClauseStore>, registry: ExtensionRegistry) -> Self {
        Runtime {
            registry,
            db,
            overlay: RefCell::new(Overlay::new()),
            output: RefCell::new(Box::new(std::io::sink())),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = RefCell::new(output);
        self
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn db(&self) -> &dyn ClauseStore {
        self.db.as_ref()
    }

    pub fn db_mut(&mut self) -> &mut dyn ClauseStore {
        self.db.as_mut()
    }

    /// Replaces the search-local overlay, e.g. between independent
    /// top-level queries sharing one `Runtime`.
    pub fn reset_overlay(&self) {
        *self.overlay.borrow_mut() = Overlay::new();
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay.borrow().clone()
    }

    /// Commits the current overlay's `assertz` entries into the
    /// backing database.
    pub fn commit_overlay(&mut self, module: &str) {
        let overlay = self.overlay.borrow().clone();
        self.db.store_overlay(module, &overlay);
        *self.overlay.borrow_mut() = Overlay::new();
    }
}

impl Host for Runtime {
    fn function(&self, name: &str) -> Option<&dyn BuiltinFunction> {
        self.registry.function(name)
    }

    fn predicate(&self, name: &str) -> Option<&dyn BuiltinPredicate> {
        self.registry.predicate(name)
    }

    fn lookup_clauses(&self, name: &str) -> Vec<Clause> {
        let overlay = self.overlay.borrow();
        self.db.lookup(name, Some(&overlay))
    }

    fn assertz(&self, clause: Clause) {
        self.overlay.borrow_mut().assertz(clause);
    }

    fn retractall(&self, pattern: Clause) -> EngineResult<()> {
        self.overlay.borrow_mut().retractall(pattern)
    }

    fn write_out(&self, text: &str) {
        let _ = self.output.borrow_mut().write_all(text.as_bytes());
    }
}
