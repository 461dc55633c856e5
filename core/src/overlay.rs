//! The backtracking-safe mutation overlay.
//!
//! An `Overlay` layered atop a [`crate::db::ClauseStore`] records
//! tentative `assertz`/`retractall` effects so they can be applied
//! speculatively within a search and either committed (via
//! [`crate::db::ClauseStore::store_overlay`]) or simply dropped.
//! Grounded in `zamiaprolog/logicdb.py`'s `LogicDBOverlay`.

use std::collections::HashMap;

use crate::clause::Clause;
use crate::error::{EngineError, EngineResult};

#[derive(Clone, Debug, Default)]
pub struct Overlay {
    assertz: HashMap<String, Vec<Clause>>,
    retracted: HashMap<String, Vec<Clause>>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assertz(&mut self, clause: Clause) {
        let name = clause
            .head_predicate()
            .map(|p| p.as_str().to_owned())
            .unwrap_or_default();
        self.assertz.entry(name).or_default().push(clause);
    }

    /// Marks every clause structurally matching `pattern`'s head for
    /// removal. This resolves the Open Question as option (a):
    /// exact-head structural-match retraction, rather than always
    /// raising [`EngineError::OverlayError`].
    ///
    /// The original's `retractall` is a placeholder that traps
    /// (`pdb.set_trace()`); this implementation instead does the work
    /// the placeholder was standing in for.
    pub fn retractall(&mut self, pattern: Clause) -> EngineResult<()> {
        let name = pattern
            .head_predicate()
            .ok_or_else(|| {
                EngineError::OverlayError("retractall pattern head is not a predicate".into())
            })?
            .as_str()
            .to_owned();
        self.retracted.entry(name).or_default().push(pattern);
        Ok(())
    }

    pub fn clone_overlay(&self) -> Overlay {
        self.clone()
    }

    /// Applies retractions then appends overlay `assertz` entries, in
    /// that order, to `candidates`.
    pub fn filter(&self, name: &str, mut candidates: Vec<Clause>) -> Vec<Clause> {
        if let Some(retracted) = self.retracted.get(name) {
            candidates.retain(|c| !retracted.iter().any(|pattern| pattern.head == c.head));
        }
        if let Some(asserted) = self.assertz.get(name) {
            candidates.extend(asserted.iter().cloned());
        }
        candidates
    }

    /// The clauses staged for `assertz`, grouped by head name — used by
    /// [`crate::db::ClauseStore::store_overlay`] to commit them.
    pub fn staged_assertions(&self) -> &HashMap<String, Vec<Clause>> {
        &self.assertz
    }
}
