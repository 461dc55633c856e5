//! The clause database.
//!
//! Clauses are indexed by `head.name`; arity filtering happens at
//! unification time, matching spec's "no secondary index is required"
//! non-goal. [`ClauseStore`] is the contract the core asks of a
//! persistence backend; [`MemoryDatabase`] is an in-memory
//! implementation that is valid on its own.

use std::collections::HashMap;

use crate::clause::Clause;
use crate::error::{EngineError, EngineResult};
use crate::overlay::Overlay;

/// The minimum contract asks of a persistence backend.
pub trait ClauseStore {
    fn store(&mut self, module: &str, clause: Clause);
    fn clear_module(&mut self, module: &str);
    fn clear_all(&mut self);
    fn commit(&mut self) {}

    /// All persisted clauses whose head name is `name`, in insertion
    /// order, optionally filtered through an overlay.
    fn lookup(&self, name: &str, overlay: Option<&Overlay>) -> Vec<Clause>;

    /// Writes an overlay's staged `assertz` entries into persistent
    /// storage.
    fn store_overlay(&mut self, module: &str, overlay: &Overlay) {
        for clauses in overlay.staged_assertions().values() {
            for clause in clauses {
                self.store(module, clause.clone());
            }
        }
        self.commit();
    }
}

#[derive(Clone, Debug, Default)]
struct Entry {
    module: String,
    clause: Clause,
}

/// A purely in-memory `ClauseStore`, keyed by `(head name)` with
/// insertion order preserved per-key — notes this is a valid
/// implementation on its own.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    by_name: HashMap<String, Vec<Entry>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClauseStore for MemoryDatabase {
    fn store(&mut self, module: &str, clause: Clause) {
        let name = clause
            .head_predicate()
            .map(|p| p.as_str().to_owned())
            .unwrap_or_default();
        self.by_name.entry(name).or_default().push(Entry {
            module: module.to_owned(),
            clause,
        });
    }

    fn clear_module(&mut self, module: &str) {
        for entries in self.by_name.values_mut() {
            entries.retain(|e| e.module != module);
        }
    }

    fn clear_all(&mut self) {
        self.by_name.clear();
    }

    fn lookup(&self, name: &str, overlay: Option<&Overlay>) -> Vec<Clause> {
        let persisted = self
            .by_name
            .get(name)
            .map(|entries| entries.iter().map(|e| e.clause.clone()).collect())
            .unwrap_or_default();
        match overlay {
            Some(overlay) => overlay.filter(name, persisted),
            None => persisted,
        }
    }
}

/// An implementation-defined, round-trip-stable bijection between a
/// `Clause` and a byte string, backed by `serde_json` rather than a
/// bespoke format.
pub fn serialize_clause(clause: &Clause) -> EngineResult<String> {
    serde_json::to_string(clause)
        .map_err(|e| EngineError::TypeError {
            expected: "serializable clause".into(),
            found: e.to_string(),
        })
}

pub fn deserialize_clause(blob: &str) -> EngineResult<Clause> {
    serde_json::from_str(blob).map_err(|e| EngineError::TypeError {
        expected: "well-formed serialized clause".into(),
        found: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    fn fact(name: &str, args: Vec<Term>) -> Clause {
        Clause::fact(Term::compound(name, args))
    }

    #[test]
    fn lookup_preserves_insertion_order() {
        let mut db = MemoryDatabase::new();
        db.store("m", fact("parent", vec![Term::atom("tom"), Term::atom("bob")]));
        db.store("m", fact("parent", vec![Term::atom("bob"), Term::atom("ann")]));
        db.store("m", fact("parent", vec![Term::atom("bob"), Term::atom("pat")]));

        let results = db.lookup("parent", None);
        assert_eq!(
            results,
            vec![
                fact("parent", vec![Term::atom("tom"), Term::atom("bob")]),
                fact("parent", vec![Term::atom("bob"), Term::atom("ann")]),
                fact("parent", vec![Term::atom("bob"), Term::atom("pat")]),
            ]
        );
    }

    #[test]
    fn clear_module_only_drops_that_module() {
        let mut db = MemoryDatabase::new();
        db.store("a", fact("p", vec![]));
        db.store("b", fact("p", vec![]));
        db.clear_module("a");
        assert_eq!(db.lookup("p", None), vec![fact("p", vec![])]);
    }

    #[test]
    fn overlay_lookup_never_mutates_db() {
        let mut db = MemoryDatabase::new();
        db.store("m", fact("p", vec![]));
        let mut overlay = Overlay::new();
        overlay.assertz(fact("p", vec![Term::atom("x")]));

        let with_overlay = db.lookup("p", Some(&overlay));
        assert_eq!(with_overlay.len(), 2);

        drop(overlay);
        let without_overlay = db.lookup("p", None);
        assert_eq!(without_overlay, vec![fact("p", vec![])]);
    }

    #[test]
    fn clause_round_trips_through_serialization() {
        let clause = Clause::rule(
            Term::compound("grandparent", vec![Term::variable("X"), Term::variable("Z")]),
            Term::compound(
                "and",
                vec![
                    Term::compound("parent", vec![Term::variable("X"), Term::variable("Y")]),
                    Term::compound("parent", vec![Term::variable("Y"), Term::variable("Z")]),
                ],
            ),
        );
        let blob = serialize_clause(&clause).unwrap();
        assert_eq!(deserialize_clause(&blob).unwrap(), clause);
    }
}
