//! Environments: mappings from variable name to bound term.
//!
//! Environments are cloned (deep-copied) on every
//! backtracking split so a failing branch leaves no trace in sibling
//! branches. A `HashMap<Rc<str>, Term>` gives O(bindings) `Clone`
//! (the `Rc<str>` keys and any `Rc`-backed subterms are reference
//! counted, not copied) while still handing callers an owned map they
//! can mutate freely.

use std::collections::HashMap;
use std::rc::Rc;

use crate::term::Term;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Environment {
    bindings: HashMap<Rc<str>, Term>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings.get(name)
    }

    /// Binds `name` to `value`, overwriting any previous binding.
    ///
    /// The engine never needs to "unbind": a branch that would require
    /// undoing a binding instead works on a cloned `Environment`.
    pub fn bind(&mut self, name: impl Into<Rc<str>>, value: Term) {
        self.bindings.insert(name.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Term)> {
        self.bindings.iter()
    }
}

impl FromIterator<(Rc<str>, Term)> for Environment {
    fn from_iter<I: IntoIterator<Item = (Rc<str>, Term)>>(iter: I) -> Self {
        Environment {
            bindings: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_does_not_alias() {
        let mut a = Environment::new();
        a.bind("X", Term::number(1.0));
        let mut b = a.clone();
        b.bind("X", Term::number(2.0));
        assert_eq!(a.get("X"), Some(&Term::number(1.0)));
        assert_eq!(b.get("X"), Some(&Term::number(2.0)));
    }
}
