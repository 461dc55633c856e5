//! Clauses and the body-normalization rules shared by queries and
//! clause bodies.

use crate::error::{EngineError, EngineResult};
use crate::term::{Predicate, Term};

/// A fact (`body: None`) or a rule.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Clause {
    pub head: Term,
    pub body: Option<Term>,
}

impl Clause {
    pub fn fact(head: Term) -> Self {
        Clause { head, body: None }
    }

    pub fn rule(head: Term, body: Term) -> Self {
        Clause {
            head,
            body: Some(body),
        }
    }

    pub fn head_predicate(&self) -> Option<&Predicate> {
        match &self.head {
            Term::Predicate(p, _) => Some(p),
            _ => None,
        }
    }

    pub fn arity(&self) -> usize {
        self.head.args().len()
    }

    /// Normalizes a clause/query body into a flat `terms[]` list:
    /// `and(t1..tn)` expands to its arguments; any other top-level
    /// predicate becomes a single-element list.
    ///
    /// Called both for the root query (where `body` can't be `or`) and,
    /// with the single additional rule for `or`-expansion, by the
    /// resolution engine when spawning children (see
    /// [`Clause::expand_body`]).
    pub fn normalize_body(body: &Term) -> EngineResult<Vec<Term>> {
        match body {
            Term::Predicate(name, args) if name.as_str() == "and" => Ok(args.clone()),
            Term::Predicate(_, _) => Ok(vec![body.clone()]),
            _ => Err(EngineError::MalformedBody),
        }
    }

    /// Expands a clause body into one or more alternative `terms[]`
    /// lists, one per `or`-arm: if the body's top predicate is `or`,
    /// each arm becomes a separate child goal. A clause
    /// with no body (a fact) expands to a single empty list.
    pub fn expand_body(body: &Option<Term>) -> EngineResult<Vec<Vec<Term>>> {
        match body {
            None => Ok(vec![Vec::new()]),
            Some(Term::Predicate(name, args)) if name.as_str() == "or" => {
                args.iter().map(Self::normalize_body).collect()
            }
            Some(term) => Ok(vec![Self::normalize_body(term)?]),
        }
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.body {
            None => write!(f, "{}.", self.head),
            Some(body) => write!(f, "{} :- {}.", self.head, body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_body_flattens() {
        let body = Term::compound(
            "and",
            vec![Term::atom("a"), Term::atom("b"), Term::atom("c")],
        );
        let terms = Clause::normalize_body(&body).unwrap();
        assert_eq!(terms, vec![Term::atom("a"), Term::atom("b"), Term::atom("c")]);
    }

    #[test]
    fn single_subgoal_body() {
        let body = Term::atom("a");
        let terms = Clause::normalize_body(&body).unwrap();
        assert_eq!(terms, vec![Term::atom("a")]);
    }

    #[test]
    fn non_predicate_body_is_malformed() {
        let body = Term::number(1.0);
        assert_eq!(Clause::normalize_body(&body), Err(EngineError::MalformedBody));
    }

    #[test]
    fn or_expands_into_alternatives() {
        let body = Some(Term::compound(
            "or",
            vec![
                Term::compound("and", vec![Term::atom("a"), Term::atom("b")]),
                Term::atom("c"),
            ],
        ));
        let expansions = Clause::expand_body(&body).unwrap();
        assert_eq!(
            expansions,
            vec![vec![Term::atom("a"), Term::atom("b")], vec![Term::atom("c")]]
        );
    }

    #[test]
    fn fact_expands_to_one_empty_goal() {
        assert_eq!(Clause::expand_body(&None).unwrap(), vec![Vec::<Term>::new()]);
    }
}
