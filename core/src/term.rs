//! The algebraic term language (component C1).
//!
//! A [`Term`] is either a variable, a ground literal (number, string or
//! list), or a predicate/compound. Structural equality and `Display` are
//! derived or implemented directly on this type; evaluation and
//! unification live in [`crate::eval`] and [`crate::unify`].

use std::fmt;
use std::rc::Rc;

/// An interned predicate/function symbol.
///
/// Two `Predicate`s with equal `name` but different arity are distinct —
/// the arity lives on the surrounding [`Term::Predicate`]/[`crate::clause::Clause`],
/// never on `Predicate` itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Predicate(pub Rc<str>);

impl Predicate {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Predicate(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Predicate {
    fn from(s: &str) -> Self {
        Predicate(Rc::from(s))
    }
}

impl From<String> for Predicate {
    fn from(s: String) -> Self {
        Predicate(Rc::from(s.as_str()))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The term variants of the language.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Term {
    /// A named logical variable. Names are interned strings; the engine
    /// does not care whether the surface syntax capitalized them.
    Variable(Rc<str>),
    /// A double-precision numeric literal.
    NumberLiteral(f64),
    /// An immutable text literal.
    StringLiteral(Rc<str>),
    /// An ordered sequence of terms; the empty list is `nil`.
    ListLiteral(Vec<Term>),
    /// A compound term, or an atom when `args` is empty.
    Predicate(Predicate, Vec<Term>),
}

impl Term {
    pub fn atom(name: impl Into<Rc<str>>) -> Term {
        Term::Predicate(Predicate(name.into()), Vec::new())
    }

    pub fn compound(name: impl Into<Rc<str>>, args: Vec<Term>) -> Term {
        Term::Predicate(Predicate(name.into()), args)
    }

    pub fn variable(name: impl Into<Rc<str>>) -> Term {
        Term::Variable(name.into())
    }

    pub fn number(f: f64) -> Term {
        Term::NumberLiteral(f)
    }

    pub fn string(s: impl Into<Rc<str>>) -> Term {
        Term::StringLiteral(s.into())
    }

    /// `true` for the three ground-literal variants (§4.1: "a `Literal`
    /// (number/string/list)"); not a full groundness check over
    /// predicates, which may still contain variables.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Term::NumberLiteral(_) | Term::StringLiteral(_) | Term::ListLiteral(_)
        )
    }

    pub fn as_name_arity(&self) -> Option<(&str, usize)> {
        match self {
            Term::Predicate(p, args) => Some((p.as_str(), args.len())),
            _ => None,
        }
    }

    pub fn predicate_name(&self) -> Option<&str> {
        match self {
            Term::Predicate(p, _) => Some(p.as_str()),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Term] {
        match self {
            Term::Predicate(_, args) => args,
            _ => &[],
        }
    }

    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "{}", name),
            Term::NumberLiteral(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Term::StringLiteral(s) => write!(f, "\"{}\"", s),
            Term::ListLiteral(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Term::Predicate(name, args) => {
                if args.is_empty() {
                    write!(f, "{}", name)
                } else {
                    write!(f, "{}(", name)?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ")")
                }
            }
        }
    }
}
