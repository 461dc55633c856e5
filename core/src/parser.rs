//! A convenience parser for [`Term`]/[`Clause`] surface syntax, used by
//! tests in this crate and by the CLI's file loader. The engine itself
//! consumes pre-parsed [`Clause`] values, and nothing downstream of
//! `search` depends on this grammar.
//!
//! A clause is `head.` or `head :- goal1, goal2, ....`; comma-separated
//! goals are folded into `and(...)`, since connectives are encoded as
//! `and(...)`/`or(...)` predicates rather than special syntax.
//! `Term::ListLiteral` is a flat vector with no partial-list
//! representation, so unlike full Prolog this grammar only accepts
//! bracketed list literals (`[1, 2, 3]`), not `[H|T]` cons-cell sugar.

use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag};
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace0};
use nom::combinator::{map, map_res, opt, recognize};
use nom::error::VerboseError;
use nom::multi::{many0, separated_list0, separated_list1};
use nom::sequence::{delimited, pair, preceded};
use nom_locate::LocatedSpan;

use crate::clause::Clause;
use crate::term::Term;

type Span<'a> = LocatedSpan<&'a str>;

/// Redeclaration that uses `VerboseError` instead of the default
/// `nom::Error`, for richer parse-failure messages.
type IResult<T, O> = nom::IResult<T, O, VerboseError<T>>;

fn ws<'a, O>(inner: impl FnMut(Span<'a>) -> IResult<Span<'a>, O>) -> impl FnMut(Span<'a>) -> IResult<Span<'a>, O> {
    delimited(multispace0, inner, multispace0)
}

fn identifier(i: Span) -> IResult<Span, Span> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(i)
}

fn number(i: Span) -> IResult<Span, Term> {
    map_res(
        recognize(pair(
            opt(char('-')),
            pair(digit1, opt(pair(char('.'), digit1))),
        )),
        |s: Span| s.fragment().parse::<f64>().map(Term::NumberLiteral),
    )(i)
}

fn string_literal(i: Span) -> IResult<Span, Term> {
    map(delimited(char('"'), is_not("\""), char('"')), |s: Span| {
        Term::string(*s.fragment())
    })(i)
}

fn list_literal(i: Span) -> IResult<Span, Term> {
    map(
        delimited(
            ws(char('[')),
            separated_list0(ws(char(',')), term),
            ws(char(']')),
        ),
        Term::ListLiteral,
    )(i)
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().map(|c| c.is_uppercase() || c == '_').unwrap_or(false)
}

fn variable(i: Span) -> IResult<Span, Term> {
    map_res(identifier, |s: Span| {
        if starts_uppercase(s.fragment()) {
            Ok(Term::variable(*s.fragment()))
        } else {
            Err("not a variable")
        }
    })(i)
}

/// An atom or compound term: `name` or `name(t1, t2, ...)`. Unlike
/// [`literal`], this accepts any identifier case — used for function
/// arguments like `+`'s operands, which may themselves be compounds.
fn compound(i: Span) -> IResult<Span, Term> {
    map(
        pair(
            identifier,
            opt(delimited(
                ws(char('(')),
                separated_list1(ws(char(',')), term),
                ws(char(')')),
            )),
        ),
        |(name, args)| Term::compound(*name.fragment(), args.unwrap_or_default()),
    )(i)
}

pub fn term(i: Span) -> IResult<Span, Term> {
    alt((number, string_literal, list_literal, variable, compound))(i)
}

/// A single goal: always a predicate (atom or compound), never a bare
/// literal — this is what may appear as a clause head or a body goal.
fn literal(i: Span) -> IResult<Span, Term> {
    compound(i)
}

fn clause(i: Span) -> IResult<Span, Clause> {
    map(
        pair(
            ws(literal),
            opt(preceded(ws(tag(":-")), separated_list1(ws(char(',')), ws(literal)))),
        ),
        |(head, goals)| match goals {
            None => Clause::fact(head),
            Some(mut goals) if goals.len() == 1 => Clause::rule(head, goals.remove(0)),
            Some(goals) => Clause::rule(head, Term::compound("and", goals)),
        },
    )(i)
}

fn strip_trailing_period(s: &str) -> &str {
    s.trim().strip_suffix('.').unwrap_or(s).trim_end()
}

fn goal_list(i: Span) -> IResult<Span, Term> {
    map(separated_list1(ws(char(',')), ws(literal)), |mut goals: Vec<Term>| {
        if goals.len() == 1 {
            goals.remove(0)
        } else {
            Term::compound("and", goals)
        }
    })(i)
}

/// Parses a query goal: one or more comma-separated predicate calls,
/// folded into `and(...)` the same way a clause body is. Unlike
/// [`Term::from_str`], which parses exactly one term, this is the entry
/// point for free-standing goals typed at a REPL or passed on the
/// command line.
pub fn parse_goal(s: &str) -> Result<Term, String> {
    let trimmed = strip_trailing_period(s);
    match goal_list(Span::new(trimmed)) {
        Ok((_, t)) => Ok(t),
        Err(e) => Err(format!("{e}")),
    }
}

impl FromStr for Term {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match term(Span::new(s)) {
            Ok((_, t)) => Ok(t),
            Err(e) => Err(format!("{e}")),
        }
    }
}

impl FromStr for Clause {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = strip_trailing_period(s);
        match clause(Span::new(trimmed)) {
            Ok((_, c)) => Ok(c),
            Err(e) => Err(format!("{e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_atoms_and_compounds() {
        assert_eq!("tom".parse::<Term>().unwrap(), Term::atom("tom"));
        assert_eq!(
            "parent(tom, bob)".parse::<Term>().unwrap(),
            Term::compound("parent", vec![Term::atom("tom"), Term::atom("bob")])
        );
    }

    #[test]
    fn parses_variables_by_leading_case() {
        assert_eq!("X".parse::<Term>().unwrap(), Term::variable("X"));
        assert_eq!("_Rest".parse::<Term>().unwrap(), Term::variable("_Rest"));
    }

    #[test]
    fn parses_numbers_and_strings() {
        assert_eq!("42".parse::<Term>().unwrap(), Term::number(42.0));
        assert_eq!("-3.5".parse::<Term>().unwrap(), Term::number(-3.5));
        assert_eq!("\"hi\"".parse::<Term>().unwrap(), Term::string("hi"));
    }

    #[test]
    fn parses_list_literals() {
        assert_eq!(
            "[1, 2, 3]".parse::<Term>().unwrap(),
            Term::ListLiteral(vec![Term::number(1.0), Term::number(2.0), Term::number(3.0)])
        );
    }

    #[test]
    fn parses_a_fact() {
        let clause = "parent(tom, bob).".parse::<Clause>().unwrap();
        assert_eq!(clause, Clause::fact(Term::compound("parent", vec![Term::atom("tom"), Term::atom("bob")])));
    }

    #[test]
    fn parses_a_rule_with_comma_separated_goals_as_and() {
        let clause = "grandparent(X, Z) :- parent(X, Y), parent(Y, Z)."
            .parse::<Clause>()
            .unwrap();
        let expected = Clause::rule(
            Term::compound("grandparent", vec![Term::variable("X"), Term::variable("Z")]),
            Term::compound(
                "and",
                vec![
                    Term::compound("parent", vec![Term::variable("X"), Term::variable("Y")]),
                    Term::compound("parent", vec![Term::variable("Y"), Term::variable("Z")]),
                ],
            ),
        );
        assert_eq!(clause, expected);
    }

    #[test]
    fn parse_goal_folds_comma_separated_goals_into_and() {
        let goal = parse_goal("parent(X, Y), is(N, +(1, 2))").unwrap();
        assert_eq!(
            goal,
            Term::compound(
                "and",
                vec![
                    Term::compound("parent", vec![Term::variable("X"), Term::variable("Y")]),
                    Term::compound(
                        "is",
                        vec![
                            Term::variable("N"),
                            Term::compound("+", vec![Term::number(1.0), Term::number(2.0)])
                        ]
                    ),
                ]
            )
        );
    }

    #[test]
    fn parse_goal_does_not_wrap_a_single_goal() {
        assert_eq!(
            parse_goal("parent(tom, X)").unwrap(),
            Term::compound("parent", vec![Term::atom("tom"), Term::variable("X")])
        );
    }

    #[test]
    fn parses_a_rule_with_a_single_goal_without_wrapping_in_and() {
        let clause = "ancestor(X, Y) :- parent(X, Y).".parse::<Clause>().unwrap();
        let expected = Clause::rule(
            Term::compound("ancestor", vec![Term::variable("X"), Term::variable("Y")]),
            Term::compound("parent", vec![Term::variable("X"), Term::variable("Y")]),
        );
        assert_eq!(clause, expected);
    }
}
