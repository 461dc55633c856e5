//! The minimal built-in predicate/function set, plus additional
//! predicates and functions drawn from `halprolog/runtime.py`'s
//! registration list.
//!
//! `is`, `cut` and `fail` are special forms handled directly by
//! [`crate::sld::search`]; everything here goes through the ordinary
//! [`crate::registry::ExtensionRegistry`] dispatch path, the same as a
//! host's own extensions would.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::env::Environment;
use crate::error::{EngineError, EngineResult};
use crate::eval::eval;
use crate::registry::{ExtensionRegistry, Host};
use crate::term::Term;
use crate::unify::unify;

/// Builds a registry carrying the minimal six predicates and six
/// functions, plus `assertz`/`retractall` and a handful of
/// string/list/time predicates and functions.
pub fn with_minimal_builtins() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();

    registry.register_builtin("=", unify_predicate);
    registry.register_builtin("\\=", not_unify_predicate);
    registry.register_builtin("<", |a, e, h| comparison(a, e, h, |x, y| x < y));
    registry.register_builtin("=<", |a, e, h| comparison(a, e, h, |x, y| x <= y));
    registry.register_builtin(">", |a, e, h| comparison(a, e, h, |x, y| x > y));
    registry.register_builtin(">=", |a, e, h| comparison(a, e, h, |x, y| x >= y));
    registry.register_builtin("write", write_predicate);
    registry.register_builtin("nl", nl_predicate);
    registry.register_builtin("list_contains", list_contains_predicate);

    registry.register_builtin("assertz", assertz_predicate);
    registry.register_builtin("retractall", retractall_predicate);
    registry.register_builtin("sub_string", sub_string_predicate);
    registry.register_builtin("get_time", get_time_predicate);
    registry.register_builtin("date_time_stamp", date_time_stamp_predicate);
    registry.register_builtin("stamp_date_time", stamp_date_time_predicate);

    registry.register_builtin_function("format_str", format_str_function);
    registry.register_builtin_function("isoformat", isoformat_function);
    registry.register_builtin_function("list_max", list_max_function);
    registry.register_builtin_function("list_min", list_min_function);
    registry.register_builtin_function("list_sum", list_sum_function);
    registry.register_builtin_function("list_avg", list_avg_function);

    registry
}

fn unify_predicate(args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("=", args, 2)?;
    let src_env = env.clone();
    unify(&args[0], &src_env, &args[1], env, host)
}

fn not_unify_predicate(args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("\\=", args, 2)?;
    let src_env = env.clone();
    let mut scratch = env.clone();
    Ok(!unify(&args[0], &src_env, &args[1], &mut scratch, host)?)
}

fn comparison(
    args: &[Term],
    env: &mut Environment,
    host: &dyn Host,
    op: impl Fn(f64, f64) -> bool,
) -> EngineResult<bool> {
    expect_arity("comparison", args, 2)?;
    let a = as_number(&args[0], env, host)?;
    let b = as_number(&args[1], env, host)?;
    Ok(op(a, b))
}

fn write_predicate(args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("write", args, 1)?;
    let value = eval(&args[0], env, host)?.unwrap_or_else(|| args[0].clone());
    host.write_out(&value.to_string());
    Ok(true)
}

fn nl_predicate(args: &[Term], _env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("nl", args, 0)?;
    host.write_out("\n");
    Ok(true)
}

fn list_contains_predicate(args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("list_contains", args, 2)?;
    let needle = eval(&args[0], env, host)?.ok_or_else(|| EngineError::TypeError {
        expected: "ground term".into(),
        found: "unbound variable".into(),
    })?;
    let haystack = eval(&args[1], env, host)?;
    match haystack {
        Some(Term::ListLiteral(items)) => Ok(items.contains(&needle)),
        Some(other) => Err(EngineError::TypeError {
            expected: "list".into(),
            found: other.to_string(),
        }),
        None => Err(EngineError::TypeError {
            expected: "list".into(),
            found: "unbound variable".into(),
        }),
    }
}

/// Stages `clause` in the current search's overlay (`assertz`,
/// exposed as a built-in predicate). The argument is
/// the clause's head term; a fact-only builtin, since a built-in
/// predicate call has no syntax for supplying a body.
fn assertz_predicate(args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("assertz", args, 1)?;
    let head = eval(&args[0], env, host)?.ok_or_else(|| EngineError::TypeError {
        expected: "ground clause head".into(),
        found: "unbound variable".into(),
    })?;
    host.assertz(crate::clause::Clause::fact(head));
    Ok(true)
}

/// Retracts every clause whose head structurally matches `args[0]`
///.
fn retractall_predicate(args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("retractall", args, 1)?;
    let head = eval(&args[0], env, host)?.ok_or_else(|| EngineError::TypeError {
        expected: "ground clause head".into(),
        found: "unbound variable".into(),
    })?;
    host.retractall(crate::clause::Clause::fact(head))?;
    Ok(true)
}

/// `sub_string(String, Start, Length, Sub)` — all four arguments must
/// evaluate; this core does not implement the original's partial-mode
/// search over unbound `Start`/`Length`.
fn sub_string_predicate(args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("sub_string", args, 4)?;
    let string = as_string(&args[0], env, host)?;
    let start = as_number(&args[1], env, host)? as usize;
    let length = as_number(&args[2], env, host)? as usize;
    let sub = as_string(&args[3], env, host)?;
    let bytes = string.as_bytes();
    if start + length > bytes.len() {
        return Ok(false);
    }
    let slice = std::str::from_utf8(&bytes[start..start + length]).map_err(|_| EngineError::TypeError {
        expected: "utf-8 boundary aligned substring".into(),
        found: string.clone(),
    })?;
    Ok(slice == sub)
}

fn get_time_predicate(args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("get_time", args, 1)?;
    let now = Utc::now().timestamp() as f64;
    let mut scratch = env.clone();
    let ok = unify(&Term::number(now), env, &args[0], &mut scratch, host)?;
    if ok {
        *env = scratch;
    }
    Ok(ok)
}

/// `date_time_stamp(IsoString, Seconds)` — converts an ISO-8601
/// timestamp into seconds since the Unix epoch.
fn date_time_stamp_predicate(args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("date_time_stamp", args, 2)?;
    let iso = as_string(&args[0], env, host)?;
    let parsed: DateTime<Utc> = iso.parse().map_err(|_| EngineError::TypeError {
        expected: "ISO-8601 datetime string".into(),
        found: iso.clone(),
    })?;
    let mut scratch = env.clone();
    let ok = unify(
        &Term::number(parsed.timestamp() as f64),
        env,
        &args[1],
        &mut scratch,
        host,
    )?;
    if ok {
        *env = scratch;
    }
    Ok(ok)
}

/// `stamp_date_time(Seconds, IsoString)` — the inverse of
/// `date_time_stamp`.
fn stamp_date_time_predicate(args: &[Term], env: &mut Environment, host: &dyn Host) -> EngineResult<bool> {
    expect_arity("stamp_date_time", args, 2)?;
    let seconds = as_number(&args[0], env, host)?;
    let when = DateTime::<Utc>::from_timestamp(seconds as i64, 0).ok_or_else(|| EngineError::TypeError {
        expected: "seconds since the Unix epoch".into(),
        found: seconds.to_string(),
    })?;
    let formatted = when.to_rfc3339();
    let mut scratch = env.clone();
    let ok = unify(&Term::string(formatted), env, &args[1], &mut scratch, host)?;
    if ok {
        *env = scratch;
    }
    Ok(ok)
}

fn format_str_function(term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<Option<Term>> {
    let args = term.args();
    if args.is_empty() {
        return Ok(None);
    }
    let template = match eval(&args[0], env, host)? {
        Some(Term::StringLiteral(s)) => s,
        _ => return Ok(None),
    };
    let mut rest = Vec::with_capacity(args.len() - 1);
    for arg in &args[1..] {
        match eval(arg, env, host)? {
            Some(v) => rest.push(v),
            None => return Ok(None),
        }
    }

    let mut out = String::new();
    let mut pieces = template.split("{}");
    if let Some(first) = pieces.next() {
        out.push_str(first);
    }
    for (piece, value) in pieces.zip(rest.iter()) {
        let _ = write!(out, "{}", value);
        out.push_str(piece);
    }
    Ok(Some(Term::string(out)))
}

fn isoformat_function(term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<Option<Term>> {
    let args = term.args();
    if args.len() != 1 {
        return Ok(None);
    }
    let seconds = match eval(&args[0], env, host)? {
        Some(Term::NumberLiteral(n)) => n,
        _ => return Ok(None),
    };
    let when = match DateTime::<Utc>::from_timestamp(seconds as i64, 0) {
        Some(when) => when,
        None => return Ok(None),
    };
    Ok(Some(Term::string(when.to_rfc3339())))
}

fn numeric_list(term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<Option<Vec<f64>>> {
    let args = term.args();
    if args.len() != 1 {
        return Ok(None);
    }
    let list = match eval(&args[0], env, host)? {
        Some(Term::ListLiteral(items)) => items,
        _ => return Ok(None),
    };
    let mut numbers = Vec::with_capacity(list.len());
    for item in list {
        match item {
            Term::NumberLiteral(n) => numbers.push(n),
            _ => return Ok(None),
        }
    }
    Ok(Some(numbers))
}

fn list_max_function(term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<Option<Term>> {
    match numeric_list(term, env, host)? {
        Some(numbers) if !numbers.is_empty() => {
            Ok(Some(Term::number(numbers.into_iter().fold(f64::NEG_INFINITY, f64::max))))
        }
        Some(_) => Err(EngineError::TypeError {
            expected: "non-empty numeric list for list_max".into(),
            found: "empty list".into(),
        }),
        None => Ok(None),
    }
}

fn list_min_function(term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<Option<Term>> {
    match numeric_list(term, env, host)? {
        Some(numbers) if !numbers.is_empty() => {
            Ok(Some(Term::number(numbers.into_iter().fold(f64::INFINITY, f64::min))))
        }
        Some(_) => Err(EngineError::TypeError {
            expected: "non-empty numeric list for list_min".into(),
            found: "empty list".into(),
        }),
        None => Ok(None),
    }
}

fn list_sum_function(term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<Option<Term>> {
    Ok(numeric_list(term, env, host)?.map(|numbers| Term::number(numbers.iter().sum())))
}

fn list_avg_function(term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<Option<Term>> {
    match numeric_list(term, env, host)? {
        Some(numbers) if !numbers.is_empty() => {
            let avg = numbers.iter().sum::<f64>() / numbers.len() as f64;
            Ok(Some(Term::number(avg)))
        }
        Some(_) => Err(EngineError::TypeError {
            expected: "non-empty numeric list for list_avg".into(),
            found: "empty list".into(),
        }),
        None => Ok(None),
    }
}

fn expect_arity(name: &str, args: &[Term], arity: usize) -> EngineResult<()> {
    if args.len() != arity {
        Err(EngineError::TypeError {
            expected: format!("{name}/{arity}"),
            found: format!("{name}/{}", args.len()),
        })
    } else {
        Ok(())
    }
}

fn as_number(term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<f64> {
    match eval(term, env, host)? {
        Some(Term::NumberLiteral(n)) => Ok(n),
        Some(other) => Err(EngineError::TypeError {
            expected: "number".into(),
            found: other.to_string(),
        }),
        None => Err(EngineError::TypeError {
            expected: "number".into(),
            found: "unbound variable".into(),
        }),
    }
}

fn as_string(term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<String> {
    match eval(term, env, host)? {
        Some(Term::StringLiteral(s)) => Ok(s.to_string()),
        Some(other) => Err(EngineError::TypeError {
            expected: "string".into(),
            found: other.to_string(),
        }),
        None => Err(EngineError::TypeError {
            expected: "string".into(),
            found: "unbound variable".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDatabase;
    use crate::runtime::Runtime;

    fn runtime() -> Runtime {
        Runtime::new(Box::new(MemoryDatabase::new()), with_minimal_builtins())
    }

    #[test]
    fn equals_binds_the_unbound_side() {
        let rt = runtime();
        let mut env = Environment::new();
        let args = vec![Term::number(1.0), Term::variable("X")];
        assert!(rt.predicate("=").unwrap().call(&args, &mut env, &rt).unwrap());
        assert_eq!(env.get("X"), Some(&Term::number(1.0)));
    }

    #[test]
    fn not_equals_leaves_env_untouched_either_way() {
        let rt = runtime();
        let mut env = Environment::new();
        let args = vec![Term::number(1.0), Term::number(2.0)];
        assert!(rt.predicate("\\=").unwrap().call(&args, &mut env, &rt).unwrap());
        assert!(env.is_empty());
    }

    #[test]
    fn comparisons_require_numbers() {
        let rt = runtime();
        let mut env = Environment::new();
        let args = vec![Term::number(1.0), Term::number(2.0)];
        assert!(rt.predicate("<").unwrap().call(&args, &mut env, &rt).unwrap());
        assert!(!rt.predicate(">").unwrap().call(&args, &mut env, &rt).unwrap());
    }

    #[test]
    fn list_contains_checks_structural_equality() {
        let rt = runtime();
        let mut env = Environment::new();
        let args = vec![
            Term::number(2.0),
            Term::ListLiteral(vec![Term::number(1.0), Term::number(2.0)]),
        ];
        assert!(rt
            .predicate("list_contains")
            .unwrap()
            .call(&args, &mut env, &rt)
            .unwrap());
    }

    #[test]
    fn list_sum_and_avg() {
        let rt = runtime();
        let env = Environment::new();
        let list = Term::compound(
            "list_sum",
            vec![Term::ListLiteral(vec![
                Term::number(1.0),
                Term::number(2.0),
                Term::number(3.0),
            ])],
        );
        assert_eq!(
            rt.function("list_sum").unwrap().call(&list, &env, &rt).unwrap(),
            Some(Term::number(6.0))
        );
        let avg = Term::compound(
            "list_avg",
            vec![Term::ListLiteral(vec![
                Term::number(1.0),
                Term::number(2.0),
                Term::number(3.0),
            ])],
        );
        assert_eq!(
            rt.function("list_avg").unwrap().call(&avg, &env, &rt).unwrap(),
            Some(Term::number(2.0))
        );
    }

    #[test]
    fn format_str_substitutes_positionally() {
        let rt = runtime();
        let env = Environment::new();
        let term = Term::compound(
            "format_str",
            vec![Term::string("{} of {}"), Term::number(1.0), Term::number(2.0)],
        );
        assert_eq!(
            rt.function("format_str").unwrap().call(&term, &env, &rt).unwrap(),
            Some(Term::string("1 of 2"))
        );
    }

    #[test]
    fn sub_string_checks_byte_range() {
        let rt = runtime();
        let mut env = Environment::new();
        let args = vec![
            Term::string("hello world"),
            Term::number(6.0),
            Term::number(5.0),
            Term::string("world"),
        ];
        assert!(rt
            .predicate("sub_string")
            .unwrap()
            .call(&args, &mut env, &rt)
            .unwrap());
    }

    #[test]
    fn assertz_then_retractall_round_trips_through_the_overlay() {
        let rt = runtime();
        let mut env = Environment::new();
        let fact = Term::compound("likes", vec![Term::atom("tom"), Term::atom("pizza")]);
        rt.predicate("assertz")
            .unwrap()
            .call(&[fact.clone()], &mut env, &rt)
            .unwrap();
        assert_eq!(rt.lookup_clauses("likes").len(), 1);
        rt.predicate("retractall")
            .unwrap()
            .call(&[fact], &mut env, &rt)
            .unwrap();
        assert_eq!(rt.lookup_clauses("likes").len(), 0);
    }
}
