//! The arithmetic evaluator.
//!
//! `eval` is the single reducer reused by unification, `is`, and every
//! built-in that needs a ground value out of a term. `Ok(None)` means
//! "cannot reduce further" and is not itself an error — callers decide
//! whether that's acceptable (e.g. `is` fails the goal, while `list_max`
//! over an unbound list is a `TypeError`). `Err` is reserved for the
//! genuine arithmetic errors calls out (division/modulus by
//! zero).

use crate::env::Environment;
use crate::error::{EngineError, EngineResult};
use crate::registry::Host;
use crate::term::Term;

fn is_unary_op(name: &str) -> bool {
    matches!(name, "+" | "-")
}

fn is_binary_op(name: &str) -> bool {
    matches!(name, "+" | "-" | "*" | "/" | "mod")
}

fn apply_unary(op: &str, a: f64) -> f64 {
    match op {
        "+" => a,
        "-" => -a,
        _ => unreachable!("not a registered unary operator: {op}"),
    }
}

/// `mod` follows the sign of the divisor, matching the original
/// engine's Python `%` (and unlike Rust's `%`, which follows the
/// dividend).
fn apply_binary(op: &str, a: f64, b: f64) -> EngineResult<f64> {
    match op {
        "+" => Ok(a + b),
        "-" => Ok(a - b),
        "*" => Ok(a * b),
        "/" => {
            if b == 0.0 {
                Err(EngineError::ArithmeticError("division by zero".into()))
            } else {
                Ok(a / b)
            }
        }
        "mod" => {
            if b == 0.0 {
                Err(EngineError::ArithmeticError("modulus by zero".into()))
            } else {
                Ok(a - b * (a / b).floor())
            }
        }
        _ => unreachable!("not a registered binary operator: {op}"),
    }
}

pub fn eval(term: &Term, env: &Environment, host: &dyn Host) -> EngineResult<Option<Term>> {
    if let Term::Predicate(pred, args) = term {
        if args.len() == 1 && is_unary_op(pred.as_str()) {
            return match eval(&args[0], env, host)? {
                Some(Term::NumberLiteral(a)) => Ok(Some(Term::NumberLiteral(apply_unary(
                    pred.as_str(),
                    a,
                )))),
                _ => Ok(None),
            };
        }

        if args.len() == 2 && is_binary_op(pred.as_str()) {
            let a = eval(&args[0], env, host)?;
            let b = eval(&args[1], env, host)?;
            return match (a, b) {
                (Some(Term::NumberLiteral(a)), Some(Term::NumberLiteral(b))) => {
                    Ok(Some(Term::NumberLiteral(apply_binary(pred.as_str(), a, b)?)))
                }
                _ => Ok(None),
            };
        }

        if let Some(function) = host.function(pred.as_str()) {
            return function.call(term, env, host);
        }
    }

    if term.is_literal() {
        return Ok(Some(term.clone()));
    }

    if let Term::Variable(name) = term {
        return match env.get(name) {
            None => Ok(None),
            Some(bound) => eval(bound, env, host),
        };
    }

    // A Predicate not matching any of the above: evaluate every
    // argument, failing the whole reduction if any argument can't
    // reduce.
    let (pred, args) = match term {
        Term::Predicate(pred, args) => (pred, args),
        _ => unreachable!("all other Term variants handled above"),
    };
    let mut evaluated = Vec::with_capacity(args.len());
    for arg in args {
        match eval(arg, env, host)? {
            None => return Ok(None),
            Some(v) => evaluated.push(v),
        }
    }
    Ok(Some(Term::Predicate(pred.clone(), evaluated)))
}
