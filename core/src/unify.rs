//! First-order syntactic unification, no occurs-check.

use crate::env::Environment;
use crate::error::EngineResult;
use crate::eval::eval;
use crate::registry::Host;
use crate::term::Term;

/// Attempts to make `src` (read against `src_env`) and `dest` (read and
/// extended against `dest_env`) structurally identical. On success,
/// `dest_env` carries any new bindings; `src_env` is never mutated.
///
/// No occurs-check is performed, matching classical Prolog (spec
/// Non-goals).
pub fn unify(
    src: &Term,
    src_env: &Environment,
    dest: &Term,
    dest_env: &mut Environment,
    host: &dyn Host,
) -> EngineResult<bool> {
    // Step 1: src is a Variable.
    if let Term::Variable(_) = src {
        return match eval(src, src_env, host)? {
            None => Ok(true),
            Some(bound) => unify(&bound, src_env, dest, dest_env, host),
        };
    }

    // Step 2: dest is a Variable.
    if let Term::Variable(name) = dest {
        return match eval(dest, dest_env, host)? {
            Some(bound) => unify(src, src_env, &bound, dest_env, host),
            None => {
                let value = eval(src, src_env, host)?.unwrap_or_else(|| src.clone());
                dest_env.bind(name.clone(), value);
                Ok(true)
            }
        };
    }

    // Step 3: either side is a ground literal (number/string/list).
    if src.is_literal() || dest.is_literal() {
        let src_val = eval(src, src_env, host)?;
        let dest_val = eval(dest, dest_env, host)?;
        return Ok(src_val == dest_val);
    }

    // Steps 4-5: both sides are compounds/atoms.
    match (src, dest) {
        (Term::Predicate(sname, sargs), Term::Predicate(dname, dargs)) => {
            if sname != dname || sargs.len() != dargs.len() {
                return Ok(false);
            }

            // Scratch copy so a partially-successful argument unification
            // never pollutes dest_env when a later argument fails.
            let mut scratch = dest_env.clone();
            for (s, d) in sargs.iter().zip(dargs.iter()) {
                if !unify(s, src_env, d, &mut scratch, host)? {
                    return Ok(false);
                }
            }
            *dest_env = scratch;
            Ok(true)
        }
        _ => unreachable!("Variable and Literal terms are handled above"),
    }
}
