//! The resolution engine: a deterministic worklist interpreter over
//! an arena of goal frames.
//!
//! Spec's own design note (§9) suggests modeling "parent" as a
//! non-owning index into an arena rather than a graph of owned nodes;
//! that's exactly what `Arena`/`GoalId` below do. "Clone the parent and
//! advance it on resumption" becomes "clone the arena entry and push
//! the clone as a new entry" — no cycles, no shared mutable state.
//!
//! The queue discipline is the other subtlety worth spelling out. The
//! original (`original_source/halprolog/runtime.py`) always pops from
//! one end of a list (`queue.pop()`) and always inserts at the other
//! (`queue.insert(0, …)`), for every kind of enqueue: new clause
//! alternatives, self-resumption after `is`/`cut`/a built-in, and
//! parent resumption on completion. Because every insertion goes
//! through one end and every removal goes through the other, the
//! relative order among goals is the same as a plain FIFO queue. A
//! `VecDeque` with `push_back`/`pop_front` reproduces that order
//! exactly.

use std::collections::VecDeque;

use crate::clause::Clause;
use crate::env::Environment;
use crate::error::{EngineError, EngineResult};
use crate::eval::eval;
use crate::registry::Host;
use crate::runtime::Runtime;
use crate::term::Term;
use crate::unify::unify;

type GoalId = usize;

/// A goal frame: the state of proving one clause
/// body. `parent` is a non-owning arena index rather than an owned
/// reference, per the design note above.
#[derive(Clone, Debug)]
struct GoalFrame {
    head: Term,
    terms: Vec<Term>,
    inx: usize,
    env: Environment,
    parent: Option<GoalId>,
}

#[derive(Default)]
struct Arena {
    frames: Vec<GoalFrame>,
}

impl Arena {
    fn push(&mut self, frame: GoalFrame) -> GoalId {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    fn get(&self, id: GoalId) -> &GoalFrame {
        &self.frames[id]
    }

    fn get_mut(&mut self, id: GoalId) -> &mut GoalFrame {
        &mut self.frames[id]
    }
}

fn advance_and_requeue(arena: &mut Arena, queue: &mut VecDeque<GoalId>, gid: GoalId) {
    arena.get_mut(gid).inx += 1;
    queue.push_back(gid);
}

/// Runs SLD-resolution for `clause` interpreted as a query and returns
/// every solution environment, in the order the engine finds them
///.
pub fn search(clause: &Clause, env: Environment, runtime: &Runtime) -> EngineResult<Vec<Environment>> {
    let body = match &clause.body {
        None => return Ok(vec![Environment::new()]),
        Some(body) => body,
    };
    let terms = Clause::normalize_body(body)?;

    let mut arena = Arena::default();
    let root = arena.push(GoalFrame {
        head: clause.head.clone(),
        terms,
        inx: 0,
        env,
        parent: None,
    });

    let mut queue: VecDeque<GoalId> = VecDeque::new();
    queue.push_back(root);

    let mut solutions = Vec::new();
    let mut steps: usize = 0;

    while let Some(gid) = queue.pop_front() {
        steps += 1;
        if let Some(max) = runtime.config().max_steps {
            if steps > max {
                return Err(EngineError::StepLimitExceeded(max));
            }
        }

        let frame = arena.get(gid);
        if runtime.config().trace {
            log::trace!("consider {} @ {}", frame.head, frame.inx);
        }

        if frame.inx >= frame.terms.len() {
            complete_goal(&mut arena, &mut queue, &mut solutions, gid, runtime)?;
            continue;
        }

        let pred = frame.terms[frame.inx].clone();
        let name = match pred.predicate_name() {
            Some(name) => name,
            None => return Err(EngineError::MalformedBody),
        };

        if name == "is" {
            step_is(&mut arena, &mut queue, gid, &pred, runtime)?;
        } else if name == "cut" {
            // Discard every other pending alternative; this goal alone
            // survives to be resumed.
            queue.clear();
            advance_and_requeue(&mut arena, &mut queue, gid);
        } else if name == "fail" {
            // Drop the frame: no requeue, no children.
        } else if let Some(builtin) = runtime.predicate(name) {
            let args = pred.args().to_vec();
            let mut frame_env = std::mem::take(&mut arena.get_mut(gid).env);
            let ok = builtin.call(&args, &mut frame_env, runtime)?;
            arena.get_mut(gid).env = frame_env;
            if ok {
                advance_and_requeue(&mut arena, &mut queue, gid);
            }
        } else {
            step_user_predicate(&mut arena, &mut queue, gid, &pred, name, runtime)?;
        }
    }

    Ok(solutions)
}

fn complete_goal(
    arena: &mut Arena,
    queue: &mut VecDeque<GoalId>,
    solutions: &mut Vec<Environment>,
    gid: GoalId,
    runtime: &Runtime,
) -> EngineResult<()> {
    let frame = arena.get(gid);
    match frame.parent {
        None => solutions.push(frame.env.clone()),
        Some(parent_id) => {
            let head = frame.head.clone();
            let goal_env = frame.env.clone();
            let mut resumed = arena.get(parent_id).clone();
            let target = resumed.terms[resumed.inx].clone();
            unify(&head, &goal_env, &target, &mut resumed.env, runtime)?;
            resumed.inx += 1;
            let new_id = arena.push(resumed);
            queue.push_back(new_id);
        }
    }
    Ok(())
}

/// `is/2`: the only arithmetic-assignment special form.
/// If the left-hand side is already ground, `is` behaves as a
/// comparison; otherwise, and only when it names a bare variable, it
/// binds that variable to the right-hand side's value.
fn step_is(arena: &mut Arena, queue: &mut VecDeque<GoalId>, gid: GoalId, pred: &Term, runtime: &Runtime) -> EngineResult<()> {
    let args = pred.args();
    if args.len() != 2 {
        return Err(EngineError::MalformedBody);
    }
    let snapshot = arena.get(gid).env.clone();
    let lhs = eval(&args[0], &snapshot, runtime)?;
    let succeeded = match lhs {
        Some(lhs_value) => eval(&args[1], &snapshot, runtime)? == Some(lhs_value),
        None => match (args[0].variable_name(), eval(&args[1], &snapshot, runtime)?) {
            (Some(var_name), Some(rhs_value)) => {
                arena.get_mut(gid).env.bind(var_name, rhs_value);
                true
            }
            // Either not a bare variable, or the right-hand side also
            // doesn't reduce: there's nothing sensible to bind.
            _ => false,
        },
    };
    if succeeded {
        advance_and_requeue(arena, queue, gid);
    }
    Ok(())
}

fn step_user_predicate(
    arena: &mut Arena,
    queue: &mut VecDeque<GoalId>,
    gid: GoalId,
    pred: &Term,
    name: &str,
    runtime: &Runtime,
) -> EngineResult<()> {
    let arity = pred.args().len();
    let candidates = runtime.lookup_clauses(name);
    if candidates.is_empty() {
        return Err(EngineError::UndefinedPredicate {
            name: name.to_owned(),
            arity,
        });
    }
    let goal_env = arena.get(gid).env.clone();
    for candidate in candidates.iter().filter(|c| c.arity() == arity) {
        for terms in Clause::expand_body(&candidate.body)? {
            let mut child_env = Environment::new();
            if unify(pred, &goal_env, &candidate.head, &mut child_env, runtime)? {
                let child = arena.push(GoalFrame {
                    head: candidate.head.clone(),
                    terms,
                    inx: 0,
                    env: child_env,
                    parent: Some(gid),
                });
                queue.push_back(child);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::with_minimal_builtins;
    use crate::db::{ClauseStore, MemoryDatabase};

    fn family_runtime() -> Runtime {
        let mut db = MemoryDatabase::new();
        db.store("m", Clause::fact(Term::compound("parent", vec![Term::atom("tom"), Term::atom("bob")])));
        db.store("m", Clause::fact(Term::compound("parent", vec![Term::atom("bob"), Term::atom("ann")])));
        db.store("m", Clause::fact(Term::compound("parent", vec![Term::atom("bob"), Term::atom("pat")])));
        db.store(
            "m",
            Clause::rule(
                Term::compound("grandparent", vec![Term::variable("X"), Term::variable("Z")]),
                Term::compound(
                    "and",
                    vec![
                        Term::compound("parent", vec![Term::variable("X"), Term::variable("Y")]),
                        Term::compound("parent", vec![Term::variable("Y"), Term::variable("Z")]),
                    ],
                ),
            ),
        );
        Runtime::new(Box::new(db), with_minimal_builtins())
    }

    fn query(body: Term) -> Clause {
        Clause {
            head: Term::atom("query"),
            body: Some(body),
        }
    }

    #[test]
    fn parent_of_tom_is_bob() {
        let rt = family_runtime();
        let q = query(Term::compound("parent", vec![Term::atom("tom"), Term::variable("X")]));
        let solutions = search(&q, Environment::new(), &rt).unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].get("X"), Some(&Term::atom("bob")));
    }

    #[test]
    fn parent_pairs_come_back_in_insertion_order() {
        let rt = family_runtime();
        let q = query(Term::compound("parent", vec![Term::variable("X"), Term::variable("Y")]));
        let solutions = search(&q, Environment::new(), &rt).unwrap();
        let pairs: Vec<(Term, Term)> = solutions
            .iter()
            .map(|e| (e.get("X").unwrap().clone(), e.get("Y").unwrap().clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (Term::atom("tom"), Term::atom("bob")),
                (Term::atom("bob"), Term::atom("ann")),
                (Term::atom("bob"), Term::atom("pat")),
            ]
        );
    }

    #[test]
    fn grandparent_of_tom() {
        let rt = family_runtime();
        let q = query(Term::compound("grandparent", vec![Term::atom("tom"), Term::variable("Z")]));
        let solutions = search(&q, Environment::new(), &rt).unwrap();
        let zs: Vec<Term> = solutions.iter().map(|e| e.get("Z").unwrap().clone()).collect();
        assert_eq!(zs, vec![Term::atom("ann"), Term::atom("pat")]);
    }

    #[test]
    fn cut_commits_to_the_first_parent_branch() {
        let rt = family_runtime();
        let body = Term::compound(
            "and",
            vec![
                Term::compound("parent", vec![Term::atom("tom"), Term::variable("X")]),
                Term::atom("cut"),
                Term::compound("parent", vec![Term::variable("X"), Term::variable("Z")]),
            ],
        );
        let solutions = search(&query(body), Environment::new(), &rt).unwrap();
        let pairs: Vec<(Term, Term)> = solutions
            .iter()
            .map(|e| (e.get("X").unwrap().clone(), e.get("Z").unwrap().clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (Term::atom("bob"), Term::atom("ann")),
                (Term::atom("bob"), Term::atom("pat")),
            ]
        );
    }

    #[test]
    fn undefined_predicate_is_an_error() {
        let rt = family_runtime();
        let q = query(Term::compound("no_such_predicate", vec![Term::atom("x")]));
        let err = search(&q, Environment::new(), &rt).unwrap_err();
        assert!(matches!(err, EngineError::UndefinedPredicate { .. }));
    }

    #[test]
    fn is_binds_and_extends_every_solution() {
        let rt = family_runtime();
        let body = Term::compound(
            "and",
            vec![
                Term::compound("parent", vec![Term::variable("X"), Term::variable("Y")]),
                Term::compound(
                    "is",
                    vec![
                        Term::variable("N"),
                        Term::compound("+", vec![Term::number(1.0), Term::number(2.0)]),
                    ],
                ),
            ],
        );
        let solutions = search(&query(body), Environment::new(), &rt).unwrap();
        assert_eq!(solutions.len(), 3);
        for sol in &solutions {
            assert_eq!(sol.get("N"), Some(&Term::number(3.0)));
        }
    }

    #[test]
    fn division_by_zero_aborts_the_whole_search() {
        let rt = family_runtime();
        let body = Term::compound(
            "is",
            vec![Term::variable("N"), Term::compound("/", vec![Term::number(1.0), Term::number(0.0)])],
        );
        let err = search(&query(body), Environment::new(), &rt).unwrap_err();
        assert!(matches!(err, EngineError::ArithmeticError(_)));
    }

    #[test]
    fn mismatched_arithmetic_comparison_just_fails() {
        let rt = family_runtime();
        let body = Term::compound(
            "is",
            vec![Term::number(4.0), Term::compound("+", vec![Term::number(1.0), Term::number(2.0)])],
        );
        let solutions = search(&query(body), Environment::new(), &rt).unwrap();
        assert!(solutions.is_empty());
    }

    #[test]
    fn fact_query_succeeds_once_with_an_empty_environment() {
        let rt = family_runtime();
        let q = Clause::fact(Term::atom("query"));
        let solutions = search(&q, Environment::new(), &rt).unwrap();
        assert_eq!(solutions, vec![Environment::new()]);
    }
}
