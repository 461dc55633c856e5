//! Error kinds raised by the engine.
//!
//! These abort the current [`crate::sld::search`] and propagate to the
//! caller; a failing unification or a built-in predicate returning
//! `false` is *not* an error, it is an ordinary resolution failure that
//! discards the current goal frame.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("type error: expected {expected}, found {found}")]
    TypeError { expected: String, found: String },

    #[error("undefined predicate: {name}/{arity}")]
    UndefinedPredicate { name: String, arity: usize },

    #[error("malformed clause body: top-level term is not a predicate")]
    MalformedBody,

    #[error("arithmetic error: {0}")]
    ArithmeticError(String),

    #[error("overlay error: {0}")]
    OverlayError(String),

    #[error("resolution aborted after exceeding the configured step limit ({0})")]
    StepLimitExceeded(usize),
}

pub type EngineResult<T> = Result<T, EngineError>;
