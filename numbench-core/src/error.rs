//! Error taxonomy shared by the execution pipeline.
//!
//! Per-cell errors (`ExecutionError`) are recoverable and end up in the
//! report. `MatrixError` is the fatal class: a malformed declaration aborts
//! startup before any cell runs.

use crate::CallConvention;
use std::time::Duration;
use thiserror::Error;

/// A backend failed while being invoked.
///
/// Recoverable: the owning cell records zero samples and the suite moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The call completed but reported a failure (bad status code,
    /// out-of-range result, argument shape mismatch).
    #[error("backend call failed: {0}")]
    CallFailed(String),
    /// The backend panicked during invocation.
    #[error("backend panicked: {0}")]
    Panicked(String),
    /// The cell exceeded its wall-time budget and was abandoned.
    #[error("cell exceeded its time budget of {limit:?}")]
    TimedOut {
        /// The configured per-cell budget.
        limit: Duration,
    },
}

/// The declared benchmark matrix itself is ill-formed.
///
/// These are configuration-time errors: they indicate a broken declaration,
/// not a broken backend, and abort the run before any cell executes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// The same algorithm name was declared twice.
    #[error("algorithm `{algorithm}` is declared more than once")]
    DuplicateAlgorithm {
        /// Offending algorithm name.
        algorithm: String,
    },
    /// The same implementation tag appears twice under one algorithm.
    #[error("algorithm `{algorithm}` declares implementation `{tag}` more than once")]
    DuplicateImplementation {
        /// Owning algorithm name.
        algorithm: String,
        /// Offending implementation tag.
        tag: String,
    },
    /// The same scenario label appears twice under one algorithm.
    #[error("algorithm `{algorithm}` declares scenario `{label}` more than once")]
    DuplicateScenario {
        /// Owning algorithm name.
        algorithm: String,
        /// Offending scenario label.
        label: String,
    },
    /// The designated reference tag is not among the declared implementations.
    #[error("algorithm `{algorithm}` designates reference `{tag}` but declares no such implementation")]
    MissingReference {
        /// Owning algorithm name.
        algorithm: String,
        /// The missing reference tag.
        tag: String,
    },
    /// The reference must be an in-process implementation so that its
    /// binding cannot fail.
    #[error("reference `{tag}` of algorithm `{algorithm}` must be an in-process implementation")]
    ReferenceNotInProcess {
        /// Owning algorithm name.
        algorithm: String,
        /// The offending reference tag.
        tag: String,
    },
    /// The reference implementation's signature does not fit the algorithm's
    /// declared convention.
    #[error("reference `{tag}` of algorithm `{algorithm}` does not match its declared convention")]
    ReferenceSignature {
        /// Owning algorithm name.
        algorithm: String,
        /// The offending reference tag.
        tag: String,
    },
    /// A scenario's argument shape conflicts with the algorithm's convention.
    #[error("scenario `{label}` does not fit the {convention:?} convention of algorithm `{algorithm}`")]
    ConventionMismatch {
        /// Owning algorithm name.
        algorithm: String,
        /// Offending scenario label.
        label: String,
        /// The algorithm's declared convention.
        convention: CallConvention,
    },
    /// The repetition policy would record no timed iterations.
    #[error("repetition policy requires at least one timed iteration")]
    ZeroRepetitions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_messages_name_the_failure() {
        let err = ExecutionError::CallFailed("count out of range".to_string());
        assert!(err.to_string().contains("count out of range"));

        let err = ExecutionError::TimedOut {
            limit: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("time budget"));
    }

    #[test]
    fn matrix_error_names_the_offending_declaration() {
        let err = MatrixError::DuplicateImplementation {
            algorithm: "sieve".to_string(),
            tag: "c".to_string(),
        };
        assert!(err.to_string().contains("sieve"));
        assert!(err.to_string().contains("`c`"));
    }
}
