#![warn(missing_docs)]
//! Numbench Backend - Binding and Registry
//!
//! This crate turns declared backends into uniformly invocable callables:
//! - `binding` resolves one implementation handle into a `BoundCallable`,
//!   absorbing the differences between a native shared-library call and an
//!   in-process call behind a small closed set of typed adapters.
//! - `registry` holds the declared (algorithm, implementation) matrix and
//!   resolves every entry eagerly, capturing failures instead of raising.
//! - `reference` provides the trusted in-process implementations every
//!   other backend is validated against.

mod binding;
mod registry;
pub mod reference;

pub use binding::{
    artifact_path, bind, BenchUnit, BindingError, BoundCallable, ImplKind, ImplementationHandle,
    InProcessFn,
};
pub use registry::{AlgorithmEntry, Registry, ResolvedAlgorithm, ResolvedImplementation};
