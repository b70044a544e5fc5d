//! Backend Registry
//!
//! The benchmark matrix is data, not control flow: an explicit list of
//! (algorithm, implementations) declarations resolved eagerly into a result
//! per entry. An individual binding failure is captured and surfaced as an
//! unavailable entry; it never aborts the run.

use crate::binding::{bind, BindingError, BoundCallable, ImplementationHandle};
use numbench_core::{AlgorithmSpec, MatrixError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One declared row of the matrix: an algorithm and its backends.
#[derive(Debug, Clone)]
pub struct AlgorithmEntry {
    /// The algorithm declaration.
    pub spec: AlgorithmSpec,
    /// All declared backends for this algorithm, reference included.
    pub implementations: Vec<ImplementationHandle>,
}

/// Resolution result for one backend.
pub struct ResolvedImplementation {
    /// Implementation tag.
    pub tag: &'static str,
    /// Whether the backend lives in the harness process.
    pub in_process: bool,
    /// The binding, or the captured failure.
    pub binding: Result<BoundCallable, BindingError>,
}

/// Resolution results for one algorithm, in declaration order.
pub struct ResolvedAlgorithm {
    /// The algorithm declaration.
    pub spec: AlgorithmSpec,
    /// Per-backend resolution results.
    pub implementations: Vec<ResolvedImplementation>,
}

/// The declared benchmark matrix plus the artifact search directory.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<AlgorithmEntry>,
    artifact_dir: PathBuf,
}

impl Registry {
    /// Create an empty registry resolving native artifacts under `artifact_dir`.
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Declare one algorithm and its backends.
    pub fn declare(&mut self, spec: AlgorithmSpec, implementations: Vec<ImplementationHandle>) {
        self.entries.push(AlgorithmEntry {
            spec,
            implementations,
        });
    }

    /// Declared entries, in declaration order.
    pub fn entries(&self) -> &[AlgorithmEntry] {
        &self.entries
    }

    /// Directory native artifacts are resolved against.
    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    /// Validate the declared matrix. Any error here is fatal and aborts the
    /// run before a single cell executes.
    pub fn check(&self) -> Result<(), MatrixError> {
        let mut algorithms = HashSet::new();
        for entry in &self.entries {
            let spec = &entry.spec;
            if !algorithms.insert(spec.name) {
                return Err(MatrixError::DuplicateAlgorithm {
                    algorithm: spec.name.to_string(),
                });
            }

            let mut tags = HashSet::new();
            for handle in &entry.implementations {
                if !tags.insert(handle.tag) {
                    return Err(MatrixError::DuplicateImplementation {
                        algorithm: spec.name.to_string(),
                        tag: handle.tag.to_string(),
                    });
                }
            }

            let reference = entry
                .implementations
                .iter()
                .find(|h| h.tag == spec.reference)
                .ok_or_else(|| MatrixError::MissingReference {
                    algorithm: spec.name.to_string(),
                    tag: spec.reference.to_string(),
                })?;
            if !reference.is_in_process() {
                return Err(MatrixError::ReferenceNotInProcess {
                    algorithm: spec.name.to_string(),
                    tag: spec.reference.to_string(),
                });
            }
            if !reference.signature_fits(spec.convention) {
                return Err(MatrixError::ReferenceSignature {
                    algorithm: spec.name.to_string(),
                    tag: spec.reference.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Bind one declared handle against this registry's artifact directory.
    ///
    /// Binding is idempotent; each call produces a fresh callable, so every
    /// benchmark cell can own its binding exclusively.
    pub fn bind_handle(
        &self,
        spec: &AlgorithmSpec,
        handle: &ImplementationHandle,
    ) -> Result<BoundCallable, BindingError> {
        bind(handle, spec.convention, &self.artifact_dir)
    }

    /// Attempt to bind every declared backend.
    ///
    /// Never fails for an individual entry: each failure is captured in the
    /// result and logged, so a developer missing one toolchain still gets a
    /// complete availability picture.
    pub fn resolve_all(&self) -> Vec<ResolvedAlgorithm> {
        self.entries
            .iter()
            .map(|entry| {
                let implementations = entry
                    .implementations
                    .iter()
                    .map(|handle| {
                        let binding = self.bind_handle(&entry.spec, handle);
                        if let Err(err) = &binding {
                            tracing::warn!(
                                algorithm = entry.spec.name,
                                implementation = handle.tag,
                                "backend unavailable: {}",
                                err
                            );
                        }
                        ResolvedImplementation {
                            tag: handle.tag,
                            in_process: handle.is_in_process(),
                            binding,
                        }
                    })
                    .collect();
                ResolvedAlgorithm {
                    spec: entry.spec.clone(),
                    implementations,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::InProcessFn;
    use crate::reference;
    use numbench_core::{CallConvention, EquivalencePolicy, ScenarioArgs};

    fn sieve_spec() -> AlgorithmSpec {
        AlgorithmSpec {
            name: "sieve",
            convention: CallConvention::BufferOut,
            policy: EquivalencePolicy::Exact,
            reference: "reference",
        }
    }

    fn reference_handle() -> ImplementationHandle {
        ImplementationHandle::in_process(
            "sieve",
            "reference",
            InProcessFn::Sequence(reference::sieve),
        )
    }

    #[test]
    fn missing_artifact_does_not_abort_resolution() {
        let mut registry = Registry::new("/nonexistent/artifacts");
        registry.declare(
            sieve_spec(),
            vec![
                reference_handle(),
                ImplementationHandle::native("sieve", "c", "sieve", "sieve_c"),
            ],
        );

        let resolved = registry.resolve_all();
        assert_eq!(resolved.len(), 1);
        let impls = &resolved[0].implementations;
        assert_eq!(impls.len(), 2);

        // The in-process reference still binds.
        assert!(impls[0].binding.is_ok());
        // The missing native backend is captured, not raised.
        assert!(matches!(
            impls[1].binding,
            Err(BindingError::ArtifactMissing(_))
        ));
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut registry = Registry::new(".");
        registry.declare(sieve_spec(), vec![reference_handle()]);

        for _ in 0..2 {
            let resolved = registry.resolve_all();
            let callable = resolved[0].implementations[0].binding.as_ref().unwrap();
            let output = callable.call(&ScenarioArgs::Size { n: 10 }).unwrap();
            assert_eq!(
                output,
                numbench_core::AlgoOutput::Sequence(vec![2, 3, 5, 7])
            );
        }
    }

    #[test]
    fn check_rejects_duplicate_tags() {
        let mut registry = Registry::new(".");
        registry.declare(
            sieve_spec(),
            vec![
                reference_handle(),
                ImplementationHandle::native("sieve", "c", "sieve", "sieve_c"),
                ImplementationHandle::native("sieve", "c", "sieve2", "sieve_c2"),
            ],
        );

        assert!(matches!(
            registry.check(),
            Err(MatrixError::DuplicateImplementation { .. })
        ));
    }

    #[test]
    fn check_rejects_missing_reference() {
        let mut registry = Registry::new(".");
        registry.declare(
            sieve_spec(),
            vec![ImplementationHandle::native("sieve", "c", "sieve", "sieve_c")],
        );

        assert!(matches!(
            registry.check(),
            Err(MatrixError::MissingReference { .. })
        ));
    }

    #[test]
    fn check_rejects_native_reference() {
        let mut registry = Registry::new(".");
        let mut spec = sieve_spec();
        spec.reference = "c";
        registry.declare(
            spec,
            vec![ImplementationHandle::native("sieve", "c", "sieve", "sieve_c")],
        );

        assert!(matches!(
            registry.check(),
            Err(MatrixError::ReferenceNotInProcess { .. })
        ));
    }

    #[test]
    fn check_rejects_reference_with_wrong_signature() {
        let mut registry = Registry::new(".");
        registry.declare(
            sieve_spec(),
            vec![ImplementationHandle::in_process(
                "sieve",
                "reference",
                InProcessFn::Scalar(reference::trapezoid),
            )],
        );

        assert!(matches!(
            registry.check(),
            Err(MatrixError::ReferenceSignature { .. })
        ));
    }

    #[test]
    fn check_accepts_a_well_formed_matrix() {
        let mut registry = Registry::new("artifacts");
        registry.declare(
            sieve_spec(),
            vec![
                reference_handle(),
                ImplementationHandle::native("sieve", "c", "sieve", "sieve_c"),
                ImplementationHandle::native("sieve", "rust", "sieve_rs", "sieve_rs"),
            ],
        );

        assert!(registry.check().is_ok());
    }
}
