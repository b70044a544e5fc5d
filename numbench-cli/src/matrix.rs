//! Standard Benchmark Matrix
//!
//! Declares the shipped algorithms and their expected backends. The matrix
//! is data: adding a backend means adding a handle here, not new control
//! flow. Artifact stems and symbol names follow the build layout of the
//! backend toolchains.

use crate::config::BenchConfig;
use numbench_backend::{reference, ImplementationHandle, InProcessFn, Registry};
use numbench_core::{AlgorithmSpec, CallConvention, EquivalencePolicy, InputScenario};
use std::collections::HashMap;
use std::path::Path;

/// Algorithm name for the prime sieve family.
pub const SIEVE: &str = "sieve";
/// Algorithm name for the trapezoidal integration family.
pub const TRAPEZOID: &str = "trapezoid";

/// Declare the standard (algorithm, implementation) matrix.
pub fn standard_registry(config: &BenchConfig, artifact_dir: &Path) -> Registry {
    let mut registry = Registry::new(artifact_dir);

    registry.declare(
        AlgorithmSpec {
            name: SIEVE,
            convention: CallConvention::BufferOut,
            policy: EquivalencePolicy::Exact,
            reference: "reference",
        },
        vec![
            ImplementationHandle::in_process(
                SIEVE,
                "reference",
                InProcessFn::Sequence(reference::sieve),
            ),
            ImplementationHandle::native(SIEVE, "c", "sieve", "sieve_c"),
            ImplementationHandle::native(SIEVE, "cpp", "sieve_cpp", "sieve_cpp"),
            ImplementationHandle::native(SIEVE, "rust", "sieve_rs", "sieve_rs"),
        ],
    );

    registry.declare(
        AlgorithmSpec {
            name: TRAPEZOID,
            convention: CallConvention::ScalarReturn,
            policy: EquivalencePolicy::Tolerance {
                epsilon: config.scenarios.trapezoid.tolerance,
            },
            reference: "reference",
        },
        vec![
            ImplementationHandle::in_process(
                TRAPEZOID,
                "reference",
                InProcessFn::Scalar(reference::trapezoid),
            ),
            ImplementationHandle::native(TRAPEZOID, "c", "trapezoid", "trapezoid"),
            ImplementationHandle::native(TRAPEZOID, "cpp", "trapezoid_cpp", "trapezoid_cpp"),
            ImplementationHandle::native(TRAPEZOID, "rust", "trapezoid_rs", "trapezoid_rs"),
        ],
    );

    registry
}

/// Build the input scenarios for the standard matrix from resolved
/// configuration values.
pub fn standard_scenarios(config: &BenchConfig) -> HashMap<String, Vec<InputScenario>> {
    let mut scenarios = HashMap::new();

    scenarios.insert(
        SIEVE.to_string(),
        config
            .scenarios
            .sieve
            .sizes
            .iter()
            .map(|&n| InputScenario::sized(n))
            .collect(),
    );

    let trap = &config.scenarios.trapezoid;
    scenarios.insert(
        TRAPEZOID.to_string(),
        trap.subintervals
            .iter()
            .map(|&n| {
                let scenario = InputScenario::interval(trap.lower, trap.upper, n);
                match trap
                    .tolerance_overrides
                    .iter()
                    .find(|o| o.subintervals == n)
                {
                    Some(o) => scenario.with_tolerance(o.epsilon),
                    None => scenario,
                }
            })
            .collect(),
    );

    scenarios
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToleranceOverride;

    #[test]
    fn standard_matrix_is_well_formed() {
        let config = BenchConfig::default();
        let registry = standard_registry(&config, Path::new("artifacts"));

        assert!(registry.check().is_ok());
        assert_eq!(registry.entries().len(), 2);
        // Reference plus three native backends per algorithm.
        for entry in registry.entries() {
            assert_eq!(entry.implementations.len(), 4);
        }
    }

    #[test]
    fn scenarios_cover_every_declared_algorithm() {
        let config = BenchConfig::default();
        let registry = standard_registry(&config, Path::new("artifacts"));
        let scenarios = standard_scenarios(&config);

        for entry in registry.entries() {
            let list = scenarios.get(entry.spec.name).unwrap();
            assert!(!list.is_empty());
        }
    }

    #[test]
    fn tolerance_overrides_attach_to_their_scenario() {
        let mut config = BenchConfig::default();
        config.scenarios.trapezoid.tolerance_overrides = vec![ToleranceOverride {
            subintervals: 4_000_000,
            epsilon: 1e-6,
        }];

        let scenarios = standard_scenarios(&config);
        let trapezoid = scenarios.get(TRAPEZOID).unwrap();

        let overridden = trapezoid.iter().find(|s| s.label == "n=4000000").unwrap();
        assert_eq!(overridden.tolerance_override, Some(1e-6));

        let plain = trapezoid.iter().find(|s| s.label == "n=10").unwrap();
        assert_eq!(plain.tolerance_override, None);
    }
}
