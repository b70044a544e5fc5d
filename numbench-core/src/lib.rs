#![warn(missing_docs)]
//! Numbench Core - Benchmark Matrix Types and Execution
//!
//! This crate provides the shared vocabulary of the harness:
//! - Algorithm and scenario declarations (`AlgorithmSpec`, `InputScenario`)
//! - Wall-clock timing (`Timer`)
//! - The warmup/repeat measurement loop (`run_repetitions`)
//! - Output equivalence checking (`validate`)
//! - The error taxonomy shared across crates

mod error;
mod measure;
mod runner;
mod validate;

pub use error::{ExecutionError, MatrixError};
pub use measure::Timer;
pub use runner::{run_repetitions, TimingSample};
pub use validate::{validate, ValidationOutcome, ValidationStatus};

use serde::{Deserialize, Serialize};

/// Native calling convention an algorithm's backends must satisfy.
///
/// Each `AlgorithmSpec` declares exactly one convention; every backend of
/// that algorithm, native or in-process, is bound through the matching
/// adapter rather than per-backend special cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallConvention {
    /// `(int n, int *out) -> int count` - variable-length sequence output
    /// written into a caller-allocated buffer, sliced to the returned count.
    BufferOut,
    /// `(double a, double b, int n) -> double` - fixed-shape scalar output.
    ScalarReturn,
}

/// Equivalence rule used when a candidate output is checked against the
/// reference output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EquivalencePolicy {
    /// Element-wise ordered equality. Order and duplicates matter.
    Exact,
    /// Absolute difference bounded by `epsilon`.
    Tolerance {
        /// Maximum allowed absolute deviation from the reference.
        epsilon: f64,
    },
}

/// Declared identity and shape of one benchmarked algorithm family.
///
/// Immutable, defined once at startup. The benchmark matrix is data: every
/// implementation and scenario hangs off one of these declarations.
#[derive(Debug, Clone)]
pub struct AlgorithmSpec {
    /// Algorithm family name, e.g. `"sieve"`.
    pub name: &'static str,
    /// Calling convention all backends of this algorithm follow.
    pub convention: CallConvention,
    /// Default equivalence policy for this algorithm's output shape.
    pub policy: EquivalencePolicy,
    /// Implementation tag designated as the trusted reference.
    pub reference: &'static str,
}

impl AlgorithmSpec {
    /// Resolve the equivalence policy for one scenario, honouring a
    /// per-scenario tolerance override.
    pub fn effective_policy(&self, scenario: &InputScenario) -> EquivalencePolicy {
        match (self.policy, scenario.tolerance_override) {
            (EquivalencePolicy::Tolerance { .. }, Some(epsilon)) => {
                EquivalencePolicy::Tolerance { epsilon }
            }
            (policy, _) => policy,
        }
    }
}

/// Argument tuple for one benchmark invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScenarioArgs {
    /// Upper bound for sequence-producing algorithms (sieve family).
    Size {
        /// Inclusive upper bound of the search range.
        n: u64,
    },
    /// Integration bounds and subinterval count (quadrature family).
    Interval {
        /// Lower integration bound.
        a: f64,
        /// Upper integration bound.
        b: f64,
        /// Number of subintervals.
        n: u64,
    },
}

impl ScenarioArgs {
    /// Whether this argument shape fits the given calling convention.
    pub fn matches(&self, convention: CallConvention) -> bool {
        matches!(
            (self, convention),
            (ScenarioArgs::Size { .. }, CallConvention::BufferOut)
                | (ScenarioArgs::Interval { .. }, CallConvention::ScalarReturn)
        )
    }
}

/// A named, fixed input instance for an algorithm.
///
/// Immutable and reused across all implementations of the same algorithm,
/// so every backend is exercised on the identical input.
#[derive(Debug, Clone)]
pub struct InputScenario {
    /// Display label, e.g. `"n=100000"`.
    pub label: String,
    /// The argument tuple passed to every backend.
    pub args: ScenarioArgs,
    /// Optional equivalence tolerance override for this input.
    pub tolerance_override: Option<f64>,
}

impl InputScenario {
    /// Scenario for a sequence-producing algorithm with upper bound `n`.
    pub fn sized(n: u64) -> Self {
        Self {
            label: format!("n={}", n),
            args: ScenarioArgs::Size { n },
            tolerance_override: None,
        }
    }

    /// Scenario for a quadrature algorithm over `[a, b]` with `n` subintervals.
    pub fn interval(a: f64, b: f64, n: u64) -> Self {
        Self {
            label: format!("n={}", n),
            args: ScenarioArgs::Interval { a, b, n },
            tolerance_override: None,
        }
    }

    /// Attach a tolerance override to this scenario.
    pub fn with_tolerance(mut self, epsilon: f64) -> Self {
        self.tolerance_override = Some(epsilon);
        self
    }
}

/// Repetition policy for one benchmark cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepetitionPolicy {
    /// Untimed invocations run before measurement to absorb one-time costs.
    pub warmup_iterations: u32,
    /// Timed invocations recorded into the sample. Must be at least 1.
    pub repeat_iterations: u32,
}

impl Default for RepetitionPolicy {
    fn default() -> Self {
        Self {
            warmup_iterations: 1,
            repeat_iterations: 5,
        }
    }
}

/// Observable output of one backend invocation, normalized across
/// calling conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlgoOutput {
    /// Ordered discrete output, e.g. the primes up to `n`.
    Sequence(Vec<i64>),
    /// Floating-point scalar output, e.g. an integral estimate.
    Scalar(f64),
}

impl AlgoOutput {
    /// Short rendering for diagnostics; long sequences are truncated.
    pub fn summary(&self) -> String {
        match self {
            AlgoOutput::Scalar(v) => format!("{}", v),
            AlgoOutput::Sequence(items) => {
                const SHOWN: usize = 8;
                if items.len() <= SHOWN {
                    format!("{:?}", items)
                } else {
                    let head: Vec<String> =
                        items[..SHOWN].iter().map(|v| v.to_string()).collect();
                    format!("[{}, ... {} total]", head.join(", "), items.len())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_policy_honours_scenario_override() {
        let spec = AlgorithmSpec {
            name: "trapezoid",
            convention: CallConvention::ScalarReturn,
            policy: EquivalencePolicy::Tolerance { epsilon: 1e-8 },
            reference: "reference",
        };

        let plain = InputScenario::interval(0.0, 1.0, 1000);
        assert_eq!(
            spec.effective_policy(&plain),
            EquivalencePolicy::Tolerance { epsilon: 1e-8 }
        );

        let loosened = InputScenario::interval(0.0, 1.0, 4_000_000).with_tolerance(1e-6);
        assert_eq!(
            spec.effective_policy(&loosened),
            EquivalencePolicy::Tolerance { epsilon: 1e-6 }
        );
    }

    #[test]
    fn override_never_loosens_exact_policies() {
        let spec = AlgorithmSpec {
            name: "sieve",
            convention: CallConvention::BufferOut,
            policy: EquivalencePolicy::Exact,
            reference: "reference",
        };

        let scenario = InputScenario::sized(10).with_tolerance(1.0);
        assert_eq!(spec.effective_policy(&scenario), EquivalencePolicy::Exact);
    }

    #[test]
    fn args_match_their_convention() {
        let size = ScenarioArgs::Size { n: 10 };
        let interval = ScenarioArgs::Interval {
            a: 0.0,
            b: 1.0,
            n: 100,
        };

        assert!(size.matches(CallConvention::BufferOut));
        assert!(!size.matches(CallConvention::ScalarReturn));
        assert!(interval.matches(CallConvention::ScalarReturn));
        assert!(!interval.matches(CallConvention::BufferOut));
    }

    #[test]
    fn output_summary_truncates_long_sequences() {
        let short = AlgoOutput::Sequence(vec![2, 3, 5, 7]);
        assert_eq!(short.summary(), "[2, 3, 5, 7]");

        let long = AlgoOutput::Sequence((0..100).collect());
        let rendered = long.summary();
        assert!(rendered.contains("100 total"));
    }
}
