//! Result Validation
//!
//! Compares a candidate backend's output against the reference output for
//! the identical input, under the algorithm's declared equivalence policy.
//! Validation runs before any timing; a failure excludes the pair from the
//! timed run but is retained in the report with its diagnostics.

use crate::{AlgoOutput, EquivalencePolicy};
use serde::{Deserialize, Serialize};

/// Pass/fail state of one equivalence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Candidate output is equivalent to the reference under the policy.
    Passed,
    /// Candidate output disagrees with the reference beyond the policy.
    Failed,
}

/// Outcome of validating one (implementation, scenario) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Pass or fail.
    pub status: ValidationStatus,
    /// Largest observed absolute deviation, where the comparison is numeric.
    pub max_deviation: Option<f64>,
    /// Human-readable expected-vs-actual diagnostic, present on failure.
    pub detail: Option<String>,
}

impl ValidationOutcome {
    /// A trivial pass, used for the reference implementation itself.
    pub fn passed() -> Self {
        Self {
            status: ValidationStatus::Passed,
            max_deviation: None,
            detail: None,
        }
    }

    fn passed_with_deviation(deviation: f64) -> Self {
        Self {
            status: ValidationStatus::Passed,
            max_deviation: Some(deviation),
            detail: None,
        }
    }

    fn failed(detail: String, deviation: Option<f64>) -> Self {
        Self {
            status: ValidationStatus::Failed,
            max_deviation: deviation,
            detail: Some(detail),
        }
    }

    /// Whether the check passed.
    pub fn is_pass(&self) -> bool {
        self.status == ValidationStatus::Passed
    }
}

/// Check a candidate output against the reference output.
///
/// Sequences are compared element-wise in order; scalars either bitwise
/// (`Exact`) or within the policy's epsilon (`Tolerance`). A shape mismatch
/// between candidate and reference is a failure, never a panic.
pub fn validate(
    candidate: &AlgoOutput,
    reference: &AlgoOutput,
    policy: EquivalencePolicy,
) -> ValidationOutcome {
    match (candidate, reference) {
        (AlgoOutput::Sequence(cand), AlgoOutput::Sequence(refr)) => match policy {
            EquivalencePolicy::Exact => validate_sequence_exact(cand, refr),
            EquivalencePolicy::Tolerance { epsilon } => {
                validate_sequence_tolerance(cand, refr, epsilon)
            }
        },
        (AlgoOutput::Scalar(cand), AlgoOutput::Scalar(refr)) => match policy {
            EquivalencePolicy::Exact => {
                if cand == refr {
                    ValidationOutcome::passed_with_deviation(0.0)
                } else {
                    let deviation = (cand - refr).abs();
                    ValidationOutcome::failed(
                        format!("expected {}, got {}", refr, cand),
                        Some(deviation),
                    )
                }
            }
            EquivalencePolicy::Tolerance { epsilon } => {
                let deviation = (cand - refr).abs();
                // A NaN deviation never satisfies the bound.
                if deviation <= epsilon {
                    ValidationOutcome::passed_with_deviation(deviation)
                } else {
                    ValidationOutcome::failed(
                        format!(
                            "expected {} within {:e}, got {} (deviation {:e})",
                            refr, epsilon, cand, deviation
                        ),
                        Some(deviation),
                    )
                }
            }
        },
        (cand, refr) => ValidationOutcome::failed(
            format!(
                "output shape mismatch: expected {}, got {}",
                refr.summary(),
                cand.summary()
            ),
            None,
        ),
    }
}

fn validate_sequence_exact(cand: &[i64], refr: &[i64]) -> ValidationOutcome {
    if cand.len() != refr.len() {
        return ValidationOutcome::failed(
            format!(
                "sequence length {} differs from reference length {}",
                cand.len(),
                refr.len()
            ),
            None,
        );
    }
    for (i, (c, r)) in cand.iter().zip(refr.iter()).enumerate() {
        if c != r {
            return ValidationOutcome::failed(
                format!("first divergence at index {}: expected {}, got {}", i, r, c),
                Some((c - r).abs() as f64),
            );
        }
    }
    ValidationOutcome::passed_with_deviation(0.0)
}

fn validate_sequence_tolerance(cand: &[i64], refr: &[i64], epsilon: f64) -> ValidationOutcome {
    if cand.len() != refr.len() {
        return ValidationOutcome::failed(
            format!(
                "sequence length {} differs from reference length {}",
                cand.len(),
                refr.len()
            ),
            None,
        );
    }
    let mut max_deviation = 0.0f64;
    let mut first_excess: Option<(usize, i64, i64)> = None;
    for (i, (c, r)) in cand.iter().zip(refr.iter()).enumerate() {
        let deviation = (*c - *r).abs() as f64;
        if deviation > max_deviation {
            max_deviation = deviation;
        }
        if deviation > epsilon && first_excess.is_none() {
            first_excess = Some((i, *r, *c));
        }
    }
    match first_excess {
        None => ValidationOutcome::passed_with_deviation(max_deviation),
        Some((i, r, c)) => ValidationOutcome::failed(
            format!(
                "element {} deviates beyond {:e}: expected {}, got {}",
                i, epsilon, r, c
            ),
            Some(max_deviation),
        ),
    }
}
