//! Measurement Loop
//!
//! Runs one benchmark cell: warmup invocations whose results and timings are
//! discarded, followed by a fixed number of timed invocations. Correctness is
//! not re-checked here; a cell reaches this loop only after validation.

use crate::measure::Timer;
use crate::{AlgoOutput, ExecutionError, RepetitionPolicy, ScenarioArgs};
use std::time::Duration;

/// Ordered per-iteration elapsed durations for one benchmark cell.
///
/// Produced once per run and never mutated after collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingSample {
    durations: Vec<Duration>,
}

impl TimingSample {
    fn new(durations: Vec<Duration>) -> Self {
        Self { durations }
    }

    /// The recorded durations, in collection order.
    pub fn durations(&self) -> &[Duration] {
        &self.durations
    }

    /// Number of timed iterations recorded.
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Whether the sample holds no iterations.
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Durations as nanoseconds, for the statistics pass.
    pub fn as_nanos_f64(&self) -> Vec<f64> {
        self.durations
            .iter()
            .map(|d| d.as_nanos() as f64)
            .collect()
    }
}

/// Run the warmup/repeat loop for one cell and collect its timing sample.
///
/// Invokes the callable `warmup_iterations` times untimed, then exactly
/// `repeat_iterations` times with per-call wall-clock timing. Any error from
/// the callable aborts the run with zero samples; partial timings are
/// discarded rather than reported.
pub fn run_repetitions<F>(
    mut invoke: F,
    args: &ScenarioArgs,
    policy: RepetitionPolicy,
) -> Result<TimingSample, ExecutionError>
where
    F: FnMut(&ScenarioArgs) -> Result<AlgoOutput, ExecutionError>,
{
    // Warmup absorbs one-time costs: lazy loading, cache and allocator warmup.
    for _ in 0..policy.warmup_iterations {
        let _ = std::hint::black_box(invoke(args)?);
    }

    let mut durations = Vec::with_capacity(policy.repeat_iterations as usize);
    for _ in 0..policy.repeat_iterations {
        let timer = Timer::start();
        let output = invoke(args);
        let elapsed = timer.stop();
        let _ = std::hint::black_box(output?);
        durations.push(elapsed);
    }

    Ok(TimingSample::new(durations))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_invoke(counter: &mut u32) -> impl FnMut(&ScenarioArgs) -> Result<AlgoOutput, ExecutionError> + '_ {
        move |_args| {
            *counter += 1;
            Ok(AlgoOutput::Scalar(42.0))
        }
    }

    #[test]
    fn warmup_iterations_are_not_recorded() {
        let mut calls = 0;
        let sample = run_repetitions(
            counting_invoke(&mut calls),
            &ScenarioArgs::Size { n: 10 },
            RepetitionPolicy {
                warmup_iterations: 5,
                repeat_iterations: 20,
            },
        )
        .unwrap();

        // Exactly the timed iterations appear in the sample, never 25.
        assert_eq!(sample.len(), 20);
        assert_eq!(calls, 25);
    }

    #[test]
    fn zero_warmup_is_allowed() {
        let mut calls = 0;
        let sample = run_repetitions(
            counting_invoke(&mut calls),
            &ScenarioArgs::Size { n: 10 },
            RepetitionPolicy {
                warmup_iterations: 0,
                repeat_iterations: 3,
            },
        )
        .unwrap();

        assert_eq!(sample.len(), 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn error_during_timed_run_discards_partial_sample() {
        let mut calls = 0;
        let result = run_repetitions(
            |_args| {
                calls += 1;
                if calls == 3 {
                    Err(ExecutionError::CallFailed("flaky backend".to_string()))
                } else {
                    Ok(AlgoOutput::Scalar(1.0))
                }
            },
            &ScenarioArgs::Size { n: 10 },
            RepetitionPolicy {
                warmup_iterations: 0,
                repeat_iterations: 10,
            },
        );

        match result {
            Err(ExecutionError::CallFailed(msg)) => assert!(msg.contains("flaky")),
            other => panic!("expected CallFailed, got {:?}", other),
        }
    }

    #[test]
    fn error_during_warmup_aborts_the_run() {
        let result = run_repetitions(
            |_args| Err::<AlgoOutput, _>(ExecutionError::CallFailed("broken".to_string())),
            &ScenarioArgs::Size { n: 10 },
            RepetitionPolicy {
                warmup_iterations: 1,
                repeat_iterations: 5,
            },
        );

        assert!(result.is_err());
    }

    #[test]
    fn durations_are_ordered_and_nonzero_length() {
        let sample = run_repetitions(
            |_args| Ok(AlgoOutput::Sequence(vec![2, 3, 5, 7])),
            &ScenarioArgs::Size { n: 10 },
            RepetitionPolicy {
                warmup_iterations: 1,
                repeat_iterations: 4,
            },
        )
        .unwrap();

        assert_eq!(sample.durations().len(), 4);
        assert_eq!(sample.as_nanos_f64().len(), 4);
    }
}
