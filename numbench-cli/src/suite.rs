//! Benchmark Suite
//!
//! Drives the full matrix of algorithm × implementation × scenario.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Registry (declared matrix)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  preflight  │  Reject malformed declarations before any cell runs
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   execute   │  Per cell: bind → validate → warmup → timed iterations
//! └──────┬──────┘     (strictly sequential; timed regions never overlap)
//!        │
//!        ▼
//! ┌─────────────┐
//! │  assemble   │  Summary statistics (parallel) + report records
//! └─────────────┘
//! ```
//!
//! Per-cell failures never propagate past the cell: the suite always
//! completes and returns a record for every planned cell.

use crate::panic_message;
use indicatif::{ProgressBar, ProgressStyle};
use numbench_backend::{BenchUnit, BoundCallable, ImplementationHandle, Registry};
use numbench_core::{
    validate, AlgoOutput, AlgorithmSpec, EquivalencePolicy, ExecutionError, InputScenario,
    MatrixError, RepetitionPolicy, TimingSample, ValidationOutcome,
};
use numbench_report::{CellStatus, ReportRecord};
use numbench_stats::compute_summary;
use rayon::prelude::*;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Suite execution settings.
#[derive(Debug)]
pub struct SuiteConfig {
    /// Warmup/repeat counts applied to every cell.
    pub policy: RepetitionPolicy,
    /// Wall-time budget per cell; an overrun abandons the cell.
    pub cell_timeout: Duration,
    /// Fraction trimmed from each tail for central-tendency statistics.
    pub trim_fraction: f64,
    /// Optional regex over `algorithm/implementation`; non-matching
    /// candidate cells are left out of the plan. The reference always runs.
    pub filter: Option<Regex>,
    /// Render a progress bar while executing.
    pub show_progress: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            policy: RepetitionPolicy::default(),
            cell_timeout: Duration::from_secs(30),
            trim_fraction: 0.0,
            filter: None,
            show_progress: false,
        }
    }
}

/// The benchmark suite driver.
pub struct Suite {
    config: SuiteConfig,
}

/// One planned cell, in deterministic execution order.
struct PlannedCell<'a> {
    spec: &'a AlgorithmSpec,
    handle: &'a ImplementationHandle,
    scenario: &'a InputScenario,
    entry_idx: usize,
    scenario_idx: usize,
    is_reference: bool,
}

/// Execution result for one cell, before the statistics pass.
struct CellOutcome {
    algorithm: String,
    implementation: String,
    scenario: String,
    is_reference: bool,
    status: CellStatus,
    validation: Option<ValidationOutcome>,
    samples_ns: Vec<f64>,
    error: Option<String>,
}

/// What happened inside one cell's worker.
enum CellVerdict {
    /// Validated and timed.
    Measured {
        validation: ValidationOutcome,
        sample: TimingSample,
    },
    /// Output disagreed with the reference; not timed.
    Rejected { validation: ValidationOutcome },
    /// The backend failed, panicked or timed out.
    Failed {
        validation: Option<ValidationOutcome>,
        error: String,
    },
}

impl Suite {
    /// Create a suite with the given settings.
    pub fn new(config: SuiteConfig) -> Self {
        Self { config }
    }

    /// Run the full matrix and return one record per planned cell.
    ///
    /// Only declaration-time malformation returns an error; everything that
    /// goes wrong inside a cell is captured in that cell's record.
    pub fn run(
        &self,
        registry: &Registry,
        scenarios: &HashMap<String, Vec<InputScenario>>,
    ) -> Result<Vec<ReportRecord>, MatrixError> {
        self.preflight(registry, scenarios)?;
        let plan = self.plan(registry, scenarios);
        let outcomes = self.execute(registry, &plan);
        Ok(self.assemble(outcomes))
    }

    /// Reject ill-formed declarations before a single cell runs.
    fn preflight(
        &self,
        registry: &Registry,
        scenarios: &HashMap<String, Vec<InputScenario>>,
    ) -> Result<(), MatrixError> {
        if self.config.policy.repeat_iterations == 0 {
            return Err(MatrixError::ZeroRepetitions);
        }
        registry.check()?;

        for entry in registry.entries() {
            let spec = &entry.spec;
            let Some(list) = scenarios.get(spec.name) else {
                continue;
            };
            let mut labels = HashSet::new();
            for scenario in list {
                if !labels.insert(scenario.label.as_str()) {
                    return Err(MatrixError::DuplicateScenario {
                        algorithm: spec.name.to_string(),
                        label: scenario.label.clone(),
                    });
                }
                if !scenario.args.matches(spec.convention) {
                    return Err(MatrixError::ConventionMismatch {
                        algorithm: spec.name.to_string(),
                        label: scenario.label.clone(),
                        convention: spec.convention,
                    });
                }
            }
        }
        Ok(())
    }

    /// Lay out cells in execution order: per scenario, the reference first
    /// (its output anchors every candidate check), then the candidates in
    /// declaration order.
    fn plan<'a>(
        &self,
        registry: &'a Registry,
        scenarios: &'a HashMap<String, Vec<InputScenario>>,
    ) -> Vec<PlannedCell<'a>> {
        let mut plan = Vec::new();
        for (entry_idx, entry) in registry.entries().iter().enumerate() {
            let spec = &entry.spec;
            let Some(list) = scenarios.get(spec.name) else {
                continue;
            };
            for (scenario_idx, scenario) in list.iter().enumerate() {
                if let Some(reference) = entry
                    .implementations
                    .iter()
                    .find(|h| h.tag == spec.reference)
                {
                    plan.push(PlannedCell {
                        spec,
                        handle: reference,
                        scenario,
                        entry_idx,
                        scenario_idx,
                        is_reference: true,
                    });
                }
                for handle in &entry.implementations {
                    if handle.tag == spec.reference {
                        continue;
                    }
                    if let Some(re) = &self.config.filter {
                        if !re.is_match(&format!("{}/{}", spec.name, handle.tag)) {
                            continue;
                        }
                    }
                    plan.push(PlannedCell {
                        spec,
                        handle,
                        scenario,
                        entry_idx,
                        scenario_idx,
                        is_reference: false,
                    });
                }
            }
        }
        plan
    }

    /// Execute every planned cell, strictly sequentially.
    fn execute(&self, registry: &Registry, plan: &[PlannedCell<'_>]) -> Vec<CellOutcome> {
        let pb = if self.config.show_progress {
            let pb = ProgressBar::new(plan.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut reference_outputs: HashMap<(usize, usize), AlgoOutput> = HashMap::new();
        let mut outcomes = Vec::with_capacity(plan.len());

        for cell in plan {
            pb.set_message(format!(
                "{}/{} {}",
                cell.spec.name, cell.handle.tag, cell.scenario.label
            ));
            outcomes.push(self.execute_cell(registry, cell, &mut reference_outputs));
            pb.inc(1);
        }

        pb.finish_with_message("Complete");
        outcomes
    }

    fn execute_cell(
        &self,
        registry: &Registry,
        cell: &PlannedCell<'_>,
        reference_outputs: &mut HashMap<(usize, usize), AlgoOutput>,
    ) -> CellOutcome {
        let base = |status, validation, samples_ns, error| CellOutcome {
            algorithm: cell.spec.name.to_string(),
            implementation: cell.handle.tag.to_string(),
            scenario: cell.scenario.label.clone(),
            is_reference: cell.is_reference,
            status,
            validation,
            samples_ns,
            error,
        };

        let callable = match registry.bind_handle(cell.spec, cell.handle) {
            Ok(callable) => callable,
            Err(err) => {
                tracing::warn!(
                    algorithm = cell.spec.name,
                    implementation = cell.handle.tag,
                    "backend unavailable: {}",
                    err
                );
                return base(
                    CellStatus::Unavailable,
                    None,
                    Vec::new(),
                    Some(err.to_string()),
                );
            }
        };

        let key = (cell.entry_idx, cell.scenario_idx);
        let expected = if cell.is_reference {
            None
        } else {
            match reference_outputs.get(&key) {
                Some(output) => Some(output.clone()),
                None => {
                    return base(
                        CellStatus::Skipped,
                        None,
                        Vec::new(),
                        Some("no reference output to validate against".to_string()),
                    );
                }
            }
        };

        let policy = cell.spec.effective_policy(cell.scenario);
        let cell_id = format!(
            "{}/{}/{}",
            cell.spec.name, cell.handle.tag, cell.scenario.label
        );
        let (verdict, observed) =
            self.run_cell(cell_id, callable, cell.scenario.clone(), policy, expected);

        if cell.is_reference {
            if let Some(output) = observed {
                reference_outputs.insert(key, output);
            }
        }

        match verdict {
            CellVerdict::Measured { validation, sample } => base(
                CellStatus::Measured,
                Some(validation),
                sample.as_nanos_f64(),
                None,
            ),
            CellVerdict::Rejected { validation } => {
                base(CellStatus::ValidationFailed, Some(validation), Vec::new(), None)
            }
            CellVerdict::Failed { validation, error } => base(
                CellStatus::ExecutionFailed,
                validation,
                Vec::new(),
                Some(error),
            ),
        }
    }

    /// Run one cell on a dedicated worker thread, bounding its wall time.
    ///
    /// Warmup and timed iterations happen on that one thread with nothing
    /// interleaved. A cell that outlives its budget is abandoned (the thread
    /// is detached, never joined): a wedged native call cannot be unwound
    /// safely from the outside.
    fn run_cell(
        &self,
        cell_id: String,
        callable: BoundCallable,
        scenario: InputScenario,
        policy: EquivalencePolicy,
        expected: Option<AlgoOutput>,
    ) -> (CellVerdict, Option<AlgoOutput>) {
        let repetition = self.config.policy;
        let timeout = self.config.cell_timeout;

        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new().name(cell_id.clone()).spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                cell_body(callable, scenario, repetition, policy, expected)
            }));
            let _ = tx.send(result);
        });

        let worker = match worker {
            Ok(handle) => handle,
            Err(e) => {
                return (
                    CellVerdict::Failed {
                        validation: None,
                        error: format!("failed to spawn cell worker: {}", e),
                    },
                    None,
                );
            }
        };

        match rx.recv_timeout(timeout) {
            Ok(Ok((verdict, observed))) => {
                let _ = worker.join();
                (verdict, observed)
            }
            Ok(Err(payload)) => {
                let _ = worker.join();
                (
                    CellVerdict::Failed {
                        validation: None,
                        error: ExecutionError::Panicked(panic_message(payload)).to_string(),
                    },
                    None,
                )
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(cell = %cell_id, "cell abandoned after {:?}", timeout);
                (
                    CellVerdict::Failed {
                        validation: None,
                        error: ExecutionError::TimedOut { limit: timeout }.to_string(),
                    },
                    None,
                )
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => (
                CellVerdict::Failed {
                    validation: None,
                    error: "cell worker terminated without reporting".to_string(),
                },
                None,
            ),
        }
    }

    /// Compute per-cell statistics (parallel) and emit the final records.
    fn assemble(&self, outcomes: Vec<CellOutcome>) -> Vec<ReportRecord> {
        let trim = self.config.trim_fraction;
        outcomes
            .into_par_iter()
            .map(|cell| {
                let timing = if cell.samples_ns.is_empty() {
                    None
                } else {
                    Some(compute_summary(&cell.samples_ns, trim))
                };
                ReportRecord {
                    algorithm: cell.algorithm,
                    implementation: cell.implementation,
                    scenario: cell.scenario,
                    is_reference: cell.is_reference,
                    status: cell.status,
                    validation: cell.validation,
                    timing,
                    error: cell.error,
                }
            })
            .collect()
    }
}

/// Body of one cell, run on its worker thread: one untimed invocation for
/// the equivalence check, then the warmup/repeat loop.
fn cell_body(
    callable: BoundCallable,
    scenario: InputScenario,
    repetition: RepetitionPolicy,
    policy: EquivalencePolicy,
    expected: Option<AlgoOutput>,
) -> (CellVerdict, Option<AlgoOutput>) {
    let mut unit = BenchUnit::new(callable, scenario, repetition);

    let observed = match unit.probe() {
        Ok(output) => output,
        Err(e) => {
            return (
                CellVerdict::Failed {
                    validation: None,
                    error: e.to_string(),
                },
                None,
            );
        }
    };

    // The reference is never validated against anything.
    let validation = match &expected {
        Some(reference) => validate(&observed, reference, policy),
        None => ValidationOutcome::passed(),
    };
    if !validation.is_pass() {
        return (CellVerdict::Rejected { validation }, Some(observed));
    }

    match unit.run() {
        Ok(sample) => (
            CellVerdict::Measured { validation, sample },
            Some(observed),
        ),
        Err(e) => (
            CellVerdict::Failed {
                validation: Some(validation),
                error: e.to_string(),
            },
            Some(observed),
        ),
    }
}
