#![warn(missing_docs)]
//! # Numbench
//!
//! Cross-implementation micro-benchmark harness: runs the same numerical
//! algorithm across independently compiled backends (C, C++, Rust cdylib,
//! in-process Rust), measures wall-clock performance under controlled
//! repetition, and validates every backend against a trusted reference
//! implementation before it is timed.
//!
//! - **Declared matrix**: backends and scenarios are data, resolved eagerly;
//!   a missing toolchain shows up as an unavailable row, never a crashed run
//! - **Validate before timing**: every backend must reproduce the reference
//!   output on the identical input before it is eligible for timing
//! - **Sequential timing**: timed regions never overlap; each cell runs
//!   warmup and measurement on one dedicated thread with a wall-time budget
//! - **Structured results**: one record per cell, rendered as JSON or
//!   human-readable text
//!
//! ## Quick Start
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     numbench::run()
//! }
//! ```

// Re-export core types
pub use numbench_core::{
    run_repetitions, validate, AlgoOutput, AlgorithmSpec, CallConvention, EquivalencePolicy,
    ExecutionError, InputScenario, MatrixError, RepetitionPolicy, ScenarioArgs, Timer,
    TimingSample, ValidationOutcome, ValidationStatus,
};

// Re-export backend binding and registry
pub use numbench_backend::{
    artifact_path, bind, reference, BenchUnit, BindingError, BoundCallable, ImplKind,
    ImplementationHandle, InProcessFn, Registry, ResolvedAlgorithm, ResolvedImplementation,
};

// Re-export stats
pub use numbench_stats::{compute_percentile, compute_summary, SummaryStatistics};

// Re-export report types
pub use numbench_report::{
    format_duration, format_human_output, generate_json_report, CellStatus, OutputFormat, Report,
    ReportMeta, ReportRecord, ReportSummary,
};

// Re-export the CLI surface
pub use numbench_cli::{
    standard_registry, standard_scenarios, BenchConfig, Cli, Suite, SuiteConfig,
};

/// Run the numbench CLI harness.
///
/// Call this from the harness binary's `main()`.
pub use numbench_cli::run;
