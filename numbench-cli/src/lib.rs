#![warn(missing_docs)]
//! Numbench CLI
//!
//! Command-line entry point for the harness. `run()` wires together
//! configuration discovery, the standard benchmark matrix, the suite driver
//! and report rendering.

mod config;
mod matrix;
mod suite;

pub use config::{
    ArtifactsConfig, BenchConfig, OutputConfig, RunnerConfig, ScenariosConfig, SieveScenarios,
    ToleranceOverride, TrapezoidScenarios,
};
pub use matrix::{standard_registry, standard_scenarios, SIEVE, TRAPEZOID};
pub use suite::{Suite, SuiteConfig};

use chrono::Utc;
use clap::{Parser, Subcommand};
use numbench_backend::Registry;
use numbench_core::RepetitionPolicy;
use numbench_report::{
    format_human_output, generate_json_report, OutputFormat, Report, ReportMeta,
};
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;

/// Numbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "numbench")]
#[command(author, version, about = "Cross-implementation numeric benchmark harness")]
pub struct Cli {
    /// Optional subcommand (List, Run); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter candidate cells by regex over `algorithm/implementation`
    #[arg(default_value = ".*")]
    pub filter: String,

    /// Output format: json, human
    #[arg(long, default_value = "human")]
    pub format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Untimed warmup invocations per cell
    #[arg(long)]
    pub warmup: Option<u32>,

    /// Timed invocations per cell
    #[arg(long)]
    pub repeats: Option<u32>,

    /// Directory holding the compiled backend artifacts
    #[arg(long)]
    pub artifact_dir: Option<PathBuf>,

    /// Wall-time budget per cell, in seconds
    #[arg(long)]
    pub cell_timeout: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the declared matrix and backend availability
    List,
    /// Run the benchmark suite (default)
    Run,
}

/// Run the numbench CLI. This is the main entry point for the harness binary.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the numbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("numbench=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("numbench=info")
            .init();
    }

    // Discover numbench.toml configuration (CLI flags override)
    let config = BenchConfig::discover().unwrap_or_default();

    let artifact_dir = cli
        .artifact_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.artifacts.directory));
    let registry = standard_registry(&config, &artifact_dir);

    match cli.command {
        Some(Commands::List) => list_backends(&registry),
        Some(Commands::Run) | None => run_suite(&cli, &config, &registry),
    }
}

/// Print the declared matrix with per-backend availability.
fn list_backends(registry: &Registry) -> anyhow::Result<()> {
    println!("numbench matrix:");

    let mut available = 0;
    let mut total = 0;
    for resolved in registry.resolve_all() {
        println!("├── algorithm: {}", resolved.spec.name);
        for imp in &resolved.implementations {
            total += 1;
            let kind = if imp.in_process { "in-process" } else { "native" };
            match &imp.binding {
                Ok(_) => {
                    available += 1;
                    println!("│   ├── {} ({}) ok", imp.tag, kind);
                }
                Err(err) => {
                    println!("│   ├── {} ({}) unavailable: {}", imp.tag, kind, err);
                }
            }
        }
    }

    println!("{}/{} backends available.", available, total);
    Ok(())
}

/// Build the suite settings by layering: numbench.toml defaults → CLI overrides.
fn build_suite_config(cli: &Cli, config: &BenchConfig) -> SuiteConfig {
    let policy = RepetitionPolicy {
        warmup_iterations: cli.warmup.unwrap_or(config.runner.warmup_iterations),
        repeat_iterations: cli.repeats.unwrap_or(config.runner.repeat_iterations),
    };
    let cell_timeout = cli
        .cell_timeout
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.cell_timeout());

    // An unparseable filter falls back to running everything.
    let filter = match cli.filter.as_str() {
        ".*" => None,
        pattern => Regex::new(pattern).ok(),
    };

    SuiteConfig {
        policy,
        cell_timeout,
        trim_fraction: config.runner.trim_fraction,
        filter,
        show_progress: true,
    }
}

fn run_suite(cli: &Cli, config: &BenchConfig, registry: &Registry) -> anyhow::Result<()> {
    let scenarios = standard_scenarios(config);
    let suite_config = build_suite_config(cli, config);
    let policy = suite_config.policy;

    println!(
        "Running {} algorithm(s), warmup {}, repeats {}...\n",
        registry.entries().len(),
        policy.warmup_iterations,
        policy.repeat_iterations,
    );

    let suite = Suite::new(suite_config);
    let records = suite
        .run(registry, &scenarios)
        .map_err(|e| anyhow::anyhow!("malformed benchmark matrix: {}", e))?;

    let report = Report::new(
        ReportMeta {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            warmup_iterations: policy.warmup_iterations,
            repeat_iterations: policy.repeat_iterations,
        },
        records,
    );

    // Parse output format
    let format: OutputFormat = cli.format.parse().unwrap_or(OutputFormat::Human);
    let output = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Human => format_human_output(&report),
    };

    // Write output
    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    // Exit with appropriate code. Unavailable backends alone are expected in
    // a multi-toolchain environment and do not fail the run.
    if report.has_failures() {
        if report.summary.validation_failures > 0 {
            eprintln!(
                "\n{} backend(s) disagree with the reference",
                report.summary.validation_failures
            );
        }
        if report.summary.execution_failures > 0 {
            eprintln!(
                "\n{} backend(s) failed during execution",
                report.summary.execution_failures
            );
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Render a panic payload the way the panic itself would have printed it.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_win_over_config() {
        let cli = Cli {
            command: None,
            filter: ".*".to_string(),
            format: "human".to_string(),
            output: None,
            warmup: Some(3),
            repeats: Some(50),
            artifact_dir: None,
            cell_timeout: Some(5),
            verbose: false,
        };
        let config = BenchConfig::default();

        let suite_config = build_suite_config(&cli, &config);
        assert_eq!(suite_config.policy.warmup_iterations, 3);
        assert_eq!(suite_config.policy.repeat_iterations, 50);
        assert_eq!(suite_config.cell_timeout.as_secs(), 5);
        assert!(suite_config.filter.is_none());
    }

    #[test]
    fn config_values_apply_without_cli_overrides() {
        let cli = Cli {
            command: None,
            filter: "sieve/.*".to_string(),
            format: "json".to_string(),
            output: None,
            warmup: None,
            repeats: None,
            artifact_dir: None,
            cell_timeout: None,
            verbose: false,
        };
        let config = BenchConfig::default();

        let suite_config = build_suite_config(&cli, &config);
        assert_eq!(suite_config.policy.warmup_iterations, 1);
        assert_eq!(suite_config.policy.repeat_iterations, 5);
        assert_eq!(suite_config.cell_timeout.as_secs(), 30);
        assert!(suite_config.filter.is_some());
    }

    #[test]
    fn panic_messages_survive_both_payload_shapes() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static panic");
        assert_eq!(panic_message(boxed), "static panic");

        let boxed: Box<dyn std::any::Any + Send> = Box::new("owned panic".to_string());
        assert_eq!(panic_message(boxed), "owned panic");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(boxed), "Unknown panic");
    }
}
