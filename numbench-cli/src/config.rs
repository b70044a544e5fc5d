//! Configuration loading from numbench.toml
//!
//! Harness configuration can be specified in a `numbench.toml` file in the
//! project root. The file is discovered by walking up from the current
//! directory; CLI flags override its values.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Numbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BenchConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Native artifact layout
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// Input scenarios per algorithm
    #[serde(default)]
    pub scenarios: ScenariosConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration for benchmark execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Untimed warmup invocations per cell
    #[serde(default = "default_warmup")]
    pub warmup_iterations: u32,
    /// Timed invocations per cell
    #[serde(default = "default_repeats")]
    pub repeat_iterations: u32,
    /// Wall-time budget for a single cell (e.g. "30s", "5m")
    #[serde(default = "default_cell_timeout")]
    pub cell_timeout: String,
    /// Fraction of samples trimmed from each tail before computing
    /// mean/median/stddev (extremes always keep all samples)
    #[serde(default)]
    pub trim_fraction: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: default_warmup(),
            repeat_iterations: default_repeats(),
            cell_timeout: default_cell_timeout(),
            trim_fraction: 0.0,
        }
    }
}

fn default_warmup() -> u32 {
    1
}
fn default_repeats() -> u32 {
    5
}
fn default_cell_timeout() -> String {
    "30s".to_string()
}

/// Native artifact layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding the compiled backend libraries
    #[serde(default = "default_artifact_dir")]
    pub directory: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            directory: default_artifact_dir(),
        }
    }
}

fn default_artifact_dir() -> String {
    "artifacts".to_string()
}

/// Input scenarios per algorithm
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScenariosConfig {
    /// Prime sieve scenarios
    #[serde(default)]
    pub sieve: SieveScenarios,
    /// Trapezoidal integration scenarios
    #[serde(default)]
    pub trapezoid: TrapezoidScenarios,
}

/// Prime sieve scenario sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SieveScenarios {
    /// Upper bounds to benchmark
    #[serde(default = "default_sieve_sizes")]
    pub sizes: Vec<u64>,
}

impl Default for SieveScenarios {
    fn default() -> Self {
        Self {
            sizes: default_sieve_sizes(),
        }
    }
}

fn default_sieve_sizes() -> Vec<u64> {
    vec![10, 100_000, 200_000, 400_000, 800_000]
}

/// Trapezoidal integration scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrapezoidScenarios {
    /// Lower integration bound
    #[serde(default)]
    pub lower: f64,
    /// Upper integration bound
    #[serde(default = "default_upper")]
    pub upper: f64,
    /// Subinterval counts to benchmark
    #[serde(default = "default_trapezoid_sizes")]
    pub subintervals: Vec<u64>,
    /// Default equivalence tolerance for this algorithm's scalar output.
    /// Chosen empirically; accumulated floating error grows with the
    /// subinterval count.
    #[serde(default = "default_trapezoid_tolerance")]
    pub tolerance: f64,
    /// Per-scenario tolerance overrides
    #[serde(default)]
    pub tolerance_overrides: Vec<ToleranceOverride>,
}

impl Default for TrapezoidScenarios {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: default_upper(),
            subintervals: default_trapezoid_sizes(),
            tolerance: default_trapezoid_tolerance(),
            tolerance_overrides: Vec::new(),
        }
    }
}

fn default_upper() -> f64 {
    1.0
}
fn default_trapezoid_sizes() -> Vec<u64> {
    vec![10, 1_000_000, 2_000_000, 4_000_000]
}
fn default_trapezoid_tolerance() -> f64 {
    1e-8
}

/// A looser (or tighter) tolerance for one subinterval count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToleranceOverride {
    /// The subinterval count this override applies to
    pub subintervals: u64,
    /// The tolerance to use instead of the algorithm default
    pub epsilon: f64,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl BenchConfig {
    /// Discover `numbench.toml` by walking up from the current directory.
    /// Returns `None` when no file is found or it fails to parse.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let candidate = dir.join("numbench.toml");
            if candidate.is_file() {
                let text = std::fs::read_to_string(&candidate).ok()?;
                return match toml::from_str(&text) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("ignoring invalid {}: {}", candidate.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Parse a human duration string like "30s", "500ms" or "5m".
    pub fn parse_duration(s: &str) -> Option<Duration> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            return ms.trim().parse::<u64>().ok().map(Duration::from_millis);
        }
        if let Some(secs) = s.strip_suffix('s') {
            return secs.trim().parse::<u64>().ok().map(Duration::from_secs);
        }
        if let Some(mins) = s.strip_suffix('m') {
            return mins
                .trim()
                .parse::<u64>()
                .ok()
                .map(|m| Duration::from_secs(m * 60));
        }
        s.parse::<u64>().ok().map(Duration::from_secs)
    }

    /// The cell timeout as a `Duration`, falling back to 30s on parse errors.
    pub fn cell_timeout(&self) -> Duration {
        Self::parse_duration(&self.runner.cell_timeout).unwrap_or(Duration::from_secs(30))
    }
}
