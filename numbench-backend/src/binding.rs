//! Backend Binding
//!
//! Resolves one implementation handle into a `BoundCallable`: a uniform
//! callable taking the algorithm's declared inputs and returning its declared
//! output, with all marshalling (buffer allocation, type coercion)
//! internalized. A missing artifact is the most common expected failure in a
//! multi-toolchain environment and must fail cleanly, never crash.

use libloading::Library;
use numbench_core::{
    run_repetitions, AlgoOutput, CallConvention, ExecutionError, InputScenario, RepetitionPolicy,
    ScenarioArgs, TimingSample,
};
use std::os::raw::{c_double, c_int};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Native symbol signature for the buffer-out convention:
/// the callee fills a caller-allocated buffer and returns the element count.
type BufferOutFn = unsafe extern "C" fn(c_int, *mut c_int) -> c_int;

/// Native symbol signature for the scalar-return convention.
type ScalarFn = unsafe extern "C" fn(c_double, c_double, c_int) -> c_double;

/// A backend artifact or symbol is unavailable or mismatched.
///
/// Recoverable: the registry records the failure and the cell is reported
/// as unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The shared-library artifact does not exist on disk.
    #[error("artifact not found: {0}")]
    ArtifactMissing(PathBuf),
    /// The artifact exists but could not be loaded (wrong architecture,
    /// missing dependency, corrupt file).
    #[error("failed to load {path}: {reason}")]
    LoadFailed {
        /// Path of the artifact.
        path: PathBuf,
        /// Loader error text.
        reason: String,
    },
    /// The artifact loaded but does not export the expected symbol.
    #[error("symbol `{symbol}` not found in {path}: {reason}")]
    SymbolMissing {
        /// The missing symbol name.
        symbol: String,
        /// Path of the artifact.
        path: PathBuf,
        /// Loader error text.
        reason: String,
    },
    /// An in-process implementation does not fit the algorithm's convention.
    #[error("implementation `{tag}` does not satisfy the {expected:?} convention")]
    SignatureMismatch {
        /// The offending implementation tag.
        tag: String,
        /// The convention the algorithm declares.
        expected: CallConvention,
    },
}

/// Typed in-process implementation bodies.
#[derive(Debug, Clone, Copy)]
pub enum InProcessFn {
    /// Sequence-producing body for the buffer-out family.
    Sequence(fn(u64) -> Vec<i64>),
    /// Scalar-producing body for the scalar-return family.
    Scalar(fn(f64, f64, u64) -> f64),
}

/// How one implementation is reached.
#[derive(Debug, Clone)]
pub enum ImplKind {
    /// A native shared library on disk, identified by artifact stem and
    /// exported symbol name.
    Native {
        /// Artifact file stem; platform prefix/suffix are resolved at bind time.
        stem: &'static str,
        /// Exported symbol to look up.
        symbol: &'static str,
    },
    /// A function compiled into this process. Binding is identity.
    InProcess(InProcessFn),
}

/// One concrete backend for an algorithm, before binding.
#[derive(Debug, Clone)]
pub struct ImplementationHandle {
    /// Name of the algorithm this backend implements.
    pub algorithm: &'static str,
    /// Language/variant tag, e.g. `"c"`, `"rust"`, `"reference"`.
    pub tag: &'static str,
    /// How to reach the implementation.
    pub kind: ImplKind,
}

impl ImplementationHandle {
    /// Declare a native shared-library backend.
    pub fn native(
        algorithm: &'static str,
        tag: &'static str,
        stem: &'static str,
        symbol: &'static str,
    ) -> Self {
        Self {
            algorithm,
            tag,
            kind: ImplKind::Native { stem, symbol },
        }
    }

    /// Declare an in-process backend.
    pub fn in_process(algorithm: &'static str, tag: &'static str, body: InProcessFn) -> Self {
        Self {
            algorithm,
            tag,
            kind: ImplKind::InProcess(body),
        }
    }

    /// Whether this backend lives in the harness process.
    pub fn is_in_process(&self) -> bool {
        matches!(self.kind, ImplKind::InProcess(_))
    }

    /// Whether this in-process backend's signature fits the convention.
    /// Native handles are checked at bind time instead.
    pub fn signature_fits(&self, convention: CallConvention) -> bool {
        match self.kind {
            ImplKind::Native { .. } => true,
            ImplKind::InProcess(InProcessFn::Sequence(_)) => {
                convention == CallConvention::BufferOut
            }
            ImplKind::InProcess(InProcessFn::Scalar(_)) => {
                convention == CallConvention::ScalarReturn
            }
        }
    }
}

/// Full artifact path for a stem under `dir`, using this platform's
/// dynamic-library naming (`lib<stem>.so`, `lib<stem>.dylib`, `<stem>.dll`).
pub fn artifact_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        stem,
        std::env::consts::DLL_SUFFIX
    ))
}

enum Dispatch {
    InSequence(fn(u64) -> Vec<i64>),
    InScalar(fn(f64, f64, u64) -> f64),
    NativeBufferOut {
        // Keeps the symbol's address valid; never reloaded or unloaded mid-run.
        _lib: Library,
        func: BufferOutFn,
    },
    NativeScalar {
        _lib: Library,
        func: ScalarFn,
    },
}

/// A successfully resolved, uniformly invocable backend.
///
/// Owns the open library handle for the process lifetime. Owned exclusively
/// by the benchmark cell that uses it; not shared across scenarios.
pub struct BoundCallable {
    dispatch: Dispatch,
}

impl BoundCallable {
    /// Invoke the backend with the scenario's arguments.
    ///
    /// Every backend's observable return value is normalized: buffer-out
    /// callees are given a worst-case buffer and their output is sliced to
    /// the returned count before it reaches the caller.
    pub fn call(&self, args: &ScenarioArgs) -> Result<AlgoOutput, ExecutionError> {
        match (&self.dispatch, args) {
            (Dispatch::InSequence(f), ScenarioArgs::Size { n }) => {
                Ok(AlgoOutput::Sequence(f(*n)))
            }
            (Dispatch::InScalar(f), ScenarioArgs::Interval { a, b, n }) => {
                Ok(AlgoOutput::Scalar(f(*a, *b, *n)))
            }
            (Dispatch::NativeBufferOut { func, .. }, ScenarioArgs::Size { n }) => {
                call_buffer_out(*func, *n)
            }
            (Dispatch::NativeScalar { func, .. }, ScenarioArgs::Interval { a, b, n }) => {
                let n = c_int::try_from(*n).map_err(|_| {
                    ExecutionError::CallFailed(format!("subinterval count {} exceeds C int range", n))
                })?;
                // SAFETY: the symbol was bound against the scalar-return
                // signature declared for this algorithm family; the call has
                // no pointer arguments.
                let value = unsafe { func(*a, *b, n) };
                Ok(AlgoOutput::Scalar(value))
            }
            _ => Err(ExecutionError::CallFailed(
                "argument shape does not match the bound convention".to_string(),
            )),
        }
    }
}

fn call_buffer_out(func: BufferOutFn, n: u64) -> Result<AlgoOutput, ExecutionError> {
    let n = c_int::try_from(n).map_err(|_| {
        ExecutionError::CallFailed(format!("input bound {} exceeds C int range", n))
    })?;
    // Worst case for this convention: every slot up to n filled.
    let capacity = n as usize + 1;
    let mut buffer = vec![0 as c_int; capacity];
    // SAFETY: buffer holds `n + 1` slots, the declared worst case for the
    // buffer-out convention; the callee writes at most that many entries and
    // returns the count actually written.
    let count = unsafe { func(n, buffer.as_mut_ptr()) };
    if count < 0 {
        return Err(ExecutionError::CallFailed(format!(
            "backend reported failure code {}",
            count
        )));
    }
    let count = count as usize;
    if count > capacity {
        return Err(ExecutionError::CallFailed(format!(
            "backend reported {} results for a buffer of {}",
            count, capacity
        )));
    }
    Ok(AlgoOutput::Sequence(
        buffer[..count].iter().map(|&v| v as i64).collect(),
    ))
}

/// Resolve one implementation handle into a `BoundCallable`.
///
/// Native handles resolve the platform artifact name under `artifact_dir`,
/// open the library, look up the symbol and attach the convention's typed
/// signature. In-process handles bind by identity after a signature check.
pub fn bind(
    handle: &ImplementationHandle,
    convention: CallConvention,
    artifact_dir: &Path,
) -> Result<BoundCallable, BindingError> {
    match &handle.kind {
        ImplKind::InProcess(body) => match (body, convention) {
            (InProcessFn::Sequence(f), CallConvention::BufferOut) => Ok(BoundCallable {
                dispatch: Dispatch::InSequence(*f),
            }),
            (InProcessFn::Scalar(f), CallConvention::ScalarReturn) => Ok(BoundCallable {
                dispatch: Dispatch::InScalar(*f),
            }),
            _ => Err(BindingError::SignatureMismatch {
                tag: handle.tag.to_string(),
                expected: convention,
            }),
        },
        ImplKind::Native { stem, symbol } => {
            let path = artifact_path(artifact_dir, stem);
            if !path.exists() {
                return Err(BindingError::ArtifactMissing(path));
            }
            // SAFETY: loading a library runs its initializers. Artifacts come
            // from the build layout this harness is pointed at.
            let lib = unsafe { Library::new(&path) }.map_err(|e| BindingError::LoadFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let dispatch = match convention {
                CallConvention::BufferOut => {
                    // SAFETY: the symbol is declared to follow the buffer-out
                    // signature by the artifact's build contract.
                    let func = unsafe { lib.get::<BufferOutFn>(symbol.as_bytes()) }.map_err(
                        |e| BindingError::SymbolMissing {
                            symbol: symbol.to_string(),
                            path: path.clone(),
                            reason: e.to_string(),
                        },
                    )?;
                    let func = *func;
                    Dispatch::NativeBufferOut { _lib: lib, func }
                }
                CallConvention::ScalarReturn => {
                    // SAFETY: as above, for the scalar-return signature.
                    let func = unsafe { lib.get::<ScalarFn>(symbol.as_bytes()) }.map_err(|e| {
                        BindingError::SymbolMissing {
                            symbol: symbol.to_string(),
                            path: path.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                    let func = *func;
                    Dispatch::NativeScalar { _lib: lib, func }
                }
            };
            Ok(BoundCallable { dispatch })
        }
    }
}

/// One bound callable paired with a named input scenario and a repetition
/// policy; the unit of timed execution.
pub struct BenchUnit {
    callable: BoundCallable,
    scenario: InputScenario,
    policy: RepetitionPolicy,
}

impl BenchUnit {
    /// Pair a callable with its scenario and repetition policy. The unit
    /// takes exclusive ownership of the callable.
    pub fn new(callable: BoundCallable, scenario: InputScenario, policy: RepetitionPolicy) -> Self {
        Self {
            callable,
            scenario,
            policy,
        }
    }

    /// Run warmup then timed iterations, producing this cell's sample.
    pub fn run(&mut self) -> Result<TimingSample, ExecutionError> {
        let callable = &self.callable;
        run_repetitions(|args| callable.call(args), &self.scenario.args, self.policy)
    }

    /// One untimed invocation, used for the pre-timing equivalence check.
    pub fn probe(&self) -> Result<AlgoOutput, ExecutionError> {
        self.callable.call(&self.scenario.args)
    }
}
