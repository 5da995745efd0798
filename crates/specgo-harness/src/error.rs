//! Error taxonomy for the roundtrip campaign: everything that can keep a
//! spec out of the property loop ([`PreflightFailure`]), everything that can
//! fail once it's in the loop ([`PropertyFailure`]), and invalid campaign
//! configuration ([`ConfigurationError`]).

use std::path::PathBuf;

use thiserror::Error;

/// Anything that prevents a spec from entering the property loop:
/// validation, codegen, compile, dynamic load, or symbol resolution.
/// Recorded as a synthetic failure in the campaign report; other specs
/// continue (spec.md §4.10 step c).
#[derive(Debug, Error)]
pub enum PreflightFailure {
    #[error("{ir_path}: schema validation failed ({count} diagnostic(s))")]
    Schema { ir_path: PathBuf, count: usize },

    #[error("{ir_path}: semantic validation failed ({count} diagnostic(s))")]
    Semantic { ir_path: PathBuf, count: usize },

    #[error("{ir_path}: codegen failed ({count} error(s))")]
    Codegen { ir_path: PathBuf, count: usize },

    #[error("{ir_path}: compilation failed: {detail}")]
    Compile { ir_path: PathBuf, detail: String },

    #[error("{ir_path}: failed to load compiled library: {detail}")]
    Load { ir_path: PathBuf, detail: String },

    #[error("{ir_path}: failed to resolve symbol `{symbol}`: {detail}")]
    SymbolResolution {
        ir_path: PathBuf,
        symbol: String,
        detail: String,
    },

    #[error("{ir_path}: {detail}")]
    Io { ir_path: PathBuf, detail: String },
}

/// An assertion inside P1 or P2, a nonzero encode/decode status, or a
/// function-coverage mismatch (spec.md §4.8 step 5, §4.8.1).
#[derive(Debug, Clone, Error)]
pub enum PropertyFailure {
    #[error(
        "{project}.{message} P1 case {case_index} (seed {seed}): encode returned status {status}"
    )]
    EncodeStatus {
        project: String,
        message: String,
        seed: u64,
        case_index: usize,
        status: i32,
    },

    #[error(
        "{project}.{message} P1 case {case_index} (seed {seed}): decode returned status {status}"
    )]
    DecodeStatus {
        project: String,
        message: String,
        seed: u64,
        case_index: usize,
        status: i32,
    },

    #[error(
        "{project}.{message} P1 case {case_index} (seed {seed}): field `{field}` round-tripped to {actual}, expected {expected}"
    )]
    FieldMismatch {
        project: String,
        message: String,
        seed: u64,
        case_index: usize,
        field: String,
        expected: i128,
        actual: i128,
    },

    #[error(
        "{project}.{message} P2 case {case_index} (seed {seed}): bit {bit} masked roundtrip mismatch, expected {expected}, got {actual}"
    )]
    MaskedBitMismatch {
        project: String,
        message: String,
        seed: u64,
        case_index: usize,
        bit: u32,
        expected: u8,
        actual: u8,
    },

    #[error("{project}: function coverage failure, symbol(s) never invoked: {symbols:?}")]
    CoverageMismatch { project: String, symbols: Vec<String> },
}

/// Invalid CLI/campaign configuration, fatal before any work begins
/// (spec.md §7).
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    #[error("loops must be >= 1, got {0}")]
    LoopsBelowOne(u32),

    #[error("cases_per_seed must be >= 1, got {0}")]
    CasesPerSeedBelowOne(u32),

    #[error("compiler `{0}` is not resolvable")]
    CompilerNotFound(String),

    #[error("no IR files matched glob `{0}`")]
    EmptyIrSet(String),

    #[error("failed to prepare campaign working directory: {0}")]
    WorkDir(String),

    #[error("failed to write campaign report: {0}")]
    ReportWrite(String),
}
