//! Error taxonomy for the Codegen Renderer and Codegen Gates (spec.md §7).

use thiserror::Error;

/// Fatal for the affected spec; does not abort a multi-file run.
#[derive(Debug, Clone, Error)]
pub enum CodegenError {
    #[error("unsupported codegen language: {0:?} (only 'c' is recognized)")]
    UnsupportedLanguage(String),

    #[error(
        "message {message} signal {signal}: byte_order 'unknown' is not accepted at codegen time"
    )]
    UnsupportedByteOrder { message: String, signal: String },

    #[error("message {message} signal {signal}: bit_length {bit_length} exceeds the 64-bit codegen limit")]
    SignalTooWide {
        message: String,
        signal: String,
        bit_length: u32,
    },

    #[error("I/O failure writing generated output: {0}")]
    Io(String),
}

/// One check result from the Codegen Gates (G1-G6). The gate as a whole
/// passes iff every check's `passed` is `true` (logical AND).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl GateCheck {
    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: detail.into(),
        }
    }
}

/// The aggregate result of running the Codegen Gates against a generated
/// output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateFailure {
    pub checks: Vec<GateCheck>,
}

impl GateFailure {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

impl std::fmt::Display for GateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let failed = self.checks.iter().filter(|c| !c.passed).count();
        write!(
            f,
            "codegen gate failure: {} of {} checks failed",
            failed,
            self.checks.len()
        )
    }
}

impl std::error::Error for GateFailure {}
