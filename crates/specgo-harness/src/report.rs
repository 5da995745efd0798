//! Report Writer — spec.md §4.11.
//!
//! Writes `<slug>-raw.report.yaml` (always) and
//! `<slug>-raw.error.report.yaml` (only when failures exist) to the report
//! directory, keyed by a UTC timestamp slug. Absent optional fields are
//! written as explicit `null` (via `Option<T>`'s ordinary YAML rendering)
//! to preserve the documented schema.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

const MAX_FAILURE_HIGHLIGHTS: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    pub ir_glob: String,
    pub artifact_dir: Option<PathBuf>,
    pub compiler: String,
    pub loops: u32,
    pub cases_per_seed: u32,
    pub master_seed: u64,
    pub loop_seeds: Vec<u64>,
    pub continue_on_fail: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoopSummary {
    pub loop_index: usize,
    pub seed: u64,
    pub specs_run: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureHighlight {
    pub loop_index: usize,
    pub seed: u64,
    pub project: String,
    pub ir_path: PathBuf,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub loop_index: usize,
    pub seed: u64,
    pub project: String,
    pub ir_path: PathBuf,
    pub ir_version: String,
    pub message: Option<String>,
    pub symbol: Option<String>,
    pub property: Option<String>,
    pub case_index: Option<usize>,
    pub detail: String,
    pub exception_text: Option<String>,
    pub traceback: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunProvenance {
    pub started_at: String,
    pub finished_at: String,
    pub toolchain_version: String,
    pub compiler_banner: Option<String>,
    pub host_os_tag: String,
}

/// Root document for `<slug>-raw.report.yaml`.
#[derive(Debug, Clone, Serialize)]
pub struct RawRoundtripRun {
    pub provenance: RunProvenance,
    pub config: ReportConfig,
    pub ir_inputs: Vec<PathBuf>,
    pub loop_summaries: Vec<LoopSummary>,
    pub total_specs_run: usize,
    pub total_failures: usize,
    pub failure_highlights: Vec<FailureHighlight>,
}

/// Root document for `<slug>-raw.error.report.yaml`.
#[derive(Debug, Clone, Serialize)]
pub struct RawErrorReport {
    pub failures: Vec<FailureRecord>,
}

/// `YYYYMMDDTHHMMSSZ`-shaped UTC timestamp slug, unique enough per campaign
/// run to namespace its two report files.
pub fn timestamp_slug() -> String {
    Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}

fn host_os_tag() -> String {
    std::env::consts::OS.to_string()
}

pub fn run_provenance(started_at: String, finished_at: String, compiler_banner: Option<String>) -> RunProvenance {
    RunProvenance {
        started_at,
        finished_at,
        toolchain_version: env!("CARGO_PKG_VERSION").to_string(),
        compiler_banner,
        host_os_tag: host_os_tag(),
    }
}

/// Cap `highlights` at [`MAX_FAILURE_HIGHLIGHTS`], logging how many were
/// dropped (spec.md §4.11 "up to 20 failure highlights").
pub fn cap_highlights(mut highlights: Vec<FailureHighlight>) -> Vec<FailureHighlight> {
    if highlights.len() > MAX_FAILURE_HIGHLIGHTS {
        let dropped = highlights.len() - MAX_FAILURE_HIGHLIGHTS;
        tracing::warn!(dropped, "truncating failure highlights to {} entries", MAX_FAILURE_HIGHLIGHTS);
        highlights.truncate(MAX_FAILURE_HIGHLIGHTS);
    }
    highlights
}

/// Write the always-present raw report, returning its path.
pub fn write_raw_report(report_dir: &Path, slug: &str, run: &RawRoundtripRun) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(report_dir)?;
    let path = report_dir.join(format!("{}-raw.report.yaml", slug));
    let yaml = serde_yml::to_string(run).expect("RawRoundtripRun is always serializable");
    fs::write(&path, yaml)?;
    Ok(path)
}

/// Write the error report, only called when `failures` is non-empty.
pub fn write_error_report(
    report_dir: &Path,
    slug: &str,
    report: &RawErrorReport,
) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(report_dir)?;
    let path = report_dir.join(format!("{}-raw.error.report.yaml", slug));
    let yaml = serde_yml::to_string(report).expect("RawErrorReport is always serializable");
    fs::write(&path, yaml)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_beyond_the_cap_are_truncated() {
        let highlights: Vec<FailureHighlight> = (0..30)
            .map(|i| FailureHighlight {
                loop_index: i,
                seed: i as u64,
                project: "demo".to_string(),
                ir_path: PathBuf::from("demo.ir.yaml"),
                summary: "failed".to_string(),
            })
            .collect();
        let capped = cap_highlights(highlights);
        assert_eq!(capped.len(), MAX_FAILURE_HIGHLIGHTS);
    }

    #[test]
    fn timestamp_slug_has_the_expected_shape() {
        let slug = timestamp_slug();
        assert!(slug.ends_with('Z'));
        assert!(slug.contains('T'));
    }
}
