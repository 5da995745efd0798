//! Campaign Orchestrator — spec.md §4.10.
//!
//! Ties together IR discovery, preflight (validate → codegen → compile →
//! load → bind) and the property loop, then hands the collected results to
//! [`crate::report`].

use std::fs;
use std::path::{Path, PathBuf};

use specgo_ir::{schema, semantic, SpecIr};

use crate::binding::ProjectBinding;
use crate::compile::{compile_shared_library, compiler_is_resolvable};
use crate::error::{ConfigurationError, PreflightFailure, PropertyFailure};
use crate::properties::run_message_properties;
use crate::report::{
    cap_highlights, run_provenance, timestamp_slug, write_error_report, write_raw_report, FailureHighlight,
    FailureRecord, LoopSummary, RawErrorReport, RawRoundtripRun, ReportConfig,
};
use crate::seed::{self, SeedPlan};

pub struct CampaignOptions {
    pub ir_glob: String,
    pub artifact_dir: Option<PathBuf>,
    pub compiler: String,
    pub loops: u32,
    pub cases_per_seed: u32,
    pub master_seed: Option<u64>,
    pub explicit_seeds: Vec<u64>,
    pub report_dir: PathBuf,
    pub continue_on_fail: bool,
}

pub struct CampaignOutcome {
    pub raw_report_path: PathBuf,
    pub error_report_path: Option<PathBuf>,
    pub total_failures: usize,
}

/// One successfully preflighted spec, ready for the property loop.
struct BoundSpec {
    ir_path: PathBuf,
    spec: SpecIr,
    binding: ProjectBinding,
    project_c: String,
}

/// Run a full campaign. Returns [`ConfigurationError`] only for the
/// fail-fast checks in step (a); everything discovered per-IR after that
/// becomes a [`PreflightFailure`] or [`PropertyFailure`] folded into the
/// report instead of aborting the run.
pub fn run(options: &CampaignOptions) -> Result<CampaignOutcome, ConfigurationError> {
    let started_at = crate::report::timestamp_slug();

    // (a) validate inputs
    if options.loops < 1 {
        return Err(ConfigurationError::LoopsBelowOne(options.loops));
    }
    if options.cases_per_seed < 1 {
        return Err(ConfigurationError::CasesPerSeedBelowOne(options.cases_per_seed));
    }
    if !compiler_is_resolvable(&options.compiler) {
        return Err(ConfigurationError::CompilerNotFound(options.compiler.clone()));
    }

    // (b) resolve the IR set
    let ir_paths = resolve_ir_set(&options.ir_glob)?;

    // seed plan
    let SeedPlan { master_seed, loop_seeds } = seed::plan(options.loops, options.master_seed, &options.explicit_seeds);

    // (c) preflight every IR
    let mut preflight_failures: Vec<(PathBuf, PreflightFailure)> = Vec::new();
    let mut bound_specs: Vec<BoundSpec> = Vec::new();

    let work_dir = tempfile::tempdir().map_err(|e| ConfigurationError::WorkDir(e.to_string()))?;

    for ir_path in &ir_paths {
        match preflight_one(ir_path, &options.compiler, options.artifact_dir.as_deref(), work_dir.path()) {
            Ok(bound) => bound_specs.push(bound),
            Err(failure) => {
                tracing::warn!(ir = %ir_path.display(), error = %failure, "preflight failed");
                preflight_failures.push((ir_path.clone(), failure));
            }
        }
    }

    // (d)/(e) property loop
    let mut loop_summaries = Vec::with_capacity(loop_seeds.len());
    let mut property_failures: Vec<(usize, u64, String, PathBuf, String, PropertyFailure)> = Vec::new();

    for (loop_index, &loop_seed) in loop_seeds.iter().enumerate() {
        let mut loop_failure_count = 0usize;

        for (spec_index, bound) in bound_specs.iter().enumerate() {
            for (msg_index, binding) in bound.binding.messages.iter().enumerate() {
                let failures =
                    run_message_properties(&bound.project_c, binding, loop_seed, spec_index, msg_index, options.cases_per_seed);
                for failure in failures {
                    loop_failure_count += 1;
                    property_failures.push((
                        loop_index,
                        loop_seed,
                        bound.project_c.clone(),
                        bound.ir_path.clone(),
                        bound.spec.ir_version.clone(),
                        failure,
                    ));
                }
            }
        }

        loop_summaries.push(LoopSummary {
            loop_index,
            seed: loop_seed,
            specs_run: bound_specs.len(),
            failures: loop_failure_count,
        });

        if loop_failure_count > 0 && !options.continue_on_fail {
            break;
        }
    }

    // coverage check, once per bound spec across the whole campaign
    for bound in &bound_specs {
        let missing = bound.binding.uninvoked_symbols(&bound.project_c);
        if !missing.is_empty() {
            property_failures.push((
                loop_summaries.len().saturating_sub(1),
                loop_seeds.last().copied().unwrap_or(master_seed),
                bound.project_c.clone(),
                bound.ir_path.clone(),
                bound.spec.ir_version.clone(),
                PropertyFailure::CoverageMismatch {
                    project: bound.project_c.clone(),
                    symbols: missing,
                },
            ));
        }
    }

    let finished_at = crate::report::timestamp_slug();

    // (f) emit reports
    let slug = timestamp_slug();
    let total_failures = preflight_failures.len() + property_failures.len();

    let mut highlights: Vec<FailureHighlight> = preflight_failures
        .iter()
        .map(|(ir_path, failure)| FailureHighlight {
            loop_index: 0,
            seed: master_seed,
            project: ir_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default(),
            ir_path: ir_path.clone(),
            summary: failure.to_string(),
        })
        .chain(property_failures.iter().map(|(loop_index, seed, project, ir_path, _ir_version, failure)| FailureHighlight {
            loop_index: *loop_index,
            seed: *seed,
            project: project.clone(),
            ir_path: ir_path.clone(),
            summary: failure.to_string(),
        }))
        .collect();
    highlights = cap_highlights(std::mem::take(&mut highlights));

    let raw_run = RawRoundtripRun {
        provenance: run_provenance(started_at, finished_at, Some(options.compiler.clone())),
        config: ReportConfig {
            ir_glob: options.ir_glob.clone(),
            artifact_dir: options.artifact_dir.clone(),
            compiler: options.compiler.clone(),
            loops: options.loops,
            cases_per_seed: options.cases_per_seed,
            master_seed,
            loop_seeds: loop_seeds.clone(),
            continue_on_fail: options.continue_on_fail,
        },
        ir_inputs: ir_paths.clone(),
        loop_summaries,
        total_specs_run: bound_specs.len(),
        total_failures,
        failure_highlights: highlights,
    };

    let raw_report_path = write_raw_report(&options.report_dir, &slug, &raw_run)
        .map_err(|e| ConfigurationError::ReportWrite(e.to_string()))?;

    let error_report_path = if total_failures > 0 {
        let mut records = Vec::new();
        for (ir_path, failure) in &preflight_failures {
            records.push(FailureRecord {
                loop_index: 0,
                seed: master_seed,
                project: ir_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default(),
                ir_path: ir_path.clone(),
                ir_version: specgo_ir::CURRENT_IR_VERSION.to_string(),
                message: None,
                symbol: None,
                property: Some("preflight".to_string()),
                case_index: None,
                detail: failure.to_string(),
                exception_text: Some(failure.to_string()),
                traceback: None,
            });
        }
        for (loop_index, seed_val, project, ir_path, ir_version, failure) in &property_failures {
            records.push(FailureRecord {
                loop_index: *loop_index,
                seed: *seed_val,
                project: project.clone(),
                ir_path: ir_path.clone(),
                ir_version: ir_version.clone(),
                message: None,
                symbol: None,
                property: Some("property".to_string()),
                case_index: None,
                detail: failure.to_string(),
                exception_text: Some(failure.to_string()),
                traceback: None,
            });
        }

        Some(
            write_error_report(&options.report_dir, &slug, &RawErrorReport { failures: records })
                .map_err(|e| ConfigurationError::ReportWrite(e.to_string()))?,
        )
    } else {
        None
    };

    Ok(CampaignOutcome {
        raw_report_path,
        error_report_path,
        total_failures,
    })
}

fn resolve_ir_set(pattern: &str) -> Result<Vec<PathBuf>, ConfigurationError> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)
        .map_err(|_| ConfigurationError::EmptyIrSet(pattern.to_string()))?
        .filter_map(Result::ok)
        .filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with(".ir.yaml")))
        .collect();
    paths.sort();
    if paths.is_empty() {
        return Err(ConfigurationError::EmptyIrSet(pattern.to_string()));
    }
    Ok(paths)
}

fn preflight_one(
    ir_path: &Path,
    compiler: &str,
    artifact_dir: Option<&Path>,
    work_dir: &Path,
) -> Result<BoundSpec, PreflightFailure> {
    let yaml = fs::read_to_string(ir_path).map_err(|e| PreflightFailure::Io {
        ir_path: ir_path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let spec = schema::validate(&yaml).map_err(|diags| PreflightFailure::Schema {
        ir_path: ir_path.to_path_buf(),
        count: diags.len(),
    })?;

    let semantic_diags = semantic::validate(&spec);
    if !semantic_diags.is_empty() {
        return Err(PreflightFailure::Semantic {
            ir_path: ir_path.to_path_buf(),
            count: semantic_diags.len(),
        });
    }

    let stem = ir_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "spec".to_string());
    let output_dir = match artifact_dir {
        Some(dir) => dir.join(&stem),
        None => work_dir.join(&stem),
    };

    let (_header_path, source_path) = specgo_codegen::render_to_dir(&spec, specgo_codegen::Language::C, &output_dir)
        .map_err(|errs| PreflightFailure::Codegen {
            ir_path: ir_path.to_path_buf(),
            count: errs.len(),
        })?;

    let library_path = compile_shared_library(compiler, &source_path, &output_dir, &stem).map_err(|detail| {
        PreflightFailure::Compile {
            ir_path: ir_path.to_path_buf(),
            detail,
        }
    })?;

    let binding = ProjectBinding::load(&spec, &library_path)?;
    let project_c = specgo_ir::naming::project_c_name(&spec.meta.name);

    Ok(BoundSpec {
        ir_path: ir_path.to_path_buf(),
        spec,
        binding,
        project_c,
    })
}
