use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use specgo_harness::campaign::{self, CampaignOptions};

#[derive(Parser)]
#[command(name = "specgo")]
#[command(about = "Embedded-bus message catalog spec-to-verified-codec pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schema- and semantic-validate one or more IR files
    Validate {
        /// IR files to validate (`<name>.ir.yaml`)
        #[arg(required = true)]
        ir_files: Vec<PathBuf>,
    },

    /// Generate C encoder/decoder source for one IR file
    Codegen {
        /// Input IR file
        ir_file: PathBuf,

        /// Output directory
        #[arg(long = "out", value_name = "DIR", required = true)]
        out: PathBuf,

        /// Target language; only `c` is recognized
        #[arg(long = "lang", value_enum, default_value = "c")]
        lang: Language,
    },

    /// Run the seeded roundtrip verification campaign
    #[command(name = "test-roundtrip")]
    TestRoundtrip {
        /// Glob matching IR files to include in the campaign
        #[arg(long = "ir-glob", env = "SPECGO_IR_GLOB", required = true)]
        ir_glob: String,

        /// Directory of pre-generated artifacts, if reusing instead of generating fresh ones
        #[arg(long = "artifact-dir", env = "SPECGO_ARTIFACT_DIR")]
        artifact_dir: Option<PathBuf>,

        /// Number of campaign loops to run
        #[arg(long = "loops", default_value_t = 1)]
        loops: u32,

        /// Property-suite cases drawn per loop seed
        #[arg(long = "cases-per-seed", env = "SPECGO_CASES_PER_SEED", default_value_t = 100)]
        cases_per_seed: u32,

        /// Explicit master seed; a cryptographic seed is drawn if omitted
        #[arg(long = "master-seed")]
        master_seed: Option<u64>,

        /// Comma-separated explicit per-loop seeds, consumed before the deterministic stream
        #[arg(long = "seeds", env = "SPECGO_SEEDS", value_delimiter = ',')]
        seeds: Vec<u64>,

        /// Compiler to invoke for the shared-library build
        #[arg(long = "compiler", env = "SPECGO_COMPILER", default_value = "cc")]
        compiler: String,

        /// Directory to write campaign reports into
        #[arg(long = "report-dir", default_value = "reports")]
        report_dir: PathBuf,

        /// Continue running loops after a failing loop (default)
        #[arg(long = "continue-on-fail", conflicts_with = "stop_on_fail", default_value_t = true)]
        continue_on_fail: bool,

        /// Stop after the first failing loop
        #[arg(long = "stop-on-fail")]
        stop_on_fail: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Language {
    C,
}

#[derive(Serialize)]
struct ValidationReport {
    ir_path: PathBuf,
    valid: bool,
    schema_errors: Vec<String>,
    semantic_errors: Vec<String>,
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let exit_code = match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };

    process::exit(exit_code);
}

fn run(command: Commands) -> anyhow::Result<i32> {
    match command {
        Commands::Validate { ir_files } => run_validate(ir_files),
        Commands::Codegen { ir_file, out, lang } => run_codegen(ir_file, out, lang),
        Commands::TestRoundtrip {
            ir_glob,
            artifact_dir,
            loops,
            cases_per_seed,
            master_seed,
            seeds,
            compiler,
            report_dir,
            continue_on_fail,
            stop_on_fail,
        } => run_test_roundtrip(
            ir_glob,
            artifact_dir,
            loops,
            cases_per_seed,
            master_seed,
            seeds,
            compiler,
            report_dir,
            continue_on_fail && !stop_on_fail,
        ),
    }
}

fn run_validate(ir_files: Vec<PathBuf>) -> anyhow::Result<i32> {
    let mut all_valid = true;

    for ir_path in ir_files {
        let yaml = std::fs::read_to_string(&ir_path)?;

        let (spec, schema_errors) = match specgo_ir::schema::validate(&yaml) {
            Ok(spec) => (Some(spec), Vec::new()),
            Err(errors) => (None, errors.into_iter().map(|e| e.to_string()).collect()),
        };

        let semantic_errors: Vec<String> = match &spec {
            Some(spec) => specgo_ir::semantic::validate(spec).into_iter().map(|e| e.to_string()).collect(),
            None => Vec::new(),
        };

        let valid = schema_errors.is_empty() && semantic_errors.is_empty();
        all_valid &= valid;

        tracing::info!(ir = %ir_path.display(), valid, "validated");

        let report = ValidationReport {
            ir_path: ir_path.clone(),
            valid,
            schema_errors,
            semantic_errors,
        };

        let report_path = sibling_report_path(&ir_path, "validation.yaml");
        let yaml_out = serde_yml::to_string(&report)?;
        std::fs::write(&report_path, yaml_out)?;
    }

    Ok(if all_valid { 0 } else { 1 })
}

fn run_codegen(ir_file: PathBuf, out: PathBuf, lang: Language) -> anyhow::Result<i32> {
    let yaml = std::fs::read_to_string(&ir_file)?;

    let spec = match specgo_ir::schema::validate(&yaml) {
        Ok(spec) => spec,
        Err(errors) => {
            for e in &errors {
                eprintln!("{}", e);
            }
            return Ok(1);
        }
    };

    let semantic_errors = specgo_ir::semantic::validate(&spec);
    if !semantic_errors.is_empty() {
        for e in &semantic_errors {
            eprintln!("{}", e);
        }
        return Ok(1);
    }

    let language = match lang {
        Language::C => specgo_codegen::Language::C,
    };

    match specgo_codegen::render_to_dir(&spec, language, &out) {
        Ok((header_path, source_path)) => {
            tracing::info!(header = %header_path.display(), source = %source_path.display(), "generated");
            Ok(0)
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("{}", e);
            }
            Ok(1)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_test_roundtrip(
    ir_glob: String,
    artifact_dir: Option<PathBuf>,
    loops: u32,
    cases_per_seed: u32,
    master_seed: Option<u64>,
    explicit_seeds: Vec<u64>,
    compiler: String,
    report_dir: PathBuf,
    continue_on_fail: bool,
) -> anyhow::Result<i32> {
    let options = CampaignOptions {
        ir_glob,
        artifact_dir,
        compiler,
        loops,
        cases_per_seed,
        master_seed,
        explicit_seeds,
        report_dir,
        continue_on_fail,
    };

    match campaign::run(&options) {
        Ok(outcome) => {
            tracing::info!(
                report = %outcome.raw_report_path.display(),
                failures = outcome.total_failures,
                "campaign complete"
            );
            if let Some(error_report) = &outcome.error_report_path {
                eprintln!("failures recorded in {}", error_report.display());
            }
            Ok(if outcome.total_failures == 0 { 0 } else { 1 })
        }
        Err(config_error) => {
            eprintln!("Error: {}", config_error);
            Ok(1)
        }
    }
}

fn sibling_report_path(ir_path: &std::path::Path, suffix: &str) -> PathBuf {
    let file_name = ir_path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let stem = file_name.strip_suffix(".ir.yaml").unwrap_or(&file_name);
    ir_path.with_file_name(format!("{}.{}", stem, suffix))
}
