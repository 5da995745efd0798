//! End-to-end campaign test: writes a tiny IR file to disk, runs the full
//! orchestrator (preflight → compile → dlopen → P1/P2) against it with the
//! host's `cc`, and checks the resulting report is clean.

use std::fs;

use specgo_harness::campaign::{self, CampaignOptions};
use specgo_harness::compile::compiler_is_resolvable;

const DEMO_IR: &str = r#"
ir_version: "0.1"
meta:
  name: roundtrip_demo
  version: "1.0"
  source: roundtrip_demo.dbc
  original_format: dbc
bus:
  kind: can
messages:
  - id: 256
    name: Engine
    dlc: 2
    signals:
      - name: Rpm
        start_bit: 0
        bit_length: 12
        byte_order: little_endian
        signed: false
        scale: 1.0
        offset: 0.0
      - name: Flag
        start_bit: 12
        bit_length: 4
        byte_order: little_endian
        signed: false
        scale: 1.0
        offset: 0.0
"#;

#[test]
fn a_clean_two_loop_campaign_against_a_valid_ir_produces_no_failures() {
    if !compiler_is_resolvable("cc") {
        eprintln!("skipping: no `cc` on this host");
        return;
    }

    let ir_dir = tempfile::tempdir().unwrap();
    let report_dir = tempfile::tempdir().unwrap();
    let ir_path = ir_dir.path().join("roundtrip_demo.ir.yaml");
    fs::write(&ir_path, DEMO_IR).unwrap();

    let options = CampaignOptions {
        ir_glob: format!("{}/*.ir.yaml", ir_dir.path().display()),
        artifact_dir: None,
        compiler: "cc".to_string(),
        loops: 2,
        cases_per_seed: 16,
        master_seed: Some(12345),
        explicit_seeds: vec![],
        report_dir: report_dir.path().to_path_buf(),
        continue_on_fail: true,
    };

    let outcome = campaign::run(&options).expect("valid configuration");
    assert_eq!(outcome.total_failures, 0, "expected a clean campaign run");
    assert!(outcome.error_report_path.is_none());
    assert!(outcome.raw_report_path.is_file());
}

#[test]
fn zero_loops_is_a_configuration_error() {
    let options = CampaignOptions {
        ir_glob: "*.ir.yaml".to_string(),
        artifact_dir: None,
        compiler: "cc".to_string(),
        loops: 0,
        cases_per_seed: 1,
        master_seed: None,
        explicit_seeds: vec![],
        report_dir: std::env::temp_dir(),
        continue_on_fail: true,
    };

    assert!(campaign::run(&options).is_err());
}
