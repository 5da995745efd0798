//! Schema Validator (Layer 0)
//!
//! Pure mapping-shape validation: produces either a fully-typed [`SpecIr`]
//! or `None` plus an ordered list of diagnostics. Never raises (panics);
//! never performs cross-field checks — that is [`crate::semantic`]'s job.
//!
//! Unknown top-level keys in [`SpecIr`] are rejected (closed root, per
//! spec.md §3 "Closed: no unknown top-level keys"); unknown keys in nested
//! entities are tolerated, to allow forward-compatible ingest (spec.md §9
//! Open Question Q3 — this asymmetry is deliberate, not accidental, and is
//! exercised by a dedicated test below).

use crate::error::SchemaError;
use crate::model::SpecIr;

const ROOT_KEYS: &[&str] = &["ir_version", "meta", "bus", "messages"];

/// Parse and shape-validate a raw YAML document against [`SpecIr`].
///
/// Returns the typed IR on success. On any shape/type violation, returns
/// every diagnostic found — this function collects, it does not
/// short-circuit on the first problem.
pub fn validate(yaml: &str) -> Result<SpecIr, Vec<SchemaError>> {
    let value: serde_yml::Value = serde_yml::from_str(yaml)
        .map_err(|e| vec![SchemaError::new("<root>", format!("invalid YAML: {}", e))])?;

    let mut errors = Vec::new();
    check_root_keys(&value, &mut errors);

    let spec: SpecIr = match serde_yml::from_value(value) {
        Ok(spec) => spec,
        Err(e) => {
            errors.push(SchemaError::new("<root>", e.to_string()));
            return Err(errors);
        }
    };

    check_structural_ranges(&spec, &mut errors);

    if errors.is_empty() {
        Ok(spec)
    } else {
        Err(errors)
    }
}

fn check_root_keys(value: &serde_yml::Value, errors: &mut Vec<SchemaError>) {
    let Some(mapping) = value.as_mapping() else {
        errors.push(SchemaError::new("<root>", "expected a mapping at the document root"));
        return;
    };

    for key in mapping.keys() {
        let Some(key_str) = key.as_str() else {
            errors.push(SchemaError::new("<root>", "non-string key at document root"));
            continue;
        };
        if !ROOT_KEYS.contains(&key_str) {
            errors.push(SchemaError::new(
                format!("<root>.{}", key_str),
                "unknown top-level key",
            ));
        }
    }
}

/// Structural (shape-level, not cross-field) range checks that the target
/// types alone can't express: `bit_length > 0`, bit rates strictly
/// positive. `dlc >= 0` and `message.id >= 0` are guaranteed by using
/// unsigned integer fields in the model and need no runtime check.
fn check_structural_ranges(spec: &SpecIr, errors: &mut Vec<SchemaError>) {
    if let Some(rates) = &spec.bus.bit_rates {
        for (i, rate) in rates.iter().enumerate() {
            if *rate == 0 {
                errors.push(SchemaError::new(
                    format!("bus.bit_rates[{}]", i),
                    "bit rate must be strictly positive",
                ));
            }
        }
    }

    for (mi, message) in spec.messages.iter().enumerate() {
        if let Some(bus) = &message.bus {
            if let Some(rates) = &bus.bit_rates {
                for (ri, rate) in rates.iter().enumerate() {
                    if *rate == 0 {
                        errors.push(SchemaError::new(
                            format!("messages[{}].bus.bit_rates[{}]", mi, ri),
                            "bit rate must be strictly positive",
                        ));
                    }
                }
            }
        }

        for (si, signal) in message.signals.iter().enumerate() {
            if signal.bit_length == 0 {
                errors.push(SchemaError::new(
                    format!("messages[{}].signals[{}].bit_length", mi, si),
                    "bit_length must be strictly positive",
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_YAML: &str = r#"
ir_version: "0.1"
meta:
  name: demo
  version: "1.0"
  source: demo.ir.yaml
  original_format: text
bus:
  kind: can
messages:
  - id: 256
    name: Engine
    dlc: 8
    direction: tx
    signals:
      - name: Rpm
        start_bit: 0
        bit_length: 16
        byte_order: little_endian
        signed: false
        scale: 1.0
        offset: 0.0
"#;

    #[test]
    fn valid_document_parses() {
        let spec = validate(VALID_YAML).expect("should parse");
        assert_eq!(spec.meta.name, "demo");
        assert_eq!(spec.messages.len(), 1);
    }

    #[test]
    fn unknown_root_key_is_rejected() {
        let yaml = format!("{}\nextra_top_level_key: 1\n", VALID_YAML);
        let errors = validate(&yaml).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.path == "<root>.extra_top_level_key"));
    }

    #[test]
    fn unknown_nested_key_is_tolerated() {
        // Open Question Q3: unknown keys nested under a message/signal are
        // tolerated even though the root is closed.
        let yaml = VALID_YAML.replace(
            "    signals:",
            "    unexpected_nested_key: surprise\n    signals:",
        );
        let spec = validate(&yaml).expect("nested unknown keys must not fail parsing");
        assert_eq!(spec.messages[0].name, "Engine");
    }

    #[test]
    fn zero_bit_length_is_rejected_structurally() {
        let yaml = VALID_YAML.replace("bit_length: 16", "bit_length: 0");
        let errors = validate(&yaml).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.path == "messages[0].signals[0].bit_length"));
    }

    #[test]
    fn missing_ir_version_defaults_to_current() {
        let yaml = VALID_YAML.replacen("ir_version: \"0.1\"\n", "", 1);
        let spec = validate(&yaml).expect("ir_version should default, not fail schema validation");
        assert_eq!(spec.ir_version, crate::model::CURRENT_IR_VERSION);
    }
}
