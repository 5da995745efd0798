//! Semantic Validator (Layer 1)
//!
//! Consumes a structurally-valid [`SpecIr`] and enforces invariants I1-I6
//! (spec.md §3) using the Bit-Layout Engine for I1/I2. Every violation is
//! collected in one pass — this is never a short-circuiting, fail-fast
//! check (spec.md §9, "Validator as accumulator, not short-circuit").

use std::collections::BTreeSet;

use crate::bitlayout::occupied_bits;
use crate::error::SemanticError;
use crate::model::{Message, Signal, SpecIr};

/// Run the full Layer 1 pass over every message in `spec`. Returns every
/// diagnostic found, in message/signal declaration order; an empty vector
/// means the IR is semantically valid.
pub fn validate(spec: &SpecIr) -> Vec<SemanticError> {
    let mut errors = Vec::new();
    for message in &spec.messages {
        validate_message(message, &mut errors);
    }
    errors
}

fn validate_message(message: &Message, errors: &mut Vec<SemanticError>) {
    let payload_bits = message.dlc.saturating_mul(8);

    // Precompute each signal's occupied-bit set once; reused for I1 and I2.
    let occupied: Vec<(usize, BTreeSet<u32>)> = message
        .signals
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let bits: BTreeSet<u32> = occupied_bits(s.byte_order, s.start_bit, s.bit_length)
                .into_iter()
                .collect();
            (i, bits)
        })
        .collect();

    // I1: every signal's occupied bits lie within [0, 8*dlc).
    for (i, bits) in &occupied {
        let signal = &message.signals[*i];
        if let Some(&max_bit) = bits.iter().max() {
            if max_bit >= payload_bits {
                errors.push(SemanticError::for_signal(
                    &message.name,
                    message.id,
                    &signal.name,
                    format!(
                        "occupies bit {} which is outside the message payload [0, {})",
                        max_bit, payload_bits
                    ),
                ));
            }
        }
    }

    // I2: no two signals' occupied-bit sets intersect.
    for a in 0..occupied.len() {
        for b in (a + 1)..occupied.len() {
            let (ai, abits) = &occupied[a];
            let (bi, bbits) = &occupied[b];
            let overlap: Vec<u32> = abits.intersection(bbits).copied().collect();
            if !overlap.is_empty() {
                let sig_a = &message.signals[*ai];
                let sig_b = &message.signals[*bi];
                let mut overlap_sorted = overlap;
                overlap_sorted.sort_unstable();
                errors.push(SemanticError::for_signal(
                    &message.name,
                    message.id,
                    &sig_a.name,
                    format!(
                        "overlaps with signal {} at bit(s) {:?}",
                        sig_b.name, overlap_sorted
                    ),
                ));
            }
        }
    }

    for signal in &message.signals {
        validate_signal(message, signal, errors);
    }
}

fn validate_signal(message: &Message, signal: &Signal, errors: &mut Vec<SemanticError>) {
    // I3: min < max when both set.
    if let (Some(min), Some(max)) = (signal.min, signal.max) {
        if !(min < max) {
            errors.push(SemanticError::for_signal(
                &message.name,
                message.id,
                &signal.name,
                format!("min ({}) is not less than max ({})", min, max),
            ));
        }
    }

    // I4: min <= default <= max where those bounds exist.
    if let Some(default) = signal.default {
        if let Some(min) = signal.min {
            if !(min <= default) {
                errors.push(SemanticError::for_signal(
                    &message.name,
                    message.id,
                    &signal.name,
                    format!("default ({}) is less than min ({})", default, min),
                ));
            }
        }
        if let Some(max) = signal.max {
            if !(default <= max) {
                errors.push(SemanticError::for_signal(
                    &message.name,
                    message.id,
                    &signal.name,
                    format!("default ({}) is greater than max ({})", default, max),
                ));
            }
        }
    }

    // I5: scale != 0.
    if signal.scale == 0.0 {
        errors.push(SemanticError::for_signal(
            &message.name,
            message.id,
            &signal.name,
            "scale must not be zero",
        ));
    }

    // I6: every enum entry value representable in (bit_length, signedness).
    if let Some(entries) = &signal.enum_entries {
        let (lo, hi) = signal.raw_range();
        for entry in entries {
            let v = entry.value as i128;
            if v < lo || v > hi {
                errors.push(SemanticError::for_signal(
                    &message.name,
                    message.id,
                    &signal.name,
                    format!(
                        "enum entry {} has value {} outside representable range [{}, {}]",
                        entry.name, entry.value, lo, hi
                    ),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BusType, ByteOrder, Direction, IrMeta, OriginalFormat};

    fn base_signal(name: &str, start_bit: u32, bit_length: u32) -> Signal {
        Signal {
            name: name.to_string(),
            start_bit,
            bit_length,
            byte_order: ByteOrder::LittleEndian,
            signed: false,
            scale: 1.0,
            offset: 0.0,
            min: None,
            default: None,
            max: None,
            unit: None,
            enum_entries: None,
        }
    }

    fn base_message(dlc: u32, signals: Vec<Signal>) -> Message {
        Message {
            id: 100,
            name: "Engine".to_string(),
            dlc,
            extended: false,
            fd: false,
            bus: None,
            description: None,
            direction: Direction::Unknown,
            signals,
        }
    }

    fn base_spec(messages: Vec<Message>) -> SpecIr {
        SpecIr {
            ir_version: "0.1".to_string(),
            meta: IrMeta {
                name: "test".to_string(),
                version: "1.0".to_string(),
                source: "test.ir.yaml".to_string(),
                original_format: OriginalFormat::Text,
            },
            bus: BusType::default(),
            messages,
        }
    }

    #[test]
    fn overlap_rejection_names_both_signals_and_bits() {
        // S7: a 2-byte message with two 8-bit signals both at start_bit=0
        // is reported with a single [semantic] overlap diagnostic naming
        // both signal names and the overlapping bits.
        let spec = base_spec(vec![base_message(
            2,
            vec![base_signal("A", 0, 8), base_signal("B", 0, 8)],
        )]);
        let errors = validate(&spec);
        let overlap_errors: Vec<_> = errors
            .iter()
            .filter(|e| e.detail.contains("overlaps with"))
            .collect();
        assert_eq!(overlap_errors.len(), 1);
        let msg = overlap_errors[0].to_string();
        assert!(msg.contains('A') && msg.contains('B'));
    }

    #[test]
    fn three_independent_violations_yield_exactly_three_diagnostics() {
        // spec.md §9: a crafted IR with three independent violations
        // produces exactly three diagnostics (accumulator, not
        // short-circuit).
        let mut out_of_range = base_signal("OutOfRange", 0, 8);
        let mut bad_scale = base_signal("BadScale", 8, 8);
        bad_scale.scale = 0.0;
        let mut bad_minmax = base_signal("BadMinMax", 16, 8);
        bad_minmax.min = Some(10.0);
        bad_minmax.max = Some(5.0);
        out_of_range.start_bit = 20; // pushes it past an 8-byte (64-bit) DLC

        let spec = base_spec(vec![base_message(
            3, // 24 bits total; OutOfRange at bit 20..28 spills past 24
            vec![out_of_range, bad_scale, bad_minmax],
        )]);
        let errors = validate(&spec);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_signal_produces_no_diagnostics() {
        let spec = base_spec(vec![base_message(1, vec![base_signal("A", 0, 8)])]);
        assert!(validate(&spec).is_empty());
    }

    #[test]
    fn enum_value_outside_range_is_rejected() {
        let mut signal = base_signal("Mode", 0, 2);
        signal.enum_entries = Some(vec![crate::model::EnumEntry {
            name: "TooBig".to_string(),
            value: 7,
            description: None,
        }]);
        let spec = base_spec(vec![base_message(1, vec![signal])]);
        let errors = validate(&spec);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].detail.contains("outside representable range"));
    }
}
