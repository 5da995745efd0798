//! Property suite (P1, P2) — spec.md §4.8.1.
//!
//! Each property is executed once per loop seed, per message, against an
//! already-bound [`MessageBinding`]. A per-message PRNG stream is derived
//! from `(loop_seed, spec_index, msg_index, msg.id)` via
//! [`crate::seed::message_stream_seed`].

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use specgo_ir::bitlayout::occupied_bits;
use specgo_ir::naming;

use crate::binding::MessageBinding;
use crate::error::PropertyFailure;
use crate::seed::message_stream_seed;

fn slot_from_raw(signed: bool, value: i128) -> i64 {
    if signed {
        value as i64
    } else {
        (value as u64) as i64
    }
}

fn raw_from_slot(signed: bool, bit_length: u32, slot: i64) -> i128 {
    if signed {
        slot as i128
    } else if bit_length >= 64 {
        (slot as u64) as i128
    } else {
        ((slot as u64) & ((1u64 << bit_length) - 1)) as i128
    }
}

/// Boundary-value candidates for a raw range: `min`, `max`, `0`, and `±1`
/// when those fall inside `[lo, hi]` (spec.md §4.8.1 P1).
fn boundary_candidates(lo: i128, hi: i128) -> Vec<i128> {
    let mut candidates = vec![lo, hi];
    for v in [0i128, 1, -1] {
        if v >= lo && v <= hi && !candidates.contains(&v) {
            candidates.push(v);
        }
    }
    candidates
}

fn sample_raw(rng: &mut StdRng, lo: i128, hi: i128) -> i128 {
    if rng.random_bool(0.5) {
        let candidates = boundary_candidates(lo, hi);
        candidates[rng.random_range(0..candidates.len())]
    } else {
        // i128 has no native `gen_range` support in `rand` 0.9; the
        // signal ranges this system deals with fit in 64 bits + sign, so
        // sampling through i64/u64 and widening back is exact.
        if hi - lo < u64::MAX as i128 {
            let span = (hi - lo) as u64;
            lo + rng.random_range(0..=span) as i128
        } else if lo == 0 {
            // Full 64-bit unsigned range: sample across all of u64, not
            // i64 (which would draw negative values outside [0, 2^64-1]).
            rng.random::<u64>() as i128
        } else {
            // Full 64-bit signed range.
            rng.random::<i64>() as i128
        }
    }
}

/// Run P1 then P2 for one message at one loop seed, drawing both from a
/// single continuing PRNG stream seeded once per `(loop, spec, message)`
/// (spec.md §4.8.1: "a per-message pseudo-random stream", consumed in full
/// across both properties rather than reseeded between them).
pub fn run_message_properties(
    project: &str,
    binding: &MessageBinding,
    loop_seed: u64,
    spec_index: usize,
    msg_index: usize,
    cases_per_seed: u32,
) -> Vec<PropertyFailure> {
    let stream_seed = message_stream_seed(loop_seed, spec_index, msg_index, binding.message.id);
    let mut rng = StdRng::seed_from_u64(stream_seed);

    let mut failures = run_p1(project, binding, &mut rng, loop_seed, cases_per_seed);
    failures.extend(run_p2(project, binding, &mut rng, loop_seed, cases_per_seed));
    failures
}

/// P1 — raw_encode_decode_roundtrip, for one message at one loop seed.
/// Draws from `rng`, which the caller has already seeded for this
/// `(loop, spec, message)` stream.
fn run_p1(
    project: &str,
    binding: &MessageBinding,
    rng: &mut StdRng,
    loop_seed: u64,
    cases_per_seed: u32,
) -> Vec<PropertyFailure> {
    let mut failures = Vec::new();

    let signals = sorted_signals(&binding.message);
    let dlc = binding.message.dlc as usize;

    for case_index in 0..cases_per_seed as usize {
        let raw_values: Vec<i128> = signals
            .iter()
            .map(|s| {
                let (lo, hi) = s.raw_range();
                sample_raw(rng, lo, hi)
            })
            .collect();

        let slots: Vec<i64> = signals
            .iter()
            .zip(&raw_values)
            .map(|(s, v)| slot_from_raw(s.signed, *v))
            .collect();

        let mut payload = vec![0u8; dlc];
        let encode_status = binding.encode(&mut payload, &slots);
        if encode_status != 0 {
            failures.push(PropertyFailure::EncodeStatus {
                project: project.to_string(),
                message: binding.message.name.clone(),
                seed: loop_seed,
                case_index,
                status: encode_status,
            });
            continue;
        }

        let mut decoded_slots = vec![0i64; signals.len()];
        let decode_status = binding.decode(&payload, &mut decoded_slots);
        if decode_status != 0 {
            failures.push(PropertyFailure::DecodeStatus {
                project: project.to_string(),
                message: binding.message.name.clone(),
                seed: loop_seed,
                case_index,
                status: decode_status,
            });
            continue;
        }

        for ((signal, expected), decoded_slot) in signals.iter().zip(&raw_values).zip(&decoded_slots) {
            let actual = raw_from_slot(signal.signed, signal.bit_length, *decoded_slot);
            if actual != *expected {
                failures.push(PropertyFailure::FieldMismatch {
                    project: project.to_string(),
                    message: binding.message.name.clone(),
                    seed: loop_seed,
                    case_index,
                    field: naming::field_name(&signal.name),
                    expected: *expected,
                    actual,
                });
            }
        }
    }

    failures
}

/// P2 — raw_decode_encode_masked_roundtrip, for one message at one loop
/// seed. Draws from `rng`, continuing the same stream P1 left off.
fn run_p2(
    project: &str,
    binding: &MessageBinding,
    rng: &mut StdRng,
    loop_seed: u64,
    cases_per_seed: u32,
) -> Vec<PropertyFailure> {
    let mut failures = Vec::new();

    let signals = sorted_signals(&binding.message);
    let dlc = binding.message.dlc as usize;

    let occupied: BTreeSet<u32> = signals
        .iter()
        .flat_map(|s| occupied_bits(s.byte_order, s.start_bit, s.bit_length))
        .collect();

    for case_index in 0..cases_per_seed as usize {
        let mut original = vec![0u8; dlc];
        rng.fill(original.as_mut_slice());

        let mut decoded_slots = vec![0i64; signals.len()];
        let decode_status = binding.decode(&original, &mut decoded_slots);
        if decode_status != 0 {
            failures.push(PropertyFailure::DecodeStatus {
                project: project.to_string(),
                message: binding.message.name.clone(),
                seed: loop_seed,
                case_index,
                status: decode_status,
            });
            continue;
        }

        let mut reencoded = vec![0u8; dlc];
        let encode_status = binding.encode(&mut reencoded, &decoded_slots);
        if encode_status != 0 {
            failures.push(PropertyFailure::EncodeStatus {
                project: project.to_string(),
                message: binding.message.name.clone(),
                seed: loop_seed,
                case_index,
                status: encode_status,
            });
            continue;
        }

        for bit in 0..(8 * dlc as u32) {
            let byte = (bit / 8) as usize;
            let shift = bit % 8;
            let original_bit = (original[byte] >> shift) & 1;
            let reencoded_bit = (reencoded[byte] >> shift) & 1;
            let expected = if occupied.contains(&bit) { original_bit } else { 0 };
            if reencoded_bit != expected {
                failures.push(PropertyFailure::MaskedBitMismatch {
                    project: project.to_string(),
                    message: binding.message.name.clone(),
                    seed: loop_seed,
                    case_index,
                    bit,
                    expected,
                    actual: reencoded_bit,
                });
            }
        }
    }

    failures
}

fn sorted_signals(message: &specgo_ir::Message) -> Vec<&specgo_ir::Signal> {
    let mut signals: Vec<&specgo_ir::Signal> = message.signals.iter().collect();
    signals.sort_by(|a, b| a.start_bit.cmp(&b.start_bit).then_with(|| a.name.cmp(&b.name)));
    signals
}
