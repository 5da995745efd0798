//! Bit-Layout Engine
//!
//! The single source of truth for mapping `(start_bit, bit_length,
//! byte_order)` to the ordered set of absolute payload bit positions a
//! signal occupies. Both the Semantic Validator (overlap/DLC checks) and
//! the Codegen Renderer (packing order) consume this module; neither
//! branches on byte order itself (spec.md §9, "Polymorphism over byte
//! order") — they only ever look at the bit index sequence it returns.

use crate::model::ByteOrder;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitLayoutError {
    #[error("byte_order 'unknown' is not accepted at codegen time")]
    UnknownByteOrderAtCodegen,
}

/// The absolute payload bit positions occupied by a signal, ordered from
/// LSB-of-value to MSB-of-value. `byte_order = Unknown` is tolerated here
/// (treated as a contiguous ascending range) — this function backs the
/// Semantic Validator's best-effort overlap/DLC checks. Codegen must call
/// [`occupied_bits_for_codegen`] instead, which makes `Unknown` a hard
/// error (Open Question Q1 resolved: tolerated at validation, rejected at
/// codegen).
pub fn occupied_bits(byte_order: ByteOrder, start_bit: u32, bit_length: u32) -> Vec<u32> {
    match byte_order {
        ByteOrder::LittleEndian | ByteOrder::Unknown => {
            (start_bit..start_bit + bit_length).collect()
        }
        ByteOrder::BigEndian => big_endian_lsb_first(start_bit, bit_length),
    }
}

/// Same as [`occupied_bits`] but rejects `ByteOrder::Unknown` — the policy
/// required at codegen time.
pub fn occupied_bits_for_codegen(
    byte_order: ByteOrder,
    start_bit: u32,
    bit_length: u32,
) -> Result<Vec<u32>, BitLayoutError> {
    if byte_order == ByteOrder::Unknown {
        return Err(BitLayoutError::UnknownByteOrderAtCodegen);
    }
    Ok(occupied_bits(byte_order, start_bit, bit_length))
}

/// Motorola/DBC big-endian bit walk: `start_bit` is the value's MSB,
/// counted in CAN-DBC order (within a byte, bit indices run 7..0 MSB to
/// LSB; byte 0 precedes byte 1). Walks from MSB toward LSB of the value,
/// then reverses to produce the LSB-first ordering used for packing.
fn big_endian_lsb_first(start_bit: u32, bit_length: u32) -> Vec<u32> {
    let mut msb_first = Vec::with_capacity(bit_length as usize);
    let mut bit = start_bit as i64;

    for _ in 0..bit_length {
        msb_first.push(bit as u32);
        if bit % 8 == 0 {
            bit += 15;
        } else {
            bit -= 1;
        }
    }

    msb_first.reverse();
    msb_first
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_is_contiguous_ascending() {
        // Bit-layout equivalence property (spec.md §8): for a
        // little-endian signal with start_bit=s, bit_length=n, the
        // occupied bit set equals {s, s+1, ..., s+n-1}.
        let bits = occupied_bits(ByteOrder::LittleEndian, 3, 5);
        assert_eq!(bits, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn unknown_byte_order_is_tolerated_as_contiguous() {
        let bits = occupied_bits(ByteOrder::Unknown, 0, 4);
        assert_eq!(bits, vec![0, 1, 2, 3]);
    }

    #[test]
    fn unknown_byte_order_rejected_at_codegen() {
        let err = occupied_bits_for_codegen(ByteOrder::Unknown, 0, 4).unwrap_err();
        assert_eq!(err, BitLayoutError::UnknownByteOrderAtCodegen);
    }

    #[test]
    fn big_endian_16_bit_signal_start_7() {
        // S3: 16-bit unsigned big-endian signal, start_bit=7, bit_length=16,
        // spans byte 0 and byte 1 entirely.
        let bits = occupied_bits(ByteOrder::BigEndian, 7, 16);
        let mut sorted = bits.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn big_endian_crosses_byte_boundary_correctly() {
        // start_bit=7 (byte0 MSB), length 8: MSB-first walk is
        // 7,6,5,4,3,2,1,0 (one full byte, no boundary crossing).
        let bits = occupied_bits(ByteOrder::BigEndian, 7, 8);
        assert_eq!(bits, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn big_endian_walk_jumps_to_next_byte_msb_at_boundary() {
        // start_bit=7, length=9: after emitting bit 0 (end of byte 0), the
        // walk jumps to bit 15 (MSB of byte 1).
        let bits = occupied_bits(ByteOrder::BigEndian, 7, 9);
        // MSB-first would be [7,6,5,4,3,2,1,0,15]; reversed (LSB-first):
        assert_eq!(bits, vec![15, 0, 1, 2, 3, 4, 5, 6, 7]);
    }
}
