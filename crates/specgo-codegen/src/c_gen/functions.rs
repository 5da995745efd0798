//! C encode/decode function body emission.
//!
//! Implements the ABI contract of spec.md §4.6: the encoder masks each raw
//! input to its signal's bit width (two's-complement truncation for
//! signed signals) and writes bits in Bit-Layout-Engine order; the decoder
//! reads the same positions into an unsigned accumulator and sign-extends
//! for signed signals. Q2 is pinned here: a 64-bit signed signal is
//! reinterpreted as `uint64_t` and passed through the ordinary packing
//! path — no sign-extension step runs when `bit_length == 64`, since the
//! accumulator already holds the full-width pattern.

use std::fmt::Write;

use specgo_ir::bitlayout::occupied_bits_for_codegen;
use specgo_ir::{naming, Message, Signal};

use crate::c_gen::types::{field_c_type, sorted_signals};
use crate::error::CodegenError;

fn raw_mask_literal(bit_length: u32) -> String {
    if bit_length >= 64 {
        "0xffffffffffffffffULL".to_string()
    } else {
        format!("0x{:x}ULL", (1u64 << bit_length) - 1)
    }
}

fn bits_array_name(proj_c: &str, msg_c: &str, sig_c: &str, suffix: &str) -> String {
    format!("{}_{}_{}_{}_BITS", proj_c.to_uppercase(), msg_c.to_uppercase(), sig_c.to_uppercase(), suffix)
}

fn emit_bits_array(out: &mut String, array_name: &str, bits: &[u32]) {
    let literals: Vec<String> = bits.iter().map(|b| b.to_string()).collect();
    let _ = writeln!(
        out,
        "        static const uint16_t {}[{}] = {{{}}};",
        array_name,
        bits.len(),
        literals.join(", ")
    );
}

/// Emit the full encoder function for one message.
pub fn emit_encode_fn(
    proj_c: &str,
    msg_c: &str,
    message: &Message,
) -> Result<String, Vec<CodegenError>> {
    let mut errors = Vec::new();
    let mut body = String::new();

    for signal in sorted_signals(message) {
        match signal_encode_block(proj_c, msg_c, message, signal) {
            Ok(block) => body.push_str(&block),
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let struct_name = naming::struct_name(proj_c, msg_c);
    let dlc_macro = naming::dlc_macro_name(proj_c, msg_c);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "int {}(uint8_t* payload, size_t len, const {}* in) {{",
        naming::encode_fn_name(proj_c, msg_c),
        struct_name
    );
    let _ = writeln!(out, "    if (len < {}) {{", dlc_macro);
    let _ = writeln!(out, "        return 1;");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "    memset(payload, 0, {});", dlc_macro);
    out.push_str(&body);
    let _ = writeln!(out, "    return 0;");
    let _ = writeln!(out, "}}");
    out.push('\n');
    Ok(out)
}

fn signal_encode_block(
    proj_c: &str,
    msg_c: &str,
    message: &Message,
    signal: &Signal,
) -> Result<String, CodegenError> {
    let bits = occupied_bits_for_codegen(signal.byte_order, signal.start_bit, signal.bit_length)
        .map_err(|_| CodegenError::UnsupportedByteOrder {
            message: message.name.clone(),
            signal: signal.name.clone(),
        })?;

    if signal.bit_length > 64 {
        return Err(CodegenError::SignalTooWide {
            message: message.name.clone(),
            signal: signal.name.clone(),
            bit_length: signal.bit_length,
        });
    }

    let sig_c = naming::field_name(&signal.name);
    let array_name = bits_array_name(proj_c, msg_c, &sig_c, "ENC");
    let mut out = String::new();
    let _ = writeln!(out, "    {{");
    emit_bits_array(&mut out, &array_name, &bits);
    let _ = writeln!(out, "        uint64_t v = (uint64_t)in->{};", sig_c);
    let _ = writeln!(out, "        v &= {};", raw_mask_literal(signal.bit_length));
    let _ = writeln!(out, "        for (size_t i = 0; i < {}; i++) {{", bits.len());
    let _ = writeln!(out, "            uint16_t pos = {}[i];", array_name);
    let _ = writeln!(out, "            if ((v >> i) & 1ULL) {{");
    let _ = writeln!(
        out,
        "                payload[pos / 8] |= (uint8_t)(1u << (pos % 8));"
    );
    let _ = writeln!(out, "            }}");
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "    }}");
    Ok(out)
}

/// Emit the full decoder function for one message.
pub fn emit_decode_fn(
    proj_c: &str,
    msg_c: &str,
    message: &Message,
) -> Result<String, Vec<CodegenError>> {
    let mut errors = Vec::new();
    let mut body = String::new();

    for signal in sorted_signals(message) {
        match signal_decode_block(proj_c, msg_c, message, signal) {
            Ok(block) => body.push_str(&block),
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let struct_name = naming::struct_name(proj_c, msg_c);
    let dlc_macro = naming::dlc_macro_name(proj_c, msg_c);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "int {}(const uint8_t* payload, size_t len, {}* out) {{",
        naming::decode_fn_name(proj_c, msg_c),
        struct_name
    );
    let _ = writeln!(out, "    if (len < {}) {{", dlc_macro);
    let _ = writeln!(out, "        return 1;");
    let _ = writeln!(out, "    }}");
    out.push_str(&body);
    let _ = writeln!(out, "    return 0;");
    let _ = writeln!(out, "}}");
    out.push('\n');
    Ok(out)
}

fn signal_decode_block(
    proj_c: &str,
    msg_c: &str,
    message: &Message,
    signal: &Signal,
) -> Result<String, CodegenError> {
    let bits = occupied_bits_for_codegen(signal.byte_order, signal.start_bit, signal.bit_length)
        .map_err(|_| CodegenError::UnsupportedByteOrder {
            message: message.name.clone(),
            signal: signal.name.clone(),
        })?;

    if signal.bit_length > 64 {
        return Err(CodegenError::SignalTooWide {
            message: message.name.clone(),
            signal: signal.name.clone(),
            bit_length: signal.bit_length,
        });
    }

    let sig_c = naming::field_name(&signal.name);
    let array_name = bits_array_name(proj_c, msg_c, &sig_c, "DEC");
    let mut out = String::new();
    let _ = writeln!(out, "    {{");
    emit_bits_array(&mut out, &array_name, &bits);
    let _ = writeln!(out, "        uint64_t acc = 0;");
    let _ = writeln!(out, "        for (size_t i = 0; i < {}; i++) {{", bits.len());
    let _ = writeln!(out, "            uint16_t pos = {}[i];", array_name);
    let _ = writeln!(
        out,
        "            uint64_t bit = (uint64_t)((payload[pos / 8] >> (pos % 8)) & 1u);"
    );
    let _ = writeln!(out, "            acc |= bit << i;");
    let _ = writeln!(out, "        }}");

    if signal.signed && signal.bit_length < 64 {
        let _ = writeln!(
            out,
            "        if (acc & (1ULL << {})) {{",
            signal.bit_length - 1
        );
        let _ = writeln!(out, "            acc |= ~({});", raw_mask_literal(signal.bit_length));
        let _ = writeln!(out, "        }}");
    }

    let cast = field_c_type(signal);
    let _ = writeln!(out, "        out->{} = ({})acc;", sig_c, cast);
    let _ = writeln!(out, "    }}");
    Ok(out)
}
