//! C struct and macro emission for one message.

use std::fmt::Write;

use specgo_ir::{naming, Message, Signal};

/// C storage type for a signal's raw (unscaled) field: `int64_t` for
/// signed signals, `uint64_t` otherwise — "raw value, not scaled" is the
/// canonical ABI (spec.md §4.6).
pub fn field_c_type(signal: &Signal) -> &'static str {
    if signal.signed {
        "int64_t"
    } else {
        "uint64_t"
    }
}

/// Signals of `message`, sorted by `(start_bit, name)` per D2.
pub fn sorted_signals(message: &Message) -> Vec<&Signal> {
    let mut signals: Vec<&Signal> = message.signals.iter().collect();
    signals.sort_by(|a, b| a.start_bit.cmp(&b.start_bit).then_with(|| a.name.cmp(&b.name)));
    signals
}

/// Emit the `typedef struct { ... } <projC>_<msgC>_t;` declaration for one
/// message, fields in the documented sort order.
pub fn emit_struct(proj_c: &str, msg_c: &str, message: &Message) -> String {
    let mut out = String::new();
    let struct_name = naming::struct_name(proj_c, msg_c);

    let _ = writeln!(out, "typedef struct {} {{", struct_name);
    for signal in sorted_signals(message) {
        let _ = writeln!(
            out,
            "    {} {};",
            field_c_type(signal),
            naming::field_name(&signal.name)
        );
    }
    let _ = writeln!(out, "}} {};", struct_name);
    out.push('\n');
    out
}

/// Emit the `ID`/`DLC` macro pair for one message.
pub fn emit_macros(proj_c: &str, msg_c: &str, message: &Message) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "#define {} {}",
        naming::id_macro_name(proj_c, msg_c),
        message.id
    );
    let _ = writeln!(
        out,
        "#define {} {}",
        naming::dlc_macro_name(proj_c, msg_c),
        message.dlc
    );
    out.push('\n');
    out
}

/// Emit the two encode/decode prototypes for one message.
pub fn emit_prototypes(proj_c: &str, msg_c: &str) -> String {
    let struct_name = naming::struct_name(proj_c, msg_c);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "int {}(uint8_t* payload, size_t len, const {}* in);",
        naming::encode_fn_name(proj_c, msg_c),
        struct_name
    );
    let _ = writeln!(
        out,
        "int {}(const uint8_t* payload, size_t len, {}* out);",
        naming::decode_fn_name(proj_c, msg_c),
        struct_name
    );
    out.push('\n');
    out
}
