//! Naming Policy
//!
//! Deterministic, total mapping from user-supplied textual names (project
//! name, message name, signal name) to stable C identifiers, file names,
//! macro names and function symbols. Every function here is a pure function
//! of its inputs; there is no global or thread-local state.

/* Fixed project tag baked into every generated header guard and is
 * independent of the project's own name. */
const PROJECT_TAG: &str = "SPECGO";

/// Convert an arbitrary string into a valid C identifier.
///
/// Replaces every character outside `[A-Za-z0-9_]` with `_`, strips
/// leading/trailing underscores, falls back to `unnamed` for an empty
/// result, and prefixes a leading digit with `_`.
pub fn c_identifier(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    let trimmed = replaced.trim_matches('_');

    if trimmed.is_empty() {
        return "unnamed".to_string();
    }

    if trimmed.chars().next().unwrap().is_ascii_digit() {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// The project's C identifier, derived from `IRMeta.name`.
pub fn project_c_name(meta_name: &str) -> String {
    c_identifier(meta_name)
}

/// `(header, source)` output filenames for a project.
pub fn output_filenames(proj_c: &str) -> (String, String) {
    (
        format!("{}_protocol.h", proj_c),
        format!("{}_protocol.c", proj_c),
    )
}

/// Header include guard macro name.
pub fn header_guard(proj_c: &str) -> String {
    format!("{}_{}_PROTOCOL_H", PROJECT_TAG, proj_c.to_uppercase())
}

/// Per-message struct type name, e.g. `<projC>_<msgC>_t`.
pub fn struct_name(proj_c: &str, msg_c: &str) -> String {
    format!("{}_{}_t", proj_c, msg_c)
}

/// Encoder function symbol, e.g. `<projC>_encode_<msgC>`.
pub fn encode_fn_name(proj_c: &str, msg_c: &str) -> String {
    format!("{}_encode_{}", proj_c, msg_c)
}

/// Decoder function symbol, e.g. `<projC>_decode_<msgC>`.
pub fn decode_fn_name(proj_c: &str, msg_c: &str) -> String {
    format!("{}_decode_{}", proj_c, msg_c)
}

/// `ID` macro name for a message, e.g. `SPECGO_<PROJC>_<MSGC>_ID`.
pub fn id_macro_name(proj_c: &str, msg_c: &str) -> String {
    format!(
        "{}_{}_{}_ID",
        PROJECT_TAG,
        proj_c.to_uppercase(),
        msg_c.to_uppercase()
    )
}

/// `DLC` macro name for a message, e.g. `SPECGO_<PROJC>_<MSGC>_DLC`.
pub fn dlc_macro_name(proj_c: &str, msg_c: &str) -> String {
    format!(
        "{}_{}_{}_DLC",
        PROJECT_TAG,
        proj_c.to_uppercase(),
        msg_c.to_uppercase()
    )
}

/// Field name inside a generated struct, derived from a signal name.
pub fn field_name(signal_name: &str) -> String {
    c_identifier(signal_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_identifier_replaces_invalid_chars() {
        assert_eq!(c_identifier("Engine RPM"), "Engine_RPM");
        assert_eq!(c_identifier("a-b.c"), "a_b_c");
    }

    #[test]
    fn c_identifier_strips_leading_trailing_underscores() {
        assert_eq!(c_identifier("__foo__"), "foo");
    }

    #[test]
    fn c_identifier_empty_falls_back_to_unnamed() {
        assert_eq!(c_identifier(""), "unnamed");
        assert_eq!(c_identifier("___"), "unnamed");
        assert_eq!(c_identifier("---"), "unnamed");
    }

    #[test]
    fn c_identifier_prefixes_leading_digit() {
        assert_eq!(c_identifier("1wheel"), "_1wheel");
    }

    #[test]
    fn symbols_follow_documented_shapes() {
        let proj = project_c_name("My Bus!");
        assert_eq!(proj, "My_Bus");
        assert_eq!(header_guard(&proj), "SPECGO_MY_BUS_PROTOCOL_H");
        assert_eq!(struct_name(&proj, "Engine"), "My_Bus_Engine_t");
        assert_eq!(encode_fn_name(&proj, "Engine"), "My_Bus_encode_Engine");
        assert_eq!(decode_fn_name(&proj, "Engine"), "My_Bus_decode_Engine");
        assert_eq!(id_macro_name(&proj, "Engine"), "SPECGO_MY_BUS_ENGINE_ID");
        assert_eq!(dlc_macro_name(&proj, "Engine"), "SPECGO_MY_BUS_ENGINE_DLC");
        let (h, c) = output_filenames(&proj);
        assert_eq!(h, "My_Bus_protocol.h");
        assert_eq!(c, "My_Bus_protocol.c");
    }
}
