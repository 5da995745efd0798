pub mod functions;
pub mod types;

use std::fmt::Write;

use specgo_ir::{naming, Message, SpecIr};

use crate::error::CodegenError;

/// `Message`s of `spec`, sorted by `(id, name)` per D1.
fn sorted_messages(spec: &SpecIr) -> Vec<&Message> {
    let mut messages: Vec<&Message> = spec.messages.iter().collect();
    messages.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)));
    messages
}

/// Render the `(header, source)` pair for `spec`. Returns every
/// [`CodegenError`] found (e.g. oversized signals, `unknown` byte order)
/// rather than stopping at the first one.
pub fn render(spec: &SpecIr) -> Result<(String, String), Vec<CodegenError>> {
    let proj_c = naming::project_c_name(&spec.meta.name);
    let guard = naming::header_guard(&proj_c);
    let (header_name, _source_name) = naming::output_filenames(&proj_c);

    let messages = sorted_messages(spec);
    let mut errors = Vec::new();

    let mut struct_decls = String::new();
    let mut macro_decls = String::new();
    let mut prototypes = String::new();
    let mut encode_fns = String::new();
    let mut decode_fns = String::new();

    for message in &messages {
        let msg_c = naming::c_identifier(&message.name);

        struct_decls.push_str(&types::emit_struct(&proj_c, &msg_c, message));
        macro_decls.push_str(&types::emit_macros(&proj_c, &msg_c, message));
        prototypes.push_str(&types::emit_prototypes(&proj_c, &msg_c));

        match functions::emit_encode_fn(&proj_c, &msg_c, message) {
            Ok(code) => encode_fns.push_str(&code),
            Err(mut errs) => errors.append(&mut errs),
        }
        match functions::emit_decode_fn(&proj_c, &msg_c, message) {
            Ok(code) => decode_fns.push_str(&code),
            Err(mut errs) => errors.append(&mut errs),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut header = String::new();
    let _ = writeln!(header, "#ifndef {}", guard);
    let _ = writeln!(header, "#define {}", guard);
    header.push('\n');
    let _ = writeln!(header, "#include <stdint.h>");
    let _ = writeln!(header, "#include <stddef.h>");
    header.push('\n');
    header.push_str(&macro_decls);
    header.push_str(&struct_decls);
    header.push_str(&prototypes);
    let _ = writeln!(header, "#endif /* {} */", guard);

    let mut source = String::new();
    let _ = writeln!(source, "#include \"{}\"", header_name);
    let _ = writeln!(source, "#include <string.h>");
    source.push('\n');
    source.push_str(&encode_fns);
    source.push_str(&decode_fns);

    Ok((header, source))
}
