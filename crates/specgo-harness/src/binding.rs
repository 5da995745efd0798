//! Dynamic symbol binding — the concurrency boundary between the campaign
//! and freshly-compiled C code (spec.md §9 "Dynamic symbol binding as the
//! concurrency boundary").
//!
//! A [`ProjectBinding`] owns the loaded [`libloading::Library`] handle and a
//! [`MessageBinding`] per message. Field declaration order controls Rust's
//! drop order (top to bottom): message bindings are declared — and so
//! dropped — before the library handle, matching the release order spec.md
//! §5 and §9 require.

use std::cell::Cell;

use libloading::{Error as LibError, Library, Symbol};
use specgo_ir::{naming, Message, SpecIr};

use crate::error::PreflightFailure;

/// Raw encode/decode function pointers for one message, matching the ABI
/// contract of spec.md §4.6: fields are raw (unscaled) `int64_t`/`uint64_t`
/// slots in `(start_bit, name)` order, so the native record is modeled as a
/// flat `[i64]` buffer of that length — every field is 8 bytes with no
/// padding, since every field shares the same width.
pub struct MessageBinding {
    pub message: Message,
    pub field_count: usize,
    encode_fn: unsafe extern "C" fn(*mut u8, usize, *const i64) -> i32,
    decode_fn: unsafe extern "C" fn(*const u8, usize, *mut i64) -> i32,
    encode_invoked: Cell<bool>,
    decode_invoked: Cell<bool>,
}

impl MessageBinding {
    /// Call the bound encoder. `fields` must have `field_count` elements, in
    /// `(start_bit, name)` order.
    pub fn encode(&self, payload: &mut [u8], fields: &[i64]) -> i32 {
        self.encode_invoked.set(true);
        unsafe { (self.encode_fn)(payload.as_mut_ptr(), payload.len(), fields.as_ptr()) }
    }

    /// Call the bound decoder, writing `field_count` raw values into `out`.
    pub fn decode(&self, payload: &[u8], out: &mut [i64]) -> i32 {
        self.decode_invoked.set(true);
        unsafe { (self.decode_fn)(payload.as_ptr(), payload.len(), out.as_mut_ptr()) }
    }

    pub fn encode_was_invoked(&self) -> bool {
        self.encode_invoked.get()
    }

    pub fn decode_was_invoked(&self) -> bool {
        self.decode_invoked.get()
    }
}

/// The loaded library plus every message's bound function pointers for one
/// spec. Dropping a `ProjectBinding` releases the message bindings before
/// unloading the library.
pub struct ProjectBinding {
    pub messages: Vec<MessageBinding>,
    _library: Library,
}

impl ProjectBinding {
    /// Load `library_path` and bind every message in `spec` by its stable
    /// symbol name (spec.md §4.1).
    pub fn load(spec: &SpecIr, library_path: &std::path::Path) -> Result<Self, PreflightFailure> {
        let library = unsafe { Library::new(library_path) }.map_err(|e| {
            PreflightFailure::Load {
                ir_path: library_path.to_path_buf(),
                detail: e.to_string(),
            }
        })?;

        let proj_c = naming::project_c_name(&spec.meta.name);
        let mut messages = Vec::with_capacity(spec.messages.len());

        for message in sorted_messages(spec) {
            let msg_c = naming::c_identifier(&message.name);
            let encode_symbol = naming::encode_fn_name(&proj_c, &msg_c);
            let decode_symbol = naming::decode_fn_name(&proj_c, &msg_c);

            let encode_fn = unsafe {
                bind_function::<unsafe extern "C" fn(*mut u8, usize, *const i64) -> i32>(
                    &library,
                    &encode_symbol,
                )
            }
            .map_err(|e| PreflightFailure::SymbolResolution {
                ir_path: library_path.to_path_buf(),
                symbol: encode_symbol.clone(),
                detail: e.to_string(),
            })?;

            let decode_fn = unsafe {
                bind_function::<unsafe extern "C" fn(*const u8, usize, *mut i64) -> i32>(
                    &library,
                    &decode_symbol,
                )
            }
            .map_err(|e| PreflightFailure::SymbolResolution {
                ir_path: library_path.to_path_buf(),
                symbol: decode_symbol.clone(),
                detail: e.to_string(),
            })?;

            messages.push(MessageBinding {
                message: message.clone(),
                field_count: message.signals.len(),
                encode_fn,
                decode_fn,
                encode_invoked: Cell::new(false),
                decode_invoked: Cell::new(false),
            });
        }

        Ok(ProjectBinding {
            messages,
            _library: library,
        })
    }

    /// Every expected encode/decode symbol name that was never invoked
    /// (spec.md §4.8 step 5, "function coverage").
    pub fn uninvoked_symbols(&self, proj_c: &str) -> Vec<String> {
        let mut missing = Vec::new();
        for binding in &self.messages {
            let msg_c = naming::c_identifier(&binding.message.name);
            if !binding.encode_was_invoked() {
                missing.push(naming::encode_fn_name(proj_c, &msg_c));
            }
            if !binding.decode_was_invoked() {
                missing.push(naming::decode_fn_name(proj_c, &msg_c));
            }
        }
        missing
    }
}

/// Messages of `spec`, sorted by `(id, name)` — D1, and the order in which
/// the renderer emitted their symbols.
fn sorted_messages(spec: &SpecIr) -> Vec<&Message> {
    let mut messages: Vec<&Message> = spec.messages.iter().collect();
    messages.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)));
    messages
}

/// Resolve `symbol` in `library` and copy out its function pointer. Safe in
/// the sense libloading defines: the caller (`ProjectBinding`) keeps the
/// `Library` alive for at least as long as the returned pointer is used,
/// which is guaranteed here by declaration order (see module docs).
unsafe fn bind_function<T: Copy>(library: &Library, symbol: &str) -> Result<T, LibError> {
    let sym: Symbol<T> = library.get(symbol.as_bytes())?;
    Ok(*sym)
}
