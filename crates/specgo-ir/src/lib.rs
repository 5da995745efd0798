//! IR semantic model and validator for embedded-bus message catalogs.
//!
//! This crate is the authoritative description of messages/signals and the
//! invariants that must hold before code is generated: the typed IR model,
//! the Naming Policy used to derive stable C symbols, the two-layer
//! validator (schema shape, then semantic cross-field invariants), and the
//! Bit-Layout Engine shared by both the Semantic Validator and the codegen
//! crate.

pub mod bitlayout;
pub mod error;
pub mod model;
pub mod naming;
pub mod schema;
pub mod semantic;

pub use error::{SchemaError, SemanticError};
pub use model::{
    BusKind, BusMode, BusType, ByteOrder, Direction, EnumEntry, IrMeta, Message, OriginalFormat,
    Signal, SpecIr, CURRENT_IR_VERSION,
};
