//! IR Model
//!
//! Typed entities describing one embedded-bus message catalog: metadata,
//! transport classification, messages and their bit-packed signals. These
//! are pure data structures — no file I/O, no validation logic. Structural
//! shape/type checks live in [`crate::schema`]; cross-field invariants live
//! in [`crate::semantic`].
//!
//! Instances are produced once by [`crate::schema::validate`], checked once
//! by [`crate::semantic::validate`], and then treated as immutable inputs to
//! codegen and verification.

use serde::{Deserialize, Serialize};

/// Original format the catalog was distilled from, before it reached the
/// IR. Provenance only — no ingester for these formats is part of this
/// system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginalFormat {
    Dbc,
    Pdf,
    Text,
    Md,
}

/// Identifying header for one spec file. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrMeta {
    /// Used as the codegen project prefix (see `specgo_ir::naming`).
    pub name: String,
    pub version: String,
    pub source: String,
    pub original_format: OriginalFormat,
}

/// Transport classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    Can,
    Uart,
    Spi,
    I2c,
    Unknown,
}

/// CAN sub-mode. Meaningful only when `BusKind::Can`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusMode {
    Classic,
    Fd,
}

/// Transport-level descriptor, optionally overridden per message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusType {
    pub kind: BusKind,
    #[serde(default)]
    pub mode: Option<BusMode>,
    #[serde(default)]
    pub bit_rates: Option<Vec<u64>>,
}

impl Default for BusType {
    fn default() -> Self {
        Self {
            kind: BusKind::Unknown,
            mode: None,
            bit_rates: None,
        }
    }
}

/// Byte-order / bit-numbering convention of a signal.
///
/// This is the tagged variant from the bit-layout engine's contract
/// (spec.md §4.5, §9 "Polymorphism over byte order"): downstream code never
/// branches on the variant itself, only on the bit sequence
/// [`crate::bitlayout::occupied_bits`] returns for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
    Unknown,
}

/// One (name, integer value, optional description) entry in a signal's
/// enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumEntry {
    pub name: String,
    pub value: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// A contiguous bit-field inside a message payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub start_bit: u32,
    pub bit_length: u32,
    pub byte_order: ByteOrder,
    pub signed: bool,
    pub scale: f64,
    pub offset: f64,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub default: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub enum_entries: Option<Vec<EnumEntry>>,
}

impl Signal {
    /// `[min_bit, max_bit)` — the absolute payload bit range this signal
    /// could occupy, independent of byte order (used for DLC bound checks;
    /// the ordered occupied-bit sequence itself comes from
    /// `crate::bitlayout`).
    pub fn naive_bit_span(&self) -> (u32, u32) {
        (self.start_bit, self.start_bit + self.bit_length)
    }

    /// Unsigned representable range `[0, 2^n - 1]`, or signed range
    /// `[-2^(n-1), 2^(n-1) - 1]`, per I7, clamped at 64-bit machine limits
    /// when `bit_length == 64`.
    pub fn raw_range(&self) -> (i128, i128) {
        let n = self.bit_length.min(64);
        if self.signed {
            if n == 64 {
                (i64::MIN as i128, i64::MAX as i128)
            } else {
                (-(1i128 << (n - 1)), (1i128 << (n - 1)) - 1)
            }
        } else if n == 64 {
            (0, u64::MAX as i128)
        } else {
            (0, (1i128 << n) - 1)
        }
    }
}

/// Direction tag for a message relative to the host ECU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Tx,
    Rx,
    #[serde(rename = "tx/rx")]
    TxRx,
    Unknown,
}

/// A framed payload: one CAN/CAN-FD/UART/... frame definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u32,
    pub name: String,
    /// Payload length in bytes.
    pub dlc: u32,
    #[serde(default)]
    pub extended: bool,
    #[serde(default)]
    pub fd: bool,
    #[serde(default)]
    pub bus: Option<BusType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_direction")]
    pub direction: Direction,
    pub signals: Vec<Signal>,
}

fn default_direction() -> Direction {
    Direction::Unknown
}

/// Root container for one IR file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecIr {
    #[serde(default = "default_ir_version")]
    pub ir_version: String,
    pub meta: IrMeta,
    #[serde(default)]
    pub bus: BusType,
    pub messages: Vec<Message>,
}

fn default_ir_version() -> String {
    CURRENT_IR_VERSION.to_string()
}

pub const CURRENT_IR_VERSION: &str = "0.1";
