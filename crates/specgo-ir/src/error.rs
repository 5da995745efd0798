//! Diagnostic types for the Schema Validator (Layer 0) and Semantic
//! Validator (Layer 1). Both layers collect every violation in one pass
//! rather than short-circuiting on the first error (spec.md §9, "Validator
//! as accumulator, not short-circuit").

use thiserror::Error;

/// A single `[schema] <path>: <msg>` diagnostic from Layer 0.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[schema] {path}: {message}")]
pub struct SchemaError {
    /// Dotted/indexed field path, e.g. `messages[2].signals[0].start_bit`.
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A single `[semantic]` diagnostic from Layer 1, always naming the
/// offending message (and signal, where applicable).
#[derive(Debug, Clone, PartialEq, Error)]
pub struct SemanticError {
    pub message_name: String,
    pub message_id: u32,
    pub signal_name: Option<String>,
    pub detail: String,
}

impl SemanticError {
    pub fn new(message_name: impl Into<String>, message_id: u32, detail: impl Into<String>) -> Self {
        Self {
            message_name: message_name.into(),
            message_id,
            signal_name: None,
            detail: detail.into(),
        }
    }

    pub fn for_signal(
        message_name: impl Into<String>,
        message_id: u32,
        signal_name: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            message_name: message_name.into(),
            message_id,
            signal_name: Some(signal_name.into()),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[semantic] message {} (id={})",
            self.message_name, self.message_id
        )?;
        if let Some(signal) = &self.signal_name {
            write!(f, " signal {}", signal)?;
        }
        write!(f, ": {}", self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_formats_with_prefix_and_path() {
        let e = SchemaError::new("messages[0].dlc", "must be >= 0");
        assert_eq!(e.to_string(), "[schema] messages[0].dlc: must be >= 0");
    }

    #[test]
    fn semantic_error_formats_with_signal_suffix() {
        let e = SemanticError::for_signal("Engine", 100, "RPM", "overlaps with Torque");
        assert_eq!(
            e.to_string(),
            "[semantic] message Engine (id=100) signal RPM: overlaps with Torque"
        );
    }

    #[test]
    fn semantic_error_formats_without_signal_suffix() {
        let e = SemanticError::new("Engine", 100, "dlc out of range");
        assert_eq!(
            e.to_string(),
            "[semantic] message Engine (id=100): dlc out of range"
        );
    }
}
