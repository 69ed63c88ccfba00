//! Production initialization entries.

use serde::{Deserialize, Serialize};

use crate::core::field::ProcedureKey;

/// One line of the production initialization document: a stack and the
/// procedure (at a specific version) that was applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InitEntry {
    /// Stack identifier (e.g. a serial number)
    pub stack_ref: String,

    /// Name of the applied procedure
    pub procedure_name: String,

    /// Version of the applied procedure
    pub procedure_version: String,
}

impl InitEntry {
    /// Create an entry.
    pub fn new(
        stack_ref: impl Into<String>,
        procedure_name: impl Into<String>,
        procedure_version: impl Into<String>,
    ) -> Self {
        Self {
            stack_ref: stack_ref.into(),
            procedure_name: procedure_name.into(),
            procedure_version: procedure_version.into(),
        }
    }

    /// Get the (name, version) key of the referenced procedure.
    pub fn key(&self) -> ProcedureKey {
        ProcedureKey::new(self.procedure_name.clone(), self.procedure_version.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_key() {
        let entry = InitEntry::new("S042", "Anodizing", "3");
        assert_eq!(entry.key(), ProcedureKey::new("Anodizing", "3"));
        assert_eq!(entry.stack_ref, "S042");
    }
}
