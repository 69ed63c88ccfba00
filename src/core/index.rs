//! Catalog index: procedures keyed by name and version.
//!
//! `CatalogIndex::build` normalizes the flat list of catalog field
//! records into per-procedure groups, each carrying the equipment
//! block its production data routes to.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::core::field::{FieldRecord, ProcedureKey};

/// Catalog integrity violation detected while building the index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// A single procedure's records name more than one linked block,
    /// so its rows cannot be routed to one sheet.
    #[error(
        "procedure {key} is linked to more than one block: {existing} and {conflicting}"
    )]
    BlockConflict {
        /// Procedure whose records disagree
        key: ProcedureKey,
        /// Block named by the first record of the group
        existing: String,
        /// Block named by the offending record
        conflicting: String,
    },
}

/// One indexed procedure: its routing block plus its fields in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcedureEntry {
    /// Equipment block all of this procedure's records agree on
    pub block: String,

    /// Fields in the order the catalog listed them
    pub fields: Vec<FieldRecord>,
}

impl ProcedureEntry {
    /// Iterate over the fields that participate in logbook synthesis.
    pub fn production_fields(&self) -> impl Iterator<Item = &FieldRecord> {
        self.fields.iter().filter(|field| field.is_production())
    }

    /// Count the fields that participate in logbook synthesis.
    pub fn production_field_count(&self) -> usize {
        self.production_fields().count()
    }
}

/// Lookup from (procedure_name, procedure_version) to block and fields.
///
/// Procedures keep the order of their first appearance in the catalog,
/// and each group keeps its fields in catalog order. Building the
/// index never mutates or reorders the input records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogIndex {
    procedures: IndexMap<ProcedureKey, ProcedureEntry>,
}

impl CatalogIndex {
    /// Group catalog records by (name, version).
    ///
    /// All records are kept, whatever their data kind, so that a
    /// procedure made only of auxiliary fields is still a known
    /// procedure during validation. Returns a `BlockConflict` as soon
    /// as a group's records disagree on the linked block.
    pub fn build(fields: impl IntoIterator<Item = FieldRecord>) -> Result<Self, CatalogError> {
        let mut procedures: IndexMap<ProcedureKey, ProcedureEntry> = IndexMap::new();

        for field in fields {
            match procedures.entry(field.key()) {
                indexmap::map::Entry::Occupied(mut slot) => {
                    if slot.get().block != field.linked_block {
                        return Err(CatalogError::BlockConflict {
                            key: slot.key().clone(),
                            existing: slot.get().block.clone(),
                            conflicting: field.linked_block,
                        });
                    }
                    slot.get_mut().fields.push(field);
                }
                indexmap::map::Entry::Vacant(slot) => {
                    slot.insert(ProcedureEntry {
                        block: field.linked_block.clone(),
                        fields: vec![field],
                    });
                }
            }
        }

        Ok(Self { procedures })
    }

    /// Look up a procedure by key.
    pub fn get(&self, key: &ProcedureKey) -> Option<&ProcedureEntry> {
        self.procedures.get(key)
    }

    /// Check whether a procedure exists in the catalog.
    pub fn contains(&self, key: &ProcedureKey) -> bool {
        self.procedures.contains_key(key)
    }

    /// Number of distinct (name, version) procedures.
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// Check whether the catalog holds no procedures at all.
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Iterate over procedures in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProcedureKey, &ProcedureEntry)> {
        self.procedures.iter()
    }

    /// Distinct equipment blocks in first-appearance order.
    pub fn blocks(&self) -> Vec<&str> {
        let mut blocks = Vec::new();
        for entry in self.procedures.values() {
            if !blocks.contains(&entry.block.as_str()) {
                blocks.push(entry.block.as_str());
            }
        }
        blocks
    }
}
