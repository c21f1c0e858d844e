//! In-memory metadata provider for embedding and tests

use super::model::TableMetadata;
use super::{MetadataProvider, TableIdentifier};
use crate::error::{CodegenError, Result};

/// Metadata provider over tables registered in code
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataProvider {
    tables: Vec<TableMetadata>,
}

impl MemoryMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table; a table with the same identifier is replaced
    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.tables
            .retain(|t| !(t.schema == table.schema && t.name == table.name));
        self.tables.push(table);
        self
    }

    /// Register a table with no columns
    pub fn with_empty_table(self, schema: &str, name: &str) -> Self {
        self.with_table(TableMetadata::new(schema, name))
    }
}

impl MetadataProvider for MemoryMetadataProvider {
    fn tables_of(&self, schema: &str) -> Result<Vec<String>> {
        Ok(self
            .tables
            .iter()
            .filter(|t| t.schema == schema)
            .map(|t| t.name.clone())
            .collect())
    }

    fn describe(&self, table: &TableIdentifier) -> Result<TableMetadata> {
        self.tables
            .iter()
            .find(|t| t.identifier().as_ref() == Some(table))
            .cloned()
            .ok_or_else(|| CodegenError::MetadataError(format!("table {} not found", table)))
    }
}
