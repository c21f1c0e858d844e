//! Database metadata: table identifiers, providers and the per-run snapshot

mod ddl;
mod identifier;
mod memory;
mod model;

pub use ddl::*;
pub use identifier::*;
pub use memory::*;
pub use model::*;

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;

/// Source of database schema information
pub trait MetadataProvider {
    /// Table names known for a schema, in the provider's order
    fn tables_of(&self, schema: &str) -> Result<Vec<String>>;

    /// Column-level metadata for a single table
    fn describe(&self, table: &TableIdentifier) -> Result<TableMetadata>;
}

/// Table names per schema, fetched once per run
#[derive(Debug, Clone, Default)]
pub struct MetadataSnapshot {
    tables: HashMap<String, Vec<String>>,
}

impl MetadataSnapshot {
    /// Query the provider for every schema; any failure aborts the fetch
    pub fn fetch<S: AsRef<str>>(provider: &dyn MetadataProvider, schemas: &[S]) -> Result<Self> {
        let mut tables = HashMap::new();
        for schema in schemas {
            let schema = schema.as_ref();
            if tables.contains_key(schema) {
                continue;
            }
            let names = provider.tables_of(schema)?;
            debug!("Schema {} has {} tables", schema, names.len());
            tables.insert(schema.to_string(), names);
        }
        Ok(Self { tables })
    }

    /// Table names of a schema; empty for schemas that were not fetched
    pub fn tables_of(&self, schema: &str) -> &[String] {
        self.tables.get(schema).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every known table, schema order first, deduplicated
    pub fn known_tables<S: AsRef<str>>(&self, schemas: &[S]) -> Result<Vec<TableIdentifier>> {
        let mut seen = std::collections::HashSet::new();
        let mut known = Vec::new();
        for schema in schemas {
            let schema = schema.as_ref();
            for table in self.tables_of(schema) {
                let id = TableIdentifier::new(schema, table.as_str())?;
                if seen.insert(id.clone()) {
                    known.push(id);
                }
            }
        }
        Ok(known)
    }
}
