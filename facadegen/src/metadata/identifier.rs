//! Schema-qualified table identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CodegenError, Result};

/// A table identified by `(schema, table)`
///
/// Ordering is lexicographic by schema, then table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableIdentifier {
    schema: String,
    table: String,
}

impl TableIdentifier {
    /// Build an identifier from two segments that are each safe as a single
    /// path component
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        let table = table.into();
        if !is_valid_segment(&schema) || !is_valid_segment(&table) {
            return Err(CodegenError::InvalidTableName(format!("{}.{}", schema, table)));
        }
        Ok(Self { schema, table })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

/// Non-empty, not `.` or `..`, and free of path separators and NUL
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

impl FromStr for TableIdentifier {
    type Err = CodegenError;

    /// Parse `schema.table`; the first dot separates the two segments
    fn from_str(s: &str) -> Result<Self> {
        let (schema, table) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| CodegenError::InvalidTableName(s.to_string()))?;
        TableIdentifier::new(schema, table).map_err(|_| CodegenError::InvalidTableName(s.to_string()))
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}
