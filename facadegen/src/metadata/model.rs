//! What a renderer needs to know about one table

use serde::{Deserialize, Serialize};

use super::TableIdentifier;

/// A table as reported by a metadata provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub schema: String,
    pub name: String,
    pub comment: Option<String>,
    /// Columns in declaration order
    pub columns: Vec<ColumnMetadata>,
    /// Primary key column names in key order; empty when the table has none
    pub primary_key: Vec<String>,
    /// Secondary indexes, unique constraints included
    pub indexes: Vec<IndexMetadata>,
    pub foreign_keys: Vec<ForeignKeyMetadata>,
}

/// A column and its classified SQL type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub comment: Option<String>,
}

/// Column types, grouped by the Rust type they map to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    /// `BOOL`, `BOOLEAN`, `TINYINT(1)` and `BIT(1)`
    Bool,
    /// Integer of the given storage width in bits
    Integer { bits: u8, unsigned: bool },
    /// Floating point of the given width in bits
    Float { bits: u8 },
    /// `DECIMAL` and `NUMERIC`
    Decimal,
    Text,
    Binary,
    Date,
    DateTime,
    Time,
    Json,
    /// `ENUM` with its values in declaration order
    Enum(Vec<String>),
    /// Anything else, kept as written in the DDL
    Other(String),
}

/// A named index over one or more columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// A single-column reference to another table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyMetadata {
    pub column: String,
    pub target_table: String,
    pub target_column: String,
}

impl TableMetadata {
    /// A table with no columns or keys
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            comment: None,
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Identifier of this table, if both segments form a valid identifier
    pub fn identifier(&self) -> Option<TableIdentifier> {
        TableIdentifier::new(self.schema.clone(), self.name.clone()).ok()
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnMetadata> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Key and reference notes for a column, in doc-comment form
    pub fn column_notes(&self, column: &str) -> Vec<String> {
        let mut notes = Vec::new();
        if self.primary_key.iter().any(|c| c == column) {
            notes.push("PRIMARY KEY".to_string());
        }
        for index in self.indexes.iter().filter(|i| i.columns.iter().any(|c| c == column)) {
            let kind = if index.unique { "UNIQUE" } else { "INDEX" };
            notes.push(format!("{}: {}", kind, index.name));
        }
        for fk in self.foreign_keys.iter().filter(|fk| fk.column == column) {
            notes.push(format!("-> {}.{}", fk.target_table, fk.target_column));
        }
        notes
    }
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, sql_type: SqlType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable,
            comment: None,
        }
    }

    /// Values of an `ENUM` column
    pub fn enum_values(&self) -> Option<&[String]> {
        match &self.sql_type {
            SqlType::Enum(values) => Some(values),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_notes() {
        let mut table = TableMetadata::new("sales", "orders");
        table.primary_key = vec!["id".to_string()];
        table.indexes.push(IndexMetadata {
            name: "uk_ref".to_string(),
            columns: vec!["id".to_string(), "customer_id".to_string()],
            unique: true,
        });
        table.foreign_keys.push(ForeignKeyMetadata {
            column: "customer_id".to_string(),
            target_table: "customers".to_string(),
            target_column: "id".to_string(),
        });

        assert_eq!(table.column_notes("id"), vec!["PRIMARY KEY", "UNIQUE: uk_ref"]);
        assert_eq!(
            table.column_notes("customer_id"),
            vec!["UNIQUE: uk_ref", "-> customers.id"]
        );
        assert!(table.column_notes("note").is_empty());
    }

    #[test]
    fn test_enum_values() {
        let status = ColumnMetadata::new(
            "status",
            SqlType::Enum(vec!["NEW".to_string(), "PAID".to_string()]),
            false,
        );
        assert_eq!(status.enum_values().map(<[String]>::len), Some(2));
        assert_eq!(ColumnMetadata::new("id", SqlType::Decimal, false).enum_values(), None);
    }

    #[test]
    fn test_identifier_requires_valid_segments() {
        assert_eq!(
            TableMetadata::new("sales", "orders").identifier(),
            Some("sales.orders".parse().unwrap())
        );
        assert_eq!(TableMetadata::new("", "orders").identifier(), None);
    }
}
