//! DDL-file metadata provider using sqlparser-rs

use std::path::Path;

use sqlparser::ast::{
    ColumnDef, ColumnOption, CreateTable, DataType, EnumMember, Expr, ForeignKeyConstraint, Ident,
    IndexColumn, IndexConstraint, ObjectName, PrimaryKeyConstraint, Statement, TableConstraint,
    UniqueConstraint,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use super::model::*;
use super::{MetadataProvider, TableIdentifier};
use crate::error::{CodegenError, Result};

/// Metadata provider backed by a file of `CREATE TABLE` statements
///
/// Tables named `schema.table` belong to `schema`; unqualified tables belong
/// to the configured default schema.
#[derive(Debug, Clone)]
pub struct DdlMetadataProvider {
    tables: Vec<TableMetadata>,
}

impl DdlMetadataProvider {
    /// Parse DDL text
    pub fn from_sql(sql: &str, default_schema: &str) -> Result<Self> {
        let tables = parse_schema(sql, default_schema)?;
        debug!("Parsed {} tables from DDL", tables.len());
        Ok(Self { tables })
    }

    /// Read and parse a DDL file
    pub fn from_file(path: &Path, default_schema: &str) -> Result<Self> {
        let sql = std::fs::read_to_string(path).map_err(|e| {
            CodegenError::MetadataError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_sql(&sql, default_schema)
    }
}

impl MetadataProvider for DdlMetadataProvider {
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
            .find(|t| t.schema == table.schema() && t.name == table.table())
            .cloned()
            .ok_or_else(|| CodegenError::MetadataError(format!("table {} not found", table)))
    }
}

/// Parse every `CREATE TABLE` statement; other statements are ignored
pub fn parse_schema(sql: &str, default_schema: &str) -> Result<Vec<TableMetadata>> {
    let statements = Parser::parse_sql(&MySqlDialect {}, sql)?;
    Ok(statements
        .iter()
        .filter_map(|stmt| match stmt {
            Statement::CreateTable(create) => Some(table_metadata(create, default_schema)),
            _ => None,
        })
        .collect())
}

fn table_metadata(create: &CreateTable, default_schema: &str) -> TableMetadata {
    let (schema, name) = split_object_name(&create.name);
    let mut table = TableMetadata::new(schema.unwrap_or_else(|| default_schema.to_string()), name);

    for def in &create.columns {
        table.columns.push(column_metadata(def));
        for option in &def.options {
            match &option.option {
                ColumnOption::PrimaryKey(_) => table.primary_key = vec![def.name.value.clone()],
                ColumnOption::Unique(_) => table.indexes.push(IndexMetadata {
                    name: format!("{}_unique", def.name.value),
                    columns: vec![def.name.value.clone()],
                    unique: true,
                }),
                _ => {}
            }
        }
    }

    for constraint in &create.constraints {
        match constraint {
            TableConstraint::PrimaryKey(PrimaryKeyConstraint { columns, .. }) => {
                table.primary_key = index_columns(columns);
            }
            TableConstraint::Unique(UniqueConstraint { name, columns, .. }) => {
                table.indexes.push(index(name.as_ref(), columns, true));
            }
            TableConstraint::Index(IndexConstraint { name, columns, .. }) => {
                table.indexes.push(index(name.as_ref(), columns, false));
            }
            TableConstraint::ForeignKey(ForeignKeyConstraint {
                columns,
                foreign_table,
                referred_columns,
                ..
            }) => {
                let (_, target_table) = split_object_name(foreign_table);
                for (column, target) in columns.iter().zip(referred_columns) {
                    table.foreign_keys.push(ForeignKeyMetadata {
                        column: column.value.clone(),
                        target_table: target_table.clone(),
                        target_column: target.value.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    // key columns are never null, whatever the column options say
    for key in table.primary_key.clone() {
        if let Some(column) = table.column_mut(&key) {
            column.nullable = false;
        }
    }
    table
}

fn column_metadata(def: &ColumnDef) -> ColumnMetadata {
    let mut column = ColumnMetadata::new(def.name.value.clone(), classify(&def.data_type), true);
    for option in &def.options {
        match &option.option {
            ColumnOption::NotNull | ColumnOption::PrimaryKey(_) => column.nullable = false,
            ColumnOption::Null => column.nullable = true,
            ColumnOption::Comment(text) => column.comment = Some(text.clone()),
            _ => {}
        }
    }
    column
}

/// Group a parsed column type by the Rust type it maps to
fn classify(data_type: &DataType) -> SqlType {
    use DataType as D;

    let int = |bits, unsigned| SqlType::Integer { bits, unsigned };
    match data_type {
        D::Bool | D::Boolean | D::TinyInt(Some(1)) | D::Bit(Some(1)) => SqlType::Bool,
        D::TinyInt(_) => int(8, false),
        D::TinyIntUnsigned(_) => int(8, true),
        D::SmallInt(_) => int(16, false),
        D::SmallIntUnsigned(_) => int(16, true),
        D::MediumInt(_) | D::Int(_) | D::Integer(_) => int(32, false),
        D::MediumIntUnsigned(_) | D::IntUnsigned(_) | D::IntegerUnsigned(_) => int(32, true),
        D::BigInt(_) => int(64, false),
        D::BigIntUnsigned(_) => int(64, true),
        D::Float(_) | D::FloatUnsigned(_) => SqlType::Float { bits: 32 },
        D::Double(_) | D::DoubleUnsigned(_) | D::DoublePrecision | D::Real => {
            SqlType::Float { bits: 64 }
        }
        D::Decimal(_) | D::DecimalUnsigned(_) | D::Numeric(_) | D::Dec(_) => SqlType::Decimal,
        D::Char(_)
        | D::Character(_)
        | D::Varchar(_)
        | D::CharacterVarying(_)
        | D::Nvarchar(_)
        | D::Text
        | D::TinyText
        | D::MediumText
        | D::LongText
        | D::Set(_) => SqlType::Text,
        D::Binary(_)
        | D::Varbinary(_)
        | D::Blob(_)
        | D::TinyBlob
        | D::MediumBlob
        | D::LongBlob
        | D::Bit(_) => SqlType::Binary,
        D::Date => SqlType::Date,
        D::Datetime(_) | D::Timestamp(..) => SqlType::DateTime,
        D::Time(..) => SqlType::Time,
        D::JSON => SqlType::Json,
        D::Enum(members, _) => SqlType::Enum(
            members
                .iter()
                .map(|member| match member {
                    EnumMember::Name(value) | EnumMember::NamedValue(value, _) => value.clone(),
                })
                .collect(),
        ),
        other => SqlType::Other(other.to_string()),
    }
}

fn index(name: Option<&Ident>, columns: &[IndexColumn], unique: bool) -> IndexMetadata {
    let columns = index_columns(columns);
    let name = match name {
        Some(ident) => ident.value.clone(),
        None if unique => format!("{}_unique", columns.first().map(String::as_str).unwrap_or("key")),
        None => format!("idx_{}", columns.first().map(String::as_str).unwrap_or("key")),
    };
    IndexMetadata {
        name,
        columns,
        unique,
    }
}

fn index_columns(columns: &[IndexColumn]) -> Vec<String> {
    columns
        .iter()
        .map(|column| match &column.column.expr {
            Expr::Identifier(ident) => ident.value.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// `(schema, table)` from the last two parts of a possibly qualified name
fn split_object_name(name: &ObjectName) -> (Option<String>, String) {
    let mut parts = name
        .0
        .iter()
        .rev()
        .map(|part| part.as_ident().map(|ident| ident.value.clone()));
    let table = parts.next().flatten().unwrap_or_default();
    let schema = parts.next().flatten();
    (schema, table)
}
