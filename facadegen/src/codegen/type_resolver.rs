//! Column to Rust type mapping for facade row fields

use std::fmt;

use super::naming;
use crate::metadata::{ColumnMetadata, SqlType};

/// Field type of a generated row struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    Bool,
    Int { bits: u8, signed: bool },
    Float { bits: u8 },
    Decimal,
    String,
    Bytes,
    Date,
    DateTime,
    Time,
    Json,
    /// Generated enum, by name
    Enum(String),
    Option(Box<RustType>),
}

impl fmt::Display for RustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RustType::Bool => f.write_str("bool"),
            RustType::Int { bits, signed: true } => write!(f, "i{}", bits),
            RustType::Int { bits, signed: false } => write!(f, "u{}", bits),
            RustType::Float { bits } => write!(f, "f{}", bits),
            RustType::Decimal => f.write_str("rust_decimal::Decimal"),
            RustType::String => f.write_str("String"),
            RustType::Bytes => f.write_str("Vec<u8>"),
            RustType::Date => f.write_str("chrono::NaiveDate"),
            RustType::DateTime => f.write_str("chrono::NaiveDateTime"),
            RustType::Time => f.write_str("chrono::NaiveTime"),
            RustType::Json => f.write_str("serde_json::Value"),
            RustType::Enum(name) => f.write_str(name),
            RustType::Option(inner) => write!(f, "Option<{}>", inner),
        }
    }
}

/// Knobs that change how columns map to Rust types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Widen integers and floats to 64 bits
    pub use_number_class: bool,
    /// Wrap nullable columns in `Option`
    pub null_guard: bool,
}

impl ResolveOptions {
    pub fn new(use_number_class: bool, null_guard: bool) -> Self {
        Self {
            use_number_class,
            null_guard,
        }
    }
}

/// Field type for a column of `table`
pub fn resolve_column(table: &str, column: &ColumnMetadata, options: ResolveOptions) -> RustType {
    let base = match &column.sql_type {
        SqlType::Bool => RustType::Bool,
        SqlType::Integer { bits, unsigned } => RustType::Int {
            bits: if options.use_number_class { 64 } else { *bits },
            signed: !unsigned,
        },
        SqlType::Float { bits } => RustType::Float {
            bits: if options.use_number_class { 64 } else { *bits },
        },
        SqlType::Decimal => RustType::Decimal,
        SqlType::Text | SqlType::Other(_) => RustType::String,
        SqlType::Binary => RustType::Bytes,
        SqlType::Date => RustType::Date,
        SqlType::DateTime => RustType::DateTime,
        SqlType::Time => RustType::Time,
        SqlType::Json => RustType::Json,
        SqlType::Enum(_) => RustType::Enum(naming::to_enum_name(table, &column.name)),
    };

    if column.nullable && options.null_guard {
        RustType::Option(Box::new(base))
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: ResolveOptions = ResolveOptions {
        use_number_class: false,
        null_guard: true,
    };

    fn resolve(sql_type: SqlType, nullable: bool, options: ResolveOptions) -> String {
        let column = ColumnMetadata::new("status", sql_type, nullable);
        resolve_column("orders", &column, options).to_string()
    }

    #[test]
    fn test_integer_widths() {
        let int = |bits, unsigned| SqlType::Integer { bits, unsigned };
        assert_eq!(resolve(int(8, false), false, DEFAULT), "i8");
        assert_eq!(resolve(int(32, true), false, DEFAULT), "u32");
        assert_eq!(resolve(int(64, true), true, DEFAULT), "Option<u64>");
    }

    #[test]
    fn test_named_types() {
        assert_eq!(resolve(SqlType::Decimal, false, DEFAULT), "rust_decimal::Decimal");
        assert_eq!(resolve(SqlType::DateTime, true, DEFAULT), "Option<chrono::NaiveDateTime>");
        assert_eq!(resolve(SqlType::Binary, false, DEFAULT), "Vec<u8>");
        assert_eq!(resolve(SqlType::Other("POINT".to_string()), false, DEFAULT), "String");
        assert_eq!(
            resolve(SqlType::Enum(vec!["NEW".to_string()]), false, DEFAULT),
            "OrdersStatus"
        );
    }

    #[test]
    fn test_use_number_class_widens() {
        let options = ResolveOptions::new(true, true);
        let small = SqlType::Integer { bits: 16, unsigned: false };
        assert_eq!(resolve(small, false, options), "i64");
        assert_eq!(resolve(SqlType::Float { bits: 32 }, true, options), "Option<f64>");
        assert_eq!(resolve(SqlType::Decimal, false, options), "rust_decimal::Decimal");
    }

    #[test]
    fn test_without_null_guard() {
        let options = ResolveOptions::new(false, false);
        assert_eq!(resolve(SqlType::Text, true, options), "String");
    }
}
