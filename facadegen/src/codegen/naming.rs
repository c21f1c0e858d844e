//! Naming rules: schema directories, facade file names and Rust identifiers

use heck::{ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

/// Maps a raw schema name to a directory / module segment
pub trait PackageNameRule {
    fn sanitize(&self, schema: &str) -> String;
}

/// Maps a table name to a facade file name
pub trait CompilationUnitNamer {
    /// Extension of generated files, without the dot
    fn extension(&self) -> &str;

    /// File name (base name plus extension) for a table
    fn unit_name(&self, table: &str) -> String {
        format!("{}.{}", table, self.extension())
    }
}

/// Default schema rule: lower-cased, non-identifier characters replaced by `_`
///
/// Names that are already valid lower-case module names pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleNameRule;

impl PackageNameRule for ModuleNameRule {
    fn sanitize(&self, schema: &str) -> String {
        let mut name: String = schema
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert(0, '_');
        }
        // raw identifiers cannot name these modules
        if matches!(name.as_str(), "crate" | "self" | "super") {
            name.push('_');
        }
        name
    }
}

/// Default file namer: the table name verbatim plus the renderer's extension
#[derive(Debug, Clone)]
pub struct SourceFileNamer {
    extension: String,
}

impl SourceFileNamer {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl CompilationUnitNamer for SourceFileNamer {
    fn extension(&self) -> &str {
        &self.extension
    }
}

/// Convert a table name to a struct name (PascalCase)
pub fn to_struct_name(table_name: &str) -> String {
    type_name("T", table_name.to_pascal_case())
}

/// Make a PascalCase name usable as a type or variant
fn type_name(prefix: &str, name: String) -> String {
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{}{}", prefix, name)
    } else if is_rust_keyword(&name) {
        // `Self` is the only PascalCase keyword and cannot be a raw identifier
        format!("{}_", name)
    } else {
        name
    }
}

/// Convert a column name to a constant name (SCREAMING_SNAKE_CASE)
pub fn to_const_name(column_name: &str) -> String {
    let name = column_name.to_shouty_snake_case();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("C_{}", name)
    } else {
        name
    }
}

/// Convert a column name to a field name (snake_case)
pub fn to_field_name(column_name: &str) -> String {
    column_name.to_snake_case()
}

/// Generate an enum name for a column's ENUM type
/// e.g., table "users" + column "status" -> "UsersStatus"
pub fn to_enum_name(table_name: &str, column_name: &str) -> String {
    type_name(
        "T",
        format!("{}{}", table_name.to_pascal_case(), column_name.to_pascal_case()),
    )
}

/// Convert an enum value to a Rust variant name
/// Handles cases like "ACTIVE", "active", "PendingReview", "IN_PROGRESS"
pub fn to_enum_variant(value: &str) -> String {
    let value = value.trim_matches('\'').trim_matches('"');
    type_name("V", value.to_pascal_case())
}

/// Check if a name is a Rust reserved keyword
pub fn is_rust_keyword(name: &str) -> bool {
    matches!(
        name,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "crate"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "Self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "macro"
            | "override"
            | "priv"
            | "try"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
    )
}

/// Escape a field name if it's a Rust keyword
pub fn escape_field_name(name: &str) -> String {
    let snake = to_field_name(name);
    if matches!(snake.as_str(), "self" | "super" | "crate") {
        format!("{}_", snake)
    } else if is_rust_keyword(&snake) {
        format!("r#{}", snake)
    } else {
        snake
    }
}
