//! Source renderers: the backend that turns one table into facade source

use std::collections::HashSet;

use tracing::debug;

use super::formatter::CodeFormatter;
use super::naming::{escape_field_name, to_const_name, to_enum_name, to_enum_variant, to_struct_name};
use super::type_resolver::{resolve_column, ResolveOptions};
use crate::config::BackendOptions;
use crate::error::{CodegenError, Result};
use crate::metadata::{ColumnMetadata, MetadataProvider, TableIdentifier, TableMetadata};

/// First line of the region carried over between generations
pub const CUSTOM_BEGIN: &str = "// facadegen:custom-begin";
/// Last line of the region carried over between generations
pub const CUSTOM_END: &str = "// facadegen:custom-end";

/// Code generation backend
pub trait SourceRenderer {
    /// Extension of generated files, without the dot
    fn file_extension(&self) -> &str;

    /// Whether an existing facade already matches what would be rendered
    fn is_current(&self, table: &TableIdentifier, existing: &str) -> Result<bool>;

    /// Render the facade, merging with the existing content if present
    fn render(&self, table: &TableIdentifier, existing: Option<&str>) -> Result<String>;
}

/// Renderer settings taken from backend options
#[derive(Debug, Clone, Default)]
pub struct FacadeSettings {
    pub types: ResolveOptions,
    pub row_derives: Vec<String>,
    pub table_facade_trait: Option<String>,
}

impl From<&BackendOptions> for FacadeSettings {
    fn from(options: &BackendOptions) -> Self {
        Self {
            types: ResolveOptions::new(options.use_number_class, !options.not_use_null_guard),
            row_derives: options.row_derives.clone(),
            table_facade_trait: options.table_facade_trait.clone(),
        }
    }
}

/// Renders a Rust module per table: a zero-sized facade type with table and
/// column constants, plus a serde row struct
pub struct RustFacadeRenderer<'a> {
    provider: &'a dyn MetadataProvider,
    formatter: Box<dyn CodeFormatter + 'a>,
    settings: FacadeSettings,
}

impl<'a> RustFacadeRenderer<'a> {
    pub fn new(
        provider: &'a dyn MetadataProvider,
        formatter: Box<dyn CodeFormatter + 'a>,
        settings: FacadeSettings,
    ) -> Self {
        Self {
            provider,
            formatter,
            settings,
        }
    }

    fn render_body(&self, table: &TableMetadata) -> String {
        let struct_name = to_struct_name(&table.name);
        let row_name = format!("{}Row", struct_name);
        let qualified = format!("{}.{}", table.schema, table.name);

        let mut code = String::new();
        code.push_str(&format!("//! Table facade for `{}`\n\n", qualified));
        code.push_str("use serde::{Deserialize, Serialize};\n\n");

        // Column name constants
        let const_names = unique_names(table.columns.iter().map(|c| to_const_name(&c.name)));
        code.push_str(&format!("/// Column names of `{}`\n", qualified));
        code.push_str("pub mod columns {\n");
        for (col, const_name) in table.columns.iter().zip(&const_names) {
            code.push_str(&column_doc("    ", table, col));
            code.push_str(&format!("    pub const {}: &str = {:?};\n", const_name, col.name));
        }
        code.push_str("}\n\n");

        // Enum types
        for col in &table.columns {
            if let Some(values) = col.enum_values() {
                code.push_str(&generate_enum(&table.name, col, values));
                code.push('\n');
            }
        }

        code.push_str(&self.generate_row(table, &row_name));
        code.push('\n');

        // Facade type
        code.push_str(&format!("/// Facade for `{}`\n", qualified));
        if let Some(comment) = table.comment.as_deref().filter(|c| !c.is_empty()) {
            code.push_str(&format!("///\n/// {}\n", one_line(comment)));
        }
        code.push_str("#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]\n");
        code.push_str(&format!("pub struct {};\n\n", struct_name));

        let column_refs: Vec<String> = const_names
            .iter()
            .map(|name| format!("columns::{}", name))
            .collect();
        let primary_key: Vec<String> = table.primary_key.iter().map(|c| format!("{:?}", c)).collect();

        code.push_str(&format!("impl {} {{\n", struct_name));
        code.push_str(&format!("    pub const SCHEMA: &'static str = {:?};\n", table.schema));
        code.push_str(&format!("    pub const TABLE: &'static str = {:?};\n", table.name));
        code.push_str(&format!("    pub const PATH: &'static str = {:?};\n", qualified));
        code.push_str(&format!(
            "    pub const COLUMNS: &'static [&'static str] = &[{}];\n",
            column_refs.join(", ")
        ));
        code.push_str(&format!(
            "    pub const PRIMARY_KEY: &'static [&'static str] = &[{}];\n",
            primary_key.join(", ")
        ));
        code.push_str("}\n");

        if let Some(facade_trait) = &self.settings.table_facade_trait {
            code.push_str(&format!("\nimpl {} for {} {{}}\n", facade_trait, struct_name));
        }

        code
    }

    fn generate_row(&self, table: &TableMetadata, row_name: &str) -> String {
        let mut code = String::new();

        code.push_str(&format!("/// Row of `{}.{}`\n", table.schema, table.name));

        let mut derives = vec![
            "Debug".to_string(),
            "Clone".to_string(),
            "PartialEq".to_string(),
            "Serialize".to_string(),
            "Deserialize".to_string(),
        ];
        for extra in &self.settings.row_derives {
            if !derives.contains(extra) {
                derives.push(extra.clone());
            }
        }
        code.push_str(&format!("#[derive({})]\n", derives.join(", ")));
        code.push_str(&format!("pub struct {} {{\n", row_name));

        let field_names = unique_names(table.columns.iter().map(|c| escape_field_name(&c.name)));
        for (col, field_name) in table.columns.iter().zip(&field_names) {
            let rust_type = resolve_column(&table.name, col, self.settings.types);

            code.push_str(&column_doc("    ", table, col));

            // Serde rename if field name differs from column name
            // This is especially important for raw identifiers (r#type -> "type")
            if *field_name != col.name {
                code.push_str(&format!("    #[serde(rename = {:?})]\n", col.name));
            }

            code.push_str(&format!("    pub {}: {},\n", field_name, rust_type));
        }

        code.push_str("}\n");
        code
    }
}

impl SourceRenderer for RustFacadeRenderer<'_> {
    fn file_extension(&self) -> &str {
        "rs"
    }

    fn is_current(&self, table: &TableIdentifier, existing: &str) -> Result<bool> {
        Ok(self.render(table, Some(existing))? == existing)
    }

    fn render(&self, table: &TableIdentifier, existing: Option<&str>) -> Result<String> {
        let metadata = self.provider.describe(table)?;
        debug!("Rendering facade {} ({} columns)", table, metadata.columns.len());

        let body = self.render_body(&metadata);
        let body = self.formatter.format(&body).map_err(|e| CodegenError::render(table, e.to_string()))?;
        let custom = existing.and_then(preserved_region).unwrap_or_default();

        let mut source = format!(
            "// @generated by facadegen from `{}`. Edit only inside the custom region.\n",
            table
        );
        source.push_str(&body);
        if !body.ends_with('\n') {
            source.push('\n');
        }
        source.push('\n');
        source.push_str(CUSTOM_BEGIN);
        source.push('\n');
        source.push_str(custom);
        source.push_str(CUSTOM_END);
        source.push('\n');
        Ok(source)
    }
}

/// Text between the custom-region markers of an existing facade
pub fn preserved_region(existing: &str) -> Option<&str> {
    let begin = existing.find(CUSTOM_BEGIN)?;
    let after_begin = begin + CUSTOM_BEGIN.len();
    let start = after_begin + existing[after_begin..].find('\n')? + 1;
    let end = start + existing[start..].find(CUSTOM_END)?;
    Some(&existing[start..end])
}

/// Disambiguate repeated names with a numeric suffix
fn unique_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    names
        .map(|name| {
            let final_name = if used.contains(&name) {
                let mut counter = 2;
                loop {
                    let candidate = format!("{}{}", name, counter);
                    if !used.contains(&candidate) {
                        break candidate;
                    }
                    counter += 1;
                }
            } else {
                name
            };
            used.insert(final_name.clone());
            final_name
        })
        .collect()
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Doc line for a column: name, key/index info and comment
fn column_doc(indent: &str, table: &TableMetadata, col: &ColumnMetadata) -> String {
    let mut doc = format!("{}/// Column: `{}`", indent, col.name);

    let notes = table.column_notes(&col.name);
    if !notes.is_empty() {
        doc.push_str(&format!(" ({})", notes.join(", ")));
    }

    if let Some(comment) = col.comment.as_deref().filter(|c| !c.is_empty()) {
        doc.push_str(&format!(" - {}", one_line(comment)));
    }
    doc.push('\n');
    doc
}

/// Generate an enum type for a column
fn generate_enum(table_name: &str, column: &ColumnMetadata, values: &[String]) -> String {
    let enum_name = to_enum_name(table_name, &column.name);
    let mut code = String::new();

    code.push_str(&format!("/// Enum for `{}.{}`\n", table_name, column.name));
    code.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]\n");
    code.push_str(&format!("pub enum {} {{\n", enum_name));

    let variants = unique_names(values.iter().map(|v| to_enum_variant(v)));
    let mut variant_mappings: Vec<(String, String)> = Vec::new();

    for (value, variant) in values.iter().zip(variants) {
        // Clean the value (remove quotes)
        let clean_value = value.trim_matches('\'').trim_matches('"');

        if variant != clean_value {
            code.push_str(&format!("    #[serde(rename = {:?})]\n", clean_value));
        }

        code.push_str(&format!("    {},\n", variant));
        variant_mappings.push((variant, clean_value.to_string()));
    }

    code.push_str("}\n\n");

    code.push_str(&format!("impl {} {{\n", enum_name));
    code.push_str("    /// Database value of this variant\n");
    code.push_str("    pub fn as_str(&self) -> &'static str {\n");
    code.push_str("        match self {\n");
    for (variant, db_value) in &variant_mappings {
        code.push_str(&format!("            Self::{} => {:?},\n", variant, db_value));
    }
    code.push_str("        }\n");
    code.push_str("    }\n");
    code.push_str("}\n");

    code
}
