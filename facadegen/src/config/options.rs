//! Typed view over the open-ended `-D key=value` options map

use std::collections::BTreeMap;

use super::defaults;
use crate::error::{CodegenError, Result};

/// Registry name of the metadata provider
pub const METADATA_PROVIDER: &str = "metadata-provider";
/// Registry name of the source renderer
pub const RENDERER: &str = "renderer";
/// Registry name of the code formatter
pub const CODE_FORMATTER: &str = "code-formatter";
/// Schema for unqualified tables in DDL files
pub const DDL_DEFAULT_SCHEMA: &str = "ddl-default-schema";
/// Trait path implemented by every generated facade
pub const TABLE_FACADE_TRAIT: &str = "table-facade-trait";
/// Extra derives for generated row structs (comma-separated)
pub const ROW_DERIVES: &str = "row-derives";
/// Widen numeric columns to `i64` / `f64`
pub const USE_NUMBER_CLASS: &str = "use-number-class";
/// Render nullable columns without an `Option` wrapper
pub const NOT_USE_NULL_GUARD: &str = "not-use-null-guard";

/// Backend options resolved from the raw options map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOptions {
    pub metadata_provider: String,
    pub renderer: String,
    pub code_formatter: String,
    pub ddl_default_schema: String,
    pub table_facade_trait: Option<String>,
    pub row_derives: Vec<String>,
    pub use_number_class: bool,
    pub not_use_null_guard: bool,
    /// Backend-specific keys facadegen does not interpret
    pub passthrough: BTreeMap<String, String>,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            metadata_provider: defaults::METADATA_PROVIDER.to_string(),
            renderer: defaults::RENDERER.to_string(),
            code_formatter: defaults::CODE_FORMATTER.to_string(),
            ddl_default_schema: defaults::DDL_DEFAULT_SCHEMA.to_string(),
            table_facade_trait: None,
            row_derives: Vec::new(),
            use_number_class: false,
            not_use_null_guard: false,
            passthrough: BTreeMap::new(),
        }
    }
}

impl BackendOptions {
    /// Resolve typed options; empty values fall back to defaults
    pub fn from_map(raw: &BTreeMap<String, String>) -> Result<Self> {
        let mut options = BackendOptions::default();

        for (key, value) in raw {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                METADATA_PROVIDER => options.metadata_provider = value.to_string(),
                RENDERER => options.renderer = value.to_string(),
                CODE_FORMATTER => options.code_formatter = value.to_string(),
                DDL_DEFAULT_SCHEMA => options.ddl_default_schema = value.to_string(),
                TABLE_FACADE_TRAIT => options.table_facade_trait = Some(value.to_string()),
                ROW_DERIVES => {
                    options.row_derives = value
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                }
                USE_NUMBER_CLASS => options.use_number_class = parse_flag(key, value)?,
                NOT_USE_NULL_GUARD => options.not_use_null_guard = parse_flag(key, value)?,
                _ => {
                    options.passthrough.insert(key.clone(), value.to_string());
                }
            }
        }

        Ok(options)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CodegenError::ConfigError(format!(
            "Option {} expects a boolean, got '{}'",
            key, value
        ))),
    }
}
