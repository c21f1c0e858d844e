//! Mapping between tables and facade file locations

use std::path::{Component, Path, PathBuf};

use super::naming::{CompilationUnitNamer, PackageNameRule};
use crate::config::GeneratorConfig;
use crate::error::{CodegenError, Result};
use crate::metadata::TableIdentifier;

/// A table together with the file its facade is written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTarget {
    pub table: TableIdentifier,
    pub destination: PathBuf,
}

/// Resolves output paths for a configuration
///
/// `output_dir/<package segments>/<sanitized schema>/<unit name>`
pub struct PathResolver<'a> {
    config: &'a GeneratorConfig,
    package_rule: &'a dyn PackageNameRule,
    namer: &'a dyn CompilationUnitNamer,
}

impl<'a> PathResolver<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        package_rule: &'a dyn PackageNameRule,
        namer: &'a dyn CompilationUnitNamer,
    ) -> Self {
        Self {
            config,
            package_rule,
            namer,
        }
    }

    /// Output root with one component per package segment
    pub fn package_path(&self) -> PathBuf {
        self.config
            .package_name
            .split('.')
            .filter(|segment| !segment.is_empty())
            .fold(self.config.output_dir.clone(), |path, segment| {
                path.join(segment)
            })
    }

    /// Directory holding the facades of a schema
    pub fn schema_path(&self, schema: &str) -> PathBuf {
        self.package_path().join(self.package_rule.sanitize(schema))
    }

    /// File the facade of a table is written to
    pub fn facade_path(&self, table: &TableIdentifier) -> PathBuf {
        self.schema_path(table.schema())
            .join(self.namer.unit_name(table.table()))
    }

    /// The facade location of a table, refused unless it lies below the package path
    pub fn target(&self, table: &TableIdentifier) -> Result<GenerationTarget> {
        let destination = self.facade_path(table);
        let inside = destination
            .strip_prefix(self.package_path())
            .map(|rest| {
                rest.components().next().is_some()
                    && rest.components().all(|c| matches!(c, Component::Normal(_)))
            })
            .unwrap_or(false);
        if !inside {
            return Err(CodegenError::InvalidFacadePath(destination));
        }
        Ok(GenerationTarget {
            table: table.clone(),
            destination,
        })
    }

    /// Extension of facade files
    pub fn extension(&self) -> &str {
        self.namer.extension()
    }

    /// Recover a table from a facade path found on disk
    ///
    /// The schema is the parent directory name and the table is the file
    /// name without the facade extension.
    pub fn table_from_facade_path(&self, path: &Path) -> Result<TableIdentifier> {
        let invalid = || CodegenError::InvalidFacadePath(path.to_path_buf());

        let suffix = format!(".{}", self.namer.extension());
        let table = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(suffix.as_str()))
            .ok_or_else(invalid)?;
        let schema = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .ok_or_else(invalid)?;

        TableIdentifier::new(schema, table).map_err(|_| invalid())
    }
}
