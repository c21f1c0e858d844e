//! Working-set selection: explicit, regenerate and discover-all modes

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use tracing::{debug, warn};

use super::paths::PathResolver;
use crate::config::GeneratorConfig;
use crate::error::{CodegenError, Result};
use crate::metadata::{MetadataProvider, MetadataSnapshot, TableIdentifier};

/// How the working set is computed, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Only the tables listed in the configuration
    Explicit,
    /// Known tables that already have a facade on disk
    Regenerate,
    /// Every known table of the configured schemas
    DiscoverAll,
}

impl SelectionMode {
    pub fn of(config: &GeneratorConfig) -> Self {
        if !config.tables.is_empty() {
            SelectionMode::Explicit
        } else if config.regenerate {
            SelectionMode::Regenerate
        } else {
            SelectionMode::DiscoverAll
        }
    }
}

/// Computes the ordered sequence of tables to generate
pub struct TableSelector<'a> {
    config: &'a GeneratorConfig,
    resolver: &'a PathResolver<'a>,
    provider: &'a dyn MetadataProvider,
}

impl<'a> TableSelector<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        resolver: &'a PathResolver<'a>,
        provider: &'a dyn MetadataProvider,
    ) -> Self {
        Self {
            config,
            resolver,
            provider,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        SelectionMode::of(self.config)
    }

    /// Select the working set
    pub fn select(&self) -> Result<Vec<TableIdentifier>> {
        let mode = self.mode();
        debug!("Selecting tables in {:?} mode", mode);

        match mode {
            SelectionMode::Explicit => self.explicit_tables(),
            SelectionMode::Regenerate => {
                let known = self.known_tables()?;
                self.existing_tables(&known)
            }
            SelectionMode::DiscoverAll => self.known_tables(),
        }
    }

    /// Configured tokens as given, duplicates included
    fn explicit_tables(&self) -> Result<Vec<TableIdentifier>> {
        self.config.tables.iter().map(|token| token.parse()).collect()
    }

    /// Every table the database reports for the configured schemas
    fn known_tables(&self) -> Result<Vec<TableIdentifier>> {
        let snapshot = MetadataSnapshot::fetch(self.provider, &self.config.schema_names)?;
        snapshot.known_tables(&self.config.schema_names)
    }

    /// Known tables with a facade file on disk, in scan order
    fn existing_tables(&self, known: &[TableIdentifier]) -> Result<Vec<TableIdentifier>> {
        let known_set: HashSet<&TableIdentifier> = known.iter().collect();
        let by_path: HashMap<PathBuf, &TableIdentifier> = known
            .iter()
            .map(|table| (self.resolver.facade_path(table), table))
            .collect();

        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for path in self.scan()? {
            let table = match self.resolver.table_from_facade_path(&path) {
                Ok(table) if known_set.contains(&table) => table,
                parsed => match by_path.get(&path) {
                    // schema directory was sanitized; match through the forward mapping
                    Some(table) => (*table).clone(),
                    None => {
                        if let Err(e) = parsed {
                            debug!("Ignoring {}: {}", path.display(), e);
                        } else {
                            warn!(
                                "Orphaned facade {}: no such table in the database",
                                path.display()
                            );
                        }
                        continue;
                    }
                },
            };
            if seen.insert(table.clone()) {
                selected.push(table);
            }
        }

        Ok(selected)
    }

    /// Facade files under every schema directory, sorted by file name
    fn scan(&self) -> Result<Vec<PathBuf>> {
        let suffix = format!(".{}", self.resolver.extension());
        let mut visited = HashSet::new();
        let mut found = Vec::new();

        for schema in &self.config.schema_names {
            let dir = self.resolver.schema_path(schema);
            if !visited.insert(dir.clone()) {
                continue;
            }

            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Schema directory {} does not exist", dir.display());
                    continue;
                }
                Err(e) => return Err(CodegenError::io(&dir, e)),
            };

            let mut files = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| CodegenError::io(&dir, e))?;
                let file_type = entry.file_type().map_err(|e| CodegenError::io(entry.path(), e))?;
                let is_facade = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(suffix.as_str()));
                if file_type.is_file() && is_facade {
                    files.push(entry.path());
                }
            }
            files.sort();
            found.extend(files);
        }

        Ok(found)
    }
}
