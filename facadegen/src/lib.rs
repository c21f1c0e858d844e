//! facadegen: Generate one table facade source file per database table
//!
//! This crate provides both a CLI tool and a library. It reads table metadata
//! through a pluggable [`metadata::MetadataProvider`] (the built-in provider
//! parses SQL DDL with `sqlparser-rs`) and writes one facade per table under
//! `<output>/<package path>/<schema>/<table>.rs`, containing:
//!
//! - Column name constants and a serde-compatible row struct
//! - A facade type carrying the schema, table, column and primary key names
//!
//! Existing facades that are already up to date are skipped, so repeated runs
//! against an unchanged schema write nothing.
//!
//! # Library Usage
//!
//! ```rust,ignore
//! fn main() {
//!     facadegen::GenerateBuilder::new("db.facades", &["sales"])
//!         .output_dir("src/generated")
//!         .url("file:schema.sql")
//!         .generate()
//!         .expect("Failed to generate facades");
//! }
//! ```
//!
//! Include the generated code through a module tree mirroring the package
//! path:
//!
//! ```rust,ignore
//! mod generated {
//!     pub mod db {
//!         pub mod facades {
//!             pub mod sales {
//!                 pub mod orders;
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! facadegen -s sales,hr -p db.facades -o src/generated -u file:schema.sql -v
//! facadegen -s sales -p db.facades -r            # regenerate existing facades only
//! facadegen -s sales -p db.facades sales.orders  # explicit tables
//! ```

pub mod codegen;
pub mod command;
pub mod config;
pub mod error;
pub mod metadata;

use std::path::Path;

pub use codegen::RunResult;
pub use command::Command;
pub use config::GeneratorConfig;
pub use error::{CodegenError, Result};
pub use metadata::TableIdentifier;

/// Main entry point for code generation
pub fn generate(config: GeneratorConfig) -> Result<RunResult> {
    Command::new(config).execute()
}

/// Builder pattern for easy configuration in build.rs
pub struct GenerateBuilder {
    config: GeneratorConfig,
}

impl GenerateBuilder {
    /// Create a new builder for the given package and schemas
    pub fn new(package_name: &str, schema_names: &[&str]) -> Self {
        Self {
            config: GeneratorConfig::new(package_name, schema_names),
        }
    }

    /// Set the output root directory
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Generate only these `schema.table` tokens
    pub fn tables(mut self, tables: &[&str]) -> Self {
        self.config.tables = tables.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Regenerate existing facades only
    pub fn regenerate(mut self) -> Self {
        self.config.regenerate = true;
        self
    }

    /// Set the source encoding (default UTF-8)
    pub fn encoding(mut self, encoding: &str) -> Self {
        self.config.encoding = encoding.to_string();
        self
    }

    /// Set the metadata source url, e.g. `file:schema.sql` for the DDL provider
    pub fn url(mut self, url: &str) -> Self {
        self.config.connection.url = Some(url.to_string());
        self
    }

    /// Set a backend option
    pub fn option(mut self, key: &str, value: &str) -> Self {
        self.config.options.insert(key.to_string(), value.to_string());
        self
    }

    /// Log progress for every table
    pub fn verbose(mut self) -> Self {
        self.config.verbose = true;
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    /// The configuration built so far
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the code
    pub fn generate(self) -> Result<RunResult> {
        generate(self.config)
    }
}
