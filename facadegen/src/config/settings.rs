//! Configuration settings for facadegen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::defaults;
use super::encoding::SourceEncoding;
use super::options::BackendOptions;
use crate::error::{CodegenError, Result};

/// Database connection settings handed to metadata provider factories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl ConnectionSettings {
    /// Load connection settings from a credential file (TOML with url/username/password)
    pub fn from_credential_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CodegenError::ConfigError(format!(
                "Credential file {} not found",
                path.display()
            )));
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse credential file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Password rendered as one `*` per character
    pub fn masked_password(&self) -> String {
        mask(self.password.as_deref().unwrap_or_default())
    }
}

/// Replace every character of a secret with `*`
pub fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

/// Main configuration struct for a generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Output root directory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Target module path, dot-separated (e.g. `db.facades`)
    #[serde(default)]
    pub package_name: String,

    /// Schemas to generate facades for, in order
    #[serde(default)]
    pub schema_names: Vec<String>,

    /// Explicit `schema.table` tokens; when non-empty only these are generated
    #[serde(default)]
    pub tables: Vec<String>,

    /// Only regenerate facades that already exist on disk
    #[serde(default = "default_regenerate")]
    pub regenerate: bool,

    /// Source encoding name
    #[serde(default = "default_encoding")]
    pub encoding: String,

    #[serde(default = "default_verbose")]
    pub verbose: bool,

    /// Dry run mode - render without writing files
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    #[serde(default)]
    pub connection: ConnectionSettings,

    /// Backend options (`-D key=value`)
    #[serde(default)]
    pub options: BTreeMap<String, String>,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_DIR)
}
fn default_regenerate() -> bool {
    defaults::REGENERATE
}
fn default_encoding() -> String {
    defaults::ENCODING.to_string()
}
fn default_verbose() -> bool {
    defaults::VERBOSE
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            package_name: String::new(),
            schema_names: Vec::new(),
            tables: Vec::new(),
            regenerate: default_regenerate(),
            encoding: default_encoding(),
            verbose: default_verbose(),
            dry_run: default_dry_run(),
            connection: ConnectionSettings::default(),
            options: BTreeMap::new(),
            log_level: None,
        }
    }
}

impl GeneratorConfig {
    /// Create a default config for the given package and schemas
    pub fn new(package_name: &str, schema_names: &[&str]) -> Self {
        Self {
            package_name: package_name.to_string(),
            schema_names: schema_names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        let config: GeneratorConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from config file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            // Try default locations
            builder = builder.add_source(File::with_name("facadegen").required(false));
        }

        // Override with environment variables (FACADEGEN_*)
        builder = builder.add_source(
            Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("schema_names")
                .with_list_parse_key("tables")
                .try_parsing(true),
        );

        let config: GeneratorConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Resolve the configured encoding name
    pub fn source_encoding(&self) -> Result<SourceEncoding> {
        self.encoding.parse()
    }

    /// Resolve typed backend options
    pub fn backend_options(&self) -> Result<BackendOptions> {
        BackendOptions::from_map(&self.options)
    }

    /// Make the output root absolute and drop blank schema entries
    pub fn normalize(&mut self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            self.output_dir = default_output_dir();
        }
        if !self.output_dir.is_absolute() {
            let cwd = std::env::current_dir()?;
            self.output_dir = cwd.join(&self.output_dir);
        }
        self.schema_names = self
            .schema_names
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.package_name = self.package_name.trim().to_string();
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.output_dir.is_absolute() {
            return Err(CodegenError::ValidationError(format!(
                "output_dir must be absolute: {}",
                self.output_dir.display()
            )));
        }

        if self.schema_names.is_empty() {
            return Err(CodegenError::ValidationError(
                "at least one schema name is required".into(),
            ));
        }

        if self.schema_names.iter().any(|s| s.trim().is_empty()) {
            return Err(CodegenError::ValidationError(
                "schema names must not be empty".into(),
            ));
        }

        if self.package_name.is_empty() {
            return Err(CodegenError::ValidationError(
                "package_name is required".into(),
            ));
        }

        if let Some(segment) = self
            .package_name
            .split('.')
            .find(|segment| !is_package_segment(segment))
        {
            return Err(CodegenError::ValidationError(format!(
                "package_name '{}' has an invalid segment '{}'",
                self.package_name, segment
            )));
        }

        self.source_encoding()?;
        self.backend_options()?;

        Ok(())
    }
}

/// A package segment is a non-keyword identifier usable as a directory name
fn is_package_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    let starts_well = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && segment != "_"
        && !matches!(segment, "crate" | "self" | "super" | "Self")
}

impl fmt::Display for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options: Vec<String> = self
            .options
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        writeln!(f, "parameters")?;
        writeln!(f, "  regenerate: {}", self.regenerate)?;
        writeln!(f, "  schemaNames: [{}]", self.schema_names.join(", "))?;
        writeln!(f, "  packageName: {}", self.package_name)?;
        writeln!(f, "  output: {}", self.output_dir.display())?;
        writeln!(f, "  encoding: {}", self.encoding)?;
        writeln!(f, "  url: {}", self.connection.url.as_deref().unwrap_or_default())?;
        writeln!(
            f,
            "  username: {}",
            self.connection.username.as_deref().unwrap_or_default()
        )?;
        writeln!(f, "  password: {}", self.connection.masked_password())?;
        writeln!(f, "  options: {{{}}}", options.join(", "))?;
        writeln!(f, "  tables: [{}]", self.tables.join(", "))?;
        writeln!(f, "  dryRun: {}", self.dry_run)?;
        write!(f, "  verbose: {}", self.verbose)
    }
}
