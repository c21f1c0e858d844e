//! Default configuration values - single source of truth

/// Default output root (resolved against the current directory)
pub const OUTPUT_DIR: &str = ".";

/// Default source encoding for generated and existing facade files
pub const ENCODING: &str = "UTF-8";

/// Whether to only regenerate existing facades by default
pub const REGENERATE: bool = false;

/// Whether verbose mode is on by default
pub const VERBOSE: bool = false;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;

/// Default metadata provider registry name
pub const METADATA_PROVIDER: &str = "ddl";

/// Default renderer registry name
pub const RENDERER: &str = "rust-facade";

/// Default code formatter registry name
pub const CODE_FORMATTER: &str = "prettyplease";

/// Schema assigned to unqualified `CREATE TABLE` statements
pub const DDL_DEFAULT_SCHEMA: &str = "public";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "FACADEGEN";
