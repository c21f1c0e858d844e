//! CLI entry point for facadegen

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use facadegen::config::{ConnectionSettings, GeneratorConfig};
use facadegen::Command;

#[derive(Parser)]
#[command(name = "facadegen")]
#[command(about = "Generate one table facade source file per database table")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format, layered with FACADEGEN_* env vars)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated schema names
    #[arg(short, long, value_delimiter = ',')]
    schemas: Vec<String>,

    /// Dot-separated package (module path) of the generated facades
    #[arg(short, long)]
    package: Option<String>,

    /// Output root directory (default: current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source encoding of generated files (default: UTF-8)
    #[arg(short, long)]
    encoding: Option<String>,

    /// Regenerate existing facades only
    #[arg(short, long)]
    regenerate: bool,

    /// Log configuration and per-table progress
    #[arg(short, long)]
    verbose: bool,

    /// Credential file (TOML with url, username, password)
    #[arg(short = 'c', long)]
    credential: Option<PathBuf>,

    /// Metadata source url (e.g. file:schema.sql)
    #[arg(short = 'u', long)]
    url: Option<String>,

    /// Database user name
    #[arg(short = 'U', long = "user")]
    username: Option<String>,

    /// Database password
    #[arg(short = 'P', long = "pass")]
    password: Option<String>,

    /// Backend option, repeatable
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    /// Explicit tables as schema.table
    #[arg(value_name = "SCHEMA.TABLE")]
    tables: Vec<String>,
}

fn parse_option(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty option key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = GeneratorConfig::load(cli.config.as_deref())?;
    let verbose = cli.verbose || config.verbose;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug when verbose, info otherwise)
    let default_level = if verbose { "debug" } else { "info" };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    apply_overrides(&mut config, cli)?;

    let result = Command::new(config).execute()?;

    info!(
        "Code generation completed successfully ({} written, {} up to date)",
        result.files_created, result.files_skipped
    );
    Ok(())
}

/// Command line flags win over the config file and environment
fn apply_overrides(config: &mut GeneratorConfig, cli: Cli) -> Result<()> {
    if let Some(path) = &cli.credential {
        config.connection = ConnectionSettings::from_credential_file(path)
            .with_context(|| format!("while loading credential file {}", path.display()))?;
    }
    if let Some(url) = cli.url {
        config.connection.url = Some(url);
    }
    if let Some(username) = cli.username {
        config.connection.username = Some(username);
    }
    if let Some(password) = cli.password {
        config.connection.password = Some(password);
    }

    if !cli.schemas.is_empty() {
        config.schema_names = cli.schemas;
    }
    if let Some(package) = cli.package {
        config.package_name = package;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(encoding) = cli.encoding {
        config.encoding = encoding;
    }
    if !cli.tables.is_empty() {
        config.tables = cli.tables;
    }
    config.options.extend(cli.options);
    config.regenerate |= cli.regenerate;
    config.verbose |= cli.verbose;
    config.dry_run |= cli.dry_run;
    Ok(())
}
