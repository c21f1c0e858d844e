//! Error types for facadegen

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for facadegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during facade generation
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to parse SQL schema: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Schema introspection failed for a configured schema or table
    #[error("Metadata error: {0}")]
    MetadataError(String),

    /// A formatter could not make sense of rendered source
    #[error("Failed to format generated code: {0}")]
    FormatError(String),

    #[error("Render error for {table}: {message}")]
    RenderError { table: String, message: String },

    #[error("IO error on {}: {source}", path.display())]
    PathIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cannot {action} {} as {encoding}: {message}", path.display())]
    EncodingError {
        path: PathBuf,
        action: &'static str,
        encoding: String,
        message: String,
    },

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    /// Path was not produced by the path resolver
    #[error("Not a facade path: {}", .0.display())]
    InvalidFacadePath(PathBuf),
}

impl CodegenError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodegenError::PathIo {
            path: path.into(),
            source,
        }
    }

    /// Build a render error for a table
    pub fn render(table: impl ToString, message: impl Into<String>) -> Self {
        CodegenError::RenderError {
            table: table.to_string(),
            message: message.into(),
        }
    }
}

impl From<sqlparser::parser::ParserError> for CodegenError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}
