//! Formatting of rendered Rust source

use crate::error::{CodegenError, Result};

/// Turns rendered source into its final textual form
pub trait CodeFormatter {
    fn format(&self, source: &str) -> Result<String>;
}

/// Parses with `syn` and pretty-prints with `prettyplease`
///
/// Plain `//` comments are dropped by the round trip; doc comments survive.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyPleaseFormatter;

impl CodeFormatter for PrettyPleaseFormatter {
    fn format(&self, source: &str) -> Result<String> {
        let file = syn::parse_file(source).map_err(|e| CodegenError::FormatError(e.to_string()))?;
        Ok(prettyplease::unparse(&file))
    }
}

/// Leaves source untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl CodeFormatter for NoopFormatter {
    fn format(&self, source: &str) -> Result<String> {
        Ok(source.to_string())
    }
}
