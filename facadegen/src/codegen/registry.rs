//! Named factories for pluggable backends
//!
//! Backends are chosen by name through the `metadata-provider`, `renderer`
//! and `code-formatter` options. Names are resolved before any work starts,
//! so an unknown name is a configuration error.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::formatter::{CodeFormatter, NoopFormatter, PrettyPleaseFormatter};
use super::renderer::{FacadeSettings, RustFacadeRenderer, SourceRenderer};
use crate::config::{BackendOptions, GeneratorConfig};
use crate::error::{CodegenError, Result};
use crate::metadata::{DdlMetadataProvider, MetadataProvider};

/// Builds a metadata provider from the run configuration
pub type ProviderFactory =
    fn(&GeneratorConfig, &BackendOptions) -> Result<Box<dyn MetadataProvider>>;

/// Builds a code formatter
pub type FormatterFactory = fn() -> Box<dyn CodeFormatter>;

/// Builds a renderer over a provider and formatter
pub type RendererFactory = for<'a> fn(
    &'a dyn MetadataProvider,
    Box<dyn CodeFormatter + 'a>,
    &BackendOptions,
) -> Box<dyn SourceRenderer + 'a>;

/// The backends selected for a run
#[derive(Clone, Copy)]
pub struct Backends {
    pub provider: ProviderFactory,
    pub renderer: RendererFactory,
    pub formatter: FormatterFactory,
}

/// Registry of named backend factories
#[derive(Clone)]
pub struct Registry {
    providers: BTreeMap<String, ProviderFactory>,
    renderers: BTreeMap<String, RendererFactory>,
    formatters: BTreeMap<String, FormatterFactory>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry::empty();
        registry.register_provider("ddl", ddl_provider);
        registry.register_renderer("rust-facade", rust_facade_renderer);
        registry.register_formatter("prettyplease", prettyplease_formatter);
        registry.register_formatter("none", noop_formatter);
        registry
    }
}

impl Registry {
    /// A registry with nothing registered
    pub fn empty() -> Self {
        Self {
            providers: BTreeMap::new(),
            renderers: BTreeMap::new(),
            formatters: BTreeMap::new(),
        }
    }

    pub fn register_provider(&mut self, name: &str, factory: ProviderFactory) -> &mut Self {
        self.providers.insert(name.to_string(), factory);
        self
    }

    pub fn register_renderer(&mut self, name: &str, factory: RendererFactory) -> &mut Self {
        self.renderers.insert(name.to_string(), factory);
        self
    }

    pub fn register_formatter(&mut self, name: &str, factory: FormatterFactory) -> &mut Self {
        self.formatters.insert(name.to_string(), factory);
        self
    }

    /// Resolve the backends named by the options
    pub fn resolve(&self, options: &BackendOptions) -> Result<Backends> {
        Ok(Backends {
            provider: lookup(&self.providers, "metadata-provider", &options.metadata_provider)?,
            renderer: lookup(&self.renderers, "renderer", &options.renderer)?,
            formatter: lookup(&self.formatters, "code-formatter", &options.code_formatter)?,
        })
    }
}

fn lookup<F: Copy>(factories: &BTreeMap<String, F>, kind: &str, name: &str) -> Result<F> {
    factories.get(name).copied().ok_or_else(|| {
        let available: Vec<&str> = factories.keys().map(String::as_str).collect();
        CodegenError::ConfigError(format!(
            "Unknown {} '{}' (available: {})",
            kind,
            name,
            available.join(", ")
        ))
    })
}

/// DDL provider: the connection url names a schema file (`file:schema.sql` or a bare path)
fn ddl_provider(
    config: &GeneratorConfig,
    options: &BackendOptions,
) -> Result<Box<dyn MetadataProvider>> {
    let url = config.connection.url.as_deref().unwrap_or_default().trim();
    if url.is_empty() {
        return Err(CodegenError::ConfigError(
            "the ddl metadata provider needs a url of the form file:<schema.sql>".into(),
        ));
    }
    let path = PathBuf::from(url.strip_prefix("file:").unwrap_or(url));
    let provider = DdlMetadataProvider::from_file(&path, &options.ddl_default_schema)?;
    Ok(Box::new(provider))
}

fn prettyplease_formatter() -> Box<dyn CodeFormatter> {
    Box::new(PrettyPleaseFormatter)
}

fn noop_formatter() -> Box<dyn CodeFormatter> {
    Box::new(NoopFormatter)
}

fn rust_facade_renderer<'a>(
    provider: &'a dyn MetadataProvider,
    formatter: Box<dyn CodeFormatter + 'a>,
    options: &BackendOptions,
) -> Box<dyn SourceRenderer + 'a> {
    Box::new(RustFacadeRenderer::new(
        provider,
        formatter,
        FacadeSettings::from(options),
    ))
}
