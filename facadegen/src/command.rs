//! Top-level generation run

use std::fs;

use chrono::Local;
use tracing::{debug, info};

use crate::codegen::{
    GenerationOrchestrator, ModuleNameRule, NoopProgress, PathResolver, ProgressSink, Registry,
    RunResult, SourceFileNamer, TableSelector, TracingProgress,
};
use crate::config::GeneratorConfig;
use crate::error::{CodegenError, Result};

/// One generation run over a configuration
///
/// ```rust,ignore
/// let mut config = GeneratorConfig::new("db.facades", &["sales"]);
/// config.connection.url = Some("file:schema.sql".into());
/// let result = Command::new(config).execute()?;
/// println!("{} facades written", result.files_created);
/// ```
pub struct Command {
    config: GeneratorConfig,
    registry: Registry,
    progress: Option<Box<dyn ProgressSink>>,
}

impl Command {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            registry: Registry::default(),
            progress: None,
        }
    }

    /// Use a custom backend registry
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Override the progress sink chosen from the verbose flag
    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run generation
    ///
    /// Configuration problems are reported before anything touches the
    /// filesystem. The first metadata, render or I/O failure stops the run;
    /// facades written before it stay on disk.
    pub fn execute(self) -> Result<RunResult> {
        let Command {
            mut config,
            registry,
            progress,
        } = self;

        config.normalize()?;
        config.validate()?;
        let encoding = config.source_encoding()?;
        let options = config.backend_options()?;
        let backends = registry.resolve(&options)?;

        let verbose = config.verbose;
        if verbose {
            info!("{}", config);
            info!("start {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        }
        for (key, value) in &options.passthrough {
            debug!("Passing through option {}={}", key, value);
        }

        let provider = (backends.provider)(&config, &options)?;
        let renderer = (backends.renderer)(provider.as_ref(), (backends.formatter)(), &options);
        let namer = SourceFileNamer::new(renderer.file_extension());
        let resolver = PathResolver::new(&config, &ModuleNameRule, &namer);

        let tables = TableSelector::new(&config, &resolver, provider.as_ref()).select()?;
        debug!("Selected {} tables", tables.len());

        let mut result = RunResult::default();
        if !config.dry_run {
            for schema in &config.schema_names {
                let dir = resolver.schema_path(schema);
                if dir.exists() {
                    continue;
                }
                fs::create_dir_all(&dir).map_err(|e| CodegenError::io(&dir, e))?;
                result.directories_created += 1;
                if verbose {
                    info!("create directory {}", dir.display());
                }
            }
        }

        let mut progress = progress.unwrap_or_else(|| {
            if verbose {
                Box::new(TracingProgress::new(config.dry_run))
            } else {
                Box::new(NoopProgress)
            }
        });
        GenerationOrchestrator::new(&resolver, renderer.as_ref(), progress.as_mut(), encoding)
            .dry_run(config.dry_run)
            .generate(&tables, &mut result);

        info!(
            "Generated {} facades, skipped {} up to date",
            result.files_created, result.files_skipped
        );
        if verbose {
            info!("end {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        }

        result.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{CodeFormatter, SourceRenderer};
    use crate::config::BackendOptions;
    use crate::metadata::{MemoryMetadataProvider, MetadataProvider, TableIdentifier};
    use std::path::{Path, PathBuf};

    const SCHEMA: &str = r#"
        CREATE TABLE sales.orders (
            id BIGINT NOT NULL AUTO_INCREMENT,
            status ENUM('NEW', 'PAID') NOT NULL,
            PRIMARY KEY (id)
        );
        CREATE TABLE sales.customers (
            id BIGINT NOT NULL,
            name VARCHAR(100),
            PRIMARY KEY (id)
        );
        CREATE TABLE hr.staff (id INT NOT NULL PRIMARY KEY);
    "#;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("schema.sql"), SCHEMA).unwrap();
            Self { dir }
        }

        fn config(&self, schemas: &[&str]) -> GeneratorConfig {
            let mut config = GeneratorConfig::new("db.facades", schemas);
            config.output_dir = self.dir.path().join("out");
            let schema = self.dir.path().join("schema.sql");
            config.connection.url = Some(format!("file:{}", schema.display()));
            config
        }

        fn facade(&self, schema: &str, table: &str) -> PathBuf {
            self.dir
                .path()
                .join("out/db/facades")
                .join(schema)
                .join(format!("{}.rs", table))
        }
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let fixture = Fixture::new();

        let first = Command::new(fixture.config(&["sales", "hr"])).execute().unwrap();
        assert_eq!(first.files_created, 3);
        assert_eq!(first.directories_created, 2);
        let before = fs::read_to_string(fixture.facade("sales", "orders")).unwrap();

        let second = Command::new(fixture.config(&["sales", "hr"])).execute().unwrap();
        assert_eq!(second.files_created, 0);
        assert_eq!(second.files_skipped, 3);
        assert_eq!(second.directories_created, 0);
        assert_eq!(fs::read_to_string(fixture.facade("sales", "orders")).unwrap(), before);
    }

    #[test]
    fn test_validation_error_has_no_side_effects() {
        let fixture = Fixture::new();
        let mut config = fixture.config(&["sales"]);
        config.package_name = "db.1bad".to_string();

        let result = Command::new(config).execute();
        assert!(matches!(result, Err(CodegenError::ValidationError(_))));
        assert!(!fixture.dir.path().join("out").exists());
    }

    #[test]
    fn test_unknown_renderer_has_no_side_effects() {
        let fixture = Fixture::new();
        let mut config = fixture.config(&["sales"]);
        config.options.insert("renderer".into(), "kotlin".into());

        let result = Command::new(config).execute();
        assert!(matches!(result, Err(CodegenError::ConfigError(_))));
        assert!(!fixture.dir.path().join("out").exists());
    }

    #[test]
    fn test_metadata_error_aborts_before_io() {
        let fixture = Fixture::new();
        fs::write(fixture.dir.path().join("schema.sql"), "CREATE TABLE (").unwrap();

        let result = Command::new(fixture.config(&["sales"])).execute();
        assert!(matches!(result, Err(CodegenError::ParseError(_))));
        assert!(!fixture.dir.path().join("out").exists());
    }

    #[test]
    fn test_empty_schema_directory_is_precreated() {
        let fixture = Fixture::new();
        let result = Command::new(fixture.config(&["sales", "archive"])).execute().unwrap();
        assert_eq!(result.files_created, 2);
        assert!(fixture.dir.path().join("out/db/facades/archive").is_dir());
    }

    #[test]
    fn test_dry_run_creates_nothing() {
        let fixture = Fixture::new();
        let mut config = fixture.config(&["sales"]);
        config.dry_run = true;

        let result = Command::new(config).execute().unwrap();
        assert_eq!(result.files_created, 2);
        assert_eq!(result.directories_created, 0);
        assert!(!fixture.dir.path().join("out").exists());
    }

    /// Renders fixed text but fails on `sales.fail`
    struct FailingRenderer;

    impl SourceRenderer for FailingRenderer {
        fn file_extension(&self) -> &str {
            "txt"
        }

        fn is_current(&self, _table: &TableIdentifier, existing: &str) -> Result<bool> {
            Ok(existing == "ok\n")
        }

        fn render(&self, table: &TableIdentifier, _existing: Option<&str>) -> Result<String> {
            if table.table() == "fail" {
                return Err(CodegenError::render(table, "cannot render"));
            }
            Ok("ok\n".to_string())
        }
    }

    fn memory_provider(
        _config: &GeneratorConfig,
        _options: &BackendOptions,
    ) -> Result<Box<dyn MetadataProvider>> {
        Ok(Box::new(
            MemoryMetadataProvider::new()
                .with_empty_table("sales", "a")
                .with_empty_table("sales", "b")
                .with_empty_table("sales", "fail")
                .with_empty_table("sales", "d"),
        ))
    }

    fn failing_renderer<'a>(
        _provider: &'a dyn MetadataProvider,
        _formatter: Box<dyn CodeFormatter + 'a>,
        _options: &BackendOptions,
    ) -> Box<dyn SourceRenderer + 'a> {
        Box::new(FailingRenderer)
    }

    #[test]
    fn test_fatal_failure_keeps_prior_files() {
        let fixture = Fixture::new();
        let mut registry = Registry::default();
        registry
            .register_provider("memory", memory_provider)
            .register_renderer("failing", failing_renderer);

        let mut config = fixture.config(&["sales"]);
        config.options.insert("metadata-provider".into(), "memory".into());
        config.options.insert("renderer".into(), "failing".into());

        let result = Command::new(config).with_registry(registry).execute();
        assert!(matches!(result, Err(CodegenError::RenderError { .. })));

        let dir = fixture.dir.path().join("out/db/facades/sales");
        assert!(dir.join("a.txt").exists());
        assert!(dir.join("b.txt").exists());
        assert!(!dir.join("fail.txt").exists());
        assert!(!dir.join("d.txt").exists());
    }

    struct Count(std::rc::Rc<std::cell::Cell<usize>>);

    impl ProgressSink for Count {
        fn on_start(&mut self, _table: &TableIdentifier) {}

        fn on_skip(&mut self, _table: &TableIdentifier) {}

        fn on_write(&mut self, _path: &Path, _byte_count: usize) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_injected_progress_sink() {
        let fixture = Fixture::new();
        let writes = std::rc::Rc::new(std::cell::Cell::new(0));

        Command::new(fixture.config(&["hr"]))
            .with_progress(Box::new(Count(writes.clone())))
            .execute()
            .unwrap();
        assert_eq!(writes.get(), 1);
    }

    #[test]
    fn test_described_table_reaches_renderer() {
        let fixture = Fixture::new();
        Command::new(fixture.config(&["sales"])).execute().unwrap();

        let source = fs::read_to_string(fixture.facade("sales", "orders")).unwrap();
        assert!(source.contains("pub struct Orders;"));
        assert!(source.contains("OrdersStatus"));
    }
}
