//! Per-table generation loop

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::paths::{GenerationTarget, PathResolver};
use super::progress::ProgressSink;
use super::renderer::SourceRenderer;
use crate::config::SourceEncoding;
use crate::error::{CodegenError, Result};
use crate::metadata::TableIdentifier;

/// Outcome of a generation run
#[derive(Debug, Default)]
pub struct RunResult {
    pub files_created: usize,
    pub files_skipped: usize,
    pub directories_created: usize,
    /// The error that stopped the run, if any
    pub first_error: Option<CodegenError>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.first_error.is_none()
    }

    /// Turn a failed run into its error
    pub fn into_result(mut self) -> Result<Self> {
        match self.first_error.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Drives rendering and writing for a sequence of tables, one at a time
pub struct GenerationOrchestrator<'a> {
    resolver: &'a PathResolver<'a>,
    renderer: &'a dyn SourceRenderer,
    progress: &'a mut dyn ProgressSink,
    encoding: SourceEncoding,
    dry_run: bool,
}

impl<'a> GenerationOrchestrator<'a> {
    pub fn new(
        resolver: &'a PathResolver<'a>,
        renderer: &'a dyn SourceRenderer,
        progress: &'a mut dyn ProgressSink,
        encoding: SourceEncoding,
    ) -> Self {
        Self {
            resolver,
            renderer,
            progress,
            encoding,
            dry_run: false,
        }
    }

    /// Render without touching the filesystem
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Generate every table in order; the first failure stops the run
    pub fn generate(&mut self, tables: &[TableIdentifier], result: &mut RunResult) {
        for table in tables {
            let outcome = self
                .resolver
                .target(table)
                .and_then(|target| self.generate_target(&target, result));
            if let Err(err) = outcome {
                debug!("Generation stopped at {}: {}", table, err);
                result.first_error = Some(err);
                return;
            }
        }
    }

    fn generate_target(&mut self, target: &GenerationTarget, result: &mut RunResult) -> Result<()> {
        let GenerationTarget { table, destination } = target;
        self.progress.on_start(table);

        let existing = if destination.exists() {
            let content = self.load(destination)?;
            if self.renderer.is_current(table, &content)? {
                self.progress.on_skip(table);
                result.files_skipped += 1;
                return Ok(());
            }
            Some(content)
        } else {
            None
        };

        let source = self.renderer.render(table, existing.as_deref())?;
        let bytes = self
            .encoding
            .encode(&source)
            .map_err(|message| self.encoding_error(destination, "encode", message))?;

        if !self.dry_run {
            if let Some(parent) = destination.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent).map_err(|e| CodegenError::io(parent, e))?;
                    result.directories_created += 1;
                }
            }
            write_atomic(destination, &bytes)?;
        }

        self.progress.on_write(destination, bytes.len());
        result.files_created += 1;
        Ok(())
    }

    /// Read and decode an existing facade
    fn load(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| CodegenError::io(path, e))?;
        self.encoding
            .decode(&bytes)
            .map_err(|message| self.encoding_error(path, "decode", message))
    }

    fn encoding_error(&self, path: &Path, action: &'static str, message: String) -> CodegenError {
        CodegenError::EncodingError {
            path: path.to_path_buf(),
            action,
            encoding: self.encoding.name().to_string(),
            message,
        }
    }
}

/// Write through a sibling temp file so a half-written facade is never observed
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    let written = fs::write(&tmp, content)
        .map_err(|e| CodegenError::io(&tmp, e))
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| CodegenError::io(path, e)));
    if written.is_err() {
        // a failed write can leave a partial temp file behind
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn tmp_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => path.with_extension(format!("{ext}.tmp")),
        None => path.with_extension("tmp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::naming::{CompilationUnitNamer, ModuleNameRule, SourceFileNamer};
    use crate::config::GeneratorConfig;

    /// Renders `// <table> v<version>` and fails on a chosen table
    struct StubRenderer {
        version: u32,
        fail_on: Option<&'static str>,
    }

    impl StubRenderer {
        fn new(version: u32) -> Self {
            Self {
                version,
                fail_on: None,
            }
        }
    }

    impl SourceRenderer for StubRenderer {
        fn file_extension(&self) -> &str {
            "rs"
        }

        fn is_current(&self, table: &TableIdentifier, existing: &str) -> Result<bool> {
            Ok(existing == format!("// {} v{}\n", table, self.version))
        }

        fn render(&self, table: &TableIdentifier, _existing: Option<&str>) -> Result<String> {
            if self.fail_on == Some(table.table()) {
                return Err(CodegenError::render(table, "boom"));
            }
            Ok(format!("// {} v{}\n", table, self.version))
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Vec<String>,
    }

    impl ProgressSink for RecordingProgress {
        fn on_start(&mut self, table: &TableIdentifier) {
            self.events.push(format!("start {}", table));
        }

        fn on_skip(&mut self, table: &TableIdentifier) {
            self.events.push(format!("skip {}", table));
        }

        fn on_write(&mut self, path: &Path, byte_count: usize) {
            let name = path.file_name().unwrap().to_string_lossy();
            self.events.push(format!("write {} {}", name, byte_count));
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        config: GeneratorConfig,
        namer: SourceFileNamer,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut config = GeneratorConfig::new("db.facades", &["a"]);
            config.output_dir = dir.path().to_path_buf();
            Self {
                _dir: dir,
                config,
                namer: SourceFileNamer::new("rs"),
            }
        }

        fn run(
            &self,
            renderer: &dyn SourceRenderer,
            tables: &[&str],
            encoding: SourceEncoding,
            dry_run: bool,
        ) -> (RunResult, Vec<String>) {
            let resolver = PathResolver::new(&self.config, &ModuleNameRule, &self.namer);
            let tables: Vec<TableIdentifier> = tables.iter().map(|t| t.parse().unwrap()).collect();
            let mut progress = RecordingProgress::default();
            let mut result = RunResult::default();
            GenerationOrchestrator::new(&resolver, renderer, &mut progress, encoding)
                .dry_run(dry_run)
                .generate(&tables, &mut result);
            (result, progress.events)
        }

        fn path(&self, table: &str) -> PathBuf {
            self.config
                .output_dir
                .join("db/facades/a")
                .join(format!("{}.rs", table))
        }
    }

    #[test]
    fn test_creates_then_skips() {
        let fixture = Fixture::new();
        let renderer = StubRenderer::new(1);

        let (result, events) = fixture.run(&renderer, &["a.t1", "a.t2"], SourceEncoding::Utf8, false);
        assert!(result.is_success());
        assert_eq!(result.files_created, 2);
        assert_eq!(result.directories_created, 1);
        assert_eq!(
            events,
            vec!["start a.t1", "write t1.rs 11", "start a.t2", "write t2.rs 11"]
        );
        assert_eq!(fs::read_to_string(fixture.path("t1")).unwrap(), "// a.t1 v1\n");

        let (result, events) = fixture.run(&renderer, &["a.t1", "a.t2"], SourceEncoding::Utf8, false);
        assert_eq!(result.files_created, 0);
        assert_eq!(result.files_skipped, 2);
        assert_eq!(events, vec!["start a.t1", "skip a.t1", "start a.t2", "skip a.t2"]);
    }

    #[test]
    fn test_outdated_file_is_rewritten() {
        let fixture = Fixture::new();
        fixture.run(&StubRenderer::new(1), &["a.t1"], SourceEncoding::Utf8, false);

        let (result, _) = fixture.run(&StubRenderer::new(2), &["a.t1"], SourceEncoding::Utf8, false);
        assert_eq!(result.files_created, 1);
        assert_eq!(result.directories_created, 0);
        assert_eq!(fs::read_to_string(fixture.path("t1")).unwrap(), "// a.t1 v2\n");
        assert!(!fixture.path("t1").with_extension("rs.tmp").exists());
    }

    #[test]
    fn test_failure_stops_the_run() {
        let fixture = Fixture::new();
        let mut renderer = StubRenderer::new(1);
        renderer.fail_on = Some("t3");

        let (result, _) = fixture.run(
            &renderer,
            &["a.t1", "a.t2", "a.t3", "a.t4", "a.t5"],
            SourceEncoding::Utf8,
            false,
        );
        assert_eq!(result.files_created, 2);
        assert!(matches!(result.first_error, Some(CodegenError::RenderError { .. })));
        assert!(fixture.path("t1").exists());
        assert!(fixture.path("t2").exists());
        assert!(!fixture.path("t4").exists());
        assert!(!fixture.path("t5").exists());
        assert!(result.into_result().is_err());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let fixture = Fixture::new();
        let (result, events) = fixture.run(&StubRenderer::new(1), &["a.t1"], SourceEncoding::Utf8, true);
        assert_eq!(result.files_created, 1);
        assert_eq!(result.directories_created, 0);
        assert_eq!(events, vec!["start a.t1", "write t1.rs 11"]);
        assert!(!fixture.path("t1").parent().unwrap().exists());
    }

    #[test]
    fn test_encoding_is_applied() {
        let fixture = Fixture::new();
        let (result, _) = fixture.run(&StubRenderer::new(1), &["a.t1"], SourceEncoding::Utf16Le, false);
        assert!(result.is_success());
        let bytes = fs::read(fixture.path("t1")).unwrap();
        assert_eq!(bytes.len(), 22);
        assert_eq!(
            SourceEncoding::Utf16Le.decode(&bytes).unwrap(),
            "// a.t1 v1\n"
        );

        // decoding the same file as ASCII fails and stops the run
        std::fs::write(fixture.path("t1"), [0xFFu8, 0xFE]).unwrap();
        let (result, _) = fixture.run(&StubRenderer::new(1), &["a.t1"], SourceEncoding::Ascii, false);
        assert!(matches!(result.first_error, Some(CodegenError::EncodingError { .. })));
    }

    #[test]
    fn test_utf16_files_carry_a_byte_order_mark() {
        let fixture = Fixture::new();
        fixture.run(&StubRenderer::new(1), &["a.t1"], SourceEncoding::Utf16, false);
        let bytes = fs::read(fixture.path("t1")).unwrap();
        assert_eq!(&bytes[..4], &[0xFE, 0xFF, 0, b'/']);

        let (result, _) = fixture.run(&StubRenderer::new(1), &["a.t1"], SourceEncoding::Utf16, false);
        assert_eq!(result.files_skipped, 1);
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("t1.rs");
        fs::create_dir(&destination).unwrap();
        fs::write(destination.join("keep"), "x").unwrap();

        let err = write_atomic(&destination, b"// a.t1 v1\n").unwrap_err();
        assert!(matches!(err, CodegenError::PathIo { ref path, .. } if *path == destination));
        assert!(!dir.path().join("t1.rs.tmp").exists());
        assert!(destination.join("keep").exists());
    }

    #[test]
    fn test_failed_write_reports_temp_path() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("missing/t1.rs");

        let err = write_atomic(&destination, b"// a.t1 v1\n").unwrap_err();
        assert!(matches!(err, CodegenError::PathIo { ref path, .. } if path.ends_with("t1.rs.tmp")));
        assert!(!dir.path().join("missing").exists());
    }

    struct EscapingNamer;

    impl CompilationUnitNamer for EscapingNamer {
        fn extension(&self) -> &str {
            "rs"
        }

        fn unit_name(&self, table: &str) -> String {
            format!("../../{}.rs", table)
        }
    }

    #[test]
    fn test_destination_outside_package_is_refused() {
        let fixture = Fixture::new();
        let resolver = PathResolver::new(&fixture.config, &ModuleNameRule, &EscapingNamer);
        let tables: Vec<TableIdentifier> = vec!["a.t1".parse().unwrap()];
        let renderer = StubRenderer::new(1);
        let mut progress = RecordingProgress::default();
        let mut result = RunResult::default();

        GenerationOrchestrator::new(&resolver, &renderer, &mut progress, SourceEncoding::Utf8)
            .generate(&tables, &mut result);

        assert!(matches!(result.first_error, Some(CodegenError::InvalidFacadePath(_))));
        assert_eq!(result.files_created, 0);
        assert!(progress.events.is_empty());
        assert!(!fixture.config.output_dir.join("db/t1.rs").exists());
    }
}
