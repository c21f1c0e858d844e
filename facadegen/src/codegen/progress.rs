//! Progress notifications emitted while generating

use std::path::Path;

use tracing::info;

use crate::metadata::TableIdentifier;

/// Receives per-table progress events
///
/// Sinks only observe; they never change what gets generated.
pub trait ProgressSink {
    fn on_start(&mut self, table: &TableIdentifier);

    fn on_skip(&mut self, table: &TableIdentifier);

    fn on_write(&mut self, path: &Path, byte_count: usize);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_start(&mut self, _table: &TableIdentifier) {}

    fn on_skip(&mut self, _table: &TableIdentifier) {}

    fn on_write(&mut self, _path: &Path, _byte_count: usize) {}
}

/// Logs events at info level (verbose mode)
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress {
    dry_run: bool,
}

impl TracingProgress {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl ProgressSink for TracingProgress {
    fn on_start(&mut self, table: &TableIdentifier) {
        info!("{}", table);
    }

    fn on_skip(&mut self, _table: &TableIdentifier) {
        info!("  -> skip");
    }

    fn on_write(&mut self, path: &Path, byte_count: usize) {
        let verb = if self.dry_run { "would create" } else { "create" };
        info!("  -> {} file {} ({} bytes)", verb, path.display(), byte_count);
    }
}
