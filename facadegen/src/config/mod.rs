//! Run configuration: settings, backend options and source encodings

pub mod defaults;
mod encoding;
mod options;
mod settings;

pub use encoding::SourceEncoding;
pub use options::*;
pub use settings::*;
