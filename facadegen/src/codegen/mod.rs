//! Code generation module

mod formatter;
mod naming;
mod orchestrator;
mod paths;
mod progress;
mod registry;
mod renderer;
mod selector;
mod type_resolver;

pub use formatter::*;
pub use naming::*;
pub use orchestrator::*;
pub use paths::*;
pub use progress::*;
pub use registry::*;
pub use renderer::*;
pub use selector::*;
pub use type_resolver::*;
