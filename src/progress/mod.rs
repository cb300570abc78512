//! Scan events and the listeners that render them
//!
//! The transcript a build host would print into the console is produced by
//! [`ConsoleListener`]. Diagnostics go through [`LoggingListener`].

mod console;
mod handler;
mod logging;

pub use console::{render, ConsoleListener, TranscriptBuffer};
pub use handler::{CompositeListener, NoOpListener, ScanEvent, ScanListener};
pub use logging::LoggingListener;
