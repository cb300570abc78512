//! Scan listener trait and events

use crate::finder::BuildResult;
use std::path::PathBuf;
use std::sync::Arc;

/// Events emitted while text finders run
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Console scanning started for a pattern
    ConsoleScanStarted { pattern: String },

    /// Console scanning finished
    ConsoleScanFinished { pattern: String, found: bool },

    /// File set scanning started
    FileSetScanStarted { pattern: String, file_set: String },

    /// File set scanning finished
    FileSetScanFinished {
        pattern: String,
        file_set: String,
        found: bool,
    },

    /// The file set selected no files
    FileSetEmpty { file_set: String },

    /// First match in a file; the matching lines follow
    FileMatched { path: PathBuf },

    /// A line matched the pattern
    LineMatched { line: String },

    /// A selected file disappeared before it could be read
    FileMissing { path: PathBuf },

    /// A selected file could not be opened
    FileUnreadable { path: PathBuf, error: String },

    /// Reading failed part way through a file
    FileReadFailed { path: PathBuf, error: String },

    /// A finder's condition held and it applied `requested`
    ResultChanged {
        requested: BuildResult,
        from: BuildResult,
        to: BuildResult,
        forced: bool,
    },
}

/// Trait for handling scan events
pub trait ScanListener: Send + Sync {
    /// Called when a scan event occurs
    fn on_event(&self, event: &ScanEvent);
}

/// Listener that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpListener;

impl ScanListener for NoOpListener {
    fn on_event(&self, _event: &ScanEvent) {}
}

/// Forwards every event to each inner listener in order
#[derive(Default, Clone)]
pub struct CompositeListener {
    listeners: Vec<Arc<dyn ScanListener>>,
}

impl CompositeListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, listener: Arc<dyn ScanListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl ScanListener for CompositeListener {
    fn on_event(&self, event: &ScanEvent) {
        for listener in &self.listeners {
            listener.on_event(event);
        }
    }
}
