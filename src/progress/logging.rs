//! Tracing-based scan listener

use super::{ScanEvent, ScanListener};
use tracing::{debug, info, trace, warn};

/// Listener that logs scan events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl ScanListener for LoggingListener {
    fn on_event(&self, event: &ScanEvent) {
        match event {
            ScanEvent::ConsoleScanStarted { pattern } => {
                debug!(pattern = %pattern, "Scanning console output");
            }
            ScanEvent::ConsoleScanFinished { pattern, found } => {
                debug!(pattern = %pattern, found, "Console scan complete");
            }
            ScanEvent::FileSetScanStarted { pattern, file_set } => {
                debug!(pattern = %pattern, file_set = %file_set, "Scanning file set");
            }
            ScanEvent::FileSetScanFinished {
                pattern,
                file_set,
                found,
            } => {
                debug!(pattern = %pattern, file_set = %file_set, found, "File set scan complete");
            }
            ScanEvent::FileSetEmpty { file_set } => {
                warn!(file_set = %file_set, "File set is empty");
            }
            ScanEvent::FileMatched { path } => {
                debug!(path = %path.display(), "Pattern found in file");
            }
            ScanEvent::LineMatched { line } => {
                trace!(line = %line, "Matched line");
            }
            ScanEvent::FileMissing { path } => {
                warn!(path = %path.display(), "Selected file no longer exists");
            }
            ScanEvent::FileUnreadable { path, error } => {
                warn!(path = %path.display(), error = %error, "Unable to open file");
            }
            ScanEvent::FileReadFailed { path, error } => {
                warn!(path = %path.display(), error = %error, "Error while reading file");
            }
            ScanEvent::ResultChanged {
                requested,
                from,
                to,
                forced,
            } => {
                info!(requested = %requested, from = %from, to = %to, forced, "Build result updated");
            }
        }
    }
}
