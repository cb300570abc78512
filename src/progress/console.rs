//! Console transcript listener
//!
//! Renders scan events as the lines a build host prints into the build
//! console, e.g. `[Text Finder] Searching console output...`.

use super::{ScanEvent, ScanListener};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::warn;

const PREFIX: &str = "[Text Finder]";

/// Formats an event as transcript lines
pub fn render(event: &ScanEvent) -> String {
    match event {
        ScanEvent::ConsoleScanStarted { .. } => format!("{} Searching console output...", PREFIX),
        ScanEvent::ConsoleScanFinished { pattern, .. } => format!(
            "{} Finished searching for pattern '{}' in console output.",
            PREFIX, pattern
        ),
        ScanEvent::FileSetScanStarted { pattern, file_set } => format!(
            "{} Searching for pattern '{}' in file set '{}'.",
            PREFIX, pattern, file_set
        ),
        ScanEvent::FileSetScanFinished {
            pattern, file_set, ..
        } => format!(
            "{} Finished searching for pattern '{}' in file set '{}'.",
            PREFIX, pattern, file_set
        ),
        ScanEvent::FileSetEmpty { file_set } => {
            format!("{} File set '{}' is empty", PREFIX, file_set)
        }
        ScanEvent::FileMatched { path } => format!("{}:", path.display()),
        ScanEvent::LineMatched { line } => line.clone(),
        ScanEvent::FileMissing { path } => {
            format!("{} Unable to find file '{}'", PREFIX, path.display())
        }
        ScanEvent::FileUnreadable { path, .. } => {
            format!("{} Unable to read from file '{}'", PREFIX, path.display())
        }
        ScanEvent::FileReadFailed { path, .. } => format!(
            "{} Error reading file '{}' -- ignoring",
            PREFIX,
            path.display()
        ),
        ScanEvent::ResultChanged {
            requested,
            from,
            forced,
            ..
        } => {
            if *forced {
                format!(
                    "{} Forcing build result from '{}' to '{}'.",
                    PREFIX, from, requested
                )
            } else {
                format!("{} Setting build result to '{}'.", PREFIX, requested)
            }
        }
    }
}

/// In-memory transcript sink shared between a listener and its reader
#[derive(Debug, Default, Clone)]
pub struct TranscriptBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl TranscriptBuffer {
    pub fn contents(&self) -> String {
        match self.inner.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl Write for TranscriptBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "transcript buffer poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Listener writing the transcript to any byte sink
pub struct ConsoleListener {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleListener {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Appends the transcript to an existing console log
    pub fn append_to(path: &Path) -> io::Result<Self> {
        let file: File = OpenOptions::new().append(true).open(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Collects the transcript in memory
    pub fn buffered() -> (Self, TranscriptBuffer) {
        let buffer = TranscriptBuffer::default();
        (Self::new(Box::new(buffer.clone())), buffer)
    }
}

impl ScanListener for ConsoleListener {
    fn on_event(&self, event: &ScanEvent) {
        let text = render(event);
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", text).and_then(|_| writer.flush()) {
            warn!(error = %e, "Failed to write transcript line");
        }
    }
}
