//! Line-oriented pattern scanning over files and console logs

use crate::progress::{ScanEvent, ScanListener};
use regex::Regex;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Where a matching line came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Console,
    File(PathBuf),
}

/// A single matching line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub source: MatchSource,
    pub line_number: usize,
    pub line: String,
}

/// Result of scanning one or more sources with a pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub found: bool,
    pub files_scanned: usize,
    pub matches: Vec<MatchRecord>,
    /// True when more lines matched than were recorded
    pub truncated: bool,
}

impl ScanOutcome {
    /// Combines two outcomes; a match in either counts as found
    pub fn merge(mut self, other: ScanOutcome, max_matches: usize) -> ScanOutcome {
        self.found |= other.found;
        self.files_scanned += other.files_scanned;
        self.truncated |= other.truncated;
        for record in other.matches {
            if self.matches.len() >= max_matches {
                self.truncated = true;
                break;
            }
            self.matches.push(record);
        }
        self
    }

    fn record(&mut self, record: MatchRecord, max_matches: usize) {
        self.found = true;
        if self.matches.len() < max_matches {
            self.matches.push(record);
        } else {
            self.truncated = true;
        }
    }
}

/// Scans text sources line by line for a pattern
pub struct PatternScanner<'a> {
    pattern: &'a Regex,
    listener: &'a dyn ScanListener,
    max_matches: usize,
}

impl<'a> PatternScanner<'a> {
    pub fn new(pattern: &'a Regex, listener: &'a dyn ScanListener, max_matches: usize) -> Self {
        Self {
            pattern,
            listener,
            max_matches,
        }
    }

    /// Scans the console log as it was when this call started
    ///
    /// Stops at the first hit. Anything appended to the log while scanning,
    /// such as the transcript itself, is not considered.
    pub fn scan_console(&self, console_log: &Path) -> io::Result<ScanOutcome> {
        let file = File::open(console_log)?;
        let snapshot_len = file.metadata()?.len();
        debug!(
            console_log = %console_log.display(),
            bytes = snapshot_len,
            "Scanning console log"
        );

        let reader = BufReader::new(file.take(snapshot_len));
        let mut outcome = ScanOutcome::default();
        self.scan_lines(reader, &MatchSource::Console, None, true, &mut outcome)?;
        Ok(outcome)
    }

    /// Scans every file in `files`, given relative to `workspace`
    ///
    /// Files that cannot be read are reported and skipped.
    pub fn scan_files(&self, workspace: &Path, files: &[PathBuf]) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        for relative in files {
            self.scan_file(workspace, relative, &mut outcome);
        }
        outcome
    }

    fn scan_file(&self, workspace: &Path, relative: &Path, outcome: &mut ScanOutcome) {
        let path = workspace.join(relative);

        if !path.exists() {
            self.listener.on_event(&ScanEvent::FileMissing { path });
            return;
        }

        let (file, len) = match open_regular_file(&path) {
            Ok(opened) => opened,
            Err(e) => {
                self.listener.on_event(&ScanEvent::FileUnreadable {
                    path,
                    error: e.to_string(),
                });
                return;
            }
        };

        // Bytes appended after opening (e.g. the transcript of this run) are not read
        outcome.files_scanned += 1;
        let source = MatchSource::File(relative.to_path_buf());
        let reader = BufReader::new(file.take(len));
        if let Err(e) = self.scan_lines(reader, &source, Some(&path), false, outcome) {
            self.listener.on_event(&ScanEvent::FileReadFailed {
                path,
                error: e.to_string(),
            });
        }
    }

    /// Feeds matching lines into `outcome`, returning early on the first hit
    /// when `abort_after_first_hit` is set. `header` is printed once before
    /// the first matching line.
    fn scan_lines<R: BufRead>(
        &self,
        mut reader: R,
        source: &MatchSource,
        header: Option<&Path>,
        abort_after_first_hit: bool,
        outcome: &mut ScanOutcome,
    ) -> io::Result<()> {
        let mut buf = Vec::new();
        let mut line_number = 0;
        let mut header_printed = false;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;

            let line = decode_line(&buf);
            if !self.pattern.is_match(&line) {
                continue;
            }

            trace!(line_number, "Pattern matched");
            if let Some(path) = header {
                if !header_printed {
                    self.listener.on_event(&ScanEvent::FileMatched {
                        path: path.to_path_buf(),
                    });
                    header_printed = true;
                }
            }
            self.listener.on_event(&ScanEvent::LineMatched { line: line.clone() });

            outcome.record(
                MatchRecord {
                    source: source.clone(),
                    line_number,
                    line,
                },
                self.max_matches,
            );

            if abort_after_first_hit {
                break;
            }
        }

        Ok(())
    }
}

/// Opens `path` and returns it with its length at open time
fn open_regular_file(path: &Path) -> io::Result<(File, u64)> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    Ok((file, metadata.len()))
}

fn decode_line(raw: &[u8]) -> String {
    let trimmed = raw.strip_suffix(b"\n").unwrap_or(raw);
    let trimmed = trimmed.strip_suffix(b"\r").unwrap_or(trimmed);
    String::from_utf8_lossy(trimmed).into_owned()
}
