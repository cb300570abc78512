//! Runs a list of text finders against a build
//!
//! Finders run in the order they were given. Each one may scan the console log
//! and a file set in the workspace, then change the build result when its
//! change condition triggers. Unless a finder allows forcing, the build result
//! can only get worse.

use crate::build::Build;
use crate::finder::{FileSet, FileSetError, PatternScanner, ScanOutcome, TextFinder};
use crate::progress::{NoOpListener, ScanEvent, ScanListener};
use crate::report::{FinderAction, FinderReport, ScanReport};
use chrono::Utc;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_MAX_REPORTED_MATCHES: usize = 1000;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Console output scanning was requested but no console log is configured")]
    ConsoleLogNotConfigured,

    #[error("Failed to read console log {path}: {source}")]
    ConsoleLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    FileSet(#[from] FileSetError),

    #[error("Scan worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone)]
pub struct PublisherOptions {
    /// Maximum number of match records kept per finder
    pub max_reported_matches: usize,
    /// Follow symbolic links while walking the workspace
    pub follow_links: bool,
}

impl Default for PublisherOptions {
    fn default() -> Self {
        Self {
            max_reported_matches: DEFAULT_MAX_REPORTED_MATCHES,
            follow_links: false,
        }
    }
}

pub struct TextFinderPublisher {
    finders: Vec<TextFinder>,
    options: PublisherOptions,
    listener: Arc<dyn ScanListener>,
}

impl TextFinderPublisher {
    pub fn new(finders: Vec<TextFinder>) -> Self {
        Self {
            finders,
            options: PublisherOptions::default(),
            listener: Arc::new(NoOpListener),
        }
    }

    pub fn with_options(mut self, options: PublisherOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn ScanListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn finders(&self) -> &[TextFinder] {
        &self.finders
    }

    /// Runs every finder and returns the report; `build` holds the final result
    pub async fn perform(&self, build: &mut Build) -> Result<ScanReport, PublishError> {
        let started_at = Utc::now();
        let initial_result = build.result();

        info!(
            finders = self.finders.len(),
            workspace = %build.workspace().display(),
            initial_result = %initial_result,
            "Running text finders"
        );

        let mut reports = Vec::with_capacity(self.finders.len());
        for finder in &self.finders {
            reports.push(self.find_text(finder, build).await?);
        }

        info!(
            initial_result = %initial_result,
            final_result = %build.result(),
            "Text finders complete"
        );

        Ok(ScanReport {
            version: crate::VERSION.to_string(),
            workspace: build.workspace().to_path_buf(),
            console_log: build.console_log().map(|p| p.to_path_buf()),
            initial_result,
            final_result: build.result(),
            started_at,
            finished_at: Utc::now(),
            finders: reports,
        })
    }

    async fn find_text(
        &self,
        finder: &TextFinder,
        build: &mut Build,
    ) -> Result<FinderReport, PublishError> {
        let max_matches = self.options.max_reported_matches;
        let mut outcome = ScanOutcome::default();

        debug!(finder = %finder.label(), "Evaluating text finder");

        if finder.also_check_console_output() {
            let console_log = build
                .console_log()
                .ok_or(PublishError::ConsoleLogNotConfigured)?
                .to_path_buf();

            self.listener.on_event(&ScanEvent::ConsoleScanStarted {
                pattern: finder.regexp().to_string(),
            });

            let pattern = finder.pattern().clone();
            let listener = self.listener.clone();
            let path = console_log.clone();
            let console_outcome = run_blocking(move || {
                PatternScanner::new(&pattern, listener.as_ref(), max_matches).scan_console(&path)
            })
            .await?
            .map_err(|source| PublishError::ConsoleLog {
                path: console_log,
                source,
            })?;

            self.listener.on_event(&ScanEvent::ConsoleScanFinished {
                pattern: finder.regexp().to_string(),
                found: console_outcome.found,
            });
            outcome = outcome.merge(console_outcome, max_matches);
        }

        if let Some(file_set) = finder.file_set() {
            self.listener.on_event(&ScanEvent::FileSetScanStarted {
                pattern: finder.regexp().to_string(),
                file_set: file_set.to_string(),
            });

            let set = FileSet::parse(file_set)?.with_follow_links(self.options.follow_links);
            let pattern = finder.pattern().clone();
            let listener = self.listener.clone();
            let workspace = build.workspace().to_path_buf();
            let files_outcome = run_blocking(move || -> Result<ScanOutcome, FileSetError> {
                let files = set.scan(&workspace)?;
                if files.is_empty() {
                    listener.on_event(&ScanEvent::FileSetEmpty {
                        file_set: set.as_str().to_string(),
                    });
                    return Ok(ScanOutcome::default());
                }
                Ok(PatternScanner::new(&pattern, listener.as_ref(), max_matches)
                    .scan_files(&workspace, &files))
            })
            .await??;

            self.listener.on_event(&ScanEvent::FileSetScanFinished {
                pattern: finder.regexp().to_string(),
                file_set: file_set.to_string(),
                found: files_outcome.found,
            });
            outcome = outcome.merge(files_outcome, max_matches);
        }

        let result_before = build.result();
        let action = if !finder.change_condition().triggers(outcome.found) {
            FinderAction::Unchanged
        } else if finder.allow_forced() {
            build.force_result(finder.build_result());
            FinderAction::Forced
        } else {
            build.set_result(finder.build_result());
            FinderAction::Combined
        };

        if action != FinderAction::Unchanged {
            self.listener.on_event(&ScanEvent::ResultChanged {
                requested: finder.build_result(),
                from: result_before,
                to: build.result(),
                forced: action == FinderAction::Forced,
            });
        }

        debug!(
            finder = %finder.label(),
            found = outcome.found,
            action = ?action,
            result = %build.result(),
            "Text finder evaluated"
        );

        Ok(FinderReport {
            finder: finder.clone(),
            found: outcome.found,
            action,
            result_before,
            result_after: build.result(),
            files_scanned: outcome.files_scanned,
            matches: outcome.matches,
            matches_truncated: outcome.truncated,
        })
    }
}

/// Runs file I/O on the blocking pool, like a host running it on an agent
async fn run_blocking<F, T>(work: F) -> Result<T, PublishError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PublishError::Worker(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::{BuildResult, ChangeCondition};
    use crate::progress::ConsoleListener;
    use std::fs;
    use tempfile::TempDir;

    fn console_build(dir: &TempDir, console: &str) -> Build {
        let log = dir.path().join("console.log");
        fs::write(&log, console).unwrap();
        Build::new(dir.path().to_path_buf()).with_console_log(Some(log))
    }

    fn console_finder(pattern: &str, result: BuildResult) -> TextFinder {
        TextFinder::new(pattern)
            .unwrap()
            .with_build_result(result)
            .with_also_check_console_output(true)
    }

    #[tokio::test]
    async fn test_failure_if_found_in_console() {
        let dir = TempDir::new().unwrap();
        let mut build = console_build(&dir, "+ echo foobar\nfoobar\n");
        let (listener, transcript) = ConsoleListener::buffered();

        let publisher = TextFinderPublisher::new(vec![TextFinder::new("foobar")
            .unwrap()
            .with_also_check_console_output(true)])
        .with_listener(Arc::new(listener));
        let report = publisher.perform(&mut build).await.unwrap();

        assert_eq!(report.final_result, BuildResult::Failure);
        assert_eq!(report.finders[0].action, FinderAction::Combined);
        let text = transcript.contents();
        assert!(text.contains("[Text Finder] Searching console output..."));
        assert!(text.contains("+ echo foobar"));
        assert!(text.contains("Finished searching for pattern 'foobar' in console output."));
    }

    #[tokio::test]
    async fn test_not_found_keeps_success() {
        let dir = TempDir::new().unwrap();
        let mut build = console_build(&dir, "all good\n");

        let publisher =
            TextFinderPublisher::new(vec![console_finder("foobar", BuildResult::Failure)]);
        let report = publisher.perform(&mut build).await.unwrap();

        assert_eq!(report.final_result, BuildResult::Success);
        assert!(!report.finders[0].found);
        assert_eq!(report.finders[0].action, FinderAction::Unchanged);
    }

    #[tokio::test]
    async fn test_match_not_found_condition() {
        let dir = TempDir::new().unwrap();
        let mut build = console_build(&dir, "all good\n");

        let finder = console_finder("BUILD SUCCESSFUL", BuildResult::Failure)
            .with_change_condition(ChangeCondition::MatchNotFound);
        let report = TextFinderPublisher::new(vec![finder])
            .perform(&mut build)
            .await
            .unwrap();

        assert_eq!(report.final_result, BuildResult::Failure);
    }

    #[tokio::test]
    async fn test_later_finder_cannot_improve_without_forcing() {
        let dir = TempDir::new().unwrap();
        let mut build = console_build(&dir, "foobar\nbazqux\n");

        let publisher = TextFinderPublisher::new(vec![
            console_finder("foobar", BuildResult::Unstable),
            console_finder("bazqux", BuildResult::Success),
        ]);
        let report = publisher.perform(&mut build).await.unwrap();

        assert_eq!(report.final_result, BuildResult::Unstable);
    }

    #[tokio::test]
    async fn test_forced_finder_can_improve() {
        let dir = TempDir::new().unwrap();
        let mut build = console_build(&dir, "foobar\nbazqux\n");

        let publisher = TextFinderPublisher::new(vec![
            console_finder("foobar", BuildResult::Unstable),
            console_finder("bazqux", BuildResult::Success).with_allow_forced(true),
        ]);
        let report = publisher.perform(&mut build).await.unwrap();

        assert_eq!(report.final_result, BuildResult::Success);
        assert_eq!(report.finders[1].action, FinderAction::Forced);
        assert_eq!(report.finders[1].result_before, BuildResult::Unstable);
    }

    #[tokio::test]
    async fn test_file_set_scan() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("out.txt"), "foobar\n").unwrap();
        let mut build = Build::new(dir.path().to_path_buf());

        let finder = TextFinder::new("foobar")
            .unwrap()
            .with_file_set(Some("out.txt"))
            .with_build_result(BuildResult::NotBuilt);
        let report = TextFinderPublisher::new(vec![finder])
            .perform(&mut build)
            .await
            .unwrap();

        assert_eq!(report.final_result, BuildResult::NotBuilt);
        assert_eq!(report.finders[0].files_scanned, 1);
        assert_eq!(report.finders[0].matches[0].line, "foobar");
    }

    #[tokio::test]
    async fn test_empty_file_set_is_not_a_match() {
        let dir = TempDir::new().unwrap();
        let mut build = Build::new(dir.path().to_path_buf());
        let (listener, transcript) = ConsoleListener::buffered();

        let finder = TextFinder::new("foobar")
            .unwrap()
            .with_file_set(Some("*.log"));
        let report = TextFinderPublisher::new(vec![finder])
            .with_listener(Arc::new(listener))
            .perform(&mut build)
            .await
            .unwrap();

        assert_eq!(report.final_result, BuildResult::Success);
        assert!(transcript
            .contents()
            .contains("[Text Finder] File set '*.log' is empty"));
    }

    #[tokio::test]
    async fn test_console_requested_without_log_is_error() {
        let dir = TempDir::new().unwrap();
        let mut build = Build::new(dir.path().to_path_buf());

        let result = TextFinderPublisher::new(vec![console_finder("x", BuildResult::Failure)])
            .perform(&mut build)
            .await;

        assert!(matches!(result, Err(PublishError::ConsoleLogNotConfigured)));
    }

    #[tokio::test]
    async fn test_appended_transcript_is_not_rescanned() {
        let dir = TempDir::new().unwrap();
        let mut build = console_build(&dir, "nothing relevant\n");
        let log = build.console_log().unwrap().to_path_buf();
        let listener = ConsoleListener::append_to(&log).unwrap();

        let report = TextFinderPublisher::new(vec![console_finder("foobar", BuildResult::Failure)])
            .with_listener(Arc::new(listener))
            .perform(&mut build)
            .await
            .unwrap();

        assert_eq!(report.final_result, BuildResult::Success);
        assert!(!report.finders[0].found);
        assert!(fs::read_to_string(&log)
            .unwrap()
            .contains("Finished searching for pattern 'foobar'"));
    }
}
