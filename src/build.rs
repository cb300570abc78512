//! The build a publisher runs against

use crate::finder::BuildResult;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Workspace, console log and current result of a build
#[derive(Debug, Clone)]
pub struct Build {
    workspace: PathBuf,
    console_log: Option<PathBuf>,
    result: BuildResult,
}

impl Build {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            console_log: None,
            result: BuildResult::Success,
        }
    }

    pub fn with_console_log(mut self, console_log: Option<PathBuf>) -> Self {
        self.console_log = console_log;
        self
    }

    pub fn with_result(mut self, result: BuildResult) -> Self {
        self.result = result;
        self
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn console_log(&self) -> Option<&Path> {
        self.console_log.as_deref()
    }

    pub fn result(&self) -> BuildResult {
        self.result
    }

    /// Moves the result towards `result` without ever improving it
    ///
    /// Returns the previous result.
    pub fn set_result(&mut self, result: BuildResult) -> BuildResult {
        let previous = self.result;
        self.result = previous.combine(result);
        debug!(from = %previous, requested = %result, to = %self.result, "Build result combined");
        previous
    }

    /// Sets the result unconditionally, which may improve the build
    ///
    /// Returns the previous result.
    pub fn force_result(&mut self, result: BuildResult) -> BuildResult {
        let previous = self.result;
        self.result = result;
        info!(from = %previous, to = %result, "Build result forced");
        previous
    }
}
