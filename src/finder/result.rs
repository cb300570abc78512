//! Build result lattice
//!
//! Results are ordered from best to worst. A build that is not forced can only
//! move towards the worse end of the lattice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Exit code used for usage and configuration errors
pub const EXIT_USAGE_ERROR: i32 = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error(
    "buildResult is invalid: {0}. Valid options are SUCCESS, UNSTABLE, FAILURE, NOT_BUILT and ABORTED."
)]
pub struct ResultParseError(pub String);

/// Outcome of a build, ordered from best (`Success`) to worst (`Aborted`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Unstable,
    #[default]
    Failure,
    NotBuilt,
    Aborted,
}

impl BuildResult {
    /// All results in lattice order
    pub const ALL: [BuildResult; 5] = [
        BuildResult::Success,
        BuildResult::Unstable,
        BuildResult::Failure,
        BuildResult::NotBuilt,
        BuildResult::Aborted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Failure => "FAILURE",
            BuildResult::NotBuilt => "NOT_BUILT",
            BuildResult::Aborted => "ABORTED",
        }
    }

    /// Returns the worse of the two results
    pub fn combine(self, other: BuildResult) -> BuildResult {
        self.max(other)
    }

    pub fn is_worse_than(&self, other: BuildResult) -> bool {
        *self > other
    }

    pub fn is_better_than(&self, other: BuildResult) -> bool {
        *self < other
    }

    /// Process exit code reported by the CLI for this result
    ///
    /// Code 2 is skipped so that it stays free for usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildResult::Success => 0,
            BuildResult::Failure => 1,
            BuildResult::Unstable => 3,
            BuildResult::NotBuilt => 4,
            BuildResult::Aborted => 5,
        }
    }

    /// Parses a user supplied value, treating a blank value as the default
    pub fn parse_or_default(value: Option<&str>) -> Result<BuildResult, ResultParseError> {
        match value.map(str::trim) {
            None | Some("") => Ok(BuildResult::default()),
            Some(v) => v.parse(),
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildResult {
    type Err = ResultParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        BuildResult::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ResultParseError(s.to_string()))
    }
}
