//! Declarative job definitions
//!
//! A job file describes the build to inspect and the text finders to run. YAML,
//! TOML and JSON are accepted, chosen by file extension:
//!
//! ```yaml
//! workspace: .
//! console_log: build.log
//! initial_result: SUCCESS
//! text_finders:
//!   - regexp: "ERROR"
//!     file_set: "**/*.log"
//!     build_result: FAILURE
//!   - regexp: "WARNING"
//!     also_check_console_output: true
//!     build_result: UNSTABLE
//! ```
//!
//! Older definitions using `succeed_if_found`, `unstable_if_found` and
//! `not_built_if_found` are migrated to `build_result` / `change_condition`.

use crate::finder::{BuildResult, ChangeCondition, FinderError, ResultParseError, TextFinder};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Failed to read job file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported job file format: {0} (expected .yaml, .yml, .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to parse job file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Text finder #{index}: {source}")]
    InvalidFinder {
        index: usize,
        #[source]
        source: FinderError,
    },

    #[error("Text finder #{index}: {source}")]
    InvalidResult {
        index: usize,
        #[source]
        source: ResultParseError,
    },

    #[error("Text finder #{index}: {message}")]
    InvalidCondition { index: usize, message: String },

    #[error(
        "Text finder #{index}: legacy flags (succeed_if_found, unstable_if_found, not_built_if_found) \
         cannot be combined with build_result or change_condition"
    )]
    MixedLegacySettings { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFormat {
    Yaml,
    Toml,
    Json,
}

impl JobFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(JobFormat::Yaml),
            "toml" => Some(JobFormat::Toml),
            "json" => Some(JobFormat::Json),
            _ => None,
        }
    }
}

/// Raw text finder entry as written in a job file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinderSpec {
    pub regexp: String,
    #[serde(default)]
    pub file_set: Option<String>,
    #[serde(default)]
    pub build_result: Option<String>,
    #[serde(default)]
    pub change_condition: Option<String>,
    #[serde(default)]
    pub also_check_console_output: bool,
    #[serde(default)]
    pub allow_forced: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub succeed_if_found: Option<bool>,
    #[serde(default)]
    pub unstable_if_found: Option<bool>,
    #[serde(default)]
    pub not_built_if_found: Option<bool>,
}

impl FinderSpec {
    fn uses_legacy_flags(&self) -> bool {
        self.succeed_if_found.is_some()
            || self.unstable_if_found.is_some()
            || self.not_built_if_found.is_some()
    }

    /// Resolves the result and condition, migrating legacy flags
    fn result_and_condition(
        &self,
        index: usize,
    ) -> Result<(BuildResult, ChangeCondition), JobError> {
        if self.uses_legacy_flags() {
            if self.build_result.is_some() || self.change_condition.is_some() {
                return Err(JobError::MixedLegacySettings { index });
            }

            let condition = if self.succeed_if_found.unwrap_or(false) {
                ChangeCondition::MatchNotFound
            } else {
                ChangeCondition::MatchFound
            };
            let result = if self.unstable_if_found.unwrap_or(false) {
                BuildResult::Unstable
            } else if self.not_built_if_found.unwrap_or(false) {
                BuildResult::NotBuilt
            } else {
                BuildResult::Failure
            };
            debug!(index, result = %result, condition = %condition, "Migrated legacy finder flags");
            return Ok((result, condition));
        }

        let result = BuildResult::parse_or_default(self.build_result.as_deref())
            .map_err(|source| JobError::InvalidResult { index, source })?;
        let condition = match self.change_condition.as_deref().map(str::trim) {
            None | Some("") => ChangeCondition::default(),
            Some(value) => value
                .parse()
                .map_err(|message| JobError::InvalidCondition { index, message })?,
        };
        Ok((result, condition))
    }

    pub fn into_finder(self, index: usize) -> Result<TextFinder, JobError> {
        let (result, condition) = self.result_and_condition(index)?;
        let finder = TextFinder::new(&self.regexp)
            .map_err(|source| JobError::InvalidFinder { index, source })?
            .with_file_set(self.file_set.as_deref())
            .with_build_result(result)
            .with_change_condition(condition)
            .with_also_check_console_output(self.also_check_console_output)
            .with_allow_forced(self.allow_forced)
            .with_description(self.description);
        Ok(finder)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct JobFile {
    #[serde(default)]
    workspace: Option<PathBuf>,
    #[serde(default)]
    console_log: Option<PathBuf>,
    #[serde(default)]
    initial_result: Option<String>,
    #[serde(default)]
    text_finders: Vec<FinderSpec>,
}

/// A loaded and validated job definition
#[derive(Debug, Clone)]
pub struct Job {
    pub workspace: Option<PathBuf>,
    pub console_log: Option<PathBuf>,
    pub initial_result: Option<BuildResult>,
    pub finders: Vec<TextFinder>,
}

impl Job {
    /// Loads a job file; relative paths inside it resolve against its directory
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let format =
            JobFormat::from_path(path).ok_or_else(|| JobError::UnsupportedFormat(path.into()))?;
        let content = fs::read_to_string(path).map_err(|source| JobError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let job = Self::parse(&content, format, base).map_err(|e| match e {
            JobError::Parse { message, .. } => JobError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        debug!(
            path = %path.display(),
            finders = job.finders.len(),
            "Loaded job definition"
        );
        Ok(job)
    }

    pub fn parse(content: &str, format: JobFormat, base: &Path) -> Result<Self, JobError> {
        let parse_error = |message: String| JobError::Parse {
            path: PathBuf::new(),
            message,
        };
        let raw: JobFile = match format {
            JobFormat::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
            JobFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
            JobFormat::Json => {
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?
            }
        };

        let initial_result = raw
            .initial_result
            .as_deref()
            .map(str::parse::<BuildResult>)
            .transpose()
            .map_err(|e| parse_error(format!("initial_result: {}", e)))?;

        let finders = raw
            .text_finders
            .into_iter()
            .enumerate()
            .map(|(index, spec)| spec.into_finder(index + 1))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            workspace: raw.workspace.map(|p| resolve(base, p)),
            console_log: raw.console_log.map(|p| resolve(base, p)),
            initial_result,
            finders,
        })
    }
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
